use crate::foundation::core::{Affine, Canvas, Rect, Rgba8};
use crate::foundation::error::{KinemojiError, KinemojiResult};
use crate::render::frame::FrameBGRA;
use crate::render::surface::DrawSurface;
use crate::text::shaper::TextBlock;

/// [`DrawSurface`] rasterized on the CPU by `vello_cpu`.
///
/// One surface renders one frame: draw into it, then consume it with [`CpuSurface::finish`].
pub struct CpuSurface {
    ctx: vello_cpu::RenderContext,
    canvas: Canvas,
    transform: Affine,
    saved: Vec<Affine>,
    layers: usize,
}

impl CpuSurface {
    /// Allocate a transparent surface for `canvas`.
    pub fn new(canvas: Canvas) -> KinemojiResult<Self> {
        let (width, height) = canvas_u16(canvas)?;
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(width, height),
            canvas,
            transform: Affine::IDENTITY,
            saved: Vec::new(),
            layers: 0,
        })
    }

    /// Rasterize everything drawn so far and return the frame.
    ///
    /// Fails when a `save` or `push_layer` was left unmatched.
    pub fn finish(mut self) -> KinemojiResult<FrameBGRA> {
        if self.layers != 0 {
            return Err(KinemojiError::render(format!(
                "{} compositing layer(s) left open at end of frame",
                self.layers
            )));
        }
        if !self.saved.is_empty() {
            return Err(KinemojiError::render(format!(
                "{} saved transform(s) left unrestored at end of frame",
                self.saved.len()
            )));
        }

        let (width, height) = canvas_u16(self.canvas)?;
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameBGRA::from_rgba8_premul(
            self.canvas.width,
            self.canvas.height,
            pixmap.data_as_u8_slice(),
        ))
    }

    fn sync_transform(&mut self) {
        self.ctx.set_transform(affine_to_cpu(self.transform));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}

impl DrawSurface for CpuSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn save(&mut self) {
        self.saved.push(self.transform);
    }

    fn restore(&mut self) -> KinemojiResult<()> {
        self.transform = self
            .saved
            .pop()
            .ok_or_else(|| KinemojiError::render("restore without matching save"))?;
        Ok(())
    }

    fn concat(&mut self, transform: Affine) {
        self.transform = self.transform * transform;
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.sync_transform();
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            rect.x0, rect.y0, rect.x1, rect.y1,
        ));
    }

    fn draw_text(&mut self, block: &TextBlock) -> KinemojiResult<()> {
        self.sync_transform();
        for run in &block.runs {
            let c = run.color;
            self.ctx
                .set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
            self.ctx
                .glyph_run(&run.font)
                .font_size(run.font_size)
                .fill_glyphs(run.glyphs.iter().copied());
        }
        Ok(())
    }

    fn push_layer(&mut self, alpha: f32) {
        self.ctx.push_opacity_layer(alpha.clamp(0.0, 1.0));
        self.layers += 1;
    }

    fn pop_layer(&mut self) -> KinemojiResult<()> {
        if self.layers == 0 {
            return Err(KinemojiError::render("pop_layer without matching push_layer"));
        }
        self.ctx.pop_layer();
        self.layers -= 1;
        Ok(())
    }
}

fn canvas_u16(canvas: Canvas) -> KinemojiResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| KinemojiError::render("surface width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| KinemojiError::render("surface height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(KinemojiError::render("surface width/height must be non-zero"));
    }
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
