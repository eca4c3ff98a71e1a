//! Text shaping and layout behind a small capability trait, with a `parley` implementation.

use crate::foundation::core::Rgba8;
use crate::foundation::error::{KinemojiError, KinemojiResult};
use crate::text::registry::{FontResolver, isolated_collection, register_primary_face};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A resolved font: the family that was asked for and the file that provides it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontFace {
    /// Family name as requested.
    pub family: String,
    /// Backing font file.
    pub path: PathBuf,
}

/// One run of positioned glyphs sharing a font, size and color.
#[derive(Clone, Debug)]
pub struct GlyphRunBlock {
    /// Font the glyph ids index into.
    pub font: vello_cpu::peniko::FontData,
    /// Size in pixels.
    pub font_size: f32,
    /// Fill color.
    pub color: Rgba8,
    /// Glyphs positioned relative to the block's top-left corner, on their baselines.
    pub glyphs: Vec<vello_cpu::Glyph>,
}

/// A laid-out, single-paragraph text block whose origin is its top-left corner.
#[derive(Clone, Debug)]
pub struct TextBlock {
    /// Source string.
    pub text: String,
    /// Logical width in pixels.
    pub width: f64,
    /// Logical height in pixels.
    pub height: f64,
    /// Glyph runs in visual order.
    pub runs: Vec<GlyphRunBlock>,
}

/// Text shaping capability used by the compositor.
pub trait TextShaper {
    /// Resolve `family` to a font face. Failure is fatal to the render job.
    fn resolve_font(&mut self, family: &str) -> KinemojiResult<FontFace>;

    /// Check that every character of `text` shapes to a real glyph in `face`.
    ///
    /// Returns [`KinemojiError::Shaping`] when it does not.
    fn check_shaping(&mut self, text: &str, face: &FontFace) -> KinemojiResult<()>;

    /// Lay `text` out on one line at `size_px`.
    fn layout(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
        color: Rgba8,
    ) -> KinemojiResult<TextBlock>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

impl From<TextBrushRgba8> for Rgba8 {
    fn from(b: TextBrushRgba8) -> Self {
        Self {
            r: b.r,
            g: b.g,
            b: b.b,
            a: b.a,
        }
    }
}

/// Face 0 of a font file, loaded into a font context holding nothing else, so layout never
/// falls back to a different face.
struct LoadedFont {
    font_ctx: parley::FontContext,
    family_name: String,
    data: vello_cpu::peniko::FontData,
}

/// [`TextShaper`] backed by `parley` layout and a [`FontResolver`].
///
/// Font files are read once and cached by path for the shaper's lifetime.
pub struct ParleyShaper<R> {
    resolver: R,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    fonts: HashMap<PathBuf, LoadedFont>,
}

impl<R: FontResolver> ParleyShaper<R> {
    /// Create a shaper over `resolver`.
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            layout_ctx: parley::LayoutContext::new(),
            fonts: HashMap::new(),
        }
    }

    /// Borrow the underlying resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    fn build_layout(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> KinemojiResult<(parley::Layout<TextBrushRgba8>, vello_cpu::peniko::FontData)> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(KinemojiError::validation(
                "text size must be finite and > 0",
            ));
        }
        let font = load_font(&mut self.fonts, &face.path)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut font.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(font.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok((layout, font.data.clone()))
    }
}

fn load_font<'a>(
    fonts: &'a mut HashMap<PathBuf, LoadedFont>,
    path: &Path,
) -> KinemojiResult<&'a mut LoadedFont> {
    if !fonts.contains_key(path) {
        let bytes = std::fs::read(path).map_err(|e| {
            KinemojiError::font(format!("read font file '{}': {e}", path.display()))
        })?;

        let mut font_ctx = parley::FontContext {
            collection: isolated_collection(),
            source_cache: parley::fontique::SourceCache::default(),
        };
        let (family_name, _) = register_primary_face(&mut font_ctx.collection, bytes.clone())
            .into_iter()
            .next()
            .ok_or_else(|| {
                KinemojiError::font(format!(
                    "no font families registered from '{}'",
                    path.display()
                ))
            })?;

        tracing::debug!(path = %path.display(), family = %family_name, "loaded font");
        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        fonts.insert(
            path.to_path_buf(),
            LoadedFont {
                font_ctx,
                family_name,
                data,
            },
        );
    }
    fonts
        .get_mut(path)
        .ok_or_else(|| KinemojiError::font(format!("font '{}' not loaded", path.display())))
}

impl<R: FontResolver> TextShaper for ParleyShaper<R> {
    fn resolve_font(&mut self, family: &str) -> KinemojiResult<FontFace> {
        let path = self.resolver.resolve(family)?;
        load_font(&mut self.fonts, &path)?;
        Ok(FontFace {
            family: family.to_owned(),
            path,
        })
    }

    fn check_shaping(&mut self, text: &str, face: &FontFace) -> KinemojiResult<()> {
        let (layout, _) = self.build_layout(text, face, 16.0, TextBrushRgba8::default())?;
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                if run.glyphs().any(|g| g.id == 0) {
                    return Err(KinemojiError::shaping(format!(
                        "'{text}' has characters missing from font '{}'",
                        face.family
                    )));
                }
            }
        }
        Ok(())
    }

    fn layout(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
        color: Rgba8,
    ) -> KinemojiResult<TextBlock> {
        let (layout, font) = self.build_layout(text, face, size_px, color.into())?;

        let mut runs = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run
                    .positioned_glyphs()
                    .map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    })
                    .collect();
                runs.push(GlyphRunBlock {
                    font: font.clone(),
                    font_size: run.run().font_size(),
                    color: run.style().brush.into(),
                    glyphs,
                });
            }
        }

        Ok(TextBlock {
            text: text.to_owned(),
            width: f64::from(layout.width()),
            height: f64::from(layout.height()),
            runs,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/shaper.rs"]
mod tests;
