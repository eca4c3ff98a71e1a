/// A rendered frame as BGRA8 pixels.
///
/// Pixels are premultiplied alpha, tightly packed and row-major, in the byte order the encoder
/// consumes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBGRA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// BGRA8 bytes.
    pub data: Vec<u8>,
}

impl FrameBGRA {
    /// Build a frame from premultiplied RGBA8 bytes.
    pub fn from_rgba8_premul(width: u32, height: u32, rgba: &[u8]) -> Self {
        let mut data = rgba.to_vec();
        for px in data.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// `[b, g, r, a]` at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data
            .get(i..i + 4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Opaque straight RGBA8 pixels, flattened over `bg` (RGB). Used for still-image export.
    pub fn to_rgba8_opaque(&self, bg: [u8; 3]) -> Vec<u8> {
        let mut out = vec![0u8; self.data.len()];
        flatten_premul_over_bg(&mut out, &self.data, [bg[2], bg[1], bg[0]]);
        for px in out.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
        out
    }
}

/// Flatten premultiplied 4-channel pixels over an opaque background given in the same channel
/// order. Alpha of the output is always 255.
pub(crate) fn flatten_premul_over_bg(dst: &mut [u8], src_premul: &[u8], bg: [u8; 3]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let v = u16::from(s[c]) + crate::foundation::math::mul_div255_u16(u16::from(bg[c]), inv);
            d[c] = v.min(255) as u8;
        }
        d[3] = 255;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
