//! The drawing capability the compositor renders through.

use crate::foundation::core::{Affine, Canvas, Rect, Rgba8};
use crate::foundation::error::KinemojiResult;
use crate::text::shaper::TextBlock;

/// A 2D drawing target with a save/restore transform stack and isolated compositing layers.
///
/// All drawing happens in the coordinate frame produced by the concatenated transforms since the
/// matching `save`.
pub trait DrawSurface {
    /// Target canvas size.
    fn canvas(&self) -> Canvas;

    /// Push the current transform.
    fn save(&mut self);

    /// Pop the transform pushed by the matching [`DrawSurface::save`].
    fn restore(&mut self) -> KinemojiResult<()>;

    /// Post-multiply the current transform by `transform`.
    fn concat(&mut self, transform: Affine);

    /// Fill `rect` (in current coordinates) with a solid color.
    fn fill_rect(&mut self, rect: Rect, color: Rgba8);

    /// Fill a laid-out text block with its top-left corner at the current origin.
    fn draw_text(&mut self, block: &TextBlock) -> KinemojiResult<()>;

    /// Start an offscreen layer that is blended onto its parent with `alpha` when popped.
    fn push_layer(&mut self, alpha: f32);

    /// Finish the innermost layer and composite it onto its parent.
    fn pop_layer(&mut self) -> KinemojiResult<()>;
}

/// Run `draw` inside an isolated layer blended at `alpha`, or directly when `alpha` is `None`.
///
/// The layer is popped even when `draw` fails, so the surface stays balanced.
pub fn isolated<S, F>(surface: &mut S, alpha: Option<f32>, draw: F) -> KinemojiResult<()>
where
    S: DrawSurface + ?Sized,
    F: FnOnce(&mut S) -> KinemojiResult<()>,
{
    let Some(alpha) = alpha else {
        return draw(surface);
    };
    surface.push_layer(alpha);
    let drawn = draw(surface);
    let popped = surface.pop_layer();
    drawn.and(popped)
}
