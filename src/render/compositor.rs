//! Scene rendering: walks a scene's actors at one instant and issues draw calls against a
//! [`DrawSurface`].

use crate::animation::motion::{ActorPose, bounce_offset, fade_alpha};
use crate::foundation::core::{Affine, Canvas, Rgba8, Vec2};
use crate::foundation::error::KinemojiResult;
use crate::render::surface::{DrawSurface, isolated};
use crate::scene::color::ColorDef;
use crate::scene::model::{Actor, ActorKind, Effect, Scene, z_ordered};
use crate::text::shaper::TextShaper;
use serde::{Deserialize, Serialize};

/// Convert typographic points to pixels at 96 DPI.
pub fn pt_to_px(pt: f64) -> f32 {
    (pt * 96.0 / 72.0) as f32
}

/// Fixed caption styling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    /// Font size in points.
    pub size_pt: f64,
    /// Gap between the caption's bottom edge and the canvas bottom, in pixels.
    pub margin_px: f64,
    /// Fill color.
    pub color: ColorDef,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            size_pt: 32.0,
            margin_px: 20.0,
            color: ColorDef::rgba(0.0, 0.0, 0.0, 1.0),
        }
    }
}

/// Typography used by the compositor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorOpts {
    /// Font family for text actors and captions.
    pub text_family: String,
    /// Emoji glyph size in points.
    pub emoji_size_pt: f64,
    /// Text size in points when an actor does not set `fontSize`.
    pub text_size_pt: f64,
    /// Caption styling.
    pub caption: CaptionStyle,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            text_family: "Noto Sans".to_owned(),
            emoji_size_pt: 72.0,
            text_size_pt: 48.0,
            caption: CaptionStyle::default(),
        }
    }
}

/// Draws scenes for one animation.
///
/// Holds no per-frame state: rendering the same scene at the same time always issues the same
/// draw calls.
pub struct Compositor<'a> {
    shaper: &'a mut dyn TextShaper,
    canvas: Canvas,
    emoji_font: &'a str,
    opts: &'a CompositorOpts,
}

impl<'a> Compositor<'a> {
    /// Create a compositor drawing onto canvases of size `canvas`.
    pub fn new(
        shaper: &'a mut dyn TextShaper,
        canvas: Canvas,
        emoji_font: &'a str,
        opts: &'a CompositorOpts,
    ) -> Self {
        Self {
            shaper,
            canvas,
            emoji_font,
            opts,
        }
    }

    /// Draw `scene` at scene-local time `t` (milliseconds).
    pub fn render_scene(
        &mut self,
        surface: &mut dyn DrawSurface,
        scene: &Scene,
        t: f64,
    ) -> KinemojiResult<()> {
        let fade = scene.has_effect(&Effect::FadeIn).then(|| fade_alpha(t));
        isolated(surface, fade, |surface| {
            surface.save();
            let drawn = self.draw_scene_contents(surface, scene, t);
            let restored = surface.restore();
            drawn.and(restored)
        })
    }

    fn draw_scene_contents(
        &mut self,
        surface: &mut dyn DrawSurface,
        scene: &Scene,
        t: f64,
    ) -> KinemojiResult<()> {
        if scene.has_effect(&Effect::Bounce) {
            let lift = bounce_offset(t, self.canvas.height_f64());
            surface.concat(Affine::translate(Vec2::new(0.0, -lift)));
        }

        if let Some(bg) = scene.background_color {
            surface.fill_rect(self.canvas.rect(), bg.to_rgba8());
        }

        for actor in z_ordered(&scene.background_actors)
            .into_iter()
            .chain(z_ordered(&scene.actors))
        {
            self.draw_actor(surface, actor, t)?;
        }

        if let Some(caption) = scene.caption.as_deref().filter(|c| !c.is_empty()) {
            self.draw_caption(surface, caption)?;
        }
        Ok(())
    }

    fn draw_actor(
        &mut self,
        surface: &mut dyn DrawSurface,
        actor: &Actor,
        t: f64,
    ) -> KinemojiResult<()> {
        let pose = ActorPose::resolve(&actor.common, t, self.canvas);
        surface.save();
        surface.concat(pose.transform);
        let drawn = isolated(surface, pose.fade_alpha, |surface| {
            self.draw_actor_body(surface, actor, t)
        });
        let restored = surface.restore();
        drawn.and(restored)
    }

    fn draw_actor_body(
        &mut self,
        surface: &mut dyn DrawSurface,
        actor: &Actor,
        t: f64,
    ) -> KinemojiResult<()> {
        match &actor.kind {
            ActorKind::Emoji { emoji } => {
                let face = self.shaper.resolve_font(self.emoji_font)?;
                if let Err(e) = self.shaper.check_shaping(emoji, &face) {
                    if !e.is_recoverable() {
                        return Err(e);
                    }
                    tracing::warn!(actor = %actor.common.id, error = %e, "emoji shaping check failed");
                }
                let block = self.shaper.layout(
                    emoji,
                    &face,
                    pt_to_px(self.opts.emoji_size_pt),
                    Rgba8::BLACK,
                )?;
                surface.draw_text(&block)
            }
            ActorKind::Text {
                text,
                color,
                font_size,
            } => {
                let face = self.shaper.resolve_font(&self.opts.text_family)?;
                let size = pt_to_px(font_size.unwrap_or(self.opts.text_size_pt));
                let color = color.map_or(Rgba8::BLACK, ColorDef::to_rgba8);
                let block = self.shaper.layout(text, &face, size, color)?;
                surface.draw_text(&block)
            }
            ActorKind::Composite { parts } => {
                for part in parts {
                    self.draw_actor(surface, part, t)?;
                }
                Ok(())
            }
        }
    }

    fn draw_caption(&mut self, surface: &mut dyn DrawSurface, caption: &str) -> KinemojiResult<()> {
        let style = &self.opts.caption;
        let face = self.shaper.resolve_font(&self.opts.text_family)?;
        let block = self.shaper.layout(
            caption,
            &face,
            pt_to_px(style.size_pt),
            style.color.to_rgba8(),
        )?;
        let x = (self.canvas.width_f64() - block.width) / 2.0;
        let y = self.canvas.height_f64() - block.height - style.margin_px;

        surface.save();
        surface.concat(Affine::translate(Vec2::new(x, y)));
        let drawn = surface.draw_text(&block);
        let restored = surface.restore();
        drawn.and(restored)
    }
}

/// Draw `scene` at scene-local time `t` onto `surface`.
pub fn render_scene(
    surface: &mut dyn DrawSurface,
    shaper: &mut dyn TextShaper,
    scene: &Scene,
    t: f64,
    emoji_font: &str,
    opts: &CompositorOpts,
) -> KinemojiResult<()> {
    let canvas = surface.canvas();
    Compositor::new(shaper, canvas, emoji_font, opts).render_scene(surface, scene, t)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
