use crate::animation::track::{ActorStart, Keyframe};
use crate::foundation::error::{KinemojiError, KinemojiResult};
use crate::scene::color::ColorDef;
use crate::session::sequencer::frame_count;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Visual effect attached to an actor or a whole scene.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Effect {
    /// 300 ms linear fade from transparent, composited through an offscreen layer.
    FadeIn,
    /// Periodic upward hop.
    Bounce,
    /// Unrecognized effect name, kept so documents round-trip; it has no visual effect.
    Unknown(String),
}

impl From<String> for Effect {
    fn from(name: String) -> Self {
        match name.as_str() {
            "fade-in" => Self::FadeIn,
            "bounce" => Self::Bounce,
            _ => Self::Unknown(name),
        }
    }
}

impl From<Effect> for String {
    fn from(effect: Effect) -> Self {
        match effect {
            Effect::FadeIn => "fade-in".to_owned(),
            Effect::Bounce => "bounce".to_owned(),
            Effect::Unknown(name) => name,
        }
    }
}

/// Idle loop modifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LoopMode {
    /// Gentle one-second vertical sway.
    Float,
    /// No loop; also used for unrecognized tags.
    #[default]
    Off,
}

impl From<String> for LoopMode {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "float" => Self::Float,
            _ => Self::Off,
        }
    }
}

impl From<LoopMode> for String {
    fn from(mode: LoopMode) -> Self {
        match mode {
            LoopMode::Float => "float".to_owned(),
            LoopMode::Off => "none".to_owned(),
        }
    }
}

/// Fields every actor variant shares.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorCommon {
    /// Author-assigned identifier, used in logs only.
    #[serde(default)]
    pub id: String,
    /// State before the first keyframe.
    #[serde(default)]
    pub start: ActorStart,
    /// Keyframes over x, y, scale and rotate.
    #[serde(default)]
    pub tracks: Vec<Keyframe>,
    /// Actor-level effects.
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// Idle loop modifier.
    #[serde(default, rename = "loop")]
    pub loop_mode: LoopMode,
    /// Layer order within the owning collection; ties keep listed order.
    #[serde(default)]
    pub z: i64,
    /// Mirror horizontally.
    #[serde(default, rename = "flipX")]
    pub flip_x: bool,
    /// Accessibility label carried through from the editor.
    #[serde(default, rename = "ariaLabel", skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
}

impl ActorCommon {
    /// Whether `effect` is attached to this actor.
    pub fn has_effect(&self, effect: &Effect) -> bool {
        self.effects.contains(effect)
    }
}

/// Variant-specific actor payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActorKind {
    /// A single emoji glyph string drawn with the animation's emoji font.
    Emoji {
        /// Glyph string, possibly a multi-codepoint sequence.
        #[serde(default)]
        emoji: String,
    },
    /// Plain text.
    Text {
        /// String to lay out.
        #[serde(default)]
        text: String,
        /// Fill color; black when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<ColorDef>,
        /// Size in points.
        #[serde(default, rename = "fontSize", skip_serializing_if = "Option::is_none")]
        font_size: Option<f64>,
    },
    /// A group of child actors drawn in the parent's coordinate frame.
    Composite {
        /// Children, each animated independently.
        #[serde(default)]
        parts: Vec<Actor>,
    },
}

/// One animatable element of a scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Shared transform/effect fields.
    #[serde(flatten)]
    pub common: ActorCommon,
    /// Variant payload, discriminated by `type`.
    #[serde(flatten)]
    pub kind: ActorKind,
}

impl Actor {
    /// Layer order key.
    pub fn z(&self) -> i64 {
        self.common.z
    }
}

/// Order actors by ascending `z`, keeping listed order among equal keys.
pub fn z_ordered(actors: &[Actor]) -> Vec<&Actor> {
    let mut ordered: Vec<&Actor> = actors.iter().collect();
    ordered.sort_by_key(|a| a.z());
    ordered
}

fn default_duration_ms() -> f64 {
    1000.0
}

/// A time-bounded segment of the animation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Author-assigned identifier.
    #[serde(default)]
    pub id: String,
    /// Wall-clock length in milliseconds.
    #[serde(default = "default_duration_ms")]
    pub duration_ms: f64,
    /// Full-canvas fill drawn before any actor.
    #[serde(default, rename = "backgroundColor", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<ColorDef>,
    /// Caption centered near the bottom edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Scene-level effects.
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// Actors drawn behind the foreground collection.
    #[serde(default, rename = "backgroundActors")]
    pub background_actors: Vec<Actor>,
    /// Foreground actors.
    #[serde(default)]
    pub actors: Vec<Actor>,
}

impl Scene {
    /// Whether `effect` is attached to the scene.
    pub fn has_effect(&self, effect: &Effect) -> bool {
        self.effects.contains(effect)
    }

    /// Number of frames this scene occupies at `fps`.
    pub fn frame_count(&self, fps: u32) -> u64 {
        frame_count(self.duration_ms, fps)
    }
}

fn default_emoji_font() -> String {
    "Noto Color Emoji".to_owned()
}

/// Top-level animation document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    /// Title shown by the editor.
    #[serde(default)]
    pub title: String,
    /// Short summary.
    #[serde(default)]
    pub description: String,
    /// Authoring frame rate. Informational; output fps comes from the render parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    /// Scenes in playback order.
    #[serde(default)]
    pub scenes: Vec<Scene>,
    /// Font family used for emoji actors.
    #[serde(default = "default_emoji_font", rename = "emojiFont")]
    pub emoji_font: String,
}

impl Animation {
    /// Parse an animation from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> KinemojiResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| KinemojiError::serde(format!("parse animation JSON: {e}")))
    }

    /// Parse an animation from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> KinemojiResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            KinemojiError::validation(format!("open animation JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check the invariants rendering relies on.
    pub fn validate(&self) -> KinemojiResult<()> {
        if self.scenes.is_empty() {
            return Err(KinemojiError::validation("animation has no scenes"));
        }
        if self.emoji_font.trim().is_empty() {
            return Err(KinemojiError::validation("emojiFont must not be empty"));
        }
        for (i, scene) in self.scenes.iter().enumerate() {
            if !scene.duration_ms.is_finite() || scene.duration_ms < 0.0 {
                return Err(KinemojiError::validation(format!(
                    "scene {i} ('{}') has invalid duration_ms {}",
                    scene.id, scene.duration_ms
                )));
            }
            for actor in scene.background_actors.iter().chain(&scene.actors) {
                validate_actor(actor)?;
            }
        }
        Ok(())
    }

    /// Sum of scene durations in milliseconds.
    pub fn total_duration_ms(&self) -> f64 {
        self.scenes.iter().map(|s| s.duration_ms).sum()
    }

    /// Total frames the sequencer will emit at `fps`.
    pub fn total_frames(&self, fps: u32) -> u64 {
        self.scenes.iter().map(|s| s.frame_count(fps)).sum()
    }

    /// Locate the scene covering absolute timeline time `time_ms`.
    ///
    /// Returns the scene index and the scene-local time. Times past the end resolve to the last
    /// scene.
    pub fn scene_at(&self, time_ms: f64) -> Option<(usize, f64)> {
        let mut scene_start = 0.0;
        for (i, scene) in self.scenes.iter().enumerate() {
            if time_ms < scene_start + scene.duration_ms {
                return Some((i, (time_ms - scene_start).max(0.0)));
            }
            scene_start += scene.duration_ms;
        }
        let last = self.scenes.len().checked_sub(1)?;
        let last_start = scene_start - self.scenes[last].duration_ms;
        Some((last, (time_ms - last_start).max(0.0)))
    }
}

fn validate_actor(actor: &Actor) -> KinemojiResult<()> {
    let finite = |v: Option<f64>| v.is_none_or(f64::is_finite);
    let start = &actor.common.start;
    if ![start.x, start.y, start.scale, start.rotate]
        .into_iter()
        .all(finite)
    {
        return Err(KinemojiError::validation(format!(
            "actor '{}' has a non-finite start value",
            actor.common.id
        )));
    }
    for key in &actor.common.tracks {
        if !key.t.is_finite() || ![key.x, key.y, key.scale, key.rotate].into_iter().all(finite) {
            return Err(KinemojiError::validation(format!(
                "actor '{}' has a non-finite keyframe at t={}",
                actor.common.id, key.t
            )));
        }
    }
    if let ActorKind::Text {
        font_size: Some(size),
        ..
    } = &actor.kind
        && !(size.is_finite() && *size > 0.0)
    {
        return Err(KinemojiError::validation(format!(
            "text actor '{}' has invalid fontSize {size}",
            actor.common.id
        )));
    }
    if let ActorKind::Composite { parts } = &actor.kind {
        for part in parts {
            validate_actor(part)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
