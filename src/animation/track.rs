use crate::animation::ease::Ease;
use serde::{Deserialize, Serialize};

/// One timestamped key in an actor's track.
///
/// Properties left out keep the most recently defined value. `ease` shapes the segment that
/// starts at this key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Milliseconds since scene start.
    #[serde(default)]
    pub t: f64,
    /// Horizontal position, normalized to canvas width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Vertical position, normalized to canvas height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Uniform scale factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    /// Easing tag for the segment leaving this key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ease: Option<Ease>,
}

/// Initial actor state before the first keyframe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorStart {
    /// Normalized x; defaults to `0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Normalized y; defaults to `0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Scale; defaults to `1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Rotation in degrees; defaults to `0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
}

/// The four animatable actor properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Property {
    /// Normalized x.
    X,
    /// Normalized y.
    Y,
    /// Uniform scale.
    Scale,
    /// Rotation in degrees.
    Rotate,
}

impl Property {
    /// Value used when neither the start state nor any key defines the property.
    pub fn default_value(self) -> f64 {
        match self {
            Self::Scale => 1.0,
            Self::X | Self::Y | Self::Rotate => 0.0,
        }
    }

    fn of_key(self, key: &Keyframe) -> Option<f64> {
        match self {
            Self::X => key.x,
            Self::Y => key.y,
            Self::Scale => key.scale,
            Self::Rotate => key.rotate,
        }
    }

    fn of_start(self, start: &ActorStart) -> Option<f64> {
        match self {
            Self::X => start.x,
            Self::Y => start.y,
            Self::Scale => start.scale,
            Self::Rotate => start.rotate,
        }
    }
}

/// Property values sampled at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sampled {
    /// Normalized x.
    pub x: f64,
    /// Normalized y.
    pub y: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Rotation in degrees.
    pub rotate: f64,
}

/// Sample every property of a track at scene time `t` (milliseconds).
pub fn sample(tracks: &[Keyframe], t: f64, start: &ActorStart) -> Sampled {
    Sampled {
        x: sample_property(tracks, t, start, Property::X),
        y: sample_property(tracks, t, start, Property::Y),
        scale: sample_property(tracks, t, start, Property::Scale),
        rotate: sample_property(tracks, t, start, Property::Rotate),
    }
}

/// Sample one property.
///
/// The start state acts as a linear key at `t = 0`. Keys are scanned in listed order and the
/// first key at or after `t` closes the segment; the segment is shaped by the ease of the point
/// that opens it. Past the last key (or with no keys) the last defined value holds.
pub fn sample_property(tracks: &[Keyframe], t: f64, start: &ActorStart, prop: Property) -> f64 {
    let mut prev_t = 0.0;
    let mut prev_v = prop.of_start(start).unwrap_or(prop.default_value());
    let mut prev_ease = Ease::Linear;

    for key in tracks {
        let kv = prop.of_key(key).unwrap_or(prev_v);
        if t <= key.t {
            if key.t == prev_t {
                return kv;
            }
            let ratio = prev_ease.apply((t - prev_t) / (key.t - prev_t));
            return prev_v + (kv - prev_v) * ratio;
        }
        prev_t = key.t;
        prev_v = kv;
        prev_ease = key.ease.unwrap_or_default();
    }

    prev_v
}

#[cfg(test)]
#[path = "../../tests/unit/animation/track.rs"]
mod tests;
