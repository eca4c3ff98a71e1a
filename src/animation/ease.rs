use serde::{Deserialize, Serialize};

/// Easing curve applied to the raw segment ratio before interpolation.
///
/// Parsed from the tags `linear`, `easeIn`, `easeOut` and `easeInOut`. Any other tag falls back to
/// [`Ease::Linear`] instead of failing the whole animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Ease {
    /// `r`
    #[default]
    Linear,
    /// `r²`
    EaseIn,
    /// `1 − (1−r)²`
    EaseOut,
    /// Quadratic in, then quadratic out around `r = 0.5`.
    EaseInOut,
}

impl Ease {
    /// Map a raw ratio through this curve.
    pub fn apply(self, r: f64) -> f64 {
        match self {
            Self::Linear => r,
            Self::EaseIn => r * r,
            Self::EaseOut => 1.0 - (1.0 - r) * (1.0 - r),
            Self::EaseInOut => {
                if r < 0.5 {
                    2.0 * r * r
                } else {
                    1.0 - (-2.0 * r + 2.0).powi(2) / 2.0
                }
            }
        }
    }

    /// Tag used in animation JSON.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "easeIn",
            Self::EaseOut => "easeOut",
            Self::EaseInOut => "easeInOut",
        }
    }

    /// Parse a tag; unknown tags are linear.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "easeIn" => Self::EaseIn,
            "easeOut" => Self::EaseOut,
            "easeInOut" => Self::EaseInOut,
            _ => Self::Linear,
        }
    }
}

impl From<String> for Ease {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<Ease> for String {
    fn from(ease: Ease) -> Self {
        ease.as_tag().to_owned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
