use crate::foundation::core::RenderParams;
use crate::foundation::error::{KinemojiError, KinemojiResult};
use crate::scene::model::Animation;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// MIME type of rendered videos.
pub const VIDEO_MIME_TYPE: &str = "video/mp4";
/// Suggested download name for rendered videos.
pub const VIDEO_FILE_NAME: &str = "animation.mp4";

/// One render request: an animation plus the output raster parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderJob {
    /// Animation to render.
    pub animation: Animation,
    /// Output size and frame rate.
    pub params: RenderParams,
}

#[derive(Deserialize)]
struct RawJob {
    animation: Animation,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    fps: Option<u32>,
}

impl RenderJob {
    /// Build a job with default render parameters.
    pub fn new(animation: Animation) -> Self {
        Self {
            animation,
            params: RenderParams::default(),
        }
    }

    /// Parse a request body.
    ///
    /// A missing or `null` `animation` field is a validation error; absent `width`, `height`
    /// and `fps` take their defaults.
    pub fn from_value(value: &serde_json::Value) -> KinemojiResult<Self> {
        if value.get("animation").is_none_or(serde_json::Value::is_null) {
            return Err(KinemojiError::validation(
                "request is missing the 'animation' field",
            ));
        }
        let raw = RawJob::deserialize(value)
            .map_err(|e| KinemojiError::serde(format!("parse render request: {e}")))?;
        let defaults = RenderParams::default();
        Ok(Self {
            animation: raw.animation,
            params: RenderParams {
                width: raw.width.unwrap_or(defaults.width),
                height: raw.height.unwrap_or(defaults.height),
                fps: raw.fps.unwrap_or(defaults.fps),
            },
        })
    }

    /// Parse a request body from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> KinemojiResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| KinemojiError::serde(format!("parse render request: {e}")))?;
        Self::from_value(&value)
    }

    /// Parse a request body from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> KinemojiResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            KinemojiError::validation(format!("read render request '{}': {e}", path.display()))
        })?;
        Self::from_slice(&bytes)
    }

    /// Validate the animation and parameters without rendering.
    pub fn validate(&self) -> KinemojiResult<()> {
        self.params.validate()?;
        self.animation.validate()
    }
}

/// A finished video on disk, described the way it is handed back to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoArtifact {
    /// Location of the encoded file.
    pub path: PathBuf,
    /// MIME type to serve it with.
    pub mime_type: &'static str,
    /// Suggested download file name.
    pub file_name: &'static str,
}

impl VideoArtifact {
    /// Describe an MP4 written to `path`.
    pub fn mp4(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mime_type: VIDEO_MIME_TYPE,
            file_name: VIDEO_FILE_NAME,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/job.rs"]
mod tests;
