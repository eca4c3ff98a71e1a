use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::FrameSink;
use crate::foundation::error::{KinemojiError, KinemojiResult};
use crate::render::compositor::{CaptionStyle, CompositorOpts};
use crate::render::frame::FrameBGRA;
use crate::session::job::{RenderJob, VideoArtifact};
use crate::session::sequencer::{RenderStats, render_animation, render_frame_at};
use crate::text::registry::FontRegistry;
use crate::text::shaper::{ParleyShaper, TextShaper};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`RendererOpts::font_dirs`] (a platform path list).
pub const ENV_FONT_DIRS: &str = "KINEMOJI_FONT_DIRS";
/// Environment variable overriding [`CompositorOpts::text_family`].
pub const ENV_TEXT_FAMILY: &str = "KINEMOJI_TEXT_FAMILY";

/// Renderer configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererOpts {
    /// Directories scanned for fonts at initialisation, highest priority first.
    pub font_dirs: Vec<PathBuf>,
    /// Typography.
    #[serde(flatten)]
    pub compositor: CompositorOpts,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            font_dirs: vec![
                PathBuf::from("fonts"),
                PathBuf::from("/usr/share/fonts"),
                PathBuf::from("/usr/local/share/fonts"),
            ],
            compositor: CompositorOpts::default(),
        }
    }
}

impl RendererOpts {
    /// Load options from a JSON file. Missing keys keep their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> KinemojiResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            KinemojiError::validation(format!("read renderer config '{}': {e}", path.display()))
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|e| KinemojiError::serde(format!("parse renderer config: {e}")))
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Apply `KINEMOJI_FONT_DIRS` and `KINEMOJI_TEXT_FAMILY` when set.
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dirs) = lookup(ENV_FONT_DIRS).filter(|v| !v.is_empty()) {
            self.font_dirs = std::env::split_paths(&dirs).collect();
        }
        if let Some(family) = lookup(ENV_TEXT_FAMILY).filter(|v| !v.trim().is_empty()) {
            self.compositor.text_family = family;
        }
        self
    }

    /// Replace the font directories.
    pub fn with_font_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.font_dirs = dirs;
        self
    }

    /// Scan `dir` before the configured directories.
    pub fn with_font_dir_first(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.insert(0, dir.into());
        self
    }

    /// Set the text and caption font family.
    pub fn with_text_family(mut self, family: impl Into<String>) -> Self {
        self.compositor.text_family = family.into();
        self
    }

    /// Set the caption style.
    pub fn with_caption(mut self, caption: CaptionStyle) -> Self {
        self.compositor.caption = caption;
        self
    }
}

/// Long-lived renderer.
///
/// Construction is the explicit font registration step: directories are scanned once in
/// [`Renderer::init`], and every later job reuses the registry and loaded fonts.
pub struct Renderer {
    opts: RendererOpts,
    shaper: ParleyShaper<FontRegistry>,
}

impl Renderer {
    /// Scan the configured font directories and build a renderer.
    pub fn init(opts: RendererOpts) -> KinemojiResult<Self> {
        let registry = FontRegistry::init(&opts.font_dirs)?;
        tracing::info!(families = registry.len(), "fonts registered");
        Ok(Self::with_registry(opts, registry))
    }

    /// Build a renderer over an already populated registry.
    pub fn with_registry(opts: RendererOpts, registry: FontRegistry) -> Self {
        Self {
            opts,
            shaper: ParleyShaper::new(registry),
        }
    }

    /// Active options.
    pub fn opts(&self) -> &RendererOpts {
        &self.opts
    }

    /// Registered fonts.
    pub fn registry(&self) -> &FontRegistry {
        self.shaper.resolver()
    }

    /// Render `job` to an MP4 at `out_path` using the system `ffmpeg`.
    #[tracing::instrument(skip_all, fields(out = %out_path.display()))]
    pub fn render_job(&mut self, job: &RenderJob, out_path: &Path) -> KinemojiResult<VideoArtifact> {
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out_path));
        let stats = self.render_job_to_sink(job, &mut sink)?;
        tracing::info!(
            scenes = stats.scenes,
            frames = stats.frames_total,
            "render complete"
        );
        Ok(VideoArtifact::mp4(out_path))
    }

    /// Render `job` into an arbitrary sink.
    pub fn render_job_to_sink(
        &mut self,
        job: &RenderJob,
        sink: &mut dyn FrameSink,
    ) -> KinemojiResult<RenderStats> {
        render_animation(
            &job.animation,
            job.params,
            &self.opts.compositor,
            &mut self.shaper,
            sink,
        )
    }

    /// Render the single frame shown at absolute time `time_ms`.
    pub fn render_frame(&mut self, job: &RenderJob, time_ms: f64) -> KinemojiResult<FrameBGRA> {
        render_frame_at(
            &job.animation,
            job.params,
            &self.opts.compositor,
            &mut self.shaper,
            time_ms,
        )
    }

    /// Parse a raw request body and render it into `sink`.
    pub fn render_request(
        &mut self,
        request: &serde_json::Value,
        sink: &mut dyn FrameSink,
    ) -> KinemojiResult<RenderStats> {
        render_request(request, &self.opts.compositor, &mut self.shaper, sink)
    }
}

/// Parse a raw request body and render it into `sink`.
///
/// Requests without an `animation` are rejected before the sink or the shaper is touched.
pub fn render_request(
    request: &serde_json::Value,
    opts: &CompositorOpts,
    shaper: &mut dyn TextShaper,
    sink: &mut dyn FrameSink,
) -> KinemojiResult<RenderStats> {
    let job = RenderJob::from_value(request)?;
    render_animation(&job.animation, job.params, opts, shaper, sink)
}

#[cfg(test)]
#[path = "../../tests/unit/session/renderer.rs"]
mod tests;
