//! Kinemoji renders keyframed emoji and text animations to video.
//!
//! An [`Animation`] is a sequence of timed scenes, each holding z-ordered actors (emoji, text or
//! nested composites) with keyframed position, scale and rotation plus a few effects. Rendering
//! is deterministic and strictly sequential:
//!
//! - Parse a [`RenderJob`] and create a [`Renderer`] (the font registration step)
//! - Stream every frame into a [`FrameSink`], such as the `ffmpeg`-backed [`FfmpegSink`]
//! - Or render a single preview frame at any point of the timeline
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
/// Encoding sinks.
pub mod encode;
pub(crate) mod render;
pub(crate) mod scene;
/// Job parsing, sequencing and the renderer entry point.
pub mod session;
pub(crate) mod text;

pub use crate::foundation::core::{Affine, Canvas, FrameIndex, Point, Rect, RenderParams, Rgba8, Vec2};
pub use crate::foundation::error::{KinemojiError, KinemojiResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::motion::ActorPose;
pub use crate::animation::track::{ActorStart, Keyframe, Property, Sampled, sample, sample_property};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::compositor::{CaptionStyle, Compositor, CompositorOpts, render_scene};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::frame::FrameBGRA;
pub use crate::render::surface::{DrawSurface, isolated};
pub use crate::scene::color::ColorDef;
pub use crate::scene::model::{Actor, ActorCommon, ActorKind, Animation, Effect, LoopMode, Scene};
pub use crate::session::job::{RenderJob, VideoArtifact};
pub use crate::session::renderer::{Renderer, RendererOpts, render_request};
pub use crate::session::sequencer::{
    RenderStats, frame_count, render_animation, render_frame_at, scene_time_ms,
};
pub use crate::text::registry::{FontRegistry, FontResolver};
pub use crate::text::shaper::{FontFace, GlyphRunBlock, ParleyShaper, TextBlock, TextShaper};
