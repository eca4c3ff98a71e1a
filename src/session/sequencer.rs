use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, RenderParams};
use crate::foundation::error::{KinemojiError, KinemojiResult};
use crate::render::compositor::{Compositor, CompositorOpts};
use crate::render::cpu::CpuSurface;
use crate::render::frame::FrameBGRA;
use crate::scene::model::Animation;
use crate::text::shaper::TextShaper;

/// Frames a scene of `duration_ms` occupies at `fps`: `floor(fps * duration / 1000)`, at least 1.
pub fn frame_count(duration_ms: f64, fps: u32) -> u64 {
    let n = (f64::from(fps) * duration_ms / 1000.0).floor();
    if n.is_finite() && n >= 1.0 { n as u64 } else { 1 }
}

/// Scene-local time in milliseconds of frame `frame` at `fps`.
pub fn scene_time_ms(frame: u64, fps: u32) -> f64 {
    frame as f64 * 1000.0 / f64::from(fps)
}

/// Whole-animation render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Scenes rendered.
    pub scenes: usize,
    /// Frames pushed to the sink.
    pub frames_total: u64,
}

/// Render every scene of `animation` in order and stream the frames into `sink`.
///
/// Each frame is drawn on a freshly allocated surface and pushed before the next one is drawn,
/// so a blocking sink throttles rendering. The sink is finalized with `end` before returning;
/// on any failure after `begin` it is aborted instead.
#[tracing::instrument(
    skip_all,
    fields(
        scenes = animation.scenes.len(),
        width = params.width,
        height = params.height,
        fps = params.fps
    )
)]
pub fn render_animation(
    animation: &Animation,
    params: RenderParams,
    opts: &CompositorOpts,
    shaper: &mut dyn TextShaper,
    sink: &mut dyn FrameSink,
) -> KinemojiResult<RenderStats> {
    params.validate()?;
    animation.validate()?;

    sink.begin(SinkConfig {
        width: params.width,
        height: params.height,
        fps: params.fps,
    })?;

    let stats = match render_frames(animation, params, opts, shaper, sink) {
        Ok(stats) => stats,
        Err(e) => {
            sink.abort();
            return Err(e);
        }
    };
    if let Err(e) = sink.end() {
        sink.abort();
        return Err(e);
    }
    Ok(stats)
}

fn render_frames(
    animation: &Animation,
    params: RenderParams,
    opts: &CompositorOpts,
    shaper: &mut dyn TextShaper,
    sink: &mut dyn FrameSink,
) -> KinemojiResult<RenderStats> {
    let canvas = params.canvas();
    let mut compositor = Compositor::new(shaper, canvas, &animation.emoji_font, opts);
    let mut next = 0u64;

    for (i, scene) in animation.scenes.iter().enumerate() {
        let frames = scene.frame_count(params.fps);
        tracing::debug!(scene = i, id = %scene.id, frames, "rendering scene");
        for frame in 0..frames {
            let t = scene_time_ms(frame, params.fps);
            let mut surface = CpuSurface::new(canvas)?;
            compositor.render_scene(&mut surface, scene, t)?;
            sink.push_frame(FrameIndex(next), &surface.finish()?)?;
            next += 1;
        }
    }

    Ok(RenderStats {
        scenes: animation.scenes.len(),
        frames_total: next,
    })
}

/// Render the single frame shown at absolute timeline time `time_ms`.
pub fn render_frame_at(
    animation: &Animation,
    params: RenderParams,
    opts: &CompositorOpts,
    shaper: &mut dyn TextShaper,
    time_ms: f64,
) -> KinemojiResult<FrameBGRA> {
    params.validate()?;
    animation.validate()?;
    if !time_ms.is_finite() || time_ms < 0.0 {
        return Err(KinemojiError::validation(format!(
            "preview time must be finite and >= 0, got {time_ms}"
        )));
    }
    let (index, t) = animation
        .scene_at(time_ms)
        .ok_or_else(|| KinemojiError::validation("animation has no scenes"))?;

    let canvas = params.canvas();
    let mut surface = CpuSurface::new(canvas)?;
    Compositor::new(shaper, canvas, &animation.emoji_font, opts).render_scene(
        &mut surface,
        &animation.scenes[index],
        t,
    )?;
    surface.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/session/sequencer.rs"]
mod tests;
