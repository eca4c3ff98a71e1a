use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{KinemojiError, KinemojiResult};
use crate::render::frame::{FrameBGRA, flatten_premul_over_bg};
use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Where the finished `.mp4` is written.
    pub out_path: PathBuf,
    /// Replace `out_path` when it already exists.
    pub overwrite: bool,
    /// Opaque color that transparent pixels are composited over (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Options writing to `out_path`, overwriting, over a black background.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// An `ffmpeg` child process fed opaque BGRA frames on stdin.
struct Encoder {
    child: Child,
    frames_in: ChildStdin,
    log_reader: JoinHandle<std::io::Result<Vec<u8>>>,
}

impl Encoder {
    fn spawn(mut cmd: Command) -> KinemojiResult<Self> {
        let mut child = cmd
            .spawn()
            .map_err(|e| KinemojiError::encode(format!("could not start ffmpeg: {e}")))?;
        let frames_in = child
            .stdin
            .take()
            .ok_or_else(|| KinemojiError::encode("ffmpeg was started without a stdin pipe"))?;
        let mut log = child
            .stderr
            .take()
            .ok_or_else(|| KinemojiError::encode("ffmpeg was started without a stderr pipe"))?;
        // ffmpeg blocks once its stderr pipe fills, so the log is read concurrently.
        let log_reader = std::thread::spawn(move || {
            let mut buf = Vec::new();
            log.read_to_end(&mut buf)?;
            Ok(buf)
        });
        Ok(Self {
            child,
            frames_in,
            log_reader,
        })
    }

    /// Close stdin, wait for exit and return ffmpeg's log when it failed.
    fn finish(self) -> KinemojiResult<()> {
        let Self {
            mut child,
            frames_in,
            log_reader,
        } = self;
        drop(frames_in);
        let status = child
            .wait()
            .map_err(|e| KinemojiError::encode(format!("waiting on ffmpeg: {e}")))?;
        let log = collect_log(log_reader)?;
        if status.success() {
            return Ok(());
        }
        Err(KinemojiError::encode(format!(
            "ffmpeg failed ({status}): {}",
            String::from_utf8_lossy(&log).trim()
        )))
    }

    fn kill(self) {
        let Self {
            mut child,
            frames_in,
            log_reader,
        } = self;
        drop(frames_in);
        let _ = child.kill();
        let _ = child.wait();
        let _ = collect_log(log_reader);
    }
}

fn collect_log(reader: JoinHandle<std::io::Result<Vec<u8>>>) -> KinemojiResult<Vec<u8>> {
    reader
        .join()
        .map_err(|_| KinemojiError::encode("ffmpeg log reader panicked"))?
        .map_err(|e| KinemojiError::encode(format!("reading ffmpeg log: {e}")))
}

/// Stream state between `begin` and `end`.
struct Stream {
    encoder: Encoder,
    cfg: SinkConfig,
    flat: Vec<u8>,
    last_idx: Option<FrameIndex>,
}

/// [`FrameSink`] that encodes to H.264 MP4 through the system `ffmpeg`.
///
/// Frames are written synchronously to ffmpeg's stdin, so a slow encoder throttles rendering.
/// [`FrameSink::abort`] kills ffmpeg and deletes the partial file.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    stream: Option<Stream>,
}

impl FfmpegSink {
    /// Sink writing to `opts.out_path`. Nothing is spawned until `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self { opts, stream: None }
    }

    fn encoder_command(&self, cfg: SinkConfig) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });
        cmd.args(["-loglevel", "error"]);
        cmd.args(["-f", "rawvideo", "-pix_fmt", "bgra"]);
        cmd.arg("-s").arg(format!("{}x{}", cfg.width, cfg.height));
        cmd.arg("-r").arg(cfg.fps.to_string());
        cmd.args(["-i", "pipe:0", "-an"]);
        cmd.args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart"]);
        cmd.arg(&self.opts.out_path);
        cmd
    }

    fn remove_partial(&self) {
        let out = &self.opts.out_path;
        if out.exists()
            && let Err(e) = std::fs::remove_file(out)
        {
            tracing::warn!(out = %out.display(), error = %e, "could not delete partial video");
        }
    }
}

fn check_config(cfg: SinkConfig) -> KinemojiResult<()> {
    if cfg.fps == 0 {
        return Err(KinemojiError::validation("encoder fps must be at least 1"));
    }
    if cfg.width == 0 || cfg.height == 0 {
        return Err(KinemojiError::validation(format!(
            "cannot encode an empty {}x{} video",
            cfg.width, cfg.height
        )));
    }
    // yuv420p subsamples chroma 2x2.
    if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
        return Err(KinemojiError::validation(format!(
            "video size {}x{} must be even in both dimensions",
            cfg.width, cfg.height
        )));
    }
    Ok(())
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> KinemojiResult<()> {
        check_config(cfg)?;
        if self.stream.is_some() {
            return Err(KinemojiError::encode("encoder stream already open"));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(KinemojiError::validation(format!(
                "refusing to replace existing '{}'",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(KinemojiError::encode("ffmpeg not found on PATH"));
        }

        let encoder = Encoder::spawn(self.encoder_command(cfg))?;
        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps,
            "encoder started"
        );
        self.stream = Some(Stream {
            encoder,
            cfg,
            flat: vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4],
            last_idx: None,
        });
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameBGRA) -> KinemojiResult<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| KinemojiError::encode("push_frame before begin"))?;
        if let Some(last) = stream.last_idx
            && idx <= last
        {
            return Err(KinemojiError::encode(format!(
                "frame {} arrived after frame {}",
                idx.0, last.0
            )));
        }
        if frame.width != stream.cfg.width
            || frame.height != stream.cfg.height
            || frame.data.len() != stream.flat.len()
        {
            return Err(KinemojiError::validation(format!(
                "frame is {}x{} ({} bytes), stream is {}x{}",
                frame.width,
                frame.height,
                frame.data.len(),
                stream.cfg.width,
                stream.cfg.height
            )));
        }

        let [r, g, b, _] = self.opts.bg_rgba;
        flatten_premul_over_bg(&mut stream.flat, &frame.data, [b, g, r]);
        stream
            .encoder
            .frames_in
            .write_all(&stream.flat)
            .map_err(|e| KinemojiError::encode(format!("writing frame {} to ffmpeg: {e}", idx.0)))?;
        stream.last_idx = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> KinemojiResult<()> {
        let stream = self
            .stream
            .take()
            .ok_or_else(|| KinemojiError::encode("end before begin"))?;
        let finished = stream.encoder.finish();
        if finished.is_err() {
            self.remove_partial();
        }
        finished
    }

    fn abort(&mut self) {
        let Some(stream) = self.stream.take() else {
            return;
        };
        stream.encoder.kill();
        self.remove_partial();
    }
}

/// Create the directory that will hold `path`, if any.
pub fn ensure_parent_dir(path: &Path) -> KinemojiResult<()> {
    use anyhow::Context as _;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Whether `ffmpeg -version` runs successfully.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
