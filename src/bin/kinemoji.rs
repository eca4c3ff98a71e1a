use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "kinemoji", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render the frame shown at a point in time as a PNG.
    Frame(FrameArgs),
    /// Validate a render job and print its timeline.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// Input render job JSON (`{"animation": ..., "width": ..., "height": ..., "fps": ...}`).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Renderer config JSON. Defaults plus environment overrides when absent.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra font directory, scanned before the configured ones. Repeatable.
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Override the job's output width.
    #[arg(long)]
    width: Option<u32>,

    /// Override the job's output height.
    #[arg(long)]
    height: Option<u32>,

    /// Override the job's frame rate.
    #[arg(long)]
    fps: Option<u32>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Absolute timeline time in milliseconds.
    #[arg(long, default_value_t = 0.0)]
    at_ms: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn load_job(args: &CommonArgs) -> anyhow::Result<kinemoji::RenderJob> {
    let mut job = kinemoji::RenderJob::from_path(&args.in_path)
        .with_context(|| format!("load render job '{}'", args.in_path.display()))?;
    if let Some(w) = args.width {
        job.params.width = w;
    }
    if let Some(h) = args.height {
        job.params.height = h;
    }
    if let Some(fps) = args.fps {
        job.params.fps = fps;
    }
    job.validate()?;
    Ok(job)
}

fn load_opts(args: &CommonArgs) -> anyhow::Result<kinemoji::RendererOpts> {
    let mut opts = match &args.config {
        Some(path) => kinemoji::RendererOpts::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?
            .apply_env(),
        None => kinemoji::RendererOpts::from_env(),
    };
    for dir in args.font_dirs.iter().rev() {
        opts = opts.with_font_dir_first(dir.clone());
    }
    Ok(opts)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let job = load_job(&args.common)?;
    let mut renderer = kinemoji::Renderer::init(load_opts(&args.common)?)?;
    let artifact = renderer.render_job(&job, &args.out)?;
    eprintln!(
        "wrote {} ({}, suggested name {})",
        artifact.path.display(),
        artifact.mime_type,
        artifact.file_name
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let job = load_job(&args.common)?;
    let mut renderer = kinemoji::Renderer::init(load_opts(&args.common)?)?;
    let frame = renderer.render_frame(&job, args.at_ms)?;

    kinemoji::encode::ffmpeg::ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.to_rgba8_opaque([0, 0, 0]),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let job = load_job(&args.common)?;
    let anim = &job.animation;
    let fps = job.params.fps;
    println!(
        "{}x{} @ {} fps, emoji font '{}'",
        job.params.width, job.params.height, fps, anim.emoji_font
    );
    for (i, scene) in anim.scenes.iter().enumerate() {
        println!(
            "  scene {i} '{}': {} ms, {} frames, {} background / {} foreground actors",
            scene.id,
            scene.duration_ms,
            scene.frame_count(fps),
            scene.background_actors.len(),
            scene.actors.len()
        );
    }
    println!(
        "total: {} ms, {} frames",
        anim.total_duration_ms(),
        anim.total_frames(fps)
    );
    Ok(())
}
