use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use dotmosaic::render::BACKGROUND_COLOR;
use dotmosaic::{
    CanvasDriver, Composed, FrameRGBA, FsImageLoader, HostEnvironment, ManualFrameClock,
    MosaicOptions, MosaicSession, SampleCache, SvgScene, SystemCapabilities,
};

#[derive(Parser, Debug)]
#[command(name = "dotmosaic", version)]
struct Cli {
    /// Log debug events to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one canvas frame as a PNG.
    Frame(FrameArgs),
    /// Render a PNG sequence with a fixed-step frame clock.
    Frames(FramesArgs),
    /// Write the declarative SVG scene.
    Svg(SvgArgs),
    /// Dump the composed runtime dots as JSON.
    Dots(DotsArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Options JSON. Image paths resolve relative to its directory.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Image source, overriding the options file.
    #[arg(long)]
    src: Option<String>,

    /// Device pixel ratio for raster output.
    #[arg(long, default_value_t = 1.0)]
    device_pixel_ratio: f64,

    /// Behave as if the platform prefers reduced motion.
    #[arg(long)]
    prefers_reduced_motion: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Frame timestamp in milliseconds.
    #[arg(long, default_value_t = 0.0)]
    time_ms: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Number of frames.
    #[arg(long, default_value_t = 60)]
    count: u32,

    /// Frames per second of the clock.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Output directory for `frame_NNNNN.png`.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct SvgArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,

    /// Also rasterize a static preview PNG.
    #[arg(long)]
    preview: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct DotsArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output JSON path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Svg(args) => cmd_svg(args),
        Command::Dots(args) => cmd_dots(args),
    }
}

/// Split `src` into a loader root and a relative source.
fn loader_root(common: &CommonArgs, src: Option<&str>) -> (PathBuf, Option<String>) {
    let base = common
        .options
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    match src {
        Some(s) if Path::new(s).is_absolute() => {
            let path = Path::new(s);
            let root = path.parent().map(Path::to_path_buf).unwrap_or(base);
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            (root, name)
        }
        other => (base, other.map(str::to_owned)),
    }
}

fn load_session(
    common: &CommonArgs,
) -> anyhow::Result<(MosaicSession<FsImageLoader>, Composed)> {
    let mut options = match &common.options {
        Some(path) => MosaicOptions::from_path(path)
            .with_context(|| format!("load options '{}'", path.display()))?,
        None => MosaicOptions::default(),
    };
    if let Some(src) = &common.src {
        options.src = Some(src.clone());
    }

    let (root, src) = loader_root(common, options.src.as_deref());
    options.src = src;

    let env = HostEnvironment {
        prefers_reduced_motion: common.prefers_reduced_motion,
        device_pixel_ratio: common.device_pixel_ratio,
        ..HostEnvironment::from_provider(&SystemCapabilities)
    };
    let session = MosaicSession::new(FsImageLoader::new(root), SampleCache::shared(), options, env)
        .context("resolve options")?;

    pollster::block_on(session.load());
    let composed = session.compose();
    if composed.errored {
        eprintln!("warning: image could not be sampled, rendering fallback grid");
    }
    Ok((session, composed))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn write_png(path: &Path, frame: &FrameRGBA) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let rgba = frame.flatten(BACKGROUND_COLOR)?;
    image::save_buffer_with_format(
        path,
        &rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn canvas_driver(
    session: &MosaicSession<FsImageLoader>,
    composed: Composed,
) -> anyhow::Result<CanvasDriver<ManualFrameClock>> {
    let mut driver = CanvasDriver::new(
        composed.dots,
        session.resolved().canvas_config(),
        ManualFrameClock::default(),
    )?;
    driver.set_loading(composed.loading);
    Ok(driver)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (session, composed) = load_session(&args.common)?;
    let mut driver = canvas_driver(&session, composed)?;
    let frame = driver.render_at(args.time_ms)?;
    write_png(&args.out, frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        anyhow::bail!("fps must be > 0");
    }
    let (session, composed) = load_session(&args.common)?;
    let mut driver = canvas_driver(&session, composed)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let step_ms = 1000.0 / args.fps;
    driver.start(0.0)?;
    for i in 0..args.count {
        if i > 0 {
            driver.tick(step_ms)?;
        }
        let frame = driver
            .frame()
            .context("canvas driver produced no frame")?;
        write_png(&args.out_dir.join(format!("frame_{i:05}.png")), frame)?;
    }
    driver.stop();

    eprintln!(
        "wrote {} frames ({} drawn) to {}",
        args.count,
        driver.frames_drawn(),
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_svg(args: SvgArgs) -> anyhow::Result<()> {
    let (session, composed) = load_session(&args.common)?;
    let mut scene = SvgScene::new(composed.dots, session.resolved().svg_config());
    scene.set_loading(composed.loading);

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, scene.to_svg_string())
        .with_context(|| format!("write svg '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());

    if let Some(preview) = &args.preview {
        let frame = scene.rasterize(args.common.device_pixel_ratio)?;
        write_png(preview, &frame)?;
        eprintln!("wrote {}", preview.display());
    }
    Ok(())
}

fn cmd_dots(args: DotsArgs) -> anyhow::Result<()> {
    let (session, composed) = load_session(&args.common)?;
    let resolved = session.resolved();
    let doc = serde_json::json!({
        "gridSize": resolved.grid_size,
        "renderer": composed.renderer,
        "errored": composed.errored,
        "dots": &*composed.dots,
    });
    let text = serde_json::to_string_pretty(&doc).context("serialize dots")?;

    match &args.out {
        Some(path) => {
            ensure_parent(path)?;
            std::fs::write(path, text)
                .with_context(|| format!("write dots '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
