use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use sha2::Digest as _;

use compound_reel::finance::format::money;

#[derive(Parser, Debug)]
#[command(name = "compound-reel", version)]
/// Render an animated explainer of simple versus compound interest.
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the explainer as an MP4 (requires `ffmpeg` on PATH). The default.
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Print the year-by-year simple and compound amounts.
    Table,
    /// Write the explainer composition as JSON.
    Dump(DumpArgs),
}

#[derive(Args, Debug, Default)]
struct CommonArgs {
    /// JSON run configuration; flags below override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Font file for all text (default: a system sans-serif face).
    #[arg(long, global = true)]
    font: Option<PathBuf>,

    /// Initial amount.
    #[arg(long, global = true)]
    principal: Option<f64>,

    /// Annual interest rate as a decimal (0.1 is 10%).
    #[arg(long, global = true)]
    rate: Option<f64>,

    /// Number of yearly periods.
    #[arg(long, global = true)]
    years: Option<u32>,

    #[arg(long, global = true)]
    width: Option<u32>,

    #[arg(long, global = true)]
    height: Option<u32>,

    /// Integer frames per second.
    #[arg(long, global = true)]
    fps: Option<u32>,

    /// Rasterize frames on a thread pool.
    #[arg(long, global = true)]
    parallel: bool,

    /// Worker threads for `--parallel` (default: one per core).
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args, Debug, Default)]
struct RenderArgs {
    /// Output MP4 path (default: from config, else `out/compound_interest.mp4`).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct DumpArgs {
    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.common.verbose);

    let cfg = load_config(&cli.common)?;
    match cli.cmd.unwrap_or(Command::Render(RenderArgs::default())) {
        Command::Render(args) => cmd_render(cfg, args),
        Command::Frame(args) => cmd_frame(&cfg, &args),
        Command::Table => {
            print!("{}", format_table(&cfg.scenario));
            Ok(())
        }
        Command::Dump(args) => cmd_dump(&cfg, &args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn load_config(args: &CommonArgs) -> anyhow::Result<compound_reel::ReelConfig> {
    let mut cfg = match &args.config {
        Some(path) => compound_reel::ReelConfig::load(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => compound_reel::ReelConfig::default(),
    };

    if let Some(font) = &args.font {
        cfg.font_path = Some(font.clone());
    }
    if let Some(p) = args.principal {
        cfg.scenario.principal = p;
    }
    if let Some(r) = args.rate {
        cfg.scenario.rate = r;
    }
    if let Some(n) = args.years {
        cfg.scenario.years = n;
    }
    if let Some(w) = args.width {
        cfg.canvas.width = w;
    }
    if let Some(h) = args.height {
        cfg.canvas.height = h;
    }
    if let Some(fps) = args.fps {
        cfg.fps = fps;
    }
    if args.parallel {
        cfg.threading.parallel = true;
    }
    if args.threads.is_some() {
        cfg.threading.threads = args.threads;
    }

    cfg.validate().context("invalid configuration")?;
    Ok(cfg)
}

/// Resolve the font, lay out the explainer with its metrics and prepare every asset.
fn build(
    cfg: &compound_reel::ReelConfig,
) -> anyhow::Result<(compound_reel::Composition, compound_reel::PreparedAssetStore)> {
    let font = compound_reel::resolve_font(&cfg.font_source()).context("resolve font")?;
    tracing::debug!(
        origin = %font.origin,
        sha256 = %sha256_hex(&font.bytes),
        "using font"
    );

    let mut metrics = compound_reel::TextLayoutEngine::new(&font)?;
    let comp = compound_reel::build_explainer_with(&cfg.scenario, &cfg.style()?, &mut metrics)
        .context("build explainer")?;
    let assets = compound_reel::PreparedAssetStore::prepare(&comp, font)?;
    Ok((comp, assets))
}

fn cmd_render(cfg: compound_reel::ReelConfig, args: RenderArgs) -> anyhow::Result<()> {
    let (comp, assets) = build(&cfg)?;
    let out = args.out.unwrap_or_else(|| cfg.out_path.clone());

    let mut backend = compound_reel::create_backend(compound_reel::BackendKind::Cpu)?;
    let opts = compound_reel::RenderToMp4Opts {
        threading: cfg.threading.clone(),
        ..compound_reel::RenderToMp4Opts::full(&comp)
    };
    let stats =
        compound_reel::render_to_mp4_with_stats(&comp, &out, opts, backend.as_mut(), &assets)
            .with_context(|| format!("render '{}'", out.display()))?;

    tracing::info!(
        frames = stats.frames_total,
        rendered = stats.frames_rendered,
        elided = stats.frames_elided,
        "wrote {}",
        out.display()
    );
    Ok(())
}

fn cmd_frame(cfg: &compound_reel::ReelConfig, args: &FrameArgs) -> anyhow::Result<()> {
    let (comp, assets) = build(cfg)?;
    let mut backend = compound_reel::create_backend(compound_reel::BackendKind::Cpu)?;
    let frame = compound_reel::render_frame(
        &comp,
        compound_reel::FrameIndex(args.frame),
        backend.as_mut(),
        &assets,
    )?;

    ensure_parent(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    tracing::info!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_dump(cfg: &compound_reel::ReelConfig, args: &DumpArgs) -> anyhow::Result<()> {
    let (comp, _) = build(cfg)?;
    ensure_parent(&args.out)?;
    let json = serde_json::to_string_pretty(&comp).context("serialize composition")?;
    std::fs::write(&args.out, json)
        .with_context(|| format!("write composition '{}'", args.out.display()))?;
    tracing::info!(frames = comp.duration.0, "wrote {}", args.out.display());
    Ok(())
}

fn format_table(scenario: &compound_reel::Scenario) -> String {
    let simple = compound_reel::simple_amounts(scenario);
    let compound = compound_reel::compound_amounts(scenario);
    let mut out = format!(
        "{:>4}  {:>14}  {:>14}  {:>14}\n",
        "Year", "Simple", "Compound", "Difference"
    );
    for (s, c) in simple.points().iter().zip(compound.points()) {
        out.push_str(&format!(
            "{:>4}  {:>14}  {:>14}  {:>14}\n",
            s.period,
            money(s.amount),
            money(c.amount),
            money(c.amount - s.amount)
        ));
    }
    out.push_str(&format!(
        "Compound interest earned: {}\n",
        money(compound_reel::compound_interest(scenario))
    ));
    out
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
