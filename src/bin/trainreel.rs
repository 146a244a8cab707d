use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use trainreel::{
    CommandSpeechEngine, Fps, GeneratorOpts, Narrator, Pacing, RenderTarget, Scene,
    SpeechOptions, SpeechOutcome, VideoGenerator, VideoScript, VoiceCatalog as _,
};

#[derive(Parser, Debug)]
#[command(name = "trainreel", version, about = "Render synthetic training videos")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one frame of a scene as a PNG.
    Frame(FrameArgs),
    /// Render a scene thumbnail (PNG file, or a data URI on stdout).
    Thumbnail(ThumbnailArgs),
    /// Render every scene into a WebM video (requires `ffmpeg` with libvpx-vp9).
    Render(RenderArgs),
    /// Speak a scene's narration (requires `espeak-ng`).
    Speak(SpeakArgs),
    /// List installed `espeak-ng` voices.
    Voices,
}

#[derive(Args, Debug)]
struct ScriptArgs {
    /// Input video script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Override output width.
    #[arg(long)]
    width: Option<u32>,

    /// Override output height.
    #[arg(long)]
    height: Option<u32>,

    /// Override frames per second.
    #[arg(long)]
    fps: Option<u32>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    script: ScriptArgs,

    /// Scene index (0-based).
    #[arg(long, default_value_t = 0)]
    scene: usize,

    /// Progress within the scene, 0..=1.
    #[arg(long, default_value_t = 0.5)]
    progress: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ThumbnailArgs {
    #[command(flatten)]
    script: ScriptArgs,

    /// Scene index (0-based).
    #[arg(long, default_value_t = 0)]
    scene: usize,

    /// Output PNG path. Prints a data URI when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    script: ScriptArgs,

    /// Output WebM path.
    #[arg(long)]
    out: PathBuf,

    /// Pace frames at the video frame rate instead of rendering as fast as possible.
    #[arg(long)]
    realtime: bool,

    /// Seconds to wait for the encoder to finish after the last frame.
    #[arg(long, default_value_t = 120)]
    finalize_timeout: u64,
}

#[derive(Args, Debug)]
struct SpeakArgs {
    /// Input video script JSON.
    #[arg(long = "in", required_unless_present = "text")]
    in_path: Option<PathBuf>,

    /// Scene index (0-based) whose narration is spoken.
    #[arg(long, default_value_t = 0)]
    scene: usize,

    /// Speak this text instead of a scene narration.
    #[arg(long)]
    text: Option<String>,

    /// Language tag used to pick a voice.
    #[arg(long, default_value = "en-US")]
    lang: String,

    /// Preferred voice name.
    #[arg(long)]
    voice: Option<String>,

    /// Speaking rate (1.0 is normal).
    #[arg(long, default_value_t = 1.0)]
    rate: f32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Thumbnail(args) => cmd_thumbnail(args),
        Command::Render(args) => cmd_render(args),
        Command::Speak(args) => cmd_speak(args),
        Command::Voices => cmd_voices(),
    }
}

fn load_script(args: &ScriptArgs) -> anyhow::Result<VideoScript> {
    let mut script = VideoScript::from_path(&args.in_path)
        .with_context(|| format!("load script '{}'", args.in_path.display()))?;
    if let Some(w) = args.width {
        script.options.width = w;
    }
    if let Some(h) = args.height {
        script.options.height = h;
    }
    if let Some(fps) = args.fps {
        script.options.fps = Fps::whole(fps)?;
    }
    script.validate()?;
    Ok(script)
}

fn pick_scene(script: &VideoScript, index: usize) -> anyhow::Result<&Scene> {
    script.scenes.get(index).with_context(|| {
        format!(
            "scene index {index} out of range (script has {} scenes)",
            script.scenes.len()
        )
    })
}

fn write_png(path: &Path, png: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, png).with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let script = load_script(&args.script)?;
    let scene = pick_scene(&script, args.scene)?;

    let mut renderer = trainreel::SceneRenderer::new(&script.options)?;
    let mut target = RenderTarget::new(script.options.width, script.options.height)?;
    let frame = renderer.render_frame(&mut target, scene, args.progress)?;
    let png = trainreel::render::thumbnail::encode_png(&frame)?;
    write_png(&args.out, &png)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_thumbnail(args: ThumbnailArgs) -> anyhow::Result<()> {
    let script = load_script(&args.script)?;
    let scene = pick_scene(&script, args.scene)?;
    let generator = VideoGenerator::new(script.options.clone(), GeneratorOpts::default())?;
    let uri = generator.generate_thumbnail(scene)?;

    match args.out {
        Some(out) => {
            let png = trainreel::render::thumbnail::decode_png_data_uri(&uri)?;
            write_png(&out, &png)?;
            eprintln!("wrote {}", out.display());
        }
        None => println!("{uri}"),
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let script = load_script(&args.script)?;
    let pacing = if args.realtime {
        Pacing::Realtime
    } else {
        Pacing::Unpaced
    };
    let opts = GeneratorOpts::default()
        .with_pacing(pacing)
        .with_finalize_timeout(Duration::from_secs(args.finalize_timeout));
    let generator = VideoGenerator::new(script.options.clone(), opts)?;

    let blob = generator.generate_video(&script.scenes)?;
    blob.write_to(&args.out)?;

    eprintln!("wrote {} ({} bytes, {})", args.out.display(), blob.len(), blob.mime_type);
    Ok(())
}

fn cmd_speak(args: SpeakArgs) -> anyhow::Result<()> {
    let text = match (&args.text, &args.in_path) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => {
            let script = VideoScript::from_path(path)
                .with_context(|| format!("load script '{}'", path.display()))?;
            pick_scene(&script, args.scene)?.narration.clone()
        }
        (None, None) => anyhow::bail!("either --text or --in is required"),
    };

    let mut opts = SpeechOptions::default()
        .with_language(args.lang)
        .with_rate(args.rate);
    if let Some(voice) = args.voice {
        opts = opts.with_voice(voice);
    }

    match Narrator::espeak().speak(&text, &opts)? {
        SpeechOutcome::Completed => {}
        SpeechOutcome::Cancelled => eprintln!("narration cancelled"),
    }
    Ok(())
}

fn cmd_voices() -> anyhow::Result<()> {
    let engine = CommandSpeechEngine::default();
    for v in engine.voices()? {
        let marker = if v.default { " (default)" } else { "" };
        println!("{:<12} {}{marker}", v.lang, v.name);
    }
    Ok(())
}
