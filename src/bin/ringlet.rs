use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use ringlet::{ColorDef, Editor, RenderParams, SourceBitmap, export};

#[derive(Parser, Debug)]
#[command(name = "ringlet", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a profile-ring composite PNG from a photo.
    Render(RenderArgs),
    /// Print the default render parameters as JSON.
    Params,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input photo (any raster format `image` decodes; at most 10 MiB and
    /// 4096 px per side).
    #[arg(long)]
    photo: PathBuf,

    /// TTF/OTF font used for the slogan and the caption.
    #[arg(long)]
    font: PathBuf,

    /// Output PNG path. Defaults to a timestamped name in the working
    /// directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Render parameters JSON (see `ringlet params`). Flags below override
    /// individual fields.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Ring color as #RRGGBB.
    #[arg(long)]
    ring_color: Option<String>,

    /// Ring opacity percentage, 0-100.
    #[arg(long)]
    ring_opacity: Option<u8>,

    /// Paint the ring over a full-bleed photo instead of around a circular
    /// crop.
    #[arg(long)]
    overlay: bool,

    /// Slogan text color as #RRGGBB.
    #[arg(long)]
    text_color: Option<String>,

    /// Slogan size in slider units (40 = x1.0).
    #[arg(long)]
    font_scale: Option<u32>,

    /// Disable the secondary caption.
    #[arg(long)]
    no_caption: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Params => cmd_params(),
    }
}

fn cmd_params() -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&RenderParams::default())?;
    println!("{json}");
    Ok(())
}

fn read_params_json(path: &Path) -> anyhow::Result<RenderParams> {
    let f = File::open(path).with_context(|| format!("open params '{}'", path.display()))?;
    let params: RenderParams =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse params JSON")?;
    Ok(params)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut params = match &args.params {
        Some(path) => read_params_json(path)?,
        None => RenderParams::default(),
    };

    if let Some(hex) = &args.ring_color {
        params.ring_color = ColorDef::parse_hex(hex)?;
    }
    if let Some(pct) = args.ring_opacity {
        params.ring_opacity_pct = pct;
    }
    if args.overlay {
        params.overlay_mode = true;
    }
    if let Some(hex) = &args.text_color {
        params.text_color = ColorDef::parse_hex(hex)?;
    }
    if let Some(scale) = args.font_scale {
        params.font_size_multiplier = scale;
    }
    if args.no_caption {
        params.caption.enabled = false;
    }

    let photo_bytes = std::fs::read(&args.photo)
        .with_context(|| format!("read photo '{}'", args.photo.display()))?;
    let bitmap = SourceBitmap::from_encoded_bytes(&photo_bytes)?;

    let font_bytes = std::fs::read(&args.font)
        .with_context(|| format!("read font '{}'", args.font.display()))?;

    let mut editor = Editor::new(font_bytes)?;
    // Load first: loading derives the caption-size baseline and resets the
    // caption size, which must not clobber an explicitly configured value.
    editor.load_bitmap(bitmap)?;
    editor.set_params(params)?;
    let frame = editor
        .render()?
        .context("nothing to render: no photo loaded")?;

    let out = match args.out {
        Some(path) => path,
        None => {
            let epoch_ms = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .context("system clock before unix epoch")?
                .as_millis();
            PathBuf::from(export::suggested_file_name(epoch_ms))
        }
    };

    export::write_png(&frame, &out)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}
