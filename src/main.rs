use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use installdoc_lib::config::PHOTO_SLOT_COUNT;
use installdoc_lib::intake::RecordDraft;
use installdoc_lib::models::LabelSet;
use installdoc_lib::pipeline::compose::{BuiltinFontProvider, DirectoryFontProvider, FontProvider};
use installdoc_lib::pipeline::submission::SubmissionGenerator;

#[derive(Parser, Debug)]
#[command(name = "installdoc", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an installation record and its photos into a submission PDF.
    Generate(GenerateArgs),
    /// Check that the document fonts can be found and parsed.
    CheckFonts(FontArgs),
}

#[derive(Parser, Debug)]
struct FontArgs {
    /// Font directory (default: ./fonts, then ~/Installdoc/fonts).
    #[arg(long)]
    fonts: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Record JSON (site_address, model_name, ... work_date).
    #[arg(long)]
    record: PathBuf,

    /// Photo for a slot, as `<1-8>=<path>`. Repeatable.
    #[arg(long = "photo", value_parser = parse_photo_arg)]
    photos: Vec<(usize, PathBuf)>,

    #[command(flatten)]
    fonts: FontArgs,

    /// Form wording.
    #[arg(long, default_value = "korean")]
    labels: LabelSet,

    /// Use Helvetica instead of TTF fonts (ASCII text only).
    #[arg(long, default_value_t = false)]
    builtin_fonts: bool,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

fn parse_photo_arg(s: &str) -> Result<(usize, PathBuf), String> {
    let (slot, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected <slot>=<path>, got '{s}'"))?;
    let slot: usize = slot
        .trim()
        .parse()
        .map_err(|_| format!("invalid slot number '{slot}'"))?;
    if !(1..=PHOTO_SLOT_COUNT).contains(&slot) {
        return Err(format!("slot must be 1-{PHOTO_SLOT_COUNT}, got {slot}"));
    }
    Ok((slot, PathBuf::from(path)))
}

fn font_provider(args: &FontArgs) -> DirectoryFontProvider {
    match &args.fonts {
        Some(dir) => DirectoryFontProvider::single(dir),
        None => DirectoryFontProvider::default_locations(),
    }
}

fn main() -> anyhow::Result<()> {
    installdoc_lib::init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::CheckFonts(args) => cmd_check_fonts(args),
    }
}

fn cmd_check_fonts(args: FontArgs) -> anyhow::Result<()> {
    let provider = font_provider(&args);
    provider.check().context("font check failed")?;
    eprintln!("fonts ok");
    Ok(())
}

fn read_photo(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read photo '{}'", path.display()))
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.record)
        .with_context(|| format!("read record '{}'", args.record.display()))?;
    let draft: RecordDraft = serde_json::from_str(&json)
        .with_context(|| format!("parse record '{}'", args.record.display()))?;

    let mut photos: Vec<Option<Vec<u8>>> = vec![None; PHOTO_SLOT_COUNT];
    for (slot, path) in &args.photos {
        photos[slot - 1] = Some(read_photo(path)?);
    }

    let fonts: Box<dyn FontProvider> = if args.builtin_fonts {
        Box::new(BuiltinFontProvider)
    } else {
        Box::new(font_provider(&args.fonts))
    };
    fonts.check().context("font check failed")?;

    let generator = SubmissionGenerator::standard(args.labels, fonts);
    let submission = match generator.generate_from_draft(&draft, &photos) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Generation failed");
            anyhow::bail!(e.user_message());
        }
    };
    for warning in &submission.slot_warnings {
        eprintln!(
            "warning: photo {} ({}) skipped: {}",
            warning.slot + 1,
            warning.caption,
            warning.error
        );
    }

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;
    let out_path = args.out.join(&submission.filename);
    std::fs::write(&out_path, &submission.pdf)
        .with_context(|| format!("write pdf '{}'", out_path.display()))?;

    println!("{}", out_path.display());
    Ok(())
}
