mod logger;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use duplex_core::{
    ImageRef, LayoutSettings, MirrorMode, PairCollection, Side, calculate_statistics,
    is_supported_image,
};
use duplex_export::{ExportFormat, ExportReport, PreparedContent};
use duplex_session::{Session, SessionCommand};
use std::path::{Path, PathBuf};

use crate::logger::CliLogger;

#[derive(Parser)]
#[command(name = "duplex", about = "Duplex sheet-pair printing", version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out pairs and write PDF and/or DOCX documents
    Export {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        settings: SettingsArgs,

        #[command(flatten)]
        edits: EditArgs,

        /// Output file, format taken from the extension (repeatable)
        #[arg(short, long, conflicts_with = "format")]
        output: Vec<PathBuf>,

        /// Output format when no --output is given
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Output path without extension, used with --format
        #[arg(long, default_value = "duplex")]
        output_stem: PathBuf,

        /// Don't open the exported document afterwards
        #[arg(long)]
        no_open: bool,
    },

    /// Show statistics for the pairs
    Stats {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        settings: SettingsArgs,

        #[command(flatten)]
        edits: EditArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the page sequence with placement sizes
    Plan {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        settings: SettingsArgs,

        #[command(flatten)]
        edits: EditArgs,
    },

    /// Write the default settings as JSON
    InitConfig {
        /// Config file to create
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Images in print order: front, back, front, back, ...
    #[arg(conflicts_with = "manifest")]
    images: Vec<PathBuf>,

    /// CSV pair manifest (columns: front, back[, front_mirror, back_mirror])
    #[arg(long)]
    manifest: Option<PathBuf>,
}

#[derive(Args)]
struct SettingsArgs {
    /// Settings JSON file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page margin in cm
    #[arg(long)]
    margin_cm: Option<f32>,

    /// Don't mirror back images automatically
    #[arg(long)]
    no_mirror_backs: bool,

    /// Place images at native size instead of fitting the page
    #[arg(long)]
    no_scale: bool,

    /// Don't crop white or transparent borders
    #[arg(long)]
    no_trim: bool,

    /// Page orientation
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Paper size
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,
}

// Positions are 1-based. Applied in this order: mirrors, pins, side swaps,
// moves, deletions.
#[derive(Args)]
struct EditArgs {
    /// Mirror one image, e.g. 2:back:none (none clears the entry)
    #[arg(long, value_name = "POS:SIDE:MODE", value_parser = parse_mirror_edit)]
    mirror: Vec<MirrorEdit>,

    /// Mirror one image, keeping an explicit none over the automatic back mirror
    #[arg(long, value_name = "POS:SIDE:MODE", value_parser = parse_mirror_edit)]
    pin: Vec<MirrorEdit>,

    /// Exchange front and back of a pair
    #[arg(long, value_name = "POS", value_parser = parse_position)]
    swap_sides: Vec<usize>,

    /// Move a pair
    #[arg(long = "move", value_name = "FROM:TO", value_parser = parse_move)]
    moves: Vec<(usize, usize)>,

    /// Remove a pair
    #[arg(long, value_name = "POS", value_parser = parse_position)]
    delete: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct MirrorEdit {
    position: usize,
    side: Side,
    mode: MirrorMode,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Pdf,
    Docx,
    Both,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl From<OrientationArg> for duplex_core::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl From<PaperArg> for duplex_core::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

/// 1-based position on the command line, 0-based afterwards
fn parse_position(s: &str) -> Result<usize, String> {
    let position: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a pair number"))?;
    if position == 0 {
        return Err("pair numbers start at 1".to_string());
    }
    Ok(position - 1)
}

fn parse_move(s: &str) -> Result<(usize, usize), String> {
    let (from, to) = s
        .split_once(':')
        .ok_or_else(|| format!("'{s}' is not FROM:TO"))?;
    Ok((parse_position(from)?, parse_position(to)?))
}

fn parse_mirror_edit(s: &str) -> Result<MirrorEdit, String> {
    let mut parts = s.splitn(3, ':');
    let (Some(position), Some(side), Some(mode)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("'{s}' is not POS:SIDE:MODE"));
    };
    Ok(MirrorEdit {
        position: parse_position(position)?,
        side: side.parse()?,
        mode: mode.parse()?,
    })
}

impl SettingsArgs {
    async fn resolve(&self) -> Result<LayoutSettings> {
        let mut settings = match &self.config {
            Some(path) => LayoutSettings::load(path)
                .await
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => LayoutSettings::default(),
        };

        if let Some(margin_cm) = self.margin_cm {
            settings.margin_cm = margin_cm;
        }
        if self.no_mirror_backs {
            settings.mirror_backs = false;
        }
        if self.no_scale {
            settings.scale_to_page_width = false;
        }
        if self.no_trim {
            settings.auto_trim = false;
        }
        if let Some(orientation) = self.orientation {
            settings.orientation = orientation.into();
        }
        if let Some(paper) = self.paper {
            settings.paper_size = paper.into();
        }

        settings.validate()?;
        Ok(settings)
    }
}

impl EditArgs {
    fn commands(&self) -> Vec<(String, SessionCommand)> {
        let mut commands = Vec::new();
        for edit in &self.mirror {
            commands.push((
                format!("--mirror {}:{}:{}", edit.position + 1, edit.side, edit.mode),
                SessionCommand::SetMirror {
                    position: edit.position,
                    side: edit.side,
                    mode: edit.mode,
                },
            ));
        }
        for edit in &self.pin {
            commands.push((
                format!("--pin {}:{}:{}", edit.position + 1, edit.side, edit.mode),
                SessionCommand::PinMirror {
                    position: edit.position,
                    side: edit.side,
                    mode: edit.mode,
                },
            ));
        }
        for &position in &self.swap_sides {
            commands.push((
                format!("--swap-sides {}", position + 1),
                SessionCommand::SwapSides { position },
            ));
        }
        for &(from, to) in &self.moves {
            commands.push((
                format!("--move {}:{}", from + 1, to + 1),
                SessionCommand::ReorderPairs { from, to },
            ));
        }
        for &position in &self.delete {
            commands.push((
                format!("--delete {}", position + 1),
                SessionCommand::DeletePair { position },
            ));
        }
        commands
    }

    fn apply(&self, session: &mut Session) -> Result<()> {
        for (flag, command) in self.commands() {
            session
                .apply(command)
                .with_context(|| format!("Cannot apply {flag}"))?;
        }
        Ok(())
    }
}

async fn load_pairs(input: &InputArgs) -> Result<PairCollection> {
    if let Some(manifest) = &input.manifest {
        return duplex_core::load_manifest(manifest)
            .await
            .with_context(|| format!("Failed to load manifest {}", manifest.display()));
    }

    let images: Vec<ImageRef> = input
        .images
        .iter()
        .filter(|path| {
            let supported = is_supported_image(path);
            if !supported {
                log::warn!("Skipping {}: not a supported image type", path.display());
            }
            supported
        })
        .map(|path| ImageRef::from(path.as_path()))
        .collect();
    Ok(PairCollection::from_refs(images))
}

async fn build_session(
    input: &InputArgs,
    settings: &SettingsArgs,
    edits: &EditArgs,
) -> Result<Session> {
    let settings = settings.resolve().await?;
    let pairs = load_pairs(input).await?;
    if pairs.is_empty() {
        bail!("No images to process; give image files or --manifest");
    }

    let mut session = Session::with_pairs(pairs, settings);
    edits.apply(&mut session)?;
    Ok(session)
}

fn export_targets(
    output: &[PathBuf],
    format: Option<FormatArg>,
    output_stem: &Path,
) -> Result<Vec<(PathBuf, ExportFormat)>> {
    if !output.is_empty() {
        return output
            .iter()
            .map(|path| match ExportFormat::from_path(path) {
                Some(format) => Ok((path.clone(), format)),
                None => bail!(
                    "Cannot tell the format of {}; use a .pdf or .docx extension",
                    path.display()
                ),
            })
            .collect();
    }

    let formats: &[ExportFormat] = match format.unwrap_or(FormatArg::Pdf) {
        FormatArg::Pdf => &[ExportFormat::Pdf],
        FormatArg::Docx => &[ExportFormat::Docx],
        FormatArg::Both => &ExportFormat::ALL,
    };
    Ok(formats
        .iter()
        .map(|&format| (output_stem.with_extension(format.extension()), format))
        .collect())
}

fn print_report(report: &ExportReport) {
    println!(
        "Exported {} pages ({} images) → {} [{}]",
        report.pages,
        report.placed_images,
        report.path.display(),
        report.format
    );
}

/// Open a file with the system's default application, best effort
fn open_file(path: &Path) {
    let result = if cfg!(target_os = "windows") {
        std::process::Command::new("cmd")
            .args(["/c", "start", ""])
            .arg(path)
            .spawn()
    } else if cfg!(target_os = "macos") {
        std::process::Command::new("open").arg(path).spawn()
    } else {
        std::process::Command::new("xdg-open").arg(path).spawn()
    };

    match result {
        Ok(_) => log::debug!("Opened {}", path.display()),
        Err(e) => log::warn!("Could not open {}: {}", path.display(), e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let logger = CliLogger::new(cli.debug).init()?;

    match cli.command {
        Commands::Export {
            input,
            settings,
            edits,
            output,
            format,
            output_stem,
            no_open,
        } => {
            let session = build_session(&input, &settings, &edits).await?;
            let targets = export_targets(&output, format, &output_stem)?;
            let snapshot = session.snapshot();
            let auto_open = snapshot.settings.auto_open && !no_open;

            let reports =
                duplex_export::export_all(snapshot.pairs, snapshot.settings, &targets).await?;
            for report in &reports {
                print_report(report);
            }

            if let Some(report) = reports.first() {
                if !report.skipped.is_empty() {
                    let pairs: Vec<String> = report
                        .affected_pairs()
                        .iter()
                        .map(|pair| pair.to_string())
                        .collect();
                    println!(
                        "Warning: {} image(s) could not be loaded and were left blank (pairs {})",
                        report.skipped.len(),
                        pairs.join(", ")
                    );
                }
            }

            if auto_open {
                for report in &reports {
                    open_file(&report.path);
                }
            }
        }

        Commands::Stats {
            input,
            settings,
            edits,
            json,
        } => {
            let session = build_session(&input, &settings, &edits).await?;
            let stats = calculate_statistics(session.pairs(), session.settings());

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Pair Statistics:");
                println!("  Pairs: {}", stats.pairs);
                println!("  Output pages: {}", stats.pages);
                println!("  Blank fronts: {}", stats.blank_fronts);
                println!("  Blank backs: {}", stats.blank_backs);
                println!("  Explicit mirrors: {}", stats.explicit_mirrors);
                println!("  Auto-mirrored backs: {}", stats.auto_mirrored_backs);
            }
        }

        Commands::Plan {
            input,
            settings,
            edits,
        } => {
            let session = build_session(&input, &settings, &edits).await?;
            let entries = duplex_core::sequence(session.pairs(), session.settings());
            let prepared = duplex_export::prepare(session.pairs(), session.settings()).await?;

            let (page_width, page_height) = session.settings().page_dimensions_cm();
            println!(
                "{} pages, {:.2} x {:.2} cm",
                prepared.pages.len(),
                page_width,
                page_height
            );
            for (index, (entry, page)) in entries.iter().zip(&prepared.pages).enumerate() {
                let label = format!("Page {}: pair {} {}", index + 1, page.pair + 1, page.side);
                match (&entry.content, &page.content) {
                    (
                        duplex_core::PageContent::Image { mirror, .. },
                        PreparedContent::Image {
                            reference,
                            placement,
                            ..
                        },
                    ) => println!(
                        "  {label}: {reference} {:.2} x {:.2} cm at ({:.2}, {:.2}) mirror {}",
                        placement.width, placement.height, placement.x, placement.y, mirror
                    ),
                    (duplex_core::PageContent::Image { reference, .. }, PreparedContent::Blank) => {
                        println!("  {label}: blank ({reference} could not be loaded)")
                    }
                    _ => println!("  {label}: blank"),
                }
            }
        }

        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                bail!(
                    "{} already exists; pass --force to overwrite it",
                    path.display()
                );
            }
            LayoutSettings::default().save(&path).await?;
            println!("Wrote default settings → {}", path.display());
        }
    }

    if logger.warning_count() > 0 {
        log::info!("Finished with {} warning(s)", logger.warning_count());
    }

    Ok(())
}
