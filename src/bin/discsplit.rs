use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use discsplit::{
    ChapterSelector, Diagnostic, DiscLayout, DiscTitles, EndpointPolicy, FrameSequence,
    LegacyEndpoint, PackedEndpoint, SourceFrames, SplitOptions, TitleSlice,
    compute_chapter_offsets,
};
use serde_json::{Value, json};

const CLI_AFTER_HELP: &str = "Examples:\n  discsplit chapters layout.json --json\n  discsplit split layout.json --safe-indices\n  discsplit title layout.json --title 0 --chapters 2:4\n  discsplit title layout.json --chapters 0,-1 --json\n  discsplit completions zsh > _discsplit";

#[derive(Debug, Parser)]
#[command(
    name = "discsplit",
    version,
    about = "Frame-accurate DVD title and chapter ranges from IFO timing and indexer output",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Trim chapters that run past the decoded frames.
    #[arg(long, global = true)]
    safe_indices: bool,

    /// Where trimmed titles end (packed, legacy).
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Use this menu length instead of estimating it from the index.
    #[arg(long, global = true)]
    menu_length: Option<u64>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print per-title chapter offsets and the disc frame rate.
    #[command(
        about = "Print IFO chapter offsets",
        after_help = "Examples:\n  discsplit chapters layout.json\n  discsplit chapters layout.json --json"
    )]
    Chapters {
        /// Disc layout JSON file.
        layout: PathBuf,

        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Split the disc into titles and print their frame spans.
    #[command(
        about = "Split the decoded stream into titles",
        after_help = "Examples:\n  discsplit split layout.json\n  discsplit split layout.json --safe-indices --json"
    )]
    Split {
        /// Disc layout JSON file.
        layout: PathBuf,

        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Resolve chapters of a title to source frame ranges.
    #[command(
        about = "Resolve a chapter selection",
        after_help = "Examples:\n  discsplit title layout.json --title 1 --chapters 3\n  discsplit title layout.json --chapters :-1"
    )]
    Title {
        /// Disc layout JSON file.
        layout: PathBuf,

        /// Title index; negative counts from the end. Omit for the joined disc.
        #[arg(long, allow_hyphen_values = true)]
        title: Option<i64>,

        /// Chapter selector: `3`, `-1`, `1:3`, `:2`, `2:` or a comma list.
        #[arg(long, allow_hyphen_values = true)]
        chapters: Option<String>,

        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_endpoint_policy(value: &str) -> Option<Arc<dyn EndpointPolicy>> {
    match value.to_ascii_lowercase().as_str() {
        "packed" | "default" => Some(Arc::new(PackedEndpoint)),
        "legacy" => Some(Arc::new(LegacyEndpoint)),
        _ => None,
    }
}

fn split_options(global: &GlobalOptions) -> Result<SplitOptions, Box<dyn std::error::Error>> {
    let mut options = SplitOptions::new()
        .with_safe_indices(global.safe_indices)
        .with_menu_length(global.menu_length);

    if let Some(endpoint) = &global.endpoint {
        let policy = parse_endpoint_policy(endpoint)
            .ok_or(format!("unsupported --endpoint: {endpoint}"))?;
        options = options.with_endpoint_policy(policy);
    }

    Ok(options)
}

fn open_disc(
    layout: &Path,
    global: &GlobalOptions,
) -> Result<DiscTitles<SourceFrames>, Box<dyn std::error::Error>> {
    let layout = DiscLayout::from_path(layout)?;
    let info = Arc::new(compute_chapter_offsets(&layout.ifos)?);
    Ok(DiscTitles::new(
        info,
        &layout.index,
        SourceFrames::new(layout.total_frames),
        split_options(global)?,
    ))
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic {
            Diagnostic::ChapterOverrun {
                chapter_end,
                total_frames,
            } => eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!(
                    "chapters end at frame {chapter_end} but only {total_frames} frames were \
                     decoded; the last chapters may not resolve (try --safe-indices)"
                )
                .yellow()
            ),
            Diagnostic::Reconciled {
                chapter_end,
                trimmed_end,
            } => eprintln!(
                "{} {}",
                "note:".cyan().bold(),
                format!("chapters trimmed from {chapter_end} to {trimmed_end} frames").cyan()
            ),
        }
    }
}

fn diagnostics_json(diagnostics: &[Diagnostic]) -> Vec<Value> {
    diagnostics
        .iter()
        .map(|diagnostic| match diagnostic {
            Diagnostic::ChapterOverrun {
                chapter_end,
                total_frames,
            } => json!({
                "kind": "chapter_overrun",
                "chapter_end": chapter_end,
                "total_frames": total_frames,
            }),
            Diagnostic::Reconciled {
                chapter_end,
                trimmed_end,
            } => json!({
                "kind": "reconciled",
                "chapter_end": chapter_end,
                "trimmed_end": trimmed_end,
            }),
        })
        .collect()
}

fn ranges_json(frames: &SourceFrames) -> Value {
    frames
        .ranges()
        .iter()
        .map(|range| json!([range.start, range.end]))
        .collect()
}

fn format_ranges(frames: &SourceFrames) -> String {
    if frames.ranges().is_empty() {
        return "(empty)".dimmed().to_string();
    }
    frames
        .ranges()
        .iter()
        .map(|range| format!("[{}, {})", range.start, range.end))
        .collect::<Vec<_>>()
        .join(" + ")
}

fn slice_json(slice: &TitleSlice<SourceFrames>) -> Value {
    match slice {
        TitleSlice::Clip(frames) => json!({
            "frame_count": frames.frame_count(),
            "source_ranges": ranges_json(frames),
        }),
        TitleSlice::List(slices) => Value::Array(slices.iter().map(slice_json).collect()),
    }
}

fn print_slice(slice: &TitleSlice<SourceFrames>, depth: usize) {
    let indent = "  ".repeat(depth);
    match slice {
        TitleSlice::Clip(frames) => println!(
            "{indent}{} frames: {}",
            frames.frame_count(),
            format_ranges(frames)
        ),
        TitleSlice::List(slices) => {
            for (position, slice) in slices.iter().enumerate() {
                println!("{indent}{}", format!("#{position}").bold());
                print_slice(slice, depth + 1);
            }
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chapters { layout, json } => {
            let layout = DiscLayout::from_path(&layout)?;
            let info = compute_chapter_offsets(&layout.ifos)?;
            if json {
                let payload = json!({
                    "frame_rate": info.frame_rate.to_string(),
                    "multiple_ifos": info.multiple_ifos,
                    "chapters": info.chapters,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "Frame rate: {} ({:.3} fps)",
                    info.frame_rate,
                    info.frame_rate.as_f64()
                );
                for (title, offsets) in info.chapters.iter().enumerate() {
                    println!("Title {title}: {offsets:?}");
                }
            }
        }
        Commands::Split { layout, json } => {
            let disc = open_disc(&layout, &cli.global)?;
            let state = disc.split_titles()?;
            let joined = disc.joined()?;
            let diagnostics = disc.diagnostics()?;

            if json {
                let titles: Vec<Value> = state
                    .chapters
                    .iter()
                    .zip(&state.clips)
                    .enumerate()
                    .map(|(title, (chapters, clip))| {
                        let is_menu = state.has_menu() && title + 1 == state.title_count();
                        json!({
                            "title": title,
                            "menu": is_menu,
                            "chapters": chapters,
                            "frame_count": clip.frame_count(),
                            "source_ranges": ranges_json(clip),
                        })
                    })
                    .collect();
                let payload = json!({
                    "frame_rate": disc.frame_rate().to_string(),
                    "menu_length": disc.menu_length(),
                    "titles": titles,
                    "joined_chapters": joined.chapters,
                    "diagnostics": diagnostics_json(diagnostics),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print_diagnostics(diagnostics);
                println!("Frame rate: {}", disc.frame_rate());
                println!("Menu length: {} frames", disc.menu_length());
                for (title, (chapters, clip)) in state.chapters.iter().zip(&state.clips).enumerate() {
                    let label = if state.has_menu() && title + 1 == state.title_count() {
                        format!("Title {title} (menu)")
                    } else {
                        format!("Title {title}")
                    };
                    println!(
                        "{}: {} frames {} chapters {chapters:?}",
                        label.bold(),
                        clip.frame_count(),
                        format_ranges(clip)
                    );
                }
                println!("{} {:?}", "Joined:".bold(), joined.chapters);
            }
        }
        Commands::Title {
            layout,
            title,
            chapters,
            json,
        } => {
            let selector = chapters
                .as_deref()
                .map(str::parse::<ChapterSelector>)
                .transpose()?;
            let disc = open_disc(&layout, &cli.global)?;
            let slice = disc.title(title, selector.as_ref())?;

            if json {
                let payload = json!({
                    "title": title,
                    "chapters": selector.as_ref().map(ToString::to_string),
                    "selection": slice_json(&slice),
                    "diagnostics": diagnostics_json(disc.diagnostics()?),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print_diagnostics(disc.diagnostics()?);
                print_slice(&slice, 0);
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "discsplit", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{format_ranges, parse_endpoint_policy};
    use discsplit::SourceFrames;

    #[test]
    fn parse_endpoint_policy_aliases() {
        assert_eq!(parse_endpoint_policy("packed").map(|p| p.name()), Some("packed"));
        assert_eq!(parse_endpoint_policy("DEFAULT").map(|p| p.name()), Some("packed"));
        assert_eq!(parse_endpoint_policy("legacy").map(|p| p.name()), Some("legacy"));
        assert!(parse_endpoint_policy("exact").is_none());
    }

    #[test]
    fn format_ranges_joins_pieces() {
        let frames = SourceFrames::from_ranges([20..300, 0..20]);
        assert_eq!(format_ranges(&frames), "[20, 300) + [0, 20)");
    }
}
