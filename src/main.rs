use clap::{Parser, Subcommand};
use drum_remap::{
    inspect_file, BatchRequest, BatchRunner, BlanketPrompt, ConflictDecision, ConflictPrompt,
    MappingLoader, Preferences, DEFAULT_SUFFIX,
};
use std::io::Write;
use std::path::{Path, PathBuf};

/// MIDI Drum Remapper
#[derive(Parser)]
#[command(name = "drum-remap")]
#[command(about = "Remap drum note maps inside MIDI files using XML conversion tables")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remap a batch of MIDI files
    Remap {
        /// Input MIDI files
        files: Vec<PathBuf>,

        /// Mapping file name (e.g. "ssd5_to_musescore.xml"), or "as Source"
        /// for channel forcing only; defaults to the last used mapping
        #[arg(short, long)]
        mapping: Option<String>,

        /// Output template; supports {filename}, {ext} and {input_dir}
        #[arg(short, long)]
        output: Option<String>,

        /// Suffix appended to output filenames when no template names one
        #[arg(long, default_value = DEFAULT_SUFFIX)]
        suffix: String,

        /// Mappings directory (default: mappings/ next to the executable)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Overwrite existing output files without asking
        #[arg(long, conflicts_with = "skip_existing")]
        overwrite: bool,

        /// Skip inputs whose output file already exists
        #[arg(long)]
        skip_existing: bool,

        /// Quiet output
        #[arg(short, long)]
        quiet: bool,
    },
    /// List available mapping files
    List {
        /// Mappings directory (default: mappings/ next to the executable)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Summarize the note events of a MIDI file
    Inspect {
        /// MIDI file to inspect
        file: PathBuf,
    },
}

/// Interactive conflict prompt on stdin.
struct StdinPrompt;

impl ConflictPrompt for StdinPrompt {
    fn decide(&mut self, _input: &Path, output: &Path, multiple: bool) -> ConflictDecision {
        loop {
            eprintln!("File already exists: {}", output.display());
            if multiple {
                eprint!("[o]verwrite / [O]verwrite all / [s]kip / [S]kip all / [c]ancel: ");
            } else {
                eprint!("[o]verwrite / [c]ancel: ");
            }
            let _ = std::io::stderr().flush();

            let mut line = String::new();
            if std::io::stdin().read_line(&mut line).unwrap_or(0) == 0 {
                // EOF: treat as cancel
                return ConflictDecision::Cancel;
            }

            match line.trim() {
                "o" => return ConflictDecision::Overwrite,
                "O" if multiple => return ConflictDecision::OverwriteAll,
                "s" if multiple => return ConflictDecision::Skip,
                "S" if multiple => return ConflictDecision::SkipAll,
                "c" | "C" => return ConflictDecision::Cancel,
                other => eprintln!("Unrecognized answer: {:?}", other),
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Remap {
            files,
            mapping,
            output,
            suffix,
            dir,
            overwrite,
            skip_existing,
            quiet,
        } => {
            if files.is_empty() {
                anyhow::bail!("No input files given");
            }

            let prefs_path = Preferences::default_path();
            let mut prefs = Preferences::load(&prefs_path);

            let mapping = match mapping.or_else(|| {
                (!prefs.last_mapping.is_empty()).then(|| prefs.last_mapping.clone())
            }) {
                Some(m) => m,
                None => anyhow::bail!("No mapping specified (use --mapping or run once with one)"),
            };

            let template = output.unwrap_or_else(|| template_from_prefs(&prefs));

            let loader = MappingLoader::new(dir.unwrap_or_else(MappingLoader::default_dir));
            let runner = BatchRunner::new(loader);
            let request = BatchRequest {
                files,
                mapping: mapping.clone(),
                output_template: template,
                default_suffix: suffix,
            };

            let mut progress = |current: usize, total: usize| {
                if !quiet {
                    println!("[{}/{}]", current, total);
                }
            };
            let outcome = if overwrite {
                runner.run(
                    &request,
                    &mut BlanketPrompt(ConflictDecision::OverwriteAll),
                    &mut progress,
                )?
            } else if skip_existing {
                runner.run(
                    &request,
                    &mut BlanketPrompt(ConflictDecision::SkipAll),
                    &mut progress,
                )?
            } else {
                runner.run(&request, &mut StdinPrompt, &mut progress)?
            };

            prefs.last_mapping = mapping;
            prefs.save(&prefs_path);

            if outcome.cancelled {
                if !quiet {
                    println!("Cancelled; no files processed");
                }
                return Ok(());
            }

            for result in &outcome.results {
                if result.success {
                    println!(
                        "[OK]   {} -> {}",
                        result.input.display(),
                        result.output.display()
                    );
                } else {
                    println!(
                        "[FAIL] {} - {}",
                        result.input.display(),
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
            println!(
                "{}/{} files remapped",
                outcome.success_count(),
                outcome.results.len()
            );

            if prefs.open_explorer && outcome.success_count() > 0 {
                if let Some(first) = outcome.results.iter().find(|r| r.success) {
                    open_folder(&first.output);
                }
            }

            if !outcome.results.is_empty() && outcome.success_count() == 0 {
                std::process::exit(1);
            }
        }
        Commands::List { dir } => {
            let loader = MappingLoader::new(dir.unwrap_or_else(MappingLoader::default_dir));
            for name in loader.list_available() {
                println!("{}", name);
            }
        }
        Commands::Inspect { file } => {
            let report = inspect_file(&file)?;
            println!("Note events: {}", report.note_count);
            println!("Unique notes: {:?}", report.notes);
            println!("Channels: {:?}", report.channels);
            if report.all_on_drum_channel() {
                println!("[OK] All notes are on Channel 10 (index 9)");
            } else {
                println!("[WARNING] Notes found outside Channel 10 (index 9)");
            }
        }
    }

    Ok(())
}

/// Build the output template from stored preferences when none is given on
/// the command line.
fn template_from_prefs(prefs: &Preferences) -> String {
    let filename = if prefs.filename_template.trim().is_empty() {
        "{filename}_remap{ext}".to_string()
    } else {
        prefs.filename_template.clone()
    };

    if prefs.use_same_folder {
        format!("{{input_dir}}/{}", filename)
    } else if !prefs.output_dir.is_empty() {
        format!("{}/{}", prefs.output_dir, filename)
    } else {
        // No directory configured: fall back to next-to-input naming
        String::new()
    }
}

/// Best-effort: reveal the output's folder in the platform file manager.
fn open_folder(output: &Path) {
    let Some(folder) = output.parent() else {
        return;
    };
    #[cfg(target_os = "windows")]
    let opener = "explorer";
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
    let opener = "xdg-open";

    let _ = std::process::Command::new(opener).arg(folder).spawn();
}
