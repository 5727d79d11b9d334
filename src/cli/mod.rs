//! # CLI Module
//!
//! Command-line interface for the duplicate image comparer.
//!
//! ## Usage
//! ```bash
//! # Report duplicates under a directory
//! image-compare scan ~/Pictures
//!
//! # Exact matches only, moved aside after confirmation
//! image-compare scan ~/Pictures --pixel --move-to ~/Pictures/duplicates
//!
//! # Delete without asking
//! image-compare scan ~/Pictures --delete --yes
//!
//! # JSON output
//! image-compare scan ~/Pictures --output json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use duplicate_image_comparer::core::comparator::ComparisonResult;
use duplicate_image_comparer::core::pipeline::{
    ComparerSettings, ImageComparer, Reconciliation, ReviewDecision, RunOutcome, RunRequest,
};
use duplicate_image_comparer::core::reconcile::ReconcileReport;
use duplicate_image_comparer::core::scanner::ScanMode;
use duplicate_image_comparer::error::{ComparerError, ReconcileError, Result};
use duplicate_image_comparer::events::{
    CompareEvent, Event, EventChannel, HashEvent, PipelineEvent, ReconcileEvent, RunSummary,
    ScanEvent,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::thread;

/// Duplicate Image Comparer - find and reconcile duplicate images
#[derive(Parser, Debug)]
#[command(name = "image-compare")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan directories for duplicate images
    Scan(ScanArgs),
}

#[derive(clap::Args, Debug)]
struct ScanArgs {
    /// Directories to scan
    #[arg(required = true)]
    roots: Vec<PathBuf>,

    /// Descend into subdirectories (overrides the settings file)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    recursive: Option<bool>,

    /// Group by perceptual hash
    #[arg(long)]
    perceptual: bool,

    /// Group by exact pixel content
    #[arg(long)]
    pixel: bool,

    /// Move duplicates into this directory
    #[arg(long, value_name = "DIR", conflicts_with = "delete")]
    move_to: Option<PathBuf>,

    /// Delete duplicates permanently
    #[arg(long)]
    delete: bool,

    /// Do not ask before moving or deleting
    #[arg(short, long)]
    yes: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Settings file (defaults to the user config directory)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    save_settings: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (duplicate paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => run_scan(args),
    }
}

fn run_scan(args: ScanArgs) -> Result<()> {
    duplicate_image_comparer::init_tracing_with(if args.verbose { "debug" } else { "warn" });

    let term = Term::stderr();
    let pretty = args.output == OutputFormat::Pretty;

    let settings_path = args
        .settings
        .clone()
        .or_else(ComparerSettings::default_path)
        .ok_or_else(|| ComparerError::Config("no settings location available".to_string()))?;
    let settings = effective_settings(ComparerSettings::load(&settings_path)?, &args);
    if args.save_settings {
        settings.save(&settings_path)?;
    }

    let reconciliation = if args.delete {
        Reconciliation::Delete
    } else if let Some(destination) = args.move_to.clone() {
        Reconciliation::MoveTo(destination)
    } else {
        Reconciliation::None
    };

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Duplicate Image Comparer").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        let algorithms: Vec<String> = settings
            .algorithms()
            .kinds()
            .iter()
            .map(|k| k.to_string())
            .collect();
        term.write_line(&format!(
            "  {} {}",
            style("Algorithms:").dim(),
            if algorithms.is_empty() {
                "none".to_string()
            } else {
                algorithms.join(" -> ")
            }
        ))
        .ok();
        term.write_line("").ok();
    }

    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if pretty {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_events = progress.clone();
    let verbose = args.verbose;
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress_events.as_ref() else {
                continue;
            };
            match event {
                Event::Scan(ScanEvent::Started { .. }) => pb.set_message("Discovering"),
                Event::Hash(HashEvent::Started { total_files }) => {
                    pb.set_length(total_files as u64);
                    pb.set_position(0);
                    pb.set_message("Comparing");
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Compare(CompareEvent::Completed { .. }) => pb.finish_and_clear(),
                Event::Reconcile(ReconcileEvent::Started { total_files, .. }) => {
                    pb.reset();
                    pb.set_length(total_files as u64);
                    pb.set_message("Reconciling");
                }
                Event::Reconcile(ReconcileEvent::FileDone { .. })
                | Event::Reconcile(ReconcileEvent::FileFailed { .. }) => pb.inc(1),
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Declined { .. })
                | Event::Pipeline(PipelineEvent::Failed { .. }) => pb.finish_and_clear(),
                _ => {}
            }
        }
    });

    let mut request = RunRequest::new(args.roots.clone()).reconcile(reconciliation.clone());
    if reconciliation != Reconciliation::None && !args.yes {
        let action = reconciliation.clone();
        let progress_review = progress.clone();
        request = request.review(move |comparison| {
            if let Some(pb) = progress_review {
                pb.finish_and_clear();
            }
            confirm(&action, comparison)
        });
    }

    let comparer = ImageComparer::with_settings(settings, sender);
    let outcome = comparer.run(request, |_| {})?.wait();

    // Drop the engine (and its sender) so the event thread finishes
    drop(comparer);
    event_thread.join().ok();

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(ComparerError::Reconcile(ReconcileError::Partial {
            succeeded,
            failures,
        })) if pretty => {
            term.write_line(&format!(
                "{} {} files reconciled, {} failed:",
                style("!").red().bold(),
                succeeded,
                failures.len()
            ))
            .ok();
            for failure in &failures {
                term.write_line(&format!("    {} ({})", failure.path.display(), failure.reason))
                    .ok();
            }
            return Err(ComparerError::Reconcile(ReconcileError::Partial {
                succeeded,
                failures,
            }));
        }
        Err(e) => return Err(e),
    };

    match args.output {
        OutputFormat::Pretty => print_pretty_results(&term, &outcome, verbose),
        OutputFormat::Json => print_json_results(&outcome)?,
        OutputFormat::Minimal => print_minimal_results(&outcome),
    }

    Ok(())
}

/// Apply command-line overrides to the loaded settings
fn effective_settings(mut settings: ComparerSettings, args: &ScanArgs) -> ComparerSettings {
    if args.perceptual || args.pixel {
        settings.perceptual_hash = args.perceptual;
        settings.pixel_by_pixel = args.pixel;
    }
    if let Some(recursive) = args.recursive {
        settings.mode = if recursive {
            ScanMode::Recursive
        } else {
            ScanMode::NotRecursive
        };
    }
    if let Some(destination) = &args.move_to {
        settings.output_path = Some(destination.clone());
    }
    settings
}

/// Ask on the terminal before touching any file
fn confirm(action: &Reconciliation, comparison: &ComparisonResult) -> ReviewDecision {
    let count = comparison.duplicates.len();
    if count == 0 {
        return ReviewDecision::Proceed;
    }

    let term = Term::stderr();
    let question = match action {
        Reconciliation::MoveTo(destination) => {
            format!("Move {} duplicates to {}? [y/N] ", count, destination.display())
        }
        Reconciliation::Delete => format!("Permanently delete {} duplicates? [y/N] ", count),
        Reconciliation::None => return ReviewDecision::Proceed,
    };

    if term.write_str(&question).is_err() {
        return ReviewDecision::Cancel;
    }
    match term.read_line() {
        Ok(answer) if matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") => {
            ReviewDecision::Proceed
        }
        _ => ReviewDecision::Cancel,
    }
}

fn print_pretty_results(term: &Term, outcome: &RunOutcome, verbose: bool) {
    let comparison = outcome.comparison();

    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    if let RunOutcome::Completed { summary, .. } = outcome {
        term.write_line(&format!(
            "  {} images compared in {:.1}s",
            style(summary.total_files).cyan(),
            summary.duration_ms as f64 / 1000.0
        ))
        .ok();
    }
    term.write_line(&format!(
        "  {} duplicate groups found",
        style(comparison.grouping.duplicate_groups().count()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicate images",
        style(comparison.duplicates.len()).cyan()
    ))
    .ok();
    if !comparison.skipped.is_empty() {
        term.write_line(&format!(
            "  {} files could not be decoded",
            style(comparison.skipped.len()).yellow()
        ))
        .ok();
    }
    term.write_line("").ok();

    if comparison.duplicates.is_empty() {
        term.write_line("  No duplicates found.").ok();
    } else {
        term.write_line(&format!("{}", style("Duplicate Groups:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for (i, group) in comparison.grouping.duplicate_groups().enumerate() {
            term.write_line(&format!(
                "  {} ({} images)",
                style(format!("Group {}:", i + 1)).bold(),
                group.len()
            ))
            .ok();

            if let Some(original) = group.original() {
                term.write_line(&format!(
                    "    {} {}",
                    style("★").green(),
                    display_path(original.path())
                ))
                .ok();
            }
            for record in group.duplicates() {
                term.write_line(&format!(
                    "    {} {}",
                    style("○").dim(),
                    display_path(record.path())
                ))
                .ok();
            }
            term.write_line("").ok();
        }
    }

    if verbose {
        for skipped in &comparison.skipped {
            term.write_line(&format!(
                "  {} {} ({})",
                style("skipped").dim(),
                display_path(&skipped.path),
                skipped.reason
            ))
            .ok();
        }
    }

    match outcome {
        RunOutcome::Completed {
            report: Some(report),
            ..
        } => print_report(term, report),
        RunOutcome::Completed { report: None, .. } => {
            term.write_line(&format!(
                "{}",
                style("No files were changed. Use --move-to or --delete to reconcile.").dim()
            ))
            .ok();
        }
        RunOutcome::Declined { .. } => {
            term.write_line(&format!("{}", style("Cancelled, no files were changed.").yellow()))
                .ok();
        }
    }
}

fn print_report(term: &Term, report: &ReconcileReport) {
    let moved = report.files.iter().filter(|f| f.destination.is_some()).count();
    let deleted = report.len() - moved;
    if moved > 0 {
        term.write_line(&format!("{} {} duplicates moved", style("✓").green(), moved))
            .ok();
    }
    if deleted > 0 {
        term.write_line(&format!("{} {} duplicates deleted", style("✓").green(), deleted))
            .ok();
    }
    if report.overwritten > 0 {
        term.write_line(&format!(
            "{} {} files in the destination were overwritten",
            style("!").yellow(),
            report.overwritten
        ))
        .ok();
    }
}

fn print_json_results(outcome: &RunOutcome) -> Result<()> {
    let comparison = outcome.comparison();
    let (status, summary, reconciled) = match outcome {
        RunOutcome::Completed {
            summary, report, ..
        } => ("completed", summary.clone(), report.as_ref().map(|r| r.files.clone())),
        RunOutcome::Declined { .. } => ("declined", RunSummary::default(), None),
    };

    let output = serde_json::json!({
        "status": status,
        "summary": summary,
        "duplicates": comparison.duplicates,
        "skipped": comparison.skipped,
        "reconciled": reconciled,
        "groups": comparison.grouping.duplicate_groups().map(|g| {
            serde_json::json!({
                "original": g.original().map(|r| r.path()),
                "duplicates": g.duplicates().iter().map(|r| r.path()).collect::<Vec<_>>(),
            })
        }).collect::<Vec<_>>(),
    });

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| ComparerError::Config(format!("cannot render JSON: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn print_minimal_results(outcome: &RunOutcome) {
    for path in &outcome.comparison().duplicates {
        println!("{}", path.display());
    }
}

fn display_path(path: &std::path::Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(&home).ok().map(PathBuf::from)) {
        Some(relative) => format!("~/{}", relative.display()),
        None => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ScanArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Scan(args) => args,
        }
    }

    #[test]
    fn flags_override_both_algorithms() {
        let args = parse(&["image-compare", "scan", "/photos", "--pixel"]);

        let settings = effective_settings(ComparerSettings::default(), &args);

        assert!(settings.pixel_by_pixel);
        assert!(!settings.perceptual_hash);
    }

    #[test]
    fn no_algorithm_flags_keep_the_settings() {
        let args = parse(&["image-compare", "scan", "/photos"]);

        let settings = effective_settings(ComparerSettings::default(), &args);

        assert_eq!(settings, ComparerSettings::default());
    }

    #[test]
    fn recursive_accepts_an_optional_value() {
        let flat = parse(&["image-compare", "scan", "/photos", "--recursive", "false"]);
        let deep = parse(&["image-compare", "scan", "/photos", "--recursive"]);

        let settings = ComparerSettings {
            mode: ScanMode::NotRecursive,
            ..Default::default()
        };

        assert_eq!(effective_settings(settings.clone(), &flat).mode, ScanMode::NotRecursive);
        assert_eq!(effective_settings(settings, &deep).mode, ScanMode::Recursive);
    }

    #[test]
    fn move_to_sets_the_output_path() {
        let args = parse(&["image-compare", "scan", "/photos", "--move-to", "/dups"]);

        let settings = effective_settings(ComparerSettings::default(), &args);

        assert_eq!(settings.output_path, Some(PathBuf::from("/dups")));
    }

    #[test]
    fn move_and_delete_conflict() {
        let result = Cli::try_parse_from([
            "image-compare",
            "scan",
            "/photos",
            "--move-to",
            "/dups",
            "--delete",
        ]);
        assert!(result.is_err());
    }
}
