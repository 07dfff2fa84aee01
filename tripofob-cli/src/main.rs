mod logging;
mod progress;
mod render;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tripofob::{export, CliOverrides, EncodingMode, PatternMode, SearchConfig};

/// Accepted values of `--encoding`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EncodingArg {
    /// Replace invalid sequences with U+FFFD
    Lossy,
    /// Drop invalid sequences
    Skip,
}

impl From<EncodingArg> for EncodingMode {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Lossy => EncodingMode::Lossy,
            EncodingArg::Skip => EncodingMode::Skip,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Concurrent text and spreadsheet search", long_about = None)]
struct Cli {
    /// Text to search for (case-insensitive)
    #[arg(short = 'p', long = "pattern", required_unless_present = "list_categories")]
    pattern: Option<String>,

    /// Treat the pattern as a regular expression
    #[arg(short = 'r', long = "regex", conflicts_with = "literal")]
    regex: bool,

    /// Treat the pattern as literal text (the default unless configured)
    #[arg(short = 'l', long = "literal")]
    literal: bool,

    /// Root directory to search in [default: .]
    #[arg(short = 'd', long)]
    root: Option<PathBuf>,

    /// File extensions to include (e.g. txt,xlsx,json)
    #[arg(short = 'e', long)]
    extensions: Option<String>,

    /// File category to include, by key, title or number (repeatable, 0 for all)
    #[arg(short = 'c', long = "category")]
    categories: Vec<String>,

    /// Patterns to ignore (glob format)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Number of workers to use (at most 4 run)
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Characters of context on each side of a text match [default: 50]
    #[arg(long)]
    context: Option<usize>,

    /// How to handle invalid UTF-8 sequences [default: lossy]
    #[arg(long, value_enum)]
    encoding: Option<EncodingArg>,

    /// Export results as JSON into DIR (current directory if omitted)
    #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = ".")]
    export: Option<PathBuf>,

    /// Show only statistics, not matches
    #[arg(short, long)]
    stats: bool,

    /// List the file categories and exit
    #[arg(long)]
    list_categories: bool,

    /// Configuration file layered over the default locations
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not draw the progress bar
    #[arg(long)]
    no_progress: bool,

    /// File that receives the diagnostic log
    #[arg(long, default_value = "tripofob.log")]
    log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        let file_extensions = self.extensions.as_ref().map(|e| {
            e.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });

        let mode = if self.regex {
            Some(PatternMode::Regex)
        } else if self.literal {
            Some(PatternMode::Literal)
        } else {
            None
        };

        CliOverrides {
            pattern: self.pattern.clone(),
            mode,
            root_path: self.root.clone(),
            file_extensions,
            categories: self.categories.clone(),
            ignore_patterns: self.ignore.clone(),
            thread_count: self.threads,
            context_chars: self.context,
            encoding_mode: self.encoding.map(EncodingMode::from),
            log_level: self.log_level.clone(),
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Critical error: {:#}", e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if cli.list_categories {
        render::print_categories();
        return Ok(());
    }

    let loaded = SearchConfig::load_from(cli.config.as_deref())
        .map(|config| config.merge_with_cli(cli.overrides()));

    // The logger comes up even when the config is broken so the failure is recorded
    let log_level = match &loaded {
        Ok(config) => config.log_level.clone(),
        Err(_) => cli
            .log_level
            .clone()
            .unwrap_or_else(|| SearchConfig::default().log_level),
    };
    logging::init(&log_level, Some(&cli.log_file))?;
    info!("tripofob {} started", env!("CARGO_PKG_VERSION"));

    let config = loaded.context("Failed to load configuration")?;
    if config.pattern.is_empty() {
        bail!("Search pattern cannot be empty");
    }

    let report = if cli.no_progress {
        tripofob::search(&config)?
    } else {
        let (tx, rx) = crossbeam_channel::unbounded();
        let reporter = progress::spawn_reporter(rx);
        let result = tripofob::search_with_progress(&config, tx);
        if reporter.join().is_err() {
            error!("Progress reporter panicked");
        }
        result?
    };

    render::print_report(&report, &config.pattern, cli.stats);

    if let Some(dir) = &cli.export {
        let path = export::save_results(dir, &config.pattern, &report.file_results)
            .context("Failed to export results")?;
        println!("{} {}", "Results saved to".green(), path.display());
    }

    info!(
        "Search complete: {} matches in {} of {} files",
        report.total_matches, report.files_with_matches, report.files_processed
    );
    Ok(())
}
