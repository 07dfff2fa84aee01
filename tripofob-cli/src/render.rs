use colored::Colorize;
use std::time::Duration;
use tripofob::catalog::CATEGORIES;
use tripofob::SearchReport;

const CONTEXT_WIDTH: usize = 60;

/// Shortens `text` to at most `max` characters, marking the cut with `...`
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

fn rounded(elapsed: Duration) -> Duration {
    Duration::from_millis(elapsed.as_millis() as u64)
}

pub fn print_categories() {
    println!("{}", "Available file types".cyan().bold());
    for (i, category) in CATEGORIES.iter().enumerate() {
        println!(
            "{:>3}  {:<14} {:<13} {}",
            (i + 1).to_string().cyan(),
            category.title.green(),
            format!("({})", category.key),
            category.extensions.join(", ").yellow()
        );
    }
    println!("{:>3}  {}", "0".cyan(), "All types".cyan().bold());
}

pub fn print_report(report: &SearchReport, pattern: &str, stats_only: bool) {
    if report.is_empty() {
        println!("{}", "No results found".yellow());
    } else if !stats_only {
        println!(
            "{} {}",
            "Results for:".cyan().bold(),
            pattern.yellow()
        );
        for (idx, file_result) in report.file_results.iter().enumerate() {
            println!(
                "\n{} {} {}",
                format!("[{}]", idx + 1).cyan(),
                file_result.path.display().to_string().blue(),
                format!("({})", file_result.kind.as_str()).dimmed()
            );
            for m in &file_result.matches {
                println!(
                    "    {}  {}",
                    m.matched.yellow().bold(),
                    truncate_chars(&m.context, CONTEXT_WIDTH)
                );
            }
        }
        println!();
    }

    if !report.diagnostics.is_empty() {
        println!(
            "{}",
            format!("Could not search {} files:", report.diagnostics.len()).red()
        );
        for diagnostic in &report.diagnostics {
            println!("    {}: {}", diagnostic.path.display(), diagnostic.message);
        }
        println!();
    }

    println!(
        "Found {} matches in {} files ({} searched by {} workers in {})",
        report.total_matches,
        report.files_with_matches,
        report.files_processed,
        report.workers,
        humantime::format_duration(rounded(report.elapsed))
    );
}
