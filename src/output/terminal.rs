// Terminal output - Colored result table, summary counters and bucket histogram

use crate::checker::classify::{Bucket, CheckResult, Status};
use crate::checker::summary::BatchSummary;
use colored::*;

/// Render the full batch report: table, summary line, bucket histogram.
pub fn render_report(results: &[CheckResult], summary: &BatchSummary) -> String {
    let mut out = String::new();

    out.push_str(&render_table(results));
    out.push('\n');
    out.push_str(&render_summary(summary));

    out
}

/// Result table sorted by target for stable display.
pub fn render_table(results: &[CheckResult]) -> String {
    let mut sorted: Vec<&CheckResult> = results.iter().collect();
    sorted.sort_by(|a, b| {
        (&a.target.hostname, a.target.port).cmp(&(&b.target.hostname, b.target.port))
    });

    let mut out = String::new();
    out.push_str(&format!(
        "{:<40} {:>6} {:>8} {:>10} {:>8}  {}\n",
        "HOST".bold(),
        "PORT".bold(),
        "STATUS".bold(),
        "DAYS LEFT".bold(),
        "BUCKET".bold(),
        "DETAIL".bold()
    ));
    out.push_str(&"-".repeat(100));
    out.push('\n');

    for result in sorted {
        let status = colorize_status(result.status);
        let days = result
            .days_remaining
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!(
            "{:<40} {:>6} {:>8} {:>10} {:>8}  {}\n",
            result.target.hostname,
            result.target.port,
            status,
            days,
            result.bucket.to_string(),
            result.detail
        ));
    }

    out
}

pub fn render_summary(summary: &BatchSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{}: {} | {}: {} | {}: {} | {}: {} | {}: {}\n",
        "Total".bold(),
        summary.total,
        "OK".green().bold(),
        summary.ok,
        "Warn".yellow().bold(),
        summary.warn,
        "Expired".red().bold(),
        summary.expired,
        "Error".red().bold(),
        summary.error
    ));

    out.push_str(&format!("\n{}\n", "Expiry buckets:".bold()));
    for bucket in Bucket::ALL {
        let count = summary.bucket_counts.get(&bucket).copied().unwrap_or(0);
        if count == 0 {
            continue;
        }
        out.push_str(&format!(
            "  {:>8}  {} {}\n",
            bucket.to_string(),
            "#".repeat(count.min(60)),
            count
        ));
    }

    out
}

fn colorize_status(status: Status) -> ColoredString {
    match status {
        Status::Ok => "OK".green(),
        Status::Warn => "WARN".yellow(),
        Status::Expired => "EXPIRED".red().bold(),
        Status::Error => "ERROR".red(),
    }
}
