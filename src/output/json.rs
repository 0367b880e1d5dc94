// JSON export - Serialize results and summary with stable field names

use crate::checker::classify::CheckResult;
use crate::checker::summary::BatchSummary;
use crate::Result;
use serde_json::json;

/// Serialize the batch to a JSON document.
///
/// Result records carry the stable fields `hostname`, `port`, `status`,
/// `days_remaining`, `bucket`, `detail` and `expiry`.
pub fn to_json(results: &[CheckResult], summary: &BatchSummary, pretty: bool) -> Result<String> {
    let doc = json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "summary": summary,
        "results": results,
    });

    let out = if pretty {
        serde_json::to_string_pretty(&doc)?
    } else {
        serde_json::to_string(&doc)?
    };
    Ok(out)
}

/// Write the batch to a JSON file.
pub fn write_json_file(
    path: &std::path::Path,
    results: &[CheckResult],
    summary: &BatchSummary,
) -> Result<()> {
    let json = to_json(results, summary, true)?;
    std::fs::write(path, json)?;
    Ok(())
}
