// CSV export - One row per check result

use crate::checker::classify::CheckResult;
use crate::Result;
use csv::Writer;

const HEADERS: [&str; 7] = [
    "hostname",
    "port",
    "status",
    "days_remaining",
    "bucket",
    "detail",
    "expiry",
];

/// Render results as CSV with the stable column set.
pub fn to_csv(results: &[CheckResult]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for result in results {
        let port = result.target.port.to_string();
        let status = result.status.to_string();
        let days = result
            .days_remaining
            .map(|d| d.to_string())
            .unwrap_or_default();
        let bucket = result.bucket.to_string();
        let expiry = result.expiry.map(|e| e.to_rfc3339()).unwrap_or_default();

        writer.write_record([
            result.target.hostname.as_str(),
            port.as_str(),
            status.as_str(),
            days.as_str(),
            bucket.as_str(),
            result.detail.as_str(),
            expiry.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("CSV writer error: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

/// Write results to a CSV file.
pub fn write_csv_file(path: &std::path::Path, results: &[CheckResult]) -> Result<()> {
    std::fs::write(path, to_csv(results)?)?;
    Ok(())
}
