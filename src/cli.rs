// CLI module - Command line interface and argument parsing

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::checker::CheckParameters;

/// certsweep - Concurrent TLS certificate expiry checker
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
#[command(name = "certsweep")]
#[command(about = "Check TLS certificate expiry for many hosts concurrently")]
pub struct Args {
    /// Targets to check (host or host:port), one or more
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Input file with targets, one per line ('#' starts a comment)
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub input_file: Option<PathBuf>,

    /// Default port for targets without an explicit one
    #[arg(short = 'p', long = "port", value_name = "PORT", default_value = "443")]
    pub port: u16,

    /// Warn when a certificate expires in this many days or fewer
    #[arg(long = "warn-days", value_name = "DAYS", default_value = "15", allow_negative_numbers = true)]
    pub warn_days: i64,

    /// Per-target connect + handshake timeout in seconds
    #[arg(long = "timeout", value_name = "SECONDS", default_value = "5")]
    pub timeout_secs: u64,

    /// Number of concurrent workers
    #[arg(short = 'c', long = "concurrency", value_name = "COUNT", default_value = "10")]
    pub concurrency: usize,

    /// Cache TTL for fetch outcomes in seconds
    #[arg(long = "cache-ttl", value_name = "SECONDS", default_value = "300")]
    pub cache_ttl_secs: u64,

    /// Write results as JSON to this file
    #[arg(long = "json-file", value_name = "FILE")]
    pub json_file: Option<PathBuf>,

    /// Write results as CSV to this file
    #[arg(long = "csv-file", value_name = "FILE")]
    pub csv_file: Option<PathBuf>,

    /// Suppress the progress bar
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl Args {
    pub fn check_parameters(&self) -> CheckParameters {
        CheckParameters {
            warn_threshold_days: self.warn_days.max(0),
            connect_timeout: Duration::from_secs(self.timeout_secs),
            concurrency: self.concurrency.max(1),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["certsweep", "example.com"]);
        assert_eq!(args.port, 443);
        assert_eq!(args.warn_days, 15);
        assert_eq!(args.concurrency, 10);
        assert_eq!(args.timeout_secs, 5);
        assert_eq!(args.cache_ttl_secs, 300);
        assert!(!args.quiet);
    }

    #[test]
    fn test_check_parameters_clamps_degenerate_values() {
        let args = Args::parse_from([
            "certsweep",
            "example.com",
            "--warn-days=-3",
            "--concurrency",
            "0",
        ]);
        let params = args.check_parameters();
        assert_eq!(params.warn_threshold_days, 0);
        assert_eq!(params.concurrency, 1);
    }

    #[test]
    fn test_multiple_targets_and_file() {
        let args = Args::parse_from([
            "certsweep",
            "a.example.com",
            "b.example.com:8443",
            "-f",
            "hosts.txt",
        ]);
        assert_eq!(args.targets.len(), 2);
        assert_eq!(args.input_file, Some(PathBuf::from("hosts.txt")));
    }
}
