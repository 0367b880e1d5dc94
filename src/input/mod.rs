// Input module - Target list parsing

use crate::error::TargetParseError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// One hostname+port pair to be checked.
///
/// Hostnames are trimmed and lowercased on construction so that equal targets
/// written with different casing collapse to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub hostname: String,
    pub port: u16,
}

impl Target {
    pub fn new(hostname: &str, port: u16) -> Self {
        Self {
            hostname: hostname.trim().to_ascii_lowercase(),
            port,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hostname, self.port)
    }
}

/// A target line that could not be parsed, with the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reject {
    pub raw_line: String,
    pub reason: TargetParseError,
}

/// Parse raw newline-separated input into a deduplicated, ordered target list.
///
/// Accepted token forms: `host`, `host:port`, or a URL (`https://host:port`).
/// Blank lines and lines starting with `#` are skipped. Malformed lines do not
/// abort the batch; they come back as rejects alongside the valid targets.
pub fn parse_targets(raw_input: &str, default_port: u16) -> (Vec<Target>, Vec<Reject>) {
    let mut targets = Vec::new();
    let mut rejects = Vec::new();
    let mut seen: HashSet<Target> = HashSet::new();

    for line in raw_input.lines() {
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }

        match parse_line(token, default_port) {
            Ok(target) => {
                // First-seen order wins; duplicates collapse to one entry
                if seen.insert(target.clone()) {
                    targets.push(target);
                }
            }
            Err(reason) => rejects.push(Reject {
                raw_line: line.to_string(),
                reason,
            }),
        }
    }

    (targets, rejects)
}

/// Load targets from a line-delimited file.
pub fn targets_from_file<P: AsRef<Path>>(
    path: P,
    default_port: u16,
) -> Result<(Vec<Target>, Vec<Reject>)> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(parse_targets(&content, default_port))
}

/// Parse a single target token (host, host:port, or URL).
fn parse_line(token: &str, default_port: u16) -> std::result::Result<Target, TargetParseError> {
    if token.contains("://") {
        // URL format (https://example.com:8443)
        let parsed = url::Url::parse(token).map_err(|e| TargetParseError::InvalidUrl {
            details: e.to_string(),
        })?;
        let host = parsed
            .host_str()
            .ok_or_else(|| TargetParseError::EmptyHostname)?;
        let port = parsed.port().unwrap_or(default_port);
        return Ok(Target::new(host, port));
    }

    // IPv6 literals carry colons of their own; only split on ':' when the
    // token is not a bare bracketless IPv6 address
    if token.matches(':').count() > 1 && !token.starts_with('[') {
        return Ok(Target::new(token, default_port));
    }

    if let Some((host, port_str)) = token.rsplit_once(':') {
        let port = port_str
            .parse::<u16>()
            .map_err(|_| TargetParseError::InvalidPort {
                raw: port_str.to_string(),
            })?;
        if port == 0 {
            return Err(TargetParseError::PortZero);
        }
        if host.trim().is_empty() {
            return Err(TargetParseError::EmptyHostname);
        }
        return Ok(Target::new(host.trim_matches(['[', ']']), port));
    }

    Ok(Target::new(token, default_port))
}
