// Error types for certsweep
//
// Structured error types using thiserror. Fetch failures are never propagated
// upward out of a batch: they are folded into per-target CheckResults so that
// a single broken host cannot abort a run.

use std::time::Duration;
use thiserror::Error;

/// Failure to acquire a certificate from one target.
///
/// Each variant corresponds to one phase of the connect/handshake sequence.
/// Kept `Clone` so a cached failure can be handed to every coalesced waiter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// DNS resolution failed for the hostname
    #[error("DNS resolution failed for {hostname}: {message}")]
    DnsFailure { hostname: String, message: String },

    /// Connection was refused by the remote host
    #[error("connection refused by {addr}")]
    ConnectionRefused { addr: String },

    /// Combined connect + handshake exceeded the per-target timeout
    #[error("timed out after {timeout:?} during connect/handshake")]
    Timeout { timeout: Duration },

    /// TLS handshake failed or was rejected by the server
    #[error("TLS handshake failed: {details}")]
    HandshakeFailure { details: String },

    /// Handshake completed but the server presented no certificate
    #[error("server presented no certificate")]
    NoCertificatePresented,

    /// Anything that does not fit the categories above
    #[error("{0}")]
    Unknown(String),
}

/// Coarse error category, stable across message wording changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    DnsFailure,
    ConnectionRefused,
    Timeout,
    HandshakeFailure,
    NoCertificatePresented,
    Unknown,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::DnsFailure { .. } => FetchErrorKind::DnsFailure,
            FetchError::ConnectionRefused { .. } => FetchErrorKind::ConnectionRefused,
            FetchError::Timeout { .. } => FetchErrorKind::Timeout,
            FetchError::HandshakeFailure { .. } => FetchErrorKind::HandshakeFailure,
            FetchError::NoCertificatePresented => FetchErrorKind::NoCertificatePresented,
            FetchError::Unknown(_) => FetchErrorKind::Unknown,
        }
    }
}

/// Rejection of a single target line during input parsing.
///
/// Parse errors are recovered locally: the offending line is reported back to
/// the caller as a reject and the rest of the batch continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TargetParseError {
    #[error("empty hostname")]
    EmptyHostname,

    #[error("invalid port '{raw}'")]
    InvalidPort { raw: String },

    #[error("port 0 is not addressable")]
    PortZero,

    #[error("invalid URL: {details}")]
    InvalidUrl { details: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_includes_duration() {
        let err = FetchError::Timeout {
            timeout: Duration::from_secs(5),
        };
        let msg = err.to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("5s"));
        assert_eq!(err.kind(), FetchErrorKind::Timeout);
    }

    #[test]
    fn test_dns_failure_names_hostname() {
        let err = FetchError::DnsFailure {
            hostname: "notarealhost.invalid".to_string(),
            message: "no records found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DNS resolution failed"));
        assert!(msg.contains("notarealhost.invalid"));
        assert_eq!(err.kind(), FetchErrorKind::DnsFailure);
    }

    #[test]
    fn test_parse_error_messages() {
        assert_eq!(
            TargetParseError::InvalidPort {
                raw: "https".to_string()
            }
            .to_string(),
            "invalid port 'https'"
        );
        assert_eq!(TargetParseError::EmptyHostname.to_string(), "empty hostname");
    }
}
