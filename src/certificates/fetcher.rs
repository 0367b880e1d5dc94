// Certificate Fetcher - Wire-level TLS handshake and leaf certificate extraction

use crate::error::FetchError;
use crate::input::Target;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use rustls::{ClientConfig, SignatureScheme};
use rustls_pki_types::{CertificateDer, ServerName};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::debug;
use x509_parser::prelude::*;

/// Attributes extracted from a server's leaf certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateFacts {
    pub subject: String,
    pub issuer: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub san: Vec<String>,
    pub serial: String,
}

/// Outcome of one fetch attempt: exactly one variant populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(CertificateFacts),
    Failure(FetchError),
}

/// Certificate acquisition seam.
///
/// The production implementation is [`TlsFetcher`]; tests substitute mock
/// fetchers to exercise caching, isolation and cancellation without sockets.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch the leaf certificate of `target`, bounded by `timeout` for the
    /// combined connect + handshake duration. Never returns an `Err`: every
    /// failure mode is folded into `FetchOutcome::Failure`.
    async fn fetch(&self, target: &Target, timeout: Duration) -> FetchOutcome;
}

/// Fetcher performing a real TLS handshake with rustls.
///
/// The handshake deliberately skips chain trust validation (a no-op verifier):
/// the goal is inspection of whatever certificate the server presents, not
/// authentication. No application-layer bytes are exchanged.
pub struct TlsFetcher;

#[async_trait]
impl Fetch for TlsFetcher {
    async fn fetch(&self, target: &Target, connect_timeout: Duration) -> FetchOutcome {
        let attempt = timeout(connect_timeout, Self::try_fetch(target));

        match attempt.await {
            Ok(Ok(facts)) => FetchOutcome::Success(facts),
            Ok(Err(err)) => FetchOutcome::Failure(err),
            Err(_elapsed) => FetchOutcome::Failure(FetchError::Timeout {
                timeout: connect_timeout,
            }),
        }
    }
}

impl TlsFetcher {
    /// Resolve, connect and handshake, then read the peer's leaf certificate.
    async fn try_fetch(target: &Target) -> Result<CertificateFacts, FetchError> {
        let ip = resolve_first(&target.hostname).await?;
        let addr = SocketAddr::new(ip, target.port);

        debug!(target = %target, %addr, "connecting");

        let stream = TcpStream::connect(addr).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::ConnectionRefused => FetchError::ConnectionRefused {
                addr: addr.to_string(),
            },
            _ => FetchError::Unknown(format!("connect to {} failed: {}", addr, e)),
        })?;

        let config = ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerifier))
            .with_no_client_auth();
        let connector = TlsConnector::from(Arc::new(config));

        let server_name = ServerName::try_from(target.hostname.as_str())
            .map_err(|_| FetchError::Unknown(format!("invalid server name '{}'", target.hostname)))?
            .to_owned();

        let tls_stream = connector
            .connect(server_name, stream)
            .await
            .map_err(|e| FetchError::HandshakeFailure {
                details: e.to_string(),
            })?;

        let (_io, connection) = tls_stream.into_inner();
        let leaf = connection
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or(FetchError::NoCertificatePresented)?;

        parse_leaf(leaf)
    }
}

/// Resolve hostname to its first IP address (IP literals pass through).
async fn resolve_first(hostname: &str) -> Result<IpAddr, FetchError> {
    if let Ok(ip) = hostname.parse::<IpAddr>() {
        return Ok(ip);
    }

    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
    let response = resolver
        .lookup_ip(hostname)
        .await
        .map_err(|e| FetchError::DnsFailure {
            hostname: hostname.to_string(),
            message: e.to_string(),
        })?;

    response.iter().next().ok_or_else(|| FetchError::DnsFailure {
        hostname: hostname.to_string(),
        message: "no IP addresses found".to_string(),
    })
}

/// Parse the DER-encoded leaf certificate into the facts the evaluator needs.
fn parse_leaf(der: &CertificateDer<'_>) -> Result<CertificateFacts, FetchError> {
    let (_, cert) = X509Certificate::from_der(der.as_ref()).map_err(|e| {
        FetchError::Unknown(format!("failed to parse certificate: {:?}", e))
    })?;

    // Subject Alternative Names
    let mut san = Vec::new();
    if let Ok(Some(ext)) = cert.get_extension_unique(&oid_registry::OID_X509_EXT_SUBJECT_ALT_NAME)
        && let ParsedExtension::SubjectAlternativeName(san_ext) = ext.parsed_extension()
    {
        for name in &san_ext.general_names {
            match name {
                GeneralName::DNSName(dns) => san.push(dns.to_string()),
                GeneralName::IPAddress(ip) => san.push(format!("IP:{}", hex::encode(ip))),
                _ => {}
            }
        }
    }

    let not_before = asn1_to_utc(&cert.validity().not_before)?;
    let not_after = asn1_to_utc(&cert.validity().not_after)?;

    Ok(CertificateFacts {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        not_before,
        not_after,
        san,
        serial: format!("{:x}", cert.serial),
    })
}

fn asn1_to_utc(time: &ASN1Time) -> Result<DateTime<Utc>, FetchError> {
    DateTime::from_timestamp(time.timestamp(), 0).ok_or_else(|| {
        FetchError::Unknown(format!("certificate validity out of range: {}", time))
    })
}

/// No-op certificate verifier: certsweep inspects, it does not authenticate.
#[derive(Debug)]
struct NoVerifier;

impl rustls::client::danger::ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls_pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}
