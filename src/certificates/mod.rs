// Certificates module - TLS leaf certificate acquisition

pub mod fetcher;

pub use fetcher::{CertificateFacts, Fetch, FetchOutcome, TlsFetcher};
