//! Provider transport: the HTTP client and the contract operations depend on.

mod http;
pub mod provider;

pub use http::{authorized_url, GeminiTransport};
pub use provider::{Provider, VideoJob};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
