//! # creative-studio
//!
//! Client runtime for a multimodal creative studio: chat with a Gemini model,
//! generate images, and render videos through a long-running job that is
//! polled to completion.
//!
//! ## Overview
//!
//! The crate is the core behind a studio front end. It resolves which API key
//! to present, assembles provider requests from user inputs, runs the
//! operations, and normalizes every failure into one closed [`ErrorKind`]
//! taxonomy with a single remediation per kind.
//!
//! ## Core Philosophy
//!
//! - **One outcome per call**: every operation returns an [`OperationOutcome`],
//!   never a raw transport error
//! - **Pure builders**: request assembly does no I/O and is deterministic
//! - **Injectable time**: the poll loop sleeps through [`poll::Sleeper`], so
//!   tests simulate ticks instantly
//! - **Explicit credentials**: one [`credentials::CredentialResolver`] with a
//!   fixed priority order instead of ad hoc lookups
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use creative_studio::types::{ImageConfig, QualityTier};
//! use creative_studio::{OperationOutcome, StudioClient};
//!
//! #[tokio::main]
//! async fn main() -> creative_studio::Result<()> {
//!     let client = StudioClient::new()?;
//!
//!     match client.chat("Ideas for a jazz poster?", &[], None).await {
//!         OperationOutcome::Success(reply) => println!("{}", reply.text),
//!         OperationOutcome::Failure(kind) => eprintln!("{} ({})", kind, kind.code()),
//!     }
//!
//!     let config = ImageConfig::new(QualityTier::Standard);
//!     let outcome = client.generate_image::<&str>("a saxophone at dusk", &config, &[]).await;
//!     println!("image ok: {}", outcome.is_success());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`StudioClient`], its builder and the error classifier |
//! | [`credentials`] | Credential resolver and persistent stores |
//! | [`request`] | Provider request builder |
//! | [`poll`] | Video job state machine, sleeper and cancellation |
//! | [`transport`] | Provider contract and the Gemini HTTP transport |
//! | [`types`] | Configs, reference images, assets, outcomes |
//! | [`archive`] | Local store, chat sessions and the asset archive |
//! | [`config`] | `STUDIO_*` environment configuration |

pub mod archive;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error_kind;
pub mod poll;
pub mod request;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{classify, StudioClient, StudioClientBuilder};
pub use config::StudioConfig;
pub use credentials::{Credential, CredentialResolver, CredentialSource};
pub use error_kind::{ErrorKind, Remediation, RetryHint};
pub use poll::{CancelHandle, PollProgress};
pub use types::OperationOutcome;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
