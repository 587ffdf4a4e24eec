//! Studio client: the chat, image and video operations.
//!
//! Implementation details are split into submodules under `src/client/`:
//!
//! | Module | Role |
//! |--------|------|
//! | `builder` | [`StudioClientBuilder`], collaborator injection |
//! | `core` | [`StudioClient`], credential lookup and failure settlement |
//! | `chat` / `image` / `video` | the three operations |
//! | `policy` | single-retry decision for transient failures |
//! | [`error_classification`] | raw message → [`crate::ErrorKind`] |

pub mod builder;
mod chat;
pub mod core;
pub mod error_classification;
mod image;
mod policy;
mod video;

pub use builder::StudioClientBuilder;
pub use core::StudioClient;
pub use error_classification::{classify, extract_retry_hint};
