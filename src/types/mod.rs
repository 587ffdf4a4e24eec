//! Core data types shared by the builder, the operations and the archive.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ChatTurn`] | One replayed turn of a conversation |
//! | [`ReferenceImage`] | Media type + base64 payload of an input image |
//! | [`ImageConfig`] / [`VideoConfig`] | User-selected generation settings |
//! | [`GeneratedAsset`] | Archived record of a finished generation |
//! | [`OperationOutcome`] | `Success(payload)` or `Failure(ErrorKind)` |
//!
//! ## Example
//!
//! ```rust
//! use creative_studio::types::{AspectRatio, ImageConfig, QualityTier, ReferenceImage};
//!
//! let config = ImageConfig::new(QualityTier::High).with_aspect_ratio(AspectRatio::Landscape16x9);
//! assert_eq!(config.aspect_ratio.as_str(), "16:9");
//!
//! let img = ReferenceImage::from_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
//! assert_eq!(img.media_type, "image/png");
//! ```

pub mod asset;
pub mod config;
pub mod media;
pub mod message;
pub mod outcome;

pub use asset::{AssetConfig, AssetKind, GeneratedAsset, GeneratedImage, VideoArtifact};
pub use config::{AspectRatio, ImageConfig, ImageSize, QualityTier, VideoConfig, VideoResolution};
pub use media::ReferenceImage;
pub use message::{ChatReply, ChatTurn, Citation, Role};
pub use outcome::OperationOutcome;
