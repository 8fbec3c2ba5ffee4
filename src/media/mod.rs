/// Image handling module
///
/// This module handles:
/// - Compressing picked images into upload-ready data URIs (compress.rs)
/// - Encoding/decoding data URIs (data_uri.rs)
/// - Saving a record's image to disk (download.rs)
/// - Loading card thumbnails off the UI thread (thumbnail.rs)

pub mod compress;
pub mod data_uri;
pub mod download;
pub mod thumbnail;

use thiserror::Error;

pub use compress::{compress_image, ensure_image, CompressionOptions, EncodedImage, ImageFile};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("only images are accepted")]
    Validation,
    #[error("failed to read image: {0}")]
    Read(String),
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
    #[error("image worker failed: {0}")]
    Worker(String),
    #[error("this drawing has no image")]
    Missing,
    #[error("failed to download image: {0}")]
    Download(String),
    #[error("failed to save image: {0}")]
    Write(String),
}
