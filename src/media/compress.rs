/// Upload image compression
///
/// Turns a picked file into a size-bounded data URI for the `POST /add`
/// payload:
/// 1. Reject anything whose MIME type is not `image/*` (no decode work)
/// 2. Keep the original bytes if they already fit both limits
/// 3. Otherwise downscale to `max_dimension` on the longer side and
///    re-encode (JPEG with falling quality, PNG when there is alpha),
///    shrinking further until the byte limit is met
/// 4. Base64 the result into a data URI
///
/// Steps 2-3 are CPU-bound and run on tokio's blocking pool.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use serde::Deserialize;
use tracing::{debug, info};

use super::{data_uri, MediaError};

/// JPEG qualities tried in order until the output fits
const JPEG_QUALITIES: [u8; 6] = [90, 80, 70, 60, 50, 40];
/// Each extra round shrinks both sides to this fraction
const SHRINK_FACTOR: f32 = 0.8;
/// Give up after this many shrink rounds
const MAX_ROUNDS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompressionOptions {
    /// Upper bound for the encoded (pre-base64) image
    pub max_size_bytes: u64,
    /// Upper bound for the longer side, in pixels
    pub max_dimension: u32,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_size_bytes: 1024 * 1024,
            max_dimension: 1920,
        }
    }
}

/// A file picked by the user
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Read a file from disk, deriving its MIME type from the extension
    pub async fn read(path: PathBuf) -> Result<Self, MediaError> {
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| MediaError::Read(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            name: file_name(&path),
            mime: mime_for_path(&path),
            bytes,
        })
    }
}

/// Compressed upload ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub name: String,
    pub mime: String,
    pub width: u32,
    pub height: u32,
    /// Size of the binary image before base64
    pub byte_len: usize,
    pub data_uri: String,
}

/// Extensions the `image` crate does not know, by MIME type.
/// Image types here pass validation and fail later at decode.
const EXTRA_MIME_TYPES: &[(&str, &str)] = &[
    ("svg", "image/svg+xml"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("jxl", "image/jxl"),
    ("jp2", "image/jp2"),
    ("psd", "image/vnd.adobe.photoshop"),
    ("txt", "text/plain"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("mp3", "audio/mpeg"),
];

/// MIME type from a file extension; unknown extensions map to `application/octet-stream`
pub fn mime_for_path(path: &Path) -> String {
    if let Ok(format) = ImageFormat::from_path(path) {
        return format.to_mime_type().to_string();
    }

    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            EXTRA_MIME_TYPES
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        })
        .map_or("application/octet-stream", |(_, mime)| *mime)
        .to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Only images are accepted
pub fn ensure_image(mime: &str) -> Result<(), MediaError> {
    if mime.starts_with("image") {
        Ok(())
    } else {
        Err(MediaError::Validation)
    }
}

/// Validate, compress and encode a picked file
pub async fn compress_image(
    file: ImageFile,
    options: CompressionOptions,
) -> Result<EncodedImage, MediaError> {
    ensure_image(&file.mime)?;

    info!(
        name = %file.name,
        mime = %file.mime,
        size_kb = file.bytes.len() / 1024,
        "🗜️ compressing upload"
    );

    tokio::task::spawn_blocking(move || compress_blocking(file, &options))
        .await
        .map_err(|e| MediaError::Worker(e.to_string()))?
}

/// Blocking version of the whole pipeline
fn compress_blocking(
    file: ImageFile,
    options: &CompressionOptions,
) -> Result<EncodedImage, MediaError> {
    let (width, height) = ImageReader::new(Cursor::new(&file.bytes))
        .with_guessed_format()
        .map_err(|e| MediaError::Decode(e.to_string()))?
        .into_dimensions()
        .map_err(|e| MediaError::Decode(e.to_string()))?;

    if fits(file.bytes.len(), width, height, options) {
        debug!(width, height, "upload already within limits, keeping original");
        return Ok(EncodedImage {
            data_uri: data_uri::encode(&file.mime, &file.bytes),
            byte_len: file.bytes.len(),
            name: file.name,
            mime: file.mime,
            width,
            height,
        });
    }

    let decoded =
        image::load_from_memory(&file.bytes).map_err(|e| MediaError::Decode(e.to_string()))?;
    let (bytes, mime, image) = shrink_to_fit(decoded, options)?;
    let (width, height) = image.dimensions();

    info!(
        width,
        height,
        before_kb = file.bytes.len() / 1024,
        after_kb = bytes.len() / 1024,
        "✅ upload compressed"
    );

    Ok(EncodedImage {
        name: file.name,
        mime: mime.to_string(),
        width,
        height,
        byte_len: bytes.len(),
        data_uri: data_uri::encode(mime, &bytes),
    })
}

fn fits(len: usize, width: u32, height: u32, options: &CompressionOptions) -> bool {
    len as u64 <= options.max_size_bytes && width.max(height) <= options.max_dimension
}

/// Downscale and re-encode until the result fits the byte limit.
/// Returns the encoded bytes, their MIME type and the final image.
fn shrink_to_fit(
    image: DynamicImage,
    options: &CompressionOptions,
) -> Result<(Vec<u8>, &'static str, DynamicImage), MediaError> {
    let max = options.max_dimension.max(1);
    let mut image = if image.width().max(image.height()) > max {
        // resize() keeps the aspect ratio and fits inside the box
        image.resize(max, max, FilterType::Lanczos3)
    } else {
        image
    };

    let has_alpha = image.color().has_alpha();

    for round in 0..MAX_ROUNDS {
        let (bytes, mime) = if has_alpha {
            (encode_png(&image)?, "image/png")
        } else {
            (encode_jpeg(&image, options.max_size_bytes)?, "image/jpeg")
        };

        if bytes.len() as u64 <= options.max_size_bytes {
            return Ok((bytes, mime, image));
        }

        let (width, height) = image.dimensions();
        debug!(round, width, height, size = bytes.len(), "still too large, shrinking");

        if width <= 1 && height <= 1 {
            break;
        }
        let new_width = ((width as f32 * SHRINK_FACTOR) as u32).max(1);
        let new_height = ((height as f32 * SHRINK_FACTOR) as u32).max(1);
        image = image.resize(new_width, new_height, FilterType::Triangle);
    }

    Err(MediaError::Encode(format!(
        "could not fit image under {} bytes",
        options.max_size_bytes
    )))
}

/// Highest-quality JPEG that fits, or the smallest one tried
fn encode_jpeg(image: &DynamicImage, max_size: u64) -> Result<Vec<u8>, MediaError> {
    let rgb = image.to_rgb8();
    let mut smallest = Vec::new();

    for quality in JPEG_QUALITIES {
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, quality)
            .encode_image(&rgb)
            .map_err(|e| MediaError::Encode(e.to_string()))?;

        if buffer.len() as u64 <= max_size {
            return Ok(buffer);
        }
        smallest = buffer;
    }

    Ok(smallest)
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, MediaError> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| MediaError::Encode(e.to_string()))?;
    Ok(buffer)
}
