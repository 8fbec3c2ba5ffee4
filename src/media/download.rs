/// Save a drawing's image to disk
///
/// Images are usually data URIs and are decoded locally; older records
/// may hold a plain URL, which is fetched through the API client.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use rfd::AsyncFileDialog;
use tracing::info;

use super::{data_uri, MediaError};
use crate::api::ApiClient;

/// Ask where to save the image, then write it.
/// Returns `Ok(None)` if the user cancelled the dialog.
pub async fn save_draw_image(
    client: ApiClient,
    draw_id: String,
    image: String,
) -> Result<Option<PathBuf>, MediaError> {
    let (mime, bytes) = resolve_image(&client, &image).await?;

    let Some(handle) = AsyncFileDialog::new()
        .set_title("Save drawing")
        .set_file_name(default_file_name(&draw_id, &mime))
        .save_file()
        .await
    else {
        return Ok(None);
    };

    let path = handle.path().to_path_buf();
    write_image(&path, &bytes).await?;

    info!("💾 Saved image for {} to {}", draw_id, path.display());
    Ok(Some(path))
}

/// Turn a record's `image` field into a MIME type and bytes
pub async fn resolve_image(
    client: &ApiClient,
    image: &str,
) -> Result<(String, Vec<u8>), MediaError> {
    if image.trim().is_empty() {
        return Err(MediaError::Missing);
    }

    if let Some(decoded) = data_uri::decode(image) {
        return Ok(decoded);
    }

    let bytes = client
        .fetch_bytes(image)
        .await
        .map_err(|e| MediaError::Download(e.message()))?;

    let mime = ImageFormat::from_path(image)
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string());

    Ok((mime, bytes))
}

/// `image_<id>.<ext>`, with the extension taken from the MIME type
pub fn default_file_name(draw_id: &str, mime: &str) -> String {
    let extension = ImageFormat::from_mime_type(mime)
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("bin");

    format!("image_{}.{}", draw_id, extension)
}

pub async fn write_image(path: &Path, bytes: &[u8]) -> Result<(), MediaError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| MediaError::Write(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use httpmock::prelude::*;

    fn client(api_url: String) -> ApiClient {
        ApiClient::new(&Settings {
            api_url,
            ..Settings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(default_file_name("abc", "image/jpeg"), "image_abc.jpg");
        assert_eq!(default_file_name("abc", "image/png"), "image_abc.png");
        assert_eq!(default_file_name("abc", "application/x-what"), "image_abc.bin");
    }

    #[tokio::test]
    async fn test_resolve_data_uri_without_network() {
        // Unreachable base URL: decoding must not touch the network
        let client = client("http://127.0.0.1:1/".to_string());

        let (mime, bytes) = resolve_image(&client, "data:image/png;base64,aGk=")
            .await
            .unwrap();

        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"hi");
    }

    #[tokio::test]
    async fn test_resolve_plain_url_fetches() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/uploads/chair.jpg");
                then.status(200).body(vec![0xFFu8, 0xD8, 0xFF]);
            })
            .await;
        let client = client(server.base_url());

        let (mime, bytes) = resolve_image(&client, &server.url("/uploads/chair.jpg"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(mime, "image/jpeg");
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_resolve_empty_image() {
        let client = client("http://127.0.0.1:1/".to_string());
        let err = resolve_image(&client, "  ").await.unwrap_err();
        assert_eq!(err, MediaError::Missing);
    }

    #[tokio::test]
    async fn test_resolve_failed_download() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/uploads/gone.jpg");
                then.status(500);
            })
            .await;
        let client = client(server.base_url());

        let err = resolve_image(&client, &server.url("/uploads/gone.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::Download(_)));
    }

    #[tokio::test]
    async fn test_write_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_1.png");

        write_image(&path, b"pixels").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"pixels");
    }
}
