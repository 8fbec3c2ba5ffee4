/// Card thumbnails
///
/// Resolves a record's `image` field into raw bytes for the image widget.
/// Data URIs are base64-decoded on tokio's blocking pool; plain URLs are
/// downloaded through the API client.

use super::{data_uri, download, MediaError};
use crate::api::ApiClient;

pub async fn load_thumbnail(client: ApiClient, image: String) -> Result<Vec<u8>, MediaError> {
    if !image.starts_with("data:") {
        let (_, bytes) = download::resolve_image(&client, &image).await?;
        return Ok(bytes);
    }

    tokio::task::spawn_blocking(move || data_uri::decode(&image))
        .await
        .map_err(|e| MediaError::Worker(e.to_string()))?
        .map(|(_, bytes)| bytes)
        .ok_or_else(|| MediaError::Decode("malformed data URI".to_string()))
}
