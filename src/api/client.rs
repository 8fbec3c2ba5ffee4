/// HTTP client for the catalog backend
///
/// Constructed once from `Settings` and cloned into every background task
/// (the inner `reqwest::Client` is reference counted, so clones are cheap).
/// All responses pass through `send`, which is the only place errors are
/// normalized into `ApiError`.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::ApiError;
use crate::settings::Settings;
use crate::state::data::{DrawPage, DrawsResponse, MessageResponse, NewDraw};

/// Bounded retry for idempotent requests (GET, DELETE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Delay before retry `n` is `backoff * n`
    pub backoff: Duration,
}

impl RetryPolicy {
    fn delay(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    page_size: u32,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            base_url: settings.api_url.trim().trim_end_matches('/').to_string(),
            page_size: settings.page_size,
            retry: RetryPolicy {
                max_retries: settings.max_retries,
                backoff: Duration::from_millis(settings.retry_backoff_ms),
            },
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET /draws/{page}?search={term}&limit={page_size}`
    pub async fn fetch_draws(&self, page: u32, search: &str) -> Result<DrawPage, ApiError> {
        let url = self.url(&format!("draws/{page}"));
        let limit = self.page_size.to_string();
        debug!(page, search, limit = self.page_size, "fetching draws");

        let response: DrawsResponse = self
            .with_retry(|| {
                send(
                    self.http
                        .get(&url)
                        .query(&[("search", search), ("limit", limit.as_str())]),
                )
            })
            .await?;

        Ok(response.draws)
    }

    /// `POST /add`, returning the server's confirmation message.
    /// Never retried: a lost response could otherwise create duplicates.
    pub async fn add_draw(&self, draw: &NewDraw) -> Result<String, ApiError> {
        debug!(kind = %draw.kind, image_len = draw.image.len(), "creating draw");

        let response: MessageResponse = send(self.http.post(self.url("add")).json(draw)).await?;
        Ok(response.message)
    }

    /// `DELETE /delete/{id}`, returning the server's confirmation message
    pub async fn delete_draw(&self, id: &str) -> Result<String, ApiError> {
        let url = self.url(&format!("delete/{id}"));
        debug!(id, "deleting draw");

        let response: MessageResponse = self.with_retry(|| send(self.http.delete(&url))).await?;
        Ok(response.message)
    }

    /// Download raw bytes from an absolute URL (record images stored as links)
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        self.with_retry(|| send_for_bytes(self.http.get(url))).await
    }

    /// Run an idempotent request, retrying transient failures per the policy
    async fn with_retry<T, F, Fut>(&self, request: F) -> Result<T, ApiError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 0;
        loop {
            match request().await {
                Err(err) if self.should_retry(&err, attempt) => {
                    attempt += 1;
                    self.wait_before_retry(&err, attempt).await;
                }
                result => return result,
            }
        }
    }

    fn should_retry(&self, err: &ApiError, attempt: u32) -> bool {
        err.is_transient() && attempt < self.retry.max_retries
    }

    async fn wait_before_retry(&self, err: &ApiError, attempt: u32) {
        let delay = self.retry.delay(attempt);
        warn!(
            attempt,
            max = self.retry.max_retries,
            ?delay,
            error = %err,
            "request failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

/// Send a request and decode a JSON body, normalizing every failure
async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::from_transport(&e))?;

    let response = check_status(response).await?;

    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Send a request and return the raw body bytes
async fn send_for_bytes(request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::from_transport(&e))?;

    let response = check_status(response).await?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::from_transport(&e))?;
    Ok(bytes.to_vec())
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // The body is only needed for 4xx messages; a failed read leaves it empty
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_status(status, &body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::SERVER_ERROR_MESSAGE;
    use crate::state::data::ClientInfo;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer, max_retries: u32) -> ApiClient {
        let settings = Settings {
            api_url: format!("{}/", server.base_url()),
            max_retries,
            retry_backoff_ms: 0,
            ..Settings::default()
        };
        ApiClient::new(&settings).unwrap()
    }

    fn page_body() -> serde_json::Value {
        json!({
            "draws": {
                "docs": [
                    {"_id": "1", "type": "Chair", "client": {"name": "Ana", "address": "Rua A"}, "image": "x"},
                    {"_id": "2", "type": "Chair", "client": {"name": "Bia", "address": "Rua B"}, "image": "y"}
                ],
                "hasNextPage": true
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_targets_page_search_and_limit() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/draws/2")
                    .query_param("search", "chair")
                    .query_param("limit", "20");
                then.status(200).json_body(page_body());
            })
            .await;

        let page = client_for(&server, 0).fetch_draws(2, "chair").await.unwrap();

        mock.assert_async().await;
        assert!(page.has_next_page);
        let ids: Vec<_> = page.docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_fetch_sends_empty_search() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/draws/1")
                    .query_param("search", "")
                    .query_param("limit", "20");
                then.status(200)
                    .json_body(json!({"draws": {"docs": [], "hasNextPage": false}}));
            })
            .await;

        let page = client_for(&server, 0).fetch_draws(1, "").await.unwrap();

        mock.assert_async().await;
        assert!(page.docs.is_empty());
        assert!(!page.has_next_page);
    }

    #[tokio::test]
    async fn test_add_posts_payload_and_returns_message() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/add").json_body(json!({
                    "type": "Table",
                    "client": {"name": "Caio", "address": "Rua C"},
                    "image": "data:image/jpeg;base64,AAAA"
                }));
                then.status(201).json_body(json!({"message": "OK"}));
            })
            .await;

        let draw = NewDraw {
            kind: "Table".to_string(),
            client: ClientInfo {
                name: "Caio".to_string(),
                address: "Rua C".to_string(),
            },
            image: "data:image/jpeg;base64,AAAA".to_string(),
        };

        let message = client_for(&server, 0).add_draw(&draw).await.unwrap();

        mock.assert_async().await;
        assert_eq!(message, "OK");
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/delete/abc123");
                then.status(200).json_body(json!({"message": "Deleted"}));
            })
            .await;

        let message = client_for(&server, 0).delete_draw("abc123").await.unwrap();

        mock.assert_async().await;
        assert_eq!(message, "Deleted");
    }

    #[tokio::test]
    async fn test_server_error_is_normalized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/draws/1");
                then.status(503).body("<html>upstream down</html>");
            })
            .await;

        let err = client_for(&server, 0).fetch_draws(1, "").await.unwrap_err();

        assert_eq!(err, ApiError::Server(503));
        assert_eq!(err.message(), SERVER_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_application_error_passes_through() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/delete/missing");
                then.status(404).json_body(json!({"message": "Draw not found"}));
            })
            .await;

        let err = client_for(&server, 0).delete_draw("missing").await.unwrap_err();

        assert_eq!(err.message(), "Draw not found");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let settings = Settings {
            api_url: "http://127.0.0.1:1/".to_string(),
            ..Settings::default()
        };
        let client = ApiClient::new(&settings).unwrap();

        let err = client.fetch_draws(1, "").await.unwrap_err();

        assert_eq!(err, ApiError::Network);
    }

    #[tokio::test]
    async fn test_get_is_retried_on_server_error() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/draws/1");
                then.status(500);
            })
            .await;

        let err = client_for(&server, 2).fetch_draws(1, "").await.unwrap_err();

        assert_eq!(err, ApiError::Server(500));
        assert_eq!(mock.hits_async().await, 3);
    }

    #[tokio::test]
    async fn test_post_is_never_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/add");
                then.status(502);
            })
            .await;

        let draw = NewDraw {
            kind: "Bed".to_string(),
            client: ClientInfo::default(),
            image: "data:image/png;base64,AA".to_string(),
        };

        let err = client_for(&server, 3).add_draw(&draw).await.unwrap_err();

        assert_eq!(err, ApiError::Server(502));
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/draws/9");
                then.status(400).json_body(json!({"message": "bad page"}));
            })
            .await;

        let err = client_for(&server, 3).fetch_draws(9, "").await.unwrap_err();

        assert_eq!(err.message(), "bad page");
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/draws/1");
                then.status(200).body("not json");
            })
            .await;

        let err = client_for(&server, 0).fetch_draws(1, "").await.unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_bytes() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/images/1.jpg");
                then.status(200).body(vec![0xFFu8, 0xD8, 0xFF]);
            })
            .await;

        let bytes = client_for(&server, 0)
            .fetch_bytes(&server.url("/images/1.jpg"))
            .await
            .unwrap();

        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);
    }
}
