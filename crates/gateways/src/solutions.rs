//! BugStash REST API client for solution search.

use async_trait::async_trait;
use bugstash_core::auth::AuthContext;
use bugstash_core::error::GatewayError;
use bugstash_core::search::{SearchGateway, SearchRequest, SearchResponse};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying a long-lived API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Client for `POST {api_url}/search`.
pub struct SolutionsApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl SolutionsApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = crate::http_client(DEFAULT_TIMEOUT);

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Replace the default 30s request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = crate::http_client(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(builder: reqwest::RequestBuilder, auth: &AuthContext) -> reqwest::RequestBuilder {
        match auth {
            AuthContext::Anonymous => builder,
            AuthContext::Bearer(token) => builder.header("Authorization", format!("Bearer {token}")),
            AuthContext::ApiKey(key) => builder.header(API_KEY_HEADER, key),
        }
    }
}

#[async_trait]
impl SearchGateway for SolutionsApiClient {
    async fn search(
        &self,
        request: &SearchRequest,
        auth: &AuthContext,
    ) -> std::result::Result<SearchResponse, GatewayError> {
        let url = format!("{}/search", self.base_url);

        debug!(
            query = %request.query,
            limit = request.limit,
            offset = request.offset,
            auth = auth.kind(),
            "Searching solutions"
        );

        let builder = self.client.post(&url).json(request);
        let response = Self::authorize(builder, auth)
            .send()
            .await
            .map_err(crate::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %error_body, "Search endpoint returned error");
            return Err(GatewayError::from_status(status.as_u16(), error_body));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(format!("Failed to parse search response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<(HeaderMap, serde_json::Value)>>>;

    fn search_router(seen: Seen) -> Router {
        Router::new().route(
            "/search",
            post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
                let seen = seen.clone();
                async move {
                    seen.lock().unwrap().push((headers, body));
                    Json(serde_json::json!({
                        "total": 1,
                        "results": [{
                            "id": "sol_42",
                            "title": "Cannot read properties of undefined",
                            "error_type": "TypeError",
                            "tags": ["javascript"],
                            "created_at": "2024-05-10T08:30:00Z",
                            "preview": "Check the prop before destructuring"
                        }]
                    }))
                }
            }),
        )
    }

    #[tokio::test]
    async fn search_posts_body_and_parses_results() {
        let seen: Seen = Arc::default();
        let base = crate::test_server::spawn(search_router(seen.clone())).await;
        let client = SolutionsApiClient::new(format!("{base}/"));

        let resp = client
            .search(&SearchRequest::new("TypeError", 3), &AuthContext::Anonymous)
            .await
            .unwrap();

        assert_eq!(resp.total, 1);
        assert_eq!(resp.results[0].id, "sol_42");

        let seen = seen.lock().unwrap();
        let (headers, body) = &seen[0];
        assert_eq!(body["query"], "TypeError");
        assert_eq!(body["limit"], 3);
        assert_eq!(body["offset"], 0);
        assert!(headers.get("authorization").is_none());
        assert!(headers.get("x-api-key").is_none());
    }

    #[tokio::test]
    async fn api_key_uses_header() {
        let seen: Seen = Arc::default();
        let base = crate::test_server::spawn(search_router(seen.clone())).await;
        let client = SolutionsApiClient::new(base);

        client
            .search(
                &SearchRequest::new("q", 5),
                &AuthContext::ApiKey("bs_live_123".into()),
            )
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0["x-api-key"], "bs_live_123");
        assert!(seen[0].0.get("authorization").is_none());
    }

    #[tokio::test]
    async fn bearer_uses_authorization() {
        let seen: Seen = Arc::default();
        let base = crate::test_server::spawn(search_router(seen.clone())).await;
        let client = SolutionsApiClient::new(base);

        client
            .search(
                &SearchRequest::new("q", 5).with_offset(10),
                &AuthContext::Bearer("jwt".into()),
            )
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0["authorization"], "Bearer jwt");
        assert_eq!(seen[0].1["offset"], 10);
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let router = Router::new().route(
            "/search",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "db unavailable") }),
        );
        let base = crate::test_server::spawn(router).await;
        let client = SolutionsApiClient::new(base);

        let err = client
            .search(&SearchRequest::new("q", 5), &AuthContext::Anonymous)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ApiError { status_code: 500, .. }));
    }

    #[tokio::test]
    async fn naive_timestamp_does_not_fail_the_search() {
        let router = Router::new().route(
            "/search",
            post(|| async {
                Json(serde_json::json!({
                    "total": 1,
                    "results": [{
                        "id": "sol_7",
                        "title": "ENOENT on postinstall",
                        "created_at": "2024-03-01T12:00:00"
                    }]
                }))
            }),
        );
        let base = crate::test_server::spawn(router).await;
        let client = SolutionsApiClient::new(base);

        let resp = client
            .search(&SearchRequest::new("ENOENT", 5), &AuthContext::Anonymous)
            .await
            .unwrap();
        assert_eq!(resp.results[0].id, "sol_7");
        assert_eq!(resp.results[0].created_at.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[tokio::test]
    async fn slow_search_times_out() {
        let router = Router::new().route(
            "/search",
            post(|| async {
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                Json(serde_json::json!({"total": 0, "results": []}))
            }),
        );
        let base = crate::test_server::spawn(router).await;
        let client = SolutionsApiClient::new(base).with_timeout(std::time::Duration::from_millis(100));

        let err = client
            .search(&SearchRequest::new("q", 5), &AuthContext::Anonymous)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = SolutionsApiClient::new(format!("http://{addr}"));
        let err = client
            .search(&SearchRequest::new("q", 5), &AuthContext::Anonymous)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
    }
}
