//! Client-side request/response cycle manager for the search proxy.
//!
//! One [`SearchSession`] tracks one active search: the last result
//! payload, a loading flag, and the last failure. The payload is
//! stored untouched; normalization into display rows happens at
//! render time via [`SearchSession::rows`], not during the fetch.

pub mod hint;

use serde_json::Value;
use tracing::warn;

use redsearch_common::{normalize, ResponseEnvelope, RowRecord, SearchError, SearchRequest};

use hint::FailureKind;

/// A failed search: the user-facing message plus the coarse category
/// that display layers key hint text off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFailure {
    pub message: String,
    pub kind: FailureKind,
}

pub struct SearchSession {
    http: reqwest::Client,
    base_url: String,
    data: Option<Value>,
    loading: bool,
    error: Option<SearchFailure>,
}

impl SearchSession {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            data: None,
            loading: false,
            error: None,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&SearchFailure> {
        self.error.as_ref()
    }

    /// Submit a search. Previous results and errors are cleared first;
    /// on any failure the payload stays empty and the failure is
    /// recorded. Invalid input never reaches the network.
    pub async fn search(&mut self, request: &SearchRequest) {
        self.data = None;
        self.error = None;

        if let Err(failure) = validate(request) {
            self.error = Some(failure);
            return;
        }

        self.loading = true;
        match self.post(request).await {
            Ok(value) => self.data = Some(value),
            Err(failure) => {
                warn!(error = %failure.message, "Search failed");
                self.error = Some(failure);
            }
        }
        self.loading = false;
    }

    async fn post(&self, request: &SearchRequest) -> Result<Value, SearchFailure> {
        let url = format!("{}/api/search", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| SearchFailure {
                message: format!("网络错误: {e}"),
                kind: FailureKind::Transport,
            })?;

        let status = response.status().as_u16();
        let envelope: ResponseEnvelope = response.json().await.map_err(|_| SearchFailure {
            message: format!("HTTP 错误: {status}"),
            kind: hint::classify_status(status),
        })?;

        if !(200..300).contains(&status) || !envelope.success {
            // Prefer the envelope's own error text over a generic
            // status-derived message.
            return Err(SearchFailure {
                message: envelope
                    .error
                    .unwrap_or_else(|| format!("HTTP 错误: {status}")),
                kind: hint::classify_status(status),
            });
        }
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    /// Normalize the held payload into display rows.
    pub fn rows(&self) -> Vec<RowRecord> {
        self.data
            .as_ref()
            .map(normalize::normalize)
            .unwrap_or_default()
    }

    /// Drop the result payload and failure; the loading flag is left
    /// alone.
    pub fn clear_results(&mut self) {
        self.data = None;
        self.error = None;
    }
}

/// Client-side validation: the shared request rules plus the
/// header-encoding check for the cookie.
fn validate(request: &SearchRequest) -> Result<(), SearchFailure> {
    if let Err(e) = request.validate() {
        let message = match e {
            SearchError::Validation(message) => message,
            other => other.to_string(),
        };
        return Err(SearchFailure {
            message,
            kind: FailureKind::InvalidInput,
        });
    }
    if !request.cookie.is_ascii() {
        return Err(SearchFailure {
            message: "Cookie 包含非 ASCII 字符".to_string(),
            kind: FailureKind::CookieEncoding,
        });
    }
    Ok(())
}

/// Strip non-ASCII characters from a cookie. Returns the cleaned
/// cookie and how many characters were removed.
pub fn clean_cookie(cookie: &str) -> (String, usize) {
    let cleaned: String = cookie.chars().filter(char::is_ascii).collect();
    let removed = cookie.chars().count() - cleaned.chars().count();
    (cleaned, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};

    fn request(keywords: &str, cookie: &str) -> SearchRequest {
        SearchRequest {
            keywords: keywords.to_string(),
            cookie: cookie.to_string(),
        }
    }

    /// Stub proxy bound to an ephemeral loopback port.
    async fn serve_proxy(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn successful_search_stores_payload_untouched() {
        let base = serve_proxy(Router::new().route(
            "/api/search",
            post(|| async {
                Json(serde_json::json!({
                    "success": true,
                    "data": {"data": [{"title": "hit"}]},
                    "message": "搜索完成"
                }))
            }),
        ))
        .await;

        let mut session = SearchSession::new(&base);
        session.search(&request("rust", "a=b")).await;

        assert!(session.error().is_none());
        assert!(!session.is_loading());
        assert_eq!(
            session.data().unwrap(),
            &serde_json::json!({"data": [{"title": "hit"}]})
        );
        // Normalization happens at render time, from the stored value.
        let rows = session.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "hit");
    }

    #[tokio::test]
    async fn envelope_error_preferred_over_status_message() {
        let base = serve_proxy(Router::new().route(
            "/api/search",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({
                        "success": false,
                        "error": "API 调用失败: 401",
                        "message": "unauthorized"
                    })),
                )
            }),
        ))
        .await;

        let mut session = SearchSession::new(&base);
        session.search(&request("rust", "a=b")).await;

        let failure = session.error().unwrap();
        assert_eq!(failure.message, "API 调用失败: 401");
        assert_eq!(failure.kind, FailureKind::TokenRejected);
        assert!(session.data().is_none());
    }

    #[tokio::test]
    async fn unparseable_error_body_falls_back_to_status() {
        let base = serve_proxy(Router::new().route(
            "/api/search",
            post(|| async { (StatusCode::BAD_GATEWAY, "bad gateway").into_response() }),
        ))
        .await;

        let mut session = SearchSession::new(&base);
        session.search(&request("rust", "a=b")).await;

        let failure = session.error().unwrap();
        assert_eq!(failure.message, "HTTP 错误: 502");
        assert_eq!(failure.kind, FailureKind::UpstreamFailure);
    }

    #[tokio::test]
    async fn declared_failure_with_ok_status_is_still_a_failure() {
        let base = serve_proxy(Router::new().route(
            "/api/search",
            post(|| async {
                Json(serde_json::json!({"success": false, "error": "搜索失败"}))
            }),
        ))
        .await;

        let mut session = SearchSession::new(&base);
        session.search(&request("rust", "a=b")).await;

        assert_eq!(session.error().unwrap().message, "搜索失败");
    }

    #[tokio::test]
    async fn cookie_without_equals_never_reaches_network() {
        // Unroutable proxy: a network attempt would produce a
        // Transport failure, not InvalidInput.
        let mut session = SearchSession::new("http://127.0.0.1:1");
        session.search(&request("rust", "foo")).await;

        let failure = session.error().unwrap();
        assert_eq!(failure.kind, FailureKind::InvalidInput);
        assert_eq!(failure.message, "Cookie 格式无效，应包含键值对");
    }

    #[tokio::test]
    async fn non_ascii_cookie_rejected_before_network() {
        let mut session = SearchSession::new("http://127.0.0.1:1");
        session.search(&request("rust", "a=b; 名字=值")).await;

        assert_eq!(session.error().unwrap().kind, FailureKind::CookieEncoding);
    }

    #[tokio::test]
    async fn unreachable_proxy_is_a_transport_failure() {
        let mut session = SearchSession::new("http://127.0.0.1:1");
        session.search(&request("rust", "a=b")).await;

        assert_eq!(session.error().unwrap().kind, FailureKind::Transport);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn new_search_clears_previous_failure() {
        let base = serve_proxy(Router::new().route(
            "/api/search",
            post(|| async {
                Json(serde_json::json!({"success": true, "data": {"content": "ok"}}))
            }),
        ))
        .await;

        let mut session = SearchSession::new(&base);
        session.search(&request("rust", "foo")).await;
        assert!(session.error().is_some());

        session.search(&request("rust", "a=b")).await;
        assert!(session.error().is_none());
        assert!(session.data().is_some());
    }

    #[tokio::test]
    async fn clear_results_resets_data_and_error() {
        let mut session = SearchSession::new("http://127.0.0.1:1");
        session.search(&request("rust", "foo")).await;
        assert!(session.error().is_some());

        session.clear_results();
        assert!(session.error().is_none());
        assert!(session.data().is_none());
        assert!(session.rows().is_empty());
    }

    #[test]
    fn clean_cookie_strips_and_counts() {
        let (cleaned, removed) = clean_cookie("a=b; 名字=值; c=d");
        assert_eq!(cleaned, "a=b; =; c=d");
        assert_eq!(removed, 3);

        let (cleaned, removed) = clean_cookie("a=b");
        assert_eq!(cleaned, "a=b");
        assert_eq!(removed, 0);
    }
}
