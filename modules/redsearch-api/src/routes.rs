use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use coze_client::{CozeClient, CozeError};
use redsearch_common::{ResponseEnvelope, SearchError, SearchRequest};

use crate::AppState;

/// Characters of the token echoed back by the diagnostic endpoint.
const TOKEN_PREFIX_CHARS: usize = 10;

fn envelope(status: StatusCode, envelope: ResponseEnvelope) -> (StatusCode, Json<ResponseEnvelope>) {
    (status, Json(envelope))
}

/// Proxy a search to the workflow API: validate, call, drain, and
/// re-package the drained stream as a single JSON envelope.
pub async fn api_search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> impl IntoResponse {
    match run_search(&state, &body).await {
        Ok(data) => envelope(StatusCode::OK, ResponseEnvelope::ok(data, "搜索完成")),
        Err(err) => {
            let status =
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
            envelope(status, error_envelope(err))
        }
    }
}

/// Validate the request, dispatch the workflow, and parse-or-wrap the
/// drained payload. Errors are detected in taxonomy order: validation
/// and configuration before any network I/O, then a single upstream
/// call with no retry.
async fn run_search(state: &AppState, body: &SearchRequest) -> Result<Value, SearchError> {
    if body.keywords.is_empty() {
        return Err(SearchError::Validation("关键词不能为空".to_string()));
    }
    if body.cookie.is_empty() {
        return Err(SearchError::Validation("Cookie 不能为空".to_string()));
    }

    let settings = state.config.workflow().ok_or_else(|| {
        warn!("Workflow settings missing, rejecting search");
        SearchError::Config("服务配置错误".to_string())
    })?;

    let client = CozeClient::new(settings.base_url, settings.token);
    let raw = client
        .stream_run(settings.workflow_id, &body.cookie, &body.keywords)
        .await
        .map_err(|e| match e {
            CozeError::Api { status, message } => {
                error!(status, body = %message, "Workflow API call failed");
                SearchError::Upstream {
                    status,
                    body: message,
                }
            }
            CozeError::Network(detail) => {
                error!(error = %detail, "Workflow API unreachable");
                SearchError::Network(detail)
            }
        })?;

    info!(keywords = %body.keywords, "Search completed");

    // Strict parse first; a non-JSON payload is wrapped rather than
    // failed, so a successful upstream call still yields an envelope.
    Ok(match serde_json::from_str::<Value>(&raw) {
        Ok(value) => value,
        Err(_) => serde_json::json!({ "content": raw }),
    })
}

fn error_envelope(err: SearchError) -> ResponseEnvelope {
    match err {
        SearchError::Validation(message) => ResponseEnvelope::err(message),
        SearchError::Config(message) => ResponseEnvelope::err(message),
        SearchError::Upstream { status, body } => {
            ResponseEnvelope::err_with_message(format!("API 调用失败: {status}"), body)
        }
        SearchError::Network(detail) => {
            ResponseEnvelope::err_with_message("服务器内部错误", detail)
        }
    }
}

/// Presence/shape report for the three workflow settings. Never
/// carries the token value itself, only a truncated prefix and length.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigReport {
    has_token: bool,
    token_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_length: Option<usize>,
    has_workflow_id: bool,
    has_api_base_url: bool,
}

impl ConfigReport {
    fn from_config(config: &redsearch_common::Config) -> Self {
        let token = config.api_token.as_deref();
        Self {
            has_token: token.is_some(),
            token_valid: token
                .is_some_and(|t| !t.contains("REPLACE") && !t.contains("请替换")),
            token_prefix: token.map(|t| {
                let prefix: String = t.chars().take(TOKEN_PREFIX_CHARS).collect();
                format!("{prefix}...")
            }),
            token_length: token.map(str::len),
            has_workflow_id: config.workflow_id.is_some(),
            has_api_base_url: config.api_base_url.is_some(),
        }
    }
}

/// Diagnostic endpoint: report configuration shape and probe the token
/// against the workflows listing endpoint.
pub async fn api_test_token(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = ConfigReport::from_config(&state.config);
    let config = serde_json::to_value(&report).unwrap_or_default();

    if !report.token_valid {
        return Json(serde_json::json!({
            "success": false,
            "error": "Token 未配置或无效",
            "config": config,
        }));
    }

    // A valid-looking token is probed for real, which needs the base
    // URL as well.
    let (Some(token), Some(base_url)) = (
        state.config.api_token.as_deref(),
        state.config.api_base_url.as_deref(),
    ) else {
        return Json(serde_json::json!({
            "success": false,
            "error": "服务配置错误",
            "config": config,
        }));
    };

    let client = CozeClient::new(base_url, token);
    match client.probe_token().await {
        Ok(status) => {
            let ok = (200..300).contains(&status);
            Json(serde_json::json!({
                "success": ok,
                "status": status,
                "message": if ok { "Token 有效" } else { "Token 无效或权限不足" },
                "config": config,
            }))
        }
        Err(e) => {
            warn!(error = %e, "Token probe failed");
            Json(serde_json::json!({
                "success": false,
                "error": "API 连接失败",
                "message": e.to_string(),
                "config": config,
            }))
        }
    }
}
