use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SearchError;

/// Maximum accepted keyword length, in characters.
pub const MAX_KEYWORDS_CHARS: usize = 100;

/// Maximum accepted cookie length, in characters.
pub const MAX_COOKIE_CHARS: usize = 10_000;

/// A user search submission: keywords plus the auth cookie that the
/// workflow needs to query the target platform on the user's behalf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub keywords: String,
    pub cookie: String,
}

impl SearchRequest {
    /// Full client-side validation. The proxy itself only rejects empty
    /// fields; callers are expected to run this before going on the wire.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.keywords.is_empty() {
            return Err(SearchError::Validation("请输入搜索关键词".to_string()));
        }
        if self.keywords.chars().count() > MAX_KEYWORDS_CHARS {
            return Err(SearchError::Validation(
                "关键词不能超过100个字符".to_string(),
            ));
        }
        if self.cookie.is_empty() {
            return Err(SearchError::Validation("请输入 Cookie".to_string()));
        }
        if self.cookie.chars().count() > MAX_COOKIE_CHARS {
            return Err(SearchError::Validation("Cookie 过长".to_string()));
        }
        if !self.cookie.contains('=') {
            return Err(SearchError::Validation(
                "Cookie 格式无效，应包含键值对".to_string(),
            ));
        }
        Ok(())
    }
}

/// Uniform success/error wrapper the proxy returns for every call.
///
/// Exactly one envelope per proxied request. `success == false` implies
/// `data` is absent; absent optional fields are omitted from the JSON
/// rather than serialized as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResponseEnvelope {
    pub fn ok(data: Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: Some(message.into()),
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    pub fn err_with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: Some(message.into()),
        }
    }
}

/// One normalized, display-ready search result row.
///
/// Produced fresh on every normalization pass; ordering follows
/// discovery order in the source payload. `id` and `title` are always
/// non-empty, everything else is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    // Extended attributes, carried through from provider note cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_token: Option<String>,
}
