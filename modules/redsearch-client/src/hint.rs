//! Contextual hint text for failed searches.
//!
//! Hints are keyed off a coarse failure category derived from where
//! the failure was produced (local validation) or from the proxy's
//! HTTP status, never from substring matching on rendered messages.

/// Coarse failure categories, as seen from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Locally rejected input: empty fields, malformed or oversized
    /// values.
    InvalidInput,
    /// The cookie contains characters that cannot survive the trip to
    /// the upstream platform.
    CookieEncoding,
    /// The proxy reported its own configuration as incomplete.
    MissingConfig,
    /// The upstream refused the configured token.
    TokenRejected,
    /// The upstream failed with some other status.
    UpstreamFailure,
    /// The proxy could not be reached at all.
    Transport,
}

/// Classify a proxy failure by its HTTP status code.
pub fn classify_status(status: u16) -> FailureKind {
    match status {
        400 => FailureKind::InvalidInput,
        401 | 403 => FailureKind::TokenRejected,
        500 => FailureKind::MissingConfig,
        _ => FailureKind::UpstreamFailure,
    }
}

const TOKEN_HINT: &str =
    "请检查 COZE_API_TOKEN 环境变量是否正确、Token 是否已过期，必要时重新获取新的 API Token";

const ENCODING_HINT: &str =
    "Cookie 中包含非 ASCII 字符（如中文、特殊符号），请清理后重试，确保 Cookie 只包含英文字母、数字和基本符号";

/// Hint text to show alongside the error message, when there is a
/// known remediation for the category.
pub fn hint_for(kind: FailureKind) -> Option<&'static str> {
    match kind {
        FailureKind::TokenRejected | FailureKind::MissingConfig => Some(TOKEN_HINT),
        FailureKind::CookieEncoding => Some(ENCODING_HINT),
        FailureKind::InvalidInput | FailureKind::UpstreamFailure | FailureKind::Transport => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_map_to_token_rejection() {
        assert_eq!(classify_status(401), FailureKind::TokenRejected);
        assert_eq!(classify_status(403), FailureKind::TokenRejected);
    }

    #[test]
    fn server_error_maps_to_missing_config() {
        assert_eq!(classify_status(500), FailureKind::MissingConfig);
    }

    #[test]
    fn other_statuses_are_upstream_failures() {
        assert_eq!(classify_status(429), FailureKind::UpstreamFailure);
        assert_eq!(classify_status(502), FailureKind::UpstreamFailure);
    }

    #[test]
    fn token_categories_share_the_token_hint() {
        assert_eq!(
            hint_for(FailureKind::TokenRejected),
            hint_for(FailureKind::MissingConfig)
        );
        assert!(hint_for(FailureKind::TokenRejected).unwrap().contains("COZE_API_TOKEN"));
    }

    #[test]
    fn upstream_failures_carry_no_hint() {
        assert_eq!(hint_for(FailureKind::UpstreamFailure), None);
    }
}
