use std::env;

/// Application configuration loaded once from environment variables.
///
/// The three workflow settings are deliberately optional at load time:
/// a missing setting is a per-request configuration error (HTTP 500),
/// not a startup failure, so the server can boot and report its own
/// misconfiguration through the diagnostic endpoint.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: Option<String>,
    pub workflow_id: Option<String>,
    pub api_base_url: Option<String>,

    // Web server
    pub host: String,
    pub port: u16,
}

/// Borrowed view of the three workflow settings, available only when
/// all of them are present.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowSettings<'a> {
    pub token: &'a str,
    pub workflow_id: &'a str,
    pub base_url: &'a str,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_token: optional_env("COZE_API_TOKEN"),
            workflow_id: optional_env("COZE_WORKFLOW_ID"),
            api_base_url: optional_env("COZE_API_BASE_URL"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a number"),
        }
    }

    /// The workflow settings, if all three are configured.
    pub fn workflow(&self) -> Option<WorkflowSettings<'_>> {
        Some(WorkflowSettings {
            token: self.api_token.as_deref()?,
            workflow_id: self.workflow_id.as_deref()?,
            base_url: self.api_base_url.as_deref()?,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>, workflow_id: Option<&str>, base_url: Option<&str>) -> Config {
        Config {
            api_token: token.map(String::from),
            workflow_id: workflow_id.map(String::from),
            api_base_url: base_url.map(String::from),
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }

    #[test]
    fn workflow_present_when_fully_configured() {
        let config = config(Some("cztei_x"), Some("wf-1"), Some("https://api.coze.cn/v1"));
        let settings = config.workflow().unwrap();
        assert_eq!(settings.token, "cztei_x");
        assert_eq!(settings.workflow_id, "wf-1");
        assert_eq!(settings.base_url, "https://api.coze.cn/v1");
    }

    #[test]
    fn workflow_absent_without_base_url() {
        assert!(config(Some("t"), Some("w"), None).workflow().is_none());
    }

    #[test]
    fn workflow_absent_without_token() {
        assert!(config(None, Some("w"), Some("u")).workflow().is_none());
    }
}
