//! Typed client for the Coze workflow-execution API.
//!
//! Wraps reqwest with the two calls the search service needs: running
//! a workflow via the streaming endpoint (draining the whole stream
//! into one string) and probing token validity against the workflows
//! listing endpoint.

pub mod error;
mod stream;
pub mod types;

pub use error::{CozeError, Result};
pub use types::{WorkflowParameters, WorkflowRequest};

use tracing::debug;

use stream::drain_text;

pub struct CozeClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl CozeClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Execute a workflow run and drain the streamed response into one
    /// contiguous string. A non-success status surfaces as
    /// [`CozeError::Api`] carrying the upstream status and body text.
    pub async fn stream_run(
        &self,
        workflow_id: &str,
        cookie: &str,
        keywords: &str,
    ) -> Result<String> {
        let url = format!("{}/workflow/stream_run", self.base_url);
        let body = WorkflowRequest {
            workflow_id: workflow_id.to_string(),
            parameters: WorkflowParameters {
                cookie: cookie.to_string(),
                keywords: keywords.to_string(),
            },
        };

        debug!(workflow_id, "Dispatching workflow stream_run");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(CozeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        drain_text(resp).await
    }

    /// Probe the workflows listing endpoint with the configured token.
    /// Returns the HTTP status, letting the caller decide what counts
    /// as valid. Only transport failures are errors.
    pub async fn probe_token(&self) -> Result<u16> {
        let url = format!("{}/workflows", self.base_url);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Content-Type", "application/json")
            .send()
            .await?;
        Ok(resp.status().as_u16())
    }
}
