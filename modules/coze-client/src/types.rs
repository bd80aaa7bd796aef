use serde::Serialize;

/// Body for the workflow stream_run endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRequest {
    pub workflow_id: String,
    pub parameters: WorkflowParameters,
}

/// Inputs the workflow receives: the auth cookie for the target
/// platform plus the search keywords.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowParameters {
    pub cookie: String,
    pub keywords: String,
}
