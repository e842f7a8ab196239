use serde::Deserialize;

/// Response to a DIRECT-MANUAL submission. On success the body carries the
/// URL to poll for import status.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub body: Option<SubmitBody>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    pub url: String,
}

/// Response from the import status endpoint.
#[derive(Debug, Deserialize)]
pub struct PollResponse {
    pub success: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub body: Option<PollBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollBody {
    pub import_status: String,
    #[serde(default)]
    pub import: Option<ImportSummary>,
}

/// Final import accounting attached to a `completed` status.
#[derive(Debug, Deserialize)]
pub struct ImportSummary {
    /// Ids of the inserted scores; only the count is interesting here.
    #[serde(rename = "scoreIDs", default)]
    pub score_ids: Vec<serde_json::Value>,
    #[serde(default)]
    pub errors: Vec<ImportErrorDetail>,
}

/// One per-record import failure reported by Kamaitachi.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportErrorDetail {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// Envelope returned by the key verification endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub description: String,
}
