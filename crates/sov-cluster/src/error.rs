use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("no values proposed")]
    NoProposals,
    #[error("failed to encode value: {0}")]
    Json(#[from] serde_json::Error),
}
