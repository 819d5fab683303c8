use serde::{Deserialize, Serialize};

/// One ranked label returned by the classification provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

impl Classification {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self { label: label.into(), score }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ClassifyError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("{0}")]
    Transport(String),
    #[error("Invalid classification response: {0}")]
    InvalidResponse(String),
}

impl ClassifyError {
    pub fn status(code: u16) -> Self {
        Self::Transport(format!("HTTP error! status: {code}"))
    }
}

/// Error body the provider sends instead of a result list (model loading, bad input).
#[derive(Debug, Deserialize)]
pub struct ProviderErrorBody {
    pub error: String,
}
