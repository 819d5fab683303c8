use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Uploading,
    Processing,
    Completed,
    Error,
}

/// One classification label attached to an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Tag {
    pub id: String,
    pub label: String,
    #[validate(range(min = 0.0, max = 1.0, message = "Confidence must be between 0 and 1"))]
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

/// Classification outcome for one uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: String,
    pub filename: String,
    pub original_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub image_url: String,
    pub tags: Vec<Tag>,
    pub status: AnalysisStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updated_at")]
    pub updated_at: DateTime<Utc>,
}
