use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    api::error,
    modules::image_analysis::schema::{Analysis, AnalysisStatus, Tag},
    utils::double_option,
};

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB

pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Upload acceptance rules shared by the uploader and the multipart endpoint
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_size: u64,
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            allowed_mime_types: ALLOWED_MIME_TYPES.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl UploadConfig {
    /// Validate file type and size
    pub fn validate(&self, mime_type: &str, file_size: u64) -> Result<(), error::SystemError> {
        if !self.allowed_mime_types.iter().any(|allowed| allowed == mime_type) {
            return Err(error::SystemError::bad_request(
                "Invalid file type. Please upload JPEG, PNG, WebP, or GIF images.",
            ));
        }

        if file_size > self.max_file_size {
            return Err(error::SystemError::bad_request(
                "File size too large. Please upload images smaller than 10MB.",
            ));
        }

        Ok(())
    }
}

lazy_static::lazy_static! {
    static ref DEFAULT_UPLOAD_CONFIG: UploadConfig = UploadConfig::default();
}

pub fn validate_image(mime_type: &str, file_size: u64) -> Result<(), error::SystemError> {
    DEFAULT_UPLOAD_CONFIG.validate(mime_type, file_size)
}

/// Body of `POST /api/analyze`. Absent fields come through empty and fail validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Image data is required"))]
    pub image_data: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Filename is required"))]
    pub filename: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "MIME type is required"))]
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeImageResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyzeImageResponse {
    pub fn completed(analysis: Analysis) -> Self {
        Self { success: true, analysis: Some(analysis), error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, analysis: None, error: Some(error.into()) }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ImageIdModel {
    #[validate(length(min = 1, message = "Image ID is required"))]
    pub id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateImageModel {
    #[validate(length(min = 1, message = "Image ID is required"))]
    pub id: String,
    #[validate(nested)]
    pub update: AnalysisPatch,
}

/// Partial update of a stored analysis. `error: null` clears the message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct AnalysisPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Filename cannot be empty"))]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AnalysisStatus>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub error: Option<Option<String>>,
}

impl AnalysisPatch {
    pub fn is_empty(&self) -> bool {
        self.filename.is_none()
            && self.tags.is_none()
            && self.status.is_none()
            && self.error.is_none()
    }

    /// Checks that can't be expressed as field attributes.
    pub fn check(&self) -> Result<(), error::SystemError> {
        if self.is_empty() {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        if let Some(tags) = &self.tags {
            for tag in tags {
                tag.validate().map_err(|e| error::SystemError::bad_request(e.to_string()))?;
            }
        }

        Ok(())
    }

    /// Merge into `analysis` and refresh `updated_at`. The error message is dropped
    /// whenever the resulting status is not `error`.
    pub fn apply(&self, analysis: &mut Analysis) {
        if let Some(filename) = &self.filename {
            analysis.filename = filename.clone();
        }
        if let Some(tags) = &self.tags {
            analysis.tags = tags.clone();
        }
        if let Some(status) = self.status {
            analysis.status = status;
        }
        if let Some(error) = &self.error {
            analysis.error = error.clone();
        }
        if analysis.status != AnalysisStatus::Error {
            analysis.error = None;
        }
        analysis.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub message: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            message: "Visual Tagging API is running".to_string(),
        }
    }
}
