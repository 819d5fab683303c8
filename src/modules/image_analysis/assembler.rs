use chrono::Utc;
use uuid::Uuid;

use crate::modules::{
    classification::model::Classification,
    image_analysis::schema::{Analysis, AnalysisStatus, Tag},
};

pub const MAX_TAGS: usize = 5;

pub fn round_confidence(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Turn provider results into a completed analysis.
///
/// Keeps the first `MAX_TAGS` results in the order the provider ranked them.
pub fn assemble_analysis(
    results: &[Classification],
    filename: &str,
    file_size: u64,
    mime_type: &str,
    image_url: String,
) -> Analysis {
    let now = Utc::now();

    let tags = results
        .iter()
        .take(MAX_TAGS)
        .map(|result| Tag {
            id: Uuid::now_v7().to_string(),
            label: result.label.clone(),
            confidence: round_confidence(result.score),
            created_at: now,
        })
        .collect();

    Analysis {
        id: Uuid::now_v7().to_string(),
        filename: filename.to_string(),
        original_name: filename.to_string(),
        file_size,
        mime_type: mime_type.to_string(),
        image_url,
        tags,
        status: AnalysisStatus::Completed,
        error: None,
        created_at: now,
        updated_at: now,
    }
}
