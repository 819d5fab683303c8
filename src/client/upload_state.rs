use std::fmt;

use serde::{Deserialize, Serialize};

use crate::client::preview::Preview;
use crate::modules::image_analysis::{model::AnalysisPatch, schema::Analysis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Processing,
    Completed,
    Error,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UploadStatus::Pending => "pending",
            UploadStatus::Uploading => "uploading",
            UploadStatus::Processing => "processing",
            UploadStatus::Completed => "completed",
            UploadStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Client-side record of one upload, keyed by filename.
#[derive(Debug)]
pub struct UploadEntry {
    pub filename: String,
    pub mime_type: String,
    pub file_size: u64,
    pub preview: Preview,
    pub status: UploadStatus,
    pub analysis: Option<Analysis>,
    pub error: Option<String>,
}

impl UploadEntry {
    pub fn new(filename: &str, mime_type: &str, file_size: u64, preview: Preview) -> Self {
        Self {
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            file_size,
            preview,
            status: UploadStatus::Pending,
            analysis: None,
            error: None,
        }
    }
}

impl fmt::Display for UploadEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let megabytes = self.file_size as f64 / 1024.0 / 1024.0;
        write!(f, "{} ({:.2} MB) - {}", self.filename, megabytes, self.status)?;
        if let Some(error) = &self.error {
            write!(f, ": {error}")?;
        }
        if let Some(analysis) = &self.analysis {
            for tag in &analysis.tags {
                write!(f, "\n  {:<32} {:>3}%", tag.label, (tag.confidence * 100.0).round() as i64)?;
            }
        }
        Ok(())
    }
}

/// Partial update of an upload entry.
#[derive(Debug, Clone, Default)]
pub struct UploadPatch {
    pub status: Option<UploadStatus>,
    pub analysis: Option<Analysis>,
    pub error: Option<String>,
}

impl UploadPatch {
    pub fn status(status: UploadStatus) -> Self {
        Self { status: Some(status), ..Default::default() }
    }

    pub fn completed(analysis: Analysis) -> Self {
        Self { status: Some(UploadStatus::Completed), analysis: Some(analysis), error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { status: Some(UploadStatus::Error), analysis: None, error: Some(error.into()) }
    }

    /// Merge into `entry` unless the result would break the status invariant:
    /// `completed` carries an analysis, `error` carries a message, never both.
    fn apply(self, entry: &mut UploadEntry) -> bool {
        let status = self.status.unwrap_or(entry.status);
        let mut analysis = self.analysis.or_else(|| entry.analysis.clone());
        let mut error = self.error.or_else(|| entry.error.clone());

        match status {
            UploadStatus::Completed => error = None,
            UploadStatus::Error => analysis = None,
            _ => {}
        }

        let consistent = match status {
            UploadStatus::Completed => analysis.is_some(),
            UploadStatus::Error => error.as_deref().is_some_and(|e| !e.is_empty()),
            _ => analysis.is_none() && error.is_none(),
        };
        if !consistent {
            tracing::warn!(file = %entry.filename, %status, "ignoring inconsistent upload patch");
            return false;
        }

        entry.status = status;
        entry.analysis = analysis;
        entry.error = error;
        true
    }
}

/// In-memory store for uploads in flight and the analyses they produced.
///
/// Every operation is total: touching a key that isn't present does nothing.
#[derive(Debug, Default)]
pub struct UploadState {
    uploads: Vec<UploadEntry>,
    analyses: Vec<Analysis>,
    loading: bool,
    active_batches: usize,
    error: Option<String>,
}

impl UploadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploads(&self) -> &[UploadEntry] {
        &self.uploads
    }

    pub fn upload(&self, filename: &str) -> Option<&UploadEntry> {
        self.uploads.iter().find(|u| u.filename == filename)
    }

    /// Adds `entry`; an existing entry with the same filename is replaced and its
    /// preview released.
    pub fn add_upload(&mut self, entry: UploadEntry) {
        match self.uploads.iter_mut().find(|u| u.filename == entry.filename) {
            Some(existing) => *existing = entry,
            None => self.uploads.push(entry),
        }
    }

    pub fn update_upload(&mut self, filename: &str, patch: UploadPatch) -> bool {
        match self.uploads.iter_mut().find(|u| u.filename == filename) {
            Some(entry) => patch.apply(entry),
            None => false,
        }
    }

    pub fn remove_upload(&mut self, filename: &str) -> bool {
        let before = self.uploads.len();
        self.uploads.retain(|u| u.filename != filename);
        self.uploads.len() != before
    }

    pub fn clear_uploads(&mut self) {
        self.uploads.clear();
    }

    pub fn analyses(&self) -> &[Analysis] {
        &self.analyses
    }

    pub fn analysis(&self, id: &str) -> Option<&Analysis> {
        self.analyses.iter().find(|a| a.id == id)
    }

    pub fn add_analysis(&mut self, analysis: Analysis) {
        match self.analyses.iter_mut().find(|a| a.id == analysis.id) {
            Some(existing) => *existing = analysis,
            None => self.analyses.push(analysis),
        }
    }

    pub fn update_analysis(&mut self, id: &str, patch: &AnalysisPatch) -> bool {
        if let Err(e) = patch.check() {
            tracing::warn!(analysis = %id, error = %e, "ignoring invalid analysis patch");
            return false;
        }
        match self.analyses.iter_mut().find(|a| a.id == id) {
            Some(analysis) => {
                patch.apply(analysis);
                true
            }
            None => false,
        }
    }

    pub fn remove_analysis(&mut self, id: &str) -> bool {
        let before = self.analyses.len();
        self.analyses.retain(|a| a.id != id);
        self.analyses.len() != before
    }

    pub fn clear_analyses(&mut self) {
        self.analyses.clear();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Marks a batch as started; `loading` stays set until every open batch has ended.
    pub fn begin_batch(&mut self) {
        self.active_batches += 1;
        self.loading = true;
    }

    pub fn end_batch(&mut self) {
        self.active_batches = self.active_batches.saturating_sub(1);
        self.loading = self.active_batches > 0;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::preview::PreviewRegistry;
    use crate::modules::classification::model::Classification;
    use crate::modules::image_analysis::{assembler::assemble_analysis, schema::AnalysisStatus};

    fn entry(registry: &PreviewRegistry, name: &str) -> UploadEntry {
        UploadEntry::new(name, "image/png", 2048, registry.create(name))
    }

    fn analysis_for(name: &str) -> Analysis {
        let results = [Classification::new("cat", 0.9)];
        assemble_analysis(&results, name, 2048, "image/png", String::new())
    }

    #[test]
    fn add_update_remove_single_upload() {
        let registry = PreviewRegistry::new();
        let mut state = UploadState::new();

        state.add_upload(entry(&registry, "f.png"));
        assert!(state.update_upload("f.png", UploadPatch::completed(analysis_for("f.png"))));

        assert_eq!(state.uploads().len(), 1);
        let stored = state.upload("f.png").unwrap();
        assert_eq!(stored.status, UploadStatus::Completed);
        assert!(stored.analysis.is_some());

        assert!(state.remove_upload("f.png"));
        assert!(state.uploads().is_empty());
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn completed_without_analysis_is_not_applied() {
        let registry = PreviewRegistry::new();
        let mut state = UploadState::new();
        state.add_upload(entry(&registry, "f.png"));

        assert!(!state.update_upload("f.png", UploadPatch::status(UploadStatus::Completed)));
        assert_eq!(state.upload("f.png").unwrap().status, UploadStatus::Pending);
    }

    #[test]
    fn failure_clears_analysis_and_keeps_message() {
        let registry = PreviewRegistry::new();
        let mut state = UploadState::new();
        state.add_upload(entry(&registry, "f.png"));
        state.update_upload("f.png", UploadPatch::completed(analysis_for("f.png")));

        assert!(state.update_upload("f.png", UploadPatch::failed("Failed to analyze image")));
        let stored = state.upload("f.png").unwrap();
        assert_eq!(stored.status, UploadStatus::Error);
        assert!(stored.analysis.is_none());
        assert_eq!(stored.error.as_deref(), Some("Failed to analyze image"));
    }

    #[test]
    fn different_filenames_update_independently() {
        let registry = PreviewRegistry::new();
        let mut state = UploadState::new();
        state.add_upload(entry(&registry, "a.png"));
        state.add_upload(entry(&registry, "b.png"));
        state.update_upload("a.png", UploadPatch::status(UploadStatus::Processing));
        state.update_upload("b.png", UploadPatch::status(UploadStatus::Processing));

        state.update_upload("b.png", UploadPatch::completed(analysis_for("b.png")));

        let a = state.upload("a.png").unwrap();
        assert_eq!(a.status, UploadStatus::Processing);
        assert!(a.analysis.is_none());
        assert_eq!(state.upload("b.png").unwrap().status, UploadStatus::Completed);
    }

    #[test]
    fn updates_for_absent_keys_are_no_ops() {
        let mut state = UploadState::new();
        assert!(!state.update_upload("ghost.png", UploadPatch::failed("late")));
        assert!(!state.remove_upload("ghost.png"));
        assert!(!state.update_analysis(
            "ghost",
            &AnalysisPatch { filename: Some("x.png".into()), ..Default::default() }
        ));
        assert!(state.uploads().is_empty());
    }

    #[test]
    fn re_adding_a_filename_replaces_and_releases_preview() {
        let registry = PreviewRegistry::new();
        let mut state = UploadState::new();
        state.add_upload(entry(&registry, "dup.png"));
        state.add_upload(entry(&registry, "dup.png"));

        assert_eq!(state.uploads().len(), 1);
        assert_eq!(registry.live(), 1);

        state.clear_uploads();
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn analyses_store_is_keyed_by_id() {
        let mut state = UploadState::new();
        let first = analysis_for("a.png");
        let second = analysis_for("b.png");
        state.add_analysis(first.clone());
        state.add_analysis(second.clone());

        let patch = AnalysisPatch {
            status: Some(AnalysisStatus::Error),
            error: Some(Some("rejected".into())),
            ..Default::default()
        };
        assert!(state.update_analysis(&first.id, &patch));
        assert!(!state.update_analysis(&first.id, &AnalysisPatch::default()));

        let updated = state.analysis(&first.id).unwrap();
        assert_eq!(updated.status, AnalysisStatus::Error);
        assert!(updated.updated_at >= first.updated_at);
        assert_eq!(state.analysis(&second.id), Some(&second));

        assert!(state.remove_analysis(&second.id));
        assert_eq!(state.analyses().len(), 1);
        state.clear_analyses();
        assert!(state.analyses().is_empty());
    }

    #[test]
    fn global_flags() {
        let mut state = UploadState::new();
        assert!(!state.is_loading());
        state.set_loading(true);
        state.set_error(Some("offline".into()));
        assert!(state.is_loading());
        assert_eq!(state.error(), Some("offline"));
        state.set_error(None);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn loading_clears_only_after_the_last_batch() {
        let mut state = UploadState::new();
        state.begin_batch();
        state.begin_batch();
        state.end_batch();
        assert!(state.is_loading());
        state.end_batch();
        assert!(!state.is_loading());
        state.end_batch();
        assert!(!state.is_loading());
    }

    #[test]
    fn renders_tags_as_percentages() {
        let registry = PreviewRegistry::new();
        let mut upload = entry(&registry, "cat.png");
        UploadPatch::completed(analysis_for("cat.png")).apply(&mut upload);

        let rendered = upload.to_string();
        assert!(rendered.starts_with("cat.png (0.00 MB) - completed"));
        assert!(rendered.contains("90%"));
    }
}
