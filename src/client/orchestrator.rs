use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Mutex;

use crate::api::error;
use crate::client::{
    preview::PreviewRegistry,
    rpc_client::AnalyzeTransport,
    upload_state::{UploadEntry, UploadPatch, UploadState, UploadStatus},
};
use crate::modules::image_analysis::model::{
    validate_image, AnalyzeImageRequest, AnalyzeImageResponse,
};
use crate::utils::encode_data_url;

#[derive(Debug, Clone)]
enum FileContent {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// A file picked for upload: its declared media type and size, and where to read it from.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    content: FileContent,
}

impl UploadFile {
    /// Media type is guessed from the extension, size comes from file metadata.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, error::SystemError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| error::SystemError::bad_request("Missing filename"))?
            .to_string();
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();

        Ok(Self { name, mime_type, size: metadata.len(), content: FileContent::Path(path.into()) })
    }

    pub fn in_memory(name: &str, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
            content: FileContent::Memory(bytes),
        }
    }

    pub async fn read(&self) -> Result<Vec<u8>, error::SystemError> {
        match &self.content {
            FileContent::Path(path) => Ok(tokio::fs::read(path).await?),
            FileContent::Memory(bytes) => Ok(bytes.clone()),
        }
    }

    fn source(&self) -> String {
        match &self.content {
            FileContent::Path(path) => path.display().to_string(),
            FileContent::Memory(_) => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// Refused before entering state; the message is meant for the user.
    Rejected(String),
    Completed,
    Failed(String),
    /// The entry was removed or cleared while its request was in flight.
    Discarded,
}

/// Drives each file through validate -> encode -> analyze -> state update.
pub struct UploadOrchestrator {
    state: Arc<Mutex<UploadState>>,
    transport: Arc<dyn AnalyzeTransport + Send + Sync>,
    previews: PreviewRegistry,
}

impl UploadOrchestrator {
    pub fn new(
        state: Arc<Mutex<UploadState>>,
        transport: Arc<dyn AnalyzeTransport + Send + Sync>,
        previews: PreviewRegistry,
    ) -> Self {
        Self { state, transport, previews }
    }

    pub fn state(&self) -> Arc<Mutex<UploadState>> {
        Arc::clone(&self.state)
    }

    /// Run every file's pipeline concurrently; results come back in input order.
    pub async fn process_files(&self, files: Vec<UploadFile>) -> Vec<(String, UploadOutcome)> {
        self.state.lock().await.begin_batch();

        let outcomes = join_all(files.into_iter().map(|file| async move {
            let name = file.name.clone();
            (name, self.process_file(file).await)
        }))
        .await;

        self.state.lock().await.end_batch();
        outcomes
    }

    pub async fn process_file(&self, file: UploadFile) -> UploadOutcome {
        if let Err(e) = validate_image(&file.mime_type, file.size) {
            tracing::warn!(file = %file.name, reason = %e, "upload rejected");
            return UploadOutcome::Rejected(e.to_string());
        }

        let preview = self.previews.create(file.source());
        self.state.lock().await.add_upload(UploadEntry::new(
            &file.name,
            &file.mime_type,
            file.size,
            preview,
        ));
        tracing::debug!(file = %file.name, "upload registered");

        self.update(&file.name, UploadPatch::status(UploadStatus::Uploading)).await;

        let bytes = match file.read().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(file = %file.name, error = %e, "failed to read file");
                return self.fail(&file.name, "Failed to read file").await;
            }
        };

        let request = AnalyzeImageRequest {
            image_data: encode_data_url(&file.mime_type, &bytes),
            filename: file.name.clone(),
            mime_type: file.mime_type.clone(),
        };

        self.update(&file.name, UploadPatch::status(UploadStatus::Processing)).await;

        match self.transport.analyze_image(request).await {
            Ok(AnalyzeImageResponse { success: true, analysis: Some(analysis), .. }) => {
                let mut state = self.state.lock().await;
                if !state.update_upload(&file.name, UploadPatch::completed(analysis.clone())) {
                    tracing::debug!(file = %file.name, "analysis arrived for untracked upload");
                    return UploadOutcome::Discarded;
                }
                state.add_analysis(analysis);
                tracing::info!(file = %file.name, "upload completed");
                UploadOutcome::Completed
            }
            Ok(response) => {
                let message =
                    response.error.unwrap_or_else(|| "Failed to analyze image".to_string());
                self.fail(&file.name, message).await
            }
            Err(e) => self.fail(&file.name, e.to_string()).await,
        }
    }

    /// Remove an upload and release its preview. An in-flight request is not cancelled;
    /// its response is dropped when it arrives.
    pub async fn remove_upload(&self, filename: &str) -> bool {
        self.state.lock().await.remove_upload(filename)
    }

    async fn update(&self, filename: &str, patch: UploadPatch) -> bool {
        let applied = self.state.lock().await.update_upload(filename, patch);
        if !applied {
            tracing::debug!(file = %filename, "upload no longer tracked");
        }
        applied
    }

    async fn fail(&self, filename: &str, message: impl Into<String>) -> UploadOutcome {
        let message = message.into();
        tracing::warn!(file = %filename, error = %message, "upload failed");
        if !self.update(filename, UploadPatch::failed(message.clone())).await {
            return UploadOutcome::Discarded;
        }
        UploadOutcome::Failed(message)
    }
}
