use log::{error, info};
use std::sync::Arc;
use validator::Validate;

use crate::api::error as api_error;
use crate::modules::classification::gateway::ClassificationGateway;
use crate::modules::image_analysis::{
    assembler::assemble_analysis,
    model::{AnalysisPatch, AnalyzeImageRequest},
    repository::AnalysisRepository,
    schema::Analysis,
};
use crate::utils::decode_base64;

#[derive(Clone)]
pub struct ImageAnalysisService {
    repo: Arc<dyn AnalysisRepository + Send + Sync>,
    gateway: Arc<dyn ClassificationGateway + Send + Sync>,
    model_id: String,
}

impl ImageAnalysisService {
    pub fn with_dependencies(
        repo: Arc<dyn AnalysisRepository + Send + Sync>,
        gateway: Arc<dyn ClassificationGateway + Send + Sync>,
        model_id: String,
    ) -> Self {
        info!("ImageAnalysisService initialized with model {}", model_id);
        ImageAnalysisService { repo, gateway, model_id }
    }

    /// Decode, classify and assemble. Fails with `BadRequest` before touching the
    /// provider when a required field is empty.
    pub async fn analyze(
        &self,
        request: AnalyzeImageRequest,
    ) -> Result<Analysis, api_error::SystemError> {
        request
            .validate()
            .map_err(|_| api_error::SystemError::bad_request("Missing required fields"))?;

        let AnalyzeImageRequest { image_data, filename, mime_type } = request;

        let bytes = decode_base64(&image_data)?;
        let file_size = bytes.len() as u64;

        let results = self.gateway.classify(bytes, &self.model_id).await?;

        let analysis = assemble_analysis(&results, &filename, file_size, &mime_type, image_data);
        info!(
            "Analyzed {} ({} bytes): {} tag(s)",
            analysis.filename,
            analysis.file_size,
            analysis.tags.len()
        );
        Ok(analysis)
    }

    /// Empty when the store can't be reached.
    pub async fn fetch_all(&self) -> Vec<Analysis> {
        match self.repo.fetch_all().await {
            Ok(images) => images,
            Err(e) => {
                error!("Error fetching images: {}", e);
                Vec::new()
            }
        }
    }

    /// `Ok(None)` is a lookup miss; `Err` means the store itself failed.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Analysis>, api_error::SystemError> {
        self.repo.find_by_id(id).await.inspect_err(|e| error!("Error fetching image {}: {}", id, e))
    }

    pub async fn update(
        &self,
        id: &str,
        patch: AnalysisPatch,
    ) -> Result<Option<Analysis>, api_error::SystemError> {
        patch.check()?;

        match self.repo.update(id, &patch).await {
            Ok(analysis) => Ok(Some(analysis)),
            Err(e) => {
                error!("Error updating image {}: {}", id, e);
                Ok(None)
            }
        }
    }

    pub async fn delete(&self, id: &str) -> bool {
        match self.repo.delete(id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                error!("Error deleting image {}: {}", id, e);
                false
            }
        }
    }
}
