use crate::{
    api::error,
    modules::image_analysis::{model::AnalysisPatch, schema::Analysis},
};

/// Backing store for analyses. Lives outside this service.
#[async_trait::async_trait]
pub trait AnalysisRepository {
    async fn fetch_all(&self) -> Result<Vec<Analysis>, error::SystemError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Analysis>, error::SystemError>;

    async fn update(&self, id: &str, patch: &AnalysisPatch)
        -> Result<Analysis, error::SystemError>;

    async fn delete(&self, id: &str) -> Result<bool, error::SystemError>;
}
