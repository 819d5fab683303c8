use reqwest::StatusCode;

use crate::{
    api::error,
    modules::image_analysis::{
        model::AnalysisPatch, repository::AnalysisRepository, schema::Analysis,
    },
};

/// Talks to the sibling `/api/images` endpoints under the configured app URL.
#[derive(Clone)]
pub struct AnalysisRepositoryHttp {
    http: reqwest::Client,
    base_url: String,
}

impl AnalysisRepositoryHttp {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_string() }
    }

    fn images_url(&self) -> String {
        format!("{}/api/images", self.base_url)
    }

    fn image_url(&self, id: &str) -> String {
        format!("{}/api/images/{}", self.base_url, id)
    }
}

#[async_trait::async_trait]
impl AnalysisRepository for AnalysisRepositoryHttp {
    async fn fetch_all(&self) -> Result<Vec<Analysis>, error::SystemError> {
        let response = self.http.get(self.images_url()).send().await?;
        if !response.status().is_success() {
            return Err(error::SystemError::UpstreamStatus(response.status().as_u16()));
        }
        Ok(response.json::<Vec<Analysis>>().await?)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Analysis>, error::SystemError> {
        let response = self.http.get(self.image_url(id)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json::<Analysis>().await?)),
            status => Err(error::SystemError::UpstreamStatus(status.as_u16())),
        }
    }

    async fn update(
        &self,
        id: &str,
        patch: &AnalysisPatch,
    ) -> Result<Analysis, error::SystemError> {
        let response = self.http.put(self.image_url(id)).json(patch).send().await?;
        if !response.status().is_success() {
            return Err(error::SystemError::UpstreamStatus(response.status().as_u16()));
        }
        Ok(response.json::<Analysis>().await?)
    }

    async fn delete(&self, id: &str) -> Result<bool, error::SystemError> {
        let response = self.http.delete(self.image_url(id)).send().await?;
        Ok(response.status().is_success())
    }
}
