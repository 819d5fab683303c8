use serde::de::DeserializeOwned;

use crate::api::{error, success::SuccessData};
use crate::modules::image_analysis::model::{
    AnalyzeImageRequest, AnalyzeImageResponse, HealthStatus,
};

/// The one procedure the uploader needs from the server.
#[async_trait::async_trait]
pub trait AnalyzeTransport {
    async fn analyze_image(
        &self,
        request: AnalyzeImageRequest,
    ) -> Result<AnalyzeImageResponse, error::SystemError>;
}

/// JSON-over-HTTP client for the `/api/rpc` procedures.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    base_url: String,
}

impl RpcClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_string() }
    }

    fn procedure_url(&self, procedure: &str) -> String {
        format!("{}/api/rpc/{}", self.base_url, procedure)
    }

    pub async fn health_check(&self) -> Result<HealthStatus, error::SystemError> {
        let response = self.http.get(self.procedure_url("healthCheck")).send().await?;
        read_data(response).await
    }
}

async fn read_data<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, error::SystemError> {
    if !response.status().is_success() {
        return Err(error::SystemError::UpstreamStatus(response.status().as_u16()));
    }
    response.json::<SuccessData<T>>().await?.into_data()
}

#[async_trait::async_trait]
impl AnalyzeTransport for RpcClient {
    async fn analyze_image(
        &self,
        request: AnalyzeImageRequest,
    ) -> Result<AnalyzeImageResponse, error::SystemError> {
        let response =
            self.http.post(self.procedure_url("analyzeImage")).json(&request).send().await?;
        read_data(response).await
    }
}
