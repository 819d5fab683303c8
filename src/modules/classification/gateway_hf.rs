use crate::modules::classification::{
    gateway::ClassificationGateway,
    model::{Classification, ClassifyError, ProviderErrorBody},
};

/// Hugging Face inference API client.
#[derive(Clone)]
pub struct HuggingFaceGateway {
    http: reqwest::Client,
    inference_url: String,
    token: Option<String>,
}

impl HuggingFaceGateway {
    pub fn new(http: reqwest::Client, inference_url: String, token: Option<String>) -> Self {
        Self { http, inference_url: inference_url.trim_end_matches('/').to_string(), token }
    }

    fn model_url(&self, model_id: &str) -> String {
        format!("{}/{}", self.inference_url, model_id.trim_start_matches('/'))
    }
}

#[async_trait::async_trait]
impl ClassificationGateway for HuggingFaceGateway {
    async fn classify(
        &self,
        image: Vec<u8>,
        model_id: &str,
    ) -> Result<Vec<Classification>, ClassifyError> {
        let token = self.token.as_deref().ok_or_else(|| {
            ClassifyError::Unauthorized("Hugging Face API token not provided".into())
        })?;

        log::debug!("Classifying {} bytes with model {}", image.len(), model_id);

        let response = self
            .http
            .post(self.model_url(model_id))
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await
            .map_err(|e| ClassifyError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ClassifyError::Transport(e.to_string()))?;

        parse_response(status, &body)
    }
}

/// Map a provider reply to ranked classifications.
pub fn parse_response(status: u16, body: &str) -> Result<Vec<Classification>, ClassifyError> {
    match status {
        200..=299 => {}
        401 | 403 => {
            return Err(ClassifyError::Unauthorized(format!(
                "Hugging Face API rejected the credential (status {status})"
            )));
        }
        _ => {
            log::warn!("Hugging Face API returned {}: {}", status, body);
            return Err(ClassifyError::status(status));
        }
    }

    let results: Vec<Classification> = match serde_json::from_str(body) {
        Ok(results) => results,
        Err(parse_err) => {
            if let Ok(provider) = serde_json::from_str::<ProviderErrorBody>(body) {
                return Err(ClassifyError::InvalidResponse(provider.error));
            }
            return Err(ClassifyError::InvalidResponse(parse_err.to_string()));
        }
    };

    if let Some(bad) =
        results.iter().find(|r| !r.score.is_finite() || !(0.0..=1.0).contains(&r.score))
    {
        return Err(ClassifyError::InvalidResponse(format!(
            "score {} for label '{}' is outside [0, 1]",
            bad.score, bad.label
        )));
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_provider_order() {
        let body = r#"[{"label":"tabby cat","score":0.61},{"label":"tiger cat","score":0.72}]"#;
        let results = parse_response(200, body).unwrap();
        assert_eq!(
            results,
            vec![Classification::new("tabby cat", 0.61), Classification::new("tiger cat", 0.72)]
        );
    }

    #[test]
    fn maps_credential_rejection_to_unauthorized() {
        let err = parse_response(401, r#"{"error":"Invalid credentials"}"#).unwrap_err();
        assert!(matches!(err, ClassifyError::Unauthorized(_)));
    }

    #[test]
    fn maps_other_statuses_to_transport_errors() {
        let err = parse_response(500, "oops").unwrap_err();
        assert!(matches!(err, ClassifyError::Transport(_)));
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[test]
    fn surfaces_provider_error_bodies() {
        let err = parse_response(200, r#"{"error":"Model is currently loading"}"#).unwrap_err();
        match err {
            ClassifyError::InvalidResponse(msg) => assert_eq!(msg, "Model is currently loading"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_scores_out_of_range() {
        let err = parse_response(200, r#"[{"label":"cat","score":1.7}]"#).unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn missing_token_fails_before_any_request() {
        let gateway =
            HuggingFaceGateway::new(reqwest::Client::new(), "http://127.0.0.1:9".into(), None);
        let err = gateway.classify(vec![1, 2, 3], "google/vit-base-patch16-224").await.unwrap_err();
        assert!(matches!(err, ClassifyError::Unauthorized(_)));
    }

    #[test]
    fn builds_model_url_without_double_slashes() {
        let gateway = HuggingFaceGateway::new(
            reqwest::Client::new(),
            "https://api-inference.huggingface.co/models/".into(),
            Some("hf_x".into()),
        );
        assert_eq!(
            gateway.model_url("google/vit-base-patch16-224"),
            "https://api-inference.huggingface.co/models/google/vit-base-patch16-224"
        );
    }
}
