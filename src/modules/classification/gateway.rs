use crate::modules::classification::model::{Classification, ClassifyError};

/// Remote image classifier: image bytes in, provider-ranked labels out.
///
/// Implementations make a single attempt and return the provider's order untouched;
/// truncation and rounding are the caller's concern.
#[async_trait::async_trait]
pub trait ClassificationGateway {
    async fn classify(
        &self,
        image: Vec<u8>,
        model_id: &str,
    ) -> Result<Vec<Classification>, ClassifyError>;
}
