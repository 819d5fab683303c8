use actix_multipart::Multipart;
use actix_web::{get, http::StatusCode, post, web, HttpResponse};
use futures_util::TryStreamExt;

use crate::api::{error, success};
use crate::modules::image_analysis::{
    model::{
        self, AnalyzeImageRequest, AnalyzeImageResponse, HealthStatus, ImageIdModel,
        UpdateImageModel,
    },
    schema::Analysis,
    service::ImageAnalysisService,
};
use crate::utils::{encode_data_url, ValidatedJson, ValidatedQuery};

/// Raw analyze endpoint. Always answers with the `{success, analysis?, error?}` envelope:
/// 400 for a missing field, 500 for any provider or decoding failure.
#[post("/analyze")]
pub async fn analyze(
    service: web::Data<ImageAnalysisService>,
    body: web::Bytes,
) -> HttpResponse {
    let request = match serde_json::from_slice::<AnalyzeImageRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("Rejected analyze request body: {}", e);
            return HttpResponse::BadRequest()
                .json(AnalyzeImageResponse::failed("Missing required fields"));
        }
    };

    match service.analyze(request).await {
        Ok(analysis) => HttpResponse::Ok().json(AnalyzeImageResponse::completed(analysis)),
        Err(e) => {
            let status = if e.is_bad_request() {
                StatusCode::BAD_REQUEST
            } else {
                log::error!("Error analyzing image: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            };
            HttpResponse::build(status).json(AnalyzeImageResponse::failed(e.to_string()))
        }
    }
}

/// Upload a single image as multipart form data and analyze it in one step.
#[post("/images/upload")]
pub async fn upload_image(
    mut payload: Multipart,
    service: web::Data<ImageAnalysisService>,
) -> Result<success::Success<Analysis>, error::Error> {
    if let Some(mut field) = payload.try_next().await.map_err(|_| error::Error::InternalServer)? {
        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| error::Error::bad_request("Missing content disposition"))?;

        let filename = content_disposition
            .get_filename()
            .ok_or_else(|| error::Error::bad_request("Missing filename"))?
            .to_string();

        let mime_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        // Reject on type before buffering anything
        model::validate_image(&mime_type, 0)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(|_| error::Error::InternalServer)? {
            bytes.extend_from_slice(&chunk);
            model::validate_image(&mime_type, bytes.len() as u64)?;
        }

        let request = AnalyzeImageRequest {
            image_data: encode_data_url(&mime_type, &bytes),
            filename,
            mime_type,
        };
        let analysis = service.analyze(request).await?;

        return Ok(success::Success::created(Some(analysis)).message("Image analyzed successfully"));
    }

    Err(error::Error::bad_request("No file found in request"))
}

#[post("/analyzeImage")]
pub async fn analyze_image(
    service: web::Data<ImageAnalysisService>,
    input: ValidatedJson<AnalyzeImageRequest>,
) -> success::Success<AnalyzeImageResponse> {
    let response = match service.analyze(input.0).await {
        Ok(analysis) => AnalyzeImageResponse::completed(analysis),
        Err(e) => {
            log::error!("Error during image analysis: {}", e);
            AnalyzeImageResponse::failed(e.to_string())
        }
    };
    success::Success::ok(Some(response))
}

#[get("/getImages")]
pub async fn get_images(
    service: web::Data<ImageAnalysisService>,
) -> success::Success<Vec<Analysis>> {
    success::Success::ok(Some(service.fetch_all().await))
}

#[get("/getImageById")]
pub async fn get_image_by_id(
    service: web::Data<ImageAnalysisService>,
    input: ValidatedQuery<ImageIdModel>,
) -> Result<success::Success<Analysis>, error::Error> {
    match service.get_by_id(&input.0.id).await? {
        Some(analysis) => Ok(success::Success::ok(Some(analysis))),
        None => Ok(success::Success::ok(None).message("Image not found")),
    }
}

#[post("/updateImage")]
pub async fn update_image(
    service: web::Data<ImageAnalysisService>,
    input: ValidatedJson<UpdateImageModel>,
) -> Result<success::Success<Analysis>, error::Error> {
    let UpdateImageModel { id, update } = input.0;
    let updated = service.update(&id, update).await?;
    Ok(success::Success::ok(updated))
}

#[post("/deleteImage")]
pub async fn delete_image(
    service: web::Data<ImageAnalysisService>,
    input: ValidatedJson<ImageIdModel>,
) -> success::Success<bool> {
    success::Success::ok(Some(service.delete(&input.0.id).await))
}

#[get("/healthCheck")]
pub async fn health_check() -> success::Success<HealthStatus> {
    success::Success::ok(Some(HealthStatus::ok()))
}
