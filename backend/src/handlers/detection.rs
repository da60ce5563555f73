//! HTTP handlers for crop and disease detection

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use shared::{CropDetectionResponse, DiseaseDetectionResponse};

use crate::error::{AppError, AppResult};
use crate::services::image_store::StoredImage;
use crate::AppState;

/// Multipart field carrying the image
const FILE_FIELD: &str = "file";

/// Identify the crop in an uploaded image
/// POST /detect-crop
pub async fn detect_crop(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<CropDetectionResponse>> {
    let image = receive_image(&state, multipart).await?;
    let prediction = state.crop.classify(&image).await?;

    tracing::info!(
        "Crop detected: {} ({:.3}, {})",
        prediction.label,
        prediction.confidence,
        prediction.mode
    );

    Ok(Json(prediction.into()))
}

/// Diagnose plant disease in an uploaded image
/// POST /detect-disease
pub async fn detect_disease(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<DiseaseDetectionResponse>> {
    let image = receive_image(&state, multipart).await?;
    let prediction = state.disease.classify(&image).await?;

    tracing::info!(
        "Disease detected: {} ({:.3}, {})",
        prediction.label,
        prediction.confidence,
        prediction.mode
    );

    Ok(Json(prediction.into()))
}

/// Store the `file` field of a multipart upload
///
/// Only a file part counts: a plain form value named `file` (no filename) is
/// ignored, and a request that is not multipart at all is treated like one
/// without the field.
async fn receive_image(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<StoredImage> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Not a multipart request: {}", e);
        AppError::MissingImage
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            tracing::debug!("Ignoring `{}` form value without a filename", FILE_FIELD);
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidUpload(e.to_string()))?;

        return state.images.save(Some(&file_name), &bytes).await;
    }

    Err(AppError::MissingImage)
}
