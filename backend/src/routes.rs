use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse, ResponseError};
use log::{error, warn};
use shared::PredictionResponse;
use std::path::PathBuf;

use crate::error::{ApiError, PredictError};
use crate::service::{Prediction, PredictionService};
use crate::templates;
use crate::upload::read_upload;

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: PathBuf) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/predict").route(web::post().to(predict)))
        .service(web::resource("/api/predict").route(web::post().to(api_predict)))
        .service(Files::new("/static", static_dir));
}

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(templates::INDEX_HTML)
}

async fn predict(
    service: web::Data<PredictionService>,
    payload: Multipart,
) -> Result<HttpResponse, PredictError> {
    let prediction = run_prediction(service, payload).await?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(templates::render_result(&prediction.label)))
}

async fn api_predict(
    service: web::Data<PredictionService>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let class_labels = service.class_names().as_slice().to_vec();
    let prediction = run_prediction(service, payload).await?;
    Ok(HttpResponse::Ok().json(PredictionResponse {
        label: prediction.label,
        class_index: prediction.class_index,
        confidence: prediction.confidence,
        predictions: prediction.scores,
        class_labels,
    }))
}

async fn run_prediction(
    service: web::Data<PredictionService>,
    payload: Multipart,
) -> Result<Prediction, PredictError> {
    let result = classify_upload(service, payload).await;
    if let Err(e) = &result {
        if e.status_code().is_server_error() {
            error!("Prediction failed: {}", e);
        } else {
            warn!("Rejected upload: {}", e);
        }
    }
    result
}

async fn classify_upload(
    service: web::Data<PredictionService>,
    payload: Multipart,
) -> Result<Prediction, PredictError> {
    let upload = read_upload(payload, service.max_upload_bytes()).await?;
    web::block(move || service.classify(upload))
        .await
        .map_err(|e| PredictError::Internal(e.to_string()))?
}
