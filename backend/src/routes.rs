use actix_files::Files;
use actix_multipart::{Field, Multipart};
use actix_web::{Error, HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info};
use serde::Serialize;
use serde_json::json;
use std::io::Write;
use uuid::Uuid;

use crate::pipeline::AnalysisPipeline;

// Matches the original API's 16MB upload cap.
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    cfg.service(web::resource("/api/analyze").route(web::post().to(handle_analyze)))
        .service(web::resource("/api/health").route(web::get().to(health_check)))
        .service(Files::new("/static", frontend_dir));
}

async fn handle_analyze(
    pipeline: web::Data<AnalysisPipeline>,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    let request_id = Uuid::new_v4();
    let mut filename = String::new();
    let mut image_data: Vec<u8> = Vec::new();
    let mut animal_type = "dog".to_string();
    let mut symptoms = "[]".to_string();

    while let Ok(Some(mut field)) = payload.try_next().await {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                if let Some(original) = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                {
                    filename = original.to_string();
                }
                while let Some(chunk) = field.next().await {
                    let data = chunk?;
                    image_data.write_all(&data)?;
                    if image_data.len() > MAX_UPLOAD_BYTES {
                        return Ok(HttpResponse::PayloadTooLarge().json(ErrorResponse {
                            error: "image exceeds the 16MB upload limit".into(),
                        }));
                    }
                }
            }
            "animalType" => animal_type = read_text_field(&mut field).await?,
            "symptoms" => symptoms = read_text_field(&mut field).await?,
            _ => {
                while let Some(chunk) = field.next().await {
                    chunk?;
                }
            }
        }
    }

    match pipeline.analyze(&filename, &image_data, &animal_type, &symptoms) {
        Ok(report) => {
            info!(
                "[{request_id}] {} prediction: {} ({:.1}% confidence, {})",
                report.model_used, report.disease, report.confidence, report.model_status
            );
            Ok(HttpResponse::Ok().json(report))
        }
        Err(e) if e.is_client_error() => {
            info!("[{request_id}] rejected request: {e}");
            Ok(HttpResponse::BadRequest().json(ErrorResponse {
                error: e.to_string(),
            }))
        }
        Err(e) => {
            error!("[{request_id}] analysis failed: {e}");
            Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: e.to_string(),
            }))
        }
    }
}

async fn read_text_field(field: &mut Field) -> Result<String, Error> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        buf.write_all(&chunk?)?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

async fn health_check(pipeline: web::Data<AnalysisPipeline>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "message": "Analysis service running",
        "model_loaded": pipeline.model_available(),
    }))
}
