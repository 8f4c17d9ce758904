mod clinical;
mod error;
mod inference;
mod pipeline;
mod routes;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use inference::backend::{InferenceBackend, MockBackend, ModelBackend};
use inference::config::ModelConfig;
use inference::preprocess::ImagePreprocessor;
use pipeline::AnalysisPipeline;
use routes::configure_routes;
use std::env;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let config = ModelConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load model config, using defaults: {e}");
        ModelConfig::default()
    });
    let resize_filter = config.resize_filter().map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::Other, format!("Invalid config: {e}"))
    })?;

    // Loaded exactly once. A failure here is permanent: the process serves
    // mock predictions for its whole lifetime.
    let primary: Option<Arc<dyn InferenceBackend>> = match ModelBackend::load(&config.model_path) {
        Ok(backend) => {
            log::info!("Classification model loaded from {}", config.model_path);
            Some(Arc::new(backend))
        }
        Err(e) => {
            log::error!("Failed to load classification model: {e}");
            log::warn!("Falling back to mock predictions");
            None
        }
    };

    let preprocessor = ImagePreprocessor::new(&config, resize_filter);
    let pipeline = web::Data::new(AnalysisPipeline::new(
        primary,
        Arc::new(MockBackend::new()),
        preprocessor,
    ));

    let frontend_dir = if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        format!("{}/../frontend/dist", manifest_dir)
    } else {
        "/usr/src/app/frontend/dist".to_string()
    };

    let port = env::var("PORT").unwrap_or_else(|_| "5001".to_string());
    let bind_address = format!("0.0.0.0:{}", port);
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::AUTHORIZATION,
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(pipeline.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
