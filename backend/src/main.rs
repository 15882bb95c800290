mod classifier;
mod config;
mod error;
mod preprocess;
mod routes;
mod service;
mod storage;
mod templates;
mod upload;

#[cfg(test)]
mod testing;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use classifier::ClassNames;
use config::AppConfig;
use routes::configure_routes;
use service::PredictionService;
use std::io;
use storage::scratch::ScratchDir;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        io::Error::other(e)
    })?;

    let class_names = ClassNames::new(config.classifier.class_names.clone());
    let classifier = match classifier::load(&config.model_path, &config.classifier.image) {
        Ok(classifier) => classifier,
        Err(e) => {
            log::error!("Failed to load model at startup: {}", e);
            return Err(io::Error::other(format!("Model loading failed: {}", e)));
        }
    };
    if let Err(e) = classifier::check_class_count(classifier.as_ref(), &class_names) {
        log::error!("Model and class table disagree: {}", e);
        return Err(io::Error::other(e));
    }
    log::info!("Serving {} classes: {:?}", class_names.len(), class_names.as_slice());

    let scratch = ScratchDir::create(&config.upload_folder)?;
    log::info!("Scratch directory: {}", scratch.path().display());

    let service = web::Data::new(PredictionService::new(
        classifier,
        class_names,
        config.classifier.image.clone(),
        scratch,
        config.max_upload_bytes,
    ));

    let static_dir = config.static_dir.clone();
    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(service.clone())
            .configure(|cfg| configure_routes(cfg, static_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
