mod asset;
mod config;
mod detection;
mod error;
mod routes;
mod storage;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::{AppConfig, BackendKind};
use detection::{DetectionBackend, Dispatcher, RemoteBackend, SimulatedBackend};
use routes::configure_routes;
use std::env;
use std::sync::Arc;
use storage::UploadStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    }

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    let store = UploadStore::open(&config.upload_dir, config.max_upload_bytes).map_err(|e| {
        log::error!(
            "Failed to prepare upload directory {}: {}",
            config.upload_dir.display(),
            e
        );
        std::io::Error::other(e.to_string())
    })?;
    log::info!("Storing uploads in {}", store.root().display());

    let backend: Arc<dyn DetectionBackend> = match config.backend {
        BackendKind::Remote => {
            let remote = RemoteBackend::new(config.detector_url.clone(), config.detector_timeout)
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            log::info!(
                "Using remote detector at {} (timeout {}s)",
                config.detector_url,
                config.detector_timeout.as_secs()
            );
            Arc::new(remote)
        }
        BackendKind::Simulated => {
            log::warn!("Using simulated detector; every verdict is fabricated");
            Arc::new(SimulatedBackend)
        }
    };

    match config.demo_frame_window {
        Some(window) => log::warn!(
            "Demo frame window {} enabled; videos with these frame counts get simulated results",
            window
        ),
        None => log::info!("Demo frame window disabled"),
    }

    let dispatcher = web::Data::new(
        Dispatcher::new(backend, store)
            .with_demo_window(config.demo_frame_window)
            .with_cleanup(config.cleanup_uploads),
    );

    let static_dir = config.static_dir.clone().filter(|dir| {
        let exists = dir.is_dir();
        if !exists {
            log::warn!("Static directory {} not found, not serving UI", dir.display());
        }
        exists
    });

    let bind_address = format!("{}:{}", config.bind_host, config.port);
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
            .app_data(dispatcher.clone())
            .configure(|cfg| configure_routes(cfg, static_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
