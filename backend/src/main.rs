pub mod config;
pub mod inference;
pub mod models;
pub mod render;
pub mod routes;

use actix_files::Files;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use log::info;

use config::ServerConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("🚀 Starting Employee Attrition Prediction server");

    let config = ServerConfig::from_env();

    // Nothing is served without both artifacts.
    let service = inference::load_service(&config.artifacts).context("cannot start without model artifacts")?;
    let service = web::Data::new(service);

    let bind_address = config.bind_address();
    let static_dir = config.static_dir.clone();

    info!("🌐 Server listening on: http://{}", bind_address);
    info!("👷 Workers: {}", config.workers);
    info!("🔧 Endpoints:");
    info!("   GET  /                - Prediction form");
    info!("   POST /predict         - Run a prediction");
    info!("   GET  /api/health      - Health check");
    info!("   GET  /api/model-info  - Loaded model information");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .app_data(service.clone())
            .configure(routes::configure)
            .service(Files::new("/static", &static_dir).prefer_utf8(true))
            .default_service(web::route().to(routes::not_found))
    })
    .workers(config.workers)
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {bind_address}"))?
    .run()
    .await?;

    Ok(())
}
