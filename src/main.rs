use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::time::Duration;

mod api;
mod attendance;
mod auth;
mod config;
mod db;
mod docs;
mod geo;
mod model;
mod models;
mod routes;
mod sms;

use auth::otp::OtpStore;
use auth::refresh_store::RefreshTokenStore;
use config::Config;
use db::init_db;
use sms::HttpSmsGateway;

use crate::docs::ApiDoc;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Retail back-office API"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;

    let refresh_store = Data::new(RefreshTokenStore::new());
    let otp_store = Data::new(OtpStore::new());
    let sms_gateway = Data::new(HttpSmsGateway::new(
        config.sms_gateway_url.clone(),
        config.sms_api_key.clone(),
        config.sms_sender_id.clone(),
    ));

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    // Hourly reaper for expired refresh tokens.
    let sweep_store = refresh_store.clone();
    let sweep_secret = config.jwt_secret.clone();
    let sweep_interval = config.token_sweep_interval;
    actix_web::rt::spawn(async move {
        loop {
            actix_web::rt::time::sleep(Duration::from_secs(sweep_interval)).await;
            let removed = sweep_store.sweep_expired(&sweep_secret);
            info!(removed, live = sweep_store.len(), "Refresh token sweep complete");
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(refresh_store.clone())
            .app_data(otp_store.clone())
            .app_data(sms_gateway.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
