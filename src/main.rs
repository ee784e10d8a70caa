#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use cookiekeeper::{
    handlers::{health, json_config, refresh_session, validate_session},
    session::SessionKeeper,
    settings::KeeperSettings,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = KeeperSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    let keeper = SessionKeeper::from_settings(&settings)
        .map_err(|e| std::io::Error::other(format!("Failed to build upstream client: {e}")))?;

    start_server(keeper, settings).await
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(keeper: SessionKeeper, settings: KeeperSettings) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let cors_origins = settings.get_cors_origins();

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["Content-Type", "Accept"])
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(keeper.clone()))
            .app_data(json_config())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure_services)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg.route("/session/validate", web::post().to(validate_session))
        .route("/session/refresh", web::post().to(refresh_session))
        .route("/ping", web::get().to(health));
}

fn print_startup_info(bind_address: &str, settings: &KeeperSettings) {
    println!(
        "Starting Cookie Keeper {} on http://{bind_address}",
        cookiekeeper::VERSION
    );
    println!();
    println!("Session endpoints:");
    println!("  POST /session/validate - Check that a session cookie is authenticated");
    println!("  POST /session/refresh  - Extend the lifetime of a session cookie");
    println!();
    println!("Upstream:");
    println!("  Identity endpoint: {}", settings.endpoints.identity);
    println!(
        "  {} acquisition endpoint(s), {} refresh endpoint(s)",
        settings.endpoints.acquisition.len(),
        settings.endpoints.refresh.len()
    );
    println!(
        "  Token freshness: {}s, request timeout: {}s",
        settings.token.freshness_seconds, settings.upstream.request_timeout_seconds
    );
    println!();
    println!("System endpoints:");
    println!("  GET  /ping            - Health check");
}
