use actix_web::web;
use dotenvy::dotenv;
use storefront_service::config::AppConfig;
use storefront_service::{build_server, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::other(e)
    })?;

    if config.admin.is_unconfigured() {
        if config.admin.allow_unconfigured {
            log::warn!("No admin policy configured: every signed-in user is an admin");
        } else {
            log::warn!("No admin policy configured: admin routes are disabled");
        }
    }

    let state = web::Data::new(AppState::from_config(&config));

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
