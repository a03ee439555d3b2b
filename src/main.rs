use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::info;
use micropurchase::config::Settings;
use micropurchase::web::app::{configure_app, init_app_state};
use std::io;

// Main application
pub async fn run_app(settings: Settings) -> io::Result<()> {
    let app_state = init_app_state(&settings).map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    info!("Starting server on {}:{}", settings.bind_address, settings.port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(Logger::default())
            .configure(configure_app)
    })
    .bind((settings.bind_address.as_str(), settings.port))?
    .run()
    .await
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    run_app(settings).await
}
