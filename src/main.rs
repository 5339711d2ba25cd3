use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info, warn};
use std::io;
use std::sync::Arc;
use tasklist::config::Config;
use tasklist::repository::{
    postgres, InMemoryTodoRepository, InMemoryUserRepository, PostgresTodoRepository,
    PostgresUserRepository,
};
use tasklist::routes::{self, health};
use tasklist::state::AppState;

async fn build_state(config: &Config) -> io::Result<AppState> {
    if config.database_url.is_none() {
        warn!("DATABASE_URL is not set; using in-memory stores, data is lost on restart");
        return Ok(AppState::from_config(
            config,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryTodoRepository::new()),
        ));
    }

    let pool = postgres::connect(config).await.map_err(|e| {
        error!("Failed to connect to database: {}", e);
        io::Error::other(e)
    })?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            error!("Failed to run migrations: {}", e);
            io::Error::other(e)
        })?;

    Ok(AppState::from_config(
        config,
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresTodoRepository::new(pool)),
    ))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    let default_filter = match &config {
        Ok(config) if !config.is_production() => "debug",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = config.map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::other(e)
    })?;

    let state = web::Data::new(build_state(&config).await?);
    let frontend_url = config.frontend_url.clone();

    info!("Starting tasklist server at {}", config.server_url());
    HttpServer::new(move || {
        let cors = match frontend_url.as_deref() {
            Some(origin) => Cors::default().allowed_origin(origin),
            None => Cors::default().allow_any_origin(),
        }
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(health::health)
            .configure(routes::config)
    })
    .shutdown_timeout(5)
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
