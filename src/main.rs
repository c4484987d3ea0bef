#[macro_use]
extern crate rocket;

mod api;
mod config;
mod db;
mod error;
mod history;
mod models;
mod telemetry;
mod validation;
#[cfg(test)]
mod test;

use api::{
    api_create_measurement, api_delete_measurement, api_delete_schedule, api_get_history,
    api_get_measurement, api_get_measurements, api_get_schedule, api_get_schedules,
    api_reset_database, api_search_measurements, api_search_schedules, api_update_measurement,
    api_update_schedule, health,
};
use config::Config;
use error::AppError;
use rocket::{Build, Rocket};
use telemetry::TelemetryFairing;
use telemetry::init_tracing;
use thiserror::Error;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Anyhow(anyhow::Error),
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::Anyhow(value)
    }
}

#[launch]
async fn rocket() -> _ {
    init_tracing();

    let config = config::load_from_env().expect("Failed to load configuration");
    config.log_config();

    let pool = connect_database(&config)
        .await
        .expect("Failed to connect to SQLite database");

    info!("Running database migrations...");
    match sqlx::migrate!("./migrations").run(&pool).await {
        Ok(_) => info!("Migrations completed successfully"),
        Err(e) => {
            error!("Failed to run migrations: {}", e);
            panic!("Database migration failed: {}", e);
        }
    }

    init_rocket(pool, config).await
}

pub async fn connect_database(config: &Config) -> Result<SqlitePool, Error> {
    // The schema's mutual FK declarations are vestigial; enforcement stays
    // off, as in the original store.
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_pool_max)
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn init_rocket(pool: SqlitePool, config: Config) -> Rocket<Build> {
    info!("Starting pressure tracker");

    rocket::build()
        .manage(pool)
        .manage(config)
        .mount(
            "/api",
            routes![
                api_create_measurement,
                api_get_measurements,
                api_search_measurements,
                api_get_measurement,
                api_update_measurement,
                api_delete_measurement,
                api_get_history,
                api_get_schedules,
                api_search_schedules,
                api_get_schedule,
                api_update_schedule,
                api_delete_schedule,
                api_reset_database,
            ],
        )
        .mount("/api", routes![health])
        .attach(TelemetryFairing)
}
