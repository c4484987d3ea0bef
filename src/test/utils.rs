use crate::config::Config;
use crate::db::{NewMeasurementIds, create_measurement_for_day};
use crate::error::AppError;
use chrono::DateTime;
use rocket::local::asynchronous::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        db_pool_max: 1,
        utc_offset_hours: -3,
    }
}

/// In-memory database with the embedded migrations applied. A single pooled
/// connection keeps every query on the same in-memory database.
pub async fn connect_test_db() -> Result<Pool<Sqlite>, AppError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

pub struct TestReading {
    pub timestamp: String,
    pub systolic: f64,
    pub diastolic: f64,
}

#[derive(Default)]
pub struct TestDbBuilder {
    readings: Vec<TestReading>,
}

impl TestDbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reading(mut self, timestamp: &str, systolic: f64, diastolic: f64) -> Self {
        self.readings.push(TestReading {
            timestamp: timestamp.to_string(),
            systolic,
            diastolic,
        });
        self
    }

    /// Seeds every reading through the public creation operation so tests
    /// exercise the same path the API does.
    pub async fn build(self) -> Result<TestDb, AppError> {
        let pool = connect_test_db().await?;
        let config = test_config();
        let offset = config.offset();

        let mut created = Vec::new();
        for reading in &self.readings {
            let timestamp =
                DateTime::parse_from_rfc3339(&reading.timestamp)?.with_timezone(&offset);
            let ids =
                create_measurement_for_day(&pool, timestamp, reading.systolic, reading.diastolic)
                    .await?;
            created.push(ids);
        }

        Ok(TestDb {
            pool,
            config,
            created,
        })
    }
}

pub struct TestDb {
    pub pool: Pool<Sqlite>,
    pub config: Config,
    pub created: Vec<NewMeasurementIds>,
}

impl TestDb {
    pub fn schedule_id(&self, index: usize) -> i64 {
        self.created[index].schedule_id
    }

    pub fn measurement_id(&self, index: usize) -> i64 {
        self.created[index].measurement_id
    }
}

pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
    let rocket = crate::init_rocket(test_db.pool.clone(), test_db.config.clone()).await;
    let client = Client::tracked(rocket)
        .await
        .expect("valid rocket instance");

    (client, test_db)
}
