use anyhow::{Result, anyhow};
use chrono::FixedOffset;

const DEFAULT_DATABASE_URL: &str = "sqlite://pressure-tracker.db";
const DEFAULT_POOL_MAX: u32 = 5;
// The app's home timezone, America/Sao_Paulo.
const DEFAULT_UTC_OFFSET_HOURS: i32 = -3;

/// Runtime configuration, immutable after loading.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Fixed UTC offset in whole hours used for calendar-day bucketing and
    /// display formatting.
    pub utc_offset_hours: i32,
}

/// Load configuration from the environment, reading a `.env` file first if
/// one is present.
///
/// Optional variables:
/// - `DATABASE_URL` (default: `sqlite://pressure-tracker.db`)
/// - `DB_POOL_MAX` (default: 5)
/// - `UTC_OFFSET_HOURS` (default: -3)
pub fn load_from_env() -> Result<Config> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {:?}", path),
        Err(e) => tracing::debug!("Could not load .env file: {}", e),
    }

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let db_pool_max = parse_env("DB_POOL_MAX")?.unwrap_or(DEFAULT_POOL_MAX);
    let utc_offset_hours = parse_env("UTC_OFFSET_HOURS")?.unwrap_or(DEFAULT_UTC_OFFSET_HOURS);

    let config = Config {
        database_url,
        db_pool_max,
        utc_offset_hours,
    };

    // Fail now rather than on the first request that formats a timestamp.
    config
        .utc_offset()
        .ok_or_else(|| anyhow!("UTC_OFFSET_HOURS out of range: {}", utc_offset_hours))?;

    Ok(config)
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    std::env::var(name)
        .ok()
        .map(|v| v.parse::<T>())
        .transpose()
        .map_err(|e| anyhow!("Invalid {}: {}", name, e))
}

impl Config {
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
    }

    /// The configured offset, already validated by `load_from_env`.
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset()
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
    }

    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL     : {}", self.database_url);
        tracing::info!("  DB_POOL_MAX      : {}", self.db_pool_max);
        tracing::info!("  UTC_OFFSET_HOURS : {}", self.utc_offset_hours);
    }
}
