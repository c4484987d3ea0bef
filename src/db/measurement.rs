use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use sqlx::{Pool, Sqlite, Transaction};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{DbMeasurement, DbSchedule, Measurement, ScheduleWithMeasurements};

/// Row ids produced by [`create_measurement_for_day`].
#[derive(Debug, Clone, Copy)]
pub struct NewMeasurementIds {
    pub schedule_id: i64,
    pub measurement_id: i64,
}

/// Store a reading, reusing the schedule row of the timestamp's calendar day
/// when one exists and creating it otherwise. The day lookup, both inserts,
/// and the legacy back-reference update run in a single transaction; any
/// failure rolls the whole operation back.
///
/// The day check is application-side (no unique constraint backs it), so two
/// concurrent writers could still race a duplicate day in. The store is
/// single-writer in practice.
#[instrument(skip(pool))]
pub async fn create_measurement_for_day(
    pool: &Pool<Sqlite>,
    timestamp: DateTime<FixedOffset>,
    systolic: f64,
    diastolic: f64,
) -> Result<NewMeasurementIds, AppError> {
    info!("Creating measurement");

    let mut tx = pool.begin().await?;

    let result = insert_measurement(&mut tx, timestamp, systolic, diastolic).await;

    match result {
        Ok(ids) => {
            tx.commit().await?;
            Ok(ids)
        }
        Err(e) => {
            tx.rollback().await?;
            Err(e)
        }
    }
}

async fn insert_measurement(
    tx: &mut Transaction<'_, Sqlite>,
    timestamp: DateTime<FixedOffset>,
    systolic: f64,
    diastolic: f64,
) -> Result<NewMeasurementIds, AppError> {
    // Timestamps are stored in the configured offset, so the calendar day is
    // the stored string's prefix.
    let stored = timestamp.to_rfc3339();
    let day_pattern = format!("{}%", timestamp.format("%Y-%m-%d"));

    let existing = sqlx::query_as::<_, DbSchedule>("SELECT * FROM schedule WHERE date LIKE ?")
        .bind(&day_pattern)
        .fetch_optional(&mut **tx)
        .await?;

    let schedule_id = match existing.and_then(|schedule| schedule.id) {
        Some(id) => id,
        None => {
            sqlx::query("INSERT INTO schedule (date, pressure_id) VALUES (?, NULL)")
                .bind(&stored)
                .execute(&mut **tx)
                .await?
                .last_insert_rowid()
        }
    };

    let measurement_id = sqlx::query(
        "INSERT INTO pressure_measurement (time, systolic_pressure, diastolic_pressure, schedule_id)
         VALUES (?, ?, ?, ?)",
    )
    .bind(&stored)
    .bind(systolic)
    .bind(diastolic)
    .bind(schedule_id)
    .execute(&mut **tx)
    .await?
    .last_insert_rowid();

    // Last write wins for the legacy back-reference.
    sqlx::query("UPDATE schedule SET pressure_id = ? WHERE id = ?")
        .bind(measurement_id)
        .bind(schedule_id)
        .execute(&mut **tx)
        .await?;

    Ok(NewMeasurementIds {
        schedule_id,
        measurement_id,
    })
}

#[instrument(skip(pool))]
pub async fn get_measurement(pool: &Pool<Sqlite>, id: i64) -> Result<Measurement, AppError> {
    info!("Fetching measurement by ID");
    let row = sqlx::query_as::<_, DbMeasurement>("SELECT * FROM pressure_measurement WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(measurement) => Ok(Measurement::from(measurement)),
        _ => Err(AppError::NotFound(format!(
            "Measurement with id {} not found in database",
            id
        ))),
    }
}

#[instrument(skip(pool))]
pub async fn search_measurements_by_time(
    pool: &Pool<Sqlite>,
    time: &str,
) -> Result<Vec<Measurement>, AppError> {
    info!("Searching measurements by time");
    let rows =
        sqlx::query_as::<_, DbMeasurement>("SELECT * FROM pressure_measurement WHERE time LIKE ?")
            .bind(format!("%{}%", time))
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(Measurement::from).collect())
}

#[instrument(skip(pool))]
pub async fn update_measurement(
    pool: &Pool<Sqlite>,
    id: i64,
    time: &str,
    systolic: f64,
    diastolic: f64,
) -> Result<(), AppError> {
    info!("Updating measurement");
    sqlx::query(
        "UPDATE pressure_measurement
         SET time = ?, systolic_pressure = ?, diastolic_pressure = ?
         WHERE id = ?",
    )
    .bind(time)
    .bind(systolic)
    .bind(diastolic)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn delete_measurement(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting measurement");
    sqlx::query("DELETE FROM pressure_measurement WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

#[derive(sqlx::FromRow)]
struct JoinedRow {
    schedule_id: i64,
    date: Option<String>,
    pressure_id: Option<i64>,
    time: Option<String>,
    systolic_pressure: Option<f64>,
    diastolic_pressure: Option<f64>,
}

/// Read every schedule with its measurements, rebuilt from a flat LEFT JOIN.
/// Schedules come back ascending by id; measurements keep the joined row
/// order (newest measurement id first). Schedules without measurements are
/// included with an empty list.
#[instrument(skip(pool))]
pub async fn get_schedules_with_measurements(
    pool: &Pool<Sqlite>,
) -> Result<Vec<ScheduleWithMeasurements>, AppError> {
    info!("Getting schedules with measurements");
    let rows = sqlx::query_as::<_, JoinedRow>(
        "SELECT
            s.id as schedule_id, s.date,
            pm.id as pressure_id, pm.time, pm.systolic_pressure, pm.diastolic_pressure
         FROM schedule s
         LEFT JOIN pressure_measurement pm ON s.id = pm.schedule_id
         ORDER BY pressure_id DESC",
    )
    .fetch_all(pool)
    .await?;

    let mut schedules: BTreeMap<i64, ScheduleWithMeasurements> = BTreeMap::new();

    for row in rows {
        let JoinedRow {
            schedule_id,
            date,
            pressure_id,
            time,
            systolic_pressure,
            diastolic_pressure,
        } = row;

        let entry = schedules
            .entry(schedule_id)
            .or_insert_with(|| ScheduleWithMeasurements {
                id: schedule_id,
                date: date.unwrap_or_default(),
                measurements: Vec::new(),
            });

        if let Some(measurement_id) = pressure_id {
            entry.measurements.push(Measurement {
                id: measurement_id,
                time: time.unwrap_or_default(),
                systolic_pressure: systolic_pressure.unwrap_or_default(),
                diastolic_pressure: diastolic_pressure.unwrap_or_default(),
                schedule_id,
            });
        }
    }

    Ok(schedules.into_values().collect())
}

#[instrument(skip(pool))]
pub async fn drop_measurement_table(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    info!("Dropping pressure_measurement table");
    sqlx::query("DROP TABLE pressure_measurement")
        .execute(pool)
        .await?;

    Ok(())
}
