use crate::error::AppError;
use crate::models::{DbSchedule, Schedule};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

#[instrument(skip(pool))]
pub async fn create_schedule(
    pool: &Pool<Sqlite>,
    date: &str,
    pressure_id: Option<i64>,
) -> Result<i64, AppError> {
    info!("Creating schedule");
    let res = sqlx::query("INSERT INTO schedule (date, pressure_id) VALUES (?, ?)")
        .bind(date)
        .bind(pressure_id)
        .execute(pool)
        .await?;

    Ok(res.last_insert_rowid())
}

#[instrument(skip(pool))]
pub async fn get_schedule(pool: &Pool<Sqlite>, id: i64) -> Result<Schedule, AppError> {
    info!("Fetching schedule by ID");
    let row = sqlx::query_as::<_, DbSchedule>("SELECT * FROM schedule WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(schedule) => Ok(Schedule::from(schedule)),
        _ => Err(AppError::NotFound(format!(
            "Schedule with id {} not found in database",
            id
        ))),
    }
}

#[instrument(skip(pool))]
pub async fn get_all_schedules(pool: &Pool<Sqlite>) -> Result<Vec<Schedule>, AppError> {
    info!("Getting all schedules");
    let rows = sqlx::query_as::<_, DbSchedule>("SELECT * FROM schedule")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Schedule::from).collect())
}

#[instrument(skip(pool))]
pub async fn search_schedules_by_date(
    pool: &Pool<Sqlite>,
    date: &str,
) -> Result<Vec<Schedule>, AppError> {
    info!("Searching schedules by date");
    let rows = sqlx::query_as::<_, DbSchedule>("SELECT * FROM schedule WHERE date LIKE ?")
        .bind(format!("%{}%", date))
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Schedule::from).collect())
}

#[instrument(skip(pool))]
pub async fn update_schedule(
    pool: &Pool<Sqlite>,
    id: i64,
    date: &str,
    pressure_id: Option<i64>,
) -> Result<(), AppError> {
    info!("Updating schedule");
    sqlx::query("UPDATE schedule SET date = ?, pressure_id = ? WHERE id = ?")
        .bind(date)
        .bind(pressure_id)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn delete_schedule(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting schedule");
    sqlx::query("DELETE FROM schedule WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn drop_schedule_table(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    info!("Dropping schedule table");
    sqlx::query("DROP TABLE schedule").execute(pool).await?;

    Ok(())
}
