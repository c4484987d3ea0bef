use chrono::{DateTime, FixedOffset};
use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, Serialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::config::Config;
use crate::db::{
    create_measurement_for_day, delete_measurement, delete_schedule, drop_measurement_table,
    drop_schedule_table, get_all_schedules, get_measurement, get_schedule,
    get_schedules_with_measurements, search_measurements_by_time, search_schedules_by_date,
    update_measurement, update_schedule,
};
use crate::error::AppError;
use crate::history::{MonthGroup, monthly_history};
use crate::models::{Measurement, Schedule, ScheduleWithMeasurements};
use crate::validation::AppErrorExt;
use crate::validation::JsonValidateExt;
use crate::validation::ValidationResponse;

#[derive(Deserialize, Validate)]
pub struct MeasurementRequest {
    /// RFC 3339 timestamp of the reading.
    pub timestamp: String,
    #[validate(range(min = 1.0, message = "Systolic pressure must be at least 1"))]
    pub systolic_pressure: f64,
    #[validate(range(min = 1.0, message = "Diastolic pressure must be at least 1"))]
    pub diastolic_pressure: f64,
}

#[derive(Serialize, Deserialize)]
pub struct CreatedMeasurementResponse {
    pub schedule_id: i64,
    pub measurement_id: i64,
    pub summary: MeasurementSummary,
}

/// The confirmation text shown after saving a reading.
#[derive(Serialize, Deserialize)]
pub struct MeasurementSummary {
    pub day: String,
    pub time: String,
    pub pressure: String,
}

#[derive(Deserialize)]
pub struct ScheduleRequest {
    pub date: String,
    pub pressure_id: Option<i64>,
}

#[derive(Serialize, Deserialize)]
pub struct ScheduleDetailResponse {
    pub id: i64,
    pub date: String,
    pub display_date: String,
}

impl ScheduleDetailResponse {
    fn from_schedule(schedule: Schedule, offset: FixedOffset) -> Self {
        let display_date = DateTime::parse_from_rfc3339(&schedule.date)
            .ok()
            .map(|parsed| parsed.with_timezone(&offset).format("%d/%m/%Y").to_string())
            .unwrap_or_default();

        Self {
            id: schedule.id,
            date: schedule.date,
            display_date,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[get("/health")]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[post("/measurements", data = "<reading>")]
pub async fn api_create_measurement(
    reading: Json<MeasurementRequest>,
    db: &State<Pool<Sqlite>>,
    config: &State<Config>,
) -> Result<Json<CreatedMeasurementResponse>, Custom<Json<ValidationResponse>>> {
    let validated = reading.validate_custom()?;

    let timestamp = parse_timestamp(&validated.timestamp, config.offset()).validate_custom()?;

    let ids = create_measurement_for_day(
        db,
        timestamp,
        validated.systolic_pressure,
        validated.diastolic_pressure,
    )
    .await
    .validate_custom()?;

    Ok(Json(CreatedMeasurementResponse {
        schedule_id: ids.schedule_id,
        measurement_id: ids.measurement_id,
        summary: MeasurementSummary {
            day: timestamp.format("%d-%m-%Y").to_string(),
            time: timestamp.format("%H:%M:%S").to_string(),
            pressure: format!(
                "{}/{} mmHg",
                validated.systolic_pressure, validated.diastolic_pressure
            ),
        },
    }))
}

#[get("/measurements")]
pub async fn api_get_measurements(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<ScheduleWithMeasurements>>, Status> {
    let schedules = get_schedules_with_measurements(db).await?;

    Ok(Json(schedules))
}

#[get("/measurements/search?<time>")]
pub async fn api_search_measurements(
    time: &str,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Measurement>>, Status> {
    let measurements = search_measurements_by_time(db, time).await?;

    Ok(Json(measurements))
}

#[get("/measurements/<id>")]
pub async fn api_get_measurement(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Measurement>, Status> {
    let measurement = get_measurement(db, id).await?;

    Ok(Json(measurement))
}

#[put("/measurements/<id>", data = "<reading>")]
pub async fn api_update_measurement(
    id: i64,
    reading: Json<MeasurementRequest>,
    db: &State<Pool<Sqlite>>,
    config: &State<Config>,
) -> Result<Status, Custom<Json<ValidationResponse>>> {
    let validated = reading.validate_custom()?;

    let timestamp = parse_timestamp(&validated.timestamp, config.offset()).validate_custom()?;

    update_measurement(
        db,
        id,
        &timestamp.to_rfc3339(),
        validated.systolic_pressure,
        validated.diastolic_pressure,
    )
    .await
    .validate_custom()?;

    Ok(Status::NoContent)
}

#[delete("/measurements/<id>")]
pub async fn api_delete_measurement(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, Status> {
    delete_measurement(db, id).await?;

    Ok(Status::NoContent)
}

#[get("/history")]
pub async fn api_get_history(
    db: &State<Pool<Sqlite>>,
    config: &State<Config>,
) -> Result<Json<Vec<MonthGroup>>, Status> {
    let schedules = get_schedules_with_measurements(db).await?;

    Ok(Json(monthly_history(&schedules, config.offset())))
}

#[get("/schedules")]
pub async fn api_get_schedules(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<Schedule>>, Status> {
    let schedules = get_all_schedules(db).await?;

    Ok(Json(schedules))
}

#[get("/schedules/search?<date>")]
pub async fn api_search_schedules(
    date: &str,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Schedule>>, Status> {
    let schedules = search_schedules_by_date(db, date).await?;

    Ok(Json(schedules))
}

#[get("/schedules/<id>")]
pub async fn api_get_schedule(
    id: i64,
    db: &State<Pool<Sqlite>>,
    config: &State<Config>,
) -> Result<Json<ScheduleDetailResponse>, Status> {
    let schedule = get_schedule(db, id).await?;

    Ok(Json(ScheduleDetailResponse::from_schedule(
        schedule,
        config.offset(),
    )))
}

#[put("/schedules/<id>", data = "<schedule>")]
pub async fn api_update_schedule(
    id: i64,
    schedule: Json<ScheduleRequest>,
    db: &State<Pool<Sqlite>>,
    config: &State<Config>,
) -> Result<Status, Custom<Json<ValidationResponse>>> {
    let request = schedule.into_inner();

    let timestamp = parse_timestamp(&request.date, config.offset()).validate_custom()?;

    update_schedule(db, id, &timestamp.to_rfc3339(), request.pressure_id)
        .await
        .validate_custom()?;

    Ok(Status::NoContent)
}

#[delete("/schedules/<id>")]
pub async fn api_delete_schedule(id: i64, db: &State<Pool<Sqlite>>) -> Result<Status, Status> {
    delete_schedule(db, id).await?;

    Ok(Status::NoContent)
}

/// Maintenance reset: drops both tables, schedule first.
#[delete("/database")]
pub async fn api_reset_database(db: &State<Pool<Sqlite>>) -> Result<Status, Status> {
    drop_schedule_table(db).await?;
    drop_measurement_table(db).await?;

    Ok(Status::NoContent)
}

fn parse_timestamp(value: &str, offset: FixedOffset) -> Result<DateTime<FixedOffset>, AppError> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&offset))
}
