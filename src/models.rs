use serde::Serialize;

/// One calendar-day entry. `pressure_id` is a legacy back-reference to the
/// most recently stored measurement of that day; the authoritative link runs
/// the other way through `Measurement::schedule_id`.
#[derive(Serialize, Clone)]
pub struct Schedule {
    pub id: i64,
    pub date: String,
    pub pressure_id: Option<i64>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbSchedule {
    pub id: Option<i64>,
    pub date: Option<String>,
    pub pressure_id: Option<i64>,
}

impl From<DbSchedule> for Schedule {
    fn from(schedule: DbSchedule) -> Self {
        Self {
            id: schedule.id.unwrap_or_default(),
            date: schedule.date.unwrap_or_default(),
            pressure_id: schedule.pressure_id,
        }
    }
}

/// One systolic/diastolic reading. `time` is an RFC 3339 string carrying the
/// configured local offset.
#[derive(Serialize, Clone)]
pub struct Measurement {
    pub id: i64,
    pub time: String,
    pub systolic_pressure: f64,
    pub diastolic_pressure: f64,
    pub schedule_id: i64,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbMeasurement {
    pub id: Option<i64>,
    pub time: Option<String>,
    pub systolic_pressure: Option<f64>,
    pub diastolic_pressure: Option<f64>,
    pub schedule_id: Option<i64>,
}

impl From<DbMeasurement> for Measurement {
    fn from(db: DbMeasurement) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            time: db.time.unwrap_or_default(),
            systolic_pressure: db.systolic_pressure.unwrap_or_default(),
            diastolic_pressure: db.diastolic_pressure.unwrap_or_default(),
            schedule_id: db.schedule_id.unwrap_or_default(),
        }
    }
}

/// A schedule with its measurements, reconstructed from the flat join rows
/// read by `db::measurement::get_all`.
#[derive(Serialize, Clone)]
pub struct ScheduleWithMeasurements {
    pub id: i64,
    pub date: String,
    pub measurements: Vec<Measurement>,
}
