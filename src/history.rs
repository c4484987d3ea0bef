use chrono::{DateTime, Datelike, FixedOffset};
use serde::Serialize;

use crate::models::{Measurement, ScheduleWithMeasurements};

pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One day's readings inside a month group, rendered as display text.
#[derive(Serialize, Clone)]
pub struct DayEntry {
    pub id: String,
    pub title: String,
    pub content: String,
}

#[derive(Serialize, Clone)]
pub struct MonthGroup {
    pub id: i64,
    pub title: String,
    pub items: Vec<DayEntry>,
}

/// Bucket schedules into the twelve calendar months of the configured
/// offset. Every month is emitted, empty ones with no items; within a month,
/// schedules are ordered chronologically and grouped by calendar day. Rows
/// whose stored timestamp does not parse are skipped.
pub fn monthly_history(
    schedules: &[ScheduleWithMeasurements],
    offset: FixedOffset,
) -> Vec<MonthGroup> {
    let mut by_month: [Vec<&ScheduleWithMeasurements>; 12] = Default::default();

    for schedule in schedules {
        if let Some(local) = parse_local(&schedule.date, offset) {
            by_month[local.month0() as usize].push(schedule);
        }
    }

    MONTHS
        .iter()
        .enumerate()
        .map(|(index, month)| {
            let mut month_schedules = std::mem::take(&mut by_month[index]);
            month_schedules.sort_by_key(|schedule| {
                parse_local(&schedule.date, offset)
                    .map(|local| local.timestamp())
                    .unwrap_or_default()
            });

            let days = group_by_day(&month_schedules, offset);

            let items = days
                .iter()
                .enumerate()
                .map(|(day_index, (day, group))| {
                    let content: String = group
                        .iter()
                        .map(|schedule| schedule_content(schedule, offset))
                        .collect();

                    DayEntry {
                        id: format!("{}.{}", index + 1, day_index + 1),
                        title: String::new(),
                        content: format!("\nDay: {}\n{}", day, content),
                    }
                })
                .collect();

            MonthGroup {
                id: (index + 1) as i64,
                title: (*month).to_string(),
                items,
            }
        })
        .collect()
}

/// Group a month's schedules by local calendar day, preserving the order in
/// which days first appear.
fn group_by_day<'a>(
    schedules: &[&'a ScheduleWithMeasurements],
    offset: FixedOffset,
) -> Vec<(String, Vec<&'a ScheduleWithMeasurements>)> {
    let mut days: Vec<(String, Vec<&ScheduleWithMeasurements>)> = Vec::new();

    for schedule in schedules {
        let Some(local) = parse_local(&schedule.date, offset) else {
            continue;
        };
        let day = local.format("%d/%m/%Y").to_string();

        match days.iter_mut().find(|(existing, _)| *existing == day) {
            Some((_, group)) => group.push(schedule),
            None => days.push((day, vec![schedule])),
        }
    }

    days
}

/// Render one schedule's measurements as display lines, grouped by each
/// measurement's own calendar day. Each group's lines are newline-joined and
/// the group is closed with a trailing newline.
fn schedule_content(schedule: &ScheduleWithMeasurements, offset: FixedOffset) -> String {
    let mut by_day: Vec<(String, Vec<&Measurement>)> = Vec::new();

    for measurement in &schedule.measurements {
        let Some(local) = parse_local(&measurement.time, offset) else {
            continue;
        };
        let day = local.format("%d/%m/%Y").to_string();

        match by_day.iter_mut().find(|(existing, _)| *existing == day) {
            Some((_, group)) => group.push(measurement),
            None => by_day.push((day, vec![measurement])),
        }
    }

    let mut content = String::new();
    for (_, group) in &by_day {
        let lines: Vec<String> = group
            .iter()
            .map(|measurement| {
                let time = parse_local(&measurement.time, offset)
                    .map(|local| local.format("%H:%M:%S").to_string())
                    .unwrap_or_default();
                format!(
                    "Time: {}, Pressure: {}/{} mmHg",
                    time, measurement.systolic_pressure, measurement.diastolic_pressure
                )
            })
            .collect();
        content.push_str(&lines.join("\n"));
        content.push('\n');
    }

    content
}

fn parse_local(value: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&offset))
}
