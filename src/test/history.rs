#[cfg(test)]
mod tests {
    use crate::history::{MONTHS, monthly_history};
    use crate::models::{Measurement, ScheduleWithMeasurements};
    use chrono::FixedOffset;

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(-3 * 3600).expect("valid offset")
    }

    fn measurement(id: i64, time: &str, systolic: f64, diastolic: f64) -> Measurement {
        Measurement {
            id,
            time: time.to_string(),
            systolic_pressure: systolic,
            diastolic_pressure: diastolic,
            schedule_id: 0,
        }
    }

    fn schedule(id: i64, date: &str, measurements: Vec<Measurement>) -> ScheduleWithMeasurements {
        ScheduleWithMeasurements {
            id,
            date: date.to_string(),
            measurements,
        }
    }

    #[test]
    fn test_all_twelve_months_emitted() {
        let groups = monthly_history(&[], offset());

        assert_eq!(groups.len(), 12);
        assert_eq!(groups[0].title, "January");
        assert_eq!(groups[11].title, "December");
        assert!(groups.iter().all(|group| group.items.is_empty()));

        let ids: Vec<i64> = groups.iter().map(|group| group.id).collect();
        assert_eq!(ids, (1..=12).collect::<Vec<i64>>());

        assert_eq!(MONTHS.len(), 12);
    }

    #[test]
    fn test_groups_by_month_and_day() {
        // Input deliberately out of order; days within a month come back
        // chronologically.
        let schedules = vec![
            schedule(
                2,
                "2025-03-12T07:45:00-03:00",
                vec![measurement(3, "2025-03-12T07:45:00-03:00", 122.0, 81.0)],
            ),
            schedule(
                3,
                "2025-04-02T07:45:00-03:00",
                vec![measurement(4, "2025-04-02T07:45:00-03:00", 125.0, 82.0)],
            ),
            schedule(
                1,
                "2025-03-10T08:30:00-03:00",
                vec![
                    measurement(2, "2025-03-10T20:15:00-03:00", 118.0, 79.0),
                    measurement(1, "2025-03-10T08:30:00-03:00", 120.0, 80.0),
                ],
            ),
        ];

        let groups = monthly_history(&schedules, offset());

        let march = &groups[2];
        assert_eq!(march.title, "March");
        assert_eq!(march.items.len(), 2);

        assert_eq!(march.items[0].id, "3.1");
        assert_eq!(march.items[0].title, "");
        assert_eq!(
            march.items[0].content,
            "\nDay: 10/03/2025\nTime: 20:15:00, Pressure: 118/79 mmHg\nTime: 08:30:00, Pressure: 120/80 mmHg\n"
        );

        assert_eq!(march.items[1].id, "3.2");
        assert_eq!(
            march.items[1].content,
            "\nDay: 12/03/2025\nTime: 07:45:00, Pressure: 122/81 mmHg\n"
        );

        let april = &groups[3];
        assert_eq!(april.items.len(), 1);
        assert_eq!(april.items[0].id, "4.1");

        assert!(groups[0].items.is_empty());
        assert!(groups[11].items.is_empty());
    }

    #[test]
    fn test_day_assignment_follows_offset() {
        // 2025-04-01T02:30:00Z is still March 31 at -03:00.
        let schedules = vec![schedule(
            1,
            "2025-04-01T02:30:00Z",
            vec![measurement(1, "2025-04-01T02:30:00Z", 120.0, 80.0)],
        )];

        let groups = monthly_history(&schedules, offset());

        let march = &groups[2];
        assert_eq!(march.items.len(), 1);
        assert_eq!(
            march.items[0].content,
            "\nDay: 31/03/2025\nTime: 23:30:00, Pressure: 120/80 mmHg\n"
        );

        assert!(groups[3].items.is_empty());
    }

    #[test]
    fn test_unparseable_dates_skipped() {
        let schedules = vec![schedule(1, "not-a-date", vec![])];

        let groups = monthly_history(&schedules, offset());

        assert_eq!(groups.len(), 12);
        assert!(groups.iter().all(|group| group.items.is_empty()));
    }

    #[test]
    fn test_whole_values_render_without_fraction() {
        let schedules = vec![schedule(
            1,
            "2025-03-10T08:30:00-03:00",
            vec![measurement(1, "2025-03-10T08:30:00-03:00", 120.0, 80.0)],
        )];

        let groups = monthly_history(&schedules, offset());

        assert!(groups[2].items[0].content.contains("120/80 mmHg"));
        assert!(!groups[2].items[0].content.contains("120.0"));
    }

    #[test]
    fn test_same_day_schedules_share_entry() {
        // Duplicate-day rows are a data anomaly the grouping tolerates: both
        // land in one day entry with their contents concatenated.
        let schedules = vec![
            schedule(
                1,
                "2025-03-10T08:30:00-03:00",
                vec![measurement(1, "2025-03-10T08:30:00-03:00", 120.0, 80.0)],
            ),
            schedule(
                2,
                "2025-03-10T20:15:00-03:00",
                vec![measurement(2, "2025-03-10T20:15:00-03:00", 118.0, 79.0)],
            ),
        ];

        let groups = monthly_history(&schedules, offset());

        let march = &groups[2];
        assert_eq!(march.items.len(), 1);
        assert_eq!(
            march.items[0].content,
            "\nDay: 10/03/2025\nTime: 08:30:00, Pressure: 120/80 mmHg\nTime: 20:15:00, Pressure: 118/79 mmHg\n"
        );
    }
}
