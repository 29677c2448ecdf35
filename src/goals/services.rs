use time::Date;

use super::dto::{GoalOut, Progress};
use crate::{
    choices::Metric,
    measurements::{dto::MeasurementOut, repo_types::BodyMeasurement, services::utc_date},
};

/// Metrics compared by goal progress, whatever the goal type.
pub const PROGRESS_METRICS: [Metric; 3] = [
    Metric::WeightKg,
    Metric::BodyFatPercentage,
    Metric::MuscleMassPercentage,
];

pub const NO_MEASUREMENTS: &str = "No measurements recorded yet";

/// Whole days from `today` to `target`; negative once overdue.
pub fn days_remaining(target: Date, today: Date) -> i64 {
    (target - today).whole_days()
}

pub fn progress(
    goal: GoalOut,
    count: i64,
    first: Option<BodyMeasurement>,
    last: Option<BodyMeasurement>,
) -> Progress {
    match (first, last) {
        (Some(first), Some(last)) if count > 0 => Progress::Tracked {
            days_since_start: (utc_date(last.timestamp) - utc_date(first.timestamp)).whole_days(),
            goal,
            first_measurement: MeasurementOut::from(first),
            latest_measurement: MeasurementOut::from(last),
            measurements_count: count,
        },
        _ => Progress::NoData {
            goal,
            progress: NO_MEASUREMENTS,
            measurements_count: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{goals::repo_types::Goal, measurements::services::tests::row};
    use time::macros::{date, datetime};
    use uuid::Uuid;

    fn goal(target: Date) -> GoalOut {
        let ts = datetime!(2025-01-01 00:00 UTC);
        GoalOut::new(
            Goal {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                goal_type: "endurance".into(),
                target_date: target,
                notes: String::new(),
                is_active: true,
                created_at: ts,
                updated_at: ts,
            },
            date!(2025 - 01 - 10),
        )
    }

    #[test]
    fn days_remaining_counts_both_ways() {
        assert_eq!(days_remaining(date!(2025 - 02 - 01), date!(2025 - 01 - 01)), 31);
        assert_eq!(days_remaining(date!(2025 - 01 - 01), date!(2025 - 01 - 01)), 0);
        assert_eq!(days_remaining(date!(2024 - 12 - 30), date!(2025 - 01 - 01)), -2);
    }

    #[test]
    fn goal_out_carries_days_remaining_and_label() {
        let out = goal(date!(2025 - 01 - 15));
        assert_eq!(out.days_remaining, 5);
        assert_eq!(out.goal_type_display, "Endurance");
    }

    #[test]
    fn no_measurements_yields_sentinel() {
        let value = serde_json::to_value(progress(goal(date!(2025 - 02 - 01)), 0, None, None)).unwrap();
        assert_eq!(value["progress"], NO_MEASUREMENTS);
        assert_eq!(value["measurements_count"], 0);
        assert!(value.get("first_measurement").is_none());
    }

    #[test]
    fn progress_spans_first_to_latest() {
        let first = row(Metric::WeightKg, 90.0, datetime!(2025-01-01 07:00 UTC));
        let last = row(Metric::BodyFatPercentage, 18.0, datetime!(2025-01-21 22:00 UTC));
        let value =
            serde_json::to_value(progress(goal(date!(2025 - 02 - 01)), 4, Some(first), Some(last)))
                .unwrap();
        assert_eq!(value["days_since_start"], 20);
        assert_eq!(value["measurements_count"], 4);
        assert_eq!(value["first_measurement"]["value"], 90.0);
        assert_eq!(value["latest_measurement"]["metric"], "body_fat_percentage");
        assert!(value.get("progress").is_none());
    }
}
