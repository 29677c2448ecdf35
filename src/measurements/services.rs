//! Read models over body measurements: latest per metric, trend windows and summary.

use time::{Date, Duration, OffsetDateTime, UtcOffset};

use super::{
    dto::{Summary, SummaryEntry, TrendPoint},
    repo_types::BodyMeasurement,
};
use crate::{choices::Metric, error::AppError};

/// Metrics `latest` reports when the caller names none.
pub const DEFAULT_LATEST_METRICS: [Metric; 3] = [
    Metric::WeightKg,
    Metric::BodyFatPercentage,
    Metric::MuscleMassPercentage,
];

/// Metrics reported by `summary`.
pub const SUMMARY_METRICS: [Metric; 7] = [
    Metric::WeightKg,
    Metric::WaistCm,
    Metric::HipCm,
    Metric::NeckCm,
    Metric::BodyFatPercentage,
    Metric::MuscleMassPercentage,
    Metric::BmiValue,
];

pub const DEFAULT_TREND_DAYS: i64 = 30;
const MAX_WINDOW_DAYS: i64 = 365 * 100;

/// Calendar date of a timestamp in UTC.
pub fn utc_date(ts: OffsetDateTime) -> Date {
    ts.to_offset(UtcOffset::UTC).date()
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Inclusive `[today - days, today]`.
pub fn trend_window(today: Date, days: i64) -> Result<(Date, Date), AppError> {
    if days < 0 {
        return Err(AppError::BadRequest("days must be >= 0".into()));
    }
    if days > MAX_WINDOW_DAYS {
        return Err(AppError::BadRequest("days is out of range".into()));
    }
    let start = today
        .checked_sub(Duration::days(days))
        .ok_or_else(|| AppError::BadRequest("days is out of range".into()))?;
    Ok((start, today))
}

/// Parse `metrics` from raw query pairs; accepts repeated keys, `metrics[]` and comma lists.
///
/// Duplicates are dropped keeping first-seen order. No metrics means the default triple.
pub fn requested_metrics(pairs: &[(String, String)]) -> Result<Vec<Metric>, AppError> {
    let mut out: Vec<Metric> = Vec::new();
    let values = pairs
        .iter()
        .filter(|(k, _)| k == "metrics" || k == "metrics[]")
        .flat_map(|(_, v)| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty());
    for raw in values {
        let metric = raw
            .parse::<Metric>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        if !out.contains(&metric) {
            out.push(metric);
        }
    }
    if out.is_empty() {
        out.extend(DEFAULT_LATEST_METRICS);
    }
    Ok(out)
}

/// Keep one row per metric in `requested` order; rows must already be latest-per-metric.
pub fn order_latest(rows: Vec<BodyMeasurement>, requested: &[Metric]) -> Vec<BodyMeasurement> {
    let mut rows = rows;
    let mut out = Vec::with_capacity(requested.len());
    for metric in requested {
        if let Some(pos) = rows.iter().position(|r| r.metric == metric.as_str()) {
            out.push(rows.swap_remove(pos));
        }
    }
    out
}

/// Rows inside `[start, end]` (UTC dates), ascending by timestamp.
///
/// `repo::in_window` already filters and sorts in SQL and is the authoritative
/// window; this only shapes rows into points and keeps the window rule testable
/// without a database.
pub fn trend_points(rows: &[BodyMeasurement], start: Date, end: Date) -> Vec<TrendPoint> {
    let mut inside: Vec<&BodyMeasurement> = rows
        .iter()
        .filter(|r| {
            let d = utc_date(r.timestamp);
            d >= start && d <= end
        })
        .collect();
    inside.sort_by_key(|r| r.timestamp);
    inside
        .into_iter()
        .map(|r| TrendPoint {
            date: utc_date(r.timestamp),
            value: r.value,
            measurement_type: r.measurement_type.clone(),
        })
        .collect()
}

pub fn summarize(latest: &[BodyMeasurement]) -> Summary {
    latest
        .iter()
        .map(|m| {
            (
                m.metric.clone(),
                SummaryEntry {
                    latest_value: m.value,
                    latest_date: utc_date(m.timestamp),
                    measurement_type: m.measurement_type.clone(),
                },
            )
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    pub(crate) fn row(metric: Metric, value: f64, ts: OffsetDateTime) -> BodyMeasurement {
        BodyMeasurement {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            metric: metric.as_str().into(),
            measurement_type: "log".into(),
            value,
            timestamp: ts,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn window_spans_days_back_from_today() {
        let (start, end) = trend_window(date!(2025 - 03 - 31), 30).unwrap();
        assert_eq!(start, date!(2025 - 03 - 01));
        assert_eq!(end, date!(2025 - 03 - 31));
    }

    #[test]
    fn zero_day_window_is_today_only() {
        let (start, end) = trend_window(date!(2025 - 03 - 31), 0).unwrap();
        assert_eq!(start, end);
    }

    #[test]
    fn negative_or_huge_windows_are_rejected() {
        assert!(trend_window(date!(2025 - 03 - 31), -1).is_err());
        assert!(trend_window(date!(2025 - 03 - 31), i64::MAX).is_err());
    }

    #[test]
    fn trend_excludes_rows_outside_window_and_sorts() {
        let rows = vec![
            row(Metric::WeightKg, 80.0, datetime!(2025-03-20 08:00 UTC)),
            row(Metric::WeightKg, 82.0, datetime!(2025-02-27 08:00 UTC)),
            row(Metric::WeightKg, 81.0, datetime!(2025-03-01 00:00 UTC)),
            row(Metric::WeightKg, 79.0, datetime!(2025-04-01 00:00 UTC)),
        ];
        let (start, end) = trend_window(date!(2025 - 03 - 31), 30).unwrap();
        let points = trend_points(&rows, start, end);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 81.0);
        assert_eq!(points[1].value, 80.0);
        assert!(points.iter().all(|p| p.date >= start && p.date <= end));
    }

    #[test]
    fn trend_over_nothing_is_empty() {
        let (start, end) = trend_window(date!(2025 - 03 - 31), 30).unwrap();
        assert!(trend_points(&[], start, end).is_empty());
    }

    #[test]
    fn trend_uses_utc_date_of_offset_timestamps() {
        // 2025-03-01 01:00 +03:00 is still Feb 28 in UTC.
        let rows = vec![row(Metric::WeightKg, 70.0, datetime!(2025-03-01 01:00 +3))];
        let points = trend_points(&rows, date!(2025 - 03 - 01), date!(2025 - 03 - 31));
        assert!(points.is_empty());
    }

    #[test]
    fn order_latest_follows_request_order_and_drops_missing() {
        let rows = vec![
            row(Metric::BodyFatPercentage, 20.0, datetime!(2025-01-02 08:00 UTC)),
            row(Metric::WeightKg, 74.5, datetime!(2025-01-15 08:00 UTC)),
        ];
        let ordered = order_latest(rows, &[Metric::WeightKg, Metric::HipCm, Metric::BodyFatPercentage]);
        let metrics: Vec<_> = ordered.iter().map(|r| r.metric.as_str()).collect();
        assert_eq!(metrics, ["weight_kg", "body_fat_percentage"]);
    }

    #[test]
    fn requested_metrics_defaults_and_dedupes() {
        assert_eq!(requested_metrics(&[]).unwrap(), DEFAULT_LATEST_METRICS.to_vec());
        let parsed = requested_metrics(&pairs(&[
            ("metrics", "waist_cm"),
            ("metrics[]", "hip_cm,waist_cm"),
            ("days", "3"),
        ]))
        .unwrap();
        assert_eq!(parsed, vec![Metric::WaistCm, Metric::HipCm]);
    }

    #[test]
    fn requested_metrics_rejects_unknown_names() {
        assert!(requested_metrics(&pairs(&[("metrics", "shoe_size")])).is_err());
    }

    #[test]
    fn summary_is_keyed_by_metric() {
        let latest = vec![row(Metric::HipCm, 98.0, datetime!(2025-01-02 23:30 UTC))];
        let summary = summarize(&latest);
        assert_eq!(summary["hip_cm"].latest_value, 98.0);
        assert_eq!(summary["hip_cm"].latest_date, date!(2025 - 01 - 02));
        assert!(!summary.contains_key("weight_kg"));
    }
}
