use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;
use validator::Validate;

use super::repo_types::BodyMeasurement;
use crate::choices::{MeasurementType, Metric};

/// Body of a single create / full replace.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MeasurementInput {
    pub metric: Metric,
    #[serde(default)]
    pub measurement_type: MeasurementType,
    #[validate(range(exclusive_min = 0.0, max = 10000.0, message = "Value must be positive."))]
    pub value: f64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MeasurementPatch {
    pub metric: Option<Metric>,
    pub measurement_type: Option<MeasurementType>,
    pub value: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

impl MeasurementPatch {
    pub fn apply(self, current: &BodyMeasurement) -> MeasurementInput {
        MeasurementInput {
            metric: self
                .metric
                .or_else(|| current.metric.parse().ok())
                .unwrap_or(Metric::WeightKg),
            measurement_type: self
                .measurement_type
                .or_else(|| current.measurement_type.parse().ok())
                .unwrap_or_default(),
            value: self.value.unwrap_or(current.value),
            timestamp: Some(self.timestamp.unwrap_or(current.timestamp)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MeasurementFilter {
    pub metric: Option<Metric>,
    pub measurement_type: Option<MeasurementType>,
}

#[derive(Debug, Deserialize)]
pub struct MetricQuery {
    pub metric: Option<Metric>,
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub metric: Option<Metric>,
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BulkMeasurementsRequest {
    pub measurements: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct MeasurementOut {
    pub id: Uuid,
    pub user: Uuid,
    pub metric: String,
    pub metric_display: String,
    pub measurement_type: String,
    pub measurement_type_display: String,
    pub value: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<BodyMeasurement> for MeasurementOut {
    fn from(m: BodyMeasurement) -> Self {
        Self {
            metric_display: Metric::label_for(&m.metric),
            measurement_type_display: MeasurementType::label_for(&m.measurement_type),
            id: m.id,
            user: m.user_id,
            metric: m.metric,
            measurement_type: m.measurement_type,
            value: m.value,
            timestamp: m.timestamp,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: Date,
    pub value: f64,
    pub measurement_type: String,
}

#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub metric: Metric,
    pub period_days: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub measurements: Vec<TrendPoint>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub latest_value: f64,
    pub latest_date: Date,
    pub measurement_type: String,
}

pub type Summary = BTreeMap<String, SummaryEntry>;
