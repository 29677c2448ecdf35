use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;
use validator::Validate;

use super::repo_types::MealRecord;
use crate::patch::{double_option, set};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordInput {
    #[serde(default)]
    pub meal: Option<Uuid>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub meal_name: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub quantity_grams: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub calories: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub proteins: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub carbs: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub fats: Option<f64>,
    /// Defaults to now when absent.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub photo: Option<String>,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecordPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub meal: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub meal_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub quantity_grams: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub calories: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub proteins: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub carbs: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub fats: Option<Option<f64>>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "double_option")]
    pub photo: Option<Option<String>>,
    pub feedback: Option<String>,
}

impl RecordPatch {
    pub fn apply(self, current: &MealRecord) -> RecordInput {
        let mut input = RecordInput {
            meal: current.meal_id,
            meal_name: current.meal_name.clone(),
            quantity_grams: current.quantity_grams,
            calories: current.calories,
            proteins: current.proteins,
            carbs: current.carbs,
            fats: current.fats,
            timestamp: Some(current.timestamp),
            photo: current.photo.clone(),
            feedback: current.feedback.clone(),
        };
        set(&mut input.meal, self.meal);
        set(&mut input.meal_name, self.meal_name);
        set(&mut input.quantity_grams, self.quantity_grams);
        set(&mut input.calories, self.calories);
        set(&mut input.proteins, self.proteins);
        set(&mut input.carbs, self.carbs);
        set(&mut input.fats, self.fats);
        set(&mut input.timestamp, self.timestamp.map(Some));
        set(&mut input.photo, self.photo);
        set(&mut input.feedback, self.feedback);
        input
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecordFilter {
    pub meal: Option<Uuid>,
    /// UTC calendar date of the record's timestamp.
    pub date: Option<Date>,
}

/// `days` back from today, or an explicit inclusive `start_date`..`end_date`.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub days: Option<i64>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct RangeSummary {
    pub period_days: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub total_calories: f64,
    pub total_proteins: f64,
    pub total_fats: f64,
    pub total_carbs: f64,
    pub record_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let ts = time::macros::datetime!(2025-01-01 12:00 UTC);
        let current = MealRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            meal_id: Some(Uuid::new_v4()),
            meal_name: Some("Lunch".into()),
            quantity_grams: None,
            calories: Some(500.0),
            proteins: None,
            carbs: None,
            fats: None,
            timestamp: ts,
            photo: None,
            feedback: String::new(),
            created_at: ts,
            updated_at: ts,
        };
        let patch: RecordPatch = serde_json::from_str(r#"{"meal":null,"fats":12.5}"#).unwrap();
        let input = patch.apply(&current);
        assert_eq!(input.meal, None);
        assert_eq!(input.fats, Some(12.5));
        assert_eq!(input.calories, Some(500.0));
        assert_eq!(input.meal_name.as_deref(), Some("Lunch"));
        assert_eq!(input.timestamp, Some(ts));
    }

    #[test]
    fn negative_calories_fail_validation() {
        let input: RecordInput = serde_json::from_str(r#"{"calories":-10}"#).unwrap();
        assert!(input.validate().is_err());
    }
}
