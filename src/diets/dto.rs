use serde::Deserialize;
use time::Date;
use validator::{Validate, ValidationError};

use super::repo_types::Diet;
use crate::{
    measurements::services::today,
    patch::{double_option, set},
};

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "end_not_before_start"))]
pub struct DietInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub day_proteins_g: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub day_fats_g: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub day_carbohydrates_g: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub day_calories_kcal: f64,
    #[serde(default)]
    pub is_active: bool,
    /// Defaults to today when absent.
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    #[serde(default)]
    pub notes: String,
}

fn end_not_before_start(input: &DietInput) -> Result<(), ValidationError> {
    let start = input.start_date.unwrap_or_else(today);
    if let Some(end) = input.end_date {
        if end < start {
            let mut err = ValidationError::new("date_order");
            err.message = Some("End date must not be before start date.".into());
            return Err(err);
        }
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct DietPatch {
    pub name: Option<String>,
    pub day_proteins_g: Option<f64>,
    pub day_fats_g: Option<f64>,
    pub day_carbohydrates_g: Option<f64>,
    pub day_calories_kcal: Option<f64>,
    pub is_active: Option<bool>,
    pub start_date: Option<Date>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<Date>>,
    pub notes: Option<String>,
}

impl DietPatch {
    pub fn apply(self, current: &Diet) -> DietInput {
        let mut input = DietInput {
            name: current.name.clone(),
            day_proteins_g: current.day_proteins_g,
            day_fats_g: current.day_fats_g,
            day_carbohydrates_g: current.day_carbohydrates_g,
            day_calories_kcal: current.day_calories_kcal,
            is_active: current.is_active,
            start_date: Some(current.start_date),
            end_date: current.end_date,
            notes: current.notes.clone(),
        };
        set(&mut input.name, self.name);
        set(&mut input.day_proteins_g, self.day_proteins_g);
        set(&mut input.day_fats_g, self.day_fats_g);
        set(&mut input.day_carbohydrates_g, self.day_carbohydrates_g);
        set(&mut input.day_calories_kcal, self.day_calories_kcal);
        set(&mut input.is_active, self.is_active);
        set(&mut input.start_date, self.start_date.map(Some));
        set(&mut input.end_date, self.end_date);
        set(&mut input.notes, self.notes);
        input
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DietFilter {
    pub is_active: Option<bool>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    fn diet() -> Diet {
        let ts = datetime!(2025-01-01 00:00 UTC);
        Diet {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "Cut".into(),
            day_proteins_g: 150.0,
            day_fats_g: 60.0,
            day_carbohydrates_g: 200.0,
            day_calories_kcal: 1940.0,
            is_active: false,
            start_date: date!(2025 - 01 - 01),
            end_date: Some(date!(2025 - 03 - 01)),
            notes: String::new(),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn end_before_start_is_rejected() {
        let input: DietInput = serde_json::from_str(
            r#"{"name":"Bulk","start_date":"2025-02-01","end_date":"2025-01-01"}"#,
        )
        .unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn negative_targets_are_rejected() {
        let input: DietInput =
            serde_json::from_str(r#"{"name":"Bulk","day_fats_g":-1}"#).unwrap();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("day_fats_g"));
    }

    #[test]
    fn patch_can_clear_end_date() {
        let patch: DietPatch = serde_json::from_str(r#"{"end_date":null}"#).unwrap();
        let input = patch.apply(&diet());
        assert_eq!(input.end_date, None);
        assert_eq!(input.name, "Cut");
    }

    #[test]
    fn patch_keeps_untouched_fields() {
        let patch: DietPatch = serde_json::from_str(r#"{"day_calories_kcal":2100}"#).unwrap();
        let input = patch.apply(&diet());
        assert_eq!(input.day_calories_kcal, 2100.0);
        assert_eq!(input.end_date, Some(date!(2025 - 03 - 01)));
        assert!(input.validate().is_ok());
    }
}
