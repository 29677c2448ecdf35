use serde::{Deserialize, Serialize};
use time::{Date, Time};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{
    clock_time,
    repo_types::{Meal, MealIngredient},
    services::NutritionTotals,
};
use crate::{
    choices::{MealType, RecurrenceType},
    patch::{double_option, set},
};

fn default_duration() -> i32 {
    30
}

fn default_unit() -> String {
    "g".into()
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "dates_in_order"))]
pub struct MealInput {
    pub diet: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub meal_type: MealType,
    #[serde(default)]
    pub is_scheduled: bool,
    #[serde(default)]
    pub start_date: Option<Date>,
    #[serde(default)]
    pub end_date: Option<Date>,
    #[serde(default, with = "clock_time::option")]
    pub start_time: Option<Time>,
    #[serde(default = "default_duration")]
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: i32,
    #[serde(default)]
    pub recurrence_type: RecurrenceType,
    #[serde(default)]
    pub recurrence_until: Option<Date>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub google_calendar_event_id: String,
}

fn dates_in_order(input: &MealInput) -> Result<(), ValidationError> {
    let Some(start) = input.start_date else {
        return Ok(());
    };
    let before_start = |d: Option<Date>| d.is_some_and(|d| d < start);
    if before_start(input.end_date) || before_start(input.recurrence_until) {
        let mut err = ValidationError::new("date_order");
        err.message = Some("End dates must not be before the start date.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct MealPatch {
    pub diet: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub meal_type: Option<MealType>,
    pub is_scheduled: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "clock_time::patch")]
    pub start_time: Option<Option<Time>>,
    pub duration_minutes: Option<i32>,
    pub recurrence_type: Option<RecurrenceType>,
    #[serde(default, deserialize_with = "double_option")]
    pub recurrence_until: Option<Option<Date>>,
    pub google_calendar_event_id: Option<String>,
}

impl MealPatch {
    pub fn apply(self, current: &Meal) -> MealInput {
        let mut input = MealInput {
            diet: current.diet_id,
            name: current.name.clone(),
            description: current.description.clone(),
            meal_type: current.meal_type.parse().unwrap_or_default(),
            is_scheduled: current.is_scheduled,
            start_date: current.start_date,
            end_date: current.end_date,
            start_time: current.start_time,
            duration_minutes: current.duration_minutes,
            recurrence_type: current.recurrence_type.parse().unwrap_or_default(),
            recurrence_until: current.recurrence_until,
            google_calendar_event_id: current.google_calendar_event_id.clone(),
        };
        set(&mut input.diet, self.diet);
        set(&mut input.name, self.name);
        set(&mut input.description, self.description);
        set(&mut input.meal_type, self.meal_type);
        set(&mut input.is_scheduled, self.is_scheduled);
        set(&mut input.start_date, self.start_date);
        set(&mut input.end_date, self.end_date);
        set(&mut input.start_time, self.start_time);
        set(&mut input.duration_minutes, self.duration_minutes);
        set(&mut input.recurrence_type, self.recurrence_type);
        set(&mut input.recurrence_until, self.recurrence_until);
        set(
            &mut input.google_calendar_event_id,
            self.google_calendar_event_id,
        );
        input
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MealFilter {
    pub diet: Option<Uuid>,
    pub meal_type: Option<MealType>,
    pub is_scheduled: Option<bool>,
    pub recurrence_type: Option<RecurrenceType>,
}

/// One meal-ingredient line. `meal` is taken from the path on the nested
/// meal routes and is required on `/meal-ingredients`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LineInput {
    #[serde(default)]
    pub meal: Option<Uuid>,
    pub ingredient: Uuid,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub barcode: String,
    #[validate(range(exclusive_min = 0.0, message = "Quantity must be positive."))]
    pub quantity: f64,
    #[serde(default = "default_unit")]
    #[validate(length(min = 1, max = 20))]
    pub unit: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LinePatch {
    pub meal: Option<Uuid>,
    pub ingredient: Option<Uuid>,
    pub barcode: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

impl LinePatch {
    pub fn apply(self, current: &MealIngredient) -> LineInput {
        let mut input = LineInput {
            meal: Some(current.meal_id),
            ingredient: current.ingredient_id,
            barcode: current.barcode.clone(),
            quantity: current.quantity,
            unit: current.unit.clone(),
        };
        set(&mut input.meal, self.meal.map(Some));
        set(&mut input.ingredient, self.ingredient);
        set(&mut input.barcode, self.barcode);
        set(&mut input.quantity, self.quantity);
        set(&mut input.unit, self.unit);
        input
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LineFilter {
    pub meal: Option<Uuid>,
    pub ingredient: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct BulkLinesRequest {
    pub ingredients: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct NutritionSummary {
    pub total_calories: f64,
    pub total_proteins: f64,
    pub total_fats: f64,
    pub total_carbs: f64,
    pub ingredient_count: usize,
}

impl NutritionSummary {
    pub fn new(totals: NutritionTotals, ingredient_count: usize) -> Self {
        Self {
            total_calories: totals.calories,
            total_proteins: totals.proteins,
            total_fats: totals.fats,
            total_carbs: totals.carbs,
            ingredient_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meal_defaults() {
        let input: MealInput = serde_json::from_str(&format!(
            r#"{{"diet":"{}","name":"Oats"}}"#,
            Uuid::nil()
        ))
        .unwrap();
        assert_eq!(input.meal_type, MealType::Regular);
        assert_eq!(input.recurrence_type, RecurrenceType::Never);
        assert_eq!(input.duration_minutes, 30);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn recurrence_before_start_is_rejected() {
        let input: MealInput = serde_json::from_str(&format!(
            r#"{{"diet":"{}","name":"Oats","start_date":"2025-05-10","recurrence_until":"2025-05-01"}}"#,
            Uuid::nil()
        ))
        .unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn line_quantity_must_be_positive() {
        let line: LineInput = serde_json::from_str(&format!(
            r#"{{"ingredient":"{}","quantity":0}}"#,
            Uuid::nil()
        ))
        .unwrap();
        let errors = line.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("quantity"));
        assert_eq!(line.unit, "g");
    }
}
