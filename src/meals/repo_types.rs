use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use super::clock_time;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Meal {
    pub id: Uuid,
    #[serde(rename = "diet")]
    pub diet_id: Uuid,
    pub name: String,
    pub description: String,
    pub meal_type: String,
    pub is_scheduled: bool,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    #[serde(with = "clock_time::option")]
    pub start_time: Option<Time>,
    pub duration_minutes: i32,
    pub recurrence_type: String,
    pub recurrence_until: Option<Date>,
    pub google_calendar_event_id: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_synced_to_calendar: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub(crate) const MEAL_COLUMNS: &str = "id, diet_id, name, description, meal_type, is_scheduled, \
     start_date, end_date, start_time, duration_minutes, recurrence_type, recurrence_until, \
     google_calendar_event_id, last_synced_to_calendar, created_at, updated_at";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MealIngredient {
    pub id: Uuid,
    #[serde(rename = "meal")]
    pub meal_id: Uuid,
    #[serde(rename = "ingredient")]
    pub ingredient_id: Uuid,
    pub barcode: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub(crate) const LINE_COLUMNS: &str =
    "id, meal_id, ingredient_id, barcode, quantity, unit, created_at";

/// Quantity of one ingredient in a meal joined with its per-100 facts.
#[derive(Debug, Clone, FromRow)]
pub struct IngredientLine {
    pub meal_id: Uuid,
    pub quantity: f64,
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbs: f64,
}
