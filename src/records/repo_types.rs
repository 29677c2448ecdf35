use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// A consumption event. Nutrition fields are only meaningful when no meal is linked.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MealRecord {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    #[serde(rename = "meal")]
    pub meal_id: Option<Uuid>,
    pub meal_name: Option<String>,
    pub quantity_grams: Option<f64>,
    pub calories: Option<f64>,
    pub proteins: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub photo: Option<String>,
    pub feedback: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub(crate) const COLUMNS: &str = "id, user_id, meal_id, meal_name, quantity_grams, calories, \
     proteins, carbs, fats, timestamp, photo, feedback, created_at, updated_at";
