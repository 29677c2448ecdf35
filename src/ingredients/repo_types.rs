use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Nutrition facts are per 100 units of the ingredient.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "category")]
    pub category_id: Option<Uuid>,
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbs: f64,
    pub fibers: f64,
    pub sugars: f64,
    pub description: String,
    pub is_personal: bool,
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub(crate) const COLUMNS: &str = "id, name, category_id, calories, proteins, fats, carbs, \
     fibers, sugars, description, is_personal, created_by, created_at, updated_at";

/// Compact row for autocomplete.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct IngredientHit {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "category")]
    pub category_id: Option<Uuid>,
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbs: f64,
}
