use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Diet {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub name: String,
    pub day_proteins_g: f64,
    pub day_fats_g: f64,
    pub day_carbohydrates_g: f64,
    pub day_calories_kcal: f64,
    pub is_active: bool,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub notes: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub(crate) const COLUMNS: &str = "id, user_id, name, day_proteins_g, day_fats_g, \
     day_carbohydrates_g, day_calories_kcal, is_active, start_date, end_date, notes, \
     created_at, updated_at";
