use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct MealPreference {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ingredient_id: Uuid,
    pub barcode: String,
    pub description: String,
    pub preference_type: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub(crate) const COLUMNS: &str =
    "id, user_id, ingredient_id, barcode, description, preference_type, created_at, updated_at";
