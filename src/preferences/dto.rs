use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use super::repo_types::MealPreference;
use crate::choices::PreferenceType;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PreferenceInput {
    pub ingredient: Uuid,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub barcode: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    pub preference_type: PreferenceType,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreferencePatch {
    pub ingredient: Option<Uuid>,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub preference_type: Option<PreferenceType>,
}

impl PreferencePatch {
    pub fn apply(self, current: &MealPreference) -> PreferenceInput {
        PreferenceInput {
            ingredient: self.ingredient.unwrap_or(current.ingredient_id),
            barcode: self.barcode.unwrap_or_else(|| current.barcode.clone()),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            preference_type: self
                .preference_type
                .or_else(|| current.preference_type.parse().ok())
                .unwrap_or(PreferenceType::Like),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PreferenceFilter {
    pub preference_type: Option<PreferenceType>,
    pub ingredient: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TypeQuery {
    #[serde(rename = "type")]
    pub preference_type: Option<PreferenceType>,
}

#[derive(Debug, Serialize)]
pub struct PreferenceOut {
    pub id: Uuid,
    pub user: Uuid,
    pub ingredient: Uuid,
    pub barcode: String,
    pub description: String,
    pub preference_type: String,
    pub preference_type_display: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<MealPreference> for PreferenceOut {
    fn from(p: MealPreference) -> Self {
        Self {
            preference_type_display: PreferenceType::label_for(&p.preference_type),
            id: p.id,
            user: p.user_id,
            ingredient: p.ingredient_id,
            barcode: p.barcode,
            description: p.description,
            preference_type: p.preference_type,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> MealPreference {
        let ts = time::macros::datetime!(2025-02-01 08:00 UTC);
        MealPreference {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            ingredient_id: Uuid::new_v4(),
            barcode: String::new(),
            description: "peanuts".into(),
            preference_type: "allergy".into(),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn patch_keeps_stored_type() {
        let current = stored();
        let patch: PreferencePatch = serde_json::from_str(r#"{"description":"all nuts"}"#).unwrap();
        let input = patch.apply(&current);
        assert_eq!(input.preference_type, PreferenceType::Allergy);
        assert_eq!(input.description, "all nuts");
        assert_eq!(input.ingredient, current.ingredient_id);
    }

    #[test]
    fn output_carries_display_label() {
        let out = PreferenceOut::from(stored());
        assert_eq!(out.preference_type_display, "Allergy");
        let json = serde_json::to_value(&out).unwrap();
        assert!(json.get("user").is_some());
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let res = serde_json::from_str::<PreferenceInput>(&format!(
            r#"{{"ingredient":"{}","preference_type":"meh"}}"#,
            Uuid::nil()
        ));
        assert!(res.is_err());
    }
}
