use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::repo_types::Ingredient;
use crate::patch::{double_option, set};

pub const MIN_SEARCH_LEN: usize = 2;
pub const SEARCH_LIMIT: i64 = 10;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IngredientInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub category: Option<Uuid>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub calories: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub proteins: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub fats: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub carbs: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub fibers: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub sugars: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct IngredientPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<Uuid>>,
    pub calories: Option<f64>,
    pub proteins: Option<f64>,
    pub fats: Option<f64>,
    pub carbs: Option<f64>,
    pub fibers: Option<f64>,
    pub sugars: Option<f64>,
    pub description: Option<String>,
}

impl IngredientPatch {
    pub fn apply(self, current: &Ingredient) -> IngredientInput {
        let mut input = IngredientInput {
            name: current.name.clone(),
            category: current.category_id,
            calories: current.calories,
            proteins: current.proteins,
            fats: current.fats,
            carbs: current.carbs,
            fibers: current.fibers,
            sugars: current.sugars,
            description: current.description.clone(),
        };
        set(&mut input.name, self.name);
        set(&mut input.category, self.category);
        set(&mut input.calories, self.calories);
        set(&mut input.proteins, self.proteins);
        set(&mut input.fats, self.fats);
        set(&mut input.carbs, self.carbs);
        set(&mut input.fibers, self.fibers);
        set(&mut input.sugars, self.sugars);
        set(&mut input.description, self.description);
        input
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IngredientFilter {
    pub category: Option<Uuid>,
    pub is_personal: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

impl SearchQuery {
    /// Trimmed term, `None` when shorter than [`MIN_SEARCH_LEN`] characters.
    pub fn term(&self) -> Option<&str> {
        let term = self.q.trim();
        (term.chars().count() >= MIN_SEARCH_LEN).then_some(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_term_needs_two_chars() {
        let q = |s: &str| SearchQuery { q: s.into() };
        assert_eq!(q("a").term(), None);
        assert_eq!(q("  a ").term(), None);
        assert_eq!(q("ri").term(), Some("ri"));
        assert_eq!(q(" rice ").term(), Some("rice"));
    }

    #[test]
    fn negative_facts_fail_validation() {
        let input: IngredientInput =
            serde_json::from_str(r#"{"name":"Rice","calories":-5}"#).unwrap();
        assert!(input.validate().is_err());
    }
}
