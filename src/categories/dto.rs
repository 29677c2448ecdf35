use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::repo_types::Category;
use crate::patch::{double_option, set};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub parent: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent: Option<Option<Uuid>>,
}

impl CategoryPatch {
    pub fn apply(self, current: &Category) -> CategoryInput {
        let mut input = CategoryInput {
            name: current.name.clone(),
            parent: current.parent_id,
        };
        set(&mut input.name, self.name);
        set(&mut input.parent, self.parent);
        input
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryFilter {
    pub parent: Option<Uuid>,
}
