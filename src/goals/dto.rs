use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;
use validator::Validate;

use super::{repo_types::Goal, services::days_remaining};
use crate::{choices::GoalType, measurements::dto::MeasurementOut};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GoalInput {
    pub goal_type: GoalType,
    pub target_date: Date,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub notes: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoalPatch {
    pub goal_type: Option<GoalType>,
    pub target_date: Option<Date>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

impl GoalPatch {
    pub fn apply(self, current: &Goal) -> GoalInput {
        GoalInput {
            goal_type: self
                .goal_type
                .or_else(|| current.goal_type.parse().ok())
                .unwrap_or(GoalType::GeneralFitness),
            target_date: self.target_date.unwrap_or(current.target_date),
            notes: self.notes.unwrap_or_else(|| current.notes.clone()),
            is_active: self.is_active.unwrap_or(current.is_active),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GoalFilter {
    pub goal_type: Option<GoalType>,
    pub is_active: Option<bool>,
    pub target_date: Option<Date>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TypeQuery {
    #[serde(rename = "type")]
    pub goal_type: Option<GoalType>,
}

#[derive(Debug, Serialize)]
pub struct GoalOut {
    pub id: Uuid,
    pub user: Uuid,
    pub goal_type: String,
    pub goal_type_display: String,
    pub target_date: Date,
    pub notes: String,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub days_remaining: i64,
}

impl GoalOut {
    pub fn new(goal: Goal, today: Date) -> Self {
        Self {
            days_remaining: days_remaining(goal.target_date, today),
            goal_type_display: GoalType::label_for(&goal.goal_type),
            id: goal.id,
            user: goal.user_id,
            goal_type: goal.goal_type,
            target_date: goal.target_date,
            notes: goal.notes,
            is_active: goal.is_active,
            created_at: goal.created_at,
            updated_at: goal.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Status {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Progress {
    Tracked {
        goal: GoalOut,
        first_measurement: MeasurementOut,
        latest_measurement: MeasurementOut,
        measurements_count: i64,
        days_since_start: i64,
    },
    NoData {
        goal: GoalOut,
        progress: &'static str,
        measurements_count: i64,
    },
}
