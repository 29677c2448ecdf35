//! Meals belong to a diet and are owned through it; meal-ingredient lines
//! link them to ingredients with a quantity.

mod clock_time;
pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::meal_routes())
        .merge(handlers::line_routes())
}
