//! Meal records: what a user actually ate, either linked to one of their
//! meals or carrying its own nutrition numbers.

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::record_routes()
}
