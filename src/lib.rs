pub mod accounts;
pub mod activation;
pub mod app;
pub mod auth;
pub mod bulk;
pub mod categories;
pub mod choices;
pub mod config;
pub mod diets;
pub mod error;
pub mod extract;
pub mod goals;
pub mod ingredients;
pub mod meals;
pub mod measurements;
pub mod pagination;
pub mod patch;
pub mod preferences;
pub mod records;
pub mod state;
