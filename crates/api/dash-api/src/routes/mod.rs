pub mod auth;
pub mod dashboard;
pub mod health;
pub mod preferences;
