// API routes and handlers

pub mod admin;
pub mod auth;
pub mod coaching;
pub mod community;
pub mod courses;
pub mod dashboard;
pub mod files;
pub mod formations;
pub mod health;
pub mod messages;
pub mod routes;
pub mod state;

pub use routes::create_routes;
pub use state::AppState;
