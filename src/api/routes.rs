use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::admin::admin_routes;
use super::auth::{auth_routes, signup_routes};
use super::coaching::coaching_routes;
use super::community::community_routes;
use super::courses::{exercise_routes, module_routes, submission_routes};
use super::dashboard::dashboard_routes;
use super::files::file_routes;
use super::formations::formation_routes;
use super::health::health_check;
use super::messages::message_routes;
use super::state::AppState;
use crate::auth::{cors_layer, security_headers_layer};

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(signup_routes(state.clone()))
        .nest("/api/auth", auth_routes(state.clone()))
        .nest("/api/formations", formation_routes(state.clone()))
        .nest("/api/modules", module_routes(state.clone()))
        .nest("/api/exercises", exercise_routes(state.clone()))
        .nest("/api/submissions", submission_routes(state.clone()))
        .nest("/api/files", file_routes(state.clone()))
        .nest("/api/community", community_routes(state.clone()))
        .nest("/api/messages", message_routes(state.clone()))
        .nest("/api/coaching", coaching_routes(state.clone()))
        .nest("/api/dashboard", dashboard_routes(state.clone()))
        .nest("/api/admin", admin_routes(state))
        .layer(security_headers_layer())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}
