pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::state::AppState;
use crate::wizard::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session lifecycle
        .route("/api/v1/wizard", post(handlers::handle_create))
        .route(
            "/api/v1/wizard/:id",
            get(handlers::handle_get).delete(handlers::handle_delete),
        )
        // Navigation
        .route("/api/v1/wizard/:id/next", post(handlers::handle_next))
        .route("/api/v1/wizard/:id/previous", post(handlers::handle_previous))
        .route("/api/v1/wizard/:id/step/:n", post(handlers::handle_jump))
        // Step 1
        .route(
            "/api/v1/wizard/:id/job-description",
            put(handlers::handle_set_job_description),
        )
        .route(
            "/api/v1/wizard/:id/job-description/upload",
            post(handlers::handle_upload_job_description),
        )
        // Step 2
        .route(
            "/api/v1/wizard/:id/personal-info",
            put(handlers::handle_set_personal_info),
        )
        .route(
            "/api/v1/wizard/:id/experience",
            post(handlers::handle_add_experience),
        )
        .route(
            "/api/v1/wizard/:id/experience/:index",
            put(handlers::handle_update_experience).delete(handlers::handle_remove_experience),
        )
        .route(
            "/api/v1/wizard/:id/education",
            post(handlers::handle_add_education),
        )
        .route(
            "/api/v1/wizard/:id/education/:index",
            put(handlers::handle_update_education).delete(handlers::handle_remove_education),
        )
        .route("/api/v1/wizard/:id/skills", post(handlers::handle_add_skill))
        .route(
            "/api/v1/wizard/:id/skills/:skill",
            delete(handlers::handle_remove_skill),
        )
        // Step 4
        .route(
            "/api/v1/wizard/:id/template",
            put(handlers::handle_change_template),
        )
        .route(
            "/api/v1/wizard/:id/regenerate",
            post(handlers::handle_regenerate),
        )
        .route("/api/v1/wizard/:id/preview", get(handlers::handle_preview))
        .route("/api/v1/wizard/:id/download", get(handlers::handle_download))
        .with_state(state)
}
