pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::applications::handlers as applications;
use crate::finals::handlers as finals;
use crate::generation::handlers as generation;
use crate::selection::handlers as selections;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Application lifecycle
        .route(
            "/api/v1/applications",
            post(applications::handle_create_application),
        )
        .route(
            "/api/v1/applications/:id",
            get(applications::handle_get_application)
                .delete(applications::handle_delete_application),
        )
        .route(
            "/api/v1/applications/:id/cv",
            put(applications::handle_upload_cv),
        )
        .route(
            "/api/v1/applications/:id/video",
            post(applications::handle_upload_video),
        )
        // Generation pipeline
        .route(
            "/api/v1/applications/:id/traits",
            patch(generation::handle_submit_traits),
        )
        .route(
            "/api/v1/applications/:id/status",
            get(applications::handle_get_status),
        )
        .route(
            "/api/v1/applications/:id/generate_coverletter",
            post(generation::handle_regenerate_coverletter),
        )
        .route(
            "/api/v1/applications/:id/generate_pitch",
            post(generation::handle_regenerate_pitch),
        )
        // Finalization
        .route(
            "/api/v1/applications/:id/final",
            get(finals::handle_get_final),
        )
        .route(
            "/api/v1/applications/:id/final_coverletter",
            post(finals::handle_final_coverletter),
        )
        .route(
            "/api/v1/applications/:id/final_pitch",
            post(finals::handle_final_pitch),
        )
        // Saved selection profiles
        .route(
            "/api/v1/selections",
            get(selections::handle_list_profiles),
        )
        .with_state(state)
}
