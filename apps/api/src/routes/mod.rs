pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::students::handlers as students;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Student records
        .route(
            "/api/v1/students",
            get(students::handle_list_students).post(students::handle_create_student),
        )
        .route("/api/v1/students/:usn", delete(students::handle_delete_student))
        // Resume workflow
        .route("/api/v1/resume/sessions", post(resume::handle_open_session))
        .route(
            "/api/v1/resume/sessions/:id",
            get(resume::handle_get_session).delete(resume::handle_close_session),
        )
        .route(
            "/api/v1/resume/sessions/:id/select",
            post(resume::handle_select_student),
        )
        .route(
            "/api/v1/resume/sessions/:id/generate",
            post(resume::handle_generate),
        )
        .route(
            "/api/v1/resume/sessions/:id/resume.md",
            get(resume::handle_download_artifact),
        )
        .with_state(state)
}
