use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::student::{NewStudent, StudentRecord};
use crate::state::AppState;
use crate::store::filter_students;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /api/v1/students?q=
/// Listing is newest-first; `q` filters by name or USN substring.
pub async fn handle_list_students(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<StudentRecord>>, AppError> {
    let students = state.store.list_students().await?;
    let query = params.q.unwrap_or_default();
    let matched: Vec<StudentRecord> = filter_students(&students, &query).cloned().collect();
    Ok(Json(matched))
}

/// POST /api/v1/students
pub async fn handle_create_student(
    State(state): State<AppState>,
    Json(req): Json<NewStudent>,
) -> Result<(StatusCode, Json<StudentRecord>), AppError> {
    if let Some(field) = req.missing_field() {
        return Err(AppError::Validation(format!(
            "All fields are mandatory; '{field}' is empty"
        )));
    }

    let record = state.store.insert_student(req).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/v1/students/:usn
/// Fire-and-forget: callers re-list afterwards, nothing is pushed.
pub async fn handle_delete_student(
    State(state): State<AppState>,
    Path(usn): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete_student(&usn).await?;
    Ok(StatusCode::NO_CONTENT)
}
