use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::resume::artifact::ARTIFACT_MIME;
use crate::resume::session::{ResumeSession, SessionSnapshot};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionOpened {
    pub session_id: Uuid,
}

/// POST /api/v1/resume/sessions
pub async fn handle_open_session(State(state): State<AppState>) -> Json<SessionOpened> {
    let session_id = state.sessions.open().await;
    Json(SessionOpened { session_id })
}

/// DELETE /api/v1/resume/sessions/:id
pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.close(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

#[derive(Deserialize)]
pub struct SelectRequest {
    pub usn: String,
}

/// POST /api/v1/resume/sessions/:id/select
pub async fn handle_select_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = lookup_session(&state, id).await?;

    // The selection key resolves against a fresh listing; the store stays the
    // sole consistency authority.
    let students = state.store.list_students().await?;
    let record = students
        .into_iter()
        .find(|s| s.usn == req.usn)
        .ok_or_else(|| AppError::NotFound(format!("Student {} not found", req.usn)))?;

    session.select_student(record).await;
    Ok(Json(session.snapshot().await))
}

/// POST /api/v1/resume/sessions/:id/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = lookup_session(&state, id).await?;
    // A failed generation settles the session in `Failed`; only precondition
    // violations surface as HTTP errors.
    let snapshot = session.request_generation().await?;
    Ok(Json(snapshot))
}

/// GET /api/v1/resume/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = lookup_session(&state, id).await?;
    Ok(Json(session.snapshot().await))
}

/// GET /api/v1/resume/sessions/:id/resume.md
pub async fn handle_download_artifact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = lookup_session(&state, id).await?;

    match session.export_artifact().await {
        Some(artifact) => {
            let disposition = format!("attachment; filename=\"{}\"", artifact.filename);
            Ok((
                [
                    (header::CONTENT_TYPE, ARTIFACT_MIME.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                artifact.content,
            )
                .into_response())
        }
        // Not ready (or nothing to export): a no-op, not an error.
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

async fn lookup_session(state: &AppState, id: Uuid) -> Result<Arc<ResumeSession>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}
