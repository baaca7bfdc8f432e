//! Axum handlers for Final field writes and reads.
//!
//! Each write lands on the current Final independently; once both fields are
//! present the record is auto-finalized, mirroring the save-as-you-edit flow.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::applications::load_application;
use crate::errors::AppError;
use crate::finals::{current_final, finalize, update_field, FinalField};
use crate::models::final_snapshot::FinalRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FinalFieldRequest {
    pub user_id: Uuid,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct FinalResponse {
    pub r#final: FinalRow,
    pub finalized: bool,
}

/// POST /api/v1/applications/:id/final_coverletter
pub async fn handle_final_coverletter(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(req): Json<FinalFieldRequest>,
) -> Result<Json<FinalResponse>, AppError> {
    save_final_field(&state, application_id, FinalField::CoverLetter, req).await
}

/// POST /api/v1/applications/:id/final_pitch
pub async fn handle_final_pitch(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(req): Json<FinalFieldRequest>,
) -> Result<Json<FinalResponse>, AppError> {
    save_final_field(&state, application_id, FinalField::Pitch, req).await
}

/// GET /api/v1/applications/:id/final
pub async fn handle_get_final(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
) -> Result<Json<FinalRow>, AppError> {
    let row = current_final(&state.db, application_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No final exists for application {application_id}"))
        })?;
    Ok(Json(row))
}

async fn save_final_field(
    state: &AppState,
    application_id: Uuid,
    field: FinalField,
    req: FinalFieldRequest,
) -> Result<Json<FinalResponse>, AppError> {
    // 404 on unknown applications before any Final is lazily created.
    load_application(&state.db, application_id).await?;

    let row = update_field(&state.db, application_id, field, &req.content).await?;

    // Auto-finalize once both fields hold text.
    let (row, finalized) = if row.content_ready() {
        (finalize(&state.db, row.id, Some(req.user_id)).await?, true)
    } else {
        (row, false)
    };

    Ok(Json(FinalResponse {
        r#final: row,
        finalized,
    }))
}
