//! Axum handlers for application lifecycle: create, overview, delete, status
//! polling, and the CV/video upload collaborators.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::applications::load_application;
use crate::cv;
use crate::errors::AppError;
use crate::finals::{create_initial_final, current_final};
use crate::models::application::ApplicationRow;
use crate::models::final_snapshot::FinalRow;
use crate::models::selection::PromptSelectionRow;
use crate::models::video::VideoRow;
use crate::selection::current_selection;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub user_id: Uuid,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicationOverviewResponse {
    pub application: ApplicationRow,
    pub current_final: Option<FinalRow>,
    pub current_selection: Option<PromptSelectionRow>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub coverletter_status: String,
    pub pitch_status: String,
}

#[derive(Debug, Serialize)]
pub struct CvUploadResponse {
    pub cv_key: String,
}

/// POST /api/v1/applications
///
/// Creates an application with both artifact statuses `pending` and seeds its
/// empty Final.
pub async fn handle_create_application(
    State(state): State<AppState>,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    if req.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let mut tx = state.db.begin().await?;

    let application = sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications (id, user_id, job_description)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.user_id)
    .bind(req.job_description.trim())
    .fetch_one(&mut *tx)
    .await?;

    create_initial_final(&mut *tx, application.id).await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/v1/applications/:id
///
/// The overview: application row plus its current Final and active selection.
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationOverviewResponse>, AppError> {
    let application = load_application(&state.db, id).await?;
    let current_final = current_final(&state.db, id).await?;
    let current_selection = current_selection(&state.db, id).await?;

    Ok(Json(ApplicationOverviewResponse {
        application,
        current_final,
        current_selection,
    }))
}

/// DELETE /api/v1/applications/:id
///
/// Deletes the application and everything hanging off it, in one transaction.
pub async fn handle_delete_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    load_application(&state.db, id).await?;

    let mut tx = state.db.begin().await?;
    for table in ["finals", "prompt_selections", "videos"] {
        let sql = format!("DELETE FROM {table} WHERE application_id = $1");
        sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
    }
    sqlx::query("DELETE FROM applications WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/applications/:id/status
///
/// Read-only polling endpoint; serves the latest committed statuses. Clients
/// poll while either value is `processing` and stop once both are terminal
/// (`done` or `error: ...`).
pub async fn handle_get_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let application = load_application(&state.db, id).await?;
    Ok(Json(StatusResponse {
        coverletter_status: application.coverletter_status().as_db_value(),
        pitch_status: application.pitch_status().as_db_value(),
    }))
}

/// PUT /api/v1/applications/:id/cv
///
/// Multipart upload of the CV PDF; stores it in S3 and records the key.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<CvUploadResponse>, AppError> {
    load_application(&state.db, id).await?;

    let (data, _) = read_upload_field(multipart, "cv").await?;
    let cv_key = cv::store_pdf(&state.s3, &state.config.s3_bucket, id, data).await?;

    sqlx::query("UPDATE applications SET cv_key = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(&cv_key)
        .execute(&state.db)
        .await?;

    Ok(Json(CvUploadResponse { cv_key }))
}

/// POST /api/v1/applications/:id/video
///
/// Multipart upload of a recorded pitch video (storage collaborator only).
pub async fn handle_upload_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<VideoRow>), AppError> {
    load_application(&state.db, id).await?;

    let (data, content_type) = read_upload_field(multipart, "video").await?;
    let content_type = content_type.unwrap_or_else(|| "video/webm".to_string());
    let s3_key = cv::store_video(&state.s3, &state.config.s3_bucket, id, data, &content_type).await?;

    let row = sqlx::query_as::<_, VideoRow>(
        r#"
        INSERT INTO videos (id, application_id, s3_key, content_type)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(id)
    .bind(&s3_key)
    .bind(&content_type)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// Pulls the named field (or the first file field) out of a multipart body.
async fn read_upload_field(
    mut multipart: Multipart,
    expected_name: &str,
) -> Result<(bytes::Bytes, Option<String>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let matches_name = field.name().map(|n| n == expected_name).unwrap_or(false);
        let is_file = field.file_name().is_some();
        if matches_name || is_file {
            let content_type = field.content_type().map(|ct| ct.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
            if data.is_empty() {
                return Err(AppError::Validation("Uploaded file is empty".to_string()));
            }
            return Ok((data, content_type));
        }
    }
    Err(AppError::Validation(format!(
        "Multipart field '{expected_name}' is missing"
    )))
}
