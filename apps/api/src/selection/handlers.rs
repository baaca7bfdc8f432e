//! Axum handlers for saved selection profiles.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::selection::PromptSelectionRow;
use crate::selection::list_profiles;
use crate::state::AppState;

const PROFILE_LIST_LIMIT: i64 = 5;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub name: String,
    pub summary: String,
    pub is_default: bool,
    pub last_used_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Serialize)]
pub struct ProfileListResponse {
    pub profiles: Vec<ProfileSummary>,
}

/// GET /api/v1/selections?user_id=
///
/// The user's saved profiles, newest usage first.
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ProfileListResponse>, AppError> {
    let rows = list_profiles(&state.db, params.user_id, PROFILE_LIST_LIMIT).await?;
    Ok(Json(ProfileListResponse {
        profiles: rows.iter().map(summarize).collect(),
    }))
}

fn summarize(row: &PromptSelectionRow) -> ProfileSummary {
    ProfileSummary {
        id: row.id,
        name: row.display_name(),
        summary: row.summary(),
        is_default: row.is_default_profile,
        last_used_at: row.last_used_at,
    }
}
