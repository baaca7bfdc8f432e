//! Finalization Store — manages the Final snapshot and its
//! single-current-record invariant.
//!
//! The invariant ("at most one Final per application with is_current = true")
//! is enforced inside one transaction on every save that sets the flag:
//! clear the flag on all siblings, then mark the target. Concurrent finalize
//! calls serialize on the row locks, so two records can never both end up
//! current.

pub mod handlers;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::final_snapshot::{word_count, FinalRow};

/// The two independently-editable fields on a Final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalField {
    CoverLetter,
    Pitch,
}

impl FinalField {
    fn column(&self) -> &'static str {
        match self {
            FinalField::CoverLetter => "coverletter_content",
            FinalField::Pitch => "pitch_content",
        }
    }

    fn word_count_column(&self) -> &'static str {
        match self {
            FinalField::CoverLetter => "coverletter_word_count",
            FinalField::Pitch => "pitch_word_count",
        }
    }

    fn version_column(&self) -> &'static str {
        match self {
            FinalField::CoverLetter => "coverletter_version",
            FinalField::Pitch => "pitch_version",
        }
    }
}

/// Creates the initial empty Final for a freshly created application.
pub async fn create_initial_final(
    executor: impl sqlx::PgExecutor<'_>,
    application_id: Uuid,
) -> Result<FinalRow, AppError> {
    Ok(sqlx::query_as::<_, FinalRow>(
        "INSERT INTO finals (id, application_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(application_id)
    .fetch_one(executor)
    .await?)
}

/// The newest Final for an application, if any.
pub async fn current_final(
    pool: &PgPool,
    application_id: Uuid,
) -> Result<Option<FinalRow>, AppError> {
    Ok(sqlx::query_as::<_, FinalRow>(
        r#"
        SELECT * FROM finals
        WHERE application_id = $1
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(application_id)
    .fetch_optional(pool)
    .await?)
}

/// Upserts `text` onto one field of the newest Final for the application,
/// recomputing that field's word count and bumping its version counter.
/// Creates the Final lazily if none exists yet.
pub async fn update_field(
    pool: &PgPool,
    application_id: Uuid,
    field: FinalField,
    text: &str,
) -> Result<FinalRow, AppError> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, FinalRow>(
        r#"
        SELECT * FROM finals
        WHERE application_id = $1
        ORDER BY created_at DESC
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(application_id)
    .fetch_optional(&mut *tx)
    .await?;

    let final_id = match existing {
        Some(row) => row.id,
        None => create_initial_final(&mut *tx, application_id).await?.id,
    };

    let sql = format!(
        "UPDATE finals
         SET {col} = $2, {wc} = $3, {ver} = {ver} + 1, updated_at = now()
         WHERE id = $1
         RETURNING *",
        col = field.column(),
        wc = field.word_count_column(),
        ver = field.version_column(),
    );

    let row = sqlx::query_as::<_, FinalRow>(&sql)
        .bind(final_id)
        .bind(text)
        .bind(word_count(text))
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(row)
}

/// Blanks one field on the newest Final. Regeneration hook: a freshly
/// regenerated draft must never sit beside stale finalized content for the
/// same artifact. No-op when no Final exists.
pub async fn clear_field(
    pool: &PgPool,
    application_id: Uuid,
    field: FinalField,
) -> Result<(), AppError> {
    let sql = format!(
        "UPDATE finals
         SET {col} = NULL, {wc} = 0, updated_at = now()
         WHERE id = (
             SELECT id FROM finals
             WHERE application_id = $1
             ORDER BY created_at DESC
             LIMIT 1
         )",
        col = field.column(),
        wc = field.word_count_column(),
    );

    sqlx::query(&sql).bind(application_id).execute(pool).await?;
    Ok(())
}

/// Finalizes a Final: stamps `finalized_at` and the finalizing user, and
/// asserts `is_current = true` while clearing the flag on every sibling, all
/// in one transaction.
///
/// Precondition: `content_ready()` must hold. Calling finalize on an
/// incomplete Final is a caller bug and fails with 422 rather than
/// persisting a partial snapshot.
pub async fn finalize(
    pool: &PgPool,
    final_id: Uuid,
    finalized_by: Option<Uuid>,
) -> Result<FinalRow, AppError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, FinalRow>("SELECT * FROM finals WHERE id = $1 FOR UPDATE")
        .bind(final_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Final {final_id} not found")))?;

    if !row.content_ready() {
        return Err(AppError::UnprocessableEntity(
            "Cannot finalize: both cover letter and pitch must be present".to_string(),
        ));
    }

    sqlx::query(
        "UPDATE finals SET is_current = FALSE, updated_at = now()
         WHERE application_id = $1 AND id <> $2 AND is_current",
    )
    .bind(row.application_id)
    .bind(final_id)
    .execute(&mut *tx)
    .await?;

    let finalized = sqlx::query_as::<_, FinalRow>(
        "UPDATE finals
         SET finalized_at = now(), finalized_by_user_id = $2, is_current = TRUE, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(final_id)
    .bind(finalized_by)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Finalized {} for application {} (cover letter {} words, pitch {} words)",
        finalized.id,
        finalized.application_id,
        finalized.coverletter_word_count,
        finalized.pitch_word_count
    );
    Ok(finalized)
}
