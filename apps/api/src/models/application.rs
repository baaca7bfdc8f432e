#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-artifact generation status.
///
/// Statuses live in TEXT columns (`coverletter_status`, `pitch_status`) so the
/// polling endpoint can serve them verbatim. The wire/DB encoding is
/// `pending`, `processing`, `done`, or `error: <reason>` — clients match
/// failures on the `error:` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    Pending,
    Processing,
    Done,
    Failed(String),
}

impl ArtifactStatus {
    /// Decodes a status column. Total: anything unrecognized is treated as a
    /// failure rather than guessing a healthy state.
    pub fn from_db(value: &str) -> Self {
        match value {
            "pending" => ArtifactStatus::Pending,
            "processing" => ArtifactStatus::Processing,
            "done" => ArtifactStatus::Done,
            other => match other.strip_prefix("error:") {
                Some(reason) => ArtifactStatus::Failed(reason.trim().to_string()),
                None => ArtifactStatus::Failed(format!("unrecognized status '{other}'")),
            },
        }
    }

    /// The DB/wire encoding of this status.
    pub fn as_db_value(&self) -> String {
        match self {
            ArtifactStatus::Pending => "pending".to_string(),
            ArtifactStatus::Processing => "processing".to_string(),
            ArtifactStatus::Done => "done".to_string(),
            ArtifactStatus::Failed(reason) => format!("error: {reason}"),
        }
    }

    /// Terminal states stop the client-side poller.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ArtifactStatus::Done | ArtifactStatus::Failed(_))
    }
}

impl std::fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_db_value())
    }
}

/// One job-application attempt: the job description, the uploaded CV, the
/// latest generated drafts and their statuses, and the best-effort
/// AI-extracted company/title used for display.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_description: String,
    /// S3 key of the uploaded CV PDF, if any.
    pub cv_key: Option<String>,
    pub coverletter_text: Option<String>,
    pub coverletter_status: String,
    pub pitch_text: Option<String>,
    pub pitch_status: String,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRow {
    pub fn coverletter_status(&self) -> ArtifactStatus {
        ArtifactStatus::from_db(&self.coverletter_status)
    }

    pub fn pitch_status(&self) -> ArtifactStatus {
        ArtifactStatus::from_db(&self.pitch_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_db_round_trip() {
        for status in [
            ArtifactStatus::Pending,
            ArtifactStatus::Processing,
            ArtifactStatus::Done,
            ArtifactStatus::Failed("LLM timed out".to_string()),
        ] {
            assert_eq!(ArtifactStatus::from_db(&status.as_db_value()), status);
        }
    }

    #[test]
    fn test_failed_status_keeps_error_prefix() {
        let status = ArtifactStatus::Failed("rate limited".to_string());
        assert!(status.as_db_value().starts_with("error:"));
        assert_eq!(status.to_string(), "error: rate limited");
    }

    #[test]
    fn test_unrecognized_status_decodes_as_failure() {
        let status = ArtifactStatus::from_db("in_flight");
        assert!(matches!(status, ArtifactStatus::Failed(_)));
        assert!(status.is_terminal());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ArtifactStatus::Pending.is_terminal());
        assert!(!ArtifactStatus::Processing.is_terminal());
        assert!(ArtifactStatus::Done.is_terminal());
        assert!(ArtifactStatus::Failed("x".to_string()).is_terminal());
    }
}
