//! Generation Job Runner — executes content generation off the request path
//! and persists the outcome onto the application row.
//!
//! Substrate: an unbounded tokio channel drained by a small worker pool.
//! Jobs are keyed by (application_id, prompt); re-running the same job only
//! overwrites the draft fields, so delivery is safely at-least-once and
//! last-write-wins. Workers share no mutable state — all coordination goes
//! through the database rows.
//!
//! Failure policy: each job gets a bounded number of attempts with
//! exponential backoff; after the budget is exhausted the artifact status is
//! set to `error: <reason>` so the record is never left stuck in
//! `processing`.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::cv;
use crate::generation::service::{ContentGenerator, GenerationContext, GenerationError};
use crate::models::application::{ApplicationRow, ArtifactStatus};

/// Attempts per job before the failure is terminal.
const MAX_ATTEMPTS: u32 = 3;

/// The two generated artifacts. Each runs as its own independent job; neither
/// blocks or observes the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    CoverLetter,
    Pitch,
}

impl Artifact {
    pub fn label(&self) -> &'static str {
        match self {
            Artifact::CoverLetter => "cover letter",
            Artifact::Pitch => "pitch",
        }
    }

    fn text_column(&self) -> &'static str {
        match self {
            Artifact::CoverLetter => "coverletter_text",
            Artifact::Pitch => "pitch_text",
        }
    }

    fn status_column(&self) -> &'static str {
        match self {
            Artifact::CoverLetter => "coverletter_status",
            Artifact::Pitch => "pitch_status",
        }
    }
}

/// One unit of background work, keyed by (application_id, prompt).
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub artifact: Artifact,
    pub application_id: Uuid,
    pub prompt: String,
}

/// Shared dependencies handed to every worker.
pub struct JobContext {
    pub db: PgPool,
    pub s3: aws_sdk_s3::Client,
    pub s3_bucket: String,
    pub generator: Arc<dyn ContentGenerator>,
}

/// Cloneable enqueue handle carried in `AppState`.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<GenerationJob>,
}

impl JobQueue {
    /// Spawns `workers` background tasks draining a shared queue and returns
    /// the enqueue handle.
    pub fn start(workers: usize, ctx: JobContext) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<GenerationJob>();
        let rx = Arc::new(Mutex::new(rx));
        let ctx = Arc::new(ctx);

        for worker_id in 0..workers {
            let rx = Arc::clone(&rx);
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move {
                worker_loop(worker_id, rx, ctx).await;
            });
        }

        info!("Started {workers} generation workers");
        JobQueue { tx }
    }

    /// Enqueues a job. Never blocks the request path.
    pub fn enqueue(&self, job: GenerationJob) {
        info!(
            "Enqueueing {} job for application {}",
            job.artifact.label(),
            job.application_id
        );
        if self.tx.send(job).is_err() {
            // Only possible during shutdown, once all workers are gone.
            error!("Job queue is closed; dropping generation job");
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<GenerationJob>>>,
    ctx: Arc<JobContext>,
) {
    loop {
        let job = {
            let mut guard = rx.lock().await;
            guard.recv().await
        };
        let Some(job) = job else {
            info!("Worker {worker_id} shutting down: queue closed");
            return;
        };

        if let Err(e) = run_job(&ctx, &job).await {
            // Infrastructure failure (DB unreachable etc.) — the status row
            // could not be updated either, so all we can do is log.
            error!(
                "Worker {worker_id}: {} job for application {} failed outside generation: {e}",
                job.artifact.label(),
                job.application_id
            );
        }
    }
}

/// Executes one job end to end: load the application, gather CV context, run
/// the generator with retries, persist the outcome.
async fn run_job(ctx: &JobContext, job: &GenerationJob) -> Result<(), sqlx::Error> {
    let application = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
        .bind(job.application_id)
        .fetch_optional(&ctx.db)
        .await?;

    let Some(application) = application else {
        // Deleted while queued; nothing to write back to.
        warn!(
            "Application {} vanished before its {} job ran",
            job.application_id,
            job.artifact.label()
        );
        return Ok(());
    };

    let cv_text = cv::extract_text(
        &ctx.s3,
        &ctx.s3_bucket,
        application.cv_key.as_deref(),
    )
    .await;

    let generation_ctx = GenerationContext {
        job_description: application.job_description.clone(),
        cv_text,
    };

    match generate_with_retries(ctx.generator.as_ref(), &job.prompt, &generation_ctx).await {
        Ok(content) => {
            persist_success(&ctx.db, job, &content).await?;
            info!(
                "{} generated for application {} ({} chars)",
                job.artifact.label(),
                job.application_id,
                content.len()
            );
        }
        Err(e) => {
            persist_failure(&ctx.db, job, &e.to_string()).await?;
            warn!(
                "{} generation failed terminally for application {}: {e}",
                job.artifact.label(),
                job.application_id
            );
        }
    }
    Ok(())
}

/// Runs the generator with the bounded retry budget: up to `MAX_ATTEMPTS`
/// attempts, exponential backoff between them (1s, 2s).
pub(crate) async fn generate_with_retries(
    generator: &dyn ContentGenerator,
    prompt: &str,
    ctx: &GenerationContext,
) -> Result<String, GenerationError> {
    let mut last_error = GenerationError::EmptyContent;

    for attempt in 1..=MAX_ATTEMPTS {
        if attempt > 1 {
            tokio::time::sleep(backoff_delay(attempt)).await;
        }
        match generator.generate(prompt, ctx).await {
            Ok(content) => return Ok(content),
            Err(e) => {
                warn!("Generation attempt {attempt}/{MAX_ATTEMPTS} failed: {e}");
                last_error = e;
            }
        }
    }
    Err(last_error)
}

/// Backoff before attempt N (2-based): 1s, 2s, 4s, ...
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000 * (1 << (attempt - 2)))
}

async fn persist_success(
    pool: &PgPool,
    job: &GenerationJob,
    content: &str,
) -> Result<(), sqlx::Error> {
    let sql = format!(
        "UPDATE applications SET {text} = $2, {status} = $3, updated_at = now() WHERE id = $1",
        text = job.artifact.text_column(),
        status = job.artifact.status_column(),
    );
    sqlx::query(&sql)
        .bind(job.application_id)
        .bind(content)
        .bind(ArtifactStatus::Done.as_db_value())
        .execute(pool)
        .await?;
    Ok(())
}

async fn persist_failure(
    pool: &PgPool,
    job: &GenerationJob,
    reason: &str,
) -> Result<(), sqlx::Error> {
    // Status carries the error; any previously generated text is left intact.
    let sql = format!(
        "UPDATE applications SET {status} = $2, updated_at = now() WHERE id = $1",
        status = job.artifact.status_column(),
    );
    sqlx::query(&sql)
        .bind(job.application_id)
        .bind(ArtifactStatus::Failed(reason.to_string()).as_db_value())
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails `failures` times, then succeeds.
    struct FlakyGenerator {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ContentGenerator for FlakyGenerator {
        async fn generate(
            &self,
            _prompt: &str,
            _ctx: &GenerationContext,
        ) -> Result<String, GenerationError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(GenerationError::Collaborator("timed out".to_string()))
            } else {
                Ok("Dear Hiring Team,".to_string())
            }
        }
    }

    fn test_ctx() -> GenerationContext {
        GenerationContext {
            job_description: "We need a Rust engineer.".to_string(),
            cv_text: String::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_succeeds() {
        let generator = FlakyGenerator {
            failures: 2,
            calls: AtomicU32::new(0),
        };
        let result = generate_with_retries(&generator, "prompt", &test_ctx()).await;
        assert_eq!(result.unwrap(), "Dear Hiring Team,");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_budget_and_surfaces_error_status() {
        let generator = FlakyGenerator {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
        };
        let err = generate_with_retries(&generator, "prompt", &test_ctx())
            .await
            .unwrap_err();
        assert_eq!(generator.calls.load(Ordering::SeqCst), MAX_ATTEMPTS);

        // The persisted status string matches the /^error:/ contract.
        let status = ArtifactStatus::Failed(err.to_string());
        assert!(status.as_db_value().starts_with("error:"));
        assert!(status.as_db_value().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_skips_backoff() {
        let generator = FlakyGenerator {
            failures: 0,
            calls: AtomicU32::new(0),
        };
        let started = tokio::time::Instant::now();
        let result = generate_with_retries(&generator, "prompt", &test_ctx()).await;
        assert!(result.is_ok());
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_schedule() {
        assert_eq!(backoff_delay(2), Duration::from_millis(1000));
        assert_eq!(backoff_delay(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_artifact_columns_are_independent() {
        assert_ne!(
            Artifact::CoverLetter.text_column(),
            Artifact::Pitch.text_column()
        );
        assert_ne!(
            Artifact::CoverLetter.status_column(),
            Artifact::Pitch.status_column()
        );
    }
}
