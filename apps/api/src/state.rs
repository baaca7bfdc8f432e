use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::generation::service::ContentGenerator;
use crate::jobs::JobQueue;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub llm: LlmClient,
    /// Pluggable content generator; production uses `LlmContentGenerator`,
    /// tests swap in stubs.
    pub generator: Arc<dyn ContentGenerator>,
    /// Enqueue handle for the background generation workers.
    pub jobs: JobQueue,
    pub config: Config,
}
