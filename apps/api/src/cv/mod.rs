//! CV and video storage plus CV text extraction.
//!
//! Extraction is strictly best-effort: any failure (missing key, S3 error,
//! unparseable PDF) yields an empty string, which downstream means "no resume
//! context". It never fails a generation job.

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

/// Downloads the CV PDF from S3 and extracts its plain text.
pub async fn extract_text(s3: &S3Client, bucket: &str, cv_key: Option<&str>) -> String {
    let Some(key) = cv_key else {
        return String::new();
    };

    let object = match s3.get_object().bucket(bucket).key(key).send().await {
        Ok(o) => o,
        Err(e) => {
            warn!("Could not fetch CV {key} from S3, continuing without resume context: {e}");
            return String::new();
        }
    };

    let bytes = match object.body.collect().await {
        Ok(data) => data.into_bytes(),
        Err(e) => {
            warn!("Could not read CV {key} body, continuing without resume context: {e}");
            return String::new();
        }
    };

    // pdf-extract is CPU-bound; keep it off the async runtime threads.
    let parsed = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await;

    match parsed {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("CV PDF parse failed, continuing without resume context: {e}");
            String::new()
        }
        Err(e) => {
            warn!("CV extraction task panicked, continuing without resume context: {e}");
            String::new()
        }
    }
}

/// Uploads a CV PDF for an application. Returns the S3 key.
pub async fn store_pdf(
    s3: &S3Client,
    bucket: &str,
    application_id: Uuid,
    data: Bytes,
) -> Result<String, AppError> {
    let key = format!("cvs/{application_id}.pdf");
    put_object(s3, bucket, &key, data, "application/pdf").await?;
    Ok(key)
}

/// Uploads a recorded pitch video for an application. Returns the S3 key.
pub async fn store_video(
    s3: &S3Client,
    bucket: &str,
    application_id: Uuid,
    data: Bytes,
    content_type: &str,
) -> Result<String, AppError> {
    let key = format!("videos/{}/{}.webm", application_id, Uuid::new_v4());
    put_object(s3, bucket, &key, data, content_type).await?;
    Ok(key)
}

async fn put_object(
    s3: &S3Client,
    bucket: &str,
    key: &str,
    data: Bytes,
    content_type: &str,
) -> Result<(), AppError> {
    let size = data.len();
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(data))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload of {key} failed: {e}")))?;

    info!("Uploaded s3://{bucket}/{key} ({size} bytes)");
    Ok(())
}
