//! Single-URL HTTP retrieval with retries.

use log::debug;
use tokio_retry::RetryIf;

use super::context::FetchContext;
use crate::error_handling::{get_retry_strategy, is_retriable, FetchError, InfoType};

/// GETs `url` and returns its body as text.
///
/// Transient failures (timeouts, connection errors, 5xx, 429) are retried
/// with exponential backoff up to `ctx.max_retries` times. Non-2xx statuses,
/// bodies over the byte ceiling and blank bodies are errors. Invalid UTF-8 is
/// replaced rather than rejected.
///
/// # Errors
///
/// Returns the [`FetchError`] of the last attempt.
pub async fn fetch_text(ctx: &FetchContext, url: &str) -> Result<String, FetchError> {
    let mut attempt = 0usize;
    RetryIf::spawn(
        get_retry_strategy(ctx.max_retries),
        || {
            attempt += 1;
            if attempt > 1 {
                debug!("Retrying {url} (attempt {attempt})");
                ctx.stats.increment_info(InfoType::HttpRetry);
            }
            fetch_once(ctx, url)
        },
        is_retriable,
    )
    .await
}

async fn fetch_once(ctx: &FetchContext, url: &str) -> Result<String, FetchError> {
    let mut response = ctx.client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let limit = ctx.max_body_bytes;
    if response
        .content_length()
        .is_some_and(|len| len > limit as u64)
    {
        return Err(FetchError::BodyTooLarge { limit });
    }

    // Content-Length is optional, so enforce the ceiling while streaming too
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(FetchError::BodyTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }

    let text = String::from_utf8_lossy(&body).into_owned();
    if text.trim().is_empty() {
        return Err(FetchError::EmptyBody);
    }
    debug!("Fetched {} bytes from {url}", body.len());
    Ok(text)
}
