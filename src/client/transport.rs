//! Retrying request execution.
//!
//! One logical request is raced by `concurrency` attempt chains. Each chain
//! retries on transport errors and on 5xx/429 responses, sleeping between
//! attempts according to the [`RetryPolicy`]. The first chain to get any
//! other response wins and the rest are dropped.

use std::time::Instant;

use chrono::Utc;
use futures_util::future::select_ok;
use reqwest::{Client, Request, Response, StatusCode};

use crate::error::ConvertError;
use crate::retry::{AttemptLog, AttemptRecord, RetryPolicy};

/// Statuses worth another attempt.
fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Execute `request` under `policy` and return the full response body.
///
/// # Errors
///
/// - [`ConvertError::RequestBuild`] if the request body cannot be replayed
/// - [`ConvertError::Transport`] once every chain has used its attempts
/// - [`ConvertError::ResponseRead`] if the winning body cannot be read
pub(crate) async fn execute(
    http: &Client,
    request: &Request,
    policy: &RetryPolicy,
    log: &AttemptLog,
) -> Result<Vec<u8>, ConvertError> {
    if request.try_clone().is_none() {
        return Err(ConvertError::RequestBuild {
            message: "request body cannot be replayed for retries".to_string(),
        });
    }

    let chains = (0..policy.concurrency.max(1))
        .map(|chain| Box::pin(run_chain(http, request, policy, log, chain)));

    let (response, _) = select_ok(chains).await.inspect_err(|e| {
        tracing::error!(
            url = %request.url(),
            error = %e,
            "Conversion request failed after exhausting retries"
        );
    })?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| ConvertError::ResponseRead {
            message: e.to_string(),
        })?;

    tracing::debug!(
        url = %request.url(),
        status = %status,
        bytes = body.len(),
        "Conversion response read"
    );

    Ok(body.to_vec())
}

/// One sequential series of attempts.
async fn run_chain(
    http: &Client,
    request: &Request,
    policy: &RetryPolicy,
    log: &AttemptLog,
    chain: u32,
) -> Result<Response, ConvertError> {
    let mut last_error = String::from("no attempt made");
    let mut attempts = 0;

    for attempt in 1..=policy.max_attempts {
        if attempt > 1 {
            let delay = policy.delay_for_retry(attempt - 1);
            tracing::warn!(
                chain,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Retrying conversion request"
            );
            tokio::time::sleep(delay).await;
        }

        let Some(physical) = request.try_clone() else {
            break;
        };
        attempts = attempt;
        let start = Instant::now();

        tracing::debug!(
            url = %request.url(),
            chain,
            attempt,
            "Starting conversion request"
        );

        match http.execute(physical).await {
            Ok(response) if is_retryable_status(response.status()) => {
                last_error = format!("HTTP {}", response.status());
                tracing::warn!(
                    chain,
                    attempt,
                    status = %response.status(),
                    elapsed_ms = elapsed_ms(start),
                    "Retryable status from conversion service"
                );
            }
            Ok(response) => {
                tracing::debug!(
                    chain,
                    attempt,
                    status = %response.status(),
                    elapsed_ms = elapsed_ms(start),
                    "Conversion response received"
                );
                return Ok(response);
            }
            Err(e) => {
                last_error = if e.is_timeout() {
                    format!("request timed out: {e}")
                } else {
                    e.to_string()
                };
                tracing::warn!(
                    chain,
                    attempt,
                    error = %e,
                    elapsed_ms = elapsed_ms(start),
                    "Conversion request failed"
                );
            }
        }

        if policy.keep_log {
            log.push(AttemptRecord {
                at: Utc::now(),
                method: request.method().to_string(),
                url: request.url().to_string(),
                chain,
                attempt,
                error: last_error.clone(),
            });
        }
    }

    Err(ConvertError::Transport {
        attempts,
        message: last_error,
    })
}
