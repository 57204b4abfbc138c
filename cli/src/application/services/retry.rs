//! Retry-with-ceiling primitive and the HTTP probes built on it.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::future::Future;

use crate::application::ports::{HttpProbe, HttpResponse, ProgressReporter};
use crate::domain::{ProbeError, RetryPolicy};

/// Result of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// Stop retrying with this value.
    Done(T),
    /// Not ready yet; the reason is kept for the exhaustion error.
    Retry(String),
    /// Stop retrying and fail with this error.
    Abort(ProbeError),
}

/// Call `attempt` until it returns [`Attempt::Done`], at most
/// `policy.total_calls()` times, sleeping `policy.interval` before each retry.
///
/// # Errors
///
/// Returns [`ProbeError::Exhausted`] carrying the last retry reason once the
/// budget is spent, or the error of the first [`Attempt::Abort`].
pub async fn retry<T, F, Fut>(
    policy: RetryPolicy,
    reporter: &impl ProgressReporter,
    label: &str,
    mut attempt: F,
) -> Result<T, ProbeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let mut last = String::from("no attempt made");
    for call in 0..policy.total_calls() {
        if call > 0 {
            reporter.step(&format!("{label} ({call}/{})...", policy.attempts));
            tokio::time::sleep(policy.interval).await;
        }
        match attempt().await {
            Attempt::Done(value) => return Ok(value),
            Attempt::Abort(err) => return Err(err),
            Attempt::Retry(reason) => {
                tracing::debug!(label, call, %reason, "attempt not ready");
                last = reason;
            }
        }
    }
    Err(ProbeError::Exhausted {
        label: label.to_owned(),
        attempts: policy.total_calls(),
        last,
    })
}

/// GET `url`, retrying only while no response is received. Any status code
/// ends the loop; callers assert on it.
///
/// # Errors
///
/// Returns [`ProbeError::Exhausted`] if every attempt failed to connect, or
/// [`ProbeError::UnreadableBody`] as soon as a response body is lost.
pub async fn probe_until_connected(
    http: &impl HttpProbe,
    policy: RetryPolicy,
    reporter: &impl ProgressReporter,
    label: &str,
    url: &str,
) -> Result<HttpResponse, ProbeError> {
    retry(policy, reporter, label, move || async move {
        match http.get(url).await {
            Ok(response) => Attempt::Done(response),
            Err(e) => unanswered(e),
        }
    })
    .await
}

/// GET `url` until it returns exactly `status` with body `body`. Surrounding
/// whitespace in the response body is ignored.
///
/// # Errors
///
/// Returns [`ProbeError::Exhausted`] with the last observed response once
/// the budget is spent, or [`ProbeError::UnreadableBody`] as soon as a
/// response body is lost.
pub async fn probe_until_matches(
    http: &impl HttpProbe,
    policy: RetryPolicy,
    reporter: &impl ProgressReporter,
    url: &str,
    status: u16,
    body: &str,
) -> Result<HttpResponse, ProbeError> {
    let label = format!("waiting for {url}");
    retry(policy, reporter, &label, move || async move {
        match http.get(url).await {
            Ok(response) if response.status == status && response.body.trim() == body => {
                Attempt::Done(response)
            }
            Ok(response) => Attempt::Retry(format!(
                "status {} body {:?}",
                response.status, response.body
            )),
            Err(e) => unanswered(e),
        }
    })
    .await
}

/// A lost body is final; anything else means nothing answered yet.
fn unanswered<T>(err: anyhow::Error) -> Attempt<T> {
    match err.downcast::<ProbeError>() {
        Ok(fatal) => Attempt::Abort(fatal),
        Err(e) => Attempt::Retry(format!("{e:#}")),
    }
}
