//! Tests for the retry-with-ceiling primitive and the HTTP probes.
//!
//! All tests run with tokio's clock paused, so sleeps advance virtual time
//! instantly and elapsed time can be asserted exactly.

#![allow(clippy::expect_used)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use lambda_api_verify::application::services::retry::{
    Attempt, probe_until_connected, probe_until_matches, retry,
};
use lambda_api_verify::domain::{ProbeError, RetryPolicy};

use crate::mocks::{Journal, RecordingReporter, ScriptedHttp, body_lost, refused, response};

const URL: &str = "https://ex-tf-lambda-api-default.example.org/status";

#[tokio::test(start_paused = true)]
async fn test_retry_returns_first_success_without_sleeping() {
    let reporter = RecordingReporter::default();
    let calls = AtomicU32::new(0);
    let started = tokio::time::Instant::now();

    let value = retry(RetryPolicy::STATUS_ENDPOINT, &reporter, "probe", || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Attempt::Done(7)
    })
    .await
    .expect("done");

    assert_eq!(value, 7);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert!(reporter.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_retry_makes_attempts_plus_one_calls_then_gives_up() {
    let reporter = RecordingReporter::default();
    let calls = AtomicU32::new(0);
    let started = tokio::time::Instant::now();

    let err = retry(RetryPolicy::LOCAL_CONTAINER, &reporter, "waiting", || async {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        Attempt::<()>::Retry(format!("refused #{n}"))
    })
    .await
    .expect_err("exhausted");

    assert_eq!(calls.load(Ordering::SeqCst), 11);
    assert_eq!(started.elapsed(), Duration::from_secs(10));
    assert_eq!(
        err,
        ProbeError::Exhausted {
            label: "waiting".into(),
            attempts: 11,
            last: "refused #10".into(),
        }
    );
    assert_eq!(reporter.messages().len(), 10);
    assert_eq!(reporter.messages()[0], "step: waiting (1/10)...");
}

#[tokio::test(start_paused = true)]
async fn test_retry_succeeds_on_last_allowed_call() {
    let reporter = RecordingReporter::default();
    let calls = AtomicU32::new(0);
    let policy = RetryPolicy::new(3, Duration::from_secs(2));

    let value = retry(policy, &reporter, "x", || async {
        if calls.fetch_add(1, Ordering::SeqCst) == 3 {
            Attempt::Done("up")
        } else {
            Attempt::Retry("down".into())
        }
    })
    .await
    .expect("done on fourth call");

    assert_eq!(value, "up");
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_zero_attempt_policy_calls_once() {
    let reporter = RecordingReporter::default();
    let calls = AtomicU32::new(0);

    let result = retry(RetryPolicy::new(0, Duration::from_secs(1)), &reporter, "x", || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Attempt::<()>::Retry("no".into())
    })
    .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ── probe_until_connected ────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_connected_probe_stops_at_first_response_whatever_the_status() {
    let http = ScriptedHttp::new(&Journal::default())
        .script(URL, vec![refused(), refused(), response(503, "starting")]);
    let reporter = RecordingReporter::default();

    let got = probe_until_connected(&http, RetryPolicy::IMAGE_ENDPOINT, &reporter, "api", URL)
        .await
        .expect("connected");

    assert_eq!(got.status, 503);
    assert_eq!(http.calls_to(URL), 3);
}

#[tokio::test(start_paused = true)]
async fn test_connected_probe_exhausts_on_refusal() {
    let http = ScriptedHttp::new(&Journal::default()).script(URL, vec![refused()]);
    let reporter = RecordingReporter::default();

    let err = probe_until_connected(&http, RetryPolicy::LOCAL_CONTAINER, &reporter, "container", URL)
        .await
        .expect_err("exhausted");

    assert_eq!(http.calls_to(URL), 11);
    assert!(matches!(err, ProbeError::Exhausted { attempts: 11, .. }));
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test(start_paused = true)]
async fn test_connected_stops_when_body_is_lost() {
    let http = ScriptedHttp::new(&Journal::default()).script(URL, vec![body_lost(), response(200, "ok")]);
    let reporter = RecordingReporter::default();

    let err = probe_until_connected(&http, RetryPolicy::IMAGE_ENDPOINT, &reporter, "api", URL)
        .await
        .expect_err("fatal");

    assert_eq!(http.calls_to(URL), 1);
    assert!(matches!(err, ProbeError::UnreadableBody { .. }), "{err:?}");
    assert!(reporter.messages().is_empty());
}

// ── probe_until_matches ──────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_matching_probe_retries_on_status_and_body() {
    let http = ScriptedHttp::new(&Journal::default()).script(
        URL,
        vec![
            refused(),
            response(503, ""),
            response(200, "starting"),
            response(200, "ok"),
        ],
    );
    let reporter = RecordingReporter::default();
    let started = tokio::time::Instant::now();

    let got = probe_until_matches(&http, RetryPolicy::STATUS_ENDPOINT, &reporter, URL, 200, "ok")
        .await
        .expect("matched");

    assert_eq!(got.body, "ok");
    assert_eq!(http.calls_to(URL), 4);
    assert_eq!(started.elapsed(), Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn test_matching_probe_reports_last_response_on_exhaustion() {
    let http = ScriptedHttp::new(&Journal::default()).script(URL, vec![response(502, "Bad Gateway")]);
    let reporter = RecordingReporter::default();

    let err = probe_until_matches(&http, RetryPolicy::STATUS_ENDPOINT, &reporter, URL, 200, "ok")
        .await
        .expect_err("exhausted");

    assert_eq!(http.calls_to(URL), 61);
    match err {
        ProbeError::Exhausted { last, attempts, .. } => {
            assert_eq!(attempts, 61);
            assert!(last.contains("502"), "{last}");
            assert!(last.contains("Bad Gateway"), "{last}");
        }
        other => panic!("expected Exhausted, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_matching_ignores_trailing_newline_in_body() {
    let http = ScriptedHttp::new(&Journal::default()).script(URL, vec![response(200, "ok\n")]);
    let reporter = RecordingReporter::default();

    let got = probe_until_matches(&http, RetryPolicy::STATUS_ENDPOINT, &reporter, URL, 200, "ok")
        .await
        .expect("matched");

    assert_eq!(got.body, "ok\n");
    assert_eq!(http.calls_to(URL), 1);
}

#[tokio::test(start_paused = true)]
async fn test_matching_fails_fast_when_body_is_lost() {
    let http = ScriptedHttp::new(&Journal::default())
        .script(URL, vec![response(503, ""), body_lost(), response(200, "ok")]);
    let reporter = RecordingReporter::default();
    let started = tokio::time::Instant::now();

    let err = probe_until_matches(&http, RetryPolicy::STATUS_ENDPOINT, &reporter, URL, 200, "ok")
        .await
        .expect_err("fatal");

    assert_eq!(http.calls_to(URL), 2);
    assert_eq!(started.elapsed(), Duration::from_secs(5));
    assert_eq!(
        err,
        ProbeError::UnreadableBody {
            url: URL.into(),
            reason: "connection closed before message completed".into(),
        }
    );
}
