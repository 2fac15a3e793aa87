mod common;

use std::time::Duration;

use common::{FakePage, disabled, enabled, missing, ok, page_error};
use pretty_assertions::assert_eq;
use tsoft_devtools::JsonValue;
use tsoft_devtools::error::{DecodeError, TransportFailure};
use tsoft_devtools::evaluator::Evaluation;
use tsoft_devtools::fetcher::{EvaluationOutcome, RetryPolicy};
use tsoft_devtools::gate::{self, GateVerdict};
use tsoft_devtools::scripts;

const SCRIPT: &str = scripts::GLOBAL_VARS;

#[tokio::test(start_paused = true)]
async fn failing_transport_is_called_max_retry_plus_one_times() {
    let page = FakePage::new();
    let policy = RetryPolicy::default();

    let started = tokio::time::Instant::now();
    let outcome = policy.fetch(&page, SCRIPT).await;

    assert_eq!(
        outcome,
        EvaluationOutcome::TransportFailure(TransportFailure::Exhausted { attempts: 6 })
    );
    assert_eq!(page.calls(SCRIPT), 6);
    // Five waits between six attempts.
    assert!(started.elapsed() >= Duration::from_millis(2500));
}

#[tokio::test(start_paused = true)]
async fn empty_results_are_retried_until_an_envelope_arrives() {
    let page = FakePage::new();
    page.queue(SCRIPT, Evaluation::empty());
    page.queue(SCRIPT, Evaluation::exception());
    page.answer(SCRIPT, ok("[1,2,3]"));

    let outcome = RetryPolicy::default().fetch(&page, SCRIPT).await;

    assert_eq!(outcome, EvaluationOutcome::Ok(JsonValue::parse("[1,2,3]").unwrap()));
    assert_eq!(page.calls(SCRIPT), 3);
}

#[tokio::test(start_paused = true)]
async fn semantic_outcomes_are_accepted_on_first_attempt() {
    let policy = RetryPolicy::default();

    let page = FakePage::new();
    page.answer(SCRIPT, missing());
    assert_eq!(policy.fetch(&page, SCRIPT).await, EvaluationOutcome::Missing);
    assert_eq!(page.calls(SCRIPT), 1);

    let page = FakePage::new();
    page.answer(SCRIPT, page_error("TSOFT_GLOBAL_VARS is broken"));
    assert_eq!(
        policy.fetch(&page, SCRIPT).await,
        EvaluationOutcome::Error("TSOFT_GLOBAL_VARS is broken".into())
    );
    assert_eq!(page.calls(SCRIPT), 1);
}

#[tokio::test(start_paused = true)]
async fn undecodable_result_is_terminal() {
    let page = FakePage::new();
    page.answer(SCRIPT, Evaluation::value("<html>not an envelope</html>"));

    let outcome = RetryPolicy::default().fetch(&page, SCRIPT).await;

    assert!(matches!(
        outcome,
        EvaluationOutcome::TransportFailure(TransportFailure::Undecodable(DecodeError::Json(_)))
    ));
    assert_eq!(page.calls(SCRIPT), 1);
}

#[tokio::test(start_paused = true)]
async fn custom_policy_bounds_attempts() {
    let page = FakePage::new();
    let policy = RetryPolicy {
        max_retry: 2,
        delay: Duration::from_millis(10),
    };
    let raw = policy.fetch_raw(&page, SCRIPT).await;
    assert_eq!(raw, Err(TransportFailure::Exhausted { attempts: 3 }));
    assert_eq!(page.calls(SCRIPT), 3);
}

#[tokio::test(start_paused = true)]
async fn gate_verdicts_from_the_page() {
    let policy = RetryPolicy::default();
    let verdict_for = |reply: Evaluation| {
        let page = FakePage::new();
        page.answer(scripts::DEBUG_MODE, reply);
        page
    };

    assert_eq!(gate::verify(&verdict_for(enabled()), &policy).await, GateVerdict::Enabled);
    assert_eq!(gate::verify(&verdict_for(disabled()), &policy).await, GateVerdict::Disabled);
    assert_eq!(gate::verify(&verdict_for(missing()), &policy).await, GateVerdict::Missing);

    // A page that never answers closes the gate after the retry bound.
    let silent = FakePage::new();
    let verdict = gate::verify(&silent, &policy).await;
    assert!(!verdict.is_enabled());
    assert_eq!(silent.calls(scripts::DEBUG_MODE), 6);
}
