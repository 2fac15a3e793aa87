//! Bounded retry around a single evaluation script.
//!
//! Only transport failures (the evaluator threw, or returned nothing) are retried.
//! A clean result is decoded exactly once: `missing` and `error` envelopes are
//! final answers from the page, and an undecodable result is a contract violation
//! that retrying will not fix.

use std::time::Duration;

use crate::JsonValue;
use crate::envelope::Envelope;
use crate::error::{DecodeError, TransportFailure};
use crate::evaluator::Evaluator;
use crate::statics;

/// Terminal outcome of one fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    Ok(JsonValue),
    Missing,
    Error(String),
    TransportFailure(TransportFailure),
}

impl From<Result<Envelope, DecodeError>> for EvaluationOutcome {
    fn from(decoded: Result<Envelope, DecodeError>) -> Self {
        match decoded {
            Ok(Envelope::Ok(payload)) => EvaluationOutcome::Ok(payload),
            Ok(Envelope::Missing) => EvaluationOutcome::Missing,
            Ok(Envelope::Error(message)) => EvaluationOutcome::Error(message),
            // A flag status where data was expected.
            Ok(Envelope::Enabled | Envelope::Disabled) => {
                EvaluationOutcome::TransportFailure(DecodeError::UnknownStatus.into())
            }
            Err(e) => EvaluationOutcome::TransportFailure(e.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; a fetch makes at most `max_retry + 1` calls.
    pub max_retry: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retry: statics::MAX_FETCH_RETRY,
            delay: statics::FETCH_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retry + 1
    }

    /// Run `script` until it yields a non-empty result or attempts run out.
    pub async fn fetch_raw<E: Evaluator>(
        &self,
        evaluator: &E,
        script: &str,
    ) -> Result<String, TransportFailure> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let evaluation = evaluator.evaluate(script).await;
            if !evaluation.is_transport_failure()
                && let Some(result) = evaluation.result
            {
                return Ok(result);
            }

            if attempt >= self.max_attempts() {
                tracing::warn!(attempts = attempt, "evaluation failed on every attempt");
                return Err(TransportFailure::Exhausted { attempts: attempt });
            }

            tracing::debug!(
                attempt,
                exception = evaluation.exception,
                delay_ms = self.delay.as_millis() as u64,
                "evaluation returned nothing usable, retrying"
            );
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Run `script` and decode its envelope.
    pub async fn fetch<E: Evaluator>(&self, evaluator: &E, script: &str) -> EvaluationOutcome {
        match self.fetch_raw(evaluator, script).await {
            Ok(text) => {
                let decoded = Envelope::decode(&text);
                if let Err(e) = &decoded {
                    tracing::warn!(error = %e, "page answered with an undecodable envelope");
                }
                decoded.into()
            }
            Err(failure) => EvaluationOutcome::TransportFailure(failure),
        }
    }
}
