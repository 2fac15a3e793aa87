//! Debug-mode gate: decides whether the page allows its variables to be read,
//! and debounces navigation signals into one re-check.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::JsonValue;
use crate::envelope::Envelope;
use crate::error::TransportFailure;
use crate::evaluator::Evaluator;
use crate::fetcher::RetryPolicy;
use crate::scripts;

/// How the flag check ended. Only `Enabled` opens the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateVerdict {
    Enabled,
    Disabled,
    Missing,
    PageError,
    Unreadable(TransportFailure),
}

impl GateVerdict {
    pub fn is_enabled(&self) -> bool {
        matches!(self, GateVerdict::Enabled)
    }

    pub fn from_raw(raw: Result<String, TransportFailure>) -> Self {
        let text = match raw {
            Ok(text) => text,
            Err(failure) => return GateVerdict::Unreadable(failure),
        };
        match Envelope::decode(&text) {
            Ok(Envelope::Enabled) => GateVerdict::Enabled,
            Ok(Envelope::Disabled) => GateVerdict::Disabled,
            Ok(Envelope::Ok(flag)) if flag_is_enabled(&flag) => GateVerdict::Enabled,
            Ok(Envelope::Ok(_)) => GateVerdict::Disabled,
            Ok(Envelope::Missing) => GateVerdict::Missing,
            Ok(Envelope::Error(_)) => GateVerdict::PageError,
            Err(e) => GateVerdict::Unreadable(e.into()),
        }
    }
}

/// `true`, `"true"`, `1`, `"1"` and `"on"` enable debug mode; anything else does not.
pub fn flag_is_enabled(flag: &JsonValue) -> bool {
    match flag {
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64() == 1.0,
        JsonValue::String(s) => matches!(s.as_str(), "true" | "1" | "on"),
        _ => false,
    }
}

/// Run the flag script under `policy`.
pub async fn verify<E: Evaluator>(evaluator: &E, policy: &RetryPolicy) -> GateVerdict {
    let verdict = GateVerdict::from_raw(policy.fetch_raw(evaluator, scripts::DEBUG_MODE).await);
    tracing::debug!(?verdict, "debug mode verified");
    verdict
}

/// Collapses bursts of calls into one delayed run.
///
/// Each `schedule` aborts the pending run, if any, and starts the delay over.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
