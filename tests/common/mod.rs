#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tsoft_devtools::evaluator::{Evaluation, Evaluator};
use tsoft_devtools::inspector::PanelSnapshot;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Clone)]
struct Reply {
    evaluation: Evaluation,
    delay: Duration,
}

#[derive(Default)]
struct Inner {
    queued: HashMap<String, VecDeque<Reply>>,
    defaults: HashMap<String, Reply>,
    calls: HashMap<String, usize>,
}

/// A scripted page. Unknown scripts throw.
#[derive(Clone, Default)]
pub struct FakePage {
    inner: Arc<Mutex<Inner>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to every call of `script`.
    pub fn answer(&self, script: &str, evaluation: Evaluation) {
        self.answer_after(script, Duration::ZERO, evaluation);
    }

    pub fn answer_after(&self, script: &str, delay: Duration, evaluation: Evaluation) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .defaults
            .insert(script.to_string(), Reply { evaluation, delay });
    }

    /// Reply once, ahead of the standing answer.
    pub fn queue(&self, script: &str, evaluation: Evaluation) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .queued
            .entry(script.to_string())
            .or_default()
            .push_back(Reply {
                evaluation,
                delay: Duration::ZERO,
            });
    }

    pub fn calls(&self, script: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.calls.get(script).copied().unwrap_or(0)
    }
}

impl Evaluator for FakePage {
    async fn evaluate(&self, script: &str) -> Evaluation {
        let reply = {
            let mut inner = self.inner.lock().unwrap();
            *inner.calls.entry(script.to_string()).or_default() += 1;
            let queued = inner.queued.get_mut(script).and_then(VecDeque::pop_front);
            queued
                .or_else(|| inner.defaults.get(script).cloned())
                .unwrap_or(Reply {
                    evaluation: Evaluation::exception(),
                    delay: Duration::ZERO,
                })
        };
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.evaluation
    }
}

pub fn ok(payload: &str) -> Evaluation {
    Evaluation::value(format!(r#"{{"status":"ok","payload":{payload}}}"#))
}

pub fn missing() -> Evaluation {
    Evaluation::value(r#"{"status":"missing"}"#)
}

pub fn page_error(message: &str) -> Evaluation {
    Evaluation::value(format!(r#"{{"status":"error","message":"{message}"}}"#))
}

pub fn enabled() -> Evaluation {
    Evaluation::value(r#"{"status":"enabled"}"#)
}

pub fn disabled() -> Evaluation {
    Evaluation::value(r#"{"status":"disabled"}"#)
}

/// Wait, on virtual time, for a snapshot satisfying `what`.
pub async fn wait_for(
    snapshots: &mut watch::Receiver<PanelSnapshot>,
    what: impl FnMut(&PanelSnapshot) -> bool,
) -> PanelSnapshot {
    tokio::time::timeout(Duration::from_secs(120), snapshots.wait_for(what))
        .await
        .expect("timed out waiting for snapshot")
        .expect("inspector stopped")
        .clone()
}
