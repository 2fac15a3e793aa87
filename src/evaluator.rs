//! The boundary to the inspected page: one script in, one `Evaluation` out.

use std::future::Future;

/// Result of running one script in the inspected page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// The string the script returned; `None` for any falsy result.
    pub result: Option<String>,
    /// The script threw, or the host could not run it.
    pub exception: bool,
}

impl Evaluation {
    pub fn value(result: impl Into<String>) -> Self {
        let result = result.into();
        Self {
            result: (!result.is_empty()).then_some(result),
            exception: false,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn exception() -> Self {
        Self {
            result: None,
            exception: true,
        }
    }

    /// Transport-level failure: the attempt is worth retrying.
    pub fn is_transport_failure(&self) -> bool {
        self.exception || self.result.is_none()
    }
}

/// Runs a script body in the inspected page context.
///
/// One call is one attempt; retrying is the caller's business.
pub trait Evaluator: Send + Sync + 'static {
    fn evaluate(&self, script: &str) -> impl Future<Output = Evaluation> + Send;
}
