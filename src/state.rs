//! Application state and the triggers that mutate it.
//!
//! `AppState` never awaits. Each trigger updates state and returns the fetch jobs
//! the runtime should start; each finished job is fed back through `complete`.
//! At most one job per `FetchKind` is in flight. A trigger that arrives while one is
//! running queues a single follow-up instead of starting a second job.

use std::collections::HashMap;

use crate::dataset::{Dataset, DatasetKind};
use crate::error::TransportFailure;
use crate::fetcher::EvaluationOutcome;
use crate::gate::GateVerdict;
use crate::render::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    /// Meta tag check that recognizes a T-Soft page.
    Probe,
    Gate,
    ActivePage,
    Dataset(DatasetKind),
}

/// A fetch to run, stamped with the gate epoch it was started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub kind: FetchKind,
    pub epoch: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Probe(bool),
    Gate(GateVerdict),
    ActivePage(Result<String, TransportFailure>),
    Dataset(EvaluationOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagePhase {
    #[default]
    Starting,
    Probing,
    Unsupported,
    Supported,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActivePage {
    #[default]
    Unknown,
    Loading,
    Url(String),
    Unavailable,
}

#[derive(Debug, Clone, Copy, Default)]
struct LoadSlot {
    in_flight: bool,
    queued: bool,
}

#[derive(Debug, Clone)]
pub struct AppState {
    require_meta_tag: bool,
    phase: PagePhase,
    gate: bool,
    verdict: Option<GateVerdict>,
    epoch: u64,
    active_page: ActivePage,
    datasets: [Dataset; 3],
    slots: HashMap<FetchKind, LoadSlot>,
}

impl AppState {
    pub fn new(require_meta_tag: bool) -> Self {
        Self {
            require_meta_tag,
            phase: PagePhase::Starting,
            gate: false,
            verdict: None,
            epoch: 0,
            active_page: ActivePage::Unknown,
            datasets: DatasetKind::ALL.map(Dataset::new),
            slots: HashMap::new(),
        }
    }

    pub fn phase(&self) -> PagePhase {
        self.phase
    }

    pub fn gate_enabled(&self) -> bool {
        self.gate
    }

    /// The last gate verdict, `None` until the first check finishes.
    pub fn verdict(&self) -> Option<&GateVerdict> {
        self.verdict.as_ref()
    }

    pub fn active_page(&self) -> &ActivePage {
        &self.active_page
    }

    pub fn dataset(&self, kind: DatasetKind) -> &Dataset {
        &self.datasets[kind.index()]
    }

    pub fn dataset_mut(&mut self, kind: DatasetKind) -> &mut Dataset {
        &mut self.datasets[kind.index()]
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn is_in_flight(&self, kind: FetchKind) -> bool {
        self.slots.get(&kind).is_some_and(|s| s.in_flight)
    }

    /// Initial load.
    pub fn start(&mut self) -> Vec<Job> {
        if self.require_meta_tag {
            self.phase = PagePhase::Probing;
            self.request(FetchKind::Probe)
        } else {
            self.phase = PagePhase::Supported;
            self.request(FetchKind::Gate)
        }
    }

    /// The page navigated and the debounce window passed.
    pub fn navigation_settled(&mut self) -> Vec<Job> {
        match self.phase {
            PagePhase::Supported => self.request(FetchKind::Gate),
            _ if self.require_meta_tag => {
                self.phase = PagePhase::Probing;
                self.request(FetchKind::Probe)
            }
            _ => {
                self.phase = PagePhase::Supported;
                self.request(FetchKind::Gate)
            }
        }
    }

    /// Manual refresh of one dataset. Ignored while the gate is closed.
    pub fn refresh(&mut self, kind: DatasetKind) -> Vec<Job> {
        self.request(FetchKind::Dataset(kind))
    }

    pub fn set_query(&mut self, kind: DatasetKind, query: String) {
        self.dataset_mut(kind).set_query(query);
    }

    pub fn next_match(&mut self, kind: DatasetKind) {
        self.dataset_mut(kind).next_match();
    }

    pub fn prev_match(&mut self, kind: DatasetKind) {
        self.dataset_mut(kind).prev_match();
    }

    pub fn toggle_node(&mut self, kind: DatasetKind, id: NodeId) {
        self.dataset_mut(kind).toggle_node(id);
    }

    pub fn set_all_open(&mut self, kind: DatasetKind, open: bool) {
        self.dataset_mut(kind).set_all_open(open);
    }

    /// Feed back a finished job. Returns follow-up jobs, including a queued re-run.
    pub fn complete(&mut self, job: Job, result: FetchResult) -> Vec<Job> {
        let slot = self.slots.entry(job.kind).or_default();
        slot.in_flight = false;
        let rerun = std::mem::take(&mut slot.queued);

        let mut jobs = match result {
            FetchResult::Probe(recognized) => self.probe_finished(recognized),
            FetchResult::Gate(verdict) => self.gate_resolved(verdict),
            FetchResult::ActivePage(result) => {
                self.active_page = match result {
                    Ok(url) => ActivePage::Url(url),
                    Err(failure) => {
                        tracing::debug!(%failure, "active page unavailable");
                        ActivePage::Unavailable
                    }
                };
                Vec::new()
            }
            FetchResult::Dataset(outcome) => {
                if let FetchKind::Dataset(kind) = job.kind {
                    self.dataset_fetched(kind, job.epoch, outcome);
                }
                Vec::new()
            }
        };

        if rerun {
            jobs.extend(self.request(job.kind));
        }
        jobs
    }

    fn probe_finished(&mut self, recognized: bool) -> Vec<Job> {
        if recognized {
            tracing::info!("T-Soft page recognized");
            self.phase = PagePhase::Supported;
            self.request(FetchKind::Gate)
        } else {
            tracing::info!("inspected page is not a T-Soft page");
            self.phase = PagePhase::Unsupported;
            self.close_gate();
            Vec::new()
        }
    }

    fn gate_resolved(&mut self, verdict: GateVerdict) -> Vec<Job> {
        let enabled = verdict.is_enabled();
        tracing::info!(?verdict, "debug gate resolved");
        self.verdict = Some(verdict);

        let mut jobs = Vec::new();
        if enabled {
            self.gate = true;
            for kind in DatasetKind::ALL {
                jobs.extend(self.request(FetchKind::Dataset(kind)));
            }
        } else {
            self.close_gate();
        }
        jobs.extend(self.request(FetchKind::ActivePage));
        jobs
    }

    fn close_gate(&mut self) {
        if self.gate {
            // Results of jobs started before this point are dropped on arrival.
            self.epoch += 1;
        }
        self.gate = false;
        for dataset in &mut self.datasets {
            dataset.clear();
        }
    }

    fn dataset_fetched(&mut self, kind: DatasetKind, epoch: u64, outcome: EvaluationOutcome) {
        if !self.gate || epoch != self.epoch {
            tracing::debug!(dataset = ?kind, epoch, current = self.epoch, "discarding stale result");
            return;
        }
        self.dataset_mut(kind).apply_outcome(outcome);
    }

    fn allowed(&self, kind: FetchKind) -> bool {
        match kind {
            FetchKind::Dataset(k) => self.gate && self.dataset(k).is_attached(),
            FetchKind::Probe | FetchKind::Gate | FetchKind::ActivePage => true,
        }
    }

    fn request(&mut self, kind: FetchKind) -> Vec<Job> {
        if !self.allowed(kind) {
            return Vec::new();
        }
        let slot = self.slots.entry(kind).or_default();
        if slot.in_flight {
            slot.queued = true;
            return Vec::new();
        }
        slot.in_flight = true;

        match kind {
            FetchKind::Dataset(k) => self.dataset_mut(k).begin_loading(),
            FetchKind::ActivePage => self.active_page = ActivePage::Loading,
            FetchKind::Probe | FetchKind::Gate => {}
        }
        vec![Job {
            kind,
            epoch: self.epoch,
        }]
    }
}
