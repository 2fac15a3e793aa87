//! Async runtime around `AppState`.
//!
//! The inspector is a single task that owns the state. Commands from the GUI and
//! finished fetches arrive on channels and are applied one at a time, so state is
//! only ever written from that task. After each change a fresh `PanelSnapshot` is
//! published on a watch channel.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::dataset::{DatasetKind, Status};
use crate::evaluator::Evaluator;
use crate::fetcher::RetryPolicy;
use crate::gate::{self, Debouncer, GateVerdict};
use crate::navigator::{NavigatorState, TreeViewState};
use crate::render::{NodeId, RenderedView};
use crate::scripts;
use crate::state::{ActivePage, AppState, FetchKind, FetchResult, Job, PagePhase};
use crate::statics;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Refresh(DatasetKind),
    /// The inspected page navigated; debounced before the gate is re-checked.
    Navigated,
    SetQuery(DatasetKind, String),
    NextMatch(DatasetKind),
    PrevMatch(DatasetKind),
    ToggleNode(DatasetKind, NodeId),
    SetAllOpen(DatasetKind, bool),
    Shutdown,
}

enum Event {
    Finished(Job, FetchResult),
    NavigationSettled,
}

#[derive(Debug, Clone, Copy)]
pub struct InspectorOptions {
    pub retry: RetryPolicy,
    pub navigation_debounce: std::time::Duration,
    pub require_meta_tag: bool,
}

impl Default for InspectorOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            navigation_debounce: statics::NAVIGATION_DEBOUNCE,
            require_meta_tag: true,
        }
    }
}

/// What one tab needs to draw itself.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSnapshot {
    pub kind: DatasetKind,
    pub status: Status,
    pub query: String,
    pub view: Option<Arc<RenderedView>>,
    pub tree: TreeViewState,
    pub navigator: NavigatorState,
    pub counter: Option<String>,
    pub controls_enabled: bool,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelSnapshot {
    pub phase: PagePhase,
    pub gate_enabled: bool,
    pub verdict: Option<GateVerdict>,
    pub active_page: ActivePage,
    pub datasets: Vec<DatasetSnapshot>,
}

impl PanelSnapshot {
    fn capture(state: &AppState) -> Self {
        let datasets = state
            .datasets()
            .iter()
            .map(|ds| DatasetSnapshot {
                kind: ds.kind(),
                status: ds.status().clone(),
                query: ds.query().to_string(),
                view: ds.view().cloned(),
                tree: ds.tree().clone(),
                navigator: ds.navigator().state(),
                counter: ds.navigator().counter(),
                controls_enabled: ds.navigator().controls_enabled(),
                loading: state.is_in_flight(FetchKind::Dataset(ds.kind())),
            })
            .collect();
        Self {
            phase: state.phase(),
            gate_enabled: state.gate_enabled(),
            verdict: state.verdict().cloned(),
            active_page: state.active_page().clone(),
            datasets,
        }
    }

    pub fn dataset(&self, kind: DatasetKind) -> Option<&DatasetSnapshot> {
        self.datasets.iter().find(|d| d.kind == kind)
    }

    /// The debug-mode warning applies once a check finished without enabling the gate.
    pub fn show_debug_warning(&self) -> bool {
        self.phase == PagePhase::Supported && self.verdict.as_ref().is_some_and(|v| !v.is_enabled())
    }
}

/// Cloneable front end used by the GUI and the navigation forwarder.
#[derive(Debug, Clone)]
pub struct InspectorHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<PanelSnapshot>,
}

impl InspectorHandle {
    /// Returns `false` once the inspector has stopped.
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PanelSnapshot> {
        self.snapshots.clone()
    }
}

struct Mailbox {
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedReceiver<Event>,
}

pub struct Inspector<E: Evaluator> {
    evaluator: Arc<E>,
    policy: RetryPolicy,
    state: AppState,
    debouncer: Debouncer,
    events: mpsc::UnboundedSender<Event>,
    snapshots: watch::Sender<PanelSnapshot>,
    mailbox: Option<Mailbox>,
}

impl<E: Evaluator> Inspector<E> {
    pub fn new(evaluator: E, options: InspectorOptions) -> (Self, InspectorHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let state = AppState::new(options.require_meta_tag);
        let (snapshot_tx, snapshot_rx) = watch::channel(PanelSnapshot::capture(&state));

        let inspector = Self {
            evaluator: Arc::new(evaluator),
            policy: options.retry,
            state,
            debouncer: Debouncer::new(options.navigation_debounce),
            events: event_tx,
            snapshots: snapshot_tx,
            mailbox: Some(Mailbox {
                commands: command_rx,
                events: event_rx,
            }),
        };
        let handle = InspectorHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        };
        (inspector, handle)
    }

    /// Process commands until `Shutdown` or every handle is dropped.
    pub async fn run(mut self) {
        let Some(mut mailbox) = self.mailbox.take() else {
            return;
        };
        tracing::debug!("inspector started");

        loop {
            tokio::select! {
                command = mailbox.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(event) = mailbox.events.recv() => self.handle_event(event),
            }
            self.publish();
        }

        self.debouncer.cancel();
        tracing::debug!("inspector stopped");
    }

    fn handle_command(&mut self, command: Command) {
        tracing::trace!(?command, "command");
        let jobs = match command {
            Command::Start => self.state.start(),
            Command::Refresh(kind) => self.state.refresh(kind),
            Command::Navigated => {
                let events = self.events.clone();
                self.debouncer.schedule(async move {
                    let _ = events.send(Event::NavigationSettled);
                });
                Vec::new()
            }
            Command::SetQuery(kind, query) => {
                self.state.set_query(kind, query);
                Vec::new()
            }
            Command::NextMatch(kind) => {
                self.state.next_match(kind);
                Vec::new()
            }
            Command::PrevMatch(kind) => {
                self.state.prev_match(kind);
                Vec::new()
            }
            Command::ToggleNode(kind, id) => {
                self.state.toggle_node(kind, id);
                Vec::new()
            }
            Command::SetAllOpen(kind, open) => {
                self.state.set_all_open(kind, open);
                Vec::new()
            }
            Command::Shutdown => Vec::new(),
        };
        self.spawn_all(jobs);
    }

    fn handle_event(&mut self, event: Event) {
        let jobs = match event {
            Event::Finished(job, result) => self.state.complete(job, result),
            Event::NavigationSettled => {
                tracing::debug!("navigation settled, re-checking page");
                self.state.navigation_settled()
            }
        };
        self.spawn_all(jobs);
    }

    fn spawn_all(&self, jobs: Vec<Job>) {
        for job in jobs {
            let evaluator = Arc::clone(&self.evaluator);
            let policy = self.policy;
            let events = self.events.clone();
            tokio::spawn(async move {
                let result = run_job(evaluator.as_ref(), &policy, job.kind).await;
                let _ = events.send(Event::Finished(job, result));
            });
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(PanelSnapshot::capture(&self.state));
    }
}

async fn run_job<E: Evaluator>(evaluator: &E, policy: &RetryPolicy, kind: FetchKind) -> FetchResult {
    match kind {
        FetchKind::Probe => {
            // One attempt: a page that cannot answer is not recognized.
            let evaluation = evaluator.evaluate(scripts::TSOFT_META_CHECK).await;
            let recognized = !evaluation.exception && evaluation.result.as_deref() == Some("true");
            FetchResult::Probe(recognized)
        }
        FetchKind::Gate => FetchResult::Gate(gate::verify(evaluator, policy).await),
        FetchKind::ActivePage => {
            FetchResult::ActivePage(policy.fetch_raw(evaluator, scripts::ACTIVE_PAGE).await)
        }
        FetchKind::Dataset(kind) => FetchResult::Dataset(policy.fetch(evaluator, kind.script()).await),
    }
}
