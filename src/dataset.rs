//! The three inspected datasets and the state each tab keeps.

use std::sync::Arc;

use crate::JsonValue;
use crate::error::TransportFailure;
use crate::fetcher::EvaluationOutcome;
use crate::filter;
use crate::navigator::{NavigatorState, SearchNavigator, TreeViewState};
use crate::render::{NodeId, RenderedView, ViewSummary};
use crate::scripts;
use crate::statics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatasetKind {
    Translations,
    GlobalVars,
    BlockVars,
}

/// Fixed status texts for one dataset.
struct Texts {
    loading: &'static str,
    empty: &'static str,
    no_match: &'static str,
    listed: &'static str,
    read_failed: &'static str,
    undecodable: &'static str,
    page_error: &'static str,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] = [
        DatasetKind::Translations,
        DatasetKind::GlobalVars,
        DatasetKind::BlockVars,
    ];

    pub fn index(self) -> usize {
        match self {
            DatasetKind::Translations => 0,
            DatasetKind::GlobalVars => 1,
            DatasetKind::BlockVars => 2,
        }
    }

    pub fn script(self) -> &'static str {
        match self {
            DatasetKind::Translations => scripts::TRANSLATIONS,
            DatasetKind::GlobalVars => scripts::GLOBAL_VARS,
            DatasetKind::BlockVars => scripts::BLOCK_VARS,
        }
    }

    /// The page global the dataset is read from.
    pub fn page_global(self) -> &'static str {
        match self {
            DatasetKind::Translations => statics::PAGE_GLOBAL_TRANSLATIONS,
            DatasetKind::GlobalVars => statics::PAGE_GLOBAL_GLOBAL_VARS,
            DatasetKind::BlockVars => statics::PAGE_GLOBAL_BLOCK_VARS,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            DatasetKind::Translations => statics::EN_TAB_TRANSLATIONS,
            DatasetKind::GlobalVars => statics::EN_TAB_GLOBAL_VARS,
            DatasetKind::BlockVars => statics::EN_TAB_BLOCK_VARS,
        }
    }

    pub fn search_hint(self) -> &'static str {
        match self {
            DatasetKind::Translations => statics::EN_HINT_SEARCH_TRANSLATIONS,
            DatasetKind::GlobalVars => statics::EN_HINT_SEARCH_GLOBAL_VARS,
            DatasetKind::BlockVars => statics::EN_HINT_SEARCH_BLOCK_VARS,
        }
    }

    pub fn render(self, payload: &JsonValue, query: &str) -> RenderedView {
        match self {
            DatasetKind::Translations => filter::render_translations(payload, query),
            DatasetKind::GlobalVars => filter::render_global_vars(payload, query),
            DatasetKind::BlockVars => filter::render_block_vars(payload, query),
        }
    }

    fn texts(self) -> Texts {
        match self {
            DatasetKind::Translations => Texts {
                loading: statics::EN_TR_LOADING,
                empty: statics::EN_TR_EMPTY,
                no_match: statics::EN_TR_NO_MATCH,
                listed: statics::EN_TR_LISTED,
                read_failed: statics::EN_TR_READ_FAILED,
                undecodable: statics::EN_TR_UNDECODABLE,
                page_error: statics::EN_TR_PAGE_ERROR,
            },
            DatasetKind::GlobalVars => Texts {
                loading: statics::EN_GV_LOADING,
                empty: statics::EN_GV_EMPTY,
                no_match: statics::EN_GV_NO_MATCH,
                listed: statics::EN_GV_LISTED,
                read_failed: statics::EN_GV_READ_FAILED,
                undecodable: statics::EN_GV_UNDECODABLE,
                page_error: statics::EN_GV_PAGE_ERROR,
            },
            DatasetKind::BlockVars => Texts {
                loading: statics::EN_BV_LOADING,
                empty: statics::EN_BV_EMPTY,
                no_match: statics::EN_BV_NO_MATCH,
                listed: statics::EN_BV_LISTED,
                read_failed: statics::EN_BV_READ_FAILED,
                undecodable: statics::EN_BV_UNDECODABLE,
                page_error: statics::EN_BV_PAGE_ERROR,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    pub message: String,
    pub tone: Tone,
}

impl Status {
    pub fn new(message: impl Into<String>, tone: Tone) -> Self {
        Self {
            message: message.into(),
            tone,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Tone::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Tone::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Tone::Error)
    }

    pub fn waiting() -> Self {
        Self::info(statics::EN_STATUS_WAITING_AUTH)
    }

    pub fn loading(kind: DatasetKind) -> Self {
        Self::info(kind.texts().loading)
    }

    /// Status line for a finished render.
    pub fn for_view(kind: DatasetKind, summary: ViewSummary) -> Self {
        let texts = kind.texts();
        match summary {
            ViewSummary::Empty => Self::info(texts.empty),
            ViewSummary::NoMatch => Self::info(texts.no_match),
            ViewSummary::Listed(n) => Self::success(format!("{n} {}", texts.listed)),
        }
    }

    /// Status line for a fetch that produced no payload.
    pub fn for_failure(kind: DatasetKind, outcome: &EvaluationOutcome) -> Option<Self> {
        let texts = kind.texts();
        let status = match outcome {
            EvaluationOutcome::Ok(_) => return None,
            EvaluationOutcome::Missing => Self::info(format!(
                "{} {}",
                kind.page_global(),
                statics::EN_NOT_DEFINED_SUFFIX
            )),
            EvaluationOutcome::Error(message) => {
                Self::error(format!("{} {message}", texts.page_error))
            }
            EvaluationOutcome::TransportFailure(TransportFailure::Exhausted { .. }) => {
                Self::error(texts.read_failed)
            }
            EvaluationOutcome::TransportFailure(TransportFailure::Undecodable(_)) => {
                Self::error(texts.undecodable)
            }
        };
        Some(status)
    }
}

/// One tab: last payload, active query, rendered view, navigation and status.
#[derive(Debug, Clone)]
pub struct Dataset {
    kind: DatasetKind,
    payload: Option<JsonValue>,
    query: String,
    view: Option<Arc<RenderedView>>,
    tree: TreeViewState,
    navigator: SearchNavigator,
    status: Status,
    attached: bool,
}

impl Dataset {
    pub fn new(kind: DatasetKind) -> Self {
        Self {
            kind,
            payload: None,
            query: String::new(),
            view: None,
            tree: TreeViewState::default(),
            navigator: SearchNavigator::default(),
            status: Status::waiting(),
            attached: true,
        }
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn payload(&self) -> Option<&JsonValue> {
        self.payload.as_ref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn view(&self) -> Option<&Arc<RenderedView>> {
        self.view.as_ref()
    }

    pub fn tree(&self) -> &TreeViewState {
        &self.tree
    }

    pub fn navigator(&self) -> &SearchNavigator {
        &self.navigator
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Whether the tab's container exists. Detached datasets are never fetched or rendered.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    /// Forget everything read from the page.
    pub fn clear(&mut self) {
        self.payload = None;
        self.view = None;
        self.navigator.clear(&mut self.tree);
        self.tree.reset();
        self.status = Status::waiting();
    }

    /// The previous view stays on screen until the new outcome arrives.
    pub fn begin_loading(&mut self) {
        self.status = Status::loading(self.kind);
    }

    /// A failed fetch only changes the status line; the last payload stays
    /// so later searches still render it. Only `clear` drops it.
    pub fn apply_outcome(&mut self, outcome: EvaluationOutcome) {
        if let Some(status) = Status::for_failure(self.kind, &outcome) {
            tracing::info!(dataset = ?self.kind, status = %status.message, "fetch produced no data");
            self.status = status;
            return;
        }
        if let EvaluationOutcome::Ok(payload) = outcome {
            self.payload = Some(payload);
            self.render();
        }
    }

    /// Re-render from the last payload and the current query.
    pub fn render(&mut self) {
        if !self.attached {
            return;
        }
        let Some(payload) = &self.payload else {
            return;
        };
        let view = Arc::new(self.kind.render(payload, &self.query));
        self.status = Status::for_view(self.kind, view.summary);
        self.tree.reset();
        self.navigator
            .update(&self.query, &view.matches, &mut self.tree);
        tracing::debug!(
            dataset = ?self.kind,
            groups = view.groups.len(),
            matches = view.matches.len(),
            "rendered"
        );
        self.view = Some(view);
    }

    pub fn set_query(&mut self, query: String) {
        self.query = query;
        self.render();
    }

    pub fn next_match(&mut self) -> NavigatorState {
        self.navigator.next(&mut self.tree);
        self.navigator.state()
    }

    pub fn prev_match(&mut self) -> NavigatorState {
        self.navigator.prev(&mut self.tree);
        self.navigator.state()
    }

    pub fn toggle_node(&mut self, id: NodeId) {
        let default = self
            .view
            .as_deref()
            .and_then(|v| v.default_open(id))
            .unwrap_or(false);
        self.tree.toggle(id, default);
    }

    pub fn set_all_open(&mut self, open: bool) {
        if let Some(view) = &self.view {
            self.tree.set_all(view, open);
        }
    }
}
