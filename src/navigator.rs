//! Search navigation over the matches of one rendered view.

use std::collections::HashMap;

use crate::render::{MatchDescriptor, NodeId, Query, RenderedView};

/// What a navigator drives when it moves: expanding, marking and scrolling.
pub trait MatchView {
    /// Open every ancestor of `unit`, mark it current and bring it into view.
    fn focus(&mut self, unit: &MatchDescriptor);
    fn clear_focus(&mut self);
}

/// A request to scroll a row into view. `seq` grows with every request so the
/// GUI can tell a repeated focus on the same row from one it already handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub seq: u64,
    pub row: NodeId,
}

/// Per-view expansion state layered over a render pass's defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeViewState {
    overrides: HashMap<NodeId, bool>,
    current: Option<NodeId>,
    scroll: Option<ScrollRequest>,
    next_seq: u64,
}

impl TreeViewState {
    /// Drop everything tied to the previous render pass.
    pub fn reset(&mut self) {
        self.overrides.clear();
        self.current = None;
        self.scroll = None;
    }

    pub fn is_open(&self, id: NodeId, default: bool) -> bool {
        self.overrides.get(&id).copied().unwrap_or(default)
    }

    pub fn set_open(&mut self, id: NodeId, open: bool) {
        self.overrides.insert(id, open);
    }

    pub fn toggle(&mut self, id: NodeId, default: bool) {
        let open = !self.is_open(id, default);
        self.set_open(id, open);
    }

    pub fn set_all(&mut self, view: &RenderedView, open: bool) {
        for id in view.expandable_ids() {
            self.set_open(id, open);
        }
    }

    /// The row marked as the current match.
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    pub fn scroll_request(&self) -> Option<ScrollRequest> {
        self.scroll
    }
}

impl MatchView for TreeViewState {
    fn focus(&mut self, unit: &MatchDescriptor) {
        for ancestor in &unit.ancestors {
            self.set_open(*ancestor, true);
        }
        self.current = Some(unit.row);
        self.next_seq += 1;
        self.scroll = Some(ScrollRequest {
            seq: self.next_seq,
            row: unit.row,
        });
    }

    fn clear_focus(&mut self) {
        self.current = None;
        self.scroll = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorState {
    /// No query.
    Idle,
    /// A query with no matches.
    Indexed { total: usize },
    /// A query with matches, `index` being current.
    Positioned { index: usize, total: usize },
}

/// Tracks the current match of one dataset and moves it cyclically.
#[derive(Debug, Clone, Default)]
pub struct SearchNavigator {
    query_active: bool,
    matches: Vec<MatchDescriptor>,
    current: Option<usize>,
}

impl SearchNavigator {
    /// Re-index after a render. The first match, if any, becomes current.
    pub fn update(&mut self, query: &str, matches: &[MatchDescriptor], view: &mut impl MatchView) {
        self.query_active = !Query::new(query).is_empty();
        self.matches = if self.query_active {
            matches.to_vec()
        } else {
            Vec::new()
        };
        self.current = None;

        if self.matches.is_empty() {
            view.clear_focus();
        } else {
            self.go_to(0, view);
        }
    }

    pub fn clear(&mut self, view: &mut impl MatchView) {
        self.query_active = false;
        self.matches.clear();
        self.current = None;
        view.clear_focus();
    }

    pub fn next(&mut self, view: &mut impl MatchView) {
        let total = self.matches.len();
        if total == 0 {
            return;
        }
        let index = match self.current {
            Some(i) => (i + 1) % total,
            None => 0,
        };
        self.go_to(index, view);
    }

    pub fn prev(&mut self, view: &mut impl MatchView) {
        let total = self.matches.len();
        if total == 0 {
            return;
        }
        let index = match self.current {
            Some(i) if i > 0 => i - 1,
            _ => total - 1,
        };
        self.go_to(index, view);
    }

    fn go_to(&mut self, index: usize, view: &mut impl MatchView) {
        self.current = Some(index);
        view.focus(&self.matches[index]);
    }

    pub fn state(&self) -> NavigatorState {
        if !self.query_active {
            return NavigatorState::Idle;
        }
        let total = self.matches.len();
        match self.current {
            Some(index) if total > 0 => NavigatorState::Positioned { index, total },
            _ => NavigatorState::Indexed { total },
        }
    }

    pub fn current(&self) -> Option<&MatchDescriptor> {
        self.current.and_then(|i| self.matches.get(i))
    }

    pub fn total(&self) -> usize {
        self.matches.len()
    }

    /// `"i / total"`, 1-based; `None` while idle or without matches.
    pub fn counter(&self) -> Option<String> {
        match self.state() {
            NavigatorState::Positioned { index, total } => Some(format!("{} / {total}", index + 1)),
            _ => None,
        }
    }

    pub fn controls_enabled(&self) -> bool {
        self.query_active && !self.matches.is_empty()
    }
}
