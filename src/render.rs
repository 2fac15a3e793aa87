//! Toolkit-independent rendered tree.
//!
//! A render pass turns page data into groups of rows, nested expandable nodes and
//! an ordered list of match descriptors. The GUI draws it; the search navigator
//! walks the descriptors. Nothing here is patched after the pass: a new query or new
//! data means a new `RenderedView`.

use std::ops::Range;

use crate::JsonValue;
use crate::statics;

/// Identity of a rendered row, group or nested node within one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Normalized search query: trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    folded: String,
}

impl Query {
    pub fn new(raw: &str) -> Self {
        Self {
            folded: fold_case(raw.trim()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.folded
    }

    /// Empty queries match nothing here; callers decide what "no filter" means.
    pub fn matches(&self, text: &str) -> bool {
        !self.is_empty() && fold_case(text).contains(&self.folded)
    }
}

fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// Byte ranges of every non-overlapping case-insensitive occurrence of `query` in `text`.
pub fn find_highlights(text: &str, query: &Query) -> Vec<Range<usize>> {
    let needle = query.as_str();
    if needle.is_empty() {
        return Vec::new();
    }

    // Lowercasing may change byte lengths, so keep the source span of every folded byte.
    let mut folded = String::with_capacity(text.len());
    let mut source: Vec<(usize, usize)> = Vec::with_capacity(text.len());
    for (start, ch) in text.char_indices() {
        let end = start + ch.len_utf8();
        for lower in ch.to_lowercase() {
            let before = folded.len();
            folded.push(lower);
            source.extend(std::iter::repeat_n((start, end), folded.len() - before));
        }
    }

    let mut out: Vec<Range<usize>> = Vec::new();
    let mut from = 0;
    while let Some(pos) = folded[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();
        from = end;

        let range = source[start].0..source[end - 1].1;
        if out.last().is_some_and(|last| range.start < last.end) {
            continue;
        }
        out.push(range);
    }
    out
}

/// Text with the spans that matched the active query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Label {
    pub text: String,
    pub highlights: Vec<Range<usize>>,
}

impl Label {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlights: Vec::new(),
        }
    }

    pub fn highlighted(text: impl Into<String>, query: &Query) -> Self {
        let text = text.into();
        let highlights = find_highlights(&text, query);
        Self { text, highlights }
    }

    pub fn is_hit(&self) -> bool {
        !self.highlights.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedValue {
    Scalar(Label),
    Node(RenderedNode),
}

/// An expandable object or array.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedNode {
    pub id: NodeId,
    pub summary: String,
    pub open: bool,
    pub rows: Vec<RenderedRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    pub id: NodeId,
    pub key: Label,
    pub value: RenderedValue,
    pub copy_text: String,
}

/// A titled, collapsible section (translation group, block) or the single untitled
/// section global variables render into.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedGroup {
    pub id: NodeId,
    pub title: Option<String>,
    pub open: bool,
    pub rows: Vec<RenderedRow>,
    pub placeholder: Option<&'static str>,
}

/// One search hit: a row whose key or scalar value contains the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDescriptor {
    pub row: NodeId,
    /// Expandable groups and nodes enclosing the row, outermost first.
    pub ancestors: Vec<NodeId>,
}

/// How a render pass ended, for the dataset's status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSummary {
    /// Nothing to show even without a filter.
    Empty,
    /// Data exists but the query filtered all of it out.
    NoMatch,
    /// `n` groups, rows or blocks are on screen.
    Listed(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedView {
    pub groups: Vec<RenderedGroup>,
    pub matches: Vec<MatchDescriptor>,
    pub summary: ViewSummary,
}

impl RenderedView {
    pub fn empty(summary: ViewSummary) -> Self {
        Self {
            groups: Vec::new(),
            matches: Vec::new(),
            summary,
        }
    }

    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }

    /// Every node a toggle-all can open or close, in document order.
    pub fn expandable_ids(&self) -> Vec<NodeId> {
        fn walk(rows: &[RenderedRow], out: &mut Vec<NodeId>) {
            for row in rows {
                if let RenderedValue::Node(node) = &row.value {
                    out.push(node.id);
                    walk(&node.rows, out);
                }
            }
        }

        let mut out = Vec::new();
        for group in &self.groups {
            if group.title.is_some() {
                out.push(group.id);
            }
            walk(&group.rows, &mut out);
        }
        out
    }

    /// Initial open state of a group or nested node, `None` if `id` is not expandable.
    pub fn default_open(&self, id: NodeId) -> Option<bool> {
        fn walk(rows: &[RenderedRow], id: NodeId) -> Option<bool> {
            rows.iter().find_map(|row| match &row.value {
                RenderedValue::Node(node) if node.id == id => Some(node.open),
                RenderedValue::Node(node) => walk(&node.rows, id),
                RenderedValue::Scalar(_) => None,
            })
        }
        self.groups.iter().find_map(|group| {
            if group.id == id {
                group.title.as_ref().map(|_| group.open)
            } else {
                walk(&group.rows, id)
            }
        })
    }

    pub fn find_row(&self, id: NodeId) -> Option<&RenderedRow> {
        fn walk(rows: &[RenderedRow], id: NodeId) -> Option<&RenderedRow> {
            rows.iter().find_map(|row| {
                if row.id == id {
                    return Some(row);
                }
                match &row.value {
                    RenderedValue::Node(node) => walk(&node.rows, id),
                    RenderedValue::Scalar(_) => None,
                }
            })
        }
        self.groups.iter().find_map(|g| walk(&g.rows, id))
    }
}

/// Preview of an object's keys: all of them when there are at most three,
/// otherwise the first two and an ellipsis.
pub fn preview_keys<'a>(keys: impl ExactSizeIterator<Item = &'a String>) -> String {
    let len = keys.len();
    if len == 0 {
        return "{}".to_string();
    }
    let shown: Vec<&str> = keys.take(if len <= 3 { 3 } else { 2 }).map(String::as_str).collect();
    if len <= 3 {
        format!("{{ {} }}", shown.join(", "))
    } else {
        format!("{{ {}, … }}", shown.join(", "))
    }
}

fn summary_of(value: &JsonValue) -> String {
    match value {
        JsonValue::Object(map) => preview_keys(map.keys()),
        JsonValue::Array(values) if values.is_empty() => "[]".to_string(),
        JsonValue::Array(values) => format!("[ {} {} ]", values.len(), statics::EN_ITEMS_SUFFIX),
        other => other.display_text(),
    }
}

/// Keys and values of a container, array indices stringified.
pub fn container_entries(value: &JsonValue) -> Option<Vec<(String, &JsonValue)>> {
    match value {
        JsonValue::Object(map) => Some(map.iter().map(|(k, v)| (k.clone(), v)).collect()),
        JsonValue::Array(values) => Some(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        ),
        _ => None,
    }
}

/// Builds one render pass, handing out node ids and recording matches in document order.
pub struct TreeBuilder {
    query: Query,
    next_id: u32,
    ancestors: Vec<NodeId>,
    matches: Vec<MatchDescriptor>,
}

impl TreeBuilder {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            next_id: 0,
            ancestors: Vec::new(),
            matches: Vec::new(),
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// A group whose rows are produced by `rows`. Titled groups are collapsible and
    /// count as ancestors of the matches inside them.
    pub fn group<F>(&mut self, title: Option<String>, open: bool, rows: F) -> RenderedGroup
    where
        F: FnOnce(&mut Self) -> Vec<RenderedRow>,
    {
        let id = self.alloc();
        let collapsible = title.is_some();
        if collapsible {
            self.ancestors.push(id);
        }
        let rows = rows(self);
        if collapsible {
            self.ancestors.pop();
        }
        RenderedGroup {
            id,
            title,
            open,
            rows,
            placeholder: None,
        }
    }

    /// A row directly inside a group: strings display raw.
    pub fn top_row(&mut self, key: &str, value: &JsonValue) -> RenderedRow {
        self.row(key, value, false)
    }

    fn row(&mut self, key: &str, value: &JsonValue, nested: bool) -> RenderedRow {
        let id = self.alloc();
        let key_label = Label::highlighted(key, &self.query);
        let copy_text = value.copy_text();

        if let Some(entries) = container_entries(value) {
            // The row itself precedes everything rendered inside it.
            if key_label.is_hit() {
                self.record(id);
            }
            let node = self.node(value, entries);
            return RenderedRow {
                id,
                key: key_label,
                value: RenderedValue::Node(node),
                copy_text,
            };
        }

        let text = match value {
            JsonValue::String(_) if nested => value.to_compact(),
            other => other.display_text(),
        };
        let value_label = Label::highlighted(text, &self.query);
        if key_label.is_hit() || value_label.is_hit() {
            self.record(id);
        }
        RenderedRow {
            id,
            key: key_label,
            value: RenderedValue::Scalar(value_label),
            copy_text,
        }
    }

    fn node(&mut self, value: &JsonValue, entries: Vec<(String, &JsonValue)>) -> RenderedNode {
        let id = self.alloc();
        self.ancestors.push(id);
        let rows = entries
            .into_iter()
            .map(|(key, child)| self.row(&key, child, true))
            .collect();
        self.ancestors.pop();
        RenderedNode {
            id,
            summary: summary_of(value),
            // Nested nodes start open, filtered or not, so a hit is never hidden.
            open: true,
            rows,
        }
    }

    fn record(&mut self, row: NodeId) {
        self.matches.push(MatchDescriptor {
            row,
            ancestors: self.ancestors.clone(),
        });
    }

    pub fn finish(self, groups: Vec<RenderedGroup>, summary: ViewSummary) -> RenderedView {
        RenderedView {
            groups,
            matches: self.matches,
            summary,
        }
    }
}
