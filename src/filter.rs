//! Filtering and rendering of the three page datasets.
//!
//! A top-level entry is kept when the query is empty, or when its key or the text
//! form of its value contains the query. Containers use their compact JSON as text,
//! so a hit anywhere inside keeps the whole entry.

use crate::JsonValue;
use crate::render::{
    Query, RenderedGroup, RenderedRow, RenderedView, TreeBuilder, ViewSummary, container_entries,
};
use crate::statics;

fn entry_passes(query: &Query, key: &str, value: &JsonValue) -> bool {
    query.is_empty() || query.matches(key) || query.matches(&value.display_text())
}

/// Entries of a container, or a single `scalar_key` entry for a non-null scalar.
fn entries_or_scalar<'a>(value: &'a JsonValue, scalar_key: &str) -> Vec<(String, &'a JsonValue)> {
    match container_entries(value) {
        Some(entries) => entries,
        None if value.is_null() => Vec::new(),
        None => vec![(scalar_key.to_string(), value)],
    }
}

fn rows(builder: &mut TreeBuilder, entries: &[(String, &JsonValue)]) -> Vec<RenderedRow> {
    entries
        .iter()
        .map(|(key, value)| builder.top_row(key, value))
        .collect()
}

fn nothing_visible(query: &Query) -> RenderedView {
    RenderedView::empty(if query.is_empty() {
        ViewSummary::Empty
    } else {
        ViewSummary::NoMatch
    })
}

/// Translations: `{ group: { key: value } }`. Each non-empty group becomes a
/// collapsible section, open while a query is active.
pub fn render_translations(payload: &JsonValue, raw_query: &str) -> RenderedView {
    let query = Query::new(raw_query);
    let Some(groups) = payload.as_object().filter(|m| !m.is_empty()) else {
        return RenderedView::empty(ViewSummary::Empty);
    };

    let mut builder = TreeBuilder::new(query.clone());
    let mut rendered: Vec<RenderedGroup> = Vec::new();
    for (name, group) in groups {
        let Some(entries) = container_entries(group) else {
            continue;
        };
        let visible: Vec<_> = entries
            .into_iter()
            .filter(|(k, v)| entry_passes(&query, k, v))
            .collect();
        if visible.is_empty() {
            continue;
        }
        rendered.push(builder.group(Some(name.clone()), !query.is_empty(), |b| {
            rows(b, &visible)
        }));
    }

    if rendered.is_empty() {
        return nothing_visible(&query);
    }
    let count = rendered.len();
    builder.finish(rendered, ViewSummary::Listed(count))
}

/// Global variables: a flat list of the payload's entries in one untitled section.
pub fn render_global_vars(payload: &JsonValue, raw_query: &str) -> RenderedView {
    let query = Query::new(raw_query);
    let entries = entries_or_scalar(payload, statics::EN_SCALAR_ENTRY_KEY);
    if entries.is_empty() {
        return RenderedView::empty(ViewSummary::Empty);
    }

    let visible: Vec<_> = entries
        .into_iter()
        .filter(|(k, v)| entry_passes(&query, k, v))
        .collect();
    if visible.is_empty() {
        return RenderedView::empty(ViewSummary::NoMatch);
    }

    let count = visible.len();
    let mut builder = TreeBuilder::new(query);
    let group = builder.group(None, true, |b| rows(b, &visible));
    builder.finish(vec![group], ViewSummary::Listed(count))
}

/// One element of the block variables array.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockVarsEntry {
    pub name: Option<String>,
    pub vars: Option<JsonValue>,
}

impl BlockVarsEntry {
    /// `None` for falsy elements, which are skipped entirely.
    pub fn from_value(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null | JsonValue::Bool(false) => None,
            JsonValue::Number(n) if n.as_f64() == 0.0 => None,
            JsonValue::String(s) if s.is_empty() => None,
            JsonValue::Object(map) => Some(Self {
                name: map.get("name").and_then(block_name),
                vars: map.get("vars").cloned(),
            }),
            _ => Some(Self::default()),
        }
    }

    /// The block's own name, or "Block n" using its 1-based position.
    pub fn display_name(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{} {}", statics::EN_BLOCK_DEFAULT_PREFIX, index + 1),
        }
    }

    fn entries(&self) -> Vec<(String, &JsonValue)> {
        match &self.vars {
            Some(vars) => match container_entries(vars) {
                Some(entries) => entries,
                None => vec![(statics::EN_BLOCK_SCALAR_ENTRY_KEY.to_string(), vars)],
            },
            None => Vec::new(),
        }
    }
}

fn block_name(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null | JsonValue::Bool(false) => None,
        JsonValue::String(s) if s.is_empty() => None,
        JsonValue::Number(n) if n.as_f64() == 0.0 => None,
        other => Some(other.display_text()),
    }
}

/// Block variables: `[{ name, vars }]`, one collapsible section per block.
///
/// While filtering, a block whose name matches keeps all of its entries; otherwise
/// only matching entries stay and a block left with none is dropped.
pub fn render_block_vars(payload: &JsonValue, raw_query: &str) -> RenderedView {
    let query = Query::new(raw_query);
    let Some(blocks) = payload.as_array().filter(|b| !b.is_empty()) else {
        return RenderedView::empty(ViewSummary::Empty);
    };

    let mut builder = TreeBuilder::new(query.clone());
    let mut rendered: Vec<RenderedGroup> = Vec::new();
    for (index, element) in blocks.iter().enumerate() {
        let Some(block) = BlockVarsEntry::from_value(element) else {
            continue;
        };
        let name = block.display_name(index);
        let entries = block.entries();

        let group = if query.is_empty() {
            if entries.is_empty() {
                continue;
            }
            builder.group(Some(name), false, |b| rows(b, &entries))
        } else {
            let name_hit = query.matches(&name);
            let visible: Vec<_> = entries
                .into_iter()
                .filter(|(k, v)| name_hit || entry_passes(&query, k, v))
                .collect();
            if visible.is_empty() && !name_hit {
                continue;
            }
            let mut group = builder.group(Some(name), true, |b| rows(b, &visible));
            if visible.is_empty() {
                group.placeholder = Some(statics::EN_BLOCK_NO_VARS);
            }
            group
        };
        rendered.push(group);
    }

    if rendered.is_empty() {
        return nothing_visible(&query);
    }
    let count = rendered.len();
    builder.finish(rendered, ViewSummary::Listed(count))
}
