//! Core library for T-Soft Devtools.
//! Reads the debug gate, translations, global and block variables of a T-Soft page
//! through a remote script evaluator, and renders them as searchable trees.

pub mod cdp;
pub mod config;
pub mod dataset;
mod envelope;
pub mod error;
pub mod evaluator;
pub mod fetcher;
pub mod filter;
pub mod gate;
mod gui;
pub mod inspector;
pub mod navigator;
pub mod render;
pub mod scripts;
pub mod state;
pub mod statics;
mod value;

pub use envelope::Envelope;
pub use gui::{GuiOptions, run_gui};
pub use value::{JsonNumber, JsonValue};
