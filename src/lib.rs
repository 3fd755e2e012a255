//! JSONLQuill: a terminal editor for instruction/input/output JSONL
//! datasets.

pub mod app;
pub mod config;
pub mod dialogs;
pub mod duplicates;
pub mod error;
pub mod file_browser;
pub mod history;
pub mod input;
pub mod jsonl;
pub mod logging;
pub mod pane;
pub mod prompt;
pub mod record;
pub mod session;
pub mod store;
pub mod theme;
pub mod ui;
