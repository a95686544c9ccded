// ── deskctl ──────────────────────────────────────────────────────────────────
//
// A code checker and a system control panel for the terminal. The dispatch
// core (checker, query, system_action) is pure; process, panel and the
// binary wrap it.

pub mod args;
pub mod checker;
pub mod config;
pub mod error;
pub mod logging;
pub mod panel;
pub mod process;
pub mod query;
pub mod scanner;
pub mod system_action;
pub mod theme;

pub use checker::{CheckCommand, CheckKind, FileActionResolver, FileCheckRequest};
pub use error::{DeskError, Result};
pub use query::{QueryKind, SearchQuery, classify};
pub use system_action::{SystemAction, SystemCommand, command_for};
