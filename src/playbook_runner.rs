//! Playbook runner subsystem.
//!
//! Re-exports:
//! - [`PlaybookRunner`]: runs `ansible-playbook` against the container.
//! - [`discover_playbooks`], [`select_playbooks`]: interactive playbook choice.
//! - [`ExecutionResult`], [`BatchReport`]: per-playbook and batch outcomes.

pub mod discovery;
pub mod runner;
pub mod types;

pub use discovery::{discover_playbooks, select_playbooks};
pub use runner::PlaybookRunner;
pub use types::{BatchReport, ExecutionResult};
