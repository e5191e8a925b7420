//! Orchestration of a run.
//!
//! Re-exports:
//! - [`Controller`]: drives keys, image, container, SSH, hosts and playbooks in order.
//! - [`RunSummary`], [`Stage`]: result and progress of a run.
//! - [`check_programs`]: external program checks done before anything else.

pub mod controller_handler;
pub mod environment;

pub use controller_handler::{Controller, RunSummary, Stage};
pub use environment::check_programs;
