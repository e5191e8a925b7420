//! Error types, one enum per subsystem plus [`types::WorkflowError`] for a whole run.

pub mod types;
