//! Configuration of a run: command-line flags plus the optional settings file.

pub mod config;
pub mod settings;
pub mod types;

pub use config::{CliArgs, Config};
pub use settings::Settings;
pub use types::{LxdEndpoint, OsFamily};
