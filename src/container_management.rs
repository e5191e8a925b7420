//! Container management subsystem.
//!
//! Talks to an LXD daemon to find or download an image, create and start the
//! container of a run, wait for its network, and prepare it for SSH access.
//!
//! Re-exports:
//! - [`ContainerManager`]: lifecycle operations and recovery rules.
//! - [`ContainerApi`], [`LxdRestApi`]: daemon interface and its REST implementation.
//! - [`ContainerHandle`], [`ContainerStatus`], [`ImageRecord`]: core types.
//!
//! Example (non-running):
//! ```ignore
//! use lazy_lxd::configuration::types::{LxdEndpoint, OsFamily};
//! use lazy_lxd::container_management::{ContainerManager, LxdRestApi};
//!
//! let api = LxdRestApi::new(&LxdEndpoint::default_socket(), std::time::Duration::from_secs(600))?;
//! let manager = ContainerManager::new(api, "https://images.linuxcontainers.org");
//! let mut handle = manager.create_container("quiet-lynx", "<fingerprint>").await?;
//! let address = manager.start_container(&mut handle).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod api;
pub mod container_manager;
#[cfg(test)]
pub mod fake;
pub mod image;
pub mod lxd_rest;
pub mod naming;
pub mod release;
#[cfg(test)]
pub mod tests;
pub mod types;

pub use api::ContainerApi;
pub use container_manager::ContainerManager;
pub use lxd_rest::LxdRestApi;
pub use types::{ContainerHandle, ContainerStatus, ImageRecord};
