//! Container daemon interface.
//!
//! [`ContainerApi`] is the boundary between the workflow logic in
//! [`ContainerManager`](super::ContainerManager) and the transport. The
//! production implementation is [`LxdRestApi`](super::lxd_rest::LxdRestApi);
//! tests use an in-memory fake.

use crate::container_management::types::{
    ContainerState, ExecOutput, ImageRecord, StateAction,
};
use crate::error_handling::types::ContainerError;

#[allow(async_fn_in_trait)]
pub trait ContainerApi {
    /// All images in the daemon's local store.
    async fn list_images(&self) -> Result<Vec<ImageRecord>, ContainerError>;

    /// Pulls `alias` (e.g. `ubuntu/bionic`) from a simplestreams `server`.
    async fn download_image(&self, server: &str, alias: &str) -> Result<(), ContainerError>;

    async fn container_exists(&self, name: &str) -> Result<bool, ContainerError>;

    /// Creates a stopped container from the image with `fingerprint`.
    async fn create_container(&self, name: &str, fingerprint: &str) -> Result<(), ContainerError>;

    async fn change_state(&self, name: &str, action: StateAction) -> Result<(), ContainerError>;

    async fn container_state(&self, name: &str) -> Result<ContainerState, ContainerError>;

    async fn delete_container(&self, name: &str) -> Result<(), ContainerError>;

    /// Runs `command` (argv) inside the container and waits for it.
    async fn exec(&self, name: &str, command: &[String]) -> Result<ExecOutput, ContainerError>;

    /// Writes `content` to `path` inside the container, owned by root.
    async fn push_file(
        &self,
        name: &str,
        path: &str,
        content: &[u8],
        mode: u32,
    ) -> Result<(), ContainerError>;
}
