use chrono::Utc;
use log::{debug, error, info, warn};
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::configuration::types::OsFamily;
use crate::container_management::api::ContainerApi;
use crate::container_management::image::{describe_image, image_alias, matching_images};
use crate::container_management::types::{
    ContainerHandle, ContainerStatus, ExecOutput, StateAction,
};
use crate::error_handling::types::ContainerError;
use crate::prompt::Prompter;

pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

const AUTHORIZED_KEYS_PATH: &str = "/root/.ssh/authorized_keys";

/// Drives the lifecycle of the single container created by a run.
///
/// All daemon access goes through the [`ContainerApi`] held by the manager.
/// The manager adds the workflow rules on top of it:
/// - a container counts as running only once `eth0` has an IPv4 address;
/// - a failed start gets exactly one stop/start recovery;
/// - unrecoverable start failures remove the container before returning.
pub struct ContainerManager<A: ContainerApi> {
    api: A,
    image_server: String,
    network_timeout: Duration,
    poll_interval: Duration,
}

impl<A: ContainerApi> ContainerManager<A> {
    pub fn new(api: A, image_server: impl Into<String>) -> Self {
        ContainerManager {
            api,
            image_server: image_server.into(),
            network_timeout: DEFAULT_NETWORK_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides how long, and how often, the network address is polled.
    pub fn with_network_wait(mut self, timeout: Duration, poll_interval: Duration) -> Self {
        self.network_timeout = timeout;
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn image_exists(&self, os: OsFamily, release: &str) -> Result<bool, ContainerError> {
        let images = self.api.list_images().await?;
        let found = !matching_images(&images, os.as_str(), release).is_empty();
        debug!("Image {} present locally: {}", image_alias(os.as_str(), release), found);
        Ok(found)
    }

    /// Fingerprint of the local image for `os`/`release`.
    ///
    /// When several images match, the user picks one.
    pub async fn resolve_fingerprint<P: Prompter + ?Sized>(
        &self,
        prompter: &P,
        os: OsFamily,
        release: &str,
    ) -> Result<String, ContainerError> {
        let images = self.api.list_images().await?;
        let candidates = matching_images(&images, os.as_str(), release);

        match candidates.as_slice() {
            [] => Err(ContainerError::ImageNotFound(image_alias(os.as_str(), release))),
            [single] => Ok(single.fingerprint.clone()),
            many => {
                let now = Utc::now();
                let choices: Vec<String> =
                    many.iter().map(|image| describe_image(image, now)).collect();
                let picked = prompter.choose("Choose image", &choices)?;
                many.get(picked)
                    .map(|image| image.fingerprint.clone())
                    .ok_or_else(|| {
                        ContainerError::ImageNotFound(image_alias(os.as_str(), release))
                    })
            }
        }
    }

    pub async fn download_image(&self, os: OsFamily, release: &str) -> Result<(), ContainerError> {
        let alias = image_alias(os.as_str(), release);
        info!("Downloading image {} from {}", alias, self.image_server);
        self.api.download_image(&self.image_server, &alias).await?;
        info!("Image {} downloaded", alias);
        Ok(())
    }

    pub async fn container_exists(&self, name: &str) -> Result<bool, ContainerError> {
        self.api.container_exists(name).await
    }

    pub async fn create_container(
        &self,
        name: &str,
        fingerprint: &str,
    ) -> Result<ContainerHandle, ContainerError> {
        info!("Creating container {}", name);
        self.api.create_container(name, fingerprint).await?;
        debug!("Container {} created from image {}", name, fingerprint);
        Ok(ContainerHandle::new(name, fingerprint))
    }

    /// Starts the container and waits for its IPv4 address.
    ///
    /// A start error triggers one [`restart`](Self::restart). If that fails
    /// too, or no address shows up in time, the container is deleted and the
    /// original failure is returned.
    pub async fn start_container(
        &self,
        handle: &mut ContainerHandle,
    ) -> Result<Ipv4Addr, ContainerError> {
        info!("Starting container {}", handle.name);

        let result = match self.api.change_state(&handle.name, StateAction::Start).await {
            Ok(()) => self.wait_for_network(handle).await,
            Err(e) => {
                warn!("Unable to start container {}: {}. Trying restart.", handle.name, e);
                self.restart(handle).await
            }
        };

        match result {
            Ok(address) => Ok(address),
            Err(e) => {
                error!("Container {} failed to start: {}", handle.name, e);
                if let Err(cleanup) = self.delete_container(handle).await {
                    error!("Unable to delete container {}: {}", handle.name, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Stop followed by start, then waits for the network again.
    pub async fn restart(&self, handle: &mut ContainerHandle) -> Result<Ipv4Addr, ContainerError> {
        debug!("Restarting container {}", handle.name);
        if let Err(e) = self.api.change_state(&handle.name, StateAction::Stop).await {
            debug!("Stop before restart of {} failed: {}", handle.name, e);
        }
        handle.status = ContainerStatus::Stopped;

        self.api.change_state(&handle.name, StateAction::Start).await?;
        self.wait_for_network(handle).await
    }

    /// Polls `eth0` until it has an IPv4 address.
    ///
    /// At most `timeout / poll_interval` polls are made (at least one), one
    /// interval apart.
    async fn wait_for_network(
        &self,
        handle: &mut ContainerHandle,
    ) -> Result<Ipv4Addr, ContainerError> {
        let polls = (self.network_timeout.as_millis() / self.poll_interval.as_millis()).max(1);

        for attempt in 1..=polls {
            let state = self.api.container_state(&handle.name).await?;
            if let Some(address) = state.eth0_ipv4() {
                info!("Container {} is reachable at {}", handle.name, address);
                handle.address = Some(address);
                handle.status = ContainerStatus::Running;
                return Ok(address);
            }

            debug!(
                "Waiting for network of {} ({}/{})",
                handle.name, attempt, polls
            );
            if attempt < polls {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        Err(ContainerError::NetworkTimeout(format!(
            "Container {} got no network address within {}s",
            handle.name,
            self.network_timeout.as_secs()
        )))
    }

    /// Runs `command` through `sh -c` inside the container.
    pub async fn run_command(
        &self,
        handle: &ContainerHandle,
        command: &str,
    ) -> Result<ExecOutput, ContainerError> {
        debug!("Exec in {}: {}", handle.name, command);
        let argv = vec!["sh".to_string(), "-c".to_string(), command.to_string()];
        let output = self.api.exec(&handle.name, &argv).await?;

        if !output.stdout.trim().is_empty() {
            debug!("{}", output.stdout.trim_end());
        }
        if output.exit_code != 0 {
            return Err(ContainerError::CommandFailed {
                command: command.to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }

    pub async fn install_ssh_server(
        &self,
        handle: &ContainerHandle,
        os: OsFamily,
    ) -> Result<(), ContainerError> {
        info!("Installing SSH server");
        for command in ssh_install_commands(os) {
            self.run_command(handle, command).await?;
        }
        Ok(())
    }

    /// Installs `key` as root's only authorized key.
    pub async fn push_public_key(
        &self,
        handle: &ContainerHandle,
        key: &[u8],
    ) -> Result<(), ContainerError> {
        info!("Pushing SSH public key");
        match self.run_command(handle, "mkdir /root/.ssh").await {
            Ok(_) => {}
            Err(ContainerError::CommandFailed { stderr, .. }) => {
                debug!("/root/.ssh not created: {}", stderr.trim());
            }
            Err(e) => return Err(e),
        }
        self.run_command(handle, "chmod 700 /root/.ssh").await?;

        self.api
            .push_file(&handle.name, AUTHORIZED_KEYS_PATH, key, 0o600)
            .await?;
        self.run_command(handle, &format!("chmod 600 {}", AUTHORIZED_KEYS_PATH))
            .await?;
        Ok(())
    }

    /// Stops (best effort) and deletes the container.
    pub async fn delete_container(&self, handle: &mut ContainerHandle) -> Result<(), ContainerError> {
        warn!("Deleting container {}", handle.name);
        if let Err(e) = self.api.change_state(&handle.name, StateAction::Stop).await {
            debug!("Stop before delete of {} failed: {}", handle.name, e);
        }
        handle.status = ContainerStatus::Stopped;

        self.api.delete_container(&handle.name).await?;
        handle.status = ContainerStatus::Deleted;
        handle.address = None;
        Ok(())
    }
}

fn ssh_install_commands(os: OsFamily) -> &'static [&'static str] {
    match os {
        OsFamily::Ubuntu => &[
            "apt-get update",
            "apt-get -y install openssh-server",
        ],
        OsFamily::Centos => &[
            "yum -y install openssh-server",
            "systemctl enable sshd",
            "systemctl start sshd",
        ],
    }
}
