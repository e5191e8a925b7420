use log::{debug, error, warn};
use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use crate::configuration::config::Config;
use crate::configuration::types::OsFamily;
use crate::container_management::image::image_alias;
use crate::container_management::naming::{is_valid_name, random_name};
use crate::container_management::{ContainerApi, ContainerHandle, ContainerManager};
use crate::error_handling::types::WorkflowError;
use crate::host_registration::HostRegistrar;
use crate::key_management::{KeyManager, KeyPair};
use crate::playbook_runner::{discover_playbooks, select_playbooks, BatchReport, PlaybookRunner};
use crate::prompt::Prompter;

/// Steps of a run, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    KeysResolved,
    ImageResolved,
    ContainerCreated,
    ContainerRunning,
    SshProvisioned,
    HostRegistered,
    PlaybooksRun,
    Reported,
}

/// What the user needs to reach the new container.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub os: OsFamily,
    pub release: String,
    pub container_name: String,
    pub address: Ipv4Addr,
    /// Hostname when it was registered, the address otherwise.
    pub host: String,
    /// Private key for SSH login; `None` when SSH was not provisioned.
    pub private_key: Option<PathBuf>,
    pub playbooks: Option<BatchReport>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Your container info:")?;
        writeln!(f, "    OS: {}", self.os.display_name())?;
        writeln!(f, "    OS Version: {}", self.release)?;
        writeln!(f, "    Name of container: {}", self.container_name)?;
        write!(f, "    Host: {}", self.host)?;
        if let Some(key) = &self.private_key {
            write!(
                f,
                "\n\nYou can login into container through SSH: ssh -o IdentitiesOnly=yes -i {} root@{}",
                key.display(),
                self.host
            )?;
        }
        Ok(())
    }
}

/// Result of the SSH dependent part of a run.
struct Provisioned {
    host: String,
    playbooks: Option<BatchReport>,
}

/// Runs the whole workflow for one container.
///
/// Every fatal error after the container was created removes it before the
/// error is returned, so a failed run leaves nothing behind on the daemon.
pub struct Controller<A: ContainerApi, P: Prompter> {
    config: Config,
    manager: ContainerManager<A>,
    prompter: P,
    keys: KeyManager,
    registrar: HostRegistrar,
    runner: PlaybookRunner,
    stage: Stage,
}

impl<A: ContainerApi, P: Prompter> Controller<A, P> {
    pub fn new(
        config: Config,
        manager: ContainerManager<A>,
        prompter: P,
        keys: KeyManager,
        registrar: HostRegistrar,
        runner: PlaybookRunner,
    ) -> Self {
        Controller {
            config,
            manager,
            prompter,
            keys,
            registrar,
            runner,
            stage: Stage::Init,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn manager(&self) -> &ContainerManager<A> {
        &self.manager
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    fn advance(&mut self, stage: Stage) {
        debug!("Stage {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    pub async fn run(&mut self) -> Result<RunSummary, WorkflowError> {
        let name = self.resolve_name().await?;

        let keys = self.keys.resolve_keys(
            &self.prompter,
            self.config.ssh_private_key.as_deref(),
            self.config.ssh_public_key.as_deref(),
            &name,
        )?;
        self.advance(Stage::KeysResolved);

        let fingerprint = self.resolve_image().await?;
        self.advance(Stage::ImageResolved);

        let mut handle = self.manager.create_container(&name, &fingerprint).await?;
        self.advance(Stage::ContainerCreated);

        // deletes the container itself when it cannot be started
        let address = self.manager.start_container(&mut handle).await?;
        self.advance(Stage::ContainerRunning);

        let provisioned = match keys.key_pair() {
            Some(pair) => match self.provision(&handle, pair, address).await {
                Ok(provisioned) => provisioned,
                Err(e) => {
                    self.discard(&mut handle).await;
                    return Err(e);
                }
            },
            None => {
                warn!("SSH is disabled: SSH server, hosts file and playbooks are skipped");
                Provisioned {
                    host: address.to_string(),
                    playbooks: None,
                }
            }
        };

        self.advance(Stage::Reported);
        Ok(RunSummary {
            os: self.config.os,
            release: self.config.release.clone(),
            container_name: name,
            address,
            host: provisioned.host,
            private_key: keys.key_pair().map(|pair| pair.private_key_path.clone()),
            playbooks: provisioned.playbooks,
        })
    }

    /// Picks a valid container name that is not taken yet.
    async fn resolve_name(&self) -> Result<String, WorkflowError> {
        let mut candidate = self
            .config
            .container_name
            .clone()
            .unwrap_or_else(random_name);

        loop {
            if !is_valid_name(&candidate) {
                warn!(
                    "{} is not a valid container name: use letters, digits and hyphens, starting with a letter",
                    candidate
                );
            } else if self.manager.container_exists(&candidate).await? {
                warn!("Container {} already exists", candidate);
            } else {
                debug!("Container name: {}", candidate);
                return Ok(candidate);
            }

            let answer = self
                .prompter
                .input_text("New container name (leave empty for a random one)")?;
            candidate = match answer.trim() {
                "" => random_name(),
                name => name.to_string(),
            };
        }
    }

    /// Finds the image, downloading it first when the user agrees.
    async fn resolve_image(&self) -> Result<String, WorkflowError> {
        let os = self.config.os;
        let release = self.config.release.as_str();

        if !self.manager.image_exists(os, release).await? {
            warn!(
                "Image {} {} does not exist in local LXD storage.",
                os.display_name(),
                release
            );
            if !self.prompter.confirm("Do you want to download image", true)? {
                return Err(WorkflowError::DownloadDeclined(image_alias(os.as_str(), release)));
            }
            self.manager.download_image(os, release).await?;
        }

        Ok(self
            .manager
            .resolve_fingerprint(&self.prompter, os, release)
            .await?)
    }

    async fn provision(
        &mut self,
        handle: &ContainerHandle,
        pair: &KeyPair,
        address: Ipv4Addr,
    ) -> Result<Provisioned, WorkflowError> {
        self.manager
            .install_ssh_server(handle, self.config.os)
            .await?;
        self.manager
            .push_public_key(handle, &pair.public_key)
            .await?;
        self.advance(Stage::SshProvisioned);

        let registration = self
            .registrar
            .register(&self.prompter, &handle.name, address)
            .await?;
        let host = if registration.is_resolvable() {
            handle.name.clone()
        } else {
            address.to_string()
        };
        self.advance(Stage::HostRegistered);

        let playbooks = match self.config.playbooks_path.clone() {
            Some(directory) => {
                let (directory, candidates) = discover_playbooks(&self.prompter, &directory)?;
                let selected = select_playbooks(&self.prompter, &candidates)?;
                let report = self
                    .runner
                    .run_all(&directory, &selected, &address.to_string(), &pair.private_key_path)
                    .await;
                self.advance(Stage::PlaybooksRun);
                Some(report)
            }
            None => {
                warn!("Path to directory with Ansible playbooks is not set. Ansible was skipped.");
                None
            }
        };

        Ok(Provisioned { host, playbooks })
    }

    /// Removes the container after a fatal error.
    async fn discard(&self, handle: &mut ContainerHandle) {
        if let Err(e) = self.manager.delete_container(handle).await {
            error!("Unable to delete container {}: {}", handle.name, e);
        }
    }
}
