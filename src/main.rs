use log::{error, info, LevelFilter};
use std::time::Duration;

use lazy_lxd::configuration::config::{CliArgs, Config};
use lazy_lxd::container_management::{ContainerManager, LxdRestApi};
use lazy_lxd::controller::{check_programs, Controller};
use lazy_lxd::error_handling::types::WorkflowError;
use lazy_lxd::host_registration::HostRegistrar;
use lazy_lxd::key_management::KeyManager;
use lazy_lxd::playbook_runner::PlaybookRunner;
use lazy_lxd::prompt::TerminalPrompter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::from_args();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .format_target(false)
        .format_timestamp(None)
        .init();

    let config = Config::from_args(args).unwrap_or_else(|e| {
        error!("Unable to load configuration: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = check_programs(&config.settings.programs) {
        error!("{}", e);
        std::process::exit(1);
    }

    let mut controller = build_controller(config).unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });

    match controller.run().await {
        Ok(summary) => info!("{}", summary),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn build_controller(
    config: Config,
) -> Result<Controller<LxdRestApi, TerminalPrompter>, WorkflowError> {
    let settings = config.settings.clone();

    let endpoint = settings.lxd.endpoint()?;
    info!("Connecting to LXD at {}", endpoint);
    let api = LxdRestApi::new(
        &endpoint,
        Duration::from_secs(settings.lxd.operation_timeout_secs),
    )?;
    let manager = ContainerManager::new(api, settings.lxd.image_server.clone())
        .with_network_wait(settings.network.timeout(), settings.network.poll_interval());

    let registrar = HostRegistrar::new(settings.hosts.helper_path()?, settings.hosts.file.clone());

    Ok(Controller::new(
        config,
        manager,
        TerminalPrompter::new(),
        KeyManager::from_home()?,
        registrar,
        PlaybookRunner::from_settings(&settings.ansible),
    ))
}
