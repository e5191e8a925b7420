use clap::Parser;
use std::path::{Path, PathBuf};

use super::settings::Settings;
use super::types::OsFamily;
use crate::container_management::release::resolve_release;
use crate::error_handling::types::ConfigError;

/// Command-line arguments of `lazy-lxd`.
///
/// The flags only describe the container of this run. Everything about the
/// environment (daemon endpoint, hosts file, timeouts) comes from the
/// [`Settings`] file named by `--config`.
///
/// # Examples
///
/// ```
/// use clap::Parser;
/// use lazy_lxd::configuration::config::CliArgs;
///
/// let args = CliArgs::try_parse_from(["lazy-lxd", "-n", "web", "--os", "centos"]).unwrap();
/// assert_eq!(args.container_name.as_deref(), Some("web"));
/// ```
#[derive(Parser, Debug, Clone)]
#[command(name = "lazy-lxd")]
#[command(version)]
#[command(
    about = "A tool will create LXD container and then running Ansible playbooks onto it.\nOpenSSH-server will be deployed by default."
)]
pub struct CliArgs {
    /// Name of created container. Will bonded with container ip addr.
    ///
    /// By default a random name is generated.
    ///
    /// # Command Line
    /// Use `-n <name>` or `--name <name>`
    #[arg(short = 'n', long = "name", value_name = "name")]
    pub container_name: Option<String>,

    /// Name of LXC OS template
    #[arg(long = "os", value_enum, default_value_t = OsFamily::Ubuntu)]
    pub os: OsFamily,

    /// Codename or version of OS release. Default: ubuntu - bionic; centos - 8
    #[arg(long = "release", value_name = "release")]
    pub release: Option<String>,

    /// Private ssh key if you want use an existing one. Otherwise it will be generated.
    #[arg(long = "ssh-key-private", value_name = "key", value_parser = existing_file)]
    pub ssh_private_key: Option<PathBuf>,

    /// Public ssh key if you want use an existing one. Otherwise it will be generated.
    #[arg(long = "ssh-key-public", value_name = "key", value_parser = existing_file)]
    pub ssh_public_key: Option<PathBuf>,

    /// Path to directory with Ansible playbooks which needs to run into container.
    #[arg(long = "playbooks-path", value_name = "path", value_parser = existing_directory)]
    pub playbooks_path: Option<PathBuf>,

    /// Verbose output. Print more information about being committed actions.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::SetTrue)]
    pub verbose: bool,

    /// Settings file (TOML). Defaults to `<config_dir>/lazy-lxd/config.toml` when present.
    #[arg(long = "config", value_name = "file", env = "LAZY_LXD_CONFIG")]
    pub config: Option<PathBuf>,
}

fn existing_file(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("File {} is not exists.", raw))
    }
}

fn existing_directory(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("Directory {} is not exists.", raw))
    }
}

impl CliArgs {
    /// Parses the process arguments, exiting with a usage message when they are invalid.
    pub fn from_args() -> Self {
        CliArgs::parse()
    }
}

/// Resolved configuration of one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub container_name: Option<String>,
    pub os: OsFamily,
    /// Canonical release: Ubuntu codename or numeric CentOS version.
    pub release: String,
    pub ssh_private_key: Option<PathBuf>,
    pub ssh_public_key: Option<PathBuf>,
    pub playbooks_path: Option<PathBuf>,
    pub verbose: bool,
    pub settings: Settings,
}

impl Config {
    /// Builds the run configuration from the arguments and the settings file they point to.
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let settings = Settings::load(args.config.as_deref())?;
        Self::with_settings(args, settings)
    }

    pub fn with_settings(args: CliArgs, settings: Settings) -> Result<Self, ConfigError> {
        let release = resolve_release(args.os, args.release.as_deref())?;
        let container_name = args
            .container_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(Config {
            container_name,
            os: args.os,
            release,
            ssh_private_key: args.ssh_private_key,
            ssh_public_key: args.ssh_public_key,
            playbooks_path: args.playbooks_path,
            verbose: args.verbose,
            settings,
        })
    }

    pub fn playbooks_path(&self) -> Option<&Path> {
        self.playbooks_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Result<CliArgs, clap::Error> {
        let mut full = vec!["lazy-lxd"];
        full.extend_from_slice(args);
        CliArgs::try_parse_from(full)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]).unwrap_or_else(|e| panic!("{}", e));
        assert_eq!(args.os, OsFamily::Ubuntu);
        assert!(args.container_name.is_none());
        assert!(args.release.is_none());
        assert!(!args.verbose);

        let config = Config::with_settings(args, Settings::default()).unwrap();
        assert_eq!(config.release, "bionic");
    }

    #[test]
    fn test_from_args() {
        let dir = TempDir::new().unwrap();
        let key = dir.path().join("id_rsa");
        std::fs::write(&key, b"key").unwrap();

        let args = parse(&[
            "-n",
            "web01",
            "--os",
            "centos",
            "--release",
            "7",
            "--ssh-key-private",
            key.to_str().unwrap(),
            "--playbooks-path",
            dir.path().to_str().unwrap(),
            "-v",
        ])
        .unwrap_or_else(|e| panic!("{}", e));

        let config = Config::with_settings(args, Settings::default()).unwrap();
        assert_eq!(config.container_name.as_deref(), Some("web01"));
        assert_eq!(config.os, OsFamily::Centos);
        assert_eq!(config.release, "7");
        assert_eq!(config.ssh_private_key.as_deref(), Some(key.as_path()));
        assert_eq!(config.playbooks_path(), Some(dir.path()));
        assert!(config.verbose);
    }

    #[test]
    fn test_unknown_os_is_rejected() {
        assert!(parse(&["--os", "arch"]).is_err());
    }

    #[test]
    fn test_missing_paths_are_rejected() {
        assert!(parse(&["--playbooks-path", "/nonexistent/playbooks"]).is_err());
        assert!(parse(&["--ssh-key-private", "/nonexistent/id_rsa"]).is_err());
    }

    #[test]
    fn test_blank_name_means_generated() {
        let args = parse(&["-n", "  "]).unwrap();
        let config = Config::with_settings(args, Settings::default()).unwrap();
        assert!(config.container_name.is_none());
    }

    #[test]
    fn test_unsupported_release_is_a_configuration_error() {
        let args = parse(&["--os", "centos", "--release", "bionic"]).unwrap();
        let err = Config::with_settings(args, Settings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedRelease(_)));
    }
}
