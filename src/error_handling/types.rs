use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    InvalidEndpoint(String),
    UnsupportedRelease(String),
    MissingHome,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::InvalidEndpoint(e) => write!(f, "Invalid LXD endpoint: {}", e),
            ConfigError::UnsupportedRelease(e) => write!(f, "Unsupported OS release: {}", e),
            ConfigError::MissingHome => write!(f, "Unable to determine the home directory"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

#[derive(Debug)]
pub enum PromptError {
    Terminal(String),
    Cancelled,
    TooManyAttempts(String),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::Terminal(e) => write!(f, "Terminal error: {}", e),
            PromptError::Cancelled => write!(f, "Cancelled by user"),
            PromptError::TooManyAttempts(e) => write!(f, "Too many failed attempts: {}", e),
        }
    }
}

impl std::error::Error for PromptError {}

#[derive(Debug)]
pub enum KeyError {
    IoError(std::io::Error),
    WriteFailed(String),
    EncodingFailed(String),
    GenerationFailed(String),
    Prompt(PromptError),
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::IoError(e) => write!(f, "SSH key IO error: {}", e),
            KeyError::WriteFailed(e) => write!(f, "Unable to save SSH key: {}", e),
            KeyError::EncodingFailed(e) => write!(f, "SSH key encoding failed: {}", e),
            KeyError::GenerationFailed(e) => write!(f, "SSH key generation failed: {}", e),
            KeyError::Prompt(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for KeyError {}

impl From<std::io::Error> for KeyError {
    fn from(err: std::io::Error) -> Self {
        KeyError::IoError(err)
    }
}

impl From<PromptError> for KeyError {
    fn from(err: PromptError) -> Self {
        KeyError::Prompt(err)
    }
}

#[derive(Debug)]
pub enum ContainerError {
    ConnectionFailed(String),
    Api(String),
    InvalidResponse(String),
    ImageNotFound(String),
    NetworkTimeout(String),
    CommandFailed {
        command: String,
        exit_code: i64,
        stderr: String,
    },
    Prompt(PromptError),
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerError::ConnectionFailed(e) => write!(f, "LXD connection failed: {}", e),
            ContainerError::Api(e) => write!(f, "LXD API error: {}", e),
            ContainerError::InvalidResponse(e) => write!(f, "Unexpected LXD response: {}", e),
            ContainerError::ImageNotFound(e) => write!(f, "Image not found: {}", e),
            ContainerError::NetworkTimeout(e) => write!(f, "{}", e),
            ContainerError::CommandFailed {
                command,
                exit_code,
                stderr,
            } => {
                write!(f, "Got exit code {} while performing '{}' inside container", exit_code, command)?;
                if !stderr.trim().is_empty() {
                    write!(f, ": {}", stderr.trim())?;
                }
                Ok(())
            }
            ContainerError::Prompt(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ContainerError {}

impl From<reqwest::Error> for ContainerError {
    fn from(err: reqwest::Error) -> Self {
        ContainerError::ConnectionFailed(err.to_string())
    }
}

impl From<PromptError> for ContainerError {
    fn from(err: PromptError) -> Self {
        ContainerError::Prompt(err)
    }
}

#[derive(Debug)]
pub enum HostsError {
    IoError(std::io::Error),
    InvalidHostname(String),
    InvalidAddress(String),
    Conflict(String),
    AuthenticationFailed,
    HelperFailed(String),
    Prompt(PromptError),
}

impl fmt::Display for HostsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostsError::IoError(e) => write!(f, "Hosts file IO error: {}", e),
            HostsError::InvalidHostname(e) => write!(f, "Invalid hostname: {}", e),
            HostsError::InvalidAddress(e) => write!(f, "{} is not a valid IP address", e),
            HostsError::Conflict(e) => write!(f, "{}", e),
            HostsError::AuthenticationFailed => write!(f, "Authentication failure"),
            HostsError::HelperFailed(e) => write!(f, "Unable to fill hosts file: {}", e),
            HostsError::Prompt(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for HostsError {}

impl From<std::io::Error> for HostsError {
    fn from(err: std::io::Error) -> Self {
        HostsError::IoError(err)
    }
}

impl From<PromptError> for HostsError {
    fn from(err: PromptError) -> Self {
        HostsError::Prompt(err)
    }
}

#[derive(Debug)]
pub enum PlaybookError {
    IoError(std::io::Error),
    Prompt(PromptError),
}

impl fmt::Display for PlaybookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybookError::IoError(e) => write!(f, "Playbook IO error: {}", e),
            PlaybookError::Prompt(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PlaybookError {}

impl From<std::io::Error> for PlaybookError {
    fn from(err: std::io::Error) -> Self {
        PlaybookError::IoError(err)
    }
}

impl From<PromptError> for PlaybookError {
    fn from(err: PromptError) -> Self {
        PlaybookError::Prompt(err)
    }
}

#[derive(Debug)]
pub enum WorkflowError {
    MissingPrograms(Vec<String>),
    DownloadDeclined(String),
    Cancelled,
    Configuration(ConfigError),
    Key(KeyError),
    Container(ContainerError),
    Hosts(HostsError),
    Playbook(PlaybookError),
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowError::MissingPrograms(p) => {
                write!(f, "Required programs are not available: {}", p.join(", "))
            }
            WorkflowError::DownloadDeclined(e) => write!(f, "Image {} was not downloaded", e),
            WorkflowError::Cancelled => write!(f, "Cancelled by user"),
            WorkflowError::Configuration(e) => write!(f, "Configuration error: {}", e),
            WorkflowError::Key(e) => write!(f, "{}", e),
            WorkflowError::Container(e) => write!(f, "{}", e),
            WorkflowError::Hosts(e) => write!(f, "{}", e),
            WorkflowError::Playbook(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for WorkflowError {}

impl From<ConfigError> for WorkflowError {
    fn from(err: ConfigError) -> Self {
        WorkflowError::Configuration(err)
    }
}

impl From<KeyError> for WorkflowError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::Prompt(PromptError::Cancelled) => WorkflowError::Cancelled,
            other => WorkflowError::Key(other),
        }
    }
}

impl From<ContainerError> for WorkflowError {
    fn from(err: ContainerError) -> Self {
        match err {
            ContainerError::Prompt(PromptError::Cancelled) => WorkflowError::Cancelled,
            other => WorkflowError::Container(other),
        }
    }
}

impl From<HostsError> for WorkflowError {
    fn from(err: HostsError) -> Self {
        match err {
            HostsError::Prompt(PromptError::Cancelled) => WorkflowError::Cancelled,
            other => WorkflowError::Hosts(other),
        }
    }
}

impl From<PlaybookError> for WorkflowError {
    fn from(err: PlaybookError) -> Self {
        match err {
            PlaybookError::Prompt(PromptError::Cancelled) => WorkflowError::Cancelled,
            other => WorkflowError::Playbook(other),
        }
    }
}

impl From<PromptError> for WorkflowError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::Cancelled => WorkflowError::Cancelled,
            other => WorkflowError::Container(ContainerError::Prompt(other)),
        }
    }
}
