use log::{debug, error, warn};

use crate::configuration::settings::ProgramSettings;
use crate::error_handling::types::WorkflowError;

/// Whether `program --version` runs successfully.
pub fn is_program_available(program: &str) -> bool {
    let available = std::process::Command::new(program)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);
    debug!("Program {} available: {}", program, available);
    available
}

/// Fails when a required program is missing; missing recommended ones only warn.
pub fn check_programs(settings: &ProgramSettings) -> Result<(), WorkflowError> {
    let missing: Vec<String> = settings
        .required
        .iter()
        .filter(|program| !is_program_available(program))
        .cloned()
        .collect();
    for program in &missing {
        error!("Could not find {} executable.", program);
    }

    let mut recommended_missing = false;
    for program in &settings.recommended {
        if !is_program_available(program) {
            warn!("Could not find {} executable.", program);
            recommended_missing = true;
        }
    }
    if recommended_missing {
        warn!("It is not necessary but recommended.");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(WorkflowError::MissingPrograms(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn fake_program(dir: &TempDir, name: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_missing_required_program_is_fatal() {
        let dir = TempDir::new().unwrap();
        let present = fake_program(&dir, "lxc");
        let absent = dir.path().join("lxd").to_string_lossy().to_string();
        let settings = ProgramSettings {
            required: vec![present, absent.clone()],
            recommended: vec![],
        };

        match check_programs(&settings) {
            Err(WorkflowError::MissingPrograms(missing)) => assert_eq!(missing, vec![absent]),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_recommended_program_only_warns() {
        let dir = TempDir::new().unwrap();
        let settings = ProgramSettings {
            required: vec![fake_program(&dir, "lxc")],
            recommended: vec![dir.path().join("ansible").to_string_lossy().to_string()],
        };

        assert!(check_programs(&settings).is_ok());
    }
}
