use log::{error, warn};
use std::path::{Path, PathBuf};

use crate::error_handling::types::PlaybookError;
use crate::prompt::Prompter;

const PLAYBOOK_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// File names of the playbooks in `directory`, sorted.
pub fn list_playbooks(directory: &Path) -> Result<Vec<String>, PlaybookError> {
    let mut playbooks = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if !path.is_file() || !is_playbook(&path) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            playbooks.push(name.to_string());
        }
    }
    playbooks.sort();
    Ok(playbooks)
}

fn is_playbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| PLAYBOOK_EXTENSIONS.contains(&e))
}

/// Playbooks of `directory`, asking for another directory until one has some.
///
/// Returns the directory that was finally used together with its playbooks.
pub fn discover_playbooks<P: Prompter + ?Sized>(
    prompter: &P,
    directory: &Path,
) -> Result<(PathBuf, Vec<String>), PlaybookError> {
    let mut directory = directory.to_path_buf();
    loop {
        match list_playbooks(&directory) {
            Ok(playbooks) if !playbooks.is_empty() => return Ok((directory, playbooks)),
            Ok(_) => warn!("There are no playbooks in {}", directory.display()),
            Err(e) => error!("Unable to read {}: {}", directory.display(), e),
        }
        directory = ask_directory(prompter)?;
    }
}

fn ask_directory<P: Prompter + ?Sized>(prompter: &P) -> Result<PathBuf, PlaybookError> {
    loop {
        let answer = prompter.input_text("Path to directory with playbooks")?;
        let path = expand_home(answer.trim());
        if path.is_dir() {
            return Ok(path);
        }
        error!("{} is not a directory", path.display());
    }
}

fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

/// Name shown in the selection list: the file name without extension.
pub fn display_name(playbook: &str) -> &str {
    Path::new(playbook)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(playbook)
}

/// Lets the user pick playbooks; asks again while nothing is selected.
pub fn select_playbooks<P: Prompter + ?Sized>(
    prompter: &P,
    candidates: &[String],
) -> Result<Vec<String>, PlaybookError> {
    let labels: Vec<String> = candidates
        .iter()
        .map(|c| display_name(c).to_string())
        .collect();

    loop {
        let picked = prompter.checkbox("Choose playbooks", &labels)?;
        let selected: Vec<String> = picked
            .into_iter()
            .filter_map(|i| candidates.get(i).cloned())
            .collect();
        if !selected.is_empty() {
            return Ok(selected);
        }
        warn!("Select at least one playbook");
    }
}
