use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn history_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("keyrate");
            Some(state_dir.join("history.json"))
        } else {
            ProjectDirs::from("", "", "keyrate")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("history.json"))
        }
    }
}
