use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// user-saved gesture files
    pub fn gestures_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let data_dir = PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("scrawl");
            Some(data_dir.join("gestures"))
        } else {
            ProjectDirs::from("", "", "scrawl")
                .map(|proj_dirs| proj_dirs.data_dir().join("gestures"))
        }
    }

    /// outcome history database
    pub fn db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("scrawl");
            Some(state_dir.join("history.db"))
        } else {
            ProjectDirs::from("", "", "scrawl")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("history.db"))
        }
    }

    /// append-only log of commit outcomes
    pub fn log_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "scrawl").map(|proj_dirs| proj_dirs.config_dir().join("log.csv"))
    }
}
