use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "wordclick";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// SQLite file holding persisted scores
    pub fn scores_db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME);
            Some(state_dir.join("scores.db"))
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().join("scores.db"))
        }
    }

    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("wordclick_config.json"))
    }
}
