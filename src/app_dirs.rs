use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", "quotype")
            .map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("quotype_config.json"))
    }

    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("quotype");
            Some(state_dir.join("quotype.log"))
        } else {
            ProjectDirs::from("", "", "quotype")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("quotype.log"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_json() {
        let path = AppDirs::config_path();
        assert_eq!(path.file_name().unwrap(), "config.json");
    }

    #[test]
    fn log_path_names_app() {
        if let Some(path) = AppDirs::log_path() {
            assert_eq!(path.file_name().unwrap(), "quotype.log");
        }
    }
}
