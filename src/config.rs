//! User settings kept between runs.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::theme::ThemeName;

// Maximum number of recent files to remember
pub const MAX_RECENT_FILES: usize = 10;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: ThemeName,
    pub autosave_on_blur: bool,
    pub recent_files: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            theme: ThemeName::Light,
            autosave_on_blur: true,
            recent_files: Vec::new(),
        }
    }
}

impl Settings {
    /// Loads settings from `dir`, falling back to defaults when the file is
    /// missing or unreadable. Recent entries that no longer exist are dropped.
    pub fn load_from(dir: &Path) -> Self {
        let path = dir.join(SETTINGS_FILE);
        if !path.exists() {
            return Settings::default();
        }

        let mut settings = match fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str::<Settings>(&text).map_err(|e| e.to_string()))
        {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load settings, using defaults");
                return Settings::default();
            }
        };
        settings.recent_files.retain(|p| p.exists());
        settings.recent_files.truncate(MAX_RECENT_FILES);
        settings
    }

    pub fn save_to(&self, dir: &Path) -> std::io::Result<()> {
        fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(dir.join(SETTINGS_FILE), json)
    }

    /// Moves `path` to the front of the recent list.
    pub fn add_recent(&mut self, path: &Path) {
        let abs_path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.recent_files.retain(|p| p != &abs_path);
        self.recent_files.insert(0, abs_path);
        self.recent_files.truncate(MAX_RECENT_FILES);
    }
}

/// Per-user directory for settings and logs.
pub fn config_dir() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("jsonlquill")
    } else if let Some(home_dir) = dirs::home_dir() {
        home_dir.join(".jsonlquill")
    } else {
        PathBuf::from(".jsonlquill_config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load_from(dir.path()), Settings::default());
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        assert_eq!(Settings::load_from(dir.path()), Settings::default());
    }

    #[test]
    fn save_and_reload_keeps_existing_recent_files() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept.jsonl");
        fs::write(&kept, "").unwrap();

        let mut settings = Settings {
            theme: ThemeName::Dark,
            autosave_on_blur: false,
            recent_files: Vec::new(),
        };
        settings.recent_files.push(dir.path().join("gone.jsonl"));
        settings.add_recent(&kept);
        settings.save_to(dir.path()).unwrap();

        let loaded = Settings::load_from(dir.path());
        assert_eq!(loaded.theme, ThemeName::Dark);
        assert!(!loaded.autosave_on_blur);
        assert_eq!(loaded.recent_files, vec![fs::canonicalize(&kept).unwrap()]);
    }

    #[test]
    fn recent_list_is_deduplicated_and_capped() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        for i in 0..(MAX_RECENT_FILES + 3) {
            settings.add_recent(&dir.path().join(format!("f{i}.jsonl")));
        }
        settings.add_recent(&dir.path().join("f5.jsonl"));
        assert_eq!(settings.recent_files.len(), MAX_RECENT_FILES);
        assert!(settings.recent_files[0].ends_with("f5.jsonl"));
        assert_eq!(
            settings
                .recent_files
                .iter()
                .filter(|p| p.ends_with("f5.jsonl"))
                .count(),
            1
        );
    }
}
