use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::jsonl::JSONL_FILE_EXT;

/// Directory listing used by the open and save dialogs.
pub struct FileBrowser {
    pub current_dir: PathBuf,
    pub entries: Vec<PathBuf>,
    pub selected_idx: usize,
    filter: Option<String>,
    pub filename_input: String,
    pub is_editing_filename: bool,
}

impl Default for FileBrowser {
    fn default() -> Self {
        FileBrowser::new()
    }
}

impl FileBrowser {
    pub fn new() -> Self {
        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        FileBrowser::in_dir(current_dir)
    }

    pub fn in_dir(dir: PathBuf) -> Self {
        let filter = Some(JSONL_FILE_EXT.to_string());
        let entries = Self::scan_directory(&dir, filter.as_deref());
        FileBrowser {
            current_dir: dir,
            entries,
            selected_idx: 0,
            filter,
            filename_input: String::new(),
            is_editing_filename: false,
        }
    }

    // ".." first, then directories, then matching files; hidden entries skipped
    fn scan_directory(dir: &Path, filter_ext: Option<&str>) -> Vec<PathBuf> {
        let mut entries = Vec::new();
        if dir.parent().is_some() {
            entries.push(dir.join(".."));
        }

        let read_dir = match fs::read_dir(dir) {
            Ok(read_dir) => read_dir,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "could not read directory");
                return entries;
            }
        };

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in read_dir.flatten() {
            let path = entry.path();
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |s| s.starts_with('.'));
            if hidden {
                continue;
            }
            if path.is_dir() {
                dirs.push(path);
            } else if path.is_file() {
                let matches = match filter_ext {
                    Some(ext) => path.extension().and_then(|e| e.to_str()) == Some(ext),
                    None => true,
                };
                if matches {
                    files.push(path);
                }
            }
        }

        dirs.sort_by_key(|d| d.file_name().unwrap_or_default().to_ascii_lowercase());
        files.sort_by_key(|f| f.file_name().unwrap_or_default().to_ascii_lowercase());
        entries.append(&mut dirs);
        entries.append(&mut files);
        entries
    }

    pub fn refresh(&mut self) {
        self.entries = Self::scan_directory(&self.current_dir, self.filter.as_deref());
        self.selected_idx = self.selected_idx.min(self.entries.len().saturating_sub(1));
    }

    pub fn navigate_up(&mut self) {
        self.selected_idx = self.selected_idx.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        if self.selected_idx + 1 < self.entries.len() {
            self.selected_idx += 1;
        }
    }

    /// Enters the selected directory. Returns false when the selection is a
    /// file.
    pub fn enter_directory(&mut self) -> bool {
        let Some(selected_path) = self.selected_path() else {
            return false;
        };

        let target = if is_parent_entry(&selected_path) {
            match self.current_dir.parent() {
                Some(parent) => parent.to_path_buf(),
                None => return false,
            }
        } else if selected_path.is_dir() {
            fs::canonicalize(&selected_path).unwrap_or(selected_path)
        } else {
            return false;
        };

        self.current_dir = target;
        self.entries = Self::scan_directory(&self.current_dir, self.filter.as_deref());
        self.selected_idx = 0;
        self.filename_input.clear();
        self.is_editing_filename = false;
        true
    }

    pub fn selected_path(&self) -> Option<PathBuf> {
        self.entries.get(self.selected_idx).cloned()
    }

    /// Existing file under the cursor, if any.
    pub fn selected_file(&self) -> Option<PathBuf> {
        self.selected_path().filter(|p| p.is_file())
    }

    /// Target for a save: the typed filename (given the `.jsonl` extension
    /// when it has none), else the selected file.
    pub fn save_target(&self) -> Option<PathBuf> {
        let name = self.filename_input.trim();
        if name.is_empty() {
            return self.selected_file();
        }
        let mut path = self.current_dir.join(name);
        if path.extension().is_none() {
            path.set_extension(JSONL_FILE_EXT);
        }
        Some(path)
    }

    pub fn prepare_for_save(&mut self, suggested: &str) {
        self.refresh();
        self.filename_input = suggested.to_string();
        self.is_editing_filename = true;
    }

    pub fn prepare_for_open(&mut self) {
        self.refresh();
        self.filename_input.clear();
        self.is_editing_filename = false;
    }

    pub fn get_entries_for_display(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|path| {
                if is_parent_entry(path) {
                    return "⬆️  ../".to_string();
                }
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("[invalid path]");
                if path.is_dir() {
                    format!("📁 {}/", name)
                } else {
                    format!("📄 {}", name)
                }
            })
            .collect()
    }
}

// `file_name()` is None for a trailing "..", so compare components instead
fn is_parent_entry(path: &Path) -> bool {
    path.ends_with("..")
}
