//! Roster file discovery.
//!
//! The input path may be a single roster file or a directory tree of
//! them. Directories are walked recursively and filtered by extension
//! and exclude list.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Configuration for file scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File extensions to include, without the dot (e.g., ["csv"])
    pub extensions: Vec<String>,
    /// Directory or file names to skip (e.g., ["archive"])
    pub excludes: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["csv".to_string()],
            excludes: Vec::new(),
        }
    }
}

impl From<&crate::config::ScannerConfig> for ScanConfig {
    fn from(config: &crate::config::ScannerConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            excludes: config.excludes.clone(),
        }
    }
}

/// Discovers roster files under an input path.
pub struct RosterScanner {
    config: ScanConfig,
    root: PathBuf,
}

impl RosterScanner {
    /// Create a new scanner.
    pub fn new(root: PathBuf, config: ScanConfig) -> Self {
        Self { config, root }
    }

    /// Return every roster file, sorted by path.
    ///
    /// A file root is returned as-is regardless of its extension.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            bail!("Input path does not exist: {}", self.root.display());
        }

        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded(entry));

        for entry in walker {
            let entry = entry
                .with_context(|| format!("Failed to walk {}", self.root.display()))?;

            if entry.file_type().is_file() && self.matches(entry.path()) {
                debug!("Found roster file: {}", entry.path().display());
                files.push(entry.into_path());
            }
        }

        if files.is_empty() {
            bail!(
                "No roster files found in {} (extensions: {})",
                self.root.display(),
                self.config.extensions.join(", ")
            );
        }

        files.sort();
        Ok(files)
    }

    /// Check if a file has one of the configured extensions.
    pub fn matches(&self, path: &Path) -> bool {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.config
            .extensions
            .iter()
            .any(|wanted| wanted.eq_ignore_ascii_case(ext))
    }

    /// Check if an entry is hidden or explicitly excluded.
    fn is_excluded(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();

        if name.starts_with('.') {
            return true;
        }

        self.config.excludes.iter().any(|pattern| name == pattern.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "IDNumber,Party name,Order Number\n").unwrap();
    }

    #[test]
    fn test_single_file_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("roster.txt");
        touch(&file);

        let scanner = RosterScanner::new(file.clone(), ScanConfig::default());
        assert_eq!(scanner.scan().unwrap(), vec![file]);
    }

    #[test]
    fn test_directory_walk_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.csv"));
        touch(&dir.path().join("a.CSV"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("province/c.csv"));
        touch(&dir.path().join(".hidden/d.csv"));
        touch(&dir.path().join("archive/e.csv"));

        let config = ScanConfig {
            excludes: vec!["archive".to_string()],
            ..ScanConfig::default()
        };
        let files = RosterScanner::new(dir.path().to_path_buf(), config)
            .scan()
            .unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.csv", "province/c.csv"]);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RosterScanner::new(dir.path().to_path_buf(), ScanConfig::default())
            .scan()
            .unwrap_err();
        assert!(err.to_string().contains("No roster files found"));
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let scanner = RosterScanner::new(PathBuf::from("/nonexistent/roster"), ScanConfig::default());
        assert!(scanner.scan().is_err());
    }
}
