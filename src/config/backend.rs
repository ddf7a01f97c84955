//! Storage backends for the configuration document
//!
//! `SingleFile` keeps the whole document in one JSON file. `PerModule` keeps
//! one `<module>.json` file per module inside a directory.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::document::{ConfigDocument, ParsedDocument, to_pretty_json};
use crate::constants::config::{
    APP_DIR, DIR_ENV_VAR, FILENAME, MODULE_FILE_EXTENSION, MODULES_DIR,
};

/// Where and how the document is persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    SingleFile(PathBuf),
    PerModule(PathBuf),
}

/// Directory holding the application's configuration
///
/// `DPI_CONFIG_MANAGER_CONFIG_DIR` wins over the platform config directory.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DIR_ENV_VAR).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

impl StorageBackend {
    /// Single `config.json` in the default configuration directory
    pub fn default_single_file() -> Self {
        StorageBackend::SingleFile(config_dir().join(FILENAME))
    }

    /// `modules/` directory in the default configuration directory
    pub fn default_per_module() -> Self {
        StorageBackend::PerModule(config_dir().join(MODULES_DIR))
    }

    /// File or directory this backend persists to
    pub fn location(&self) -> &Path {
        match self {
            StorageBackend::SingleFile(path) | StorageBackend::PerModule(path) => path,
        }
    }

    /// Read the persisted document; `Ok(None)` when nothing has been written yet
    pub fn read(&self) -> Result<Option<ParsedDocument>> {
        match self {
            StorageBackend::SingleFile(path) => read_single_file(path),
            StorageBackend::PerModule(dir) => read_module_dir(dir),
        }
    }

    /// Persist the full document
    ///
    /// Returns the modules that were left out because their names cannot be
    /// stored; only `PerModule` can skip anything.
    pub fn write(&self, document: &ConfigDocument) -> Result<Vec<String>> {
        match self {
            StorageBackend::SingleFile(path) => {
                write_single_file(path, document)?;
                Ok(Vec::new())
            }
            StorageBackend::PerModule(dir) => write_module_dir(dir, document),
        }
    }
}

fn read_single_file(path: &Path) -> Result<Option<ParsedDocument>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {:?}", path))?;
    let parsed = ConfigDocument::from_json_str(&contents)
        .with_context(|| format!("Failed to parse JSON from {:?}", path))?;
    Ok(Some(parsed))
}

fn write_single_file(path: &Path, document: &ConfigDocument) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }
    let json = document.to_pretty_json()?;
    fs::write(path, json).with_context(|| format!("Failed to write config to {:?}", path))
}

/// File name for `module`, or `None` when the name cannot be a file name
fn module_file_name(module: &str) -> Option<String> {
    let unusable = module.is_empty()
        || module == "."
        || module == ".."
        || module.contains(['/', '\\', '\0']);
    (!unusable).then(|| format!("{}.{}", module, MODULE_FILE_EXTENSION))
}

/// Module files in `dir`, keyed by module name
fn list_module_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {:?}", dir))? {
        let path = entry?.path();
        if !path.is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(MODULE_FILE_EXTENSION)
        {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            files.push((stem.to_string(), path.clone()));
        }
    }
    Ok(files)
}

fn read_module_dir(dir: &Path) -> Result<Option<ParsedDocument>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let mut parsed = ParsedDocument::default();
    for (module, path) in list_module_files(dir)? {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read module file {:?}", path))?;
        parsed
            .add_module_json(&module, &contents)
            .with_context(|| format!("Failed to parse module file {:?}", path))?;
    }
    Ok(Some(parsed))
}

fn write_module_dir(dir: &Path, document: &ConfigDocument) -> Result<Vec<String>> {
    // Names are checked up front so one bad module cannot stop the others
    let mut files = Vec::new();
    let mut skipped = Vec::new();
    for (module, settings) in document.modules() {
        match module_file_name(module) {
            Some(file_name) => files.push((module, dir.join(file_name), settings)),
            None => skipped.push(module.to_string()),
        }
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create module directory {:?}", dir))?;

    let mut written = BTreeSet::new();
    for (module, path, settings) in files {
        let json = to_pretty_json(settings)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write module file {:?}", path))?;
        written.insert(module.to_string());
    }

    // Drop files of modules that were reset
    for (module, path) in list_module_files(dir)? {
        if !written.contains(&module) {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove stale module file {:?}", path))?;
            debug!(module = %module, "Removed stale module file");
        }
    }
    Ok(skipped)
}
