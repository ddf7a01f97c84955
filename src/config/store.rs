//! Module-scoped key/value configuration store
//!
//! The store is the only writer of its backing storage. Every mutation is
//! followed by a full synchronous persist; there is no batching and no
//! cross-process locking (one process, one owner of the document).

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::backend::StorageBackend;
use crate::config::document::{ConfigDocument, ModuleSettings, ParsedDocument};
use crate::config::events::{SaveOutcome, StoreEvent, StoreObserver, TracingObserver};
use crate::config::value::SettingValue;

pub struct ConfigStore {
    backend: StorageBackend,
    document: ConfigDocument,
    /// Defaults of every registered plugin, latest registration wins
    plugins: HashMap<String, ModuleSettings>,
    observer: Box<dyn StoreObserver>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("backend", &self.backend)
            .field("document", &self.document)
            .field("plugins", &self.plugins)
            .finish_non_exhaustive()
    }
}

impl ConfigStore {
    /// Open the store and load whatever is persisted, logging through `tracing`
    pub fn open(backend: StorageBackend) -> Self {
        Self::with_observer(backend, Box::new(TracingObserver))
    }

    /// Open the store with a custom persistence observer
    pub fn with_observer(backend: StorageBackend, observer: Box<dyn StoreObserver>) -> Self {
        let mut store = Self {
            backend,
            document: ConfigDocument::new(),
            plugins: HashMap::new(),
            observer,
        };
        store.load();
        store
    }

    pub fn backend(&self) -> &StorageBackend {
        &self.backend
    }

    pub fn path(&self) -> &Path {
        self.backend.location()
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// (Re)load the document from storage
    ///
    /// A missing file leaves the document as it is; an unreadable or invalid
    /// one empties it. Neither case is an error for the caller. Settings that
    /// are not scalars are dropped one by one and reported.
    pub fn load(&mut self) -> StoreEvent {
        let location = self.backend.location().to_path_buf();
        let event = match self.backend.read() {
            Ok(Some(parsed)) => {
                self.document = self.accept(&location, parsed);
                StoreEvent::Loaded {
                    location,
                    modules: self.document.len(),
                }
            }
            Ok(None) => StoreEvent::LoadSkipped { location },
            Err(e) => {
                self.document.clear();
                StoreEvent::LoadFailed {
                    location,
                    reason: format!("{:#}", e),
                }
            }
        };
        self.observer.on_event(&event);
        event
    }

    /// Report dropped entries and hand back the usable document
    fn accept(&self, location: &Path, parsed: ParsedDocument) -> ConfigDocument {
        for entry in parsed.dropped {
            self.observer.on_event(&StoreEvent::EntryDropped {
                location: location.to_path_buf(),
                module: entry.module,
                key: entry.key,
                kind: entry.kind,
            });
        }
        parsed.document
    }

    /// Write the full document to storage
    ///
    /// With `PerModule`, modules whose names cannot be file names are skipped
    /// and reported while the rest is still written.
    pub fn persist(&self) -> SaveOutcome {
        let location = self.backend.location().to_path_buf();
        match self.backend.write(&self.document) {
            Ok(skipped) if skipped.is_empty() => {
                self.observer.on_event(&StoreEvent::Saved { location });
                SaveOutcome::Saved
            }
            Ok(skipped) => {
                for module in &skipped {
                    self.observer.on_event(&StoreEvent::ModuleSkipped {
                        location: location.clone(),
                        module: module.clone(),
                    });
                }
                self.observer.on_event(&StoreEvent::Saved { location });
                SaveOutcome::Partial(skipped)
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                self.observer.on_event(&StoreEvent::SaveFailed {
                    location,
                    reason: reason.clone(),
                });
                SaveOutcome::Failed(reason)
            }
        }
    }

    /// Stored value, if any
    pub fn get_value(&self, module: &str, key: &str) -> Option<&SettingValue> {
        self.document.get(module, key)
    }

    /// Stored value or `default` when the module or key is absent
    pub fn get(&self, module: &str, key: &str, default: impl Into<SettingValue>) -> SettingValue {
        self.get_value(module, key)
            .cloned()
            .unwrap_or_else(|| default.into())
    }

    /// Set a value (creating the module if needed) and persist
    pub fn set(&mut self, module: &str, key: &str, value: impl Into<SettingValue>) -> SaveOutcome {
        let value = value.into();
        debug!(module = %module, key = %key, value = %value, "Setting value");
        self.document.set(module, key, value);
        self.persist()
    }

    /// Seed a module with defaults the first time it is seen
    ///
    /// The document is only touched when the module is absent; the plugin
    /// registry always takes the latest defaults.
    pub fn register_plugin(&mut self, module: &str, defaults: ModuleSettings) -> SaveOutcome {
        let outcome = if self.document.contains_module(module) {
            SaveOutcome::Unchanged
        } else {
            self.document.insert_module(module, defaults.clone());
            info!(plugin = %module, "Plugin initialized with default settings");
            self.persist()
        };
        self.plugins.insert(module.to_string(), defaults);
        outcome
    }

    /// Defaults most recently registered for `module`
    pub fn plugin_defaults(&self, module: &str) -> Option<&ModuleSettings> {
        self.plugins.get(module)
    }

    /// Remove a whole module
    pub fn reset_module(&mut self, module: &str) -> SaveOutcome {
        if self.document.remove_module(module).is_none() {
            debug!(module = %module, "Reset of unknown module ignored");
            return SaveOutcome::Unchanged;
        }
        info!(module = %module, "Reset configuration set");
        self.persist()
    }

    /// Remove a key, or replace it with a coerced value
    ///
    /// Only acts when both the module and the key already exist. A
    /// replacement that parses as a number is stored as a number, anything
    /// else as text.
    pub fn reset_key(&mut self, module: &str, key: &str, new_value: Option<&str>) -> SaveOutcome {
        let Some(old_value) = self.document.get(module, key).cloned() else {
            debug!(module = %module, key = %key, "Reset of unknown key ignored");
            return SaveOutcome::Unchanged;
        };

        match new_value {
            None => {
                self.document.remove_key(module, key);
                info!(module = %module, key = %key, previous = %old_value, "Reset key");
            }
            Some(raw) => {
                let converted = SettingValue::coerce(raw);
                info!(
                    module = %module,
                    key = %key,
                    from = %old_value,
                    to = %converted,
                    kind = converted.kind(),
                    "Changed key"
                );
                self.document.set(module, key, converted);
            }
        }
        self.persist()
    }

    /// Drop every module
    pub fn reset_all(&mut self) -> SaveOutcome {
        self.document.clear();
        info!("Reset all configuration");
        self.persist()
    }

    /// Write the whole document to an external file
    pub fn export_to(&self, path: &Path) -> Result<()> {
        let json = self.document.to_pretty_json()?;
        fs::write(path, json)
            .with_context(|| format!("Failed to export configuration to {:?}", path))?;
        info!(path = %path.display(), "Exported configuration");
        Ok(())
    }

    /// Replace the document with the contents of an external file and persist
    ///
    /// The current document is kept when the file cannot be read or parsed.
    /// Non-scalar settings in the file are dropped and reported, as on load.
    pub fn import_from(&mut self, path: &Path) -> Result<SaveOutcome> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read import file {:?}", path))?;
        let parsed = ConfigDocument::from_json_str(&contents)
            .with_context(|| format!("Failed to parse import file {:?}", path))?;
        self.document = self.accept(path, parsed);
        if self.document.is_empty() {
            warn!(path = %path.display(), "Imported configuration is empty");
        }
        info!(path = %path.display(), modules = self.document.len(), "Imported configuration");
        Ok(self.persist())
    }
}
