//! In-memory configuration document
//!
//! Two levels only: module name -> (key -> scalar value). A document whose
//! top level is not an object of objects is rejected as a whole; a single
//! entry without a scalar value is dropped and reported.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::value::{SettingValue, json_kind};
use crate::constants::config::JSON_INDENT;

/// Settings of a single module
pub type ModuleSettings = BTreeMap<String, SettingValue>;

/// The whole configuration, keyed by module name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigDocument {
    modules: BTreeMap<String, ModuleSettings>,
}

/// An entry left out while parsing because it holds no scalar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedEntry {
    pub module: String,
    pub key: String,
    /// JSON type that was found (`null`, `array` or `object`)
    pub kind: &'static str,
}

/// Outcome of parsing: the usable document plus whatever was dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    pub document: ConfigDocument,
    pub dropped: Vec<DroppedEntry>,
}

impl ParsedDocument {
    /// Parse one module's settings object and add it to the document
    pub fn add_module_json(&mut self, module: &str, contents: &str) -> Result<()> {
        let entries: BTreeMap<String, Value> = serde_json::from_str(contents)
            .with_context(|| format!("Module {:?} is not a key -> value object", module))?;
        self.add_module(module, entries);
        Ok(())
    }

    fn add_module(&mut self, module: &str, entries: BTreeMap<String, Value>) {
        let mut settings = ModuleSettings::new();
        for (key, raw) in entries {
            match SettingValue::from_json(raw) {
                Ok(value) => {
                    settings.insert(key, value);
                }
                Err(other) => self.dropped.push(DroppedEntry {
                    module: module.to_string(),
                    key,
                    kind: json_kind(&other),
                }),
            }
        }
        self.document.insert_module(module, settings);
    }
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from JSON text
    ///
    /// Fails when the text is not JSON or the top level is not an object of
    /// objects. Entries that are not scalars are dropped and listed.
    pub fn from_json_str(contents: &str) -> Result<ParsedDocument> {
        let raw: BTreeMap<String, BTreeMap<String, Value>> = serde_json::from_str(contents)
            .context("Configuration is not a module -> settings object")?;
        let mut parsed = ParsedDocument::default();
        for (module, entries) in raw {
            parsed.add_module(&module, entries);
        }
        Ok(parsed)
    }

    /// Render the document as 4-space indented JSON
    pub fn to_pretty_json(&self) -> Result<String> {
        to_pretty_json(self)
    }

    pub fn get(&self, module: &str, key: &str) -> Option<&SettingValue> {
        self.modules.get(module).and_then(|settings| settings.get(key))
    }

    pub fn contains_module(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Set a value, creating the module entry if needed
    ///
    /// Returns the previous value, if any.
    pub fn set(&mut self, module: &str, key: &str, value: SettingValue) -> Option<SettingValue> {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(key.to_string(), value)
    }

    /// Insert a whole module, replacing any existing entry
    pub fn insert_module(&mut self, module: &str, settings: ModuleSettings) {
        self.modules.insert(module.to_string(), settings);
    }

    pub fn remove_module(&mut self, module: &str) -> Option<ModuleSettings> {
        self.modules.remove(module)
    }

    /// Remove a single key; the module entry stays even if it becomes empty
    pub fn remove_key(&mut self, module: &str, key: &str) -> Option<SettingValue> {
        self.modules
            .get_mut(module)
            .and_then(|settings| settings.remove(key))
    }

    pub fn clear(&mut self) {
        self.modules.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Iterate over modules in name order
    pub fn modules(&self) -> impl Iterator<Item = (&str, &ModuleSettings)> {
        self.modules.iter().map(|(name, settings)| (name.as_str(), settings))
    }
}

/// Serialize any value with the document's 4-space indentation
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .context("Failed to serialize configuration to JSON")?;
    String::from_utf8(buffer).context("Serialized configuration is not valid UTF-8")
}
