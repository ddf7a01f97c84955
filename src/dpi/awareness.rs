//! DPI awareness mode
//!
//! Stored as text under `dpi.awareness`. Unknown values fall back to
//! `System`.

use std::fmt;
use tracing::{info, warn};

use crate::config::{ConfigStore, SettingValue};
use crate::constants::dpi::{AWARENESS_KEY, DEFAULT_AWARENESS, MODULE_NAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DpiAwareness {
    /// Let the compositor bitmap-scale the window
    Unaware,
    /// One scale for the whole session
    #[default]
    System,
    /// Rescale when moved between monitors
    PerMonitor,
}

impl DpiAwareness {
    /// Parse a stored mode name, falling back to `System`
    pub fn parse(name: &str) -> Self {
        match name {
            "Unaware" => DpiAwareness::Unaware,
            "System" => DpiAwareness::System,
            "Per-monitor" => DpiAwareness::PerMonitor,
            other => {
                warn!(mode = %other, "Unknown DPI awareness mode, using System");
                DpiAwareness::System
            }
        }
    }

    /// Mode configured in the store
    pub fn from_store(store: &ConfigStore) -> Self {
        match store.get(MODULE_NAME, AWARENESS_KEY, DEFAULT_AWARENESS) {
            SettingValue::Text(name) => Self::parse(&name),
            other => {
                warn!(value = %other, "DPI awareness is not text, using System");
                DpiAwareness::System
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DpiAwareness::Unaware => "Unaware",
            DpiAwareness::System => "System",
            DpiAwareness::PerMonitor => "Per-monitor",
        }
    }

    /// Numeric level as used by process DPI awareness APIs (0, 1, 2)
    pub fn level(&self) -> u32 {
        match self {
            DpiAwareness::Unaware => 0,
            DpiAwareness::System => 1,
            DpiAwareness::PerMonitor => 2,
        }
    }

    /// Declare the awareness mode for this process
    ///
    /// X11 has no per-process awareness switch; scaling is driven entirely
    /// by the resolved scale factor, so this only records the choice.
    pub fn apply(self) {
        info!(mode = %self, level = self.level(), "DPI awareness set");
    }
}

impl fmt::Display for DpiAwareness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;

    #[test]
    fn test_parse_known_modes() {
        assert_eq!(DpiAwareness::parse("Unaware"), DpiAwareness::Unaware);
        assert_eq!(DpiAwareness::parse("System"), DpiAwareness::System);
        assert_eq!(DpiAwareness::parse("Per-monitor"), DpiAwareness::PerMonitor);
    }

    #[test]
    fn test_parse_unknown_falls_back() {
        assert_eq!(DpiAwareness::parse("per-monitor-v2"), DpiAwareness::System);
        assert_eq!(DpiAwareness::parse(""), DpiAwareness::System);
    }

    #[test]
    fn test_levels_and_names() {
        for mode in [
            DpiAwareness::Unaware,
            DpiAwareness::System,
            DpiAwareness::PerMonitor,
        ] {
            assert_eq!(DpiAwareness::parse(mode.as_str()), mode);
        }
        assert_eq!(DpiAwareness::PerMonitor.level(), 2);
        assert_eq!(DpiAwareness::default(), DpiAwareness::System);
    }

    #[test]
    fn test_from_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store =
            ConfigStore::open(StorageBackend::SingleFile(temp_dir.path().join("config.json")));

        assert_eq!(DpiAwareness::from_store(&store), DpiAwareness::System);

        store.set(MODULE_NAME, AWARENESS_KEY, "Per-monitor");
        assert_eq!(DpiAwareness::from_store(&store), DpiAwareness::PerMonitor);

        store.set(MODULE_NAME, AWARENESS_KEY, 2.0);
        assert_eq!(DpiAwareness::from_store(&store), DpiAwareness::System);
    }
}
