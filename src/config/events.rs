//! Persistence events
//!
//! Storage failures never propagate out of the store. Instead every load and
//! save attempt is reported to a [`StoreObserver`] and mutators hand back a
//! [`SaveOutcome`], so callers (and tests) can still see what happened.

use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Something that happened while talking to the backing storage
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Document read from disk
    Loaded { location: PathBuf, modules: usize },
    /// Nothing to read (first run)
    LoadSkipped { location: PathBuf },
    /// Read or parse failed; the store continues with an empty document
    LoadFailed { location: PathBuf, reason: String },
    /// A setting without a scalar value was left out of the loaded document
    EntryDropped {
        location: PathBuf,
        module: String,
        key: String,
        kind: &'static str,
    },
    /// Document written to disk
    Saved { location: PathBuf },
    /// Write failed; in-memory state stays authoritative
    SaveFailed { location: PathBuf, reason: String },
    /// A module was kept out of the write because of its name
    ModuleSkipped { location: PathBuf, module: String },
}

impl StoreEvent {
    #[cfg(test)]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StoreEvent::LoadFailed { .. }
                | StoreEvent::SaveFailed { .. }
                | StoreEvent::ModuleSkipped { .. }
        )
    }
}

/// Receives persistence events from a [`crate::config::ConfigStore`]
pub trait StoreObserver {
    fn on_event(&self, event: &StoreEvent);
}

/// Default observer: forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StoreObserver for TracingObserver {
    fn on_event(&self, event: &StoreEvent) {
        match event {
            StoreEvent::Loaded { location, modules } => {
                info!(path = %location.display(), modules, "Loaded configuration");
            }
            StoreEvent::LoadSkipped { location } => {
                info!(path = %location.display(), "No configuration found, starting empty");
            }
            StoreEvent::LoadFailed { location, reason } => {
                error!(path = %location.display(), error = %reason, "Could not load configuration");
            }
            StoreEvent::EntryDropped {
                location,
                module,
                key,
                kind,
            } => {
                warn!(
                    path = %location.display(),
                    module = %module,
                    key = %key,
                    kind,
                    "Ignoring setting that is not a number, text or flag"
                );
            }
            StoreEvent::Saved { location } => {
                debug!(path = %location.display(), "Saved configuration");
            }
            StoreEvent::SaveFailed { location, reason } => {
                error!(path = %location.display(), error = %reason, "Error saving configuration");
            }
            StoreEvent::ModuleSkipped { location, module } => {
                error!(
                    path = %location.display(),
                    module = %module,
                    "Module name cannot be used as a file name, module not saved"
                );
            }
        }
    }
}

/// Result of the persist step of a mutating operation
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The document was written
    Saved,
    /// Nothing changed, so nothing was written
    Unchanged,
    /// The write failed; the change lives in memory only
    Failed(String),
    /// Written, except for the listed modules
    Partial(Vec<String>),
}

impl SaveOutcome {
    #[cfg(test)]
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }

    /// Some or all of the document did not reach storage
    pub fn is_failed(&self) -> bool {
        matches!(self, SaveOutcome::Failed(_) | SaveOutcome::Partial(_))
    }
}

/// Observer that keeps every event, for assertions in tests
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    events: std::rc::Rc<std::cell::RefCell<Vec<StoreEvent>>>,
}

#[cfg(test)]
impl RecordingObserver {
    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.borrow().clone()
    }

    pub fn failures(&self) -> Vec<StoreEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.is_failure())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
impl StoreObserver for RecordingObserver {
    fn on_event(&self, event: &StoreEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_classification() {
        let location = PathBuf::from("/tmp/config.json");
        assert!(
            StoreEvent::LoadFailed {
                location: location.clone(),
                reason: "bad".into()
            }
            .is_failure()
        );
        assert!(
            !StoreEvent::Saved {
                location: location.clone()
            }
            .is_failure()
        );
        assert!(
            !StoreEvent::EntryDropped {
                location: location.clone(),
                module: "app".into(),
                key: "note".into(),
                kind: "null",
            }
            .is_failure()
        );
        assert!(
            StoreEvent::ModuleSkipped {
                location: location.clone(),
                module: "a/b".into(),
            }
            .is_failure()
        );
        assert!(!StoreEvent::LoadSkipped { location }.is_failure());
    }

    #[test]
    fn test_recording_observer_shares_events() {
        let recorder = RecordingObserver::default();
        let handle = recorder.clone();
        recorder.on_event(&StoreEvent::Saved {
            location: PathBuf::from("a.json"),
        });
        assert_eq!(handle.events().len(), 1);
        assert!(handle.failures().is_empty());
    }

    #[test]
    fn test_save_outcome_predicates() {
        assert!(SaveOutcome::Saved.is_saved());
        assert!(!SaveOutcome::Unchanged.is_saved());
        assert!(SaveOutcome::Failed("disk full".into()).is_failed());
        assert!(SaveOutcome::Partial(vec!["a/b".into()]).is_failed());
        assert!(!SaveOutcome::Partial(vec!["a/b".into()]).is_saved());
        assert!(!SaveOutcome::Unchanged.is_failed());
    }
}
