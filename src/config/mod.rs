//! Configuration management
//!
//! Module-scoped key/value settings with JSON persistence. Modules seed
//! their defaults through plugin registration; the CLI resets, imports and
//! exports whole documents.

pub mod backend;
pub mod document;
pub mod events;
pub mod store;
pub mod value;

pub use backend::StorageBackend;
pub use document::ModuleSettings;
pub use store::ConfigStore;
pub use value::SettingValue;
