//! Shared helpers and types

pub mod debug;
pub mod types;
