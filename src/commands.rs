//! Handlers for the three operation modes
//!
//! Each handler writes its user-facing output to the given writer and
//! returns the process exit status; logging goes through `tracing`.

use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::common::debug::SystemInfo;
use crate::common::types::{Dimensions, Position};
use crate::config::{ConfigStore, StorageBackend};
use crate::constants;
use crate::constants::defaults::app;
use crate::dpi::{DpiAwareness, ScaleResolver, ScreenInfo};

pub const EXIT_OK: u8 = 0;
pub const EXIT_USAGE: u8 = 1;

/// What `configuration` mode was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    Show,
    ResetAll,
    ResetModule(String),
    /// Raw `MODULE KEY [NEW_VALUE]` values, validated by the handler
    ResetKey(Vec<String>),
    Export(PathBuf),
    Import(PathBuf),
}

pub fn configuration(store: &mut ConfigStore, action: ConfigAction, out: &mut dyn Write) -> Result<u8> {
    match action {
        ConfigAction::ResetAll => {
            store.reset_all();
            writeln!(out, "Configuration reset.")?;
        }
        ConfigAction::ResetModule(module) => {
            store.reset_module(&module);
            writeln!(out, "Reset configuration set: {}", module)?;
        }
        ConfigAction::ResetKey(values) => {
            let [module, key, rest @ ..] = values.as_slice() else {
                writeln!(out, "Provide at least MODULE and KEY for --reset-set-key")?;
                return Ok(EXIT_USAGE);
            };
            store.reset_key(module, key, rest.first().map(String::as_str));
            writeln!(out, "Reset key: {} in set: {}", key, module)?;
        }
        ConfigAction::Export(path) => match store.export_to(&path) {
            Ok(()) => writeln!(out, "Configuration exported to {}", path.display())?,
            Err(e) => error!(error = %format!("{:#}", e), "Failed to export configuration"),
        },
        ConfigAction::Import(path) => match store.import_from(&path) {
            Ok(_) => writeln!(out, "Configuration imported from {}", path.display())?,
            Err(e) => error!(error = %format!("{:#}", e), "Failed to import configuration"),
        },
        ConfigAction::Show => {
            writeln!(out, "Current configuration:")?;
            writeln!(out, "{}", store.document().to_pretty_json()?)?;
        }
    }
    Ok(EXIT_OK)
}

pub fn diagnostics(
    store: &ConfigStore,
    resolver: &ScaleResolver,
    screen: Option<&ScreenInfo>,
    system: &SystemInfo,
    out: &mut dyn Write,
) -> Result<u8> {
    writeln!(out, "Diagnostics Report:")?;
    writeln!(out, "  - DPIScale Factor: {}", resolver.scale_factor())?;
    writeln!(out, "  - Scale Source: {:?}", resolver.source())?;
    let layout = match store.backend() {
        StorageBackend::SingleFile(_) => "single file",
        StorageBackend::PerModule(_) => "one file per module",
    };
    writeln!(out, "  - Configuration: {} ({})", store.path().display(), layout)?;
    if let Some(defaults) = store.plugin_defaults(constants::dpi::MODULE_NAME) {
        let listed: Vec<String> = defaults
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        writeln!(out, "  - DPI Defaults: {}", listed.join(", "))?;
    }
    match screen {
        Some(screen) => {
            let physical = screen.size_px;
            let virtual_size = physical.unscaled(resolver.scale_factor());
            writeln!(out, "  - Physical Screen: {}x{}", physical.width, physical.height)?;
            writeln!(
                out,
                "  - Virtual Screen: {}x{}",
                virtual_size.width, virtual_size.height
            )?;
            if let Some(dpi) = screen.xft_dpi {
                writeln!(out, "  - Xft.dpi: {}", dpi)?;
            }
        }
        None => writeln!(out, "  - Screen: unavailable")?,
    }
    for line in system.report_lines() {
        writeln!(out, "  - {}", line)?;
    }
    Ok(EXIT_OK)
}

/// Computed geometry of the application window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowPlacement {
    pub logical: Dimensions,
    pub physical: Dimensions,
    /// Centered origin, when the screen size is known
    pub position: Option<Position>,
}

/// Configured window size in logical pixels, falling back to the defaults
pub fn window_size(store: &ConfigStore) -> Dimensions {
    let dimension = |key: &str, default: u32| -> u32 {
        let value = store.get(app::MODULE_NAME, key, default);
        match value.to_f64() {
            Some(n) if n >= 1.0 && n <= f64::from(u32::MAX) => n as u32,
            _ => {
                warn!(key = %key, value = %value, default, "Invalid window dimension, using default");
                default
            }
        }
    };
    Dimensions::new(
        dimension(app::WINDOW_WIDTH_KEY, app::WINDOW_WIDTH),
        dimension(app::WINDOW_HEIGHT_KEY, app::WINDOW_HEIGHT),
    )
}

/// Lay out the application window: apply awareness, size it and center it
pub fn run(
    store: &ConfigStore,
    resolver: &ScaleResolver,
    screen: Option<Dimensions>,
    out: &mut dyn Write,
) -> Result<WindowPlacement> {
    DpiAwareness::from_store(store).apply();

    let logical = window_size(store);
    let factor = resolver.scale_factor();
    let placement = WindowPlacement {
        logical,
        physical: resolver.apply_scale(logical.width, logical.height).into(),
        position: screen.map(|s| logical.centered_on(s, factor)),
    };

    match (screen, placement.position) {
        (Some(screen), Some(position)) => {
            let logical_screen = screen.unscaled(factor);
            info!(
                "Centering window: {}x{}, screen: {}x{}, scale: {:.2}, x: {}, y: {}",
                logical.width,
                logical.height,
                logical_screen.width,
                logical_screen.height,
                factor,
                position.x,
                position.y
            );
            writeln!(
                out,
                "{}x{}+{}+{}",
                logical.width, logical.height, position.x, position.y
            )?;
        }
        _ => {
            warn!("Screen size unknown, window left unpositioned");
            writeln!(out, "{}x{}", logical.width, logical.height)?;
        }
    }
    writeln!(
        out,
        "Dimensions (virtual): {}x{}, (physical): {}x{}",
        logical.width, logical.height, placement.physical.width, placement.physical.height
    )?;
    Ok(placement)
}
