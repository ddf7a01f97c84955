//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Configuration paths and filenames
pub mod config {
    /// Application directory name under XDG config
    pub const APP_DIR: &str = "dpi-config-manager";

    /// Configuration filename (single-file backend)
    pub const FILENAME: &str = "config.json";

    /// Directory name used by the per-module backend
    pub const MODULES_DIR: &str = "modules";

    /// Extension of per-module files
    pub const MODULE_FILE_EXTENSION: &str = "json";

    /// Environment variable that overrides the configuration directory
    pub const DIR_ENV_VAR: &str = "DPI_CONFIG_MANAGER_CONFIG_DIR";

    /// Indentation used when pretty-printing documents
    pub const JSON_INDENT: &[u8] = b"    ";
}

/// DPI module keys and defaults
pub mod dpi {
    /// Module name under which DPI settings live
    pub const MODULE_NAME: &str = "dpi";

    /// Key of the cached scale factor
    pub const SCALE_FACTOR_KEY: &str = "scale_factor";

    /// Key of the awareness mode
    pub const AWARENESS_KEY: &str = "awareness";

    /// Default scale factor (no scaling)
    pub const DEFAULT_SCALE_FACTOR: f64 = 1.0;

    /// Default awareness mode
    pub const DEFAULT_AWARENESS: &str = "System";

    /// DPI at which the scale factor is 1.0
    pub const BASELINE_DPI: f64 = 96.0;

    /// Millimetres per inch, for physical DPI derivation
    pub const MM_PER_INCH: f64 = 25.4;
}

/// Default configuration values
pub mod defaults {
    /// Application window settings
    pub mod app {
        /// Module name holding window settings
        pub const MODULE_NAME: &str = "app";

        pub const WINDOW_WIDTH_KEY: &str = "window_width";
        pub const WINDOW_HEIGHT_KEY: &str = "window_height";

        /// Default window width in logical pixels
        pub const WINDOW_WIDTH: u32 = 800;

        /// Default window height in logical pixels
        pub const WINDOW_HEIGHT: u32 = 600;
    }
}

/// X11 resource database constants
pub mod x11 {
    /// Resource holding the Xft DPI setting
    pub const XFT_DPI_RESOURCE: &str = "Xft.dpi";

    /// Maximum RESOURCE_MANAGER length to fetch, in 32-bit units
    pub const RESOURCE_MANAGER_MAX_LEN: u32 = 16 * 1024;
}
