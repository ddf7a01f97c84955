//! DPI awareness and scaling
//!
//! Resolves a display scale factor (cached under `dpi.scale_factor`) and
//! converts logical window sizes to physical pixels.

pub mod awareness;
pub mod probe;
pub mod scaler;

pub use awareness::DpiAwareness;
pub use probe::{ScreenInfo, X11Probe};
pub use scaler::ScaleResolver;
