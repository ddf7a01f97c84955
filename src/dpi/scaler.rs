//! Scale factor resolution
//!
//! The factor is read from `dpi.scale_factor` when usable; otherwise the
//! display is probed once and the result cached back into the store. After
//! construction the factor never changes for the lifetime of the resolver.

use tracing::{info, warn};

use crate::common::types::Dimensions;
use crate::config::{ConfigStore, ModuleSettings, SettingValue};
use crate::constants::dpi::{
    AWARENESS_KEY, DEFAULT_AWARENESS, DEFAULT_SCALE_FACTOR, MODULE_NAME, SCALE_FACTOR_KEY,
};
use crate::dpi::probe::ScaleProbe;

/// Where the resolved factor came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleSource {
    /// Taken from the configuration as-is
    Stored,
    /// Measured and written back to the configuration
    Probed,
    /// Probe failed; default used and not persisted
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleResolver {
    scale_factor: f64,
    source: ScaleSource,
}

fn usable(factor: f64) -> bool {
    factor.is_finite() && factor > 0.0
}

impl ScaleResolver {
    /// Defaults registered for the `dpi` module
    pub fn default_settings() -> ModuleSettings {
        ModuleSettings::from([
            (
                SCALE_FACTOR_KEY.to_string(),
                SettingValue::from(DEFAULT_SCALE_FACTOR),
            ),
            (
                AWARENESS_KEY.to_string(),
                SettingValue::from(DEFAULT_AWARENESS),
            ),
        ])
    }

    /// Resolve the factor from `store`, probing only when it is missing or unusable
    ///
    /// Stored text is parsed as a number and a stored flag reads as 1 or 0.
    pub fn resolve(store: &mut ConfigStore, probe: &dyn ScaleProbe) -> Self {
        let stored = store.get_value(MODULE_NAME, SCALE_FACTOR_KEY).cloned();

        let resolver = match stored {
            None => Self::probe_and_cache(store, probe),
            Some(value) => match value.to_f64() {
                Some(factor) if usable(factor) => Self {
                    scale_factor: factor,
                    source: ScaleSource::Stored,
                },
                _ => {
                    warn!(value = %value, "Stored scale factor is unusable, probing again");
                    Self::probe_and_cache(store, probe)
                }
            },
        };

        info!(
            scale_factor = resolver.scale_factor,
            source = ?resolver.source,
            "Resolved scale factor"
        );
        resolver
    }

    fn probe_and_cache(store: &mut ConfigStore, probe: &dyn ScaleProbe) -> Self {
        let measured = probe.probe().map(|sample| sample.factor());
        match measured {
            Ok(factor) if usable(factor) => {
                store.set(MODULE_NAME, SCALE_FACTOR_KEY, factor);
                Self {
                    scale_factor: factor,
                    source: ScaleSource::Probed,
                }
            }
            Ok(factor) => {
                warn!(factor, "Probe returned an unusable scale factor, using default");
                Self::fallback()
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Could not probe display scale, using default");
                Self::fallback()
            }
        }
    }

    fn fallback() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            source: ScaleSource::Fallback,
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn source(&self) -> ScaleSource {
        self.source
    }

    /// Logical -> physical size; the fractional part is discarded
    pub fn apply_scale(&self, width: u32, height: u32) -> (u32, u32) {
        Dimensions::new(width, height)
            .scaled(self.scale_factor)
            .as_tuple()
    }
}
