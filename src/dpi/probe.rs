//! Display probing
//!
//! A probe measures how much larger the display renders a logical size than
//! the 96 DPI baseline. The X11 implementation reads the same DPI hint
//! toolkits use (`Xft.dpi`) and falls back to the physical size reported by
//! the server. The server is queried once; diagnostics and window placement
//! reuse that answer.

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt, Screen};
use x11rb::rust_connection::RustConnection;

use crate::common::types::Dimensions;
use crate::constants::dpi::{BASELINE_DPI, MM_PER_INCH};
use crate::constants::x11::{RESOURCE_MANAGER_MAX_LEN, XFT_DPI_RESOURCE};

/// Scale ratios on both axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleSample {
    pub horizontal: f64,
    pub vertical: f64,
}

impl ScaleSample {
    /// Same ratio on both axes
    pub fn uniform(ratio: f64) -> Self {
        Self {
            horizontal: ratio,
            vertical: ratio,
        }
    }

    /// Mean of the two ratios
    pub fn factor(&self) -> f64 {
        (self.horizontal + self.vertical) / 2.0
    }
}

/// Source of a fresh scale measurement
pub trait ScaleProbe {
    fn probe(&self) -> Result<ScaleSample>;
}

/// What the X server reports about the default screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenInfo {
    pub size_px: Dimensions,
    pub size_mm: Dimensions,
    /// `Xft.dpi` from the resource database, if set
    pub xft_dpi: Option<f64>,
}

impl ScreenInfo {
    /// DPI derived from the physical size, per axis
    pub fn physical_dpi(&self) -> Option<(f64, f64)> {
        if self.size_mm.width == 0 || self.size_mm.height == 0 {
            return None;
        }
        let horizontal = f64::from(self.size_px.width) * MM_PER_INCH / f64::from(self.size_mm.width);
        let vertical =
            f64::from(self.size_px.height) * MM_PER_INCH / f64::from(self.size_mm.height);
        Some((horizontal, vertical))
    }

    /// Scale relative to the 96 DPI baseline; `Xft.dpi` wins over physical size
    pub fn scale_sample(&self) -> Option<ScaleSample> {
        if let Some(dpi) = self.xft_dpi {
            return Some(ScaleSample::uniform(dpi / BASELINE_DPI));
        }
        self.physical_dpi().map(|(h, v)| ScaleSample {
            horizontal: h / BASELINE_DPI,
            vertical: v / BASELINE_DPI,
        })
    }
}

/// Extract a positive `Xft.dpi` value from RESOURCE_MANAGER text
pub fn parse_xft_dpi(resources: &str) -> Option<f64> {
    resources
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim() == XFT_DPI_RESOURCE)
        .and_then(|(_, value)| value.trim().parse::<f64>().ok())
        .filter(|dpi| dpi.is_finite() && *dpi > 0.0)
}

impl ScaleProbe for ScreenInfo {
    fn probe(&self) -> Result<ScaleSample> {
        let sample = self
            .scale_sample()
            .ok_or_else(|| anyhow!("X11 screen reports neither Xft.dpi nor a physical size"))?;
        info!(
            factor = sample.factor(),
            x = sample.horizontal,
            y = sample.vertical,
            "Detected scale"
        );
        Ok(sample)
    }
}

/// Probe backed by the X server named in `$DISPLAY`
///
/// Holds the result of a single screen query.
#[derive(Debug)]
pub struct X11Probe {
    screen: Result<ScreenInfo>,
}

impl X11Probe {
    /// Connect once and query the default screen
    pub fn query() -> Self {
        let screen = query_screen();
        if let Err(e) = &screen {
            warn!(error = %format!("{:#}", e), "Screen information unavailable");
        }
        Self { screen }
    }

    /// The queried screen, if the server could be reached
    pub fn screen_info(&self) -> Option<&ScreenInfo> {
        self.screen.as_ref().ok()
    }
}

impl ScaleProbe for X11Probe {
    fn probe(&self) -> Result<ScaleSample> {
        match &self.screen {
            Ok(info) => info.probe(),
            Err(e) => Err(anyhow!("{:#}", e)),
        }
    }
}

fn query_screen() -> Result<ScreenInfo> {
    let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X11")?;
        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| anyhow!("X11 screen {} not found", screen_num))?;

    let xft_dpi = read_resource_manager(&conn, screen)?
        .as_deref()
        .and_then(parse_xft_dpi);

    let info = ScreenInfo {
        size_px: Dimensions::new(
            u32::from(screen.width_in_pixels),
            u32::from(screen.height_in_pixels),
        ),
        size_mm: Dimensions::new(
            u32::from(screen.width_in_millimeters),
            u32::from(screen.height_in_millimeters),
        ),
        xft_dpi,
    };
    debug!(?info, "Queried X11 screen");
    Ok(info)
}

fn read_resource_manager(conn: &RustConnection, screen: &Screen) -> Result<Option<String>> {
    let reply = conn
        .get_property(
            false,
            screen.root,
            AtomEnum::RESOURCE_MANAGER,
            AtomEnum::STRING,
            0,
            RESOURCE_MANAGER_MAX_LEN,
        )
        .context("Failed to query RESOURCE_MANAGER property")?
        .reply()
        .context("Failed to get reply for RESOURCE_MANAGER query")?;

    if reply.value.is_empty() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&reply.value).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_factor_averages_axes() {
        let sample = ScaleSample {
            horizontal: 1.25,
            vertical: 1.3,
        };
        assert!((sample.factor() - 1.275).abs() < 1e-9);
        assert_eq!(ScaleSample::uniform(1.5).factor(), 1.5);
    }

    #[test]
    fn test_parse_xft_dpi() {
        let resources = "Xcursor.size:\t24\nXft.antialias:\t1\nXft.dpi:\t144\nXft.hinting:\t1\n";
        assert_eq!(parse_xft_dpi(resources), Some(144.0));
        assert_eq!(parse_xft_dpi("Xft.dpi: 120.5"), Some(120.5));
        assert_eq!(parse_xft_dpi("Xft.antialias:\t1"), None);
        assert_eq!(parse_xft_dpi("Xft.dpi:\tlarge"), None);
        assert_eq!(parse_xft_dpi("Xft.dpi:\t0"), None);
    }

    #[test]
    fn test_screen_info_prefers_xft_dpi() {
        let info = ScreenInfo {
            size_px: Dimensions::new(1920, 1080),
            size_mm: Dimensions::new(508, 286),
            xft_dpi: Some(120.0),
        };
        assert_eq!(info.scale_sample(), Some(ScaleSample::uniform(1.25)));
    }

    #[test]
    fn test_screen_info_physical_fallback() {
        // 1920 px across 508 mm is exactly 96 DPI
        let info = ScreenInfo {
            size_px: Dimensions::new(1920, 1080),
            size_mm: Dimensions::new(508, 0),
            xft_dpi: None,
        };
        assert_eq!(info.scale_sample(), None);

        let info = ScreenInfo {
            size_mm: Dimensions::new(508, 254),
            ..info
        };
        let sample = info.scale_sample().unwrap();
        assert!((sample.horizontal - 1.0).abs() < 1e-9);
        assert!((sample.vertical - 1.125).abs() < 1e-9);
    }

    #[test]
    fn test_screen_info_measures_scale() {
        let info = ScreenInfo {
            size_px: Dimensions::new(2560, 1440),
            size_mm: Dimensions::new(0, 0),
            xft_dpi: Some(144.0),
        };
        assert_eq!(info.probe().unwrap().factor(), 1.5);

        let info = ScreenInfo {
            xft_dpi: None,
            ..info
        };
        assert!(info.probe().is_err());
    }

    #[test]
    fn test_x11_probe_reuses_single_query() {
        let screen = ScreenInfo {
            size_px: Dimensions::new(1920, 1080),
            size_mm: Dimensions::new(508, 286),
            xft_dpi: Some(192.0),
        };
        let probe = X11Probe { screen: Ok(screen) };
        assert_eq!(probe.screen_info(), Some(&screen));
        assert_eq!(probe.probe().unwrap(), ScaleSample::uniform(2.0));

        let offline = X11Probe {
            screen: Err(anyhow!("Failed to connect to X11")),
        };
        assert_eq!(offline.screen_info(), None);
        let error = offline.probe().unwrap_err();
        assert!(format!("{:#}", error).contains("Failed to connect to X11"));
    }
}
