//! Geometric types for window coordinates and sizes
//!
//! Provides type-safe wrappers for positions and sizes to avoid
//! common integer confusion (e.g., swapping width/height or x/y).
//! Scaling between logical and physical pixels always truncates toward zero.

use serde::{Deserialize, Serialize};

/// A position in 2D space (screen coordinates, may be negative)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn as_tuple(self) -> (i32, i32) {
        (self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from(tuple: (i32, i32)) -> Self {
        Self::new(tuple.0, tuple.1)
    }
}

/// Window or screen size (width × height)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Logical -> physical: multiply by `factor`, truncating
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            width: (f64::from(self.width) * factor) as u32,
            height: (f64::from(self.height) * factor) as u32,
        }
    }

    /// Physical -> logical: divide by `factor`, truncating
    pub fn unscaled(self, factor: f64) -> Self {
        Self {
            width: (f64::from(self.width) / factor) as u32,
            height: (f64::from(self.height) / factor) as u32,
        }
    }

    /// Top-left corner that centers a window of `self` (logical) on `screen` (physical)
    ///
    /// The screen is first converted to logical pixels, the free space is
    /// halved, and the result is converted back to physical pixels. A window
    /// larger than the screen gets a negative offset.
    pub fn centered_on(self, screen: Dimensions, factor: f64) -> Position {
        let logical_screen = screen.unscaled(factor);
        let offset = |screen_len: u32, window_len: u32| -> i32 {
            let free = i64::from(screen_len) - i64::from(window_len);
            (free as f64 / 2.0 * factor) as i32
        };
        Position::new(
            offset(logical_screen.width, self.width),
            offset(logical_screen.height, self.height),
        )
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from(tuple: (u32, u32)) -> Self {
        Self::new(tuple.0, tuple.1)
    }
}

impl From<Dimensions> for (u32, u32) {
    fn from(dims: Dimensions) -> Self {
        dims.as_tuple()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_tuple_conversion() {
        let pos: Position = (-10, 200).into();
        assert_eq!(pos, Position::new(-10, 200));
        assert_eq!(pos.as_tuple(), (-10, 200));
    }

    #[test]
    fn test_dimensions_from_trait() {
        let dims: Dimensions = (1024, 768).into();
        assert_eq!(dims.width, 1024);
        assert_eq!(dims.height, 768);

        let tuple: (u32, u32) = dims.into();
        assert_eq!(tuple, (1024, 768));
    }

    #[test]
    fn test_scaled_truncates() {
        assert_eq!(Dimensions::new(800, 600).scaled(1.25), Dimensions::new(1000, 750));
        assert_eq!(Dimensions::new(800, 600).scaled(1.333), Dimensions::new(1066, 799));
        assert_eq!(Dimensions::new(3, 3).scaled(0.5), Dimensions::new(1, 1));
    }

    #[test]
    fn test_unscaled_truncates() {
        assert_eq!(
            Dimensions::new(2560, 1440).unscaled(1.5),
            Dimensions::new(1706, 960)
        );
        assert_eq!(Dimensions::new(1920, 1080).unscaled(1.0), Dimensions::new(1920, 1080));
    }

    #[test]
    fn test_centered_on_unscaled_screen() {
        let window = Dimensions::new(800, 600);
        let pos = window.centered_on(Dimensions::new(1920, 1080), 1.0);
        assert_eq!(pos, Position::new(560, 240));
    }

    #[test]
    fn test_centered_on_scaled_screen() {
        // Logical screen 1706x960; free space 906x360; halved and scaled back
        let window = Dimensions::new(800, 600);
        let pos = window.centered_on(Dimensions::new(2560, 1440), 1.5);
        assert_eq!(pos, Position::new(679, 270));
    }

    #[test]
    fn test_centered_on_small_screen_goes_negative() {
        let window = Dimensions::new(1000, 800);
        let pos = window.centered_on(Dimensions::new(800, 600), 1.0);
        assert_eq!(pos, Position::new(-100, -100));
    }
}
