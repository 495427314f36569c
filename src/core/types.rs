use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{SankeyError, SankeyResult};

/// Pixel rectangle the diagram is laid out into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin.
    #[must_use]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    pub fn validate(self) -> SankeyResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(SankeyError::InvalidBounds {
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Returns `true` when the point lies inside the rectangle grown by `tolerance`.
    #[must_use]
    pub fn contains(self, point: PixelPoint, tolerance: f64) -> bool {
        point.x >= self.left - tolerance
            && point.x <= self.right() + tolerance
            && point.y >= self.top - tolerance
            && point.y <= self.bottom() + tolerance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Snaps a coordinate onto the pixel grid for a stroke of `thickness` pixels.
///
/// Odd thicknesses land on pixel centers so 1px strokes stay crisp.
#[must_use]
pub fn apply_pixel_shift(value: f64, thickness: u32) -> f64 {
    let shift = f64::from(thickness % 2) / 2.0;
    value.round() + shift
}

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> SankeyResult<f64> {
    value.to_f64().ok_or_else(|| {
        SankeyError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}
