use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::path::PathData;
use crate::error::{SankeyError, SankeyResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Parses `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(text: &str) -> SankeyResult<Self> {
        let invalid = || SankeyError::InvalidData(format!("invalid hex color `{text}`"));
        let digits = text.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: &str| u8::from_str_radix(range, 16).map_err(|_| invalid());
        let expanded;
        let digits = if digits.len() == 3 {
            expanded = digits.chars().flat_map(|c| [c, c]).collect::<String>();
            expanded.as_str()
        } else {
            digits
        };
        let alpha = match digits.len() {
            6 => 255,
            8 => channel(&digits[6..8])?,
            _ => return Err(invalid()),
        };
        Ok(Self::rgba(
            f64::from(channel(&digits[0..2])?) / 255.0,
            f64::from(channel(&digits[2..4])?) / 255.0,
            f64::from(channel(&digits[4..6])?) / 255.0,
            f64::from(alpha) / 255.0,
        ))
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        let byte = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        let base = format!(
            "#{:02x}{:02x}{:02x}",
            byte(self.red),
            byte(self.green),
            byte(self.blue)
        );
        if self.alpha >= 1.0 {
            base
        } else {
            format!("{base}{:02x}", byte(self.alpha))
        }
    }

    #[must_use]
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`.
    #[must_use]
    pub fn blend(self, other: Self, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self::rgba(
            mix(self.red, other.red),
            mix(self.green, other.green),
            mix(self.blue, other.blue),
            mix(self.alpha, other.alpha),
        )
    }

    /// Moves the color `factor` of the way towards black, keeping alpha.
    #[must_use]
    pub fn darken(self, factor: f64) -> Self {
        self.blend(Self::BLACK.with_alpha(self.alpha), factor)
    }

    pub fn validate(self) -> SankeyResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(SankeyError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = SankeyError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::from_hex(text)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientKey {
    pub offset: f64,
    pub color: Color,
}

/// Linear gradient; `angle` is in degrees, `-90` runs top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearGradient {
    pub angle: f64,
    pub keys: Vec<GradientKey>,
}

impl LinearGradient {
    /// Color at `offset`, interpolated between the surrounding keys.
    #[must_use]
    pub fn color_at(&self, offset: f64) -> Option<Color> {
        let first = self.keys.first()?;
        if offset <= first.offset {
            return Some(first.color);
        }
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if offset <= b.offset {
                let span = b.offset - a.offset;
                let t = if span > 0.0 { (offset - a.offset) / span } else { 1.0 };
                return Some(a.color.blend(b.color, t));
            }
        }
        self.keys.last().map(|key| key.color)
    }

    pub fn validate(&self) -> SankeyResult<()> {
        if !self.angle.is_finite() {
            return Err(SankeyError::InvalidData(
                "gradient angle must be finite".to_owned(),
            ));
        }
        if self.keys.is_empty() {
            return Err(SankeyError::InvalidData(
                "gradient needs at least one key".to_owned(),
            ));
        }
        for key in &self.keys {
            if !(0.0..=1.0).contains(&key.offset) {
                return Err(SankeyError::InvalidData(
                    "gradient key offset must be in [0, 1]".to_owned(),
                ));
            }
            key.color.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Fill {
    #[default]
    None,
    Solid { color: Color },
    LinearGradient(LinearGradient),
}

impl Fill {
    #[must_use]
    pub fn solid(color: Color) -> Self {
        Self::Solid { color }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn validate(&self) -> SankeyResult<()> {
        match self {
            Self::None => Ok(()),
            Self::Solid { color } => color.validate(),
            Self::LinearGradient(gradient) => gradient.validate(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Stroke {
    #[default]
    None,
    Solid { color: Color, thickness: f64 },
}

impl Stroke {
    #[must_use]
    pub fn solid(color: Color, thickness: f64) -> Self {
        Self::Solid { color, thickness }
    }

    pub fn validate(self) -> SankeyResult<()> {
        match self {
            Self::None => Ok(()),
            Self::Solid { color, thickness } => {
                if !thickness.is_finite() || thickness <= 0.0 {
                    return Err(SankeyError::InvalidData(
                        "stroke thickness must be finite and > 0".to_owned(),
                    ));
                }
                color.validate()
            }
        }
    }
}

/// Filled and stroked vector path in pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPrimitive {
    pub path: PathData,
    pub fill: Fill,
    pub stroke: Stroke,
    /// Paint order; lower values draw first.
    pub z_index: i32,
}

impl PathPrimitive {
    #[must_use]
    pub fn new(path: PathData, fill: Fill, stroke: Stroke, z_index: i32) -> Self {
        Self {
            path,
            fill,
            stroke,
            z_index,
        }
    }

    pub fn validate(&self) -> SankeyResult<()> {
        if self.path.is_empty() {
            return Err(SankeyError::InvalidData(
                "path primitive must not be empty".to_owned(),
            ));
        }
        if !self.path.is_finite() {
            return Err(SankeyError::InvalidData(
                "path coordinates must be finite".to_owned(),
            ));
        }
        self.fill.validate()?;
        self.stroke.validate()
    }
}

/// Which point of the text box sits on `TextPrimitive::x`/`y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAnchor {
    #[default]
    Center,
    CenterBottom,
    LeftBottom,
    RightBottom,
    LeftCenter,
}

/// Draw command for one label in pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size_px: f64,
    pub color: Color,
    pub anchor: TextAnchor,
}

impl TextPrimitive {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        x: f64,
        y: f64,
        font_size_px: f64,
        color: Color,
        anchor: TextAnchor,
    ) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size_px,
            color,
            anchor,
        }
    }

    pub fn validate(&self) -> SankeyResult<()> {
        if self.text.is_empty() {
            return Err(SankeyError::InvalidData(
                "text primitive must not be empty".to_owned(),
            ));
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(SankeyError::InvalidData(
                "text coordinates must be finite".to_owned(),
            ));
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(SankeyError::InvalidData(
                "font size must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}
