/// Board configuration: screen zones, brush widths and shape limits
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{BoardError, Result};
use crate::geometry::ShapeKind;
use crate::projection::DEFAULT_VIEW_DISTANCE;
use crate::surface::Color;

/// Horizontal band of the header or toolbar. Bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XRange {
    pub min: i32,
    pub max: i32,
}

impl XRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, x: i32) -> bool {
        self.min < x && x < self.max
    }
}

/// Palette entry in the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorZone {
    pub range: XRange,
    pub color: Color,
    pub label: ZoneLabel,
}

/// Toolbar entry in the bottom row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeZone {
    pub range: XRange,
    pub kind: ShapeKind,
}

/// Display name of a palette zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneLabel {
    Blue,
    Green,
    Red,
    Eraser,
    Custom,
}

impl ZoneLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            ZoneLabel::Blue => "BLUE",
            ZoneLabel::Green => "GREEN",
            ZoneLabel::Red => "RED",
            ZoneLabel::Eraser => "ERASER",
            ZoneLabel::Custom => "COLOR",
        }
    }
}

const ZONE_RANGES: [XRange; 4] = [
    XRange::new(250, 450),
    XRange::new(550, 750),
    XRange::new(800, 1050),
    XRange::new(1100, 1280),
];

/// Everything the interaction machine and renderers treat as a constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub frame_width: u32,
    pub frame_height: u32,
    /// Palette picks happen above this y
    pub header_height: i32,
    /// Toolbar picks happen below this y
    pub toolbar_top: i32,
    pub palette: Vec<ColorZone>,
    pub toolbar: Vec<ShapeZone>,
    pub brush_thickness: u32,
    pub eraser_thickness: u32,
    pub shape_thickness: u32,
    pub highlight_color: Color,
    pub default_color: Color,
    pub default_shape: ShapeKind,
    pub default_size: f64,
    pub min_size: f64,
    pub max_size: f64,
    /// Radians per tilt unit per frame
    pub rotation_speed: f64,
    pub view_distance: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        let colors = [
            (Color::BLUE, ZoneLabel::Blue),
            (Color::GREEN, ZoneLabel::Green),
            (Color::RED, ZoneLabel::Red),
            (Color::ERASER, ZoneLabel::Eraser),
        ];

        Self {
            frame_width: 1280,
            frame_height: 720,
            header_height: 125,
            toolbar_top: 595,
            palette: ZONE_RANGES
                .iter()
                .zip(colors)
                .map(|(&range, (color, label))| ColorZone {
                    range,
                    color,
                    label,
                })
                .collect(),
            toolbar: ZONE_RANGES
                .iter()
                .zip(ShapeKind::ALL)
                .map(|(&range, kind)| ShapeZone { range, kind })
                .collect(),
            brush_thickness: 15,
            eraser_thickness: 50,
            shape_thickness: 2,
            highlight_color: Color::WHITE,
            default_color: Color::PINK,
            default_shape: ShapeKind::Cube,
            default_size: 100.0,
            min_size: 50.0,
            max_size: 300.0,
            rotation_speed: 0.05,
            view_distance: DEFAULT_VIEW_DISTANCE,
        }
    }
}

impl BoardConfig {
    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!("loaded board config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_size > 0.0) {
            return Err(BoardError::InvalidConfig(format!(
                "min_size must be positive, got {}",
                self.min_size
            )));
        }
        if self.min_size > self.max_size {
            return Err(BoardError::InvalidConfig(format!(
                "min_size {} exceeds max_size {}",
                self.min_size, self.max_size
            )));
        }
        if !(self.default_size > 0.0) {
            return Err(BoardError::InvalidConfig(format!(
                "default_size must be positive, got {}",
                self.default_size
            )));
        }
        if !(self.view_distance > 0.0) {
            return Err(BoardError::InvalidConfig(format!(
                "view_distance must be positive, got {}",
                self.view_distance
            )));
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(BoardError::InvalidConfig("frame size must be non-zero".into()));
        }

        let ranges = self
            .palette
            .iter()
            .map(|zone| zone.range)
            .chain(self.toolbar.iter().map(|zone| zone.range));
        for range in ranges {
            if range.min >= range.max {
                return Err(BoardError::InvalidConfig(format!(
                    "zone range {}..{} is empty",
                    range.min, range.max
                )));
            }
        }

        Ok(())
    }

    /// Palette zone under a fingertip, if it is in the header row
    pub fn palette_at(&self, x: i32, y: i32) -> Option<&ColorZone> {
        if y >= self.header_height {
            return None;
        }
        self.palette.iter().find(|zone| zone.range.contains(x))
    }

    /// Toolbar zone under a fingertip, if it is in the bottom row
    pub fn toolbar_at(&self, x: i32, y: i32) -> Option<&ShapeZone> {
        if y <= self.toolbar_top {
            return None;
        }
        self.toolbar.iter().find(|zone| zone.range.contains(x))
    }

    pub fn clamp_size(&self, size: f64) -> f64 {
        size.clamp(self.min_size, self.max_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BoardConfig::default();
        config.validate().unwrap();
        assert_eq!(config.palette.len(), 4);
        assert_eq!(config.toolbar.len(), 4);
        assert_eq!(config.palette[3].color, Color::ERASER);
        assert_eq!(config.toolbar[1].kind, ShapeKind::Sphere);
    }

    #[test]
    fn test_zone_lookup_uses_strict_bounds() {
        let config = BoardConfig::default();
        assert_eq!(config.palette_at(300, 50).map(|z| z.color), Some(Color::BLUE));
        assert!(config.palette_at(250, 50).is_none());
        assert!(config.palette_at(300, 125).is_none());
        assert!(config.palette_at(500, 50).is_none());

        assert_eq!(config.toolbar_at(900, 650).map(|z| z.kind), Some(ShapeKind::Pyramid));
        assert!(config.toolbar_at(900, 595).is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = BoardConfig::from_json(r#"{ "max_size": 200.0, "default_shape": "sphere" }"#)
            .unwrap();
        assert_eq!(config.max_size, 200.0);
        assert_eq!(config.default_shape, ShapeKind::Sphere);
        assert_eq!(config.min_size, 50.0);
        assert_eq!(config.palette.len(), 4);
    }

    #[test]
    fn test_json_round_trip() {
        let config = BoardConfig::default();
        let text = config.to_json().unwrap();
        assert_eq!(BoardConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        assert!(matches!(
            BoardConfig::from_json(r#"{ "min_size": 400.0 }"#),
            Err(BoardError::InvalidConfig(_))
        ));
        assert!(matches!(
            BoardConfig::from_json(r#"{ "view_distance": 0.0 }"#),
            Err(BoardError::InvalidConfig(_))
        ));
        assert!(matches!(
            BoardConfig::from_json(
                r#"{ "toolbar": [ { "range": { "min": 10, "max": 10 }, "kind": "cube" } ] }"#
            ),
            Err(BoardError::InvalidConfig(_))
        ));
        assert!(matches!(
            BoardConfig::from_json(r#"{ "default_shape": "torus" }"#),
            Err(BoardError::Json(_))
        ));
    }

    #[test]
    fn test_clamp_size() {
        let config = BoardConfig::default();
        assert_eq!(config.clamp_size(10.0), 50.0);
        assert_eq!(config.clamp_size(80.0), 80.0);
        assert_eq!(config.clamp_size(400.0), 300.0);
    }
}
