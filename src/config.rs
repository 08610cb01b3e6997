//! Configuration persistence for canvas settings

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// RGBA color, serialized as a `#rrggbb` / `#rrggbbaa` hex string
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for ShapeColor {
    fn default() -> Self {
        Self::RED
    }
}

impl ShapeColor {
    pub const RED: ShapeColor = ShapeColor::rgb(0xff, 0x00, 0x00);
    pub const TRANSPARENT: ShapeColor = ShapeColor {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or the keyword `transparent`
    pub fn from_hex(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("transparent") {
            return Ok(Self::TRANSPARENT);
        }
        let Some(hex) = s.strip_prefix('#') else {
            bail!("color {s:?} must start with '#'");
        };
        if !hex.is_ascii() {
            bail!("color {s:?} contains non-hex characters");
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .with_context(|| format!("invalid hex digits in color {s:?}"))
        };
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(hex.chars()) {
                    let v = c
                        .to_digit(16)
                        .with_context(|| format!("invalid hex digit in color {s:?}"))?
                        as u8;
                    *slot = v * 17;
                }
                Ok(Self::rgb(out[0], out[1], out[2]))
            }
            6 => Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => bail!("color {s:?} has unsupported length"),
        }
    }

    /// Lowercase hex form; alpha is only written when not opaque
    pub fn to_hex(self) -> String {
        if self.a == 0xff {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

impl fmt::Debug for ShapeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Display for ShapeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ShapeColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ShapeColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ShapeColor::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Stroke widths used for newly created shapes, per tool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeWidths {
    pub freehand: f32,
    pub rectangle: f32,
    pub circle: f32,
    pub arrow: f32,
    pub text: f32,
}

impl Default for StrokeWidths {
    fn default() -> Self {
        Self {
            freehand: 3.0,
            rectangle: 2.0,
            circle: 2.0,
            arrow: 2.0,
            text: 1.0,
        }
    }
}

/// Canvas configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Color active when the canvas starts
    pub default_color: ShapeColor,
    /// Colors offered by the toolbar
    pub palette: Vec<ShapeColor>,
    /// Bounding box the background is scaled to fit
    pub max_width: f32,
    pub max_height: f32,
    pub stroke_widths: StrokeWidths,
    /// Font size for text labels in pixels
    pub font_size: f32,
    /// TrueType/OpenType font used for text labels (None = probe system fonts)
    pub font_path: Option<PathBuf>,
    /// Extra slack in pixels around thin strokes when hit-testing
    pub hit_tolerance: f32,
    /// Interactive transforms may not shrink a node below this size
    pub min_transform_size: f32,
}

fn default_palette() -> Vec<ShapeColor> {
    vec![
        ShapeColor::rgb(0xff, 0x00, 0x00),
        ShapeColor::rgb(0x00, 0xff, 0x00),
        ShapeColor::rgb(0x00, 0x00, 0xff),
        ShapeColor::rgb(0xff, 0xff, 0x00),
        ShapeColor::rgb(0xff, 0x00, 0xff),
        ShapeColor::rgb(0x00, 0xff, 0xff),
    ]
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            default_color: ShapeColor::RED,
            palette: default_palette(),
            max_width: 800.0,
            max_height: 600.0,
            stroke_widths: StrokeWidths::default(),
            font_size: 16.0,
            font_path: None,
            hit_tolerance: 3.0,
            min_transform_size: 5.0,
        }
    }
}

impl CanvasConfig {
    /// Directory name under the platform config dir
    pub const ID: &'static str = "annotation-canvas";

    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => config,
                Err(err) => {
                    log::warn!("Error loading config, using defaults: {err:?}");
                    Self::default()
                }
            },
            Some(_) => Self::default(),
            None => {
                log::warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            log::error!("Could not determine config directory for saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {err:?}");
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).with_context(|| format!("writing config {}", path.display()))
    }

    /// Whether `color` is one of the toolbar colors
    pub fn in_palette(&self, color: ShapeColor) -> bool {
        self.palette.contains(&color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(ShapeColor::from_hex("#ff0000").unwrap(), ShapeColor::RED);
        assert_eq!(ShapeColor::from_hex("#F00").unwrap(), ShapeColor::RED);
        assert_eq!(
            ShapeColor::from_hex("#00ff0080").unwrap(),
            ShapeColor {
                r: 0,
                g: 0xff,
                b: 0,
                a: 0x80
            }
        );
        assert!(ShapeColor::from_hex("transparent").unwrap().is_transparent());
    }

    #[test]
    fn test_reject_bad_colors() {
        assert!(ShapeColor::from_hex("ff0000").is_err());
        assert!(ShapeColor::from_hex("#ff00").is_err());
        assert!(ShapeColor::from_hex("#gg0000").is_err());
    }

    #[test]
    fn test_to_hex_omits_opaque_alpha() {
        assert_eq!(ShapeColor::rgb(0, 0xff, 0xff).to_hex(), "#00ffff");
        assert_eq!(ShapeColor::TRANSPARENT.to_hex(), "#00000000");
    }

    #[test]
    fn test_default_palette_matches_toolbar() {
        let config = CanvasConfig::default();
        assert_eq!(config.palette.len(), 6);
        assert!(config.in_palette(config.default_color));
        assert!(!config.in_palette(ShapeColor::rgb(1, 2, 3)));
    }

    #[test]
    fn test_config_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = CanvasConfig {
            font_size: 20.0,
            default_color: ShapeColor::rgb(0, 0, 0xff),
            ..CanvasConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(CanvasConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: CanvasConfig = serde_json::from_str(r##"{"default_color": "#00ff00"}"##).unwrap();
        assert_eq!(config.default_color, ShapeColor::rgb(0, 0xff, 0));
        assert_eq!(config.max_width, 800.0);
        assert_eq!(config.stroke_widths, StrokeWidths::default());
    }
}
