//! Studio configuration.
//!
//! [`StudioConfig`] is the user-editable surface, read from and written back
//! to TOML. [`StudioConfig::commit`] validates it into a [`ValidatedConfig`]
//! holding engine types only.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::output_dir;
use crate::generate::GenerationRequest;
use crate::material::BlendMode;
use crate::paint::{Color, ColorStop, Gradient, GradientMode};
use crate::raster::TextureResolution;
use crate::shape::Shape;

/// Maximum number of color stops in a gradient.
pub const MAX_STOPS: usize = 8;

/// Characters that cannot appear in an exported file name.
const RESERVED_NAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file error: {0}")]
    File(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("config serialize error: {0}")]
    Serialize(String),
    #[error("gradient has {0} stops; at most 8 are supported")]
    TooManyStops(usize),
    #[error("gradient stop {index} has position {t}; expected a finite value in [0, 1]")]
    StopOutOfRange { index: usize, t: f32 },
    #[error("gradient stop {index} has invalid color `{value}`; expected #rrggbb or #rrggbbaa")]
    InvalidColor { index: usize, value: String },
    #[error("invalid texture name `{0}`")]
    InvalidTextureName(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// One gradient stop as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopConfig {
    pub t: f32,
    /// `#rrggbb` or `#rrggbbaa`.
    pub color: String,
}

impl StopConfig {
    pub fn new(t: f32, color: Color) -> Self {
        Self {
            t,
            color: color.to_hex(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    pub mode: GradientMode,
    pub stops: Vec<StopConfig>,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self::from(&Gradient::default())
    }
}

impl From<&Gradient> for GradientConfig {
    fn from(gradient: &Gradient) -> Self {
        Self {
            mode: gradient.mode(),
            stops: gradient
                .stops()
                .iter()
                .map(|s| StopConfig::new(s.t, s.color))
                .collect(),
        }
    }
}

impl GradientConfig {
    fn to_gradient(&self) -> ConfigResult<Gradient> {
        if self.stops.len() > MAX_STOPS {
            return Err(ConfigError::TooManyStops(self.stops.len()));
        }

        let stops = self
            .stops
            .iter()
            .enumerate()
            .map(|(index, stop)| {
                if !stop.t.is_finite() || !(0.0..=1.0).contains(&stop.t) {
                    return Err(ConfigError::StopOutOfRange { index, t: stop.t });
                }
                let color = Color::from_hex(&stop.color).ok_or_else(|| ConfigError::InvalidColor {
                    index,
                    value: stop.color.clone(),
                })?;
                Ok(ColorStop::new(stop.t, color))
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Gradient::new(stops, self.mode))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `env_logger` filter string. Falls back to `RUST_LOG`, then `info`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// User-editable generator settings.
///
/// Plain values come before the nested tables so the TOML output stays flat
/// at the top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Name of the particle renderer that receives the texture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub blend_mode: BlendMode,
    pub resolution: TextureResolution,
    pub shape: Shape,
    /// Output file stem. Defaults to `particleTexture_YYYY_MM_DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture_name: Option<String>,
    pub assets_root: PathBuf,
    pub gradient: GradientConfig,
    pub logging: LoggingSection,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            target: None,
            blend_mode: BlendMode::default(),
            resolution: TextureResolution::default(),
            shape: Shape::default(),
            texture_name: None,
            assets_root: PathBuf::from("Assets"),
            gradient: GradientConfig::default(),
            logging: LoggingSection::default(),
        }
    }
}

impl StudioConfig {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Validates the settings against the current date.
    pub fn commit(&self) -> ConfigResult<ValidatedConfig> {
        self.commit_at(SystemTime::now())
    }

    /// Validates the settings. `now` only feeds the default texture name.
    pub fn commit_at(&self, now: SystemTime) -> ConfigResult<ValidatedConfig> {
        let gradient = self.gradient.to_gradient()?;

        let texture_name = match &self.texture_name {
            Some(name) => {
                validate_texture_name(name)?;
                name.clone()
            }
            None => default_texture_name(now),
        };

        Ok(ValidatedConfig {
            target: self.target.clone(),
            request: GenerationRequest {
                shape: self.shape,
                resolution: self.resolution,
                gradient,
                blend_mode: self.blend_mode,
            },
            texture_name,
            output_dir: output_dir(&self.assets_root),
            log_filter: self.logging.filter.clone(),
        })
    }

    /// Copy of these settings with the committed texture name written in, so
    /// saving and reloading reproduces `settings` on any later date.
    pub fn pinned(&self, settings: &ValidatedConfig) -> StudioConfig {
        StudioConfig {
            texture_name: Some(settings.texture_name.clone()),
            ..self.clone()
        }
    }
}

/// Checked settings, ready for generation and export.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    pub target: Option<String>,
    pub request: GenerationRequest,
    pub texture_name: String,
    pub output_dir: PathBuf,
    pub log_filter: Option<String>,
}

fn validate_texture_name(name: &str) -> ConfigResult<()> {
    let trimmed = name.trim();
    let bad = trimmed.is_empty()
        || trimmed != name
        || name == "."
        || name == ".."
        || name.chars().any(|c| c.is_control() || RESERVED_NAME_CHARS.contains(&c));
    if bad {
        return Err(ConfigError::InvalidTextureName(name.to_string()));
    }
    Ok(())
}

/// `particleTexture_YYYY_MM_DD` for the UTC date of `now`.
pub fn default_texture_name(now: SystemTime) -> String {
    let secs = match now.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64) - 1,
    };
    let (y, m, d) = civil_from_days(secs.div_euclid(86_400));
    format!("particleTexture_{y:04}_{m:02}_{d:02}")
}

/// Proleptic Gregorian date for a day count relative to 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let y = yoe + era * 400 + i64::from(m <= 2);
    (y, m, d)
}
