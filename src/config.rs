//! Configuration file parser.
//!
//! Lengths are written with their units, as strings: `"5 mm"`, `"26.6 cm"`.
//! Every field is optional; missing ones take the values of the reference
//! detector.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer};

use units::Length;
use geometry::{DetectorLayout, ScintOption};

use crate::error::ConfigError;

fn deserialize_uom<'d, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    String::deserialize(deserializer)?
        .parse::<T>()
        .map_err(de::Error::custom)
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub detector: Detector,

    #[serde(default)]
    pub readout: Readout,

    #[serde(default)]
    pub output: Output,
}

impl Config {
    pub fn layout(&self) -> Result<DetectorLayout, ConfigError> { self.detector.layout() }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Detector {
    #[serde(deserialize_with = "deserialize_uom")]
    pub tungsten_thickness: Length,

    #[serde(deserialize_with = "deserialize_uom")]
    pub silicon_thickness: Length,

    pub n_layers: u32,

    #[serde(deserialize_with = "deserialize_uom")]
    pub pixel_width: Length,

    #[serde(deserialize_with = "deserialize_uom")]
    pub pixel_height: Length,

    #[serde(deserialize_with = "deserialize_uom")]
    pub width: Length,

    #[serde(deserialize_with = "deserialize_uom")]
    pub height: Length,

    /// -1: no scintillator, 0: one layer, 1: two layers
    pub sim_flag: i32,

    /// Segment the scintillator into bars rather than solid blocks
    pub scint_bars: bool,

    #[serde(deserialize_with = "deserialize_uom")]
    pub scint_bar_width: Length,

    #[serde(deserialize_with = "deserialize_uom")]
    pub scint_bar_height: Length,

    #[serde(deserialize_with = "deserialize_uom")]
    pub scint_thickness: Length,
}

impl Default for Detector {
    fn default() -> Self {
        let l = DetectorLayout::default();
        Self {
            tungsten_thickness: l.tungsten_thickness,
            silicon_thickness : l.silicon_thickness,
            n_layers          : l.n_layers,
            pixel_width       : l.pixel_width,
            pixel_height      : l.pixel_height,
            width             : l.detector_width,
            height            : l.detector_height,
            sim_flag          : l.scint.sim_flag(),
            scint_bars        : l.scint_bars,
            scint_bar_width   : l.scint_bar_width,
            scint_bar_height  : l.scint_bar_height,
            scint_thickness   : l.scint_thickness,
        }
    }
}

impl Detector {
    /// Validated detector layout
    pub fn layout(&self) -> Result<DetectorLayout, ConfigError> {
        let scint = ScintOption::from_sim_flag(self.sim_flag)
            .ok_or_else(|| ConfigError::Invalid(vec![
                format!("sim_flag must be -1, 0 or 1, not {}", self.sim_flag)
            ]))?;
        let layout = DetectorLayout {
            tungsten_thickness: self.tungsten_thickness,
            silicon_thickness : self.silicon_thickness,
            n_layers          : self.n_layers,
            pixel_width       : self.pixel_width,
            pixel_height      : self.pixel_height,
            detector_width    : self.width,
            detector_height   : self.height,
            scint,
            scint_bars        : self.scint_bars,
            scint_bar_width   : self.scint_bar_width,
            scint_bar_height  : self.scint_bar_height,
            scint_thickness   : self.scint_thickness,
        };
        let problems = layout.problems();
        if problems.is_empty() { Ok(layout) }
        else                   { Err(ConfigError::Invalid(problems)) }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Readout {
    /// 0: silent, 1: per-event summaries and warnings, 2: every hit
    pub verbosity: u32,

    /// Ignore steps of neutral particles in the pixels
    pub pixel_charged_only: bool,

    /// Ignore steps of neutral particles in the scintillator
    pub scint_charged_only: bool,
}

impl Default for Readout {
    fn default() -> Self { Self { verbosity: 0, pixel_charged_only: true, scint_charged_only: true } }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Output {
    /// Write the derived detector geometry alongside the hits
    pub save_geometry: bool,

    /// Write every track created in each event (primaries included)
    pub save_tracks: bool,

    /// Rows per HDF5 chunk
    pub chunk_size: usize,
}

impl Default for Output {
    fn default() -> Self { Self { save_geometry: true, save_tracks: false, chunk_size: 4096 } }
}

/// Half-open range `[min, max)`; a missing end is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd> Bounds<T> {
    pub fn none() -> Self { Self { min: None, max: None } }

    pub fn new(min: T, max: T) -> Self { Self { min: Some(min), max: Some(max) } }

    pub fn contains(&self, x: &T) -> bool {
        self.min.as_ref().map_or(true, |min| min <= x) &&
        self.max.as_ref().map_or(true, |max| x   < max)
    }
}

pub fn read_config_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    Ok(toml::from_str(&text)?)
}
