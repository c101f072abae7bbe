//! Detector element identifiers and the partition functions which derive them
//! from the copy numbers of replicated volumes.
//!
//! The pixel hierarchy is
//!
//! ```text
//! Layer (replica along z)
//! └── SiliconLayer (single placement)
//!     └── SiliconPixelRow (replica along y)
//!         └── SiliconPixel (replica along x)
//! ```
//!
//! so a step in a pixel sees the column at depth 0, the row at depth 1 and
//! the layer at depth 3. Scintillator blocks sit directly in their layer
//! volume (depth 0); scintillator bars are replicas inside the layer volume
//! (bar at depth 0, layer at depth 1).

use std::fmt;
use thiserror::Error;

use crate::{DetectorLayout, Touchable};

/// One silicon pixel
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PixelId {
    pub layer: u32,
    pub row  : u32,
    pub col  : u32,
}

/// One scintillator layer, or one bar within it
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScintId {
    pub layer: u32,
    /// `None` in block geometry
    pub bar  : Option<u32>,
}

impl fmt::Display for PixelId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(layer {}, row {}, col {})", self.layer, self.row, self.col)
    }
}

impl fmt::Display for ScintId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.bar {
            Some(bar) => write!(f, "(layer {}, bar {bar})", self.layer),
            None      => write!(f, "(layer {})", self.layer),
        }
    }
}

/// A touch history which does not correspond to any element of the
/// configured detector
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutsidePartition {
    #[error("touch history has no level at depth {depth}")]
    MissingLevel { depth: usize },

    #[error("{level} copy number {copy_number} outside [0, {limit})")]
    OutOfRange { level: &'static str, copy_number: i32, limit: u32 },
}

/// Check `copy_number` at `depth` against `[0, limit)`
fn index_at(touchable: &Touchable, depth: usize, level: &'static str, limit: u32) -> Result<u32, OutsidePartition> {
    let copy_number = touchable.copy_number(depth).ok_or(OutsidePartition::MissingLevel { depth })?;
    match u32::try_from(copy_number) {
        Ok(n) if n < limit => Ok(n),
        _ => Err(OutsidePartition::OutOfRange { level, copy_number, limit }),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelPartition {
    pub n_layers: u32,
    pub n_rows  : u32,
    pub n_cols  : u32,
}

impl PixelPartition {
    pub const COL_DEPTH  : usize = 0;
    pub const ROW_DEPTH  : usize = 1;
    pub const LAYER_DEPTH: usize = 3;

    pub fn element(&self, touchable: &Touchable) -> Result<PixelId, OutsidePartition> {
        let col   = index_at(touchable, Self::COL_DEPTH  , "column", self.n_cols  )?;
        let row   = index_at(touchable, Self::ROW_DEPTH  , "row"   , self.n_rows  )?;
        let layer = index_at(touchable, Self::LAYER_DEPTH, "layer" , self.n_layers)?;
        Ok(PixelId { layer, row, col })
    }

    /// The touch history a step in `id` would report
    pub fn touchable(id: PixelId) -> Touchable {
        let PixelId { layer, row, col } = id;
        Touchable::new([col as i32, row as i32, 0, layer as i32])
    }
}

impl From<&DetectorLayout> for PixelPartition {
    fn from(layout: &DetectorLayout) -> Self {
        Self { n_layers: layout.n_layers, n_rows: layout.n_rows(), n_cols: layout.n_cols() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScintPartition {
    pub n_layers: u32,
    /// `None` in block geometry
    pub n_bars  : Option<u32>,
}

impl ScintPartition {
    pub fn element(&self, touchable: &Touchable) -> Result<ScintId, OutsidePartition> {
        match self.n_bars {
            None => {
                let layer = index_at(touchable, 0, "scintillator layer", self.n_layers)?;
                Ok(ScintId { layer, bar: None })
            }
            Some(n_bars) => {
                let bar   = index_at(touchable, 0, "scintillator bar"  , n_bars       )?;
                let layer = index_at(touchable, 1, "scintillator layer", self.n_layers)?;
                Ok(ScintId { layer, bar: Some(bar) })
            }
        }
    }

    /// The touch history a step in `id` would report
    pub fn touchable(id: ScintId) -> Touchable {
        match id.bar {
            Some(bar) => Touchable::new([bar as i32, id.layer as i32]),
            None      => Touchable::new([id.layer as i32]),
        }
    }
}

impl From<&DetectorLayout> for ScintPartition {
    fn from(layout: &DetectorLayout) -> Self {
        Self { n_layers: layout.n_scint_layers(), n_bars: layout.n_scint_bars() }
    }
}
