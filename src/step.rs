//! Records delivered by the transport engine: energy-deposit steps and
//! track-creation notifications.

use units::{mev, mev_, Energy};
use geometry::{Point, Touchable};

/// Identifier of a track, unique within one event only.
///
/// Primaries have parent `0`.
pub type TrackId = u32;

/// PDG particle species code
pub type Pdg = i32;

/// Sequence number of a simulated event
pub type EventId = u32;

/// Parent id carried by primary particles
pub const NO_PARENT: TrackId = 0;

/// PDG codes which drive lineage classification
pub mod pdg {
    use super::Pdg;
    pub const ELECTRON: Pdg =  11;
    pub const MUON    : Pdg =  13;
    pub const TAU     : Pdg =  15;
    pub const PIZERO  : Pdg = 111;

    pub fn is_charged_lepton(code: Pdg) -> bool {
        matches!(code.abs(), ELECTRON | MUON | TAU)
    }
}

/// Energy-momentum 4-vector, with momentum components expressed as energies
/// (`p c`)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FourMomentum {
    pub px: Energy,
    pub py: Energy,
    pub pz: Energy,
    pub e : Energy,
}

impl FourMomentum {
    pub fn new(px: Energy, py: Energy, pz: Energy, e: Energy) -> Self { Self { px, py, pz, e } }

    /// Construct from `f64`s which are interpreted as energies in `MeV`
    pub fn from_mev(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self::new(mev(px), mev(py), mev(pz), mev(e))
    }

    pub fn to_mev(self) -> (f64, f64, f64, f64) {
        (mev_(self.px), mev_(self.py), mev_(self.pz), mev_(self.e))
    }
}

impl Default for FourMomentum {
    fn default() -> Self { Self::from_mev(0.0, 0.0, 0.0, 0.0) }
}

/// Which sensitive detector a step was taken in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SensitiveVolume {
    Pixel,
    Scintillator,
}

/// Read-only view of one step through a sensitive volume
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub track_id    : TrackId,
    pub parent_id   : TrackId,
    pub pdg         : Pdg,
    /// In units of the elementary charge
    pub charge      : f64,
    /// Total energy deposited along the step
    pub edep        : Energy,
    pub pre_position: Point,
    pub p4          : FourMomentum,
    pub volume      : SensitiveVolume,
    pub touchable   : Touchable,
}

/// Fired once for every track the engine spawns, before any of its steps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackCreation {
    pub track_id : TrackId,
    pub parent_id: TrackId,
    pub pdg      : Pdg,
}

impl TrackCreation {
    pub fn new(track_id: TrackId, parent_id: TrackId, pdg: Pdg) -> Self {
        Self { track_id, parent_id, pdg }
    }

    pub fn is_primary(&self) -> bool { self.parent_id == NO_PARENT }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(  11, true )]
    #[case( -13, true )]
    #[case(  15, true )]
    #[case(  12, false)]
    #[case( 211, false)]
    #[case(2212, false)]
    fn charged_leptons(#[case] code: Pdg, #[case] expected: bool) {
        assert_eq!(pdg::is_charged_lepton(code), expected);
    }

    #[test]
    fn primaries_have_no_parent() {
        assert!( TrackCreation::new(1, 0, 13).is_primary());
        assert!(!TrackCreation::new(2, 1, 11).is_primary());
    }
}
