//! Finalized per-event hits and the named collections that carry them out of
//! a sensitive detector.

use std::fmt;

use units::{mev_, mm_, ConstZero, Energy};
use geometry::{PixelId, Point, ScintId};

use crate::ancestry::LineageFlags;
use crate::step::{FourMomentum, Pdg, TrackId};

/// Common view of the hits of all detector types
pub trait Hit: fmt::Display {
    fn edep(&self) -> Energy;
    fn track_id(&self) -> TrackId;
    fn lineage(&self) -> LineageFlags;
}

/// Energy deposited by one track in one silicon pixel during one event
#[derive(Clone, Debug, PartialEq)]
pub struct PixelHit {
    pub id            : PixelId,
    pub track_id      : TrackId,
    pub parent_id     : TrackId,
    pub pdg           : Pdg,
    pub charge        : f64,
    /// 4-momentum at the first step in the pixel
    pub p4            : FourMomentum,
    /// Pre-step position of the first step in the pixel
    pub truth_position: Point,
    pub edep          : Energy,
    pub lineage       : LineageFlags,
    pub n_steps       : u32,
}

/// Energy deposited by one track in one scintillator layer or bar during one
/// event
#[derive(Clone, Debug, PartialEq)]
pub struct ScintHit {
    pub id            : ScintId,
    pub track_id      : TrackId,
    pub parent_id     : TrackId,
    pub pdg           : Pdg,
    pub truth_position: Point,
    pub edep          : Energy,
    pub lineage       : LineageFlags,
    pub n_steps       : u32,
}

impl Hit for PixelHit {
    fn edep    (&self) -> Energy       { self.edep }
    fn track_id(&self) -> TrackId      { self.track_id }
    fn lineage (&self) -> LineageFlags { self.lineage }
}

impl Hit for ScintHit {
    fn edep    (&self) -> Energy       { self.edep }
    fn track_id(&self) -> TrackId      { self.track_id }
    fn lineage (&self) -> LineageFlags { self.lineage }
}

impl fmt::Display for PixelHit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (x, y, z) = self.truth_position.to_mm();
        write!(f, "  trackID: {}  PDG: {}  pixel: {}  EnergyDeposit: {:7.4} MeV  Position: ({x:.3}, {y:.3}, {z:.3}) mm",
               self.track_id, self.pdg, self.id, mev_(self.edep))
    }
}

impl fmt::Display for ScintHit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "  trackID: {}  PDG: {}  scintillator: {}  EnergyDeposit: {:7.4} MeV  z: {:.3} mm",
               self.track_id, self.pdg, self.id, mev_(self.edep), mm_(self.truth_position.z))
    }
}

/// Ordered hits of one detector for one event.
///
/// Only the sensitive detector which owns the collection adds hits to it,
/// while finalizing an event; everybody else gets read-only access.
#[derive(Clone, Debug, PartialEq)]
pub struct HitsCollection<H> {
    detector_name  : String,
    collection_name: String,
    hits           : Vec<H>,
}

impl<H> HitsCollection<H> {

    pub(crate) fn new(detector_name: impl Into<String>, collection_name: impl Into<String>) -> Self {
        Self {
            detector_name  : detector_name.into(),
            collection_name: collection_name.into(),
            hits           : vec![],
        }
    }

    pub(crate) fn push(&mut self, hit: H) { self.hits.push(hit) }

    pub fn detector_name  (&self) -> &str { &self.detector_name }
    pub fn collection_name(&self) -> &str { &self.collection_name }

    pub fn iter(&self) -> std::slice::Iter<'_, H> { self.hits.iter() }

    pub fn hits(&self) -> &[H] { &self.hits }

    pub fn len(&self) -> usize { self.hits.len() }

    pub fn is_empty(&self) -> bool { self.hits.is_empty() }

    pub fn into_inner(self) -> Vec<H> { self.hits }
}

impl<H: Hit> HitsCollection<H> {
    pub fn total_energy(&self) -> Energy {
        self.hits.iter().fold(Energy::ZERO, |total, hit| total + hit.edep())
    }
}

impl<'a, H> IntoIterator for &'a HitsCollection<H> {
    type Item = &'a H;
    type IntoIter = std::slice::Iter<'a, H>;
    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use units::{assert_uom_eq, mev};

    fn scint_hit(track_id: TrackId, e: f64) -> ScintHit {
        ScintHit {
            id: ScintId { layer: 0, bar: Some(3) },
            track_id,
            parent_id: 1,
            pdg: 13,
            truth_position: Point::from_mm(1.0, 2.0, 1005.0),
            edep: mev(e),
            lineage: LineageFlags::default(),
            n_steps: 1,
        }
    }

    #[test]
    fn collection_preserves_insertion_order() {
        let mut hits = HitsCollection::new("ScintSD", "ScintHitsCollection");
        for (t, e) in [(4, 1.0), (2, 0.5), (9, 2.5)] { hits.push(scint_hit(t, e)) }
        assert_eq!(hits.len(), 3);
        assert_eq!(hits.detector_name(), "ScintSD");
        assert_eq!(hits.collection_name(), "ScintHitsCollection");
        let tracks: Vec<_> = hits.iter().map(Hit::track_id).collect();
        assert_eq!(tracks, vec![4, 2, 9]);
        assert_uom_eq!(megaelectronvolt, hits.total_energy(), mev(4.0), r2nd <= 1e-12);
    }

    #[test]
    fn empty_collection() {
        let hits = HitsCollection::<ScintHit>::new("a", "b");
        assert!(hits.is_empty());
        assert_eq!(hits.total_energy(), Energy::ZERO);
        assert_eq!(hits.into_inner(), vec![]);
    }

    #[test]
    fn display_names_track_species_and_element() {
        let text = scint_hit(7, 1.25).to_string();
        assert!(text.contains("trackID: 7"));
        assert!(text.contains("PDG: 13"));
        assert!(text.contains("(layer 0, bar 3)"));
        assert!(text.contains("1.2500 MeV"));
    }
}
