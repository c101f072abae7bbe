//! Lineage of the tracks of one event.
//!
//! Every track inherits the lineage flags of its parent at creation time, and
//! may gain more by being classified itself (it *is* the primary lepton, it
//! *is* a muon, ...). Because a parent is always created before its children,
//! copying the parent's flags at creation is enough to give every track the
//! transitive closure of its ancestors' flags.
//!
//! Track ids are reused from one event to the next, so the registry must be
//! cleared at every event start.

use std::collections::HashMap;

use crate::step::{pdg, TrackCreation, TrackId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lineage {
    /// Descends from (or is) the primary charged lepton
    PrimaryLepton,
    /// Descends from (or is) a muon
    Muon,
    /// Descends from (or is) a primary neutral pion
    PrimaryPizero,
    /// Descends from (or is) a neutral pion produced by the primary lepton
    FslPizero,
}

impl Lineage {
    pub const ALL: [Lineage; 4] = [Self::PrimaryLepton, Self::Muon, Self::PrimaryPizero, Self::FslPizero];
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineageFlags {
    pub from_primary_lepton: bool,
    pub from_muon          : bool,
    pub from_primary_pizero: bool,
    pub from_fsl_pizero    : bool,
}

impl LineageFlags {

    pub fn get(&self, flag: Lineage) -> bool {
        match flag {
            Lineage::PrimaryLepton => self.from_primary_lepton,
            Lineage::Muon          => self.from_muon,
            Lineage::PrimaryPizero => self.from_primary_pizero,
            Lineage::FslPizero     => self.from_fsl_pizero,
        }
    }

    pub fn set(&mut self, flag: Lineage, value: bool) {
        let field = match flag {
            Lineage::PrimaryLepton => &mut self.from_primary_lepton,
            Lineage::Muon          => &mut self.from_muon,
            Lineage::PrimaryPizero => &mut self.from_primary_pizero,
            Lineage::FslPizero     => &mut self.from_fsl_pizero,
        };
        *field = value;
    }

    pub fn with(mut self, flag: Lineage) -> Self { self.set(flag, true); self }

    pub fn any(&self) -> bool { Lineage::ALL.iter().any(|&flag| self.get(flag)) }

    /// Flags set in either `self` or `other`
    pub fn union(self, other: Self) -> Self {
        Self {
            from_primary_lepton: self.from_primary_lepton || other.from_primary_lepton,
            from_muon          : self.from_muon           || other.from_muon,
            from_primary_pizero: self.from_primary_pizero || other.from_primary_pizero,
            from_fsl_pizero    : self.from_fsl_pizero     || other.from_fsl_pizero,
        }
    }
}

/// Track id → lineage flags and primary ancestor, for the tracks of the
/// current event.
///
/// Owned by the event-processing context of one worker and passed explicitly
/// to whoever needs it; never shared between events processed concurrently.
#[derive(Clone, Debug, Default)]
pub struct AncestryRegistry {
    flags: HashMap<TrackId, LineageFlags>,
    ancestors: HashMap<TrackId, TrackId>,
    primary_lepton: Option<TrackId>,
}

impl AncestryRegistry {

    pub fn new() -> Self { Self::default() }

    /// Set `flag` of `track` to `value`. Repeating a call has no further effect.
    pub fn record_descendant(&mut self, track: TrackId, flag: Lineage, value: bool) {
        self.flags.entry(track).or_default().set(flag, value);
    }

    /// Unknown tracks are not descendants of anything
    pub fn is_flagged(&self, track: TrackId, flag: Lineage) -> bool {
        self.flags(track).get(flag)
    }

    pub fn flags(&self, track: TrackId) -> LineageFlags {
        self.flags.get(&track).copied().unwrap_or_default()
    }

    /// The primary at the root of `track`'s family tree. Primaries are their
    /// own ancestors; `None` for tracks whose chain back to a primary was
    /// never registered.
    pub fn primary_ancestor(&self, track: TrackId) -> Option<TrackId> {
        self.ancestors.get(&track).copied()
    }

    /// The track classified as the primary lepton of the current event, if any
    pub fn primary_lepton(&self) -> Option<TrackId> { self.primary_lepton }

    /// Register a newly spawned track: inherit the parent's flags and add
    /// those which follow from the track's own identity. Returns the track's
    /// resulting flags.
    pub fn track_created(&mut self, track: &TrackCreation) -> LineageFlags {
        let &TrackCreation { track_id, parent_id, pdg: code } = track;
        let parent = self.flags(parent_id);
        let mut flags = parent;

        let ancestor = if track.is_primary() { Some(track_id) } else { self.primary_ancestor(parent_id) };
        if let Some(ancestor) = ancestor { self.ancestors.insert(track_id, ancestor); }

        if track.is_primary() {
            if self.primary_lepton.is_none() && pdg::is_charged_lepton(code) {
                self.primary_lepton = Some(track_id);
                flags.from_primary_lepton = true;
            }
            if code == pdg::PIZERO { flags.from_primary_pizero = true }
        }
        if code.abs() == pdg::MUON { flags.from_muon = true }
        if code == pdg::PIZERO && parent.from_primary_lepton { flags.from_fsl_pizero = true }

        let flags = self.flags(track_id).union(flags);
        if flags.any() { self.flags.insert(track_id, flags); }
        flags
    }

    /// Forget everything: the next event reuses track ids
    pub fn clear(&mut self) {
        self.flags.clear();
        self.ancestors.clear();
        self.primary_lepton = None;
    }

    /// Number of tracks carrying explicitly recorded or inherited flags
    pub fn len(&self) -> usize { self.flags.len() }

    pub fn is_empty(&self) -> bool { self.flags.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;
    use crate::step::pdg::{ELECTRON, MUON, PIZERO};

    const PROTON: i32 = 2212;
    const PHOTON: i32 =   22;
    const PION  : i32 =  211;

    fn create(registry: &mut AncestryRegistry, track: TrackId, parent: TrackId, code: i32) -> LineageFlags {
        registry.track_created(&TrackCreation::new(track, parent, code))
    }

    #[test]
    fn unknown_tracks_are_not_flagged() {
        let registry = AncestryRegistry::new();
        for flag in Lineage::ALL {
            assert!(!registry.is_flagged(42, flag));
        }
        assert_eq!(registry.flags(42), LineageFlags::default());
    }

    #[test]
    fn recording_is_idempotent() {
        let mut registry = AncestryRegistry::new();
        registry.record_descendant(5, Lineage::Muon, true);
        let once = registry.clone();
        registry.record_descendant(5, Lineage::Muon, true);
        assert_eq!(registry.flags(5), once.flags(5));
        assert_eq!(registry.len(), 1);
        assert!(registry.is_flagged(5, Lineage::Muon));
        assert!(!registry.is_flagged(5, Lineage::PrimaryLepton));
    }

    #[test]
    fn recorded_flags_can_be_reset() {
        let mut registry = AncestryRegistry::new();
        registry.record_descendant(5, Lineage::FslPizero, true);
        registry.record_descendant(5, Lineage::FslPizero, false);
        assert!(!registry.is_flagged(5, Lineage::FslPizero));
    }

    #[test]
    fn children_inherit_without_explicit_recording() {
        let mut registry = AncestryRegistry::new();
        registry.record_descendant(1, Lineage::PrimaryLepton, true);
        create(&mut registry, 7, 1, PHOTON);
        create(&mut registry, 8, 7, ELECTRON);
        assert!(registry.is_flagged(7, Lineage::PrimaryLepton));
        assert!(registry.is_flagged(8, Lineage::PrimaryLepton));
    }

    #[test]
    fn first_primary_charged_lepton_is_the_primary_lepton() {
        let mut registry = AncestryRegistry::new();
        let proton = create(&mut registry, 1, 0, PROTON);
        let muon   = create(&mut registry, 2, 0, MUON);
        let second = create(&mut registry, 3, 0, ELECTRON);
        assert_eq!(proton, LineageFlags::default());
        assert_eq!(muon  , LineageFlags::default().with(Lineage::PrimaryLepton).with(Lineage::Muon));
        assert_eq!(second, LineageFlags::default());
        assert_eq!(registry.primary_lepton(), Some(2));
    }

    #[test]
    fn secondary_leptons_are_not_the_primary_lepton() {
        let mut registry = AncestryRegistry::new();
        create(&mut registry, 1, 0, PROTON);
        let electron = create(&mut registry, 2, 1, ELECTRON);
        assert!(!electron.from_primary_lepton);
        assert_eq!(registry.primary_lepton(), None);
    }

    #[test]
    fn pizero_classification() {
        let mut registry = AncestryRegistry::new();
        create(&mut registry, 1, 0, -15); // tau
        let primary_pizero = create(&mut registry, 2, 0, PIZERO);
        let fsl_pizero     = create(&mut registry, 3, 1, PIZERO);
        let fsl_photon     = create(&mut registry, 4, 3, PHOTON);
        let other_pizero   = create(&mut registry, 5, 2, PIZERO);

        assert_eq!(primary_pizero, LineageFlags::default().with(Lineage::PrimaryPizero));
        assert_eq!(fsl_pizero    , LineageFlags::default().with(Lineage::PrimaryLepton).with(Lineage::FslPizero));
        assert_eq!(fsl_photon    , fsl_pizero);
        assert_eq!(other_pizero  , primary_pizero);
    }

    #[test]
    fn muons_from_pion_decay() {
        let mut registry = AncestryRegistry::new();
        create(&mut registry, 1, 0, PION);
        let muon     = create(&mut registry, 2, 1, -MUON);
        let electron = create(&mut registry, 3, 2, -ELECTRON);
        assert!(muon.from_muon && electron.from_muon);
        assert!(!registry.is_flagged(1, Lineage::Muon));
    }

    #[test]
    fn explicitly_recorded_flags_survive_creation() {
        let mut registry = AncestryRegistry::new();
        registry.record_descendant(9, Lineage::PrimaryPizero, true);
        let flags = create(&mut registry, 9, 4, PHOTON);
        assert!(flags.from_primary_pizero);
    }

    #[test]
    fn clear_isolates_events() {
        let mut registry = AncestryRegistry::new();
        create(&mut registry, 1, 0, MUON);
        create(&mut registry, 2, 1, ELECTRON);
        assert!(!registry.is_empty());
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.primary_lepton(), None);
        for track in [1, 2] {
            for flag in Lineage::ALL { assert!(!registry.is_flagged(track, flag)) }
        }
        // A new event may elect a new primary lepton
        create(&mut registry, 1, 0, ELECTRON);
        assert_eq!(registry.primary_lepton(), Some(1));
    }

    #[test]
    fn descendants_resolve_to_their_primary() {
        let mut registry = AncestryRegistry::new();
        create(&mut registry, 1, 0, MUON);
        create(&mut registry, 2, 0, PROTON);
        create(&mut registry, 3, 1, PHOTON);
        create(&mut registry, 4, 3, ELECTRON);
        create(&mut registry, 5, 2, PION);
        create(&mut registry, 6, 99, PHOTON); // parent never registered

        let ancestors: Vec<_> = (1..=6).map(|t| registry.primary_ancestor(t)).collect();
        assert_eq!(ancestors, vec![Some(1), Some(2), Some(1), Some(1), Some(2), None]);

        registry.clear();
        assert_eq!(registry.primary_ancestor(4), None);
        // Next event: the same id now descends from another primary
        create(&mut registry, 2, 0, ELECTRON);
        create(&mut registry, 4, 2, PHOTON);
        assert_eq!(registry.primary_ancestor(4), Some(2));
        assert_eq!(registry.primary_ancestor(1), None);
    }

    #[rstest]
    #[case(Lineage::PrimaryLepton)]
    #[case(Lineage::Muon)]
    #[case(Lineage::PrimaryPizero)]
    #[case(Lineage::FslPizero)]
    fn flags_get_what_they_set(#[case] flag: Lineage) {
        let flags = LineageFlags::default().with(flag);
        for other in Lineage::ALL {
            assert_eq!(flags.get(other), other == flag);
        }
    }

    proptest! {
        // Every track in a randomly grown family tree rooted at a flagged
        // track must carry the flag.
        #[test]
        fn lineage_is_transitive(parents in proptest::collection::vec(any::<prop::sample::Index>(), 1..200)) {
            let mut registry = AncestryRegistry::new();
            registry.record_descendant(1, Lineage::PrimaryLepton, true);
            let mut known: Vec<TrackId> = vec![1];
            for (n, parent) in parents.iter().enumerate() {
                let track = n as TrackId + 2;
                let parent = *parent.get(&known);
                create(&mut registry, track, parent, PHOTON);
                known.push(track);
            }
            for track in known {
                prop_assert!(registry.is_flagged(track, Lineage::PrimaryLepton));
            }
        }
    }
}
