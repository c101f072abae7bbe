//! Everything one worker needs to turn the records of one event into hits.

/// Records of one event, in the order the transport engine produced them
#[derive(Clone, Debug, Default, PartialEq)]
pub struct McEvent {
    pub event_id: EventId,
    pub tracks  : Vec<TrackCreation>,
    pub steps   : Vec<Step>,
}

/// A track created during an event, as classified by the ancestry registry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackRecord {
    pub track_id        : TrackId,
    pub parent_id       : TrackId,
    pub pdg             : Pdg,
    pub primary_ancestor: Option<TrackId>,
    pub lineage         : LineageFlags,
}

impl TrackRecord {
    pub fn is_primary(&self) -> bool { self.parent_id == NO_PARENT }
}

/// The hit collections of all enabled detectors for one event
#[derive(Clone, Debug, PartialEq)]
pub struct EventHits {
    pub event_id: EventId,
    pub pixel   : HitsCollection<PixelHit>,
    /// `None` when the detector has no scintillator
    pub scint   : Option<HitsCollection<ScintHit>>,
    pub steps   : StepStats,
    /// Tracks in order of creation
    pub tracks  : Vec<TrackRecord>,
}

impl EventHits {
    pub fn total_energy(&self) -> Energy {
        self.pixel.total_energy() + self.scint.as_ref().map_or(Energy::ZERO, HitsCollection::total_energy)
    }

    pub fn n_hits(&self) -> usize {
        self.pixel.len() + self.scint.as_ref().map_or(0, HitsCollection::len)
    }
}

pub const PIXEL_DETECTOR  : &str = "PixelSD";
pub const PIXEL_COLLECTION: &str = "PixelHitsCollection";
pub const SCINT_DETECTOR  : &str = "ScintillatorSD";
pub const SCINT_COLLECTION: &str = "ScintHitsCollection";

/// Ancestry registry plus the enabled sensitive detectors of one worker.
///
/// Events must be processed strictly one after the other; workers processing
/// events in parallel each own a separate `EventProcessor`.
pub struct EventProcessor {
    ancestry: AncestryRegistry,
    pixel   : SensitiveDetector<PixelReadout>,
    scint   : Option<SensitiveDetector<ScintReadout>>,
    /// Steps not claimed by any enabled detector in the current event
    ignored : StepStats,
    tracks  : Vec<TrackRecord>,
}

impl EventProcessor {

    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::with_layout(&config.layout()?, &config.readout))
    }

    pub fn with_layout(layout: &DetectorLayout, readout: &config::Readout) -> Self {
        let pixel = SensitiveDetector::new(
            PIXEL_DETECTOR, PIXEL_COLLECTION,
            PixelReadout::new(layout.into(), readout.pixel_charged_only),
            readout.verbosity,
        );
        let scint = (layout.n_scint_layers() > 0).then(|| SensitiveDetector::new(
            SCINT_DETECTOR, SCINT_COLLECTION,
            ScintReadout::new(layout.into(), readout.scint_charged_only),
            readout.verbosity,
        ));
        Self { ancestry: AncestryRegistry::new(), pixel, scint, ignored: StepStats::default(), tracks: vec![] }
    }

    pub fn ancestry(&self) -> &AncestryRegistry { &self.ancestry }

    pub fn has_scintillator(&self) -> bool { self.scint.is_some() }

    /// Track ids start again in every event: forget the previous one's lineage
    pub fn begin_event(&mut self, event_id: EventId) -> Result<(), LifecycleError> {
        self.pixel.begin_of_event(event_id)?;
        if let Some(scint) = &mut self.scint {
            if let Err(e) = scint.begin_of_event(event_id) {
                self.pixel.abort_event();
                return Err(e)
            }
        }
        self.ancestry.clear();
        self.ignored = StepStats::default();
        self.tracks.clear();
        Ok(())
    }

    pub fn track_created(&mut self, track: &TrackCreation) -> LineageFlags {
        let lineage = self.ancestry.track_created(track);
        let &TrackCreation { track_id, parent_id, pdg } = track;
        let primary_ancestor = self.ancestry.primary_ancestor(track_id);
        self.tracks.push(TrackRecord { track_id, parent_id, pdg, primary_ancestor, lineage });
        lineage
    }

    pub fn step(&mut self, step: &Step) -> Result<StepOutcome, LifecycleError> {
        match (step.volume, &mut self.scint) {
            (SensitiveVolume::Pixel       , _          ) => self.pixel.process_step(step, &self.ancestry),
            (SensitiveVolume::Scintillator, Some(scint)) =>      scint.process_step(step, &self.ancestry),
            (SensitiveVolume::Scintillator, None       ) => {
                if !self.pixel.is_active() {
                    return Err(LifecycleError::StepWhileIdle { detector: SCINT_DETECTOR.into() })
                }
                self.ignored.count(StepOutcome::NotSensitive);
                Ok(StepOutcome::NotSensitive)
            }
        }
    }

    pub fn end_event(&mut self) -> Result<EventHits, LifecycleError> {
        let event_id = self.current_event();
        let pixel = self.pixel.end_of_event()?;
        let scint = self.scint.as_mut().map(SensitiveDetector::end_of_event).transpose()?;
        let steps = self.pixel.event_stats()
            + self.scint.as_ref().map_or_else(StepStats::default, SensitiveDetector::event_stats)
            + self.ignored;
        let tracks = std::mem::take(&mut self.tracks);
        Ok(EventHits { event_id: event_id.unwrap_or_default(), pixel, scint, steps, tracks })
    }

    /// Drop everything gathered in the current event
    pub fn abort_event(&mut self) {
        self.pixel.abort_event();
        if let Some(scint) = &mut self.scint { scint.abort_event() }
        self.ancestry.clear();
        self.ignored = StepStats::default();
        self.tracks.clear();
    }

    /// Feed a whole recorded event through the detectors: all track
    /// creations first (parents precede children), then the steps in order.
    pub fn process_event(&mut self, event: &McEvent) -> Result<EventHits, LifecycleError> {
        self.begin_event(event.event_id)?;
        for track in &event.tracks { self.track_created(track); }
        for step  in &event.steps  {
            if let Err(e) = self.step(step) {
                self.abort_event();
                return Err(e)
            }
        }
        self.end_event()
    }

    /// Steps seen by every detector over all finished events
    pub fn run_stats(&self) -> StepStats {
        self.pixel.run_stats() + self.scint.as_ref().map_or_else(StepStats::default, SensitiveDetector::run_stats)
    }

    fn current_event(&self) -> Option<EventId> { self.pixel.current_event() }
}

/// Process `events` in parallel, one `EventProcessor` per rayon worker.
///
/// The results come back in the order of `events`, whatever the number of
/// threads.
pub fn process_events(events: &[McEvent], layout: &DetectorLayout, readout: &config::Readout) -> Vec<Result<EventHits, LifecycleError>> {
    events
        .par_iter()
        .map_init(|| EventProcessor::with_layout(layout, readout),
                  |processor, event| processor.process_event(event))
        .collect()
}

// ----- Imports -----------------------------------------------------------------------------------------
use rayon::prelude::*;
use units::{ConstZero, Energy};
use geometry::DetectorLayout;
use crate::{
    ancestry::{AncestryRegistry, LineageFlags},
    config::{self, Config},
    error::{ConfigError, LifecycleError},
    hit::{HitsCollection, PixelHit, ScintHit},
    sensitive::{PixelReadout, ScintReadout, SensitiveDetector, StepOutcome, StepStats},
    step::{EventId, Pdg, SensitiveVolume, Step, TrackCreation, TrackId, NO_PARENT},
};
