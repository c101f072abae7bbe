//! The per-detector state machine which turns a stream of steps into one
//! collection of hits per event.
//!
//! ```text
//!        begin_of_event            end_of_event / abort_event
//! Idle ─────────────────► EventActive ─────────────────────────► Idle
//!                          │    ▲
//!                          └────┘ process_step
//! ```
//!
//! Everything specific to a detector type (how elements are identified,
//! which steps count, what a hit records) lives in a [`Readout`].

pub mod pixel;
pub mod scint;

pub use pixel::{PixelReadout, PixelSnapshot};
pub use scint::{ScintReadout, ScintSnapshot};

/// Detector-specific policy plugged into a [`SensitiveDetector`]
pub trait Readout {
    /// Detector element identifier
    type Element: Copy + Ord + fmt::Display;
    /// Information taken from the first step of each (element, track) pair
    type Snapshot;
    type Hit: Hit;

    /// Drop steps of neutral particles
    fn charged_only(&self) -> bool;

    /// Partition function: which element does the touch history point at
    fn element(&self, touchable: &Touchable) -> Result<Self::Element, OutsidePartition>;

    fn snapshot(&self, step: &Step, lineage: LineageFlags) -> Self::Snapshot;

    fn hit(&self, key: HitKey<Self::Element>, deposit: Deposit<Self::Snapshot>) -> Self::Hit;
}

/// What happened to a step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Accumulated,
    /// Neutral particle in a charge-gated detector
    Neutral,
    /// Zero, negative or non-finite energy deposit
    NoDeposit,
    /// Copy numbers do not map onto an element of the configured detector
    OutsidePartition,
    /// Step in a volume whose detector is not enabled
    NotSensitive,
}

/// Step counts by outcome
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    pub accumulated      : u64,
    pub neutral          : u64,
    pub no_deposit       : u64,
    pub outside_partition: u64,
    pub not_sensitive    : u64,
}

impl StepStats {
    pub fn count(&mut self, outcome: StepOutcome) {
        use StepOutcome::*;
        *match outcome {
            Accumulated      => &mut self.accumulated,
            Neutral          => &mut self.neutral,
            NoDeposit        => &mut self.no_deposit,
            OutsidePartition => &mut self.outside_partition,
            NotSensitive     => &mut self.not_sensitive,
        } += 1;
    }

    pub fn total(&self) -> u64 {
        self.accumulated + self.neutral + self.no_deposit + self.outside_partition + self.not_sensitive
    }

    pub fn dropped(&self) -> u64 { self.total() - self.accumulated }
}

impl std::ops::AddAssign for StepStats {
    fn add_assign(&mut self, other: Self) {
        self.accumulated       += other.accumulated;
        self.neutral           += other.neutral;
        self.no_deposit        += other.no_deposit;
        self.outside_partition += other.outside_partition;
        self.not_sensitive     += other.not_sensitive;
    }
}

impl std::ops::Add for StepStats {
    type Output = Self;
    fn add(mut self, other: Self) -> Self { self += other; self }
}

#[derive(Debug)]
enum Phase<H> {
    Idle,
    EventActive { event_id: EventId, hits: HitsCollection<H> },
}

pub struct SensitiveDetector<R: Readout> {
    name           : String,
    collection_name: String,
    readout        : R,
    /// 0: silent, 1: per-event summary and warnings, 2: every hit
    verbosity      : u32,
    phase          : Phase<R::Hit>,
    accumulator    : HitAccumulator<HitKey<R::Element>, R::Snapshot>,
    event_stats    : StepStats,
    run_stats      : StepStats,
}

impl<R: Readout> SensitiveDetector<R> {

    pub fn new(name: impl Into<String>, collection_name: impl Into<String>, readout: R, verbosity: u32) -> Self {
        Self {
            name           : name.into(),
            collection_name: collection_name.into(),
            readout,
            verbosity,
            phase          : Phase::Idle,
            accumulator    : HitAccumulator::new(),
            event_stats    : StepStats::default(),
            run_stats      : StepStats::default(),
        }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn readout(&self) -> &R { &self.readout }

    pub fn is_active(&self) -> bool { matches!(self.phase, Phase::EventActive { .. }) }

    pub fn current_event(&self) -> Option<EventId> {
        match self.phase {
            Phase::EventActive { event_id, .. } => Some(event_id),
            Phase::Idle                         => None,
        }
    }

    /// Steps of the current (or most recently finished) event
    pub fn event_stats(&self) -> StepStats { self.event_stats }

    /// Steps of all finished events
    pub fn run_stats(&self) -> StepStats { self.run_stats }

    pub fn begin_of_event(&mut self, event_id: EventId) -> Result<(), LifecycleError> {
        if let Phase::EventActive { event_id: active, .. } = self.phase {
            return Err(LifecycleError::StartWhileActive { detector: self.name.clone(), active, requested: event_id })
        }
        self.accumulator.clear();
        self.event_stats = StepStats::default();
        self.phase = Phase::EventActive {
            event_id,
            hits: HitsCollection::new(&self.name, &self.collection_name),
        };
        Ok(())
    }

    pub fn process_step(&mut self, step: &Step, ancestry: &AncestryRegistry) -> Result<StepOutcome, LifecycleError> {
        let Phase::EventActive { event_id, .. } = self.phase else {
            return Err(LifecycleError::StepWhileIdle { detector: self.name.clone() })
        };
        let outcome = self.classify_and_accumulate(step, ancestry, event_id);
        self.event_stats.count(outcome);
        Ok(outcome)
    }

    fn classify_and_accumulate(&mut self, step: &Step, ancestry: &AncestryRegistry, event_id: EventId) -> StepOutcome {
        if self.readout.charged_only() && step.charge == 0.0 { return StepOutcome::Neutral }
        if !(step.edep.is_finite() && step.edep > Energy::ZERO) { return StepOutcome::NoDeposit }

        let element = match self.readout.element(&step.touchable) {
            Ok(element) => element,
            Err(e) => {
                if self.verbosity > 0 {
                    println!("Warning: {}: event {event_id}: dropping step of track {}: {e}", self.name, step.track_id);
                }
                return StepOutcome::OutsidePartition
            }
        };

        let readout = &self.readout;
        let key = HitKey::new(element, step.track_id);
        let snapshot = || readout.snapshot(step, ancestry.flags(step.track_id));
        match self.accumulator.accumulate(key, step.edep, snapshot) {
            Ok(()) => StepOutcome::Accumulated,
            Err(_) => StepOutcome::NoDeposit,
        }
    }

    /// Turn everything accumulated in this event into hits, and return to
    /// Idle. The hits come in key order: by element, then by track.
    pub fn end_of_event(&mut self) -> Result<HitsCollection<R::Hit>, LifecycleError> {
        let Phase::EventActive { event_id, mut hits } = std::mem::replace(&mut self.phase, Phase::Idle) else {
            return Err(LifecycleError::EndWhileIdle { detector: self.name.clone() })
        };
        for (key, deposit) in self.accumulator.drain() {
            if deposit.edep <= Energy::ZERO { continue }
            hits.push(self.readout.hit(key, deposit));
        }
        self.run_stats += self.event_stats;
        self.report(event_id, &hits);
        Ok(hits)
    }

    /// Discard everything gathered in the current event, if any
    pub fn abort_event(&mut self) {
        self.accumulator.clear();
        self.phase = Phase::Idle;
    }

    /// Summary of the steps which fell outside the partition in the current
    /// (or most recently finished) event. Printed whatever the verbosity.
    pub fn partition_warning(&self, event_id: EventId) -> Option<String> {
        let n = self.event_stats.outside_partition;
        (n > 0).then(|| format!("Warning: {}: event {event_id}: dropped {} steps outside the detector partition",
                                self.name, g(n)))
    }

    fn report(&self, event_id: EventId, hits: &HitsCollection<R::Hit>) {
        if let Some(warning) = self.partition_warning(event_id) { println!("{warning}") }
        if self.verbosity > 0 {
            let StepStats { accumulated, neutral, no_deposit, outside_partition, .. } = self.event_stats;
            println!("{}: event {event_id}: {} hits, {:.4} MeV from {} steps (dropped: {} neutral, {} without deposit, {} outside detector)",
                     self.name, g(hits.len()), mev_(hits.total_energy()),
                     g(accumulated), g(neutral), g(no_deposit), g(outside_partition));
        }
        if self.verbosity > 1 {
            println!("\n-------->Hits Collection: in this event there are {} hits in {}: ", hits.len(), self.collection_name);
            for hit in hits { println!("{hit}") }
        }
    }
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::fmt;
use units::{mev_, ConstZero, Energy};
use geometry::{OutsidePartition, Touchable};
use crate::{
    accumulator::{Deposit, HitAccumulator, HitKey},
    ancestry::{AncestryRegistry, LineageFlags},
    error::LifecycleError,
    hit::{Hit, HitsCollection},
    step::{EventId, Step},
    utils::group_digits as g,
};
