use geometry::{OutsidePartition, PixelId, PixelPartition, Point, Touchable};

use crate::{
    accumulator::{Deposit, HitKey},
    ancestry::LineageFlags,
    hit::PixelHit,
    step::{FourMomentum, Pdg, Step, TrackId},
};

use super::Readout;

/// First-step information kept for each (pixel, track) pair
#[derive(Clone, Debug, PartialEq)]
pub struct PixelSnapshot {
    pub parent_id     : TrackId,
    pub pdg           : Pdg,
    pub charge        : f64,
    pub p4            : FourMomentum,
    pub truth_position: Point,
    pub lineage       : LineageFlags,
}

/// Silicon pixel planes. Elements are identified by the column (depth 0),
/// row (depth 1) and layer (depth 3) replica numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelReadout {
    partition   : PixelPartition,
    charged_only: bool,
}

impl PixelReadout {
    pub fn new(partition: PixelPartition, charged_only: bool) -> Self { Self { partition, charged_only } }

    pub fn partition(&self) -> PixelPartition { self.partition }
}

impl Readout for PixelReadout {
    type Element  = PixelId;
    type Snapshot = PixelSnapshot;
    type Hit      = PixelHit;

    fn charged_only(&self) -> bool { self.charged_only }

    fn element(&self, touchable: &Touchable) -> Result<PixelId, OutsidePartition> {
        self.partition.element(touchable)
    }

    fn snapshot(&self, step: &Step, lineage: LineageFlags) -> PixelSnapshot {
        PixelSnapshot {
            parent_id     : step.parent_id,
            pdg           : step.pdg,
            charge        : step.charge,
            p4            : step.p4,
            truth_position: step.pre_position,
            lineage,
        }
    }

    fn hit(&self, key: HitKey<PixelId>, deposit: Deposit<PixelSnapshot>) -> PixelHit {
        let Deposit { edep, n_steps, snapshot } = deposit;
        let PixelSnapshot { parent_id, pdg, charge, p4, truth_position, lineage } = snapshot;
        PixelHit {
            id: key.element,
            track_id: key.track,
            parent_id, pdg, charge, p4, truth_position, edep, lineage, n_steps,
        }
    }
}
