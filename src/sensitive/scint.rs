use geometry::{OutsidePartition, Point, ScintId, ScintPartition, Touchable};

use crate::{
    accumulator::{Deposit, HitKey},
    ancestry::LineageFlags,
    hit::ScintHit,
    step::{Pdg, Step, TrackId},
};

use super::Readout;

#[derive(Clone, Debug, PartialEq)]
pub struct ScintSnapshot {
    pub parent_id     : TrackId,
    pub pdg           : Pdg,
    pub truth_position: Point,
    pub lineage       : LineageFlags,
}

/// Scintillator layers behind the pixel stack: whole blocks (layer at depth
/// 0) or bars (bar at depth 0, layer at depth 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScintReadout {
    partition   : ScintPartition,
    charged_only: bool,
}

impl ScintReadout {
    pub fn new(partition: ScintPartition, charged_only: bool) -> Self { Self { partition, charged_only } }

    pub fn partition(&self) -> ScintPartition { self.partition }
}

impl Readout for ScintReadout {
    type Element  = ScintId;
    type Snapshot = ScintSnapshot;
    type Hit      = ScintHit;

    fn charged_only(&self) -> bool { self.charged_only }

    fn element(&self, touchable: &Touchable) -> Result<ScintId, OutsidePartition> {
        self.partition.element(touchable)
    }

    fn snapshot(&self, step: &Step, lineage: LineageFlags) -> ScintSnapshot {
        ScintSnapshot {
            parent_id     : step.parent_id,
            pdg           : step.pdg,
            truth_position: step.pre_position,
            lineage,
        }
    }

    fn hit(&self, key: HitKey<ScintId>, deposit: Deposit<ScintSnapshot>) -> ScintHit {
        let Deposit { edep, n_steps, snapshot: ScintSnapshot { parent_id, pdg, truth_position, lineage } } = deposit;
        ScintHit { id: key.element, track_id: key.track, parent_id, pdg, truth_position, edep, lineage, n_steps }
    }
}
