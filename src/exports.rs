pub use units::{Energy, Length};
pub use geometry::{DetectorLayout, PixelId, Point, ScintId, ScintOption, Touchable};

pub use crate::ancestry::{AncestryRegistry, Lineage, LineageFlags};
pub use crate::accumulator::{HitAccumulator, HitKey};
pub use crate::error::{ConfigError, Error, LifecycleError};
pub use crate::event::{EventHits, EventProcessor, McEvent, TrackRecord};
pub use crate::hit::{Hit, HitsCollection, PixelHit, ScintHit};
pub use crate::sensitive::{SensitiveDetector, StepOutcome, StepStats};
pub use crate::step::{EventId, FourMomentum, Pdg, SensitiveVolume, Step, TrackCreation, TrackId};
