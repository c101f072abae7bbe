//! Order-independent summation of energy deposits by composite key.

use std::collections::btree_map::{self, BTreeMap, Entry};

use units::{ConstZero, Energy};

use crate::step::TrackId;

/// Granularity at which deposits are summed: one detector element, one
/// track.
///
/// Ordering is structural (element first, then track), so iterating over
/// keys visits detector elements in order, and the deposits of different
/// tracks in the same element next to each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HitKey<E> {
    pub element: E,
    pub track  : TrackId,
}

impl<E> HitKey<E> {
    pub fn new(element: E, track: TrackId) -> Self { Self { element, track } }
}

/// Running total for one key
#[derive(Clone, Debug, PartialEq)]
pub struct Deposit<S> {
    pub edep    : Energy,
    pub n_steps : u32,
    /// Taken from the first accepted step; never updated afterwards
    pub snapshot: S,
}

/// Why a deposit was not accumulated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejected {
    NonFinite,
    NonPositive,
}

#[derive(Clone, Debug)]
pub struct HitAccumulator<K, S> {
    entries: BTreeMap<K, Deposit<S>>,
}

impl<K, S> Default for HitAccumulator<K, S> {
    fn default() -> Self { Self { entries: BTreeMap::new() } }
}

impl<K: Ord, S> HitAccumulator<K, S> {

    pub fn new() -> Self { Self::default() }

    /// Add `edep` to the total of `key`.
    ///
    /// `snapshot` is evaluated only when `key` is seen for the first time in
    /// this event. Deposits which are not strictly positive and finite are
    /// rejected and leave the accumulator untouched.
    pub fn accumulate(&mut self, key: K, edep: Energy, snapshot: impl FnOnce() -> S) -> Result<(), Rejected> {
        if !edep.is_finite()    { return Err(Rejected::NonFinite) }
        if edep <= Energy::ZERO { return Err(Rejected::NonPositive) }
        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(Deposit { edep, n_steps: 1, snapshot: snapshot() });
            }
            Entry::Occupied(mut slot) => {
                let deposit = slot.get_mut();
                deposit.edep    += edep;
                deposit.n_steps += 1;
            }
        }
        Ok(())
    }

    /// All keys accumulated so far, in key order
    pub fn entries(&self) -> btree_map::Iter<'_, K, Deposit<S>> { self.entries.iter() }

    pub fn get(&self, key: &K) -> Option<&Deposit<S>> { self.entries.get(key) }

    /// Move every entry out, in key order, leaving the accumulator empty
    pub fn drain(&mut self) -> btree_map::IntoIter<K, Deposit<S>> {
        std::mem::take(&mut self.entries).into_iter()
    }

    pub fn clear(&mut self) { self.entries.clear() }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Sum over all keys
    pub fn total(&self) -> Energy {
        self.entries.values().map(|d| d.edep).sum()
    }
}
