//! Greedy farthest-point selection over fuzzy digests
//!
//! Each pick maximises its minimum distance to everything picked so far.
//! Instead of an n x n distance matrix, every candidate carries a running
//! minimum that is folded with the distance to the newest pick on each
//! step: O(n) memory, O(n) distance evaluations per step.
//!
//! The run state lives in an explicit [`SelectionState`] value; a
//! [`Selector`] only borrows the map and fingerprinter, so nothing leaks
//! between runs.

use crate::error::{Error, Result};
use crate::hash::Fingerprinter;
use crate::store::FingerprintMap;
use rand::Rng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Below this many candidates the distance pass stays on the calling thread
const PARALLEL_MIN_CANDIDATES: usize = 2048;

/// `k = n / divisor`; a zero divisor selects nothing
pub fn target_count(n: usize, divisor: usize) -> usize {
    n.checked_div(divisor).unwrap_or(0)
}

/// Receives every selection decision as soon as it is made
pub trait SelectionSink {
    fn record(&mut self, identifier: &str) -> Result<()>;
}

impl SelectionSink for Vec<String> {
    fn record(&mut self, identifier: &str) -> Result<()> {
        self.push(identifier.to_string());
        Ok(())
    }
}

/// Cooperative cancellation, checked before each hashed file and each
/// selection step
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-candidate selection slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Not compared against any pick yet; ranks as +infinity
    Unknown,
    /// Minimum distance to the picks so far
    Min(u32),
    /// Already picked
    Chosen,
}

impl Slot {
    fn fold(&mut self, distance: u32) {
        match *self {
            Slot::Unknown => *self = Slot::Min(distance),
            Slot::Min(current) if distance < current => *self = Slot::Min(distance),
            _ => {}
        }
    }

    fn rank(&self) -> Option<u64> {
        match *self {
            Slot::Unknown => Some(u64::MAX),
            Slot::Min(m) => Some(u64::from(m)),
            Slot::Chosen => None,
        }
    }
}

/// Mutable state of one selection run
///
/// `chosen` only grows; a chosen slot never becomes a candidate again.
#[derive(Debug, Clone)]
pub struct SelectionState {
    slots: Vec<Slot>,
    chosen: Vec<usize>,
}

impl SelectionState {
    pub fn new(n: usize) -> Self {
        Self {
            slots: vec![Slot::Unknown; n],
            chosen: Vec::new(),
        }
    }

    /// Picks so far, as canonical map indices
    pub fn chosen(&self) -> &[usize] {
        &self.chosen
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    pub fn slot(&self, index: usize) -> Slot {
        self.slots[index]
    }

    /// Running minimum of an unchosen candidate, once it has one
    pub fn running_min(&self, index: usize) -> Option<u32> {
        match self.slots[index] {
            Slot::Min(m) => Some(m),
            _ => None,
        }
    }

    fn mark_chosen(&mut self, index: usize) {
        self.slots[index] = Slot::Chosen;
        self.chosen.push(index);
    }

    /// Fold every candidate's distance to `pivot` into its running minimum
    fn fold_from<F: Fingerprinter + ?Sized>(
        &mut self,
        pivot: usize,
        map: &FingerprintMap,
        fp: &F,
        parallel: bool,
    ) {
        let anchor = *map.digest(pivot);
        let update = |(i, slot): (usize, &mut Slot)| {
            if *slot != Slot::Chosen {
                slot.fold(fp.distance(&anchor, map.digest(i)));
            }
        };

        if parallel && self.slots.len() >= PARALLEL_MIN_CANDIDATES {
            self.slots.par_iter_mut().enumerate().for_each(update);
        } else {
            self.slots.iter_mut().enumerate().for_each(update);
        }
    }

    /// Candidate with the largest running minimum; first index wins ties
    fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some(rank) = slot.rank() {
                if best.map_or(true, |(_, top)| rank > top) {
                    best = Some((i, rank));
                }
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Selector tuning
#[derive(Debug, Clone, Copy)]
pub struct SelectOptions {
    /// Spread the per-step distance pass over the rayon pool
    pub parallel: bool,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Farthest-point selector over a fingerprint map
pub struct Selector<'a, F: Fingerprinter + ?Sized> {
    map: &'a FingerprintMap,
    fingerprinter: &'a F,
    options: SelectOptions,
    cancel: CancelFlag,
    prefix: Vec<String>,
}

impl<'a, F: Fingerprinter + ?Sized> Selector<'a, F> {
    pub fn new(map: &'a FingerprintMap, fingerprinter: &'a F) -> Self {
        Self {
            map,
            fingerprinter,
            options: SelectOptions::default(),
            cancel: CancelFlag::new(),
            prefix: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: SelectOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Continue from previously recorded picks instead of drawing a seed
    pub fn resume(mut self, prefix: Vec<String>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Select `k` identifiers, reporting each pick to `sink`
    pub fn run<R: Rng, S: SelectionSink + ?Sized>(
        &self,
        k: usize,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<Vec<String>> {
        let n = self.map.len();
        if k > n {
            return Err(Error::InsufficientCorpus {
                available: n,
                requested: k,
            });
        }
        if self.prefix.len() > k {
            return Err(Error::InvalidConfig(format!(
                "checkpoint holds {} picks but only {} were requested",
                self.prefix.len(),
                k
            )));
        }

        let mut state = SelectionState::new(n);
        if k == 0 {
            return Ok(Vec::new());
        }

        info!("Selecting {} of {} candidates", k, n);
        self.check_cancel(&state)?;
        if self.prefix.is_empty() {
            self.seed(&mut state, rng, sink)?;
        } else {
            self.replay(&mut state, sink)?;
        }

        while state.len() < k {
            self.check_cancel(&state)?;
            self.step(&mut state, sink)?;
        }

        Ok(state
            .chosen()
            .iter()
            .map(|&i| self.map.identifier(i).to_string())
            .collect())
    }

    /// Draw the first pick uniformly at random
    pub fn seed<R: Rng, S: SelectionSink + ?Sized>(
        &self,
        state: &mut SelectionState,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<usize> {
        let n = self.map.len();
        if n == 0 {
            return Err(Error::EmptyCorpus);
        }
        let seed = rng.gen_range(0..n);
        debug!("Seed pick: {}", self.map.identifier(seed));
        self.commit(state, seed, sink)?;
        Ok(seed)
    }

    /// Fold distances from the latest pick, then take the farthest candidate
    pub fn step<S: SelectionSink + ?Sized>(
        &self,
        state: &mut SelectionState,
        sink: &mut S,
    ) -> Result<usize> {
        let current = *state
            .chosen()
            .last()
            .ok_or_else(|| Error::Internal("step called before seed".to_string()))?;

        state.fold_from(current, self.map, self.fingerprinter, self.options.parallel);

        let next = state.argmax().ok_or_else(|| {
            Error::Internal(format!("no candidate left after {} picks", state.len()))
        })?;
        debug!(
            "Pick {}: {} (min distance {:?})",
            state.len() + 1,
            self.map.identifier(next),
            state.running_min(next)
        );
        self.commit(state, next, sink)?;
        Ok(next)
    }

    /// Rebuild state from recorded picks, folding exactly as live steps do
    fn replay<S: SelectionSink + ?Sized>(
        &self,
        state: &mut SelectionState,
        sink: &mut S,
    ) -> Result<()> {
        for identifier in &self.prefix {
            let index = self
                .map
                .index_of(identifier)
                .ok_or_else(|| Error::UnknownIdentifier(identifier.clone()))?;
            if state.slot(index) == Slot::Chosen {
                return Err(Error::DuplicateIdentifier(identifier.clone()));
            }

            if let Some(&current) = state.chosen().last() {
                state.fold_from(current, self.map, self.fingerprinter, self.options.parallel);
                if state.argmax() != Some(index) {
                    warn!(
                        "Checkpoint pick '{}' differs from the farthest candidate; fingerprints may have changed",
                        identifier
                    );
                }
            }
            self.commit(state, index, sink)?;
        }
        info!("Resumed {} picks from checkpoint", state.len());
        Ok(())
    }

    fn check_cancel(&self, state: &SelectionState) -> Result<()> {
        if self.cancel.is_cancelled() {
            warn!("Selection cancelled after {} picks", state.len());
            return Err(Error::Cancelled {
                selected: state.len(),
            });
        }
        Ok(())
    }

    fn commit<S: SelectionSink + ?Sized>(
        &self,
        state: &mut SelectionState,
        index: usize,
        sink: &mut S,
    ) -> Result<()> {
        state.mark_chosen(index);
        sink.record(self.map.identifier(index))
    }
}
