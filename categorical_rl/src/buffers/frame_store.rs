//! Circular frame store with temporal frame stacking.
//!
//! Frames are stored once, individually, in a contiguous ring; stacked states
//! are reconstructed on demand. Records share slots with frames using an
//! offset-by-one convention (see [`CircularFrameStore::insert`]).
//!
//! # Layout
//!
//! ```text
//! slot:      0      1      2      3      4
//! frames:  [ f0 ] [ f1 ] [ f2 ] [ f3 ] [ f4 ]      capacity × 84 × 84 (u8)
//! records: [ r0 ] [ r1 ] [ r2 ] [ r3 ] [ r4 ]      capacity × (a, r, done)
//!
//! r_i : f_i --action--> f_{i+1}
//! stack_at(1) = [f3, f4, f0, f1]   (wraps below zero)
//! ```

use serde::{Deserialize, Serialize};

use crate::core::error::C51Error;
use crate::core::frame::{Frame, StackedState, FRAME_PIXELS, STACK_DEPTH};
use crate::core::transition::{TransitionRecord, RECORD_WIDTH};

/// Fixed-capacity ring of frames and transition records.
///
/// Allocated once; mutated only through [`insert`](Self::insert).
#[derive(Debug, Clone)]
pub struct CircularFrameStore {
    capacity: usize,
    /// `capacity * FRAME_PIXELS` bytes, slot-major.
    frames: Box<[u8]>,
    records: Box<[TransitionRecord]>,
    /// Total inserts ever performed (never wrapped).
    write_count: u64,
    /// Slot of the most recently written frame.
    newest_slot: Option<usize>,
}

/// Persisted form of a [`CircularFrameStore`].
///
/// `frames` is the `(capacity, 84, 84)` ring flattened row-major, `records`
/// the `(capacity, 3)` ring of `(action, reward, terminal-as-float)` rows.
/// `newest_slot` keeps the write boundary exact across a restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaySnapshot {
    pub capacity: usize,
    pub write_count: u64,
    pub frames: Vec<u8>,
    pub records: Vec<[f32; RECORD_WIDTH]>,
    pub newest_slot: Option<usize>,
}

impl CircularFrameStore {
    /// Allocate a store with `capacity` slots.
    ///
    /// A stacked state and its successor span `STACK_DEPTH + 1` distinct
    /// slots, so `capacity` must exceed `STACK_DEPTH`.
    pub fn new(capacity: usize) -> Result<Self, C51Error> {
        Self::check_capacity(capacity)?;
        let frames = vec![0u8; capacity * FRAME_PIXELS].into_boxed_slice();
        let records = vec![TransitionRecord::default(); capacity].into_boxed_slice();
        log::debug!(
            "Allocated frame store: {} slots ({} MiB of frames)",
            capacity,
            (capacity * FRAME_PIXELS) >> 20
        );
        Ok(Self {
            capacity,
            frames,
            records,
            write_count: 0,
            newest_slot: None,
        })
    }

    fn check_capacity(capacity: usize) -> Result<(), C51Error> {
        if capacity <= STACK_DEPTH {
            return Err(C51Error::invalid(
                "capacity",
                format!("must be > {}, got {}", STACK_DEPTH, capacity),
            ));
        }
        Ok(())
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total inserts performed so far.
    #[inline]
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    /// Number of slots that have been reached by the write cursor.
    #[inline]
    pub fn len(&self) -> usize {
        self.write_count.min(self.capacity as u64) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.write_count == 0
    }

    /// Whether the write cursor has wrapped at least once.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.write_count >= self.capacity as u64
    }

    /// Slot holding the most recently written frame, `None` before any insert.
    ///
    /// After [`push_step`](Self::push_step) this is `write_count mod capacity`;
    /// after [`start_episode`](Self::start_episode) it is the slot before it.
    #[inline]
    pub fn newest_slot(&self) -> Option<usize> {
        self.newest_slot
    }

    /// Reduce any index into `[0, capacity)`.
    #[inline]
    pub fn slot(&self, index: u64) -> usize {
        (index % self.capacity as u64) as usize
    }

    /// Store the next observation.
    ///
    /// `prior` is the transition that led to `frame`; pass `None` for the
    /// first frame of an episode.
    ///
    /// - `None`: `frame` goes to slot `write_count mod capacity`; no record
    ///   is written.
    /// - `Some(record)`: `frame` is the next state and goes to slot
    ///   `(write_count + 1) mod capacity`, while `record` goes to slot
    ///   `write_count mod capacity`, next to the frame the agent acted from.
    ///
    /// `write_count` advances by one in both cases.
    pub fn insert(&mut self, frame: &Frame, prior: Option<TransitionRecord>) {
        let current = self.slot(self.write_count);
        let written = match prior {
            None => current,
            Some(record) => {
                let next = self.slot(self.write_count + 1);
                self.records[current] = record;
                next
            }
        };
        self.write_frame(written, frame);
        self.newest_slot = Some(written);

        self.write_count += 1;
        if self.write_count == self.capacity as u64 {
            log::debug!("Frame store wrapped after {} inserts", self.write_count);
        }
    }

    /// Store a frame with no transition leading into it.
    ///
    /// Meant for the first frame of a run. Its slot never receives a record,
    /// and the record of the following [`push_step`](Self::push_step) lands in
    /// the next slot, whose frame this call did not write. Calling it again
    /// mid-run therefore leaves one transition paired with a stale frame;
    /// continue later episodes with `push_step` and a terminal record instead.
    pub fn start_episode(&mut self, frame: &Frame) {
        self.insert(frame, None);
    }

    /// Store the outcome of one step: the transition and the frame it produced.
    pub fn push_step(&mut self, record: TransitionRecord, next_frame: &Frame) {
        self.insert(next_frame, Some(record));
    }

    fn write_frame(&mut self, slot: usize, frame: &Frame) {
        let start = slot * FRAME_PIXELS;
        self.frames[start..start + FRAME_PIXELS].copy_from_slice(frame.pixels());
    }

    /// Pixels stored at `index mod capacity`.
    #[inline]
    pub fn frame_at(&self, index: usize) -> &[u8] {
        let start = (index % self.capacity) * FRAME_PIXELS;
        &self.frames[start..start + FRAME_PIXELS]
    }

    /// Record stored at `index mod capacity`.
    #[inline]
    pub fn record_at(&self, index: usize) -> TransitionRecord {
        self.records[index % self.capacity]
    }

    /// Frames `index-3 ..= index` (mod capacity), oldest first.
    ///
    /// Purely positional: frames from different episodes are not detected.
    pub fn stack_at(&self, index: usize) -> StackedState<'_> {
        let base = index % self.capacity;
        let mut slots = [0usize; STACK_DEPTH];
        for (k, slot) in slots.iter_mut().enumerate() {
            let back = STACK_DEPTH - 1 - k;
            *slot = (base + self.capacity - back) % self.capacity;
        }
        let planes = [
            self.frame_at(slots[0]),
            self.frame_at(slots[1]),
            self.frame_at(slots[2]),
            self.frame_at(slots[3]),
        ];
        StackedState::new(planes, slots)
    }

    /// Copy the rings and the write counter for persistence.
    pub fn snapshot(&self) -> ReplaySnapshot {
        ReplaySnapshot {
            capacity: self.capacity,
            write_count: self.write_count,
            frames: self.frames.to_vec(),
            records: self.records.iter().map(TransitionRecord::to_row).collect(),
            newest_slot: self.newest_slot,
        }
    }

    /// Rebuild a store from a snapshot, including its write counter.
    pub fn from_snapshot(snapshot: ReplaySnapshot) -> Result<Self, C51Error> {
        let ReplaySnapshot {
            capacity,
            write_count,
            frames,
            records,
            newest_slot,
        } = snapshot;

        Self::check_capacity(capacity)?;
        let frame_bytes = capacity.checked_mul(FRAME_PIXELS).ok_or_else(|| {
            C51Error::invalid("capacity", format!("{} slots overflow the frame ring", capacity))
        })?;
        if frames.len() != frame_bytes {
            return Err(C51Error::shape("snapshot frames", frame_bytes, frames.len()));
        }
        if records.len() != capacity {
            return Err(C51Error::shape("snapshot records", capacity, records.len()));
        }
        if let Some(slot) = newest_slot.filter(|&slot| slot >= capacity) {
            return Err(C51Error::invalid(
                "newest_slot",
                format!("must be < {}, got {}", capacity, slot),
            ));
        }
        if newest_slot.is_none() != (write_count == 0) {
            return Err(C51Error::invalid(
                "newest_slot",
                format!("inconsistent with write_count {}", write_count),
            ));
        }

        Ok(Self {
            capacity,
            frames: frames.into_boxed_slice(),
            records: records.into_iter().map(TransitionRecord::from_row).collect(),
            write_count,
            newest_slot,
        })
    }
}
