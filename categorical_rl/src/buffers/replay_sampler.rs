//! Uniform replay sampling over a [`CircularFrameStore`].
//!
//! Key characteristics:
//! - **Uniform with replacement** over the valid index population
//! - **Borrowing**: the sampler holds `&CircularFrameStore` and owns nothing
//! - **Write-boundary exclusion**: the slot holding the newest frame is never
//!   sampled, since its record is not written yet. Once the ring has wrapped
//!   the write head is excluded as well, since its successor is the oldest
//!   frame in the ring
//!
//! # Population
//!
//! With `p = 1` when the last insert was an episode start (the newest frame
//! sits one slot behind the head) and `p = 0` otherwise:
//!
//! ```text
//! write_count < capacity :  [0, write_count - p)
//! write_count >= capacity:  every slot except head and the p slots behind it
//! ```

use rand::Rng;

use super::frame_store::CircularFrameStore;
use crate::core::error::C51Error;
use crate::core::frame::{FRAME_HEIGHT, FRAME_PIXELS, FRAME_WIDTH, STACK_DEPTH};

/// Bytes in one stacked state.
const STATE_LEN: usize = FRAME_PIXELS * STACK_DEPTH;

/// A sampled training batch.
///
/// `states` and `next_states` are flattened `(batch_size, 84, 84, 4)`
/// channel-last arrays of raw `u8` intensities.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayBatch {
    /// Ring slots the batch was drawn from
    pub indices: Vec<usize>,
    pub states: Vec<u8>,
    pub actions: Vec<u32>,
    pub rewards: Vec<f32>,
    pub next_states: Vec<u8>,
    pub terminals: Vec<bool>,
}

impl ReplayBatch {
    fn with_capacity(batch_size: usize) -> Self {
        Self {
            indices: Vec::with_capacity(batch_size),
            states: vec![0u8; batch_size * STATE_LEN],
            actions: Vec::with_capacity(batch_size),
            rewards: Vec::with_capacity(batch_size),
            next_states: vec![0u8; batch_size * STATE_LEN],
            terminals: Vec::with_capacity(batch_size),
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Shape of `states` / `next_states`.
    pub fn state_shape(&self) -> [usize; 4] {
        [self.len(), FRAME_HEIGHT, FRAME_WIDTH, STACK_DEPTH]
    }

    /// Channel-last stacked state of sample `k`.
    pub fn state(&self, k: usize) -> &[u8] {
        &self.states[k * STATE_LEN..(k + 1) * STATE_LEN]
    }

    /// Channel-last stacked next state of sample `k`.
    pub fn next_state(&self, k: usize) -> &[u8] {
        &self.next_states[k * STATE_LEN..(k + 1) * STATE_LEN]
    }

    /// Terminal flags as `1.0` / `0.0`.
    pub fn terminals_f32(&self) -> Vec<f32> {
        self.terminals
            .iter()
            .map(|&t| if t { 1.0 } else { 0.0 })
            .collect()
    }
}

/// Read-only uniform sampler over a frame store.
#[derive(Debug, Clone, Copy)]
pub struct ReplaySampler<'a> {
    store: &'a CircularFrameStore,
}

impl<'a> ReplaySampler<'a> {
    pub fn new(store: &'a CircularFrameStore) -> Self {
        Self { store }
    }

    /// The store being sampled.
    pub fn store(&self) -> &'a CircularFrameStore {
        self.store
    }

    /// Slots behind the write head whose record is still pending.
    ///
    /// Only known for the store's own write counter; an earlier count is
    /// treated as if its last insert was a step.
    fn pending_slots(&self, current_write_count: u64) -> usize {
        if current_write_count != self.store.write_count() {
            return 0;
        }
        let head = self.store.slot(current_write_count);
        match self.store.newest_slot() {
            Some(newest) if newest != head => 1,
            _ => 0,
        }
    }

    /// Number of distinct indices that may be drawn at `current_write_count`.
    pub fn population_size(&self, current_write_count: u64) -> usize {
        let capacity = self.store.capacity();
        let pending = self.pending_slots(current_write_count);
        if current_write_count < capacity as u64 {
            (current_write_count as usize).saturating_sub(pending)
        } else {
            capacity - 1 - pending
        }
    }

    /// Draw one valid index from a population of `population` slots.
    fn draw_index<R: Rng + ?Sized>(
        &self,
        current_write_count: u64,
        population: usize,
        rng: &mut R,
    ) -> usize {
        let capacity = self.store.capacity();
        if current_write_count < capacity as u64 {
            rng.gen_range(0..population)
        } else {
            let head = self.store.slot(current_write_count);
            (head + 1 + rng.gen_range(0..population)) % capacity
        }
    }

    /// Draw `batch_size` indices uniformly with replacement.
    pub fn sample_indices<R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        current_write_count: u64,
        rng: &mut R,
    ) -> Result<Vec<usize>, C51Error> {
        if batch_size == 0 {
            return Err(C51Error::shape("batch_size", 1, 0));
        }
        let population = self.population_size(current_write_count);
        if population == 0 {
            return Err(C51Error::InsufficientHistory {
                write_count: current_write_count,
            });
        }

        Ok((0..batch_size)
            .map(|_| self.draw_index(current_write_count, population, rng))
            .collect())
    }

    /// Sample a batch of stacked transitions.
    ///
    /// For each drawn index `i`: the state is `stack_at(i)`, the next state
    /// `stack_at(i + 1)`, and action/reward/terminal come from `record_at(i)`.
    pub fn sample_batch<R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        current_write_count: u64,
        rng: &mut R,
    ) -> Result<ReplayBatch, C51Error> {
        let indices = self.sample_indices(batch_size, current_write_count, rng)?;
        Ok(self.gather(&indices))
    }

    /// Sample using the store's own write counter.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        rng: &mut R,
    ) -> Result<ReplayBatch, C51Error> {
        self.sample_batch(batch_size, self.store.write_count(), rng)
    }

    /// Assemble a batch for explicit indices.
    pub fn gather(&self, indices: &[usize]) -> ReplayBatch {
        let mut batch = ReplayBatch::with_capacity(indices.len());
        let capacity = self.store.capacity();

        for (k, &index) in indices.iter().enumerate() {
            let i = index % capacity;
            let range = k * STATE_LEN..(k + 1) * STATE_LEN;

            self.store.stack_at(i).write_hwc(&mut batch.states[range.clone()]);
            self.store
                .stack_at((i + 1) % capacity)
                .write_hwc(&mut batch.next_states[range]);

            let record = self.store.record_at(i);
            batch.indices.push(i);
            batch.actions.push(record.action);
            batch.rewards.push(record.reward);
            batch.terminals.push(record.terminal);
        }

        batch
    }
}
