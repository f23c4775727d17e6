//! Checkpointing of the network, the replay ring and the training history.
//!
//! Directory layout:
//!
//! ```text
//! checkpoint_dir/
//!   model_0000500000.bin     network weights (burn BinFileRecorder)
//!   best.bin                 weights with the best metric so far
//!   replay.bin               replay frames, records and write counter (bincode)
//!   training_state.bin       step, episode and reward/loss history (bincode)
//! ```
//!
//! The replay snapshot carries the ring's write counter, so sampling after a
//! restore sees exactly the population it saw before the save.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};

use crate::buffers::{CircularFrameStore, ReplaySnapshot};
use crate::core::error::C51Error;
use crate::metrics::RewardTracker;

const MODEL_PREFIX: &str = "model_";
const MODEL_EXT: &str = ".bin";
const BEST_FILE: &str = "best.bin";
const REPLAY_FILE: &str = "replay.bin";
const STATE_FILE: &str = "training_state.bin";

/// Configuration for the checkpointer.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointerConfig {
    /// Directory to store checkpoints.
    pub checkpoint_dir: PathBuf,
    /// Agent steps between model saves.
    pub save_interval: u64,
    /// Number of recent model checkpoints to keep (0 = keep all).
    pub keep_last_n: usize,
    /// Whether to track and save the best model.
    pub save_best: bool,
}

impl Default for CheckpointerConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: PathBuf::from("./checkpoints"),
            save_interval: 500_000,
            keep_last_n: 5,
            save_best: true,
        }
    }
}

impl CheckpointerConfig {
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
            ..Default::default()
        }
    }

    /// Set the save interval. An interval of 0 disables periodic saves.
    pub fn with_save_interval(mut self, interval: u64) -> Self {
        self.save_interval = interval;
        self
    }

    pub fn with_keep_last_n(mut self, n: usize) -> Self {
        self.keep_last_n = n;
        self
    }

    pub fn with_save_best(mut self, save_best: bool) -> Self {
        self.save_best = save_best;
        self
    }
}

/// Error type for checkpointing operations.
#[derive(Debug)]
pub enum CheckpointError {
    /// IO error during save/load.
    Io(io::Error),
    /// Burn recorder error.
    Recorder(String),
    /// Replay or training state could not be encoded or decoded.
    Encoding(String),
    /// A decoded replay snapshot is inconsistent.
    Snapshot(C51Error),
    /// No checkpoints found.
    NoCheckpoints,
}

impl std::fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckpointError::Io(e) => write!(f, "IO error: {}", e),
            CheckpointError::Recorder(e) => write!(f, "Recorder error: {}", e),
            CheckpointError::Encoding(e) => write!(f, "Encoding error: {}", e),
            CheckpointError::Snapshot(e) => write!(f, "Invalid replay snapshot: {}", e),
            CheckpointError::NoCheckpoints => write!(f, "No checkpoints found"),
        }
    }
}

impl std::error::Error for CheckpointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CheckpointError::Io(e) => Some(e),
            CheckpointError::Snapshot(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CheckpointError {
    fn from(e: io::Error) -> Self {
        CheckpointError::Io(e)
    }
}

impl From<bincode::Error> for CheckpointError {
    fn from(e: bincode::Error) -> Self {
        CheckpointError::Encoding(e.to_string())
    }
}

impl From<C51Error> for CheckpointError {
    fn from(e: C51Error) -> Self {
        CheckpointError::Snapshot(e)
    }
}

/// Model checkpoint metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointInfo {
    /// Path to the checkpoint file.
    pub path: PathBuf,
    /// Agent step at which the checkpoint was saved.
    pub step: u64,
    /// Optional metric value (e.g., average reward).
    pub metric: Option<f32>,
}

/// Counters and histories needed to resume a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingState {
    /// Agent steps taken so far.
    pub step: u64,
    /// Episodes finished so far.
    pub episode: u64,
    pub tracker: RewardTracker,
}

/// Checkpointer for a C51 training run.
///
/// Saves model checkpoints at regular intervals, tracks the best model,
/// cleans up old model checkpoints and persists the replay ring and the
/// training history for resumption.
pub struct Checkpointer {
    config: CheckpointerConfig,
    best_metric: f32,
    history: Vec<CheckpointInfo>,
}

/// Parse the step out of `model_<step>.bin`.
fn parse_model_step(path: &Path) -> Option<u64> {
    path.file_name()?
        .to_str()?
        .strip_prefix(MODEL_PREFIX)?
        .strip_suffix(MODEL_EXT)?
        .parse()
        .ok()
}

impl Checkpointer {
    /// Create a new checkpointer.
    ///
    /// Creates the checkpoint directory if it doesn't exist.
    pub fn new(config: CheckpointerConfig) -> Result<Self, CheckpointError> {
        fs::create_dir_all(&config.checkpoint_dir)?;

        Ok(Self {
            config,
            best_metric: f32::NEG_INFINITY,
            history: Vec::new(),
        })
    }

    pub fn config(&self) -> &CheckpointerConfig {
        &self.config
    }

    /// Check if it's time to save a checkpoint.
    pub fn should_save(&self, step: u64) -> bool {
        self.config.save_interval > 0 && step > 0 && step % self.config.save_interval == 0
    }

    fn path(&self, name: &str) -> PathBuf {
        self.config.checkpoint_dir.join(name)
    }

    /// Save model weights.
    ///
    /// With `save_best`, a `metric` above every previous one also refreshes
    /// `best.bin`.
    pub fn save_model<B: Backend, M: Module<B>>(
        &mut self,
        model: &M,
        step: u64,
        metric: Option<f32>,
    ) -> Result<PathBuf, CheckpointError> {
        let path = self.path(&format!("{}{:010}{}", MODEL_PREFIX, step, MODEL_EXT));

        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        model
            .clone()
            .save_file(&path, &recorder)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;
        log::info!("Saved model checkpoint at step {} to {}", step, path.display());

        self.history.push(CheckpointInfo {
            path: path.clone(),
            step,
            metric,
        });

        if self.config.save_best {
            if let Some(m) = metric.filter(|&m| m > self.best_metric) {
                self.best_metric = m;
                model
                    .clone()
                    .save_file(self.path(BEST_FILE), &recorder)
                    .map_err(|e| CheckpointError::Recorder(e.to_string()))?;
                log::info!("New best model (metric {:.3}) at step {}", m, step);
            }
        }

        self.cleanup_old_checkpoints();
        Ok(path)
    }

    /// Load model weights from a checkpoint file into `model_template`.
    pub fn load_model<B: Backend, M: Module<B>>(
        &self,
        model_template: M,
        path: &Path,
        device: &B::Device,
    ) -> Result<M, CheckpointError> {
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        model_template
            .load_file(path, &recorder, device)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))
    }

    /// Load the best model.
    pub fn load_best<B: Backend, M: Module<B>>(
        &self,
        model_template: M,
        device: &B::Device,
    ) -> Result<M, CheckpointError> {
        let best_path = self.path(BEST_FILE);
        if !best_path.exists() {
            return Err(CheckpointError::NoCheckpoints);
        }
        self.load_model(model_template, &best_path, device)
    }

    /// Load the latest model checkpoint and the step it was saved at.
    pub fn load_latest<B: Backend, M: Module<B>>(
        &self,
        model_template: M,
        device: &B::Device,
    ) -> Result<(M, u64), CheckpointError> {
        let latest = self
            .list_checkpoints()?
            .pop()
            .ok_or(CheckpointError::NoCheckpoints)?;
        let model = self.load_model(model_template, &latest.path, device)?;
        Ok((model, latest.step))
    }

    /// All model checkpoints in the directory, oldest first.
    pub fn list_checkpoints(&self) -> Result<Vec<CheckpointInfo>, CheckpointError> {
        let mut checkpoints: Vec<CheckpointInfo> = fs::read_dir(&self.config.checkpoint_dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let path = e.path();
                let step = parse_model_step(&path)?;
                Some(CheckpointInfo {
                    path,
                    step,
                    metric: None,
                })
            })
            .collect();

        checkpoints.sort_by_key(|c| c.step);
        Ok(checkpoints)
    }

    /// Persist the replay ring, including its write counter.
    pub fn save_replay(&self, store: &CircularFrameStore) -> Result<PathBuf, CheckpointError> {
        let path = self.path(REPLAY_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);
        bincode::serialize_into(&mut writer, &store.snapshot())?;
        writer.flush()?;
        log::info!(
            "Saved replay ring ({} slots, write count {}) to {}",
            store.capacity(),
            store.write_count(),
            path.display()
        );
        Ok(path)
    }

    /// Restore the replay ring saved by [`save_replay`](Self::save_replay).
    pub fn load_replay(&self) -> Result<CircularFrameStore, CheckpointError> {
        let path = self.path(REPLAY_FILE);
        if !path.exists() {
            return Err(CheckpointError::NoCheckpoints);
        }
        let reader = BufReader::new(File::open(&path)?);
        let snapshot: ReplaySnapshot = bincode::deserialize_from(reader)?;
        let store = CircularFrameStore::from_snapshot(snapshot)?;
        log::info!(
            "Restored replay ring ({} slots, write count {})",
            store.capacity(),
            store.write_count()
        );
        Ok(store)
    }

    /// Persist step counters and the reward/loss history.
    pub fn save_training_state(&self, state: &TrainingState) -> Result<PathBuf, CheckpointError> {
        let path = self.path(STATE_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);
        bincode::serialize_into(&mut writer, state)?;
        writer.flush()?;
        log::debug!("Saved training state at step {}", state.step);
        Ok(path)
    }

    pub fn load_training_state(&self) -> Result<TrainingState, CheckpointError> {
        let path = self.path(STATE_FILE);
        if !path.exists() {
            return Err(CheckpointError::NoCheckpoints);
        }
        let reader = BufReader::new(File::open(&path)?);
        Ok(bincode::deserialize_from(reader)?)
    }

    /// Current best metric value.
    pub fn best_metric(&self) -> f32 {
        self.best_metric
    }

    /// Remove the oldest model checkpoints beyond `keep_last_n`.
    fn cleanup_old_checkpoints(&mut self) {
        if self.config.keep_last_n == 0 {
            return;
        }

        while self.history.len() > self.config.keep_last_n {
            let old = self.history.remove(0);
            if let Err(e) = fs::remove_file(&old.path) {
                log::warn!("Could not remove {}: {}", old.path.display(), e);
            }
        }
    }
}
