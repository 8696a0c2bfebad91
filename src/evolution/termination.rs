//! # Termination
//!
//! Stopping conditions checked by the driver before every generation, next to the
//! iteration cap. Any condition returning `true` ends the run.

use std::cmp::Ordering as CmpOrdering;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::environment::Environment;
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::individual::Individual;

/// Snapshot of a run, handed to stopping conditions.
#[derive(Debug)]
pub struct Progress<'a, G: Gene, F: FitnessValue> {
    pub iteration: u32,
    pub stagnation: u32,
    pub elapsed: Duration,
    pub best: Option<&'a Individual<G, F>>,
    pub environment: &'a Environment<G, F>,
}

pub trait Termination<G: Gene, F: FitnessValue>: Debug + Send + Sync {
    fn should_stop(&self, progress: &Progress<'_, G, F>) -> bool;
}

/// Stops after `limit` consecutive generations without strict improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagnationLimit(pub u32);

impl<G: Gene, F: FitnessValue> Termination<G, F> for StagnationLimit {
    fn should_stop(&self, progress: &Progress<'_, G, F>) -> bool {
        progress.stagnation >= self.0
    }
}

/// Stops once the best-ever fitness reaches `target` (or beats it) under the
/// environment's mode.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessTarget<F>(pub F);

impl<G: Gene, F: FitnessValue> Termination<G, F> for FitnessTarget<F> {
    fn should_stop(&self, progress: &Progress<'_, G, F>) -> bool {
        progress
            .best
            .and_then(Individual::fitness)
            .is_some_and(|best| progress.environment.compare_fitness(best, &self.0) != CmpOrdering::Less)
    }
}

/// Cooperative cancellation. Clones share the flag, so a clone kept by another
/// thread can stop a running algorithm at the next generation boundary.
///
/// ```rust
/// use populus::evolution::termination::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

impl<G: Gene, F: FitnessValue> Termination<G, F> for CancellationToken {
    fn should_stop(&self, _progress: &Progress<'_, G, F>) -> bool {
        self.is_cancelled()
    }
}
