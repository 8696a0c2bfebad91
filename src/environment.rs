//! # Environment
//!
//! The environment grades individuals and defines what "better" means. It wraps a
//! [`Challenge`] (the objective) together with an optimization [`Mode`].
//!
//! ## Ordering
//!
//! [`Environment::compare`] is a total order on individuals where `Greater` means
//! the first argument is better:
//!
//! 1. grades are compared with [`FitnessValue::compare`], reversed under
//!    [`Mode::Minimize`];
//! 2. equal grades rank the individual with the smaller id higher;
//! 3. `Equal` is returned only for the same individual.
//!
//! ## Memoization
//!
//! [`Environment::evaluate`] records the grade on the individual and tags it with the
//! environment's id. An individual tagged by this environment is never graded again.
//! Grading freezes the individual's genes.
//!
//! ```rust
//! use populus::environment::{Environment, Mode};
//! use populus::individual::{IdSequence, Individual};
//! use populus::representation::integer::IntegerGene;
//!
//! let environment = Environment::from_fn(Mode::Minimize, |genes: &[IntegerGene]| {
//!     genes.iter().map(|g| g.value().abs()).sum::<i64>()
//! });
//!
//! let ids = IdSequence::new();
//! let mut near = Individual::new(ids.next_id(), vec![IntegerGene::new(1)]);
//! let mut far = Individual::new(ids.next_id(), vec![IntegerGene::new(-9)]);
//! environment.evaluate(&mut near).unwrap();
//! environment.evaluate(&mut far).unwrap();
//!
//! assert!(environment.is_better(&near, &far));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::trace;

use crate::error::Result;
use crate::evolution::challenge::{Challenge, FnChallenge};
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::individual::Individual;

static NEXT_ENVIRONMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Whether larger or smaller grades are better.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Maximize,
    Minimize,
}

impl Mode {
    /// Turns a raw grade ordering into a "better than" ordering.
    pub fn orient(self, ordering: Ordering) -> Ordering {
        match self {
            Mode::Maximize => ordering,
            Mode::Minimize => ordering.reverse(),
        }
    }
}

/// Identity of an environment, used to tag evaluated individuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvironmentId(u64);

impl EnvironmentId {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Ranks a pair of graded candidates; smaller ids win ties.
pub(crate) fn rank<F: FitnessValue>(
    mode: Mode,
    (fitness_a, id_a): (&F, u64),
    (fitness_b, id_b): (&F, u64),
) -> Ordering {
    mode.orient(fitness_a.compare(fitness_b))
        .then_with(|| id_b.cmp(&id_a))
}

/// The grading context of a population.
pub struct Environment<G: Gene, F: FitnessValue> {
    id: EnvironmentId,
    mode: Mode,
    challenge: Arc<dyn Challenge<G, F>>,
    parallel_threshold: usize,
}

impl<G: Gene, F: FitnessValue> Environment<G, F> {
    pub fn new<C>(challenge: C, mode: Mode) -> Self
    where
        C: Challenge<G, F> + 'static,
    {
        Self {
            id: EnvironmentId(NEXT_ENVIRONMENT_ID.fetch_add(1, AtomicOrdering::Relaxed)),
            mode,
            challenge: Arc::new(challenge),
            parallel_threshold: 1,
        }
    }

    pub fn maximizing<C>(challenge: C) -> Self
    where
        C: Challenge<G, F> + 'static,
    {
        Self::new(challenge, Mode::Maximize)
    }

    pub fn minimizing<C>(challenge: C) -> Self
    where
        C: Challenge<G, F> + 'static,
    {
        Self::new(challenge, Mode::Minimize)
    }

    /// Builds an environment from a closure objective.
    pub fn from_fn<Func>(mode: Mode, objective: Func) -> Self
    where
        Func: Fn(&[G]) -> F + Send + Sync + 'static,
    {
        Self::new(FnChallenge(objective), mode)
    }

    /// Batches shorter than `threshold` are graded and mutated on the calling thread.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn id(&self) -> EnvironmentId {
        self.id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Grades `genes` without touching any individual.
    pub fn score(&self, genes: &[G]) -> Result<F> {
        let fitness = self.challenge.score(genes);
        fitness.validate()?;
        Ok(fitness)
    }

    /// The grade this environment gives `individual`: the memoized one when the
    /// individual is tagged by this environment, a fresh computation otherwise.
    pub fn fitness_of(&self, individual: &Individual<G, F>) -> Result<F> {
        match individual.fitness() {
            Some(fitness) if individual.is_evaluated_by(self) => Ok(fitness.clone()),
            _ => self.score(individual.genes()),
        }
    }

    /// Grades `individual` unless it is already tagged by this environment.
    ///
    /// Afterwards the individual carries the grade and the environment's tag, and
    /// its genes are frozen.
    pub fn evaluate(&self, individual: &mut Individual<G, F>) -> Result<F> {
        if let (Some(fitness), true) = (individual.fitness(), individual.is_evaluated_by(self)) {
            return Ok(fitness.clone());
        }
        let fitness = self.score(individual.genes())?;
        individual.record_fitness(fitness.clone(), self.id);
        Ok(fitness)
    }

    /// Grades every individual not yet tagged by this environment.
    ///
    /// Large batches fan out over the rayon pool. The first failure is returned.
    pub fn evaluate_all(&self, individuals: &mut [Individual<G, F>]) -> Result<()> {
        trace!(batch = individuals.len(), "Evaluating batch");
        if individuals.len() >= self.parallel_threshold {
            individuals
                .par_iter_mut()
                .filter(|individual| !individual.is_evaluated_by(self))
                .try_for_each(|individual| self.evaluate(individual).map(|_| ()))
        } else {
            individuals
                .iter_mut()
                .filter(|individual| !individual.is_evaluated_by(self))
                .try_for_each(|individual| self.evaluate(individual).map(|_| ()))
        }
    }

    /// Orders grades: `Greater` when `a` is the better grade under this mode.
    pub fn compare_fitness(&self, a: &F, b: &F) -> Ordering {
        self.mode.orient(a.compare(b))
    }

    /// Total "better than" order on individuals.
    ///
    /// Individuals this environment has not graded are scored on the fly without
    /// being modified; a grade that fails validation still takes part through its
    /// total order.
    pub fn compare(&self, a: &Individual<G, F>, b: &Individual<G, F>) -> Ordering {
        if a.id() == b.id() {
            return Ordering::Equal;
        }
        let fitness_a = self.lenient_fitness(a);
        let fitness_b = self.lenient_fitness(b);
        rank(
            self.mode,
            (&fitness_a, a.id().value()),
            (&fitness_b, b.id().value()),
        )
    }

    /// The reverse of [`Environment::compare`]: `Greater` when `a` is worse.
    pub fn compare_inverse(&self, a: &Individual<G, F>, b: &Individual<G, F>) -> Ordering {
        self.compare(b, a)
    }

    pub fn is_better(&self, a: &Individual<G, F>, b: &Individual<G, F>) -> bool {
        self.compare(a, b) == Ordering::Greater
    }

    /// Whether `a` has a strictly better grade than `b`, ignoring identity.
    pub fn is_fitter(&self, a: &Individual<G, F>, b: &Individual<G, F>) -> bool {
        self.compare_fitness(&self.lenient_fitness(a), &self.lenient_fitness(b))
            == Ordering::Greater
    }

    /// The best of `individuals` under [`Environment::compare`].
    pub fn best_of<'a, I>(&self, individuals: I) -> Option<&'a Individual<G, F>>
    where
        I: IntoIterator<Item = &'a Individual<G, F>>,
    {
        individuals
            .into_iter()
            .max_by(|a, b| self.compare(a, b))
    }

    fn lenient_fitness(&self, individual: &Individual<G, F>) -> F {
        match individual.fitness() {
            Some(fitness) if individual.is_evaluated_by(self) => fitness.clone(),
            _ => self.challenge.score(individual.genes()),
        }
    }
}

impl<G: Gene, F: FitnessValue> Clone for Environment<G, F> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            mode: self.mode,
            challenge: Arc::clone(&self.challenge),
            parallel_threshold: self.parallel_threshold,
        }
    }
}

impl<G: Gene, F: FitnessValue> fmt::Debug for Environment<G, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("parallel_threshold", &self.parallel_threshold)
            .finish_non_exhaustive()
    }
}
