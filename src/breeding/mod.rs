//! # Breeding Operators
//!
//! The variation operators of an algorithm: generators create individuals,
//! mutators perturb them, recombinators mix parents into children. Selectors live in
//! [`crate::selection`].
//!
//! Operators hold only their own parameters. Everything they need from the running
//! algorithm (environment, population, id sequence, sibling operators) arrives in a
//! [`Context`] on every call, so replacing an operator between generations takes
//! effect immediately and an operator can be reused by several algorithms.
//!
//! Operators only write to the individuals they are given or create. The one
//! exception is fused differential recombination, which takes its replacement
//! target out of the population.

use std::fmt::Debug;

use rayon::prelude::*;

use crate::environment::Environment;
use crate::error::{GeneticError, OptionExt, Result};
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::individual::{IdSequence, Individual};
use crate::population::Population;
use crate::rng::ThreadLocalRng;
use crate::selection::Selector;

pub mod crossover;

pub use crossover::{OnePointCrossover, UniformCrossover};

/// A probability validated to lie in `[0, 1]`.
///
/// Deserialization goes through [`Probability::new`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Probability(f64);

impl TryFrom<f64> for Probability {
    type Error = GeneticError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Probability> for f64 {
    fn from(probability: Probability) -> f64 {
        probability.0
    }
}

impl Probability {
    pub const ZERO: Probability = Probability(0.0);
    pub const ONE: Probability = Probability(1.0);

    pub fn new(value: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GeneticError::Configuration(format!(
                "Probability must lie in [0, 1], got {value}"
            )))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Bernoulli trial on the thread-local generator.
    pub fn sample(self) -> bool {
        ThreadLocalRng::bernoulli(self.0)
    }
}

/// What an operator can see of the algorithm it is working for.
pub struct Context<'a, G: Gene, F: FitnessValue> {
    environment: &'a Environment<G, F>,
    population: &'a mut dyn Population<G, F>,
    ids: &'a IdSequence,
    generator: Option<&'a dyn Generator<G, F>>,
    mutator: Option<&'a dyn Mutator<G, F>>,
    recombinator: Option<&'a dyn Recombinator<G, F>>,
    selector: Option<&'a dyn Selector<G, F>>,
}

impl<'a, G: Gene, F: FitnessValue> Context<'a, G, F> {
    pub fn new(
        environment: &'a Environment<G, F>,
        population: &'a mut dyn Population<G, F>,
        ids: &'a IdSequence,
    ) -> Self {
        Self {
            environment,
            population,
            ids,
            generator: None,
            mutator: None,
            recombinator: None,
            selector: None,
        }
    }

    pub fn with_generator(mut self, generator: Option<&'a dyn Generator<G, F>>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_mutator(mut self, mutator: Option<&'a dyn Mutator<G, F>>) -> Self {
        self.mutator = mutator;
        self
    }

    pub fn with_recombinator(mut self, recombinator: Option<&'a dyn Recombinator<G, F>>) -> Self {
        self.recombinator = recombinator;
        self
    }

    pub fn with_selector(mut self, selector: Option<&'a dyn Selector<G, F>>) -> Self {
        self.selector = selector;
        self
    }

    pub fn environment(&self) -> &'a Environment<G, F> {
        self.environment
    }

    pub fn population(&self) -> &dyn Population<G, F> {
        &*self.population
    }

    pub fn population_mut(&mut self) -> &mut dyn Population<G, F> {
        &mut *self.population
    }

    pub fn ids(&self) -> &'a IdSequence {
        self.ids
    }

    pub fn generator(&self) -> Result<&'a dyn Generator<G, F>> {
        self.generator
            .ok_or_else_genetic(|| missing_operator("generator"))
    }

    pub fn mutator(&self) -> Result<&'a dyn Mutator<G, F>> {
        self.mutator.ok_or_else_genetic(|| missing_operator("mutator"))
    }

    pub fn recombinator(&self) -> Result<&'a dyn Recombinator<G, F>> {
        self.recombinator
            .ok_or_else_genetic(|| missing_operator("recombinator"))
    }

    pub fn selector(&self) -> Result<&'a dyn Selector<G, F>> {
        self.selector.ok_or_else_genetic(|| missing_operator("selector"))
    }

    /// A fresh individual from the generator's skeleton, carrying `genes`.
    pub fn offspring(&self, genes: Vec<G>) -> Result<Individual<G, F>> {
        let mut child = self.generator()?.get(self.ids);
        if child.len() != genes.len() {
            return Err(GeneticError::Recombination(format!(
                "Offspring has {} loci but the generator builds {}",
                genes.len(),
                child.len()
            )));
        }
        child.set_genes(0, genes)?;
        Ok(child)
    }
}

fn missing_operator(kind: &str) -> GeneticError {
    GeneticError::IllegalState(format!("No {kind} has been configured"))
}

/// Creates individuals.
pub trait Generator<G: Gene, F: FitnessValue>: Debug + Send + Sync {
    /// A skeleton individual with placeholder genes, for callers that assign the
    /// genes themselves.
    fn get(&self, ids: &IdSequence) -> Individual<G, F>;

    /// A fully randomized individual.
    fn get_random(&self, ids: &IdSequence) -> Individual<G, F>;

    fn get_n(&self, n: usize, ids: &IdSequence) -> Vec<Individual<G, F>> {
        (0..n).map(|_| self.get(ids)).collect()
    }

    fn get_n_random(&self, n: usize, ids: &IdSequence) -> Vec<Individual<G, F>> {
        (0..n).map(|_| self.get_random(ids)).collect()
    }
}

/// Perturbs unevaluated individuals in place.
pub trait Mutator<G: Gene, F: FitnessValue>: Debug + Send + Sync {
    /// Per-individual mutation probability.
    fn probability(&self) -> Probability;

    fn mutate(&self, individual: &mut Individual<G, F>, context: &Context<'_, G, F>) -> Result<()>;

    /// Whether `individual` is picked for mutation.
    fn decide(&self, _individual: &Individual<G, F>) -> bool {
        self.probability().sample()
    }

    /// Mutates every individual that wins its [`Mutator::decide`] draw.
    ///
    /// Batches at or above the environment's parallel threshold are processed on the
    /// rayon pool. The first failure is returned.
    fn mutate_all(
        &self,
        individuals: &mut [Individual<G, F>],
        context: &Context<'_, G, F>,
    ) -> Result<()> {
        if individuals.len() >= context.environment().parallel_threshold() {
            individuals
                .par_iter_mut()
                .filter(|individual| self.decide(individual))
                .try_for_each(|individual| self.mutate(individual, context))
        } else {
            individuals
                .iter_mut()
                .filter(|individual| self.decide(individual))
                .try_for_each(|individual| self.mutate(individual, context))
        }
    }
}

/// Produces children from groups of parents.
pub trait Recombinator<G: Gene, F: FitnessValue>: Debug + Send + Sync {
    /// Probability that a group of partners recombines at all.
    fn probability(&self) -> Probability;

    /// Number of parents per recombination.
    fn partners(&self) -> usize;

    fn recombine(
        &self,
        partners: &[Individual<G, F>],
        context: &mut Context<'_, G, F>,
    ) -> Result<Vec<Individual<G, F>>>;

    fn decide(&self) -> bool {
        self.probability().sample()
    }

    /// Splits `pool` into consecutive groups of [`Recombinator::partners`] and
    /// recombines each group that wins its [`Recombinator::decide`] draw.
    ///
    /// # Errors
    ///
    /// `IllegalState` when the pool size is not a multiple of the partner count.
    fn recombine_all(
        &self,
        pool: &[Individual<G, F>],
        context: &mut Context<'_, G, F>,
    ) -> Result<Vec<Individual<G, F>>> {
        let partners = self.partners();
        if partners == 0 {
            return Err(GeneticError::Configuration(
                "Recombination needs at least one partner".to_string(),
            ));
        }
        if pool.len() % partners != 0 {
            return Err(GeneticError::IllegalState(format!(
                "A pool of {} cannot be split into groups of {}",
                pool.len(),
                partners
            )));
        }
        let mut children = Vec::with_capacity(pool.len());
        for group in pool.chunks(partners) {
            if self.decide() {
                children.extend(self.recombine(group, context)?);
            }
        }
        Ok(children)
    }
}

/// Checks the partner count of a recombinator constructor.
pub(crate) fn validate_partners(partners: usize) -> Result<usize> {
    if partners == 0 {
        Err(GeneticError::Configuration(
            "Partner count must be at least 1".to_string(),
        ))
    } else {
        Ok(partners)
    }
}

/// Destructures a two-parent group.
pub(crate) fn parent_pair<G: Gene, F: FitnessValue>(
    partners: &[Individual<G, F>],
) -> Result<(&Individual<G, F>, &Individual<G, F>)> {
    match partners {
        [first, second] => {
            if first.len() != second.len() {
                return Err(GeneticError::Recombination(format!(
                    "Parents have different lengths: {} and {}",
                    first.len(),
                    second.len()
                )));
            }
            Ok((first, second))
        }
        _ => Err(GeneticError::Recombination(format!(
            "Expected 2 parents, got {}",
            partners.len()
        ))),
    }
}

/// Per-locus rate: the explicit one, or `1 / len`.
pub(crate) fn locus_rate(explicit: Option<Probability>, len: usize) -> f64 {
    match explicit {
        Some(rate) => rate.value(),
        None if len == 0 => 0.0,
        None => 1.0 / len as f64,
    }
}
