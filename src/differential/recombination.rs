//! # Differential recombination
//!
//! Each donor is paired with a target taken out of the population at random. The
//! trial vector mixes donor and target; it is graded right away and the better of
//! trial and target is returned as the single child. Running [`Recombinator::recombine_all`]
//! over as many donors as the population has members therefore empties the
//! population and returns its replacement. A failing grade never costs the
//! population a member.

use std::cmp::Ordering;

use rand::Rng;

use crate::breeding::crossover::discrete;
use crate::breeding::{Context, Probability, Recombinator};
use crate::error::{GeneticError, Result};
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::individual::Individual;
use crate::rng::{bernoulli, ThreadLocalRng};

/// Exponential crossover: a contiguous, wrapping run of donor loci starting at a
/// random locus. The run always holds one locus and grows while a Bernoulli trial
/// with probability `crossover` succeeds. Other loci come from the target.
pub fn exponential<T, R>(donor: &[T], target: &[T], crossover: f64, rng: &mut R) -> Result<Vec<T>>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let len = donor.len();
    if target.len() != len {
        return Err(GeneticError::Recombination(format!(
            "Donor has {} loci but the target has {}",
            len,
            target.len()
        )));
    }
    let mut trial = target.to_vec();
    if len == 0 {
        return Ok(trial);
    }
    let start = rng.gen_range(0..len);
    let mut run = 1;
    while run < len && bernoulli(rng, crossover) {
        run += 1;
    }
    for offset in 0..run {
        let locus = (start + offset) % len;
        trial[locus] = donor[locus].clone();
    }
    Ok(trial)
}

/// Picks a random target, builds the trial from the donor and the target, and
/// returns whichever of the two the environment ranks higher. The target leaves
/// the population only once the trial has been graded.
fn replace_target<G, F, B>(
    donor: &Individual<G, F>,
    context: &mut Context<'_, G, F>,
    build: B,
) -> Result<Vec<Individual<G, F>>>
where
    G: Gene,
    F: FitnessValue,
    B: FnOnce(&[G], &[G]) -> Result<Vec<G>>,
{
    let population = context.population();
    if population.is_empty() {
        return Err(GeneticError::EmptyPopulation);
    }
    let index = ThreadLocalRng::gen_range(0..population.len());
    let genes = build(donor.genes(), population.get(index)?.genes())?;

    let mut trial = context.offspring(genes)?;
    context.environment().evaluate(&mut trial)?;
    let target = context.population_mut().take(index)?;
    if context.environment().compare(&trial, &target) == Ordering::Greater {
        Ok(vec![trial])
    } else {
        Ok(vec![target])
    }
}

/// Runs `replace_target` for every donor. On failure the children already
/// produced go back into the population, so it keeps its size.
fn replace_targets<G, F, R>(
    recombinator: &R,
    pool: &[Individual<G, F>],
    context: &mut Context<'_, G, F>,
) -> Result<Vec<Individual<G, F>>>
where
    G: Gene,
    F: FitnessValue,
    R: Recombinator<G, F> + ?Sized,
{
    let mut children = Vec::with_capacity(pool.len());
    for donor in pool {
        match recombinator.recombine(std::slice::from_ref(donor), context) {
            Ok(child) => children.extend(child),
            Err(error) => {
                context.population_mut().add_all(children)?;
                return Err(error);
            }
        }
    }
    Ok(children)
}

fn single_donor<G: Gene, F: FitnessValue>(partners: &[Individual<G, F>]) -> Result<&Individual<G, F>> {
    match partners {
        [donor] => Ok(donor),
        _ => Err(GeneticError::Recombination(format!(
            "Expected 1 donor, got {}",
            partners.len()
        ))),
    }
}

/// Binomial DE crossover: each trial locus comes from the donor with probability
/// `crossover`, otherwise from the target.
#[derive(Debug, Clone)]
pub struct BinomialRecombinator {
    crossover: Probability,
}

impl BinomialRecombinator {
    pub fn new(crossover: f64) -> Result<Self> {
        Ok(Self {
            crossover: Probability::new(crossover)?,
        })
    }

    pub fn crossover(&self) -> Probability {
        self.crossover
    }
}

impl<G: Gene, F: FitnessValue> Recombinator<G, F> for BinomialRecombinator {
    fn probability(&self) -> Probability {
        Probability::ONE
    }

    fn partners(&self) -> usize {
        1
    }

    fn recombine(
        &self,
        partners: &[Individual<G, F>],
        context: &mut Context<'_, G, F>,
    ) -> Result<Vec<Individual<G, F>>> {
        let donor = single_donor(partners)?;
        let crossover = self.crossover.value();
        replace_target(donor, context, |donor, target| {
            discrete(donor, target, crossover, &mut ThreadLocalRng::rng())
        })
    }

    fn recombine_all(
        &self,
        pool: &[Individual<G, F>],
        context: &mut Context<'_, G, F>,
    ) -> Result<Vec<Individual<G, F>>> {
        replace_targets(self, pool, context)
    }
}

/// Exponential DE crossover, see [`exponential`].
#[derive(Debug, Clone)]
pub struct ExponentialRecombinator {
    crossover: Probability,
}

impl ExponentialRecombinator {
    pub fn new(crossover: f64) -> Result<Self> {
        Ok(Self {
            crossover: Probability::new(crossover)?,
        })
    }

    pub fn crossover(&self) -> Probability {
        self.crossover
    }
}

impl<G: Gene, F: FitnessValue> Recombinator<G, F> for ExponentialRecombinator {
    fn probability(&self) -> Probability {
        Probability::ONE
    }

    fn partners(&self) -> usize {
        1
    }

    fn recombine(
        &self,
        partners: &[Individual<G, F>],
        context: &mut Context<'_, G, F>,
    ) -> Result<Vec<Individual<G, F>>> {
        let donor = single_donor(partners)?;
        let crossover = self.crossover.value();
        replace_target(donor, context, |donor, target| {
            exponential(donor, target, crossover, &mut ThreadLocalRng::rng())
        })
    }

    fn recombine_all(
        &self,
        pool: &[Individual<G, F>],
        context: &mut Context<'_, G, F>,
    ) -> Result<Vec<Individual<G, F>>> {
        replace_targets(self, pool, context)
    }
}
