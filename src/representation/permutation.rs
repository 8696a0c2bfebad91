//! # Permutation genomes
//!
//! Each individual is an ordering of the same set of integer values. Operators here
//! never duplicate or drop a value: swap mutation exchanges two loci, and
//! [`PartiallyMappedCrossover`] repairs collisions through the parents' mapping.
//!
//! ```rust
//! use populus::representation::permutation::{is_permutation_of, pmx, PermutationGene};
//!
//! let first: Vec<PermutationGene> = [1, 2, 3, 4, 5, 6, 7, 8, 9].map(PermutationGene::new).to_vec();
//! let second: Vec<PermutationGene> = [9, 3, 7, 8, 2, 6, 5, 1, 4].map(PermutationGene::new).to_vec();
//! let child = pmx(&first, &second, 3, 6).unwrap();
//! assert!(is_permutation_of(&child, &first));
//! ```

use std::collections::HashSet;
use std::hash::Hash;

use rand::Rng;

use crate::breeding::{parent_pair, Context, Generator, Mutator, Probability, Recombinator};
use crate::error::{GeneticError, Result};
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::individual::{IdSequence, Individual};
use crate::rng::{sorted_pair, ThreadLocalRng};

/// One value of a permutation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PermutationGene {
    value: i64,
}

impl PermutationGene {
    pub fn new(value: i64) -> Self {
        Self { value }
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

impl Gene for PermutationGene {
    fn numeric(&self) -> f64 {
        self.value as f64
    }
}

/// Whether `candidate` holds exactly the values of `reference`, each once.
pub fn is_permutation_of<G: Eq + Hash>(candidate: &[G], reference: &[G]) -> bool {
    if candidate.len() != reference.len() {
        return false;
    }
    let seen: HashSet<&G> = candidate.iter().collect();
    seen.len() == candidate.len() && reference.iter().all(|value| seen.contains(value))
}

/// Exchanges two distinct random loci. Genomes shorter than two are left alone.
pub fn swap_mutation<G, R>(genes: &mut [G], rng: &mut R) -> Result<()>
where
    R: Rng + ?Sized,
{
    if genes.len() < 2 {
        return Ok(());
    }
    let (a, b) = sorted_pair(rng, 0, genes.len() - 1)?;
    genes.swap(a, b);
    Ok(())
}

/// Partially mapped crossover producing one child.
///
/// The segment `start..=end` is copied from `first`. Each value of the matching
/// segment of `second` that is not yet placed goes to the position found by
/// following the `first -> second` mapping until a free slot appears. Remaining
/// slots are filled from `second` position by position.
///
/// # Errors
///
/// `IndexOutOfBounds` when the segment exceeds the genome, `Recombination` when the
/// parents are not permutations of the same values.
pub fn pmx<G>(first: &[G], second: &[G], start: usize, end: usize) -> Result<Vec<G>>
where
    G: Clone + PartialEq,
{
    let len = first.len();
    if second.len() != len {
        return Err(GeneticError::Recombination(format!(
            "Parents have different lengths: {} and {}",
            len,
            second.len()
        )));
    }
    if start > end {
        return Err(GeneticError::Recombination(format!(
            "Segment start {start} is after its end {end}"
        )));
    }
    if end >= len {
        return Err(GeneticError::IndexOutOfBounds { index: end, len });
    }

    let mut child: Vec<Option<G>> = vec![None; len];
    for locus in start..=end {
        child[locus] = Some(first[locus].clone());
    }

    let segment = &first[start..=end];
    for offset in 0..segment.len() {
        let value = &second[start + offset];
        if segment.contains(value) {
            continue;
        }
        let mut locus = start + offset;
        let mut hops = 0;
        while child[locus].is_some() {
            hops += 1;
            if hops > len {
                return Err(not_a_permutation());
            }
            let displaced = &first[locus];
            locus = second
                .iter()
                .position(|candidate| candidate == displaced)
                .ok_or_else(not_a_permutation)?;
        }
        child[locus] = Some(value.clone());
    }

    Ok(child
        .into_iter()
        .zip(second)
        .map(|(slot, fallback)| slot.unwrap_or_else(|| fallback.clone()))
        .collect())
}

fn not_a_permutation() -> GeneticError {
    GeneticError::Recombination("Parents are not permutations of the same values".to_string())
}

/// Generates permutations of the inclusive range `lower..=upper`.
#[derive(Debug, Clone)]
pub struct PermutationGenerator {
    lower: i64,
    upper: i64,
}

impl PermutationGenerator {
    pub fn new(lower: i64, upper: i64) -> Result<Self> {
        if lower > upper {
            return Err(GeneticError::Configuration(format!(
                "Permutation range {lower}..={upper} is empty"
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn length(&self) -> usize {
        (self.upper - self.lower) as usize + 1
    }

    fn identity(&self) -> Vec<PermutationGene> {
        (self.lower..=self.upper).map(PermutationGene::new).collect()
    }
}

impl<F: FitnessValue> Generator<PermutationGene, F> for PermutationGenerator {
    /// The identity ordering.
    fn get(&self, ids: &IdSequence) -> Individual<PermutationGene, F> {
        Individual::new(ids.next_id(), self.identity())
    }

    /// A uniformly shuffled ordering.
    fn get_random(&self, ids: &IdSequence) -> Individual<PermutationGene, F> {
        let mut genes = self.identity();
        ThreadLocalRng::shuffle(&mut genes);
        Individual::new(ids.next_id(), genes)
    }
}

/// Swaps two random loci of each selected individual.
#[derive(Debug, Clone)]
pub struct SwapMutator {
    probability: Probability,
}

impl SwapMutator {
    pub fn new(probability: f64) -> Result<Self> {
        Ok(Self {
            probability: Probability::new(probability)?,
        })
    }
}

impl<G: Gene, F: FitnessValue> Mutator<G, F> for SwapMutator {
    fn probability(&self) -> Probability {
        self.probability
    }

    fn mutate(&self, individual: &mut Individual<G, F>, _context: &Context<'_, G, F>) -> Result<()> {
        swap_mutation(individual.genes_mut()?, &mut ThreadLocalRng::rng())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CutLimits {
    lower: usize,
    upper: usize,
    fixed: bool,
}

/// Partially mapped crossover, producing `pmx(a, b)` and `pmx(b, a)`.
///
/// Cut points are two distinct random loci unless limits are active. Active limits
/// either restrict the random draw to `lower..=upper` or, when fixed (or when
/// `lower == upper`), are used as the cut points directly.
#[derive(Debug, Clone)]
pub struct PartiallyMappedCrossover {
    probability: Probability,
    limits: Option<CutLimits>,
    limits_active: bool,
}

impl PartiallyMappedCrossover {
    pub fn new(probability: f64) -> Result<Self> {
        Ok(Self {
            probability: Probability::new(probability)?,
            limits: None,
            limits_active: false,
        })
    }

    /// Sets and activates cut-point limits.
    pub fn with_limits(mut self, lower: usize, upper: usize, fixed: bool) -> Result<Self> {
        if lower > upper {
            return Err(GeneticError::Configuration(format!(
                "Cut limit {lower} is above {upper}"
            )));
        }
        self.limits = Some(CutLimits {
            lower,
            upper,
            fixed,
        });
        self.activate_limits()?;
        Ok(self)
    }

    /// Re-enables previously configured limits.
    pub fn activate_limits(&mut self) -> Result<()> {
        if self.limits.is_none() {
            return Err(GeneticError::IllegalState(
                "No cut limits have been configured".to_string(),
            ));
        }
        self.limits_active = true;
        Ok(())
    }

    /// Disables the limits without forgetting them.
    pub fn deactivate_limits(&mut self) {
        self.limits_active = false;
    }

    pub fn limits_active(&self) -> bool {
        self.limits_active
    }

    fn cut_points<R>(&self, len: usize, rng: &mut R) -> Result<(usize, usize)>
    where
        R: Rng + ?Sized,
    {
        let limits = self.limits.filter(|_| self.limits_active);
        match limits {
            Some(limits) => {
                if limits.upper >= len {
                    return Err(GeneticError::Configuration(format!(
                        "Cut limit {} does not fit a genome of {}",
                        limits.upper, len
                    )));
                }
                if limits.fixed || limits.lower == limits.upper {
                    Ok((limits.lower, limits.upper))
                } else {
                    sorted_pair(rng, limits.lower, limits.upper)
                }
            }
            None if len < 2 => Ok((0, len.saturating_sub(1))),
            None => sorted_pair(rng, 0, len - 1),
        }
    }
}

impl<G: Gene, F: FitnessValue> Recombinator<G, F> for PartiallyMappedCrossover {
    fn probability(&self) -> Probability {
        self.probability
    }

    fn partners(&self) -> usize {
        2
    }

    fn recombine(
        &self,
        partners: &[Individual<G, F>],
        context: &mut Context<'_, G, F>,
    ) -> Result<Vec<Individual<G, F>>> {
        let (first, second) = parent_pair(partners)?;
        if first.is_empty() {
            return Err(GeneticError::Recombination(
                "Cannot recombine empty permutations".to_string(),
            ));
        }
        let (start, end) = self.cut_points(first.len(), &mut ThreadLocalRng::rng())?;
        let left = pmx(first.genes(), second.genes(), start, end)?;
        let right = pmx(second.genes(), first.genes(), start, end)?;
        Ok(vec![context.offspring(left)?, context.offspring(right)?])
    }
}
