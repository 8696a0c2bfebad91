//! # Real-valued genomes
//!
//! Real loci live in `[lower, upper)`. An unbounded gene accepts every finite
//! value. Mutation resets loci uniformly within their bounds; recombination
//! blends parents arithmetically.
//!
//! ```rust
//! use populus::gene::Bounded;
//! use populus::representation::real::{next_below, RealGene};
//!
//! let mut gene = RealGene::bounded(1.0, 0.0, 10.0).unwrap();
//! assert!(gene.set_value(10.0).is_err());
//! gene.saturate(12.0).unwrap();
//! assert_eq!(gene.value(), next_below(10.0));
//! ```

use rand::Rng;

use crate::breeding::crossover::random_cut;
use crate::breeding::{
    locus_rate, parent_pair, Context, Generator, Mutator, Probability, Recombinator,
};
use crate::error::{GeneticError, Result};
use crate::fitness::FitnessValue;
use crate::gene::{Bounded, Gene};
use crate::individual::{IdSequence, Individual};
use crate::rng::{bernoulli, ThreadLocalRng};

/// The greatest `f64` strictly below `x`.
///
/// `next_below(f64::INFINITY)` is `f64::MAX`; NaN and negative infinity are
/// returned unchanged.
pub fn next_below(x: f64) -> f64 {
    if x.is_nan() || x == f64::NEG_INFINITY {
        return x;
    }
    if x == 0.0 {
        return -f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits - 1)
    } else {
        f64::from_bits(bits + 1)
    }
}

/// A real locus restricted to `[lower, upper)`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RealGeneFields"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RealGene {
    value: f64,
    lower: f64,
    upper: f64,
}

/// Unchecked wire form of [`RealGene`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RealGeneFields {
    value: f64,
    lower: f64,
    upper: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RealGeneFields> for RealGene {
    type Error = GeneticError;

    fn try_from(fields: RealGeneFields) -> Result<Self> {
        Self::bounded(fields.value, fields.lower, fields.upper)
    }
}

impl RealGene {
    /// A gene accepting every finite value.
    pub fn unbounded(value: f64) -> Result<Self> {
        Self::bounded(value, -f64::MAX, f64::INFINITY)
    }

    pub fn bounded(value: f64, lower: f64, upper: f64) -> Result<Self> {
        if !(lower < upper) {
            return Err(GeneticError::Configuration(format!(
                "Real bounds [{lower}, {upper}) are empty"
            )));
        }
        let mut gene = Self {
            value: lower,
            lower,
            upper,
        };
        gene.set_value(value)?;
        Ok(gene)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// A copy carrying `value` under the same bounds.
    pub fn with_value(&self, value: f64) -> Result<Self> {
        let mut gene = *self;
        gene.set_value(value)?;
        Ok(gene)
    }

    /// Width of the range; infinite for unbounded genes.
    pub fn span(&self) -> f64 {
        self.upper - self.lower
    }
}

impl Gene for RealGene {
    fn numeric(&self) -> f64 {
        self.value
    }
}

impl Bounded for RealGene {
    type Value = f64;

    fn value(&self) -> f64 {
        self.value
    }

    fn lower(&self) -> f64 {
        self.lower
    }

    fn upper(&self) -> f64 {
        self.upper
    }

    fn set_value(&mut self, value: f64) -> Result<()> {
        if !self.contains(value) {
            return Err(GeneticError::OutOfBounds(format!(
                "{value} is outside [{}, {})",
                self.lower, self.upper
            )));
        }
        self.value = value;
        Ok(())
    }

    fn maximize(&mut self) {
        self.value = next_below(self.upper);
    }

    fn minimize(&mut self) {
        self.value = self.lower;
    }
}

/// Resets each gene, with probability `rate`, to a uniform draw from its bounds.
///
/// # Errors
///
/// `Configuration` when a selected gene has an infinite range.
pub fn uniform_reset<R>(genes: &mut [RealGene], rate: f64, rng: &mut R) -> Result<()>
where
    R: Rng + ?Sized,
{
    for gene in genes {
        if bernoulli(rng, rate) {
            if !gene.span().is_finite() {
                return Err(GeneticError::Configuration(
                    "Uniform mutation needs finite gene bounds".to_string(),
                ));
            }
            let value = rng.gen_range(gene.lower..gene.upper);
            gene.set_value(value)?;
        }
    }
    Ok(())
}

/// Arithmetic recombination.
///
/// Loci before `cut` are copied from the own parent. From `cut` on, each child
/// locus is `alpha * other + (1 - alpha) * own`, saturated into the own parent's
/// bounds. A cut of zero blends every locus.
pub fn arithmetic(
    first: &[RealGene],
    second: &[RealGene],
    cut: usize,
    alpha: f64,
) -> Result<(Vec<RealGene>, Vec<RealGene>)> {
    if first.len() != second.len() {
        return Err(GeneticError::Recombination(format!(
            "Parents have different lengths: {} and {}",
            first.len(),
            second.len()
        )));
    }
    if cut > first.len() {
        return Err(GeneticError::IndexOutOfBounds {
            index: cut,
            len: first.len(),
        });
    }
    let blend = |own: &[RealGene], other: &[RealGene]| -> Result<Vec<RealGene>> {
        own.iter()
            .zip(other)
            .enumerate()
            .map(|(locus, (mine, theirs))| {
                if locus < cut {
                    Ok(*mine)
                } else {
                    let mut child = *mine;
                    child.saturate(alpha * theirs.value + (1.0 - alpha) * mine.value)?;
                    Ok(child)
                }
            })
            .collect()
    };
    Ok((blend(first, second)?, blend(second, first)?))
}

/// Generates real genomes with per-locus bounds.
#[derive(Debug, Clone)]
pub struct RealGenerator {
    bounds: Vec<(f64, f64)>,
}

impl RealGenerator {
    /// `length` loci, all within `[lower, upper)`.
    pub fn new(length: usize, lower: f64, upper: f64) -> Result<Self> {
        Self::with_bounds(vec![(lower, upper); length])
    }

    pub fn with_bounds(bounds: Vec<(f64, f64)>) -> Result<Self> {
        if bounds.is_empty() {
            return Err(GeneticError::Configuration(
                "Genome length must be at least 1".to_string(),
            ));
        }
        for &(lower, upper) in &bounds {
            if !(lower < upper) || !(upper - lower).is_finite() {
                return Err(GeneticError::Configuration(format!(
                    "Real bounds [{lower}, {upper}) must be non-empty and finite"
                )));
            }
        }
        Ok(Self { bounds })
    }

    pub fn length(&self) -> usize {
        self.bounds.len()
    }
}

impl<F: FitnessValue> Generator<RealGene, F> for RealGenerator {
    fn get(&self, ids: &IdSequence) -> Individual<RealGene, F> {
        let genes = self
            .bounds
            .iter()
            .map(|&(lower, upper)| RealGene {
                value: lower,
                lower,
                upper,
            })
            .collect();
        Individual::new(ids.next_id(), genes)
    }

    fn get_random(&self, ids: &IdSequence) -> Individual<RealGene, F> {
        let mut rng = ThreadLocalRng::rng();
        let genes = self
            .bounds
            .iter()
            .map(|&(lower, upper)| RealGene {
                value: rng.gen_range(lower..upper),
                lower,
                upper,
            })
            .collect();
        Individual::new(ids.next_id(), genes)
    }
}

/// Uniform mutation. Each locus resets with probability `1 / len` unless a rate is
/// given.
#[derive(Debug, Clone)]
pub struct UniformMutator {
    probability: Probability,
    reset_rate: Option<Probability>,
}

impl UniformMutator {
    pub fn new(probability: f64) -> Result<Self> {
        Ok(Self {
            probability: Probability::new(probability)?,
            reset_rate: None,
        })
    }

    pub fn with_reset_rate(mut self, rate: f64) -> Result<Self> {
        self.reset_rate = Some(Probability::new(rate)?);
        Ok(self)
    }
}

impl<F: FitnessValue> Mutator<RealGene, F> for UniformMutator {
    fn probability(&self) -> Probability {
        self.probability
    }

    fn mutate(
        &self,
        individual: &mut Individual<RealGene, F>,
        _context: &Context<'_, RealGene, F>,
    ) -> Result<()> {
        let rate = locus_rate(self.reset_rate, individual.len());
        uniform_reset(individual.genes_mut()?, rate, &mut ThreadLocalRng::rng())
    }
}

/// Simple (random cut) or whole (cut zero) arithmetic recombination.
#[derive(Debug, Clone)]
pub struct ArithmeticCrossover {
    probability: Probability,
    alpha: Probability,
    cut: Option<usize>,
}

impl ArithmeticCrossover {
    /// Simple arithmetic recombination: blends from a random cut onwards.
    pub fn simple(probability: f64, alpha: f64) -> Result<Self> {
        Ok(Self {
            probability: Probability::new(probability)?,
            alpha: Probability::new(alpha)?,
            cut: None,
        })
    }

    /// Whole arithmetic recombination: blends every locus.
    pub fn whole(probability: f64, alpha: f64) -> Result<Self> {
        Ok(Self::simple(probability, alpha)?.with_cut(0))
    }

    pub fn with_cut(mut self, cut: usize) -> Self {
        self.cut = Some(cut);
        self
    }
}

impl<F: FitnessValue> Recombinator<RealGene, F> for ArithmeticCrossover {
    fn probability(&self) -> Probability {
        self.probability
    }

    fn partners(&self) -> usize {
        2
    }

    fn recombine(
        &self,
        partners: &[Individual<RealGene, F>],
        context: &mut Context<'_, RealGene, F>,
    ) -> Result<Vec<Individual<RealGene, F>>> {
        let (first, second) = parent_pair(partners)?;
        let cut = match self.cut {
            Some(cut) => cut,
            None => random_cut(&mut ThreadLocalRng::rng(), first.len())?,
        };
        let (left, right) = arithmetic(first.genes(), second.genes(), cut, self.alpha.value())?;
        Ok(vec![context.offspring(left)?, context.offspring(right)?])
    }
}
