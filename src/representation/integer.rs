//! # Integer genomes
//!
//! Integer loci, optionally restricted to `[lower, upper)`, with random-resetting
//! mutation.

use rand::Rng;

use crate::breeding::{locus_rate, Context, Generator, Mutator, Probability};
use crate::error::{GeneticError, Result};
use crate::fitness::FitnessValue;
use crate::gene::{Bounded, Gene};
use crate::individual::{IdSequence, Individual};
use crate::rng::{bernoulli, ThreadLocalRng};

/// An integer locus. Unbounded genes accept every `i64`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "IntegerGeneFields"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerGene {
    value: i64,
    bounds: Option<(i64, i64)>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct IntegerGeneFields {
    value: i64,
    bounds: Option<(i64, i64)>,
}

#[cfg(feature = "serde")]
impl TryFrom<IntegerGeneFields> for IntegerGene {
    type Error = GeneticError;

    fn try_from(fields: IntegerGeneFields) -> Result<Self> {
        match fields.bounds {
            Some((lower, upper)) => Self::bounded(fields.value, lower, upper),
            None => Ok(Self::new(fields.value)),
        }
    }
}

impl IntegerGene {
    pub fn new(value: i64) -> Self {
        Self {
            value,
            bounds: None,
        }
    }

    /// A gene restricted to `[lower, upper)`.
    pub fn bounded(value: i64, lower: i64, upper: i64) -> Result<Self> {
        if lower >= upper {
            return Err(GeneticError::Configuration(format!(
                "Integer bounds [{lower}, {upper}) are empty"
            )));
        }
        let mut gene = Self {
            value: lower,
            bounds: Some((lower, upper)),
        };
        gene.set_value(value)?;
        Ok(gene)
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn is_bounded(&self) -> bool {
        self.bounds.is_some()
    }
}

impl Gene for IntegerGene {
    fn numeric(&self) -> f64 {
        self.value as f64
    }
}

impl Bounded for IntegerGene {
    type Value = i64;

    fn value(&self) -> i64 {
        self.value
    }

    fn lower(&self) -> i64 {
        self.bounds.map_or(i64::MIN, |(lower, _)| lower)
    }

    fn upper(&self) -> i64 {
        self.bounds.map_or(i64::MAX, |(_, upper)| upper)
    }

    fn contains(&self, value: i64) -> bool {
        match self.bounds {
            Some((lower, upper)) => value >= lower && value < upper,
            None => true,
        }
    }

    fn set_value(&mut self, value: i64) -> Result<()> {
        if !self.contains(value) {
            return Err(GeneticError::OutOfBounds(format!(
                "{value} is outside [{}, {})",
                self.lower(),
                self.upper()
            )));
        }
        self.value = value;
        Ok(())
    }

    fn maximize(&mut self) {
        self.value = match self.bounds {
            Some((_, upper)) => upper - 1,
            None => i64::MAX,
        };
    }

    fn minimize(&mut self) {
        self.value = self.lower();
    }
}

/// Replaces each gene, with probability `rate`, by a uniform draw from its bounds.
pub fn random_reset<R>(genes: &mut [IntegerGene], rate: f64, rng: &mut R) -> Result<()>
where
    R: Rng + ?Sized,
{
    for gene in genes {
        if bernoulli(rng, rate) {
            let value = match gene.bounds {
                Some((lower, upper)) => rng.gen_range(lower..upper),
                None => rng.gen(),
            };
            gene.set_value(value)?;
        }
    }
    Ok(())
}

/// Generates fixed-length integer genomes within `[lower, upper)`.
#[derive(Debug, Clone)]
pub struct IntegerGenerator {
    length: usize,
    lower: i64,
    upper: i64,
}

impl IntegerGenerator {
    pub fn new(length: usize, lower: i64, upper: i64) -> Result<Self> {
        if length == 0 {
            return Err(GeneticError::Configuration(
                "Genome length must be at least 1".to_string(),
            ));
        }
        if lower >= upper {
            return Err(GeneticError::Configuration(format!(
                "Integer bounds [{lower}, {upper}) are empty"
            )));
        }
        Ok(Self {
            length,
            lower,
            upper,
        })
    }

    fn gene(&self, value: i64) -> IntegerGene {
        IntegerGene {
            value,
            bounds: Some((self.lower, self.upper)),
        }
    }
}

impl<F: FitnessValue> Generator<IntegerGene, F> for IntegerGenerator {
    fn get(&self, ids: &IdSequence) -> Individual<IntegerGene, F> {
        Individual::new(ids.next_id(), vec![self.gene(self.lower); self.length])
    }

    fn get_random(&self, ids: &IdSequence) -> Individual<IntegerGene, F> {
        let mut rng = ThreadLocalRng::rng();
        let genes = (0..self.length)
            .map(|_| self.gene(rng.gen_range(self.lower..self.upper)))
            .collect();
        Individual::new(ids.next_id(), genes)
    }
}

/// Random-resetting mutation. Each locus resets with probability `1 / len` unless
/// a rate is given.
#[derive(Debug, Clone)]
pub struct RandomResetMutator {
    probability: Probability,
    reset_rate: Option<Probability>,
}

impl RandomResetMutator {
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

impl<F: FitnessValue> Mutator<IntegerGene, F> for RandomResetMutator {
    fn probability(&self) -> Probability {
        self.probability
    }

    fn mutate(
        &self,
        individual: &mut Individual<IntegerGene, F>,
        _context: &Context<'_, IntegerGene, F>,
    ) -> Result<()> {
        let rate = locus_rate(self.reset_rate, individual.len());
        random_reset(individual.genes_mut()?, rate, &mut ThreadLocalRng::rng())
    }
}
