//! # Binary genomes
//!
//! Bit-string individuals with bit-flip mutation. Loci can be decoded back to an
//! unsigned integer (most significant bit first) for objectives that interpret a
//! bit string as a number.
//!
//! ```rust
//! use populus::representation::binary::{decode, parse};
//!
//! let genes = parse("1011").unwrap();
//! assert_eq!(decode(&genes).unwrap(), 11);
//! ```

use rand::Rng;

use crate::breeding::{locus_rate, Context, Generator, Mutator, Probability};
use crate::error::{GeneticError, Result};
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::individual::{IdSequence, Individual};
use crate::rng::{bernoulli, ThreadLocalRng};

/// A single bit.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BinaryGene {
    bit: bool,
}

impl BinaryGene {
    pub fn new(bit: bool) -> Self {
        Self { bit }
    }

    pub fn bit(&self) -> bool {
        self.bit
    }

    pub fn set_bit(&mut self, bit: bool) {
        self.bit = bit;
    }

    pub fn flip(&mut self) {
        self.bit = !self.bit;
    }
}

impl From<bool> for BinaryGene {
    fn from(bit: bool) -> Self {
        Self::new(bit)
    }
}

impl Gene for BinaryGene {
    fn numeric(&self) -> f64 {
        if self.bit {
            1.0
        } else {
            0.0
        }
    }
}

/// Parses a string of `0`/`1` characters.
pub fn parse(pattern: &str) -> Result<Vec<BinaryGene>> {
    pattern
        .chars()
        .map(|c| match c {
            '0' => Ok(BinaryGene::new(false)),
            '1' => Ok(BinaryGene::new(true)),
            other => Err(GeneticError::Configuration(format!(
                "'{other}' is not a binary digit"
            ))),
        })
        .collect()
}

/// Renders genes as a string of `0`/`1` characters.
pub fn render(genes: &[BinaryGene]) -> String {
    genes.iter().map(|g| if g.bit { '1' } else { '0' }).collect()
}

/// Reads the bits as an unsigned integer, most significant bit first.
pub fn decode(genes: &[BinaryGene]) -> Result<u64> {
    if genes.len() > 64 {
        return Err(GeneticError::OutOfBounds(format!(
            "{} bits do not fit in 64",
            genes.len()
        )));
    }
    Ok(genes
        .iter()
        .fold(0_u64, |acc, gene| (acc << 1) | u64::from(gene.bit)))
}

/// Flips each bit with probability `rate`.
pub fn bit_flip<R>(genes: &mut [BinaryGene], rate: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for gene in genes {
        if bernoulli(rng, rate) {
            gene.flip();
        }
    }
}

/// Generates fixed-length bit strings.
#[derive(Debug, Clone)]
pub struct BinaryGenerator {
    length: usize,
}

impl BinaryGenerator {
    pub fn new(length: usize) -> Result<Self> {
        if length == 0 {
            return Err(GeneticError::Configuration(
                "Genome length must be at least 1".to_string(),
            ));
        }
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl<F: FitnessValue> Generator<BinaryGene, F> for BinaryGenerator {
    fn get(&self, ids: &IdSequence) -> Individual<BinaryGene, F> {
        Individual::new(ids.next_id(), vec![BinaryGene::default(); self.length])
    }

    fn get_random(&self, ids: &IdSequence) -> Individual<BinaryGene, F> {
        let mut rng = ThreadLocalRng::rng();
        let genes = (0..self.length)
            .map(|_| BinaryGene::new(rng.gen()))
            .collect();
        Individual::new(ids.next_id(), genes)
    }
}

/// Bit-flip mutation. Each locus flips with probability `1 / len` unless a rate is
/// given.
#[derive(Debug, Clone)]
pub struct BitFlipMutator {
    probability: Probability,
    flip_rate: Option<Probability>,
}

impl BitFlipMutator {
    pub fn new(probability: f64) -> Result<Self> {
        Ok(Self {
            probability: Probability::new(probability)?,
            flip_rate: None,
        })
    }

    pub fn with_flip_rate(mut self, rate: f64) -> Result<Self> {
        self.flip_rate = Some(Probability::new(rate)?);
        Ok(self)
    }
}

impl<F: FitnessValue> Mutator<BinaryGene, F> for BitFlipMutator {
    fn probability(&self) -> Probability {
        self.probability
    }

    fn mutate(
        &self,
        individual: &mut Individual<BinaryGene, F>,
        _context: &Context<'_, BinaryGene, F>,
    ) -> Result<()> {
        let rate = locus_rate(self.flip_rate, individual.len());
        bit_flip(individual.genes_mut()?, rate, &mut ThreadLocalRng::rng());
        Ok(())
    }
}
