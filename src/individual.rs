//! # Individuals
//!
//! An [`Individual`] is a candidate solution: a fixed-length gene sequence plus the
//! bookkeeping the engine needs (identity, age, memoized fitness).
//!
//! Identity is a numeric [`IndividualId`] handed out by an [`IdSequence`]. Equality
//! and hashing use the id only, so a cloned individual is a snapshot of the same
//! candidate rather than a new one.
//!
//! Once an environment has graded an individual its genes are frozen; any attempt
//! to modify them fails with [`GeneticError::ImmutableIndividual`].
//!
//! ```rust
//! use populus::individual::{IdSequence, Individual};
//! use populus::representation::binary::BinaryGene;
//!
//! let ids = IdSequence::new();
//! let mut individual: Individual<BinaryGene, u32> =
//!     Individual::new(ids.next_id(), vec![BinaryGene::new(false); 4]);
//!
//! individual.set_gene(2, BinaryGene::new(true)).unwrap();
//! assert_eq!(individual.gene(2).unwrap().bit(), true);
//! assert_eq!(individual.grow_older(), 1);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::environment::{Environment, EnvironmentId};
use crate::error::{GeneticError, OptionExt, Result};
use crate::fitness::FitnessValue;
use crate::gene::Gene;

/// Process-unique identity of an individual.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndividualId(u64);

impl IndividualId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IndividualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic source of individual ids.
///
/// Clones share the same counter, so an algorithm and its operators can hand the
/// sequence around while every id stays unique.
#[derive(Debug, Clone, Default)]
pub struct IdSequence {
    next: Arc<AtomicU64>,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: Arc::new(AtomicU64::new(first)),
        }
    }

    pub fn next_id(&self) -> IndividualId {
        IndividualId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids handed out so far (counting from the starting value).
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

/// A candidate solution.
#[derive(Debug, Clone)]
pub struct Individual<G: Gene, F: FitnessValue> {
    id: IndividualId,
    genes: Vec<G>,
    age: u32,
    fitness: Option<F>,
    evaluated_by: Option<EnvironmentId>,
}

impl<G: Gene, F: FitnessValue> Individual<G, F> {
    pub fn new(id: IndividualId, genes: Vec<G>) -> Self {
        Self {
            id,
            genes,
            age: 0,
            fitness: None,
            evaluated_by: None,
        }
    }

    pub fn id(&self) -> IndividualId {
        self.id
    }

    pub fn genes(&self) -> &[G] {
        &self.genes
    }

    /// Owned copies of all genes.
    pub fn genes_copy(&self) -> Vec<G> {
        self.genes.clone()
    }

    pub fn into_genes(self) -> Vec<G> {
        self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn gene(&self, index: usize) -> Result<&G> {
        let len = self.genes.len();
        self.genes
            .get(index)
            .ok_or_else_genetic(|| GeneticError::IndexOutOfBounds { index, len })
    }

    /// Mutable access to the genes of an individual that has not been evaluated yet.
    pub fn genes_mut(&mut self) -> Result<&mut [G]> {
        self.ensure_mutable()?;
        Ok(&mut self.genes)
    }

    pub fn gene_mut(&mut self, index: usize) -> Result<&mut G> {
        self.ensure_mutable()?;
        let len = self.genes.len();
        self.genes
            .get_mut(index)
            .ok_or_else_genetic(|| GeneticError::IndexOutOfBounds { index, len })
    }

    pub fn set_gene(&mut self, index: usize, gene: G) -> Result<()> {
        *self.gene_mut(index)? = gene;
        Ok(())
    }

    /// Overwrites consecutive loci starting at `start`.
    ///
    /// Nothing is written unless the whole run fits.
    pub fn set_genes<I>(&mut self, start: usize, genes: I) -> Result<()>
    where
        I: IntoIterator<Item = G>,
    {
        self.ensure_mutable()?;
        let genes: Vec<G> = genes.into_iter().collect();
        let len = self.genes.len();
        let end = start
            .checked_add(genes.len())
            .filter(|&end| end <= len)
            .ok_or_else_genetic(|| GeneticError::IndexOutOfBounds {
                index: start.saturating_add(genes.len()).saturating_sub(1),
                len,
            })?;
        for (slot, gene) in self.genes[start..end].iter_mut().zip(genes) {
            *slot = gene;
        }
        Ok(())
    }

    /// Copies `source` into consecutive loci starting at `start`.
    pub fn copy_genes_from(&mut self, start: usize, source: &[G]) -> Result<()> {
        self.set_genes(start, source.iter().cloned())
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn set_age(&mut self, age: u32) {
        self.age = age;
    }

    /// Increments the age and returns the new value.
    pub fn grow_older(&mut self) -> u32 {
        self.age = self.age.saturating_add(1);
        self.age
    }

    pub fn fitness(&self) -> Option<&F> {
        self.fitness.as_ref()
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluated_by.is_some()
    }

    pub fn evaluated_by(&self) -> Option<EnvironmentId> {
        self.evaluated_by
    }

    pub fn is_evaluated_by(&self, environment: &Environment<G, F>) -> bool {
        self.evaluated_by == Some(environment.id())
    }

    pub(crate) fn record_fitness(&mut self, fitness: F, environment: EnvironmentId) {
        self.fitness = Some(fitness);
        self.evaluated_by = Some(environment);
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.is_evaluated() {
            Err(GeneticError::ImmutableIndividual(self.id.value()))
        } else {
            Ok(())
        }
    }
}

impl<G: Gene, F: FitnessValue> PartialEq for Individual<G, F> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<G: Gene, F: FitnessValue> Eq for Individual<G, F> {}

impl<G: Gene, F: FitnessValue> Hash for Individual<G, F> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
