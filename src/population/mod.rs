//! # Populations
//!
//! A population is a collection of evaluated individuals bound to one environment.
//! Every individual is graded on insertion, so best-of queries and statistics never
//! see an ungraded member.
//!
//! Two backings are provided:
//!
//! - [`UnorderedPopulation`]: insertion-ordered `Vec`; best and top-N are computed
//!   by scanning.
//! - [`OrderedPopulation`]: kept sorted by the environment's order; iteration and
//!   positional access run best-first, and best is `O(log n)`.
//!
//! Both answer `best`/`top_n` identically for the same members and environment.

use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

use crate::environment::Environment;
use crate::error::Result;
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::individual::{Individual, IndividualId};

pub mod ordered;
pub mod unordered;

pub use ordered::OrderedPopulation;
pub use unordered::UnorderedPopulation;

/// Read-only summary of a population, for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationStats {
    pub size: usize,
    pub distinct: usize,
    pub best: Option<f64>,
    pub sum: f64,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

pub trait Population<G: Gene, F: FitnessValue>: Debug + Send + Sync {
    fn environment(&self) -> &Arc<Environment<G, F>>;

    /// Intended generation size. Zero means "keep the current size".
    fn capacity_hint(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grades and inserts `individual`. Returns whether the population changed.
    fn add(&mut self, individual: Individual<G, F>) -> Result<bool>;

    /// Grades the batch (in parallel) and inserts it. Returns whether the
    /// population changed.
    fn add_all(&mut self, individuals: Vec<Individual<G, F>>) -> Result<bool>;

    /// Clears the population, then adds `individuals`.
    fn replace_all(&mut self, individuals: Vec<Individual<G, F>>) -> Result<bool> {
        self.clear();
        self.add_all(individuals)
    }

    /// Positional access over iteration order.
    fn get(&self, index: usize) -> Result<&Individual<G, F>>;

    /// Removes and returns the member at `index` (iteration order).
    fn take(&mut self, index: usize) -> Result<Individual<G, F>>;

    fn remove(&mut self, id: IndividualId) -> Option<Individual<G, F>>;

    fn contains(&self, id: IndividualId) -> bool {
        self.iter().any(|individual| individual.id() == id)
    }

    /// Keeps only the members for which `keep` returns `true`.
    fn retain(&mut self, keep: &mut dyn FnMut(&Individual<G, F>) -> bool);

    fn clear(&mut self);

    /// Empties the population, returning its members in iteration order.
    fn drain(&mut self) -> Vec<Individual<G, F>>;

    fn iter(&self) -> Box<dyn Iterator<Item = &Individual<G, F>> + '_>;

    fn best(&self) -> Option<&Individual<G, F>>;

    /// The `n` best members, best first.
    fn top_n(&self, n: usize) -> Vec<&Individual<G, F>>;

    /// Binds the population to `environment` and regrades every member not tagged
    /// by it. When a grade fails, the population is left as it was.
    fn rebind(&mut self, environment: Arc<Environment<G, F>>) -> Result<()>;

    /// Increments the age of every member.
    fn grow_older(&mut self);

    fn best_fitness(&self) -> Option<F> {
        self.best().and_then(|best| best.fitness().cloned())
    }

    fn fitness_sum(&self) -> f64 {
        self.iter()
            .filter_map(|individual| individual.fitness())
            .map(FitnessValue::to_f64)
            .sum()
    }

    fn mean_fitness(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.fitness_sum() / self.len() as f64)
        }
    }

    /// Sample standard deviation (divisor `n - 1`); `None` below two members.
    fn sample_std_dev(&self) -> Option<f64> {
        let n = self.len();
        if n < 2 {
            return None;
        }
        let mean = self.mean_fitness()?;
        let squares: f64 = self
            .iter()
            .filter_map(|individual| individual.fitness())
            .map(|fitness| (fitness.to_f64() - mean).powi(2))
            .sum();
        Some((squares / (n - 1) as f64).sqrt())
    }

    /// Number of distinct identities among the members.
    fn distinct_count(&self) -> usize {
        self.iter()
            .map(|individual| individual.id())
            .collect::<HashSet<_>>()
            .len()
    }

    fn statistics(&self) -> PopulationStats {
        PopulationStats {
            size: self.len(),
            distinct: self.distinct_count(),
            best: self.best_fitness().map(|fitness| fitness.to_f64()),
            sum: self.fitness_sum(),
            mean: self.mean_fitness(),
            std_dev: self.sample_std_dev(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::environment::Mode;
    use crate::individual::IdSequence;
    use crate::representation::integer::IntegerGene;

    pub type Member = Individual<IntegerGene, i64>;

    pub fn environment(mode: Mode) -> Arc<Environment<IntegerGene, i64>> {
        Arc::new(Environment::from_fn(mode, |genes: &[IntegerGene]| {
            genes.iter().map(|g| g.value()).sum()
        }))
    }

    pub fn members(ids: &IdSequence, values: &[i64]) -> Vec<Member> {
        values
            .iter()
            .map(|&v| Individual::new(ids.next_id(), vec![IntegerGene::new(v)]))
            .collect()
    }

    /// Grades the integer sum as `f64`; a locus equal to `poison` grades as NaN.
    pub fn graded(mode: Mode, poison: Option<i64>) -> Arc<Environment<IntegerGene, f64>> {
        Arc::new(Environment::from_fn(mode, move |genes: &[IntegerGene]| {
            genes
                .iter()
                .map(|g| {
                    if Some(g.value()) == poison {
                        f64::NAN
                    } else {
                        g.value() as f64
                    }
                })
                .sum()
        }))
    }

    /// A rebind whose grading fails keeps the old environment and every member.
    pub fn check_failed_rebind(
        population: &mut dyn Population<IntegerGene, f64>,
        ids: &IdSequence,
    ) {
        let batch: Vec<Individual<IntegerGene, f64>> = [1, 2, 3, 4]
            .iter()
            .map(|&v| Individual::new(ids.next_id(), vec![IntegerGene::new(v)]))
            .collect();
        population.add_all(batch).unwrap();
        let before = Arc::clone(population.environment());
        let order: Vec<_> = population.iter().map(|i| i.id()).collect();

        let poisoned = graded(Mode::Minimize, Some(3));
        assert!(matches!(
            population.rebind(Arc::clone(&poisoned)),
            Err(crate::error::GeneticError::FitnessCalculation(_))
        ));
        assert_eq!(population.len(), 4);
        assert!(Arc::ptr_eq(population.environment(), &before));
        assert!(population.iter().all(|i| i.is_evaluated_by(&before)));
        assert_eq!(population.iter().map(|i| i.id()).collect::<Vec<_>>(), order);

        population.rebind(graded(Mode::Minimize, None)).unwrap();
        assert_eq!(population.len(), 4);
    }

    /// Exercises the shared contract on any backing.
    pub fn check_contract(population: &mut dyn Population<IntegerGene, i64>, ids: &IdSequence) {
        assert!(population.is_empty());
        assert!(population.best().is_none());
        assert_eq!(population.mean_fitness(), None);

        assert!(population.add_all(members(ids, &[4, 9, 1, 9, 6])).unwrap());
        assert_eq!(population.len(), 5);
        assert!(population.iter().all(|i| i.is_evaluated_by(population.environment())));

        let best = population.best().unwrap();
        assert_eq!(*best.fitness().unwrap(), 9);
        // The first 9 was issued the smaller id.
        let nines: Vec<_> = population
            .iter()
            .filter(|i| *i.fitness().unwrap() == 9)
            .map(|i| i.id())
            .collect();
        assert_eq!(best.id(), *nines.iter().min().unwrap());

        let top: Vec<i64> = population
            .top_n(3)
            .iter()
            .map(|i| *i.fitness().unwrap())
            .collect();
        assert_eq!(top, vec![9, 9, 6]);
        assert_eq!(population.top_n(50).len(), 5);

        assert_eq!(population.fitness_sum(), 29.0);
        assert_eq!(population.mean_fitness(), Some(5.8));
        let std_dev = population.sample_std_dev().unwrap();
        assert!((std_dev - 3.420526275297414).abs() < 1e-9);
        assert_eq!(population.distinct_count(), 5);

        assert!(population.get(5).is_err());
        let taken = population.take(0).unwrap();
        assert_eq!(population.len(), 4);
        assert!(!population.contains(taken.id()));

        let expected = population
            .iter()
            .filter(|i| *i.fitness().unwrap() > 4)
            .count();
        population.retain(&mut |i| *i.fitness().unwrap() > 4);
        assert_eq!(population.len(), expected);

        population.grow_older();
        assert!(population.iter().all(|i| i.age() == 1));

        let drained = population.drain();
        assert_eq!(drained.len(), expected);
        assert!(population.is_empty());
    }
}
