use std::sync::Arc;

use crate::environment::Environment;
use crate::error::{GeneticError, OptionExt, Result};
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::individual::{Individual, IndividualId};
use crate::population::Population;

/// A `Vec`-backed population that keeps insertion order.
#[derive(Debug)]
pub struct UnorderedPopulation<G: Gene, F: FitnessValue> {
    environment: Arc<Environment<G, F>>,
    individuals: Vec<Individual<G, F>>,
    capacity_hint: usize,
}

impl<G: Gene, F: FitnessValue> UnorderedPopulation<G, F> {
    pub fn new(environment: Arc<Environment<G, F>>) -> Self {
        Self::with_capacity(environment, 0)
    }

    pub fn with_capacity(environment: Arc<Environment<G, F>>, capacity_hint: usize) -> Self {
        Self {
            environment,
            individuals: Vec::with_capacity(capacity_hint),
            capacity_hint,
        }
    }

    pub fn as_slice(&self) -> &[Individual<G, F>] {
        &self.individuals
    }
}

impl<G: Gene, F: FitnessValue> Population<G, F> for UnorderedPopulation<G, F> {
    fn environment(&self) -> &Arc<Environment<G, F>> {
        &self.environment
    }

    fn capacity_hint(&self) -> usize {
        self.capacity_hint
    }

    fn len(&self) -> usize {
        self.individuals.len()
    }

    fn add(&mut self, mut individual: Individual<G, F>) -> Result<bool> {
        self.environment.evaluate(&mut individual)?;
        self.individuals.push(individual);
        Ok(true)
    }

    fn add_all(&mut self, mut individuals: Vec<Individual<G, F>>) -> Result<bool> {
        self.environment.evaluate_all(&mut individuals)?;
        let changed = !individuals.is_empty();
        self.individuals.append(&mut individuals);
        Ok(changed)
    }

    fn get(&self, index: usize) -> Result<&Individual<G, F>> {
        let len = self.individuals.len();
        self.individuals
            .get(index)
            .ok_or_else_genetic(|| GeneticError::IndexOutOfBounds { index, len })
    }

    fn take(&mut self, index: usize) -> Result<Individual<G, F>> {
        let len = self.individuals.len();
        if index >= len {
            return Err(GeneticError::IndexOutOfBounds { index, len });
        }
        Ok(self.individuals.remove(index))
    }

    fn remove(&mut self, id: IndividualId) -> Option<Individual<G, F>> {
        let position = self.individuals.iter().position(|i| i.id() == id)?;
        Some(self.individuals.remove(position))
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&Individual<G, F>) -> bool) {
        self.individuals.retain(|individual| keep(individual));
    }

    fn clear(&mut self) {
        self.individuals.clear();
    }

    fn drain(&mut self) -> Vec<Individual<G, F>> {
        std::mem::take(&mut self.individuals)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &Individual<G, F>> + '_> {
        Box::new(self.individuals.iter())
    }

    fn best(&self) -> Option<&Individual<G, F>> {
        self.environment.best_of(&self.individuals)
    }

    fn top_n(&self, n: usize) -> Vec<&Individual<G, F>> {
        let mut ranked: Vec<&Individual<G, F>> = self.individuals.iter().collect();
        ranked.sort_by(|a, b| self.environment.compare_inverse(a, b));
        ranked.truncate(n);
        ranked
    }

    fn rebind(&mut self, environment: Arc<Environment<G, F>>) -> Result<()> {
        let mut individuals = self.individuals.clone();
        environment.evaluate_all(&mut individuals)?;
        self.environment = environment;
        self.individuals = individuals;
        Ok(())
    }

    fn grow_older(&mut self) {
        for individual in &mut self.individuals {
            individual.grow_older();
        }
    }
}
