use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::environment::{rank, Environment, Mode};
use crate::error::{GeneticError, OptionExt, Result};
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::individual::{Individual, IndividualId};
use crate::population::Population;

/// Sort key: grade and id, ordered worst to best under `mode`.
#[derive(Debug, Clone)]
struct RankKey<F: FitnessValue> {
    fitness: F,
    id: IndividualId,
    mode: Mode,
}

impl<F: FitnessValue> PartialEq for RankKey<F> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<F: FitnessValue> Eq for RankKey<F> {}

impl<F: FitnessValue> PartialOrd for RankKey<F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<F: FitnessValue> Ord for RankKey<F> {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.id == other.id {
            return Ordering::Equal;
        }
        rank(
            self.mode,
            (&self.fitness, self.id.value()),
            (&other.fitness, other.id.value()),
        )
    }
}

/// A population kept sorted by its environment's order.
///
/// Iteration and positional access run best-first. Inserting an individual whose
/// id is already present leaves the population unchanged.
#[derive(Debug)]
pub struct OrderedPopulation<G: Gene, F: FitnessValue> {
    environment: Arc<Environment<G, F>>,
    members: BTreeMap<RankKey<F>, Individual<G, F>>,
    index: HashMap<IndividualId, RankKey<F>>,
    capacity_hint: usize,
}

impl<G: Gene, F: FitnessValue> OrderedPopulation<G, F> {
    pub fn new(environment: Arc<Environment<G, F>>) -> Self {
        Self::with_capacity(environment, 0)
    }

    pub fn with_capacity(environment: Arc<Environment<G, F>>, capacity_hint: usize) -> Self {
        Self {
            environment,
            members: BTreeMap::new(),
            index: HashMap::new(),
            capacity_hint,
        }
    }

    pub fn worst(&self) -> Option<&Individual<G, F>> {
        self.members.values().next()
    }

    fn key_for(&self, individual: &Individual<G, F>) -> Result<RankKey<F>> {
        let fitness = individual.fitness().cloned().ok_or_else_genetic(|| {
            GeneticError::IllegalState(format!(
                "Individual {} has not been evaluated",
                individual.id()
            ))
        })?;
        Ok(RankKey {
            fitness,
            id: individual.id(),
            mode: self.environment.mode(),
        })
    }

    fn insert_evaluated(&mut self, individual: Individual<G, F>) -> Result<bool> {
        if self.contains(individual.id()) {
            return Ok(false);
        }
        let key = self.key_for(&individual)?;
        self.index.insert(individual.id(), key.clone());
        self.members.insert(key, individual);
        Ok(true)
    }

    fn key_at(&self, index: usize) -> Result<RankKey<F>> {
        let len = self.members.len();
        self.members
            .keys()
            .rev()
            .nth(index)
            .cloned()
            .ok_or_else_genetic(|| GeneticError::IndexOutOfBounds { index, len })
    }
}

impl<G: Gene, F: FitnessValue> Population<G, F> for OrderedPopulation<G, F> {
    fn environment(&self) -> &Arc<Environment<G, F>> {
        &self.environment
    }

    fn capacity_hint(&self) -> usize {
        self.capacity_hint
    }

    fn len(&self) -> usize {
        self.members.len()
    }

    fn add(&mut self, mut individual: Individual<G, F>) -> Result<bool> {
        self.environment.evaluate(&mut individual)?;
        self.insert_evaluated(individual)
    }

    fn add_all(&mut self, mut individuals: Vec<Individual<G, F>>) -> Result<bool> {
        self.environment.evaluate_all(&mut individuals)?;
        let mut changed = false;
        for individual in individuals {
            changed |= self.insert_evaluated(individual)?;
        }
        Ok(changed)
    }

    fn get(&self, index: usize) -> Result<&Individual<G, F>> {
        let len = self.members.len();
        self.members
            .values()
            .rev()
            .nth(index)
            .ok_or_else_genetic(|| GeneticError::IndexOutOfBounds { index, len })
    }

    fn take(&mut self, index: usize) -> Result<Individual<G, F>> {
        let key = self.key_at(index)?;
        let len = self.members.len();
        self.index.remove(&key.id);
        self.members
            .remove(&key)
            .ok_or_else_genetic(|| GeneticError::IndexOutOfBounds { index, len })
    }

    fn remove(&mut self, id: IndividualId) -> Option<Individual<G, F>> {
        let key = self.index.remove(&id)?;
        self.members.remove(&key)
    }

    fn contains(&self, id: IndividualId) -> bool {
        self.index.contains_key(&id)
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&Individual<G, F>) -> bool) {
        let index = &mut self.index;
        self.members.retain(|key, individual| {
            let kept = keep(individual);
            if !kept {
                index.remove(&key.id);
            }
            kept
        });
    }

    fn clear(&mut self) {
        self.members.clear();
        self.index.clear();
    }

    fn drain(&mut self) -> Vec<Individual<G, F>> {
        self.index.clear();
        let mut drained: Vec<_> = std::mem::take(&mut self.members).into_values().collect();
        drained.reverse();
        drained
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &Individual<G, F>> + '_> {
        Box::new(self.members.values().rev())
    }

    fn best(&self) -> Option<&Individual<G, F>> {
        self.members.values().next_back()
    }

    fn top_n(&self, n: usize) -> Vec<&Individual<G, F>> {
        self.members.values().rev().take(n).collect()
    }

    /// Members are regraded on copies; on failure the population keeps its old
    /// environment and members.
    fn rebind(&mut self, environment: Arc<Environment<G, F>>) -> Result<()> {
        let mut members: Vec<_> = self.members.values().cloned().collect();
        environment.evaluate_all(&mut members)?;
        self.environment = environment;
        self.clear();
        for individual in members {
            self.insert_evaluated(individual)?;
        }
        Ok(())
    }

    fn grow_older(&mut self) {
        for individual in self.members.values_mut() {
            individual.grow_older();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::individual::IdSequence;
    use crate::population::fixtures::{
        check_contract, check_failed_rebind, environment, graded, members,
    };
    use crate::population::UnorderedPopulation;

    #[test]
    fn test_population_contract() {
        let ids = IdSequence::new();
        let mut population = OrderedPopulation::new(environment(Mode::Maximize));
        check_contract(&mut population, &ids);
    }

    #[test]
    fn test_failed_rebind_keeps_members() {
        let ids = IdSequence::new();
        let mut population = OrderedPopulation::new(graded(Mode::Maximize, None));
        check_failed_rebind(&mut population, &ids);
    }

    #[test]
    fn test_id_index_follows_removals() {
        let ids = IdSequence::new();
        let mut population = OrderedPopulation::new(environment(Mode::Maximize));
        let batch = members(&ids, &[1, 2, 3, 4]);
        let (first, last) = (batch[0].id(), batch[3].id());
        population.add_all(batch).unwrap();

        assert!(population.remove(first).is_some());
        assert!(!population.contains(first));
        assert!(population.remove(first).is_none());

        // Index 0 is the best member, the 4.
        assert_eq!(population.take(0).unwrap().id(), last);
        assert!(!population.contains(last));

        population.retain(&mut |i| *i.fitness().unwrap() != 2);
        assert_eq!(population.len(), 1);
        assert_eq!(population.iter().filter(|i| population.contains(i.id())).count(), 1);

        population.clear();
        let again = members(&ids, &[7]);
        let id = again[0].id();
        assert!(population.add_all(again).unwrap());
        assert!(population.contains(id));
    }

    #[test]
    fn test_iteration_is_best_first() {
        let ids = IdSequence::new();
        let mut population = OrderedPopulation::new(environment(Mode::Minimize));
        population.add_all(members(&ids, &[7, 2, 5, 2])).unwrap();

        let grades: Vec<i64> = population.iter().map(|i| *i.fitness().unwrap()).collect();
        assert_eq!(grades, vec![2, 2, 5, 7]);
        assert_eq!(population.get(0).unwrap().id(), population.best().unwrap().id());
        assert_eq!(*population.worst().unwrap().fitness().unwrap(), 7);
    }

    #[test]
    fn test_duplicate_identity_is_ignored() {
        let ids = IdSequence::new();
        let mut population = OrderedPopulation::new(environment(Mode::Maximize));
        let batch = members(&ids, &[1, 2]);
        let again = batch[1].clone();
        assert!(population.add_all(batch).unwrap());
        assert!(!population.add(again).unwrap());
        assert_eq!(population.len(), 2);
    }

    #[test]
    fn test_agrees_with_unordered_backing() {
        let ids = IdSequence::new();
        for mode in [Mode::Maximize, Mode::Minimize] {
            let shared = environment(mode);
            let batch = members(&ids, &[3, 8, 8, -1, 0, 3, 12, 12]);
            let mut ordered = OrderedPopulation::new(Arc::clone(&shared));
            let mut unordered = UnorderedPopulation::new(Arc::clone(&shared));
            ordered.add_all(batch.clone()).unwrap();
            unordered.add_all(batch).unwrap();

            assert_eq!(ordered.best().unwrap().id(), unordered.best().unwrap().id());
            let left: Vec<_> = ordered.top_n(5).iter().map(|i| i.id()).collect();
            let right: Vec<_> = unordered.top_n(5).iter().map(|i| i.id()).collect();
            assert_eq!(left, right);
        }
    }

    #[test]
    fn test_rebind_reorders() {
        let ids = IdSequence::new();
        let mut population = OrderedPopulation::new(environment(Mode::Maximize));
        population.add_all(members(&ids, &[1, 5, 3])).unwrap();
        population.rebind(environment(Mode::Minimize)).unwrap();
        let grades: Vec<i64> = population.iter().map(|i| *i.fitness().unwrap()).collect();
        assert_eq!(grades, vec![1, 3, 5]);
    }
}
