//! # Generation strategies
//!
//! A [`Generation`] is the body of the driver loop: it turns the current population
//! into the next one using the operators available in the [`Context`]. Operators
//! are looked up when the step needs them, so a missing one surfaces as an
//! `IllegalState` error on the first generation that uses it.

use std::fmt::Debug;

use crate::breeding::{validate_partners, Context};
use crate::error::{GeneticError, Result};
use crate::evolution::termination::Progress;
use crate::fitness::FitnessValue;
use crate::gene::Gene;

pub trait Generation<G: Gene, F: FitnessValue>: Debug + Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Replaces the population in the context with the next generation.
    fn step(&self, context: &mut Context<'_, G, F>) -> Result<()>;

    /// Strategy-specific convergence test, checked before every generation.
    fn should_stop(&self, _progress: &Progress<'_, G, F>) -> bool {
        false
    }
}

/// Simple genetic algorithm: select parents, recombine, mutate, replace.
///
/// The next generation has as many members as the population's capacity hint, or
/// as the current population when the hint is zero. When recombination yields
/// fewer children than that, fresh copies of the parents (in selection order)
/// make up the difference. Parents left over after grouping them by the
/// recombinator's partner count do not reproduce.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleGa;

impl<G: Gene, F: FitnessValue> Generation<G, F> for SimpleGa {
    fn name(&self) -> &str {
        "SGA"
    }

    fn step(&self, context: &mut Context<'_, G, F>) -> Result<()> {
        let selector = context.selector()?;
        let recombinator = context.recombinator()?;
        let mutator = context.mutator()?;
        let partners = validate_partners(recombinator.partners())?;

        let population = context.population();
        let target = match population.capacity_hint() {
            0 => population.len(),
            hint => hint,
        };

        let mut parents = selector.parents(context)?;
        parents.truncate(parents.len() - parents.len() % partners);
        let mut offspring = recombinator.recombine_all(&parents, context)?;

        for parent in parents.iter().cycle().take(target.saturating_sub(offspring.len())) {
            offspring.push(context.offspring(parent.genes_copy())?);
        }
        offspring.truncate(target);
        if offspring.is_empty() && target > 0 {
            return Err(GeneticError::EmptyPopulation);
        }

        mutator.mutate_all(&mut offspring, context)?;
        context.population_mut().replace_all(offspring)?;
        Ok(())
    }
}

/// Differential evolution: one donor per member is built by the mutator from
/// generator skeletons, then the recombinator pairs each donor with a target and
/// keeps the better of trial and target.
#[derive(Debug, Clone, Copy, Default)]
pub struct DifferentialEvolution;

impl<G: Gene, F: FitnessValue> Generation<G, F> for DifferentialEvolution {
    fn name(&self) -> &str {
        "DE"
    }

    fn step(&self, context: &mut Context<'_, G, F>) -> Result<()> {
        let generator = context.generator()?;
        let mutator = context.mutator()?;
        let recombinator = context.recombinator()?;

        let mut donors = generator.get_n(context.population().len(), context.ids());
        mutator.mutate_all(&mut donors, context)?;
        let next = recombinator.recombine_all(&donors, context)?;
        context.population_mut().replace_all(next)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breeding::fixtures::{bits, generator, ones};
    use crate::breeding::OnePointCrossover;
    use crate::individual::IdSequence;
    use crate::population::{Population, UnorderedPopulation};
    use crate::representation::binary::BitFlipMutator;
    use crate::selection::ElitistSelector;
    use std::sync::Arc;

    #[test]
    fn test_sga_keeps_generation_size() {
        let ids = IdSequence::new();
        let environment = ones();
        let mut population = UnorderedPopulation::new(Arc::clone(&environment));
        population
            .add_all(vec![
                bits(&ids, "11110000"),
                bits(&ids, "00001111"),
                bits(&ids, "10101010"),
                bits(&ids, "01010101"),
                bits(&ids, "11000000"),
            ])
            .unwrap();
        let before: Vec<_> = population.iter().map(|i| i.id()).collect();

        let generator = generator(8);
        let crossover = OnePointCrossover::new(1.0).unwrap();
        let mutator = BitFlipMutator::new(0.0).unwrap();
        let selector = ElitistSelector::new();
        let mut context = Context::new(&environment, &mut population, &ids)
            .with_generator(Some(&generator))
            .with_recombinator(Some(&crossover))
            .with_mutator(Some(&mutator))
            .with_selector(Some(&selector));

        SimpleGa.step(&mut context).unwrap();
        let population = context.population();
        assert_eq!(population.len(), 5);
        assert!(population.iter().all(|i| !before.contains(&i.id())));
        assert!(population.iter().all(|i| i.is_evaluated_by(&environment)));
    }

    #[test]
    fn test_sga_needs_its_operators() {
        let ids = IdSequence::new();
        let environment = ones();
        let mut population = UnorderedPopulation::new(Arc::clone(&environment));
        population.add(bits(&ids, "1010")).unwrap();
        let mut context = Context::new(&environment, &mut population, &ids);
        assert!(matches!(
            Generation::<_, u32>::step(&SimpleGa, &mut context),
            Err(GeneticError::IllegalState(_))
        ));
    }
}
