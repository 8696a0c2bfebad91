//! # Differential mutation
//!
//! Every locus of the donor is set to `base + factor * sum(x_a - x_b)` over
//! `differences` pairs of distinct population members, then saturated into the
//! locus's bounds.

use crate::breeding::{Context, Mutator, Probability};
use crate::error::{GeneticError, OptionExt, Result};
use crate::fitness::FitnessValue;
use crate::gene::Bounded;
use crate::individual::Individual;
use crate::rng::ThreadLocalRng;

/// Which population member the perturbation starts from.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseVector {
    /// The population's current best (DE/best).
    #[default]
    Best,
    /// A random member distinct from the difference members (DE/rand).
    Random,
}

/// `base + factor * sum(a - b)`.
pub fn perturb(base: f64, pairs: &[(f64, f64)], factor: f64) -> f64 {
    base + factor * pairs.iter().map(|(a, b)| a - b).sum::<f64>()
}

#[derive(Debug, Clone)]
pub struct DifferentialMutator {
    base: BaseVector,
    differences: usize,
    factor: f64,
}

impl DifferentialMutator {
    pub fn new(base: BaseVector, differences: usize, factor: f64) -> Result<Self> {
        if differences == 0 {
            return Err(GeneticError::Configuration(
                "Differential mutation needs at least one difference".to_string(),
            ));
        }
        if !factor.is_finite() {
            return Err(GeneticError::Configuration(format!(
                "Perturbation factor must be finite, got {factor}"
            )));
        }
        Ok(Self {
            base,
            differences,
            factor,
        })
    }

    /// DE/best/`differences`.
    pub fn best(differences: usize, factor: f64) -> Result<Self> {
        Self::new(BaseVector::Best, differences, factor)
    }

    /// DE/rand/`differences`.
    pub fn random(differences: usize, factor: f64) -> Result<Self> {
        Self::new(BaseVector::Random, differences, factor)
    }

    pub fn differences(&self) -> usize {
        self.differences
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn base(&self) -> BaseVector {
        self.base
    }

    fn members_needed(&self) -> usize {
        match self.base {
            BaseVector::Best => 2 * self.differences,
            BaseVector::Random => 2 * self.differences + 1,
        }
    }
}

impl<G, F> Mutator<G, F> for DifferentialMutator
where
    G: Bounded<Value = f64>,
    F: FitnessValue,
{
    /// Every donor is perturbed.
    fn probability(&self) -> Probability {
        Probability::ONE
    }

    fn mutate(&self, individual: &mut Individual<G, F>, context: &Context<'_, G, F>) -> Result<()> {
        let population = context.population();
        let indices = ThreadLocalRng::sample_indices(population.len(), self.members_needed())?;
        let base = match self.base {
            BaseVector::Best => population
                .best()
                .ok_or_else_genetic(|| GeneticError::EmptyPopulation)?,
            BaseVector::Random => population.get(indices[2 * self.differences])?,
        };
        let members = indices[..2 * self.differences]
            .iter()
            .map(|&index| population.get(index))
            .collect::<Result<Vec<_>>>()?;

        let mut pairs = Vec::with_capacity(self.differences);
        for locus in 0..individual.len() {
            pairs.clear();
            for pair in members.chunks(2) {
                pairs.push((pair[0].gene(locus)?.value(), pair[1].gene(locus)?.value()));
            }
            let value = perturb(base.gene(locus)?.value(), &pairs, self.factor);
            individual.gene_mut(locus)?.saturate(value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Environment, Mode};
    use crate::individual::IdSequence;
    use crate::population::{Population, UnorderedPopulation};
    use crate::representation::real::{next_below, RealGene};
    use std::sync::Arc;

    type Vector = Individual<RealGene, f64>;

    fn environment() -> Arc<Environment<RealGene, f64>> {
        Arc::new(Environment::from_fn(Mode::Maximize, |genes: &[RealGene]| {
            genes.iter().map(|g| g.value()).sum()
        }))
    }

    fn vector(ids: &IdSequence, values: &[f64]) -> Vector {
        let genes = values
            .iter()
            .map(|&v| RealGene::bounded(v, 0.0, 10.0).unwrap())
            .collect();
        Individual::new(ids.next_id(), genes)
    }

    #[test]
    fn test_perturb() {
        assert_eq!(perturb(9.0, &[(9.0, 1.0)], 0.375), 12.0);
        assert_eq!(perturb(1.0, &[(2.0, 1.0), (5.0, 3.0)], 0.5), 2.5);
        assert_eq!(perturb(4.0, &[], 0.8), 4.0);
    }

    #[test]
    fn test_overflow_saturates_below_upper_bound() {
        let mut gene = RealGene::bounded(0.0, 0.0, 10.0).unwrap();
        gene.saturate(perturb(9.0, &[(9.0, 1.0)], 0.375)).unwrap();
        assert_eq!(gene.value(), next_below(10.0));
        assert!(gene.value() < 10.0);
    }

    #[test]
    fn test_best_base_mutation_stays_in_bounds() {
        let ids = IdSequence::new();
        let environment = environment();
        let mut population = UnorderedPopulation::new(Arc::clone(&environment));
        population
            .add_all(vec![vector(&ids, &[9.5]), vector(&ids, &[0.5])])
            .unwrap();
        let context = Context::new(&environment, &mut population, &ids);

        let mutator = DifferentialMutator::best(1, 1.0).unwrap();
        for _ in 0..20 {
            let mut donor = vector(&ids, &[0.0]);
            mutator.mutate(&mut donor, &context).unwrap();
            // 9.5 + (9.5 - 0.5) overflows, 9.5 + (0.5 - 9.5) lands on 0.5.
            let value = donor.genes()[0].value();
            assert!(value == next_below(10.0) || value == 0.5, "got {value}");
        }
    }

    #[test]
    fn test_random_base_needs_enough_members() {
        let ids = IdSequence::new();
        let environment = environment();
        let mut population = UnorderedPopulation::new(Arc::clone(&environment));
        population
            .add_all(vec![vector(&ids, &[1.0]), vector(&ids, &[2.0])])
            .unwrap();
        let context = Context::new(&environment, &mut population, &ids);

        let mutator = DifferentialMutator::random(1, 0.5).unwrap();
        let mut donor = vector(&ids, &[0.0]);
        assert!(matches!(
            mutator.mutate(&mut donor, &context),
            Err(GeneticError::IllegalState(_))
        ));
    }

    #[test]
    fn test_random_base_uses_members() {
        let ids = IdSequence::new();
        let environment = environment();
        let mut population = UnorderedPopulation::new(Arc::clone(&environment));
        population
            .add_all((0..3).map(|_| vector(&ids, &[3.0, 7.0])).collect())
            .unwrap();
        let context = Context::new(&environment, &mut population, &ids);

        let mutator = DifferentialMutator::random(1, 0.9).unwrap();
        let mut donor = vector(&ids, &[0.0, 0.0]);
        mutator.mutate(&mut donor, &context).unwrap();
        let values: Vec<f64> = donor.genes().iter().map(|g| g.value()).collect();
        assert_eq!(values, vec![3.0, 7.0]);
    }

    #[test]
    fn test_constructor_validation() {
        assert!(DifferentialMutator::best(0, 0.5).is_err());
        assert!(DifferentialMutator::random(1, f64::NAN).is_err());
        let mutator = DifferentialMutator::best(2, 0.7).unwrap();
        assert_eq!(mutator.differences(), 2);
        assert_eq!(mutator.base(), BaseVector::Best);
        assert_eq!(
            Mutator::<RealGene, f64>::probability(&mutator),
            Probability::ONE
        );
    }
}
