use std::fmt::Debug;

use rand::Rng;

use crate::breeding::Context;
use crate::error::{GeneticError, Result};
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::individual::Individual;
use crate::population::Population;
use crate::rng::sample_indices;

/// Chooses parents and survivors from the population of the running algorithm.
pub trait Selector<G: Gene, F: FitnessValue>: Debug + Send + Sync {
    /// The mating pool of the next generation.
    fn parents(&self, context: &Context<'_, G, F>) -> Result<Vec<Individual<G, F>>>;

    /// Members carried into the next generation unchanged.
    fn survivors(&self, context: &Context<'_, G, F>) -> Result<Vec<Individual<G, F>>>;
}

/// Draws `n_sample` distinct members uniformly and returns the `n_best` best of
/// them, best first.
///
/// # Errors
///
/// `IllegalState` when `n_best > n_sample` or the population has fewer than
/// `n_sample` members.
pub fn best_among_random<G, F, P, R>(
    population: &P,
    n_best: usize,
    n_sample: usize,
    rng: &mut R,
) -> Result<Vec<Individual<G, F>>>
where
    G: Gene,
    F: FitnessValue,
    P: Population<G, F> + ?Sized,
    R: Rng + ?Sized,
{
    if n_best > n_sample {
        return Err(GeneticError::IllegalState(format!(
            "Cannot keep the {n_best} best of a sample of {n_sample}"
        )));
    }
    let mut sample = sample_indices(rng, population.len(), n_sample)?
        .into_iter()
        .map(|index| population.get(index))
        .collect::<Result<Vec<_>>>()?;

    let environment = population.environment();
    sample.sort_by(|a, b| environment.compare_inverse(a, b));
    Ok(sample.into_iter().take(n_best).cloned().collect())
}
