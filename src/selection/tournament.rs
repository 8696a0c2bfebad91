use crate::breeding::Context;
use crate::error::{GeneticError, Result};
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::individual::Individual;
use crate::population::Population;
use crate::rng::ThreadLocalRng;
use crate::selection::selector::{best_among_random, Selector};

/// Tournament selection built on [`best_among_random`].
///
/// Each tournament samples `tournament_size` distinct members and lets the
/// `winners` best of them through. Tournaments repeat until the requested number
/// of individuals has been gathered; the same member may win several times.
///
/// Parents default to one pool the size of the population, survivors to the
/// population's capacity hint (or its size when the hint is zero).
///
/// ```rust
/// use populus::selection::TournamentSelector;
///
/// let selector = TournamentSelector::new(2, 5).unwrap().with_pool_size(10);
/// assert_eq!(selector.tournament_size(), 5);
/// assert!(TournamentSelector::new(6, 5).is_err());
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "TournamentFields"))]
#[derive(Debug, Clone)]
pub struct TournamentSelector {
    winners: usize,
    tournament_size: usize,
    pool_size: Option<usize>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct TournamentFields {
    winners: usize,
    tournament_size: usize,
    pool_size: Option<usize>,
}

#[cfg(feature = "serde")]
impl TryFrom<TournamentFields> for TournamentSelector {
    type Error = GeneticError;

    fn try_from(fields: TournamentFields) -> Result<Self> {
        let selector = Self::new(fields.winners, fields.tournament_size)?;
        Ok(match fields.pool_size {
            Some(pool_size) => selector.with_pool_size(pool_size),
            None => selector,
        })
    }
}

impl TournamentSelector {
    pub fn new(winners: usize, tournament_size: usize) -> Result<Self> {
        if winners == 0 {
            return Err(GeneticError::Configuration(
                "A tournament must have at least one winner".to_string(),
            ));
        }
        if winners > tournament_size {
            return Err(GeneticError::Configuration(format!(
                "{winners} winners do not fit a tournament of {tournament_size}"
            )));
        }
        Ok(Self {
            winners,
            tournament_size,
            pool_size: None,
        })
    }

    /// Fixes the number of parents per generation.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = Some(pool_size);
        self
    }

    pub fn winners(&self) -> usize {
        self.winners
    }

    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }

    fn gather<G: Gene, F: FitnessValue>(
        &self,
        population: &dyn Population<G, F>,
        count: usize,
    ) -> Result<Vec<Individual<G, F>>> {
        let mut rng = ThreadLocalRng::rng();
        let mut chosen = Vec::with_capacity(count);
        while chosen.len() < count {
            let winners =
                best_among_random(population, self.winners, self.tournament_size, &mut rng)?;
            let missing = count - chosen.len();
            chosen.extend(winners.into_iter().take(missing));
        }
        Ok(chosen)
    }
}

impl<G: Gene, F: FitnessValue> Selector<G, F> for TournamentSelector {
    fn parents(&self, context: &Context<'_, G, F>) -> Result<Vec<Individual<G, F>>> {
        let population = context.population();
        let count = self.pool_size.unwrap_or(population.len());
        self.gather(population, count)
    }

    fn survivors(&self, context: &Context<'_, G, F>) -> Result<Vec<Individual<G, F>>> {
        let population = context.population();
        let count = match population.capacity_hint() {
            0 => population.len(),
            hint => hint,
        };
        self.gather(population, count)
    }
}
