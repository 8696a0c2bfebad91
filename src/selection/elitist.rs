use crate::breeding::Context;
use crate::error::Result;
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::individual::Individual;
use crate::population::Population;
use crate::selection::selector::Selector;

/// Deterministic truncation selection: the top members by the environment's order.
///
/// Without an explicit count, parents are the whole population (best first) and
/// survivors are as many as the capacity hint allows.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct ElitistSelector {
    count: Option<usize>,
}

impl ElitistSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps exactly the `count` best members.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    fn top<G: Gene, F: FitnessValue>(
        population: &dyn Population<G, F>,
        count: usize,
    ) -> Vec<Individual<G, F>> {
        population.top_n(count).into_iter().cloned().collect()
    }
}

impl<G: Gene, F: FitnessValue> Selector<G, F> for ElitistSelector {
    fn parents(&self, context: &Context<'_, G, F>) -> Result<Vec<Individual<G, F>>> {
        let population = context.population();
        Ok(Self::top(population, self.count.unwrap_or(population.len())))
    }

    fn survivors(&self, context: &Context<'_, G, F>) -> Result<Vec<Individual<G, F>>> {
        let population = context.population();
        let count = match (self.count, population.capacity_hint()) {
            (Some(count), _) => count,
            (None, 0) => population.len(),
            (None, hint) => hint,
        };
        Ok(Self::top(population, count))
    }
}
