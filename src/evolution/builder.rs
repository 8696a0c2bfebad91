use std::sync::Arc;

use crate::breeding::{Generator, Mutator, Recombinator};
use crate::environment::Environment;
use crate::error::{GeneticError, Result};
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::population::Population;
use crate::selection::Selector;

use super::listener::BestListener;
use super::{Algorithm, EvolutionOptions, Generation, LogLevel, Termination};

type ListenerBox<G, F> = Box<dyn FnOnce(&mut Algorithm<G, F>) + Send>;

/// Assembles an [`Algorithm`]. Only the generation strategy is mandatory; the
/// environment and population can also be bound later on the algorithm itself.
pub struct AlgorithmBuilder<G: Gene, F: FitnessValue> {
    generation: Option<Box<dyn Generation<G, F>>>,
    environment: Option<Arc<Environment<G, F>>>,
    population: Option<Box<dyn Population<G, F>>>,
    generator: Option<Box<dyn Generator<G, F>>>,
    mutator: Option<Box<dyn Mutator<G, F>>>,
    recombinator: Option<Box<dyn Recombinator<G, F>>>,
    selector: Option<Box<dyn Selector<G, F>>>,
    terminations: Vec<Box<dyn Termination<G, F>>>,
    listeners: Vec<ListenerBox<G, F>>,
    options: EvolutionOptions,
}

impl<G: Gene, F: FitnessValue> AlgorithmBuilder<G, F> {
    pub fn new() -> Self {
        Self {
            generation: None,
            environment: None,
            population: None,
            generator: None,
            mutator: None,
            recombinator: None,
            selector: None,
            terminations: Vec::new(),
            listeners: Vec::new(),
            options: EvolutionOptions::default(),
        }
    }

    pub fn generation<S: Generation<G, F> + 'static>(mut self, generation: S) -> Self {
        self.generation = Some(Box::new(generation));
        self
    }

    pub fn environment(mut self, environment: Arc<Environment<G, F>>) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn population<P: Population<G, F> + 'static>(mut self, population: P) -> Self {
        self.population = Some(Box::new(population));
        self
    }

    pub fn generator<O: Generator<G, F> + 'static>(mut self, generator: O) -> Self {
        self.generator = Some(Box::new(generator));
        self
    }

    pub fn mutator<O: Mutator<G, F> + 'static>(mut self, mutator: O) -> Self {
        self.mutator = Some(Box::new(mutator));
        self
    }

    pub fn recombinator<O: Recombinator<G, F> + 'static>(mut self, recombinator: O) -> Self {
        self.recombinator = Some(Box::new(recombinator));
        self
    }

    pub fn selector<O: Selector<G, F> + 'static>(mut self, selector: O) -> Self {
        self.selector = Some(Box::new(selector));
        self
    }

    pub fn termination<T: Termination<G, F> + 'static>(mut self, termination: T) -> Self {
        self.terminations.push(Box::new(termination));
        self
    }

    pub fn listener<L: BestListener<G, F> + 'static>(mut self, listener: L) -> Self {
        self.listeners.push(Box::new(move |algorithm: &mut Algorithm<G, F>| {
            algorithm.subscribe(listener);
        }));
        self
    }

    pub fn options(mut self, options: EvolutionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.options.set_max_iterations(max_iterations);
        self
    }

    pub fn log_level(mut self, log_level: LogLevel) -> Self {
        self.options.set_log_level(log_level);
        self
    }

    pub fn build(self) -> Result<Algorithm<G, F>> {
        let generation = self.generation.ok_or_else(|| {
            GeneticError::Configuration("Generation strategy not specified".to_string())
        })?;

        let mut algorithm = Algorithm::from_parts(generation);
        if let Some(environment) = self.environment {
            algorithm.set_environment(environment)?;
        }
        if let Some(population) = self.population {
            algorithm.set_boxed_population(population)?;
        }
        algorithm.generator = self.generator;
        algorithm.mutator = self.mutator;
        algorithm.recombinator = self.recombinator;
        algorithm.selector = self.selector;
        algorithm.terminations = self.terminations;
        algorithm.set_options(self.options);
        for subscribe in self.listeners {
            subscribe(&mut algorithm);
        }
        Ok(algorithm)
    }
}

impl<G: Gene, F: FitnessValue> Default for AlgorithmBuilder<G, F> {
    fn default() -> Self {
        Self::new()
    }
}
