//! # Evolution
//!
//! The generational driver. An [`Algorithm`] owns an environment, a population,
//! one slot per operator kind, and a [`Generation`] strategy. [`Algorithm::run`]
//! grades the initial population, records its best, and then repeats the
//! generation step until a stopping condition holds or the iteration cap is
//! reached. After each step it updates the best-ever individual and the stagnation
//! count, then ages every member.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use populus::breeding::OnePointCrossover;
//! use populus::environment::{Environment, Mode};
//! use populus::evolution::{Algorithm, SimpleGa};
//! use populus::population::UnorderedPopulation;
//! use populus::representation::binary::{BinaryGene, BinaryGenerator, BitFlipMutator};
//! use populus::selection::TournamentSelector;
//!
//! let environment = Arc::new(Environment::from_fn(Mode::Maximize, |genes: &[BinaryGene]| {
//!     genes.iter().filter(|g| g.bit()).count() as u32
//! }));
//!
//! let mut algorithm = Algorithm::builder()
//!     .generation(SimpleGa)
//!     .environment(Arc::clone(&environment))
//!     .population(UnorderedPopulation::new(Arc::clone(&environment)))
//!     .generator(BinaryGenerator::new(16).unwrap())
//!     .mutator(BitFlipMutator::new(0.2).unwrap())
//!     .recombinator(OnePointCrossover::new(0.9).unwrap())
//!     .selector(TournamentSelector::new(1, 3).unwrap())
//!     .max_iterations(30)
//!     .build()
//!     .unwrap();
//!
//! algorithm.seed_population(20).unwrap();
//! let result = algorithm.run().unwrap();
//! assert_eq!(result.iterations, 30);
//! assert!(result.best.is_some());
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use crate::breeding::{Context, Generator, Mutator, Probability, Recombinator};
use crate::environment::Environment;
use crate::error::{GeneticError, OptionExt, Result};
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::individual::{IdSequence, Individual};
use crate::population::{Population, PopulationStats};
use crate::selection::Selector;

pub mod builder;
pub mod challenge;
pub mod generation;
pub mod listener;
pub mod options;
pub mod termination;

pub use builder::AlgorithmBuilder;
pub use challenge::{Challenge, FnChallenge};
pub use generation::{DifferentialEvolution, Generation, SimpleGa};
pub use listener::{BestListener, ListenerId, Listeners};
pub use options::{EvolutionOptions, LogLevel};
pub use termination::{CancellationToken, FitnessTarget, Progress, StagnationLimit, Termination};

/// Lifecycle of an [`Algorithm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmState {
    /// Environment or population missing.
    Unconfigured,
    Ready,
    Running,
    Finished,
}

/// Outcome of [`Algorithm::run`].
#[derive(Debug, Clone)]
pub struct EvolutionResult<G: Gene, F: FitnessValue> {
    /// Best-ever individual; `None` only when the population was empty throughout.
    pub best: Option<Individual<G, F>>,
    pub iterations: u32,
    pub stagnation: u32,
    pub elapsed: Duration,
}

impl<G: Gene, F: FitnessValue> EvolutionResult<G, F> {
    pub fn best_fitness(&self) -> Option<&F> {
        self.best.as_ref().and_then(Individual::fitness)
    }
}

pub struct Algorithm<G: Gene, F: FitnessValue> {
    generation: Box<dyn Generation<G, F>>,
    environment: Option<Arc<Environment<G, F>>>,
    population: Option<Box<dyn Population<G, F>>>,
    generator: Option<Box<dyn Generator<G, F>>>,
    mutator: Option<Box<dyn Mutator<G, F>>>,
    recombinator: Option<Box<dyn Recombinator<G, F>>>,
    selector: Option<Box<dyn Selector<G, F>>>,
    terminations: Vec<Box<dyn Termination<G, F>>>,
    listeners: Listeners<G, F>,
    options: EvolutionOptions,
    ids: IdSequence,
    state: AlgorithmState,
    iteration: u32,
    stagnation: u32,
    best_ever: Option<Individual<G, F>>,
    elapsed: Duration,
}

impl<G: Gene, F: FitnessValue> Algorithm<G, F> {
    pub fn new<S>(generation: S) -> Self
    where
        S: Generation<G, F> + 'static,
    {
        Self::from_parts(Box::new(generation))
    }

    pub(crate) fn from_parts(generation: Box<dyn Generation<G, F>>) -> Self {
        Self {
            generation,
            environment: None,
            population: None,
            generator: None,
            mutator: None,
            recombinator: None,
            selector: None,
            terminations: Vec::new(),
            listeners: Listeners::new(),
            options: EvolutionOptions::default(),
            ids: IdSequence::new(),
            state: AlgorithmState::Unconfigured,
            iteration: 0,
            stagnation: 0,
            best_ever: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn builder() -> AlgorithmBuilder<G, F> {
        AlgorithmBuilder::new()
    }

    pub fn name(&self) -> &str {
        self.generation.name()
    }

    pub fn state(&self) -> AlgorithmState {
        self.state
    }

    /// Binds the environment. Use [`Algorithm::switch_environment`] to replace one.
    pub fn set_environment(&mut self, environment: Arc<Environment<G, F>>) -> Result<()> {
        if self.environment.is_some() {
            return Err(GeneticError::Configuration(
                "An environment is already set; use switch_environment to replace it"
                    .to_string(),
            ));
        }
        self.environment = Some(environment);
        self.refresh_state();
        Ok(())
    }

    /// Replaces the environment and regrades the population and the best-ever
    /// individual under it.
    pub fn switch_environment(&mut self, environment: Arc<Environment<G, F>>) -> Result<()> {
        if let Some(population) = self.population.as_deref_mut() {
            population.rebind(Arc::clone(&environment))?;
        }
        if let Some(best) = self.best_ever.as_mut() {
            environment.evaluate(best)?;
        }
        let replacement = match (self.population.as_deref(), self.best_ever.as_ref()) {
            (Some(population), Some(best)) => population
                .best()
                .filter(|candidate| environment.is_fitter(candidate, best))
                .cloned(),
            _ => None,
        };
        info!(environment = environment.id().value(), "Switched environment");
        self.environment = Some(environment);
        if let Some(candidate) = replacement {
            self.record_best(candidate);
        }
        self.refresh_state();
        Ok(())
    }

    pub fn environment(&self) -> Option<&Arc<Environment<G, F>>> {
        self.environment.as_ref()
    }

    /// Binds the population. Fails when one is already set.
    pub fn set_population<P>(&mut self, population: P) -> Result<()>
    where
        P: Population<G, F> + 'static,
    {
        self.set_boxed_population(Box::new(population))
    }

    pub(crate) fn set_boxed_population(
        &mut self,
        population: Box<dyn Population<G, F>>,
    ) -> Result<()> {
        if self.population.is_some() {
            return Err(GeneticError::Configuration(
                "A population is already set".to_string(),
            ));
        }
        self.population = Some(population);
        self.refresh_state();
        Ok(())
    }

    pub fn population(&self) -> Option<&dyn Population<G, F>> {
        self.population.as_deref()
    }

    pub fn population_mut(&mut self) -> Option<&mut (dyn Population<G, F> + 'static)> {
        self.population.as_deref_mut()
    }

    /// Fills the population with `n` random individuals from the generator.
    pub fn seed_population(&mut self, n: usize) -> Result<()> {
        let generator = self.generator.as_deref().ok_or_else_genetic(|| {
            GeneticError::IllegalState("No generator has been configured".to_string())
        })?;
        let individuals = generator.get_n_random(n, &self.ids);
        let population = self
            .population
            .as_deref_mut()
            .ok_or_else_genetic(missing_population)?;
        population.add_all(individuals)?;
        Ok(())
    }

    pub fn set_generator<O: Generator<G, F> + 'static>(&mut self, generator: O) {
        self.generator = Some(Box::new(generator));
    }

    pub fn set_mutator<O: Mutator<G, F> + 'static>(&mut self, mutator: O) {
        self.mutator = Some(Box::new(mutator));
    }

    pub fn set_recombinator<O: Recombinator<G, F> + 'static>(&mut self, recombinator: O) {
        self.recombinator = Some(Box::new(recombinator));
    }

    pub fn set_selector<O: Selector<G, F> + 'static>(&mut self, selector: O) {
        self.selector = Some(Box::new(selector));
    }

    pub fn generator(&self) -> Option<&dyn Generator<G, F>> {
        self.generator.as_deref()
    }

    pub fn mutator(&self) -> Option<&dyn Mutator<G, F>> {
        self.mutator.as_deref()
    }

    pub fn recombinator(&self) -> Option<&dyn Recombinator<G, F>> {
        self.recombinator.as_deref()
    }

    pub fn selector(&self) -> Option<&dyn Selector<G, F>> {
        self.selector.as_deref()
    }

    pub fn mutation_probability(&self) -> Option<Probability> {
        self.mutator.as_ref().map(|mutator| mutator.probability())
    }

    pub fn recombination_probability(&self) -> Option<Probability> {
        self.recombinator
            .as_ref()
            .map(|recombinator| recombinator.probability())
    }

    pub fn add_termination<T: Termination<G, F> + 'static>(&mut self, termination: T) {
        self.terminations.push(Box::new(termination));
    }

    /// Registers a listener for new best-ever individuals.
    pub fn subscribe<L: BestListener<G, F> + 'static>(&mut self, listener: L) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn options(&self) -> &EvolutionOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: EvolutionOptions) {
        self.options = options;
    }

    /// The id sequence individuals of this algorithm are numbered from.
    pub fn ids(&self) -> &IdSequence {
        &self.ids
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn stagnation(&self) -> u32 {
        self.stagnation
    }

    /// Wall-clock time of the last run.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn best(&self) -> Option<&Individual<G, F>> {
        self.best_ever.as_ref()
    }

    pub fn best_fitness(&self) -> Option<&F> {
        self.best_ever.as_ref().and_then(Individual::fitness)
    }

    pub fn statistics(&self) -> Option<PopulationStats> {
        self.population.as_deref().map(|population| population.statistics())
    }

    /// Runs the generational loop.
    ///
    /// Counters and the best-ever record start from scratch on every call; the
    /// population carries over.
    ///
    /// # Errors
    ///
    /// `IllegalState` without an environment or a population, or when the
    /// generation needs an operator that is not configured. Any operator or
    /// grading error aborts the run and is returned as is.
    #[instrument(skip(self), fields(algorithm = self.generation.name()))]
    pub fn run(&mut self) -> Result<EvolutionResult<G, F>> {
        let environment = self.environment.clone().ok_or_else_genetic(|| {
            GeneticError::IllegalState("No environment has been set".to_string())
        })?;
        self.population
            .as_deref_mut()
            .ok_or_else_genetic(missing_population)?
            .rebind(Arc::clone(&environment))?;

        self.state = AlgorithmState::Running;
        self.iteration = 0;
        self.stagnation = 0;
        self.best_ever = None;
        info!(
            max_iterations = self.options.max_iterations(),
            population = self.population.as_deref().map_or(0, |p| p.len()),
            "Starting evolution"
        );

        let started = Instant::now();
        let outcome = self.evolve(&environment, started);
        self.elapsed = started.elapsed();

        match outcome {
            Ok(()) => {
                self.state = AlgorithmState::Finished;
                info!(
                    iterations = self.iteration,
                    stagnation = self.stagnation,
                    elapsed_ms = self.elapsed.as_millis() as u64,
                    best = ?self.best_fitness(),
                    "Evolution finished"
                );
                Ok(EvolutionResult {
                    best: self.best_ever.clone(),
                    iterations: self.iteration,
                    stagnation: self.stagnation,
                    elapsed: self.elapsed,
                })
            }
            Err(error) => {
                self.state = AlgorithmState::Ready;
                warn!(iteration = self.iteration, %error, "Evolution aborted");
                Err(error)
            }
        }
    }

    fn evolve(&mut self, environment: &Environment<G, F>, started: Instant) -> Result<()> {
        let initial = self.population_ref()?.best().cloned();
        if let Some(best) = initial.clone() {
            self.record_best(best);
        }

        let mut previous = initial;
        while self.iteration < self.options.max_iterations()
            && !self.should_stop(environment, started.elapsed())
        {
            self.step(environment)?;
            self.iteration += 1;

            let current = self.population_ref()?.best().cloned();
            let improved = match (&previous, &current) {
                (Some(previous), Some(current)) => environment.is_fitter(current, previous),
                (None, Some(_)) => true,
                _ => false,
            };
            if improved {
                self.stagnation = 0;
                if let Some(current) = &current {
                    let record = self
                        .best_ever
                        .as_ref()
                        .map_or(true, |best| environment.is_fitter(current, best));
                    if record {
                        self.record_best(current.clone());
                    }
                }
            } else {
                self.stagnation = self.stagnation.saturating_add(1);
            }
            previous = current;

            if let Some(population) = self.population.as_deref_mut() {
                population.grow_older();
            }
            self.log_generation();
        }
        Ok(())
    }

    fn step(&mut self, environment: &Environment<G, F>) -> Result<()> {
        let Self {
            generation,
            population,
            generator,
            mutator,
            recombinator,
            selector,
            ids,
            ..
        } = self;
        let population = population.as_deref_mut().ok_or_else_genetic(missing_population)?;
        let mut context = Context::new(environment, population, ids)
            .with_generator(generator.as_deref())
            .with_mutator(mutator.as_deref())
            .with_recombinator(recombinator.as_deref())
            .with_selector(selector.as_deref());
        generation.step(&mut context)
    }

    fn should_stop(&self, environment: &Environment<G, F>, elapsed: Duration) -> bool {
        let progress = Progress {
            iteration: self.iteration,
            stagnation: self.stagnation,
            elapsed,
            best: self.best_ever.as_ref(),
            environment,
        };
        self.generation.should_stop(&progress)
            || self
                .terminations
                .iter()
                .any(|termination| termination.should_stop(&progress))
    }

    fn record_best(&mut self, best: Individual<G, F>) {
        let previous = self.best_ever.replace(best);
        if let Some(current) = self.best_ever.as_ref() {
            debug!(
                iteration = self.iteration,
                id = current.id().value(),
                fitness = ?current.fitness(),
                "New best individual"
            );
            self.listeners.notify(previous.as_ref(), current);
        }
    }

    fn log_generation(&self) {
        match self.options.log_level() {
            LogLevel::None => {}
            LogLevel::Minimal => info!(iteration = self.iteration, "Generation complete"),
            LogLevel::Verbose => {
                let population = self.population.as_deref();
                info!(
                    iteration = self.iteration,
                    best = ?population.and_then(|p| p.best_fitness()),
                    mean = ?population.and_then(|p| p.mean_fitness()),
                    stagnation = self.stagnation,
                    "Generation complete"
                );
            }
        }
    }

    fn population_ref(&self) -> Result<&dyn Population<G, F>> {
        self.population.as_deref().ok_or_else_genetic(missing_population)
    }

    fn refresh_state(&mut self) {
        if self.state == AlgorithmState::Unconfigured
            && self.environment.is_some()
            && self.population.is_some()
        {
            self.state = AlgorithmState::Ready;
        }
    }
}

fn missing_population() -> GeneticError {
    GeneticError::IllegalState("No population has been set".to_string())
}

impl<G: Gene, F: FitnessValue> fmt::Debug for Algorithm<G, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Algorithm")
            .field("name", &self.generation.name())
            .field("state", &self.state)
            .field("environment", &self.environment)
            .field("population", &self.population.as_ref().map(|p| p.len()))
            .field("iteration", &self.iteration)
            .field("stagnation", &self.stagnation)
            .field("best", &self.best_fitness())
            .field("listeners", &self.listeners)
            .finish()
    }
}
