use std::sync::{Arc, Mutex, Once};

use populus::{
    breeding::OnePointCrossover,
    environment::{Environment, Mode},
    error::GeneticError,
    evolution::{
        Algorithm, AlgorithmState, CancellationToken, EvolutionOptions, LogLevel, SimpleGa,
        StagnationLimit,
    },
    individual::Individual,
    population::{Population, UnorderedPopulation},
    representation::integer::{IntegerGene, IntegerGenerator, RandomResetMutator},
    selection::{ElitistSelector, TournamentSelector},
};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

type Member = Individual<IntegerGene, i64>;

fn sum(mode: Mode) -> Arc<Environment<IntegerGene, i64>> {
    Arc::new(Environment::from_fn(mode, |genes: &[IntegerGene]| {
        genes.iter().map(|gene| gene.value()).sum()
    }))
}

fn configured(environment: &Arc<Environment<IntegerGene, i64>>) -> Algorithm<IntegerGene, i64> {
    Algorithm::builder()
        .generation(SimpleGa)
        .environment(Arc::clone(environment))
        .population(UnorderedPopulation::with_capacity(Arc::clone(environment), 16))
        .generator(IntegerGenerator::new(6, -10, 10).unwrap())
        .mutator(RandomResetMutator::new(0.4).unwrap())
        .recombinator(OnePointCrossover::new(0.8).unwrap())
        .selector(TournamentSelector::new(1, 3).unwrap())
        .build()
        .unwrap()
}

#[test]
fn test_zero_iterations_reports_initial_best() {
    init_tracing();
    let environment = sum(Mode::Maximize);
    let mut algorithm = configured(&environment);
    algorithm.set_options(EvolutionOptions::new(0, LogLevel::Verbose));
    algorithm.seed_population(16).unwrap();

    let expected = algorithm.population().unwrap().best().unwrap().id();
    let result = algorithm.run().unwrap();
    assert_eq!(result.iterations, 0);
    assert_eq!(result.stagnation, 0);
    assert_eq!(result.best.unwrap().id(), expected);
    assert_eq!(algorithm.state(), AlgorithmState::Finished);
}

#[test]
fn test_listeners_see_strictly_improving_bests() {
    init_tracing();
    let environment = sum(Mode::Maximize);
    let mut algorithm = configured(&environment);
    algorithm.set_options(EvolutionOptions::new(40, LogLevel::Minimal));
    algorithm.seed_population(16).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = algorithm.subscribe(move |previous: Option<&Member>, current: &Member| {
        let previous = previous.and_then(|p| p.fitness().copied());
        sink.lock().unwrap().push((previous, *current.fitness().unwrap()));
    });

    let result = algorithm.run().unwrap();
    let seen = seen.lock().unwrap().clone();
    assert!(!seen.is_empty());
    assert_eq!(seen[0].0, None);
    for window in seen.windows(2) {
        assert_eq!(window[1].0, Some(window[0].1));
        assert!(window[1].1 > window[0].1);
    }
    assert_eq!(seen.last().map(|entry| entry.1), result.best_fitness().copied());
    assert!(algorithm.unsubscribe(id));
}

#[test]
fn test_cancel_from_listener() {
    init_tracing();
    let environment = sum(Mode::Maximize);
    let mut algorithm = configured(&environment);
    algorithm.seed_population(16).unwrap();

    let token = CancellationToken::new();
    algorithm.add_termination(token.clone());
    let trigger = token.clone();
    algorithm.subscribe(move |_: Option<&Member>, _: &Member| trigger.cancel());

    let result = algorithm.run().unwrap();
    assert!(token.is_cancelled());
    assert_eq!(result.iterations, 0);
}

#[test]
fn test_stagnation_limit_on_converged_population() {
    init_tracing();
    let environment = sum(Mode::Minimize);
    let mut algorithm = Algorithm::new(SimpleGa);
    algorithm.set_environment(Arc::clone(&environment)).unwrap();
    algorithm
        .set_population(UnorderedPopulation::new(Arc::clone(&environment)))
        .unwrap();
    algorithm.set_generator(IntegerGenerator::new(3, 0, 1).unwrap());
    algorithm.set_mutator(RandomResetMutator::new(1.0).unwrap());
    algorithm.set_recombinator(OnePointCrossover::new(1.0).unwrap());
    algorithm.set_selector(ElitistSelector::new());
    algorithm.add_termination(StagnationLimit(4));
    algorithm.seed_population(6).unwrap();

    // Every gene is pinned to zero, so nothing can ever improve.
    let result = algorithm.run().unwrap();
    assert_eq!(result.iterations, 4);
    assert_eq!(result.stagnation, 4);
    assert_eq!(result.best_fitness(), Some(&0));
}

#[test]
fn test_switch_environment_between_runs() {
    init_tracing();
    let maximize = sum(Mode::Maximize);
    let mut algorithm = configured(&maximize);
    algorithm.set_options(EvolutionOptions::new(5, LogLevel::None));
    algorithm.seed_population(16).unwrap();
    algorithm.run().unwrap();

    let minimize = sum(Mode::Minimize);
    algorithm.switch_environment(Arc::clone(&minimize)).unwrap();
    let population = algorithm.population().unwrap();
    assert!(population
        .iter()
        .all(|member| member.is_evaluated_by(&minimize)));
    let lowest = population.best_fitness().unwrap();
    assert!(*algorithm.best_fitness().unwrap() <= lowest);

    let result = algorithm.run().unwrap();
    assert_eq!(result.iterations, 5);
    assert!(result.best.unwrap().is_evaluated_by(&minimize));
}

#[test]
fn test_configuration_errors() {
    let environment = sum(Mode::Maximize);
    let mut algorithm = configured(&environment);
    assert!(matches!(
        algorithm.set_environment(Arc::clone(&environment)),
        Err(GeneticError::Configuration(_))
    ));
    assert!(matches!(
        algorithm.set_population(UnorderedPopulation::new(Arc::clone(&environment))),
        Err(GeneticError::Configuration(_))
    ));
    assert!(matches!(
        Algorithm::<IntegerGene, i64>::builder().build(),
        Err(GeneticError::Configuration(_))
    ));
    assert!(matches!(
        TournamentSelector::new(3, 2),
        Err(GeneticError::Configuration(_))
    ));
    assert!(matches!(
        OnePointCrossover::new(1.5),
        Err(GeneticError::Configuration(_))
    ));
}
