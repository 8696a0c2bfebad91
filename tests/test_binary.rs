use std::sync::Arc;

use populus::{
    breeding::{Context, OnePointCrossover, Recombinator, UniformCrossover},
    environment::{Environment, Mode},
    evolution::{Algorithm, EvolutionOptions, LogLevel, SimpleGa},
    individual::{IdSequence, Individual},
    population::{OrderedPopulation, Population, UnorderedPopulation},
    representation::binary::{self, BinaryGene, BinaryGenerator, BitFlipMutator},
    selection::{ElitistSelector, TournamentSelector},
};

type Bits = Individual<BinaryGene, u32>;

fn ones() -> Arc<Environment<BinaryGene, u32>> {
    Arc::new(Environment::from_fn(Mode::Maximize, |genes: &[BinaryGene]| {
        genes.iter().filter(|gene| gene.bit()).count() as u32
    }))
}

fn individual(ids: &IdSequence, pattern: &str) -> Bits {
    Individual::new(ids.next_id(), binary::parse(pattern).unwrap())
}

#[test]
fn test_midpoint_crossover_of_complements() {
    let ids = IdSequence::new();
    let environment = ones();
    let mut population = UnorderedPopulation::new(Arc::clone(&environment));
    population
        .add_all(vec![
            individual(&ids, "11110000"),
            individual(&ids, "00001111"),
            individual(&ids, "10101010"),
            individual(&ids, "01010101"),
        ])
        .unwrap();
    assert!(population.iter().all(|member| member.fitness() == Some(&4)));

    let parents = vec![
        population.get(0).unwrap().clone(),
        population.get(1).unwrap().clone(),
    ];
    let generator = BinaryGenerator::new(8).unwrap();
    let crossover = OnePointCrossover::new(1.0).unwrap().with_cut(4);
    let mut context =
        Context::new(&environment, &mut population, &ids).with_generator(Some(&generator));

    let children = crossover.recombine(&parents, &mut context).unwrap();
    let rendered: Vec<String> = children
        .iter()
        .map(|child| binary::render(child.genes()))
        .collect();
    assert_eq!(rendered, vec!["11111111", "00000000"]);
    assert!(children.iter().all(|child| !child.is_evaluated()));
    assert_eq!(context.population().len(), 4);
}

#[test]
fn test_decode_most_significant_first() {
    let genes = binary::parse("1011").unwrap();
    assert_eq!(binary::decode(&genes).unwrap(), 11);
    assert!(binary::parse("10x1").is_err());
}

#[test]
fn test_onemax_never_loses_its_best() {
    let environment = ones();
    let mut algorithm = Algorithm::builder()
        .generation(SimpleGa)
        .environment(Arc::clone(&environment))
        .population(OrderedPopulation::with_capacity(Arc::clone(&environment), 30))
        .generator(BinaryGenerator::new(24).unwrap())
        .mutator(BitFlipMutator::new(0.5).unwrap())
        .recombinator(UniformCrossover::new(0.9).unwrap())
        .selector(TournamentSelector::new(2, 4).unwrap())
        .options(EvolutionOptions::new(60, LogLevel::None))
        .build()
        .unwrap();

    algorithm.seed_population(30).unwrap();
    let initial = environment
        .best_of(algorithm.population().unwrap().iter())
        .and_then(|best| best.fitness().copied())
        .unwrap();

    let result = algorithm.run().unwrap();
    assert_eq!(result.iterations, 60);
    let best = *result.best_fitness().unwrap();
    assert!(best >= initial);
    assert!(best <= 24);
    assert_eq!(algorithm.population().unwrap().len(), 30);
}

#[test]
fn test_elitist_generation_keeps_top_fitness() {
    let ids = IdSequence::new();
    let environment = ones();
    let mut population = UnorderedPopulation::new(Arc::clone(&environment));
    population
        .add_all(vec![
            individual(&ids, "11111110"),
            individual(&ids, "11111100"),
            individual(&ids, "00000000"),
            individual(&ids, "00000001"),
        ])
        .unwrap();

    let mut algorithm = Algorithm::new(SimpleGa);
    algorithm.set_environment(Arc::clone(&environment)).unwrap();
    algorithm.set_population(population).unwrap();
    algorithm.set_generator(BinaryGenerator::new(8).unwrap());
    algorithm.set_mutator(BitFlipMutator::new(0.0).unwrap());
    algorithm.set_recombinator(OnePointCrossover::new(0.0).unwrap());
    algorithm.set_selector(ElitistSelector::new().with_count(2));
    algorithm.set_options(EvolutionOptions::new(3, LogLevel::None));

    let result = algorithm.run().unwrap();
    assert_eq!(result.best_fitness(), Some(&7));
    let population = algorithm.population().unwrap();
    assert_eq!(population.len(), 4);
    assert!(population.iter().all(|member| member.fitness() >= Some(&6)));
}
