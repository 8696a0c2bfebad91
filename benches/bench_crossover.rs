use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use populus::{
    breeding::crossover::{discrete, one_point, one_point_no_repeat},
    differential::recombination::exponential,
    representation::permutation::{pmx, PermutationGene},
};

fn permutation(len: usize, rng: &mut StdRng) -> Vec<PermutationGene> {
    let mut genes: Vec<PermutationGene> = (0..len as i64).map(PermutationGene::new).collect();
    genes.shuffle(rng);
    genes
}

fn bench_permutation_crossover(c: &mut Criterion) {
    let mut group = c.benchmark_group("permutation_crossover");
    let mut rng = StdRng::seed_from_u64(42);

    for len in [10, 100, 1000].iter() {
        let first = permutation(*len, &mut rng);
        let second = permutation(*len, &mut rng);
        let (start, end) = (len / 4, 3 * len / 4);

        group.bench_with_input(BenchmarkId::new("pmx", len), len, |b, _| {
            b.iter(|| pmx(black_box(&first), black_box(&second), start, end))
        });

        group.bench_with_input(BenchmarkId::new("one_point_no_repeat", len), len, |b, _| {
            b.iter(|| one_point_no_repeat(black_box(&first), black_box(&second), len / 2))
        });
    }

    group.finish();
}

fn bench_vector_crossover(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_crossover");
    let mut rng = StdRng::seed_from_u64(7);

    for len in [10, 100, 1000].iter() {
        let first: Vec<f64> = (0..*len).map(|i| i as f64).collect();
        let second: Vec<f64> = (0..*len).map(|i| -(i as f64)).collect();

        group.bench_with_input(BenchmarkId::new("one_point", len), len, |b, _| {
            b.iter(|| one_point(black_box(&first), black_box(&second), len / 2))
        });

        group.bench_with_input(BenchmarkId::new("discrete", len), len, |b, _| {
            b.iter(|| discrete(black_box(&first), black_box(&second), 0.5, &mut rng))
        });

        group.bench_with_input(BenchmarkId::new("exponential", len), len, |b, _| {
            b.iter(|| exponential(black_box(&first), black_box(&second), 0.9, &mut rng))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_permutation_crossover, bench_vector_crossover);
criterion_main!(benches);
