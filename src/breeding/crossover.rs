//! # Representation-independent crossovers
//!
//! The free functions work on plain gene slices and take the random source as an
//! argument; the operator structs wrap them as [`Recombinator`]s that build children
//! through the generator skeleton.
//!
//! ```rust
//! use populus::breeding::crossover::one_point;
//!
//! let (left, right) = one_point(&[1, 1, 1, 1], &[0, 0, 0, 0], 1).unwrap();
//! assert_eq!(left, vec![1, 0, 0, 0]);
//! assert_eq!(right, vec![0, 1, 1, 1]);
//! ```

use rand::Rng;

use crate::breeding::{parent_pair, Context, Probability, Recombinator};
use crate::error::{GeneticError, Result};
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::individual::Individual;
use crate::rng::{bernoulli, ThreadLocalRng};

fn check_lengths<T>(first: &[T], second: &[T]) -> Result<usize> {
    if first.len() != second.len() {
        return Err(GeneticError::Recombination(format!(
            "Parents have different lengths: {} and {}",
            first.len(),
            second.len()
        )));
    }
    Ok(first.len())
}

fn check_cut(cut: usize, len: usize) -> Result<()> {
    if cut > len {
        return Err(GeneticError::IndexOutOfBounds { index: cut, len });
    }
    Ok(())
}

/// A cut index drawn uniformly from `0..len`.
pub fn random_cut<R>(rng: &mut R, len: usize) -> Result<usize>
where
    R: Rng + ?Sized,
{
    if len == 0 {
        return Err(GeneticError::Recombination(
            "Cannot cut an empty genome".to_string(),
        ));
    }
    Ok(rng.gen_range(0..len))
}

/// Classic one-point crossover: heads are kept, tails are swapped.
pub fn one_point<T: Clone>(first: &[T], second: &[T], cut: usize) -> Result<(Vec<T>, Vec<T>)> {
    let len = check_lengths(first, second)?;
    check_cut(cut, len)?;
    let left = first[..cut].iter().chain(&second[cut..]).cloned().collect();
    let right = second[..cut].iter().chain(&first[cut..]).cloned().collect();
    Ok((left, right))
}

/// One-point crossover that never repeats a value, for permutation genomes.
///
/// Each child keeps its own parent's head and fills the rest with the other
/// parent's values (read from the cut onwards, wrapping) that are not in the head.
pub fn one_point_no_repeat<T>(first: &[T], second: &[T], cut: usize) -> Result<(Vec<T>, Vec<T>)>
where
    T: Clone + PartialEq,
{
    let len = check_lengths(first, second)?;
    check_cut(cut, len)?;
    let fill = |own: &[T], other: &[T]| -> Result<Vec<T>> {
        let head = &own[..cut];
        let mut child: Vec<T> = head.to_vec();
        child.extend(
            other[cut..]
                .iter()
                .chain(&other[..cut])
                .filter(|value| !head.contains(value))
                .cloned(),
        );
        if child.len() != len {
            return Err(GeneticError::Recombination(
                "Parents are not permutations of the same values".to_string(),
            ));
        }
        Ok(child)
    };
    Ok((fill(first, second)?, fill(second, first)?))
}

/// Discrete recombination: each locus comes from `first` with probability `bias`,
/// otherwise from `second`.
pub fn discrete<T, R>(first: &[T], second: &[T], bias: f64, rng: &mut R) -> Result<Vec<T>>
where
    T: Clone,
    R: Rng + ?Sized,
{
    check_lengths(first, second)?;
    Ok(first
        .iter()
        .zip(second)
        .map(|(a, b)| if bernoulli(rng, bias) { a.clone() } else { b.clone() })
        .collect())
}

/// One-point crossover operator for any representation.
#[derive(Debug, Clone)]
pub struct OnePointCrossover {
    probability: Probability,
    cut: Option<usize>,
    no_repeat: bool,
}

impl OnePointCrossover {
    pub fn new(probability: f64) -> Result<Self> {
        Ok(Self {
            probability: Probability::new(probability)?,
            cut: None,
            no_repeat: false,
        })
    }

    /// Always cuts at `cut` instead of a random locus.
    pub fn with_cut(mut self, cut: usize) -> Self {
        self.cut = Some(cut);
        self
    }

    /// Switches to the value-preserving variant for permutations.
    pub fn without_repetition(mut self) -> Self {
        self.no_repeat = true;
        self
    }
}

impl<G: Gene, F: FitnessValue> Recombinator<G, F> for OnePointCrossover {
    fn probability(&self) -> Probability {
        self.probability
    }

    fn partners(&self) -> usize {
        2
    }

    fn recombine(
        &self,
        partners: &[Individual<G, F>],
        context: &mut Context<'_, G, F>,
    ) -> Result<Vec<Individual<G, F>>> {
        let (first, second) = parent_pair(partners)?;
        let cut = match self.cut {
            Some(cut) => cut,
            None => random_cut(&mut ThreadLocalRng::rng(), first.len())?,
        };
        let (left, right) = if self.no_repeat {
            one_point_no_repeat(first.genes(), second.genes(), cut)?
        } else {
            one_point(first.genes(), second.genes(), cut)?
        };
        Ok(vec![context.offspring(left)?, context.offspring(right)?])
    }
}

/// Uniform crossover: discrete recombination of two parents with a per-locus bias.
#[derive(Debug, Clone)]
pub struct UniformCrossover {
    probability: Probability,
    bias: Probability,
    children: usize,
}

impl UniformCrossover {
    /// Two children, each locus a fair coin between the parents.
    pub fn new(probability: f64) -> Result<Self> {
        Ok(Self {
            probability: Probability::new(probability)?,
            bias: Probability::new(0.5)?,
            children: 2,
        })
    }

    /// Probability that a locus is taken from the first parent.
    pub fn with_bias(mut self, bias: f64) -> Result<Self> {
        self.bias = Probability::new(bias)?;
        Ok(self)
    }

    pub fn with_children(mut self, children: usize) -> Result<Self> {
        if children == 0 {
            return Err(GeneticError::Configuration(
                "Uniform crossover must produce at least one child".to_string(),
            ));
        }
        self.children = children;
        Ok(self)
    }
}

impl<G: Gene, F: FitnessValue> Recombinator<G, F> for UniformCrossover {
    fn probability(&self) -> Probability {
        self.probability
    }

    fn partners(&self) -> usize {
        2
    }

    fn recombine(
        &self,
        partners: &[Individual<G, F>],
        context: &mut Context<'_, G, F>,
    ) -> Result<Vec<Individual<G, F>>> {
        let (first, second) = parent_pair(partners)?;
        let mut rng = ThreadLocalRng::rng();
        (0..self.children)
            .map(|_| {
                let genes = discrete(first.genes(), second.genes(), self.bias.value(), &mut rng)?;
                context.offspring(genes)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breeding::fixtures::{bits, generator, ones};
    use crate::individual::IdSequence;
    use crate::population::UnorderedPopulation;
    use crate::representation::binary::render;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn test_one_point_round_trip() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let len = rng.gen_range(1..20);
            let first: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let second: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let cut = random_cut(&mut rng, len).unwrap();

            let (left, right) = one_point(&first, &second, cut).unwrap();
            let (back_first, back_second) = one_point(&left, &right, cut).unwrap();
            assert_eq!(back_first, first);
            assert_eq!(back_second, second);
        }
    }

    #[test]
    fn test_one_point_rejects_bad_input() {
        assert!(one_point(&[1, 2], &[1], 0).is_err());
        assert!(one_point(&[1, 2], &[3, 4], 3).is_err());
        assert!(random_cut(&mut StdRng::seed_from_u64(0), 0).is_err());
    }

    #[test]
    fn test_one_point_no_repeat_keeps_permutations() {
        let first = [1, 2, 3, 4, 5, 6];
        let second = [6, 4, 2, 5, 3, 1];
        let (left, right) = one_point_no_repeat(&first, &second, 2).unwrap();
        assert_eq!(left, vec![1, 2, 5, 3, 6, 4]);
        assert_eq!(right, vec![6, 4, 3, 5, 1, 2]);

        for cut in 0..=first.len() {
            let (left, right) = one_point_no_repeat(&first, &second, cut).unwrap();
            for child in [left, right] {
                let mut sorted = child.clone();
                sorted.sort_unstable();
                assert_eq!(sorted, vec![1, 2, 3, 4, 5, 6]);
            }
        }
        assert!(one_point_no_repeat(&[1, 1, 2], &[1, 2, 3], 1).is_err());
    }

    #[test]
    fn test_discrete_extremes() {
        let mut rng = StdRng::seed_from_u64(9);
        let first = [1, 1, 1, 1];
        let second = [0, 0, 0, 0];
        assert_eq!(discrete(&first, &second, 1.0, &mut rng).unwrap(), first.to_vec());
        assert_eq!(discrete(&first, &second, 0.0, &mut rng).unwrap(), second.to_vec());
        let mixed = discrete(&first, &second, 0.5, &mut rng).unwrap();
        assert!(mixed.iter().all(|v| *v == 0 || *v == 1));
    }

    #[test]
    fn test_one_point_operator_builds_fresh_children() {
        let ids = IdSequence::new();
        let environment = ones();
        let mut population = UnorderedPopulation::new(Arc::clone(&environment));
        let generator = generator(8);
        let mut context = Context::new(&environment, &mut population, &ids)
            .with_generator(Some(&generator));

        let operator = OnePointCrossover::new(1.0).unwrap().with_cut(4);
        let parents = vec![bits(&ids, "11110000"), bits(&ids, "00001111")];
        let children = operator.recombine_all(&parents, &mut context).unwrap();

        let rendered: Vec<String> = children.iter().map(|c| render(c.genes())).collect();
        assert_eq!(rendered, vec!["11111111", "00000000"]);
        assert!(children.iter().all(|c| !c.is_evaluated()));
        assert!(children.iter().all(|c| parents.iter().all(|p| p.id() != c.id())));
    }

    #[test]
    fn test_uniform_operator_child_count() {
        let ids = IdSequence::new();
        let environment = ones();
        let mut population = UnorderedPopulation::new(Arc::clone(&environment));
        let generator = generator(6);
        let mut context = Context::new(&environment, &mut population, &ids)
            .with_generator(Some(&generator));

        let operator = UniformCrossover::new(1.0)
            .unwrap()
            .with_bias(1.0)
            .unwrap()
            .with_children(3)
            .unwrap();
        let parents = vec![bits(&ids, "101010"), bits(&ids, "010101")];
        let children = operator.recombine(&parents, &mut context).unwrap();
        assert_eq!(children.len(), 3);
        for child in &children {
            assert_eq!(child.genes(), parents[0].genes());
        }
        assert!(UniformCrossover::new(0.5).unwrap().with_children(0).is_err());
    }
}
