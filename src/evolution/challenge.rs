use crate::fitness::FitnessValue;
use crate::gene::Gene;

/// The objective function an environment grades genomes with.
///
/// Implementations must be pure: the same genes always produce the same grade.
/// Environments memoize grades per individual and may call `score` concurrently
/// from several threads.
pub trait Challenge<G: Gene, F: FitnessValue>: Send + Sync {
    fn score(&self, genes: &[G]) -> F;
}

impl<G: Gene, F: FitnessValue> Challenge<G, F> for Box<dyn Challenge<G, F>> {
    fn score(&self, genes: &[G]) -> F {
        (**self).score(genes)
    }
}

/// Adapts a closure into a [`Challenge`].
pub struct FnChallenge<Func>(pub Func);

impl<G, F, Func> Challenge<G, F> for FnChallenge<Func>
where
    G: Gene,
    F: FitnessValue,
    Func: Fn(&[G]) -> F + Send + Sync,
{
    fn score(&self, genes: &[G]) -> F {
        (self.0)(genes)
    }
}
