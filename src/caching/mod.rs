//! # Caching Module
//!
//! Genome-keyed fitness caches. Environments already memoize the grade of each
//! individual; these wrappers go one step further and remember the grade of a
//! genome, so distinct individuals carrying equal genes (clones, re-discovered
//! solutions, unchanged offspring) are scored once.
//!
//! - [`CachedChallenge`] shares one map between all threads behind a mutex.
//! - [`ThreadLocalCachedChallenge`] gives every rayon worker its own map and
//!   never contends.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use populus::caching::CachingChallenge;
//! use populus::environment::{Environment, Mode};
//! use populus::evolution::FnChallenge;
//! use populus::representation::IntegerGene;
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&calls);
//! let challenge = FnChallenge(move |genes: &[IntegerGene]| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//!     genes.iter().map(|g| g.value()).sum::<i64>()
//! })
//! .cached();
//!
//! let environment: Environment<IntegerGene, i64> = Environment::new(challenge, Mode::Maximize);
//! let genes = vec![IntegerGene::new(2), IntegerGene::new(3)];
//! assert_eq!(environment.score(&genes).unwrap(), 5);
//! assert_eq!(environment.score(&genes).unwrap(), 5);
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thread_local::ThreadLocal;

use crate::evolution::Challenge;
use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::representation::{BinaryGene, IntegerGene, PermutationGene, RealGene};

/// A gene that can take part in a genome cache key.
///
/// Genes with equal keys must be graded identically by the cached challenge.
pub trait CacheKey: Gene {
    type Key: Eq + Hash + Clone + Debug + Send + Sync;

    fn cache_key(&self) -> Self::Key;
}

impl CacheKey for BinaryGene {
    type Key = bool;

    fn cache_key(&self) -> bool {
        self.bit()
    }
}

impl CacheKey for IntegerGene {
    type Key = i64;

    fn cache_key(&self) -> i64 {
        self.value()
    }
}

impl CacheKey for PermutationGene {
    type Key = i64;

    fn cache_key(&self) -> i64 {
        self.value()
    }
}

/// Keyed by bit pattern: `0.0` and `-0.0` are distinct entries.
impl CacheKey for RealGene {
    type Key = u64;

    fn cache_key(&self) -> u64 {
        self.value().to_bits()
    }
}

/// The cache key of a whole genome.
pub fn genome_key<G: CacheKey>(genes: &[G]) -> Vec<G::Key> {
    genes.iter().map(CacheKey::cache_key).collect()
}

type GenomeCache<G, F> = HashMap<Vec<<G as CacheKey>::Key>, F>;

/// Wraps a challenge with a cache shared by every thread.
///
/// Clones share the cache.
pub struct CachedChallenge<G: CacheKey, F: FitnessValue, C: Challenge<G, F>> {
    challenge: C,
    cache: Arc<Mutex<GenomeCache<G, F>>>,
    _marker: PhantomData<fn(&[G]) -> F>,
}

impl<G, F, C> CachedChallenge<G, F, C>
where
    G: CacheKey,
    F: FitnessValue,
    C: Challenge<G, F>,
{
    pub fn new(challenge: C) -> Self {
        Self::with_cache(challenge, HashMap::new())
    }

    /// Starts from previously computed grades.
    pub fn with_cache(challenge: C, cache: GenomeCache<G, F>) -> Self {
        Self {
            challenge,
            cache: Arc::new(Mutex::new(cache)),
            _marker: PhantomData,
        }
    }

    pub fn inner(&self) -> &C {
        &self.challenge
    }

    pub fn cache_size(&self) -> usize {
        self.lock().len()
    }

    pub fn clear_cache(&self) {
        self.lock().clear();
    }

    /// Returns a copy of the cache.
    pub fn snapshot(&self) -> GenomeCache<G, F> {
        self.lock().clone()
    }

    // Poisoning is ignored: entries are inserted whole.
    fn lock(&self) -> MutexGuard<'_, GenomeCache<G, F>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<G, F, C> Challenge<G, F> for CachedChallenge<G, F, C>
where
    G: CacheKey,
    F: FitnessValue,
    C: Challenge<G, F>,
{
    fn score(&self, genes: &[G]) -> F {
        let key = genome_key(genes);
        if let Some(fitness) = self.lock().get(&key) {
            return fitness.clone();
        }
        let fitness = self.challenge.score(genes);
        self.lock().insert(key, fitness.clone());
        fitness
    }
}

impl<G, F, C> Clone for CachedChallenge<G, F, C>
where
    G: CacheKey,
    F: FitnessValue,
    C: Challenge<G, F> + Clone,
{
    fn clone(&self) -> Self {
        Self {
            challenge: self.challenge.clone(),
            cache: Arc::clone(&self.cache),
            _marker: PhantomData,
        }
    }
}

impl<G, F, C> Debug for CachedChallenge<G, F, C>
where
    G: CacheKey,
    F: FitnessValue,
    C: Challenge<G, F>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedChallenge")
            .field("cached", &self.cache_size())
            .finish()
    }
}

/// Wraps a challenge with one cache per thread.
///
/// Size queries and clearing apply to the calling thread's cache only.
pub struct ThreadLocalCachedChallenge<G: CacheKey, F: FitnessValue, C: Challenge<G, F>> {
    challenge: C,
    cache: Arc<ThreadLocal<RefCell<GenomeCache<G, F>>>>,
    _marker: PhantomData<fn(&[G]) -> F>,
}

impl<G, F, C> ThreadLocalCachedChallenge<G, F, C>
where
    G: CacheKey,
    F: FitnessValue,
    C: Challenge<G, F>,
{
    pub fn new(challenge: C) -> Self {
        Self {
            challenge,
            cache: Arc::new(ThreadLocal::new()),
            _marker: PhantomData,
        }
    }

    pub fn inner(&self) -> &C {
        &self.challenge
    }

    pub fn cache_size(&self) -> usize {
        self.cache.get().map_or(0, |cell| cell.borrow().len())
    }

    pub fn clear_cache(&self) {
        if let Some(cell) = self.cache.get() {
            cell.borrow_mut().clear();
        }
    }
}

impl<G, F, C> Challenge<G, F> for ThreadLocalCachedChallenge<G, F, C>
where
    G: CacheKey,
    F: FitnessValue,
    C: Challenge<G, F>,
{
    fn score(&self, genes: &[G]) -> F {
        let key = genome_key(genes);
        let cell = self.cache.get_or_default();
        if let Some(fitness) = cell.borrow().get(&key) {
            return fitness.clone();
        }
        // Not borrowed while scoring; the wrapped challenge may re-enter.
        let fitness = self.challenge.score(genes);
        cell.borrow_mut().insert(key, fitness.clone());
        fitness
    }
}

impl<G, F, C> Clone for ThreadLocalCachedChallenge<G, F, C>
where
    G: CacheKey,
    F: FitnessValue,
    C: Challenge<G, F> + Clone,
{
    fn clone(&self) -> Self {
        Self {
            challenge: self.challenge.clone(),
            cache: Arc::clone(&self.cache),
            _marker: PhantomData,
        }
    }
}

impl<G, F, C> Debug for ThreadLocalCachedChallenge<G, F, C>
where
    G: CacheKey,
    F: FitnessValue,
    C: Challenge<G, F>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadLocalCachedChallenge")
            .field("cached_on_this_thread", &self.cache_size())
            .finish()
    }
}

/// Adds the caching wrappers to every challenge.
pub trait CachingChallenge<G: CacheKey, F: FitnessValue>: Challenge<G, F> + Sized {
    fn cached(self) -> CachedChallenge<G, F, Self> {
        CachedChallenge::new(self)
    }

    fn thread_local_cached(self) -> ThreadLocalCachedChallenge<G, F, Self> {
        ThreadLocalCachedChallenge::new(self)
    }
}

impl<G, F, C> CachingChallenge<G, F> for C
where
    G: CacheKey,
    F: FitnessValue,
    C: Challenge<G, F>,
{
}
