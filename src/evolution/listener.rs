//! # Best-individual listeners
//!
//! Listeners are told synchronously, on the driver thread, every time the
//! algorithm records a new best-ever individual. They receive the previous best
//! (if any) and the new one.

use std::fmt;

use crate::fitness::FitnessValue;
use crate::gene::Gene;
use crate::individual::Individual;

pub trait BestListener<G: Gene, F: FitnessValue>: Send + Sync {
    fn new_best(&self, previous: Option<&Individual<G, F>>, current: &Individual<G, F>);
}

impl<G, F, Func> BestListener<G, F> for Func
where
    G: Gene,
    F: FitnessValue,
    Func: Fn(Option<&Individual<G, F>>, &Individual<G, F>) + Send + Sync,
{
    fn new_best(&self, previous: Option<&Individual<G, F>>, current: &Individual<G, F>) {
        self(previous, current)
    }
}

/// Handle returned by [`Listeners::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// The subscribed listeners of one algorithm, notified in subscription order.
pub struct Listeners<G: Gene, F: FitnessValue> {
    entries: Vec<(ListenerId, Box<dyn BestListener<G, F>>)>,
    next: u64,
}

impl<G: Gene, F: FitnessValue> Listeners<G, F> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next: 0,
        }
    }

    pub fn subscribe<L>(&mut self, listener: L) -> ListenerId
    where
        L: BestListener<G, F> + 'static,
    {
        let id = ListenerId(self.next);
        self.next += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was removed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn notify(&self, previous: Option<&Individual<G, F>>, current: &Individual<G, F>) {
        for (_, listener) in &self.entries {
            listener.new_best(previous, current);
        }
    }
}

impl<G: Gene, F: FitnessValue> Default for Listeners<G, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Gene, F: FitnessValue> fmt::Debug for Listeners<G, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("subscribed", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::individual::IdSequence;
    use crate::population::fixtures::{members, Member};
    use crate::representation::IntegerGene;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_subscribe_notify_unsubscribe() {
        let ids = IdSequence::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners: Listeners<IntegerGene, i64> = Listeners::new();

        let sink = Arc::clone(&seen);
        let first = listeners.subscribe(move |previous: Option<&Member>, current: &Member| {
            sink.lock()
                .unwrap()
                .push((previous.map(|p| p.id()), current.id()));
        });
        let counter = Arc::new(Mutex::new(0));
        let count = Arc::clone(&counter);
        listeners.subscribe(move |_: Option<&Member>, _: &Member| {
            *count.lock().unwrap() += 1;
        });
        assert_eq!(listeners.len(), 2);

        let pair = members(&ids, &[1, 2]);
        listeners.notify(None, &pair[0]);
        listeners.notify(Some(&pair[0]), &pair[1]);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(None, pair[0].id()), (Some(pair[0].id()), pair[1].id())]
        );

        assert!(listeners.unsubscribe(first));
        assert!(!listeners.unsubscribe(first));
        listeners.notify(None, &pair[1]);
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(*counter.lock().unwrap(), 3);
    }
}
