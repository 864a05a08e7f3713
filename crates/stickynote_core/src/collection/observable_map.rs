//! Insertion-ordered map that reports every structural mutation.
//!
//! # Responsibility
//! - Store keyed entries in insertion order.
//! - Fire one change hook per public mutator call.
//!
//! # Invariants
//! - Keys are unique; `set` on an existing key replaces in place and keeps
//!   the original insertion slot.
//! - `set`, `remove`, `clear` and `assign` each fire the hook exactly once,
//!   after the mutation completes. `remove` of an absent key still fires.
//! - The hook receives a read-only view, so it cannot mutate the map while
//!   being notified.
//!
//! Lookups are linear; collections are expected to hold a handful of notes.

use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;

/// Change hook signature. Reads current state through the given entries.
pub type ChangeHook<K, V> = Box<dyn FnMut(Entries<'_, K, V>)>;

/// Keyed, insertion-ordered collection with a mutation hook.
pub struct ObservableMap<K, V> {
    entries: Vec<(K, V)>,
    on_change: Option<ChangeHook<K, V>>,
}

impl<K: PartialEq, V> ObservableMap<K, V> {
    /// Creates an empty map that calls `on_change` after each mutation.
    pub fn new(on_change: impl FnMut(Entries<'_, K, V>) + 'static) -> Self {
        Self {
            entries: Vec::new(),
            on_change: Some(Box::new(on_change)),
        }
    }

    /// Creates an empty map with no change hook.
    pub fn unobserved() -> Self {
        Self {
            entries: Vec::new(),
            on_change: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.position(key).map(|index| &self.entries[index].1)
    }

    /// Mutable access to one entry. Does not notify; callers that change
    /// persisted state follow up with [`ObservableMap::notify`].
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.position(key)?;
        Some(&mut self.entries[index].1)
    }

    /// Inserts or replaces `key`, then notifies. Returns the replaced value.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let replaced = self.insert_silently(key, value);
        self.notify();
        replaced
    }

    /// Deletes `key`, then notifies even when nothing was removed.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = self.remove_silently(key);
        self.notify();
        removed
    }

    /// Deletes `key` without notifying; the next notifying call reports it.
    pub(crate) fn remove_silently(&mut self, key: &K) -> Option<V> {
        self.position(key).map(|index| self.entries.remove(index).1)
    }

    /// Removes every entry, then notifies once.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.notify();
    }

    /// Merges `pairs` in order without removing existing entries, then
    /// notifies once for the whole batch.
    pub fn assign<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in pairs {
            self.insert_silently(key, value);
        }
        self.notify();
    }

    /// Lazy view over `(key, value)` pairs in insertion order.
    pub fn entries(&self) -> Entries<'_, K, V> {
        Entries {
            inner: self.entries.iter(),
        }
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Mutable sweep over all values. Does not notify.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.entries.iter_mut().map(|(_, value)| value)
    }

    /// Fires the change hook without a structural mutation.
    pub fn notify(&mut self) {
        if let Some(hook) = self.on_change.as_mut() {
            hook(Entries {
                inner: self.entries.iter(),
            });
        }
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.entries.iter().position(|(existing, _)| existing == key)
    }

    fn insert_silently(&mut self, key: K, value: V) -> Option<V> {
        match self.position(&key) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }
}

impl<K: Debug, V: Debug> Debug for ObservableMap<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, value)| (key, value)))
            .finish()
    }
}

/// Restartable iterator over map entries; clone it to iterate again.
pub struct Entries<'a, K, V> {
    inner: std::slice::Iter<'a, (K, V)>,
}

impl<K, V> Clone for Entries<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Entries<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Entries<'_, K, V> {}

impl<K, V> FusedIterator for Entries<'_, K, V> {}
