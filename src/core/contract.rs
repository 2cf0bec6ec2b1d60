// ============================================================================
// mantle-collections - Base Container Contracts
// Capability traits that any backing store must satisfy
// ============================================================================
//
// Decorators in this crate never name a concrete container. Each one owns a
// value of a capability trait and is itself an implementation of the same
// trait, so decorators stack by plain composition: pass one decorator as the
// backing store of another.
//
// Fallible operations return CollectionError and decorators forward those
// results untouched.
// ============================================================================

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

use super::error::CollectionError;

// =============================================================================
// ASSOCIATIVE CONTRACT
// =============================================================================

/// The capability set of an associative (key/value) container.
pub trait AssocStore {
    /// The lookup key type.
    type Key;
    /// The stored value type.
    type Value;

    /// Number of entries.
    fn len(&self) -> usize;

    /// True when no entries are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the key is present.
    fn contains_key(&self, key: &Self::Key) -> bool;

    /// Borrow the value stored under `key`.
    fn get(&self, key: &Self::Key) -> Option<&Self::Value>;

    /// Insert a new entry, failing with [`CollectionError::DuplicateKey`]
    /// when the key is already present. The store is unchanged on failure.
    fn add(&mut self, key: Self::Key, value: Self::Value) -> Result<(), CollectionError>;

    /// Store `value` under `key`, inserting the key when absent and
    /// replacing the value when present.
    fn set(&mut self, key: Self::Key, value: Self::Value);

    /// Remove the entry under `key`. Returns whether a removal occurred.
    fn remove(&mut self, key: &Self::Key) -> bool;

    /// Remove every entry.
    fn clear(&mut self);

    /// Iterate over all entries in store order.
    fn iter(&self) -> Box<dyn Iterator<Item = (&Self::Key, &Self::Value)> + '_>;
}

// =============================================================================
// SEQUENCE CONTRACT
// =============================================================================

/// The capability set of a positional (indexed) container.
pub trait SeqStore {
    /// The element type.
    type Item;

    /// Number of elements.
    fn len(&self) -> usize;

    /// True when no elements are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the element at `index`.
    fn get(&self, index: usize) -> Option<&Self::Item>;

    /// Replace the element at `index`.
    fn set(&mut self, index: usize, item: Self::Item) -> Result<(), CollectionError>;

    /// Append an element at the end.
    fn push(&mut self, item: Self::Item) -> Result<(), CollectionError>;

    /// Insert an element at `index`, shifting later elements right.
    fn insert(&mut self, index: usize, item: Self::Item) -> Result<(), CollectionError>;

    /// Remove the element at `index`, shifting later elements left.
    fn remove_at(&mut self, index: usize) -> Result<(), CollectionError>;

    /// Remove the first element equal to `item`. Returns whether a removal
    /// occurred.
    fn remove_item(&mut self, item: &Self::Item) -> bool
    where
        Self::Item: PartialEq;

    /// Remove every element.
    fn clear(&mut self);

    /// Iterate over the elements front to back.
    fn iter(&self) -> Box<dyn Iterator<Item = &Self::Item> + '_>;
}

// =============================================================================
// SET CONTRACT
// =============================================================================

/// The capability set of a uniqueness-enforcing container with set algebra.
pub trait SetStore {
    /// The element type.
    type Item;

    /// Number of elements.
    fn len(&self) -> usize;

    /// True when no elements are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the element is present.
    fn contains(&self, item: &Self::Item) -> bool;

    /// Add an element. Returns whether the set changed.
    fn insert(&mut self, item: Self::Item) -> bool;

    /// Remove an element. Returns whether a removal occurred.
    fn remove(&mut self, item: &Self::Item) -> bool;

    /// Remove every element.
    fn clear(&mut self);

    /// Add every element of `other`.
    fn union_with(&mut self, other: &[Self::Item])
    where
        Self::Item: Clone;

    /// Keep only the elements also present in `other`.
    fn intersect_with(&mut self, other: &[Self::Item]);

    /// Remove every element present in `other`.
    fn except_with(&mut self, other: &[Self::Item]);

    /// For each element of `other`: remove it when present, add it when
    /// absent.
    fn symmetric_except_with(&mut self, other: &[Self::Item])
    where
        Self::Item: Clone;

    /// Iterate over the elements in store order.
    fn iter(&self) -> Box<dyn Iterator<Item = &Self::Item> + '_>;
}

// =============================================================================
// STD IMPLEMENTATIONS
// =============================================================================

impl<K, V> AssocStore for HashMap<K, V>
where
    K: Eq + Hash,
{
    type Key = K;
    type Value = V;

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn contains_key(&self, key: &K) -> bool {
        HashMap::contains_key(self, key)
    }

    fn get(&self, key: &K) -> Option<&V> {
        HashMap::get(self, key)
    }

    fn add(&mut self, key: K, value: V) -> Result<(), CollectionError> {
        match self.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => Err(CollectionError::DuplicateKey),
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }

    fn set(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn remove(&mut self, key: &K) -> bool {
        HashMap::remove(self, key).is_some()
    }

    fn clear(&mut self) {
        HashMap::clear(self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(HashMap::iter(self))
    }
}

impl<K, V> AssocStore for BTreeMap<K, V>
where
    K: Ord,
{
    type Key = K;
    type Value = V;

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn contains_key(&self, key: &K) -> bool {
        BTreeMap::contains_key(self, key)
    }

    fn get(&self, key: &K) -> Option<&V> {
        BTreeMap::get(self, key)
    }

    fn add(&mut self, key: K, value: V) -> Result<(), CollectionError> {
        match self.entry(key) {
            std::collections::btree_map::Entry::Occupied(_) => Err(CollectionError::DuplicateKey),
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }

    fn set(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn remove(&mut self, key: &K) -> bool {
        BTreeMap::remove(self, key).is_some()
    }

    fn clear(&mut self) {
        BTreeMap::clear(self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(BTreeMap::iter(self))
    }
}

impl<T> SeqStore for Vec<T> {
    type Item = T;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    fn set(&mut self, index: usize, item: T) -> Result<(), CollectionError> {
        let len = self.len();
        match self.get_mut(index) {
            Some(slot) => {
                *slot = item;
                Ok(())
            }
            None => Err(CollectionError::IndexOutOfBounds { index, len }),
        }
    }

    fn push(&mut self, item: T) -> Result<(), CollectionError> {
        Vec::push(self, item);
        Ok(())
    }

    fn insert(&mut self, index: usize, item: T) -> Result<(), CollectionError> {
        if index > self.len() {
            return Err(CollectionError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        Vec::insert(self, index, item);
        Ok(())
    }

    fn remove_at(&mut self, index: usize) -> Result<(), CollectionError> {
        if index >= self.len() {
            return Err(CollectionError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        Vec::remove(self, index);
        Ok(())
    }

    fn remove_item(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        match self.as_slice().iter().position(|candidate| candidate == item) {
            Some(index) => {
                Vec::remove(self, index);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        Vec::clear(self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.as_slice().iter())
    }
}

impl<T> SetStore for HashSet<T>
where
    T: Eq + Hash,
{
    type Item = T;

    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn contains(&self, item: &T) -> bool {
        HashSet::contains(self, item)
    }

    fn insert(&mut self, item: T) -> bool {
        HashSet::insert(self, item)
    }

    fn remove(&mut self, item: &T) -> bool {
        HashSet::remove(self, item)
    }

    fn clear(&mut self) {
        HashSet::clear(self)
    }

    fn union_with(&mut self, other: &[T])
    where
        T: Clone,
    {
        for item in other {
            if !self.contains(item) {
                HashSet::insert(self, item.clone());
            }
        }
    }

    fn intersect_with(&mut self, other: &[T]) {
        self.retain(|item| other.contains(item));
    }

    fn except_with(&mut self, other: &[T]) {
        for item in other {
            HashSet::remove(self, item);
        }
    }

    fn symmetric_except_with(&mut self, other: &[T])
    where
        T: Clone,
    {
        for item in other {
            if !HashSet::remove(self, item) {
                HashSet::insert(self, item.clone());
            }
        }
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(HashSet::iter(self))
    }
}

impl<T> SetStore for BTreeSet<T>
where
    T: Ord,
{
    type Item = T;

    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn contains(&self, item: &T) -> bool {
        BTreeSet::contains(self, item)
    }

    fn insert(&mut self, item: T) -> bool {
        BTreeSet::insert(self, item)
    }

    fn remove(&mut self, item: &T) -> bool {
        BTreeSet::remove(self, item)
    }

    fn clear(&mut self) {
        BTreeSet::clear(self)
    }

    fn union_with(&mut self, other: &[T])
    where
        T: Clone,
    {
        for item in other {
            if !self.contains(item) {
                BTreeSet::insert(self, item.clone());
            }
        }
    }

    fn intersect_with(&mut self, other: &[T]) {
        self.retain(|item| other.contains(item));
    }

    fn except_with(&mut self, other: &[T]) {
        for item in other {
            BTreeSet::remove(self, item);
        }
    }

    fn symmetric_except_with(&mut self, other: &[T])
    where
        T: Clone,
    {
        for item in other {
            if !BTreeSet::remove(self, item) {
                BTreeSet::insert(self, item.clone());
            }
        }
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(BTreeSet::iter(self))
    }
}

// =============================================================================
// TESTS
// =============================================================================
