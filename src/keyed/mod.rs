// ============================================================================
// mantle-collections - KeyedList
// A sequence with a key index, kept in lock-step under every mutation
// ============================================================================
//
// The sequence and the index are one logically atomic structure: after any
// successful mutation, the index maps exactly the keys derived from the
// live sequence elements, and every key maps to the element it was derived
// from. Inserts go index-first so a duplicate key is rejected before the
// sequence is touched; removals go sequence-first so a miss never shrinks
// the index.
//
// Every structural mutation touches two data structures. Callers that need
// O(1) amortized appends without key-uniqueness checking should use the
// backing sequence directly.
// ============================================================================

use std::collections::HashMap;
use std::hash::Hash;

use tracing::warn;

use crate::core::contract::{AssocStore, SeqStore};
use crate::core::error::CollectionError;

// =============================================================================
// KEYED LIST
// =============================================================================

/// A sequence decorator that also maintains a key → element index, built
/// from a key-selector function fixed at construction.
///
/// `KeyedList` is itself a [`SeqStore`], so it can be placed under an
/// [`ObservableList`](crate::observe::ObservableList) or any other
/// sequence decorator.
///
/// # Example
///
/// ```
/// use mantle_collections::{CollectionError, KeyedList, SeqStore};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Entry(String, i32);
///
/// let mut list = KeyedList::new(Vec::new(), |entry: &Entry| entry.0.clone()).unwrap();
///
/// list.push(Entry("a".into(), 1)).unwrap();
/// list.push(Entry("b".into(), 2)).unwrap();
/// assert_eq!(list.by_key(&"b".into()), Ok(&Entry("b".into(), 2)));
///
/// // A colliding key is rejected and nothing changes.
/// assert_eq!(
///     list.push(Entry("a".into(), 3)),
///     Err(CollectionError::DuplicateKey)
/// );
/// assert_eq!(list.len(), 2);
///
/// assert!(list.remove_by_key(&"a".into()));
/// assert_eq!(list.len(), 1);
/// ```
pub struct KeyedList<S, I, F> {
    seq: S,
    index: I,
    select_key: F,
    public_wrapped: bool,
}

impl<S, K, F> KeyedList<S, HashMap<K, S::Item>, F>
where
    S: SeqStore,
    S::Item: Clone,
    K: Eq + Hash + Clone,
    F: Fn(&S::Item) -> K,
{
    /// Wrap `seq` with a fresh `HashMap` index, keeping the backing
    /// sequence private.
    ///
    /// Fails with [`CollectionError::DuplicateKey`] when two elements
    /// already in `seq` derive the same key.
    pub fn new(seq: S, select_key: F) -> Result<Self, CollectionError> {
        Self::with_index(seq, HashMap::new(), select_key, false)
    }
}

impl<S, I, F> KeyedList<S, I, F>
where
    S: SeqStore,
    S::Item: Clone,
    I: AssocStore<Value = S::Item>,
    I::Key: Clone,
    F: Fn(&S::Item) -> I::Key,
{
    /// Wrap `seq` using a caller-supplied associative structure as the
    /// index. A non-empty `index` is cleared before use; it is then rebuilt
    /// from the live contents of `seq`, failing with
    /// [`CollectionError::DuplicateKey`] when two elements derive the same
    /// key.
    pub fn with_index(
        seq: S,
        mut index: I,
        select_key: F,
        public_wrapped: bool,
    ) -> Result<Self, CollectionError> {
        if !index.is_empty() {
            index.clear();
        }
        for item in seq.iter() {
            index.add(select_key(item), item.clone())?;
        }
        Ok(Self {
            seq,
            index,
            select_key,
            public_wrapped,
        })
    }

    /// Look up an element by key, failing with
    /// [`CollectionError::KeyNotFound`] when the key is absent.
    pub fn by_key(&self, key: &I::Key) -> Result<&S::Item, CollectionError> {
        self.get_by_key(key).ok_or(CollectionError::KeyNotFound)
    }

    /// Look up an element by key.
    pub fn get_by_key(&self, key: &I::Key) -> Option<&S::Item> {
        self.index.get(key)
    }

    /// True when an element with this key is present.
    pub fn contains_key(&self, key: &I::Key) -> bool {
        self.index.contains_key(key)
    }

    /// Remove the element stored under `key` from both the index and the
    /// sequence. Returns whether both sides held it.
    ///
    /// When the two sides disagree (already a contract violation, normally
    /// caused by external mutation of a shared backing store), both
    /// removals are still attempted so the structure heals itself.
    pub fn remove_by_key(&mut self, key: &I::Key) -> bool
    where
        S::Item: PartialEq,
    {
        let value = self.index.get(key).cloned();
        let in_index = self.index.remove(key);
        let in_seq = match &value {
            Some(value) => self.seq.remove_item(value),
            None => false,
        };
        if in_index != in_seq {
            warn!("keyed list index and sequence disagreed on a key; removed from both");
        }
        in_index && in_seq
    }

    /// Borrow the backing sequence, failing with
    /// [`CollectionError::InvalidState`] unless the list was constructed
    /// with `public_wrapped = true`.
    pub fn unwrap(&self) -> Result<&S, CollectionError> {
        if self.public_wrapped {
            Ok(&self.seq)
        } else {
            Err(CollectionError::InvalidState)
        }
    }

    /// Mutable variant of [`Self::unwrap`], same gating. Mutations applied
    /// through this reference bypass the index and break the lock-step
    /// guarantee.
    pub fn unwrap_mut(&mut self) -> Result<&mut S, CollectionError> {
        if self.public_wrapped {
            Ok(&mut self.seq)
        } else {
            Err(CollectionError::InvalidState)
        }
    }
}

impl<S, I, F> SeqStore for KeyedList<S, I, F>
where
    S: SeqStore,
    S::Item: Clone,
    I: AssocStore<Value = S::Item>,
    I::Key: Clone + PartialEq,
    F: Fn(&S::Item) -> I::Key,
{
    type Item = S::Item;

    fn len(&self) -> usize {
        self.seq.len()
    }

    fn get(&self, index: usize) -> Option<&S::Item> {
        self.seq.get(index)
    }

    fn set(&mut self, index: usize, item: S::Item) -> Result<(), CollectionError> {
        let old = self
            .seq
            .get(index)
            .cloned()
            .ok_or(CollectionError::IndexOutOfBounds {
                index,
                len: self.seq.len(),
            })?;
        let old_key = (self.select_key)(&old);
        let new_key = (self.select_key)(&item);
        if new_key != old_key && self.index.contains_key(&new_key) {
            return Err(CollectionError::DuplicateKey);
        }

        self.seq.set(index, item.clone())?;
        self.index.remove(&old_key);
        self.index.set(new_key, item);
        Ok(())
    }

    fn push(&mut self, item: S::Item) -> Result<(), CollectionError> {
        // Index first: a duplicate key must leave the sequence untouched.
        let key = (self.select_key)(&item);
        self.index.add(key.clone(), item.clone())?;
        if let Err(err) = self.seq.push(item) {
            self.index.remove(&key);
            return Err(err);
        }
        Ok(())
    }

    fn insert(&mut self, index: usize, item: S::Item) -> Result<(), CollectionError> {
        let key = (self.select_key)(&item);
        self.index.add(key.clone(), item.clone())?;
        if let Err(err) = self.seq.insert(index, item) {
            self.index.remove(&key);
            return Err(err);
        }
        Ok(())
    }

    fn remove_at(&mut self, index: usize) -> Result<(), CollectionError> {
        let removed = self
            .seq
            .get(index)
            .cloned()
            .ok_or(CollectionError::IndexOutOfBounds {
                index,
                len: self.seq.len(),
            })?;
        self.seq.remove_at(index)?;
        self.index.remove(&(self.select_key)(&removed));
        Ok(())
    }

    fn remove_item(&mut self, item: &S::Item) -> bool
    where
        S::Item: PartialEq,
    {
        // Sequence first: a miss must not shrink the index.
        let removed = self.seq.remove_item(item);
        if removed {
            self.index.remove(&(self.select_key)(item));
        }
        removed
    }

    fn clear(&mut self) {
        self.index.clear();
        self.seq.clear();
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &S::Item> + '_> {
        self.seq.iter()
    }
}

impl<S, I, F> std::fmt::Debug for KeyedList<S, I, F>
where
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedList").field("seq", &self.seq).finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
