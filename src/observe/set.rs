// ============================================================================
// mantle-collections - ObservableSet
// A set decorator that publishes one notification per mutation
// ============================================================================
//
// The four set-algebra operations break the usual pattern on purpose: their
// notification is published BEFORE the mutation, carries the other operand
// instead of per-element deltas, and omits the UPDATED bit. The exact
// elements affected are not computable without re-deriving the algebra, so
// the contract for these events is "about to apply", not "applied".
// ============================================================================

use bitflags::bitflags;

use crate::channel::{Channel, Subscription};
use crate::core::contract::SetStore;
use crate::core::error::CollectionError;

use super::SourceId;

// =============================================================================
// EVENTS
// =============================================================================

bitflags! {
    /// Event kinds carried by a [`SetNotification`].
    ///
    /// Element-wise events carry `UPDATED` plus their specific bit. The
    /// four algebra events carry only their own bit: they describe a
    /// pending mutation, not a completed one.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SetEvent: u32 {
        /// The set changed.
        const UPDATED = 1 << 0;
        /// An element was added.
        const ADDED = 1 << 1;
        /// An element was removed.
        const REMOVED = 1 << 2;
        /// The set is about to remove every element of the operand.
        const EXCEPT_WITH = 1 << 3;
        /// The set is about to intersect with the operand.
        const INTERSECT_WITH = 1 << 4;
        /// The set is about to absorb every element of the operand.
        const UNION_WITH = 1 << 5;
        /// The set is about to toggle every element of the operand.
        const SYMMETRIC_EXCEPT_WITH = 1 << 6;
        /// The whole set was cleared.
        const CLEARED = 1 << 7;
    }
}

// =============================================================================
// NOTIFICATION
// =============================================================================

/// One completed (or, for set algebra, pending) set mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetNotification<T> {
    /// What happened, or is about to happen.
    pub event: SetEvent,
    /// Which decorator instance published this.
    pub source: SourceId,
    /// The affected element, for element-wise operations.
    pub item: Option<T>,
    /// The other operand, for set-algebra operations.
    pub other: Option<Vec<T>>,
}

// =============================================================================
// OBSERVABLE SET
// =============================================================================

/// A set decorator: performs every mutation on the wrapped store and
/// synchronously publishes a [`SetNotification`].
///
/// `ObservableSet` is itself a [`SetStore`], so it can wrap (or be wrapped
/// by) any other decorator over the same contract.
///
/// # Example
///
/// ```
/// use mantle_collections::{ObservableSet, SetEvent, SetStore};
/// use std::cell::RefCell;
/// use std::collections::HashSet;
/// use std::rc::Rc;
///
/// let mut set = ObservableSet::new(HashSet::new());
/// let log = Rc::new(RefCell::new(Vec::new()));
///
/// let _sub = set.subscribe({
///     let log = log.clone();
///     move |note| log.borrow_mut().push(note.clone())
/// });
///
/// set.insert(1);
/// set.insert(1); // no-op, no notification
/// set.union_with(&[1, 2]);
///
/// let log = log.borrow();
/// assert_eq!(log.len(), 2);
/// assert_eq!(log[0].event, SetEvent::UPDATED | SetEvent::ADDED);
/// assert_eq!(log[1].event, SetEvent::UNION_WITH); // no UPDATED bit
/// assert_eq!(log[1].other, Some(vec![1, 2]));
/// ```
pub struct ObservableSet<S: SetStore> {
    store: S,
    channel: Channel<SetNotification<S::Item>>,
    id: SourceId,
    public_wrapped: bool,
}

impl<S: SetStore> ObservableSet<S> {
    /// Wrap `store`, keeping it private (`unwrap` will fail).
    pub fn new(store: S) -> Self {
        Self::with_public_wrapped(store, false)
    }

    /// Wrap `store`; `public_wrapped` decides whether [`Self::unwrap`] may
    /// hand the backing store back out.
    pub fn with_public_wrapped(store: S, public_wrapped: bool) -> Self {
        Self {
            store,
            channel: Channel::new(),
            id: SourceId::next(),
            public_wrapped,
        }
    }

    /// Register an observer for this set's notifications.
    pub fn subscribe<F>(&self, observer: F) -> Subscription<SetNotification<S::Item>>
    where
        F: Fn(&SetNotification<S::Item>) + 'static,
    {
        self.channel.subscribe(observer)
    }

    /// True when at least one observer is registered.
    pub fn has_observers(&self) -> bool {
        self.channel.has_observers()
    }

    /// The identity carried in this set's notifications.
    pub fn source_id(&self) -> SourceId {
        self.id
    }

    /// Borrow the backing store, failing with
    /// [`CollectionError::InvalidState`] unless the set was constructed
    /// with `public_wrapped = true`.
    pub fn unwrap(&self) -> Result<&S, CollectionError> {
        if self.public_wrapped {
            Ok(&self.store)
        } else {
            Err(CollectionError::InvalidState)
        }
    }

    /// Mutable variant of [`Self::unwrap`], same gating. Mutations applied
    /// through this reference are not observed.
    pub fn unwrap_mut(&mut self) -> Result<&mut S, CollectionError> {
        if self.public_wrapped {
            Ok(&mut self.store)
        } else {
            Err(CollectionError::InvalidState)
        }
    }

    /// Publish a pending-algebra notification, cloning the operand only
    /// when somebody listens.
    fn publish_algebra(&self, event: SetEvent, other: &[S::Item])
    where
        S::Item: Clone,
    {
        if self.channel.has_observers() {
            self.channel.publish(&SetNotification {
                event,
                source: self.id,
                item: None,
                other: Some(other.to_vec()),
            });
        }
    }
}

impl<S> SetStore for ObservableSet<S>
where
    S: SetStore,
    S::Item: Clone,
{
    type Item = S::Item;

    fn len(&self) -> usize {
        self.store.len()
    }

    fn contains(&self, item: &S::Item) -> bool {
        self.store.contains(item)
    }

    fn insert(&mut self, item: S::Item) -> bool {
        if !self.channel.has_observers() {
            return self.store.insert(item);
        }

        let note_item = item.clone();
        let added = self.store.insert(item);
        if added {
            self.channel.publish(&SetNotification {
                event: SetEvent::UPDATED | SetEvent::ADDED,
                source: self.id,
                item: Some(note_item),
                other: None,
            });
        }
        added
    }

    fn remove(&mut self, item: &S::Item) -> bool {
        let removed = self.store.remove(item);
        if removed && self.channel.has_observers() {
            self.channel.publish(&SetNotification {
                event: SetEvent::UPDATED | SetEvent::REMOVED,
                source: self.id,
                item: Some(item.clone()),
                other: None,
            });
        }
        removed
    }

    fn clear(&mut self) {
        self.store.clear();
        // Published even when the set was already empty.
        self.channel.publish(&SetNotification {
            event: SetEvent::UPDATED | SetEvent::CLEARED,
            source: self.id,
            item: None,
            other: None,
        });
    }

    fn union_with(&mut self, other: &[S::Item]) {
        self.publish_algebra(SetEvent::UNION_WITH, other);
        self.store.union_with(other);
    }

    fn intersect_with(&mut self, other: &[S::Item]) {
        self.publish_algebra(SetEvent::INTERSECT_WITH, other);
        self.store.intersect_with(other);
    }

    fn except_with(&mut self, other: &[S::Item]) {
        self.publish_algebra(SetEvent::EXCEPT_WITH, other);
        self.store.except_with(other);
    }

    fn symmetric_except_with(&mut self, other: &[S::Item]) {
        self.publish_algebra(SetEvent::SYMMETRIC_EXCEPT_WITH, other);
        self.store.symmetric_except_with(other);
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &S::Item> + '_> {
        self.store.iter()
    }
}

impl<S> std::fmt::Debug for ObservableSet<S>
where
    S: SetStore + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableSet")
            .field("store", &self.store)
            .field("observers", &self.channel.observer_count())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
