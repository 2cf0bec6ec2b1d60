// ============================================================================
// mantle-collections - ObservableList
// A sequence decorator that publishes one notification per mutation
// ============================================================================

use bitflags::bitflags;

use crate::channel::{Channel, Subscription};
use crate::core::contract::SeqStore;
use crate::core::error::CollectionError;

use super::SourceId;

// =============================================================================
// EVENTS
// =============================================================================

bitflags! {
    /// Event kinds carried by a [`ListNotification`].
    ///
    /// Every notification carries `UPDATED` plus the bit of the specific
    /// operation that produced it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ListEvent: u32 {
        /// The list changed.
        const UPDATED = 1 << 0;
        /// The element at an index was replaced.
        const SET = 1 << 1;
        /// An element was appended at the end.
        const ADDED = 1 << 2;
        /// An element was removed, by index or by value.
        const REMOVED = 1 << 3;
        /// The whole list was cleared.
        const CLEARED = 1 << 4;
        /// An element was inserted at an index.
        const INSERTED = 1 << 5;
    }
}

// =============================================================================
// NOTIFICATION
// =============================================================================

/// One completed list mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListNotification<T> {
    /// What happened.
    pub event: ListEvent,
    /// Which decorator instance published this.
    pub source: SourceId,
    /// The affected position. Absent for removal by value and for `clear`.
    pub index: Option<usize>,
    /// The element now stored at `index`. Absent for removals and `clear`.
    pub item: Option<T>,
    /// The element previously stored at `index`. Present for `set` and for
    /// removals, and only when an observer was registered when the
    /// mutation started.
    pub old_item: Option<T>,
}

// =============================================================================
// OBSERVABLE LIST
// =============================================================================

/// A sequence decorator: performs every mutation on the wrapped store, then
/// synchronously publishes a [`ListNotification`] describing it.
///
/// `ObservableList` is itself a [`SeqStore`], so it can wrap (or be wrapped
/// by) any other decorator over the same contract, including a
/// [`KeyedList`](crate::keyed::KeyedList).
///
/// # Example
///
/// ```
/// use mantle_collections::{ListEvent, ObservableList, SeqStore};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let mut list = ObservableList::new(Vec::new());
/// let log = Rc::new(RefCell::new(Vec::new()));
///
/// let _sub = list.subscribe({
///     let log = log.clone();
///     move |note| log.borrow_mut().push(note.clone())
/// });
///
/// list.push("a").unwrap();
/// list.set(0, "b").unwrap();
///
/// let log = log.borrow();
/// assert_eq!(log[0].event, ListEvent::UPDATED | ListEvent::ADDED);
/// assert_eq!(log[1].event, ListEvent::UPDATED | ListEvent::SET);
/// assert_eq!(log[1].old_item, Some("a"));
/// ```
pub struct ObservableList<S: SeqStore> {
    store: S,
    channel: Channel<ListNotification<S::Item>>,
    id: SourceId,
    public_wrapped: bool,
}

impl<S: SeqStore> ObservableList<S> {
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

    /// Register an observer for this list's notifications.
    pub fn subscribe<F>(&self, observer: F) -> Subscription<ListNotification<S::Item>>
    where
        F: Fn(&ListNotification<S::Item>) + 'static,
    {
        self.channel.subscribe(observer)
    }

    /// True when at least one observer is registered.
    pub fn has_observers(&self) -> bool {
        self.channel.has_observers()
    }

    /// The identity carried in this list's notifications.
    pub fn source_id(&self) -> SourceId {
        self.id
    }

    /// Borrow the backing store, failing with
    /// [`CollectionError::InvalidState`] unless the list was constructed
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
}

impl<S> SeqStore for ObservableList<S>
where
    S: SeqStore,
    S::Item: Clone,
{
    type Item = S::Item;

    fn len(&self) -> usize {
        self.store.len()
    }

    fn get(&self, index: usize) -> Option<&S::Item> {
        self.store.get(index)
    }

    fn set(&mut self, index: usize, item: S::Item) -> Result<(), CollectionError> {
        if !self.channel.has_observers() {
            return self.store.set(index, item);
        }

        let old_item = self.store.get(index).cloned();
        let note_item = item.clone();
        self.store.set(index, item)?;
        self.channel.publish(&ListNotification {
            event: ListEvent::UPDATED | ListEvent::SET,
            source: self.id,
            index: Some(index),
            item: Some(note_item),
            old_item,
        });
        Ok(())
    }

    fn push(&mut self, item: S::Item) -> Result<(), CollectionError> {
        if !self.channel.has_observers() {
            return self.store.push(item);
        }

        let note_item = item.clone();
        self.store.push(item)?;
        self.channel.publish(&ListNotification {
            event: ListEvent::UPDATED | ListEvent::ADDED,
            source: self.id,
            index: Some(self.store.len() - 1),
            item: Some(note_item),
            old_item: None,
        });
        Ok(())
    }

    fn insert(&mut self, index: usize, item: S::Item) -> Result<(), CollectionError> {
        if !self.channel.has_observers() {
            return self.store.insert(index, item);
        }

        let note_item = item.clone();
        self.store.insert(index, item)?;
        self.channel.publish(&ListNotification {
            event: ListEvent::UPDATED | ListEvent::INSERTED,
            source: self.id,
            index: Some(index),
            item: Some(note_item),
            old_item: None,
        });
        Ok(())
    }

    fn remove_at(&mut self, index: usize) -> Result<(), CollectionError> {
        let observed = self.channel.has_observers();
        let old_item = if observed {
            self.store.get(index).cloned()
        } else {
            None
        };

        self.store.remove_at(index)?;
        if observed {
            self.channel.publish(&ListNotification {
                event: ListEvent::UPDATED | ListEvent::REMOVED,
                source: self.id,
                index: Some(index),
                item: None,
                old_item,
            });
        }
        Ok(())
    }

    fn remove_item(&mut self, item: &S::Item) -> bool
    where
        S::Item: PartialEq,
    {
        let removed = self.store.remove_item(item);
        if removed && self.channel.has_observers() {
            self.channel.publish(&ListNotification {
                event: ListEvent::UPDATED | ListEvent::REMOVED,
                source: self.id,
                index: None,
                item: None,
                old_item: Some(item.clone()),
            });
        }
        removed
    }

    fn clear(&mut self) {
        self.store.clear();
        // Published even when the list was already empty.
        self.channel.publish(&ListNotification {
            event: ListEvent::UPDATED | ListEvent::CLEARED,
            source: self.id,
            index: None,
            item: None,
            old_item: None,
        });
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &S::Item> + '_> {
        self.store.iter()
    }
}

impl<S> std::fmt::Debug for ObservableList<S>
where
    S: SeqStore + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableList")
            .field("store", &self.store)
            .field("observers", &self.channel.observer_count())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
