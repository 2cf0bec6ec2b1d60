// ============================================================================
// mantle-collections - ObservableMap
// An associative decorator that publishes one notification per mutation
// ============================================================================

use bitflags::bitflags;

use crate::channel::{Channel, Subscription};
use crate::core::contract::AssocStore;
use crate::core::error::CollectionError;

use super::SourceId;

// =============================================================================
// EVENTS
// =============================================================================

bitflags! {
    /// Event kinds carried by a [`MapNotification`].
    ///
    /// Every notification carries `UPDATED` plus the bit of the specific
    /// operation that produced it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MapEvent: u32 {
        /// The map changed.
        const UPDATED = 1 << 0;
        /// A new entry was added under a previously absent key.
        const ADDED = 1 << 1;
        /// An existing entry's value was replaced.
        const SET = 1 << 2;
        /// An entry was removed.
        const REMOVED = 1 << 3;
        /// The whole map was cleared.
        const CLEARED = 1 << 4;
    }
}

// =============================================================================
// NOTIFICATION
// =============================================================================

/// One completed map mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapNotification<K, V> {
    /// What happened.
    pub event: MapEvent,
    /// Which decorator instance published this.
    pub source: SourceId,
    /// The affected key. Absent for whole-map operations (`clear`).
    pub key: Option<K>,
    /// The value now stored under `key`. Absent for removals and `clear`.
    pub value: Option<V>,
    /// The value previously stored under `key`. Present for replacing
    /// `set` and for removals, and only when an observer was registered
    /// when the mutation started.
    pub old_value: Option<V>,
}

// =============================================================================
// OBSERVABLE MAP
// =============================================================================

/// An associative decorator: performs every mutation on the wrapped store,
/// then synchronously publishes a [`MapNotification`] describing it.
///
/// `ObservableMap` is itself an [`AssocStore`], so it can wrap (or be
/// wrapped by) any other decorator over the same contract.
///
/// # Example
///
/// ```
/// use mantle_collections::{AssocStore, MapEvent, ObservableMap};
/// use std::cell::RefCell;
/// use std::collections::HashMap;
/// use std::rc::Rc;
///
/// let mut map = ObservableMap::new(HashMap::new());
/// let log = Rc::new(RefCell::new(Vec::new()));
///
/// let _sub = map.subscribe({
///     let log = log.clone();
///     move |note| log.borrow_mut().push(note.clone())
/// });
///
/// map.set("x", 10);
/// map.set("x", 20);
///
/// let log = log.borrow();
/// assert_eq!(log[0].event, MapEvent::UPDATED | MapEvent::ADDED);
/// assert_eq!(log[1].event, MapEvent::UPDATED | MapEvent::SET);
/// assert_eq!(log[1].old_value, Some(10));
/// ```
pub struct ObservableMap<S: AssocStore> {
    store: S,
    channel: Channel<MapNotification<S::Key, S::Value>>,
    id: SourceId,
    public_wrapped: bool,
}

impl<S: AssocStore> ObservableMap<S> {
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

    /// Register an observer for this map's notifications.
    pub fn subscribe<F>(&self, observer: F) -> Subscription<MapNotification<S::Key, S::Value>>
    where
        F: Fn(&MapNotification<S::Key, S::Value>) + 'static,
    {
        self.channel.subscribe(observer)
    }

    /// True when at least one observer is registered.
    pub fn has_observers(&self) -> bool {
        self.channel.has_observers()
    }

    /// The identity carried in this map's notifications.
    pub fn source_id(&self) -> SourceId {
        self.id
    }

    /// Borrow the backing store, failing with
    /// [`CollectionError::InvalidState`] unless the map was constructed
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

impl<S> AssocStore for ObservableMap<S>
where
    S: AssocStore,
    S::Key: Clone,
    S::Value: Clone,
{
    type Key = S::Key;
    type Value = S::Value;

    fn len(&self) -> usize {
        self.store.len()
    }

    fn contains_key(&self, key: &S::Key) -> bool {
        self.store.contains_key(key)
    }

    fn get(&self, key: &S::Key) -> Option<&S::Value> {
        self.store.get(key)
    }

    fn add(&mut self, key: S::Key, value: S::Value) -> Result<(), CollectionError> {
        if !self.channel.has_observers() {
            return self.store.add(key, value);
        }

        let note_key = key.clone();
        let note_value = value.clone();
        self.store.add(key, value)?;
        self.channel.publish(&MapNotification {
            event: MapEvent::UPDATED | MapEvent::ADDED,
            source: self.id,
            key: Some(note_key),
            value: Some(note_value),
            old_value: None,
        });
        Ok(())
    }

    fn set(&mut self, key: S::Key, value: S::Value) {
        if !self.channel.has_observers() {
            self.store.set(key, value);
            return;
        }

        let old_value = self.store.get(&key).cloned();
        let event = if old_value.is_some() {
            MapEvent::UPDATED | MapEvent::SET
        } else {
            MapEvent::UPDATED | MapEvent::ADDED
        };
        let note_key = key.clone();
        let note_value = value.clone();
        self.store.set(key, value);
        self.channel.publish(&MapNotification {
            event,
            source: self.id,
            key: Some(note_key),
            value: Some(note_value),
            old_value,
        });
    }

    fn remove(&mut self, key: &S::Key) -> bool {
        let observed = self.channel.has_observers();
        let old_value = if observed {
            self.store.get(key).cloned()
        } else {
            None
        };

        let removed = self.store.remove(key);
        if removed && observed {
            self.channel.publish(&MapNotification {
                event: MapEvent::UPDATED | MapEvent::REMOVED,
                source: self.id,
                key: Some(key.clone()),
                value: None,
                old_value,
            });
        }
        removed
    }

    fn clear(&mut self) {
        self.store.clear();
        // Published even when the map was already empty.
        self.channel.publish(&MapNotification {
            event: MapEvent::UPDATED | MapEvent::CLEARED,
            source: self.id,
            key: None,
            value: None,
            old_value: None,
        });
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&S::Key, &S::Value)> + '_> {
        self.store.iter()
    }
}

impl<S> std::fmt::Debug for ObservableMap<S>
where
    S: AssocStore + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableMap")
            .field("store", &self.store)
            .field("observers", &self.channel.observer_count())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
