// ============================================================================
// mantle-collections - Decorator Collections for Rust
// ============================================================================
//
// Wrappers that add cross-cutting behavior to plain containers without
// touching their storage:
//
// - Observable decorators (map/list/set) publish exactly one notification
//   per mutating operation through a synchronous multicast channel.
// - KeyedList maintains a sequence and a key index as one atomic structure.
//
// Decorators are built on capability contracts (AssocStore, SeqStore,
// SetStore) and implement the contract they wrap, so they stack: an
// ObservableList around a KeyedList around a Vec is a single line.
//
// Everything here is single-threaded and synchronous. Notification delivery
// happens inline on the mutating call, before it returns; mutators take
// `&mut self`, so an observer callback can never re-enter the decorator it
// is observing.
// ============================================================================

pub mod channel;
pub mod core;
pub mod keyed;
pub mod observe;

// Re-export the whole surface at the crate root for ergonomic access
pub use channel::{Channel, Subscription};
pub use core::contract::{AssocStore, SeqStore, SetStore};
pub use core::error::CollectionError;
pub use keyed::KeyedList;
pub use observe::{
    ListEvent, ListNotification, MapEvent, MapNotification, ObservableList, ObservableMap,
    ObservableSet, SetEvent, SetNotification, SourceId,
};

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn observable_over_keyed_over_vec_stacks() {
        #[derive(Debug, Clone, PartialEq)]
        struct Entry(&'static str, i32);

        let keyed = KeyedList::new(Vec::new(), |entry: &Entry| entry.0).unwrap();
        let mut list = ObservableList::new(keyed);

        let log: Rc<RefCell<Vec<ListNotification<Entry>>>> = Rc::new(RefCell::new(Vec::new()));
        let _sub = list.subscribe({
            let log = log.clone();
            move |note| log.borrow_mut().push(note.clone())
        });

        list.push(Entry("a", 1)).unwrap();
        assert_eq!(
            list.push(Entry("a", 2)),
            Err(CollectionError::DuplicateKey)
        );

        // One successful mutation, one notification; the rejected push
        // surfaced the inner error and published nothing.
        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].event, ListEvent::UPDATED | ListEvent::ADDED);
        assert_eq!(list.len(), 1);
    }
}
