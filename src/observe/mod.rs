// ============================================================================
// mantle-collections - Observable Decorators
// Maps, lists and sets that publish one notification per mutation
// ============================================================================
//
// Each decorator wraps an owned backing store through its capability
// contract, re-implements that same contract, and publishes exactly one
// notification per successful mutating call through a Channel. Failed and
// no-op calls publish nothing.
//
// Old values are looked up only while at least one observer is registered:
// the pre-capture can cost as much as the mutation itself, so the common
// unobserved path never pays for it. The same guard skips cloning
// keys/values into notifications nobody would receive.
// ============================================================================

mod list;
mod map;
mod set;

use std::sync::atomic::{AtomicU64, Ordering};

pub use list::{ListEvent, ListNotification, ObservableList};
pub use map::{MapEvent, MapNotification, ObservableMap};
pub use set::{ObservableSet, SetEvent, SetNotification};

// =============================================================================
// SOURCE ID
// =============================================================================

/// Stable identity of one decorator instance, carried in every notification
/// it publishes.
///
/// Observers subscribed to several decorators use this to tell the emitters
/// apart; a notification cannot carry a borrow of the decorator itself,
/// which is exclusively borrowed for the duration of the mutating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u64);

impl SourceId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

// =============================================================================
// TESTS
// =============================================================================
