// ============================================================================
// mantle-collections - Channel
// Single-threaded multicast publish/subscribe primitive
// ============================================================================
//
// The channel is the notification backbone of every observable decorator.
// Delivery is synchronous and inline on the publishing call: there is no
// buffering, no scheduling, no thread handoff. Observers are called in
// subscription order against a snapshot of the observer list taken at
// publish time, so cancelling (or subscribing) from inside a callback never
// affects the publish that is already in flight.
//
// Observer panics unwind through `publish` and skip the remaining
// observers of that delivery.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::trace;

// =============================================================================
// CHANNEL
// =============================================================================

type Observer<T> = Rc<dyn Fn(&T)>;

struct ChannelInner<T> {
    observers: RefCell<Vec<(u64, Observer<T>)>>,
    next_id: Cell<u64>,
}

/// A multicast channel: every published value is delivered, synchronously,
/// to every currently subscribed observer.
///
/// # Example
///
/// ```
/// use mantle_collections::channel::Channel;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let channel: Channel<i32> = Channel::new();
/// let seen: Rc<RefCell<Vec<i32>>> = Rc::new(RefCell::new(Vec::new()));
///
/// let sub = channel.subscribe({
///     let seen = seen.clone();
///     move |value| seen.borrow_mut().push(*value)
/// });
///
/// channel.publish(&1);
/// channel.publish(&2);
/// sub.cancel();
/// channel.publish(&3);
///
/// assert_eq!(*seen.borrow(), vec![1, 2]);
/// ```
pub struct Channel<T> {
    inner: Rc<ChannelInner<T>>,
}

impl<T> Channel<T> {
    /// Create a channel with no observers.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ChannelInner {
                observers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Register an observer. It stays registered until the returned
    /// [`Subscription`] is cancelled; dropping the handle without calling
    /// [`Subscription::cancel`] leaves the observer in place.
    pub fn subscribe<F>(&self, observer: F) -> Subscription<T>
    where
        F: Fn(&T) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .observers
            .borrow_mut()
            .push((id, Rc::new(observer)));
        trace!(id, "channel subscribe");

        Subscription {
            inner: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver `value` to every observer registered at the moment of the
    /// call, in subscription order.
    pub fn publish(&self, value: &T) {
        // Snapshot first so observer callbacks run without any RefCell
        // borrow held, and so cancellations during delivery don't affect
        // this publish.
        let snapshot: Vec<Observer<T>> = self
            .inner
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();

        trace!(observers = snapshot.len(), "channel publish");
        for observer in snapshot {
            observer(value);
        }
    }

    /// True when at least one observer is registered.
    pub fn has_observers(&self) -> bool {
        !self.inner.observers.borrow().is_empty()
    }

    /// Number of currently registered observers.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("observers", &self.observer_count())
            .finish()
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Handle to one registered observer.
///
/// Cancellation is explicit and immediate. The handle holds only a weak
/// reference to the channel, so it never keeps a dropped channel alive.
pub struct Subscription<T> {
    inner: Weak<ChannelInner<T>>,
    id: u64,
}

impl<T> Subscription<T> {
    /// Unregister the observer. Safe to call after the channel is gone.
    pub fn cancel(self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .observers
                .borrow_mut()
                .retain(|(id, _)| *id != self.id);
            trace!(id = self.id, "channel unsubscribe");
        }
    }

    /// True while the observer is still registered on a live channel.
    pub fn is_active(&self) -> bool {
        match self.inner.upgrade() {
            Some(inner) => inner.observers.borrow().iter().any(|(id, _)| *id == self.id),
            None => false,
        }
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[test]
    fn publish_without_observers_is_a_noop() {
        let channel: Channel<i32> = Channel::new();
        assert!(!channel.has_observers());
        channel.publish(&1); // nothing to deliver, nothing to panic
    }

    #[test]
    fn delivers_in_subscription_order() {
        let channel: Channel<&str> = Channel::new();
        let order: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

        let _a = channel.subscribe({
            let order = order.clone();
            move |value| order.borrow_mut().push(format!("a:{value}"))
        });
        let _b = channel.subscribe({
            let order = order.clone();
            move |value| order.borrow_mut().push(format!("b:{value}"))
        });

        channel.publish(&"x");
        assert_eq!(*order.borrow(), vec!["a:x".to_string(), "b:x".to_string()]);
    }

    #[test]
    fn cancel_stops_delivery() {
        let channel: Channel<i32> = Channel::new();
        let count = Rc::new(Cell::new(0));

        let sub = channel.subscribe({
            let count = count.clone();
            move |_| count.set(count.get() + 1)
        });

        channel.publish(&1);
        assert!(sub.is_active());
        sub.cancel();
        channel.publish(&2);

        assert_eq!(count.get(), 1);
        assert!(!channel.has_observers());
    }

    #[test]
    fn dropping_the_handle_keeps_the_observer() {
        let channel: Channel<i32> = Channel::new();
        let count = Rc::new(Cell::new(0));

        {
            let _sub = channel.subscribe({
                let count = count.clone();
                move |_| count.set(count.get() + 1)
            });
        } // handle dropped, no cancel

        channel.publish(&1);
        assert_eq!(count.get(), 1);
        assert_eq!(channel.observer_count(), 1);
    }

    #[test]
    fn cancel_during_delivery_does_not_affect_current_publish() {
        let channel: Rc<Channel<i32>> = Rc::new(Channel::new());
        let late_count = Rc::new(Cell::new(0));

        // First observer cancels the second one mid-delivery.
        let victim: Rc<RefCell<Option<Subscription<i32>>>> = Rc::new(RefCell::new(None));
        let _canceller = channel.subscribe({
            let victim = victim.clone();
            move |_| {
                if let Some(sub) = victim.borrow_mut().take() {
                    sub.cancel();
                }
            }
        });
        let sub = channel.subscribe({
            let late_count = late_count.clone();
            move |_| late_count.set(late_count.get() + 1)
        });
        *victim.borrow_mut() = Some(sub);

        // Snapshot semantics: the victim still receives this publish.
        channel.publish(&1);
        assert_eq!(late_count.get(), 1);

        // But not the next one.
        channel.publish(&2);
        assert_eq!(late_count.get(), 1);
        assert_eq!(channel.observer_count(), 1);
    }

    #[test]
    fn subscribe_during_delivery_misses_current_publish() {
        let channel: Rc<Channel<i32>> = Rc::new(Channel::new());
        let newcomer_count = Rc::new(Cell::new(0));

        let _sub = channel.subscribe({
            let channel = channel.clone();
            let newcomer_count = newcomer_count.clone();
            move |_| {
                let newcomer_count = newcomer_count.clone();
                // Leak the handle on purpose, the observer should stay.
                let sub = channel.subscribe(move |_| {
                    newcomer_count.set(newcomer_count.get() + 1);
                });
                std::mem::forget(sub);
            }
        });

        channel.publish(&1);
        assert_eq!(newcomer_count.get(), 0);

        channel.publish(&2);
        assert_eq!(newcomer_count.get(), 1);
    }

    #[test]
    fn cancel_after_channel_dropped_is_safe() {
        let sub = {
            let channel: Channel<i32> = Channel::new();
            channel.subscribe(|_| {})
        };
        assert!(!sub.is_active());
        sub.cancel();
    }
}
