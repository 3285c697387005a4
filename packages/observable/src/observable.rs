use crate::{Event, EventKind, Handler, SubscriptionToken};

/// A collection that announces its mutations to subscribers.
///
/// This is the seam shared by [`ObservableList`][crate::ObservableList],
/// [`ObservableMap`][crate::ObservableMap] and [`ObservableSet`][crate::ObservableSet].
/// Consumers that only react to changes, such as a
/// [`SubscriptionRegistry`][crate::SubscriptionRegistry], depend on this trait alone.
///
/// Every mutating call of an implementation dispatches exactly one event, synchronously, to the
/// subscribers of that event's kind in the order in which they subscribed. The mutation is
/// complete before the first handler runs and handlers are free to mutate the collection again.
pub trait Observable {
    /// The event type dispatched to subscribers.
    type Event: Event;

    /// Calls `handler` for every future event of `kind`.
    fn subscribe(&self, kind: EventKind, handler: Handler<Self::Event>) -> SubscriptionToken;

    /// Removes a subscription. Returns `false` if `token` was not subscribed to `kind`.
    fn unsubscribe(&self, kind: EventKind, token: SubscriptionToken) -> bool;

    /// Total number of subscriptions across all event kinds.
    fn subscription_count(&self) -> usize;
}
