use foldhash::{HashMap, HashMapExt};
use tracing::debug;

use crate::{EventKind, Handler, Observable, SubscriptionToken};

/// Remembers which subscriptions a consumer holds on its sources, so that unbinding exactly
/// reverses binding.
///
/// Bindings are grouped under a slot name chosen by the consumer, typically one slot per source
/// it observes. Each slot holds a stack of `(EventKind, SubscriptionToken)` pairs: binding pushes
/// and unbinding pops, so subscriptions are removed in the reverse of the order they were made.
///
/// The registry does not keep the sources alive; the caller passes the same source again when
/// unbinding.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use observable::{ListEvent, Observable, ObservableList, SubscriptionRegistry};
///
/// let list = ObservableList::<u32>::new();
/// let mut registry = SubscriptionRegistry::new();
///
/// registry.bind_all("items", &list, |_kind| Rc::new(|_: &ListEvent<u32>| {}));
/// assert_eq!(list.subscription_count(), 6);
///
/// assert_eq!(registry.unbind_all("items", &list), 6);
/// assert_eq!(list.subscription_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    slots: HashMap<&'static str, Vec<(EventKind, SubscriptionToken)>>,
}

impl SubscriptionRegistry {
    /// Creates a registry with no bindings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Subscribes to every [`EventKind`] of `source`, in [`EventKind::ALL`] order, using the
    /// handler `handler_for_kind` returns for each kind.
    ///
    /// Binding a slot that is already bound adds to it; the source then calls both bindings.
    pub fn bind_all<O, F>(&mut self, slot: &'static str, source: &O, mut handler_for_kind: F)
    where
        O: Observable,
        F: FnMut(EventKind) -> Handler<O::Event>,
    {
        for kind in EventKind::ALL {
            self.bind(slot, source, kind, handler_for_kind(kind));
        }

        debug!(slot, "bound to every event kind");
    }

    /// Subscribes `handler` to events of `kind` from `source` and records the subscription under
    /// `slot`.
    pub fn bind<O>(
        &mut self,
        slot: &'static str,
        source: &O,
        kind: EventKind,
        handler: Handler<O::Event>,
    ) where
        O: Observable,
    {
        let token = source.subscribe(kind, handler);
        self.slots.entry(slot).or_default().push((kind, token));
    }

    /// Removes every subscription recorded under `slot` from `source`, most recent first.
    ///
    /// Returns the number of subscriptions that were removed. Unbinding a slot that is not bound
    /// does nothing.
    pub fn unbind_all<O>(&mut self, slot: &'static str, source: &O) -> usize
    where
        O: Observable,
    {
        let Some(mut tokens) = self.slots.remove(slot) else {
            return 0;
        };

        let mut removed: usize = 0;

        while let Some((kind, token)) = tokens.pop() {
            if source.unsubscribe(kind, token) {
                removed = removed
                    .checked_add(1)
                    .expect("cannot remove more subscriptions than fit in memory");
            }
        }

        debug!(slot, removed, "unbound");
        removed
    }

    /// Whether any subscription is recorded under `slot`.
    #[must_use]
    pub fn is_bound(&self, slot: &str) -> bool {
        self.slots.get(slot).is_some_and(|tokens| !tokens.is_empty())
    }

    /// Number of subscriptions recorded under `slot`.
    #[must_use]
    pub fn token_count(&self, slot: &str) -> usize {
        self.slots.get(slot).map_or(0, Vec::len)
    }

    /// Number of bound slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
