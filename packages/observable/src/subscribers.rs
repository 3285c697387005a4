use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::{Event, EventKind};

/// A callback invoked synchronously for each event of the kind it was subscribed to.
pub type Handler<E> = Rc<dyn Fn(&E)>;

/// Identifies one subscription so that it can be removed again.
///
/// Tokens are unique per collection for the lifetime of the collection.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SubscriptionToken(u64);

/// Fixed table of subscribers, one ordered list per [`EventKind`].
pub(crate) struct Subscribers<E> {
    slots: [Vec<(SubscriptionToken, Handler<E>)>; EventKind::COUNT],
    next_token: u64,
}

impl<E: Event> Subscribers<E> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Default::default(),
            next_token: 0,
        }
    }

    pub(crate) fn subscribe(&mut self, kind: EventKind, handler: Handler<E>) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token);
        self.next_token = self
            .next_token
            .checked_add(1)
            .expect("subscription tokens cannot realistically overflow u64");

        self.slot_mut(kind).push((token, handler));
        token
    }

    pub(crate) fn unsubscribe(&mut self, kind: EventKind, token: SubscriptionToken) -> bool {
        let slot = self.slot_mut(kind);

        match slot.iter().position(|(candidate, _)| *candidate == token) {
            Some(position) => {
                slot.remove(position);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the handlers for the kind of `event`, in subscription order.
    ///
    /// The snapshot is taken so that handlers run without the table borrowed; they may subscribe,
    /// unsubscribe or mutate the collection that is dispatching to them.
    pub(crate) fn handlers_for(&self, event: &E) -> SmallVec<[Handler<E>; 4]> {
        self.slot(event.kind())
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "the table has exactly one slot per EventKind"
    )]
    fn slot(&self, kind: EventKind) -> &Vec<(SubscriptionToken, Handler<E>)> {
        &self.slots[kind.slot()]
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "the table has exactly one slot per EventKind"
    )]
    fn slot_mut(&mut self, kind: EventKind) -> &mut Vec<(SubscriptionToken, Handler<E>)> {
        &mut self.slots[kind.slot()]
    }
}

impl<E> fmt::Debug for Subscribers<E> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = f.debug_map();

        for (kind, slot) in EventKind::ALL.iter().zip(&self.slots) {
            table.entry(kind, &slot.len());
        }

        table.finish()
    }
}

/// Runs every handler subscribed to the kind of `event`.
pub(crate) fn dispatch<E: Event>(subscribers: &RefCell<Subscribers<E>>, event: &E) {
    let handlers = subscribers.borrow().handlers_for(event);

    for handler in handlers {
        handler(event);
    }
}
