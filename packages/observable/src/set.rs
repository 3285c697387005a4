use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

use tracing::trace;

use crate::subscribers::{Subscribers, dispatch};
use crate::{
    Error, Event, EventKind, Handler, Identity, Observable, Result, SetEvent, SubscriptionToken,
};

/// An unordered collection of distinct items that dispatches a [`SetEvent`] for every mutation.
///
/// Membership is decided by [`Identity`], so two equal but separate models are two members.
/// Lookups scan the members, which suits the small selections and tag sets this is meant for.
///
/// Members are reported in the order they were added. Callers must not rely on that order
/// beyond determinism.
///
/// Like the other observable collections, the set is a cloneable handle and handlers may mutate
/// it while it dispatches.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use observable::ObservableSet;
///
/// let (a, b) = (Rc::new("a"), Rc::new("b"));
/// let set = ObservableSet::new();
///
/// assert!(set.add(Rc::clone(&a)));
/// assert!(!set.add(Rc::clone(&a)));
///
/// set.union_with([Rc::clone(&b)]);
/// assert_eq!(set.len(), 2);
///
/// set.difference_with([a]);
/// assert!(set.contains(&b));
/// assert_eq!(set.len(), 1);
/// ```
pub struct ObservableSet<T> {
    inner: Rc<SetInner<T>>,
}

struct SetInner<T> {
    items: RefCell<Vec<T>>,
    subscribers: RefCell<Subscribers<SetEvent<T>>>,
}

impl<T> ObservableSet<T> {
    /// Creates an empty set with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SetInner {
                items: RefCell::new(Vec::new()),
                subscribers: RefCell::new(Subscribers::new()),
            }),
        }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    /// Whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    /// Whether `self` and `other` are handles to the same set.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn emit(&self, event: &SetEvent<T>) {
        trace!(kind = ?event.kind(), "dispatching set event");
        dispatch(&self.inner.subscribers, event);
    }
}

impl<T: Identity> ObservableSet<T> {
    /// Whether `item` is a member.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.inner
            .items
            .borrow()
            .iter()
            .any(|member| member.is_same(item))
    }
}

impl<T: Clone + Identity> ObservableSet<T> {
    /// The members, in the order they were added.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.items.borrow().clone()
    }

    /// Adds `item`. Dispatches [`SetEvent::Add`].
    ///
    /// Returns `false` without dispatching anything if `item` is already a member.
    pub fn add(&self, item: T) -> bool {
        {
            let mut items = self.inner.items.borrow_mut();

            if items.iter().any(|member| member.is_same(&item)) {
                return false;
            }

            items.push(item.clone());
        }

        self.emit(&SetEvent::Add { item });
        true
    }

    /// Removes `item` and returns the member that was removed. Dispatches [`SetEvent::Discard`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `item` is not a member.
    pub fn remove(&self, item: &T) -> Result<T> {
        self.discard(item).ok_or_else(Error::item)
    }

    /// Removes `item` if it is a member. Dispatches [`SetEvent::Discard`] if it was.
    pub fn discard(&self, item: &T) -> Option<T> {
        let removed = {
            let mut items = self.inner.items.borrow_mut();
            let position = items.iter().position(|member| member.is_same(item))?;
            items.remove(position)
        };

        self.emit(&SetEvent::Discard {
            item: removed.clone(),
        });
        Some(removed)
    }

    /// Removes and returns the most recently added member. Dispatches [`SetEvent::Discard`].
    pub fn pop(&self) -> Option<T> {
        let removed = self.inner.items.borrow_mut().pop()?;

        self.emit(&SetEvent::Discard {
            item: removed.clone(),
        });
        Some(removed)
    }

    /// Removes all members. Dispatches [`SetEvent::Clear`].
    pub fn clear(&self) {
        let removed = mem::take(&mut *self.inner.items.borrow_mut());

        self.emit(&SetEvent::Clear);
        drop(removed);
    }

    /// Adds every item of `other` that is not yet a member. Dispatches a single
    /// [`SetEvent::Update`].
    pub fn union_with(&self, other: impl IntoIterator<Item = T>) {
        {
            let mut items = self.inner.items.borrow_mut();

            for item in other {
                if !items.iter().any(|member| member.is_same(&item)) {
                    items.push(item);
                }
            }
        }

        self.emit(&SetEvent::Update);
    }

    /// Keeps only the members that are also in `other`. Dispatches a single
    /// [`SetEvent::Update`].
    pub fn intersect_with(&self, other: impl IntoIterator<Item = T>) {
        let other = other.into_iter().collect::<Vec<_>>();

        self.retain_members(|member| contains(&other, member));
    }

    /// Removes every member that is in `other`. Dispatches a single [`SetEvent::Update`].
    pub fn difference_with(&self, other: impl IntoIterator<Item = T>) {
        let other = other.into_iter().collect::<Vec<_>>();

        self.retain_members(|member| !contains(&other, member));
    }

    /// Removes the members that are in `other` and adds the items of `other` that were not
    /// members. Dispatches a single [`SetEvent::Update`].
    pub fn symmetric_difference_with(&self, other: impl IntoIterator<Item = T>) {
        let mut unique = Vec::new();
        for item in other {
            if !contains(&unique, &item) {
                unique.push(item);
            }
        }

        {
            let mut items = self.inner.items.borrow_mut();
            let before = mem::take(&mut *items);

            let (shared, kept): (Vec<_>, Vec<_>) = before
                .into_iter()
                .partition(|member| contains(&unique, member));

            *items = kept;
            items.extend(unique.into_iter().filter(|item| !contains(&shared, item)));
        }

        self.emit(&SetEvent::Update);
    }

    /// Tells subscribers to rebuild from the current contents. Dispatches [`SetEvent::Update`].
    pub fn refresh(&self) {
        self.emit(&SetEvent::Update);
    }

    fn retain_members(&self, keep: impl FnMut(&T) -> bool) {
        let removed = {
            let mut items = self.inner.items.borrow_mut();
            let (kept, removed): (Vec<_>, Vec<_>) =
                mem::take(&mut *items).into_iter().partition(keep);
            *items = kept;
            removed
        };

        self.emit(&SetEvent::Update);
        drop(removed);
    }
}

fn contains<T: Identity>(items: &[T], item: &T) -> bool {
    items.iter().any(|candidate| candidate.is_same(item))
}

impl<T> Observable for ObservableSet<T> {
    type Event = SetEvent<T>;

    fn subscribe(&self, kind: EventKind, handler: Handler<Self::Event>) -> SubscriptionToken {
        self.inner.subscribers.borrow_mut().subscribe(kind, handler)
    }

    fn unsubscribe(&self, kind: EventKind, token: SubscriptionToken) -> bool {
        self.inner.subscribers.borrow_mut().unsubscribe(kind, token)
    }

    fn subscription_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }
}

impl<T> Clone for ObservableSet<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for ObservableSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Identity> FromIterator<T> for ObservableSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let set = Self::new();

        {
            let mut items = set.inner.items.borrow_mut();

            for item in iter {
                if !contains(&items, &item) {
                    items.push(item);
                }
            }
        }

        set
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableSet<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.inner.items.borrow().iter())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_not_impl_any;

    use super::*;

    assert_not_impl_any!(ObservableSet<Rc<u32>>: Send, Sync);

    fn record(set: &ObservableSet<Rc<u32>>) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));

        for kind in EventKind::ALL {
            let log = Rc::clone(&log);
            set.subscribe(
                kind,
                Rc::new(move |event: &SetEvent<Rc<u32>>| {
                    let entry = match event {
                        SetEvent::Add { item } => format!("add {item}"),
                        SetEvent::Discard { item } => format!("discard {item}"),
                        SetEvent::Clear => "clear".to_string(),
                        SetEvent::Update => "update".to_string(),
                    };
                    log.borrow_mut().push(entry);
                }),
            );
        }

        log
    }

    fn values(set: &ObservableSet<Rc<u32>>) -> Vec<u32> {
        set.to_vec().iter().map(|item| **item).collect()
    }

    #[test]
    fn membership_is_by_identity() {
        let one = Rc::new(1);
        let set = ObservableSet::from_iter([Rc::clone(&one), Rc::clone(&one)]);

        assert_eq!(set.len(), 1);
        assert!(set.contains(&one));
        assert!(!set.contains(&Rc::new(1)));
        assert!(set.add(Rc::new(1)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn add_and_discard_dispatch_only_on_change() {
        let one = Rc::new(1);
        let set = ObservableSet::new();
        let log = record(&set);

        assert!(set.add(Rc::clone(&one)));
        assert!(!set.add(Rc::clone(&one)));
        assert!(set.discard(&one).is_some());
        assert!(set.discard(&one).is_none());

        assert_eq!(*log.borrow(), vec!["add 1", "discard 1"]);
        assert!(set.is_empty());
    }

    #[test]
    fn remove_of_absent_item_is_not_found() {
        let set = ObservableSet::from_iter([Rc::new(1)]);
        let log = record(&set);

        assert!(matches!(set.remove(&Rc::new(1)), Err(Error::NotFound { .. })));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn pop_takes_latest_member() {
        let set = ObservableSet::from_iter([Rc::new(1), Rc::new(2)]);
        let log = record(&set);

        assert_eq!(*set.pop().unwrap(), 2);
        assert_eq!(*set.pop().unwrap(), 1);
        assert!(set.pop().is_none());

        assert_eq!(*log.borrow(), vec!["discard 2", "discard 1"]);
    }

    #[test]
    fn set_operators_dispatch_one_update_each() {
        let items = (0..5).map(Rc::new).collect::<Vec<_>>();
        let set = ObservableSet::from_iter(items[..3].iter().cloned());
        let log = record(&set);

        set.union_with(items[2..].iter().cloned());
        assert_eq!(values(&set), vec![0, 1, 2, 3, 4]);

        set.intersect_with(items[1..4].iter().cloned());
        assert_eq!(values(&set), vec![1, 2, 3]);

        set.difference_with([Rc::clone(&items[2])]);
        assert_eq!(values(&set), vec![1, 3]);

        set.symmetric_difference_with([Rc::clone(&items[3]), Rc::clone(&items[4])]);
        assert_eq!(values(&set), vec![1, 4]);

        set.clear();
        assert!(set.is_empty());

        assert_eq!(
            *log.borrow(),
            vec!["update", "update", "update", "update", "clear"]
        );
    }

    #[test]
    fn handlers_may_mutate_the_set() {
        let set = ObservableSet::new();
        let follower = Rc::new(0);

        let handle = set.clone();
        let extra = Rc::clone(&follower);
        set.subscribe(
            EventKind::Insert,
            Rc::new(move |_: &SetEvent<Rc<u32>>| {
                handle.add(Rc::clone(&extra));
            }),
        );

        set.add(Rc::new(1));

        assert_eq!(set.len(), 2);
        assert!(set.contains(&follower));
    }
}
