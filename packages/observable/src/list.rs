use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{VecDeque, vec_deque};
use std::fmt;
use std::mem;
use std::rc::Rc;

use tracing::trace;

use crate::subscribers::{Subscribers, dispatch};
use crate::{
    Error, Event, EventKind, Handler, Identity, ListEvent, Observable, Result, SubscriptionToken,
};

/// An ordered, double-ended sequence that dispatches a [`ListEvent`] for every mutation.
///
/// The list is a cloneable handle: all clones refer to the same items and the same subscribers.
/// Reading methods return clones of items, so items are typically cheap handles such as `Rc<M>`.
///
/// Head insertion and removal are O(1), which is what a sliding window over a larger sequence
/// needs.
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use observable::{EventKind, ListEvent, Observable, ObservableList};
///
/// let list = ObservableList::from(vec!['a', 'b']);
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// let log = Rc::clone(&seen);
/// list.subscribe(
///     EventKind::Insert,
///     Rc::new(move |event: &ListEvent<char>| {
///         if let ListEvent::Insert { index, item } = event {
///             log.borrow_mut().push((*index, *item));
///         }
///     }),
/// );
///
/// list.append('c');
/// list.insert(0, 'z').unwrap();
///
/// assert_eq!(list.to_vec(), vec!['z', 'a', 'b', 'c']);
/// assert_eq!(*seen.borrow(), vec![(2, 'c'), (0, 'z')]);
/// ```
///
/// # Reentrancy
///
/// Handlers run after the mutation has completed and without any internal borrow held, so a
/// handler may read or mutate this list (or any other). Nested mutations dispatch their own
/// events before the outer mutation call returns. Closures passed to [`sort_by()`][Self::sort_by]
/// and [`sort_by_key()`][Self::sort_by_key] run while the items are borrowed and must not touch
/// the list.
pub struct ObservableList<T> {
    inner: Rc<ListInner<T>>,
}

struct ListInner<T> {
    items: RefCell<VecDeque<T>>,
    subscribers: RefCell<Subscribers<ListEvent<T>>>,
}

impl<T> ObservableList<T> {
    /// Creates an empty list with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    /// Whether the list has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    /// Runs `f` over the items in order without cloning them.
    ///
    /// `f` must not mutate the list.
    pub fn with_items<R>(&self, f: impl FnOnce(vec_deque::Iter<'_, T>) -> R) -> R {
        f(self.inner.items.borrow().iter())
    }

    /// Whether `self` and `other` are handles to the same list.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn emit(&self, event: &ListEvent<T>) {
        trace!(kind = ?event.kind(), "dispatching list event");
        dispatch(&self.inner.subscribers, event);
    }
}

impl<T: Clone> ObservableList<T> {
    /// Returns the item at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `index` is out of bounds.
    pub fn get(&self, index: usize) -> Result<T> {
        let items = self.inner.items.borrow();

        items
            .get(index)
            .cloned()
            .ok_or_else(|| Error::index(index, items.len()))
    }

    /// Returns the first item, if any.
    #[must_use]
    pub fn first(&self) -> Option<T> {
        self.inner.items.borrow().front().cloned()
    }

    /// Returns the last item, if any.
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.inner.items.borrow().back().cloned()
    }

    /// Returns a copy of the items in order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.items.borrow().iter().cloned().collect()
    }

    /// Inserts `item` at `index`, shifting later items back. Dispatches [`ListEvent::Insert`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `index` is greater than the length of the list.
    pub fn insert(&self, index: usize, item: T) -> Result<()> {
        {
            let mut items = self.inner.items.borrow_mut();

            if index > items.len() {
                return Err(Error::index(index, items.len()));
            }

            items.insert(index, item.clone());
        }

        self.emit(&ListEvent::Insert { index, item });
        Ok(())
    }

    /// Adds `item` to the end. Dispatches [`ListEvent::Insert`].
    pub fn append(&self, item: T) {
        let index = {
            let mut items = self.inner.items.borrow_mut();
            let index = items.len();
            items.push_back(item.clone());
            index
        };

        self.emit(&ListEvent::Insert { index, item });
    }

    /// Adds `item` to the front. Dispatches [`ListEvent::Insert`] at index 0.
    pub fn push_front(&self, item: T) {
        self.inner.items.borrow_mut().push_front(item.clone());
        self.emit(&ListEvent::Insert { index: 0, item });
    }

    /// Removes and returns the item at `index`. Dispatches [`ListEvent::Remove`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `index` is out of bounds.
    pub fn delete(&self, index: usize) -> Result<T> {
        let item = {
            let mut items = self.inner.items.borrow_mut();
            let len = items.len();
            items.remove(index).ok_or_else(|| Error::index(index, len))?
        };

        self.emit(&ListEvent::Remove {
            index,
            item: item.clone(),
        });
        Ok(item)
    }

    /// Removes and returns the last item. Dispatches [`ListEvent::Remove`] if there was one.
    pub fn pop(&self) -> Option<T> {
        let (index, item) = {
            let mut items = self.inner.items.borrow_mut();
            let item = items.pop_back()?;
            (items.len(), item)
        };

        self.emit(&ListEvent::Remove {
            index,
            item: item.clone(),
        });
        Some(item)
    }

    /// Removes and returns the first item. Dispatches [`ListEvent::Remove`] at index 0 if there
    /// was one.
    pub fn pop_front(&self) -> Option<T> {
        let item = self.inner.items.borrow_mut().pop_front()?;

        self.emit(&ListEvent::Remove {
            index: 0,
            item: item.clone(),
        });
        Some(item)
    }

    /// Replaces the item at `index`, returning the previous one. Dispatches [`ListEvent::Set`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `index` is out of bounds.
    pub fn set(&self, index: usize, item: T) -> Result<T> {
        let previous = {
            let mut items = self.inner.items.borrow_mut();
            let len = items.len();
            let slot = items.get_mut(index).ok_or_else(|| Error::index(index, len))?;
            mem::replace(slot, item.clone())
        };

        self.emit(&ListEvent::Set { index, item });
        Ok(previous)
    }

    /// Exchanges the items at `a` and `b`. Dispatches [`ListEvent::Swap`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if either index is out of bounds. Nothing is changed or
    /// dispatched in that case.
    pub fn swap(&self, a: usize, b: usize) -> Result<()> {
        {
            let mut items = self.inner.items.borrow_mut();
            let len = items.len();

            for index in [a, b] {
                if index >= len {
                    return Err(Error::index(index, len));
                }
            }

            items.swap(a, b);
        }

        self.emit(&ListEvent::Swap { a, b });
        Ok(())
    }

    /// Removes all items. Dispatches [`ListEvent::Clear`].
    pub fn clear(&self) {
        let removed = mem::take(&mut *self.inner.items.borrow_mut());
        self.emit(&ListEvent::Clear);
        drop(removed);
    }

    /// Appends every item of `iter`. Dispatches a single [`ListEvent::Update`].
    pub fn extend(&self, iter: impl IntoIterator<Item = T>) {
        // Collect first so that the iterator may read the list.
        let added = iter.into_iter().collect::<Vec<_>>();
        self.inner.items.borrow_mut().extend(added);
        self.emit(&ListEvent::Update);
    }

    /// Replaces all items with those of `iter`. Dispatches a single [`ListEvent::Update`].
    pub fn replace_all(&self, iter: impl IntoIterator<Item = T>) {
        let replacement = iter.into_iter().collect::<VecDeque<_>>();
        let previous = mem::replace(&mut *self.inner.items.borrow_mut(), replacement);
        self.emit(&ListEvent::Update);
        drop(previous);
    }

    /// Reverses the order of the items. Dispatches [`ListEvent::Update`].
    pub fn reverse(&self) {
        self.inner.items.borrow_mut().make_contiguous().reverse();
        self.emit(&ListEvent::Update);
    }

    /// Sorts the items with a comparator. Dispatches [`ListEvent::Update`].
    pub fn sort_by(&self, compare: impl FnMut(&T, &T) -> Ordering) {
        self.inner
            .items
            .borrow_mut()
            .make_contiguous()
            .sort_by(compare);
        self.emit(&ListEvent::Update);
    }

    /// Sorts the items by a key. Dispatches [`ListEvent::Update`].
    pub fn sort_by_key<K: Ord>(&self, key: impl FnMut(&T) -> K) {
        self.inner
            .items
            .borrow_mut()
            .make_contiguous()
            .sort_by_key(key);
        self.emit(&ListEvent::Update);
    }

    /// Tells subscribers to rebuild from the current contents. Dispatches [`ListEvent::Update`].
    pub fn refresh(&self) {
        self.emit(&ListEvent::Update);
    }
}

impl<T: Identity> ObservableList<T> {
    /// Position of the first item that is the same object as `item`.
    #[must_use]
    pub fn position_of(&self, item: &T) -> Option<usize> {
        self.position_from(item, 0)
    }

    /// Position of the first item at or after `start` that is the same object as `item`.
    #[must_use]
    pub fn position_from(&self, item: &T, start: usize) -> Option<usize> {
        self.inner
            .items
            .borrow()
            .iter()
            .enumerate()
            .skip(start)
            .find_map(|(index, candidate)| candidate.is_same(item).then_some(index))
    }

    /// Whether the list holds `item` itself, as opposed to an equal value.
    #[must_use]
    pub fn contains_item(&self, item: &T) -> bool {
        self.position_of(item).is_some()
    }
}

impl<T: Clone + Identity> ObservableList<T> {
    /// Removes `item` (by identity) from the list. Dispatches [`ListEvent::Remove`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the list does not hold `item`.
    pub fn remove_item(&self, item: &T) -> Result<T> {
        let index = self.position_of(item).ok_or_else(Error::item)?;
        self.delete(index)
    }
}

impl<T> Observable for ObservableList<T> {
    type Event = ListEvent<T>;

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

impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for ObservableList<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            inner: Rc::new(ListInner {
                items: RefCell::new(VecDeque::from(items)),
                subscribers: RefCell::new(Subscribers::new()),
            }),
        }
    }
}

impl<T> FromIterator<T> for ObservableList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableList<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableList")
            .field("items", &self.inner.items.borrow())
            .field("subscribers", &self.inner.subscribers.borrow())
            .finish()
    }
}
