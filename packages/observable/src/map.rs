use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::mem;
use std::rc::Rc;

use foldhash::{HashMap, HashMapExt};
use tracing::trace;

use crate::subscribers::{Subscribers, dispatch};
use crate::{Error, Event, EventKind, Handler, MapEvent, Observable, Result, SubscriptionToken};

/// A keyed collection with an explicit key order that dispatches a [`MapEvent`] for every
/// mutation.
///
/// Items can be addressed by key or by position in the key order. New keys go to the end of the
/// order. Positions reported in events always come from the key order, never from hash order.
///
/// Like [`ObservableList`][crate::ObservableList], the map is a cloneable handle and handlers may
/// mutate it while it dispatches.
///
/// # Example
///
/// ```rust
/// use observable::ObservableMap;
///
/// let map = ObservableMap::new();
/// map.set("x", 1);
/// map.set("y", 2);
///
/// assert_eq!(map.position_of(&"y"), Some(1));
///
/// map.delete(&"x").unwrap();
/// assert_eq!(map.keys(), vec!["y"]);
/// assert_eq!(map.position_of(&"y"), Some(0));
/// ```
pub struct ObservableMap<K, V> {
    inner: Rc<MapInner<K, V>>,
}

struct MapInner<K, V> {
    state: RefCell<MapState<K, V>>,
    subscribers: RefCell<Subscribers<MapEvent<K, V>>>,
}

struct MapState<K, V> {
    values: HashMap<K, V>,
    order: Vec<K>,
}

impl<K, V> MapState<K, V>
where
    K: Eq + Hash,
{
    fn position_of(&self, key: &K) -> Option<usize> {
        self.order.iter().position(|candidate| candidate == key)
    }
}

impl<K, V> ObservableMap<K, V> {
    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.borrow().order.len()
    }

    /// Whether the map has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.state.borrow().order.is_empty()
    }

    /// Whether `self` and `other` are handles to the same map.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn emit(&self, event: &MapEvent<K, V>) {
        trace!(kind = ?event.kind(), "dispatching map event");
        dispatch(&self.inner.subscribers, event);
    }
}

impl<K, V> ObservableMap<K, V>
where
    K: Clone + Eq + Hash + fmt::Debug,
    V: Clone,
{
    /// Creates an empty map with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(MapInner {
                state: RefCell::new(MapState {
                    values: HashMap::new(),
                    order: Vec::new(),
                }),
                subscribers: RefCell::new(Subscribers::new()),
            }),
        }
    }

    /// Returns the item stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such key.
    pub fn get(&self, key: &K) -> Result<V> {
        self.inner
            .state
            .borrow()
            .values
            .get(key)
            .cloned()
            .ok_or_else(|| Error::key(key))
    }

    /// Returns the key and item at `index` in key order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `index` is out of bounds.
    pub fn get_index(&self, index: usize) -> Result<(K, V)> {
        let state = self.inner.state.borrow();

        state
            .order
            .get(index)
            .and_then(|key| Some((key.clone(), state.values.get(key)?.clone())))
            .ok_or_else(|| Error::index(index, state.order.len()))
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.state.borrow().values.contains_key(key)
    }

    /// Position of `key` in the key order.
    #[must_use]
    pub fn position_of(&self, key: &K) -> Option<usize> {
        self.inner.state.borrow().position_of(key)
    }

    /// Keys in key order.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.inner.state.borrow().order.clone()
    }

    /// Items in key order.
    #[must_use]
    pub fn values(&self) -> Vec<V> {
        let state = self.inner.state.borrow();

        state
            .order
            .iter()
            .filter_map(|key| state.values.get(key).cloned())
            .collect()
    }

    /// Key and item pairs in key order.
    #[must_use]
    pub fn entries(&self) -> Vec<(K, V)> {
        let state = self.inner.state.borrow();

        state
            .order
            .iter()
            .filter_map(|key| Some((key.clone(), state.values.get(key)?.clone())))
            .collect()
    }

    /// Inserts or replaces the item under `key`, returning the previous item.
    ///
    /// A new key is appended to the key order and dispatches [`MapEvent::Insert`]. An existing
    /// key keeps its position and dispatches [`MapEvent::Set`].
    pub fn set(&self, key: K, item: V) -> Option<V> {
        let (index, previous) = {
            let mut state = self.inner.state.borrow_mut();
            let previous = state.values.insert(key.clone(), item.clone());

            let index = match previous {
                Some(_) => state
                    .position_of(&key)
                    .expect("every stored key is present in the key order"),
                None => {
                    state.order.push(key.clone());
                    state.order.len().saturating_sub(1)
                }
            };

            (index, previous)
        };

        let event = if previous.is_some() {
            MapEvent::Set { index, key, item }
        } else {
            MapEvent::Insert { index, key, item }
        };

        self.emit(&event);
        previous
    }

    /// Removes `key` and returns its item. Dispatches [`MapEvent::Remove`] with the position the
    /// key had in the key order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such key.
    pub fn delete(&self, key: &K) -> Result<V> {
        let (index, item) = {
            let mut state = self.inner.state.borrow_mut();
            let item = state.values.remove(key).ok_or_else(|| Error::key(key))?;
            let index = state
                .position_of(key)
                .expect("every stored key is present in the key order");
            state.order.remove(index);
            (index, item)
        };

        self.emit(&MapEvent::Remove {
            index,
            key: key.clone(),
            item: item.clone(),
        });
        Ok(item)
    }

    /// Exchanges the positions of two keys in the key order. Dispatches [`MapEvent::Swap`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if either key is absent.
    pub fn swap(&self, key_a: &K, key_b: &K) -> Result<()> {
        let (a, b) = {
            let mut state = self.inner.state.borrow_mut();
            let a = state.position_of(key_a).ok_or_else(|| Error::key(key_a))?;
            let b = state.position_of(key_b).ok_or_else(|| Error::key(key_b))?;
            state.order.swap(a, b);
            (a, b)
        };

        self.emit(&MapEvent::Swap { a, b });
        Ok(())
    }

    /// Removes all keys. Dispatches [`MapEvent::Clear`].
    pub fn clear(&self) {
        let removed = {
            let mut state = self.inner.state.borrow_mut();
            state.order.clear();
            mem::take(&mut state.values)
        };

        self.emit(&MapEvent::Clear);
        drop(removed);
    }

    /// Inserts or replaces every pair of `iter`. Dispatches a single [`MapEvent::Update`].
    pub fn update(&self, iter: impl IntoIterator<Item = (K, V)>) {
        let pairs = iter.into_iter().collect::<Vec<_>>();

        {
            let mut state = self.inner.state.borrow_mut();

            for (key, item) in pairs {
                if state.values.insert(key.clone(), item).is_none() {
                    state.order.push(key);
                }
            }
        }

        self.emit(&MapEvent::Update);
    }

    /// Tells subscribers to rebuild from the current contents. Dispatches [`MapEvent::Update`].
    pub fn refresh(&self) {
        self.emit(&MapEvent::Update);
    }
}

impl<K, V> Observable for ObservableMap<K, V> {
    type Event = MapEvent<K, V>;

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

impl<K, V> Clone for ObservableMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for ObservableMap<K, V>
where
    K: Clone + Eq + Hash + fmt::Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for ObservableMap<K, V>
where
    K: Clone + Eq + Hash + fmt::Debug,
    V: Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = Self::new();

        {
            let mut state = map.inner.state.borrow_mut();

            for (key, item) in iter {
                if state.values.insert(key.clone(), item).is_none() {
                    state.order.push(key);
                }
            }
        }

        map
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ObservableMap<K, V>
where
    K: Eq + Hash,
{
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();

        f.debug_map()
            .entries(
                state
                    .order
                    .iter()
                    .filter_map(|key| Some((key, state.values.get(key)?))),
            )
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_not_impl_any;

    use super::*;

    assert_not_impl_any!(ObservableMap<u32, u32>: Send, Sync);

    fn record(map: &ObservableMap<&'static str, i32>) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));

        for kind in EventKind::ALL {
            let log = Rc::clone(&log);
            map.subscribe(
                kind,
                Rc::new(move |event: &MapEvent<&'static str, i32>| {
                    let entry = match event {
                        MapEvent::Insert { index, key, item } => {
                            format!("insert {index} {key}={item}")
                        }
                        MapEvent::Remove { index, key, item } => {
                            format!("remove {index} {key}={item}")
                        }
                        MapEvent::Set { index, key, item } => format!("set {index} {key}={item}"),
                        MapEvent::Swap { a, b } => format!("swap {a} {b}"),
                        MapEvent::Clear => "clear".to_string(),
                        MapEvent::Update => "update".to_string(),
                    };
                    log.borrow_mut().push(entry);
                }),
            );
        }

        log
    }

    #[test]
    fn delete_reports_position_in_key_order() {
        let map = ObservableMap::from_iter([("x", 1), ("y", 2)]);
        let log = record(&map);

        assert_eq!(map.delete(&"x").unwrap(), 1);

        assert_eq!(*log.borrow(), vec!["remove 0 x=1"]);
        assert_eq!(map.keys(), vec!["y"]);
        assert!(!map.contains_key(&"x"));
    }

    #[test]
    fn set_inserts_new_keys_and_updates_existing_ones() {
        let map = ObservableMap::new();
        let log = record(&map);

        assert_eq!(map.set("a", 1), None);
        assert_eq!(map.set("b", 2), None);
        assert_eq!(map.set("a", 10), Some(1));

        assert_eq!(map.len(), 2);
        assert_eq!(map.values(), vec![10, 2]);
        assert_eq!(
            *log.borrow(),
            vec!["insert 0 a=1", "insert 1 b=2", "set 0 a=10"]
        );
    }

    #[test]
    fn swap_exchanges_key_order() {
        let map = ObservableMap::from_iter([("a", 1), ("b", 2), ("c", 3)]);
        let log = record(&map);

        map.swap(&"a", &"c").unwrap();

        assert_eq!(map.keys(), vec!["c", "b", "a"]);
        assert_eq!(map.get_index(0).unwrap(), ("c", 3));
        assert_eq!(*log.borrow(), vec!["swap 0 2"]);
        assert!(map.swap(&"a", &"missing").is_err());
    }

    #[test]
    fn absent_keys_are_not_found() {
        let map = ObservableMap::<&'static str, i32>::new();

        assert!(matches!(map.get(&"nope"), Err(Error::NotFound { .. })));
        assert!(map.delete(&"nope").is_err());
        assert!(map.get_index(0).is_err());
    }

    #[test]
    fn bulk_update_and_clear() {
        let map = ObservableMap::from_iter([("a", 1)]);
        let log = record(&map);

        map.update([("b", 2), ("a", 3)]);
        assert_eq!(map.entries(), vec![("a", 3), ("b", 2)]);

        map.clear();
        assert!(map.is_empty());

        assert_eq!(*log.borrow(), vec!["update", "clear"]);
    }

    #[test]
    fn debug_follows_key_order() {
        let map = ObservableMap::from_iter([("b", 1), ("a", 2)]);

        assert_eq!(format!("{map:?}"), r#"{"b": 1, "a": 2}"#);
    }
}
