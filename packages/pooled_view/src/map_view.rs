use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use observable::{MapEvent, ObservableMap, SubscriptionRegistry};
use recycle_pool::LocalRecyclePool;
use tracing::debug;

use crate::children::Children;
use crate::{DataWidget, Result};

const ENTRIES_SLOT: &str = "entries";

/// Keeps one pooled widget per entry of an [`ObservableMap`], in key order.
///
/// This is the keyed counterpart of [`ListView`][crate::ListView] and reacts to events the same
/// way, using the key-order positions the map reports.
///
/// # Panics
///
/// A view panics if the pool fails to make or take back a widget while following an event.
pub struct MapView<K, M, W>
where
    K: Clone + Eq + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
    W: DataWidget<M>,
{
    state: Rc<MapViewState<K, M, W>>,
}

struct MapViewState<K, M, W>
where
    K: Clone + Eq + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
    W: DataWidget<M>,
{
    children: Children<W>,
    source: RefCell<Option<ObservableMap<K, M>>>,
    registry: RefCell<SubscriptionRegistry>,
}

impl<K, M, W> MapView<K, M, W>
where
    K: Clone + Eq + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
    W: DataWidget<M>,
{
    /// Creates a detached view that takes its widgets from `pool`.
    #[must_use]
    pub fn new(pool: LocalRecyclePool) -> Self {
        Self {
            state: Rc::new(MapViewState {
                children: Children::new(pool),
                source: RefCell::new(None),
                registry: RefCell::new(SubscriptionRegistry::new()),
            }),
        }
    }

    /// Builds one widget per entry of `map` and starts following its events.
    ///
    /// A view that is already attached is detached first.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget type is not registered with the pool.
    pub fn attach(&self, map: &ObservableMap<K, M>) -> Result<()> {
        self.detach()?;

        self.state.children.pool().capacity::<W>()?;
        self.state.children.rebuild(map.values())?;

        let weak = Rc::downgrade(&self.state);
        self.state
            .registry
            .borrow_mut()
            .bind_all(ENTRIES_SLOT, map, |_| {
                let weak = weak.clone();

                Rc::new(move |event: &MapEvent<K, M>| {
                    if let Some(state) = weak.upgrade() {
                        state.follow(event);
                    }
                })
            });

        *self.state.source.borrow_mut() = Some(map.clone());

        debug!(widgets = self.len(), "map view attached");
        Ok(())
    }

    /// Stops following the map and recycles every widget. Does nothing if not attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool refuses a widget.
    pub fn detach(&self) -> Result<()> {
        self.state.detach()
    }

    /// Whether the view follows a map.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.state.source.borrow().is_some()
    }

    /// Number of widgets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.children.len()
    }

    /// Whether the view has no widgets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls `f` with the widgets, in key order.
    pub fn with_widgets<R>(&self, f: impl FnOnce(&[Box<W>]) -> R) -> R {
        self.state.children.with(f)
    }

    /// The models displayed by the widgets, in key order.
    #[must_use]
    pub fn models(&self) -> Vec<M> {
        self.with_widgets(|widgets| {
            widgets
                .iter()
                .filter_map(|widget| widget.model().cloned())
                .collect()
        })
    }
}

impl<K, M, W> MapViewState<K, M, W>
where
    K: Clone + Eq + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
    W: DataWidget<M>,
{
    fn follow(&self, event: &MapEvent<K, M>) {
        let result = match event {
            MapEvent::Insert { index, item, .. } => self.children.insert(*index, item.clone()),
            MapEvent::Remove { index, .. } => self.children.remove(*index),
            MapEvent::Set { index, item, .. } => self.children.replace(*index, item.clone()),
            MapEvent::Swap { a, b } => {
                self.children.swap(*a, *b);
                Ok(())
            }
            MapEvent::Clear => self.children.clear(),
            MapEvent::Update => {
                let models = self
                    .source
                    .borrow()
                    .as_ref()
                    .map(ObservableMap::values)
                    .unwrap_or_default();

                self.children.rebuild(models)
            }
        };

        if let Err(error) = result {
            panic!("map view could not update its widgets: {error}");
        }
    }

    fn detach(&self) -> Result<()> {
        let source = self.source.borrow_mut().take();

        if let Some(map) = source {
            self.registry.borrow_mut().unbind_all(ENTRIES_SLOT, &map);
            debug!("map view detached");
        }

        self.children.clear()
    }
}

impl<K, M, W> Drop for MapViewState<K, M, W>
where
    K: Clone + Eq + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
    W: DataWidget<M>,
{
    fn drop(&mut self) {
        // The pool can only refuse widgets of unregistered types, and ours was registered.
        _ = self.detach();
    }
}

impl<K, M, W> fmt::Debug for MapView<K, M, W>
where
    K: Clone + Eq + Hash + fmt::Debug + 'static,
    M: Clone + 'static,
    W: DataWidget<M>,
{
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapView")
            .field("attached", &self.is_attached())
            .field("children", &self.state.children)
            .finish()
    }
}
