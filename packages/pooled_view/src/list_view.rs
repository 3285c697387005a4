use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use observable::{ListEvent, ObservableList, SubscriptionRegistry};
use recycle_pool::LocalRecyclePool;
use tracing::debug;

use crate::children::Children;
use crate::{DataWidget, Result};

const ITEMS_SLOT: &str = "items";

/// Keeps one pooled widget per item of an [`ObservableList`], in list order.
///
/// While attached, the view follows every event of the list:
///
/// | Event    | Reaction                                     |
/// |----------|----------------------------------------------|
/// | `Insert` | a widget is made for the item                |
/// | `Remove` | the widget is recycled                       |
/// | `Set`    | the old widget is recycled, a new one made   |
/// | `Swap`   | the widgets trade places                     |
/// | `Clear`  | all widgets are recycled                     |
/// | `Update` | all widgets are recycled and rebuilt         |
///
/// Widgets are made with and recycled into the pool the view was created with, so widgets of
/// removed items serve new items later on.
///
/// # Panics
///
/// Event handlers have no caller to report errors to. A view panics if the pool fails to make
/// or take back a widget while following an event. [`attach()`][Self::attach] verifies that the
/// widget type is registered, which rules this out unless the pool is reconfigured afterwards.
///
/// # Example
///
/// ```rust
/// use observable::ObservableList;
/// use pooled_view::{DataWidget, ListView};
/// use recycle_pool::{LocalRecyclePool, Recycle};
///
/// struct Label(Option<String>);
///
/// impl Recycle for Label {
///     type Args = String;
///
///     fn create(text: String) -> Self {
///         Self(Some(text))
///     }
///
///     fn setup(&mut self, text: String) {
///         self.0 = Some(text);
///     }
///
///     fn teardown(&mut self) {
///         self.0 = None;
///     }
/// }
///
/// impl DataWidget<String> for Label {
///     fn model(&self) -> Option<&String> {
///         self.0.as_ref()
///     }
/// }
///
/// let pool = LocalRecyclePool::new();
/// pool.register::<Label>(16);
///
/// let list = ObservableList::from(vec!["one".to_string()]);
/// let view = ListView::<String, Label>::new(pool.clone());
/// view.attach(&list).unwrap();
///
/// list.append("two".to_string());
/// assert_eq!(view.models(), vec!["one".to_string(), "two".to_string()]);
///
/// view.detach().unwrap();
/// assert_eq!(pool.free_len::<Label>().unwrap(), 2);
/// ```
pub struct ListView<M, W>
where
    M: Clone + 'static,
    W: DataWidget<M>,
{
    state: Rc<ListViewState<M, W>>,
}

struct ListViewState<M, W>
where
    M: Clone + 'static,
    W: DataWidget<M>,
{
    children: Children<W>,
    source: RefCell<Option<ObservableList<M>>>,
    registry: RefCell<SubscriptionRegistry>,
}

impl<M, W> ListView<M, W>
where
    M: Clone + 'static,
    W: DataWidget<M>,
{
    /// Creates a detached view that takes its widgets from `pool`.
    #[must_use]
    pub fn new(pool: LocalRecyclePool) -> Self {
        Self {
            state: Rc::new(ListViewState {
                children: Children::new(pool),
                source: RefCell::new(None),
                registry: RefCell::new(SubscriptionRegistry::new()),
            }),
        }
    }

    /// Builds one widget per item of `list` and starts following its events.
    ///
    /// A view that is already attached is detached first.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget type is not registered with the pool.
    pub fn attach(&self, list: &ObservableList<M>) -> Result<()> {
        self.detach()?;

        self.state.children.pool().capacity::<W>()?;
        self.state.children.rebuild(list.to_vec())?;

        let weak = Rc::downgrade(&self.state);
        self.state
            .registry
            .borrow_mut()
            .bind_all(ITEMS_SLOT, list, |_| {
                let weak = weak.clone();

                Rc::new(move |event: &ListEvent<M>| {
                    if let Some(state) = weak.upgrade() {
                        state.follow(event);
                    }
                })
            });

        *self.state.source.borrow_mut() = Some(list.clone());

        debug!(widgets = self.len(), "list view attached");
        Ok(())
    }

    /// Stops following the list and recycles every widget. Does nothing if not attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool refuses a widget.
    pub fn detach(&self) -> Result<()> {
        self.state.detach()
    }

    /// Whether the view follows a list.
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

    /// Calls `f` with the widgets, in list order.
    ///
    /// `f` must not mutate the list the view follows.
    pub fn with_widgets<R>(&self, f: impl FnOnce(&[Box<W>]) -> R) -> R {
        self.state.children.with(f)
    }

    /// The models displayed by the widgets, in list order.
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

impl<M, W> ListViewState<M, W>
where
    M: Clone + 'static,
    W: DataWidget<M>,
{
    fn follow(&self, event: &ListEvent<M>) {
        let result = match event {
            ListEvent::Insert { index, item } => self.children.insert(*index, item.clone()),
            ListEvent::Remove { index, .. } => self.children.remove(*index),
            ListEvent::Set { index, item } => self.children.replace(*index, item.clone()),
            ListEvent::Swap { a, b } => {
                self.children.swap(*a, *b);
                Ok(())
            }
            ListEvent::Clear => self.children.clear(),
            ListEvent::Update => {
                let models = self
                    .source
                    .borrow()
                    .as_ref()
                    .map(ObservableList::to_vec)
                    .unwrap_or_default();

                self.children.rebuild(models)
            }
        };

        if let Err(error) = result {
            panic!("list view could not update its widgets: {error}");
        }
    }

    fn detach(&self) -> Result<()> {
        let source = self.source.borrow_mut().take();

        if let Some(list) = source {
            self.registry.borrow_mut().unbind_all(ITEMS_SLOT, &list);
            debug!("list view detached");
        }

        self.children.clear()
    }
}

impl<M, W> Drop for ListViewState<M, W>
where
    M: Clone + 'static,
    W: DataWidget<M>,
{
    fn drop(&mut self) {
        // The pool can only refuse widgets of unregistered types, and ours was registered.
        _ = self.detach();
    }
}

impl<M, W> fmt::Debug for ListView<M, W>
where
    M: Clone + 'static,
    W: DataWidget<M>,
{
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListView")
            .field("attached", &self.is_attached())
            .field("children", &self.state.children)
            .finish()
    }
}
