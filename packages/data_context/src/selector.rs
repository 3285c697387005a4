use std::cell::Cell;
use std::rc::Rc;

use observable::{Identity, ObservableList};
use tracing::trace;

/// A model that remembers whether it is selected.
///
/// The flag is set through a shared reference so that models shared as `Rc` can be selected.
pub trait Selectable {
    /// Whether the model is selected.
    fn is_selected(&self) -> bool;

    /// Marks the model as selected or not.
    fn set_selected(&self, selected: bool);
}

impl<T: Selectable + ?Sized> Selectable for Rc<T> {
    fn is_selected(&self) -> bool {
        (**self).is_selected()
    }

    fn set_selected(&self, selected: bool) {
        (**self).set_selected(selected);
    }
}

impl Selectable for Cell<bool> {
    fn is_selected(&self) -> bool {
        self.get()
    }

    fn set_selected(&self, selected: bool) {
        self.set(selected);
    }
}

/// Whether a [`Selector`] holds at most one model or any number of them.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "selection is either single or multiple, there is no third way"
)]
pub enum SelectionMode {
    /// Selecting a model deselects the previously selected one.
    #[default]
    Single,

    /// Any number of models can be selected at the same time.
    Multi,
}

/// Tracks the selected models, in the order they were selected.
///
/// The selection is an [`ObservableList`], so views and reconcilers can follow it like any
/// other collection. Models are told about their selection state through [`Selectable`].
///
/// Models are matched by [`Identity`]: selecting an equal but different model is a separate
/// selection.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use data_context::{Selectable, SelectionMode, Selector};
///
/// let first = Rc::new(Cell::new(false));
/// let second = Rc::new(Cell::new(false));
///
/// let selector = Selector::new(SelectionMode::Single);
/// selector.select(Rc::clone(&first));
/// selector.select(Rc::clone(&second));
///
/// assert!(!first.is_selected());
/// assert!(second.is_selected());
/// assert_eq!(selector.len(), 1);
/// ```
#[derive(Debug)]
pub struct Selector<T> {
    mode: SelectionMode,
    selected: ObservableList<T>,
}

impl<T> Selector<T>
where
    T: Selectable + Identity + Clone,
{
    /// Creates a selector with nothing selected.
    #[must_use]
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected: ObservableList::new(),
        }
    }

    /// The selection mode.
    #[must_use]
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// The selected models. Subscribe to it to follow the selection.
    #[must_use]
    pub fn selected(&self) -> &ObservableList<T> {
        &self.selected
    }

    /// The selected models, in the order they were selected.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.selected.to_vec()
    }

    /// Number of selected models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Whether `item` is selected.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.selected.contains_item(item)
    }

    /// Selects `item`. In single mode, the previously selected model is deselected first.
    ///
    /// Returns `false` if `item` was already selected.
    pub fn select(&self, item: T) -> bool {
        if self.contains(&item) {
            return false;
        }

        if self.mode == SelectionMode::Single {
            self.clear();
        }

        item.set_selected(true);
        self.selected.append(item);

        trace!(selected = self.len(), "model selected");
        true
    }

    /// Deselects `item`. Returns `false` if it was not selected.
    pub fn deselect(&self, item: &T) -> bool {
        let Ok(removed) = self.selected.remove_item(item) else {
            return false;
        };

        removed.set_selected(false);
        true
    }

    /// Selects `item` if it is not selected and deselects it otherwise. Returns whether it is
    /// selected afterwards.
    pub fn toggle(&self, item: T) -> bool {
        if self.deselect(&item) {
            false
        } else {
            self.select(item)
        }
    }

    /// Deselects everything.
    pub fn clear(&self) {
        if self.selected.is_empty() {
            return;
        }

        for item in self.selected.to_vec() {
            item.set_selected(false);
        }

        self.selected.clear();
    }

    /// Keeps only the selected models for which `keep` returns `true` and deselects the rest.
    ///
    /// Returns how many models were deselected.
    pub fn filter(&self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let rejected = self
            .selected
            .to_vec()
            .into_iter()
            .filter(|item| !keep(item))
            .collect::<Vec<_>>();

        for item in &rejected {
            self.deselect(item);
        }

        rejected.len()
    }
}
