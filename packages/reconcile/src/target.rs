use observable::{Identity, ObservableList};

use crate::{Error, Result};

/// A positional collection that a reconciler can edit.
///
/// The reconcilers only ever read items by position, look items up by identity and apply the
/// edits declared here. Implementations take `&self` because targets are shared handles whose
/// edits are announced to other observers.
///
/// [`swap()`][Self::swap], [`push_front()`][Self::push_front] and
/// [`pop_front()`][Self::pop_front] are optional capabilities. Their default implementations
/// fail with [`Error::InvariantViolation`], which a reconciler passes on if it needs them.
pub trait ReconcileTarget {
    /// The items held by the target.
    type Item: Identity;

    /// Number of items.
    fn len(&self) -> usize;

    /// Whether the target holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The item at `index`, if there is one.
    fn item_at(&self, index: usize) -> Option<Self::Item>;

    /// Position of the first item at or after `start` that is the same as `item`.
    fn position_from(&self, item: &Self::Item, start: usize) -> Option<usize> {
        (start..self.len()).find(|&index| {
            self.item_at(index)
                .is_some_and(|candidate| candidate.is_same(item))
        })
    }

    /// Inserts `item` at `index`, shifting later items back.
    ///
    /// # Errors
    ///
    /// Fails if `index` is greater than the length.
    fn insert(&self, index: usize, item: Self::Item) -> Result<()>;

    /// Removes the item at `index`, shifting later items forward.
    ///
    /// # Errors
    ///
    /// Fails if `index` is out of bounds.
    fn delete(&self, index: usize) -> Result<()>;

    /// Exchanges the items at `a` and `b`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvariantViolation`] unless the target supports swapping.
    fn swap(&self, a: usize, b: usize) -> Result<()> {
        _ = (a, b);
        Err(Error::InvariantViolation { capability: "swap" })
    }

    /// Inserts `item` before the first item.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvariantViolation`] unless the target is double-ended.
    fn push_front(&self, item: Self::Item) -> Result<()> {
        drop(item);
        Err(Error::InvariantViolation {
            capability: "push_front",
        })
    }

    /// Removes the first item, if there is one.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvariantViolation`] unless the target is double-ended.
    fn pop_front(&self) -> Result<()> {
        Err(Error::InvariantViolation {
            capability: "pop_front",
        })
    }
}

impl<T> ReconcileTarget for ObservableList<T>
where
    T: Clone + Identity,
{
    type Item = T;

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn item_at(&self, index: usize) -> Option<T> {
        self.get(index).ok()
    }

    fn position_from(&self, item: &T, start: usize) -> Option<usize> {
        Self::position_from(self, item, start)
    }

    fn insert(&self, index: usize, item: T) -> Result<()> {
        Ok(Self::insert(self, index, item)?)
    }

    fn delete(&self, index: usize) -> Result<()> {
        Self::delete(self, index)?;
        Ok(())
    }

    fn swap(&self, a: usize, b: usize) -> Result<()> {
        Ok(Self::swap(self, a, b)?)
    }

    fn push_front(&self, item: T) -> Result<()> {
        Self::push_front(self, item);
        Ok(())
    }

    fn pop_front(&self) -> Result<()> {
        _ = Self::pop_front(self);
        Ok(())
    }
}
