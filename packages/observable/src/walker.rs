use crate::{Error, Identity, ObservableList, Result};

/// A cursor over an [`ObservableList`].
///
/// The walker does not subscribe to the list. Instead, its position is clamped to the last item
/// whenever it is read, so a list that shrank under the walker still yields a valid item.
///
/// # Example
///
/// ```rust
/// use observable::{ObservableList, Walker};
///
/// let list = ObservableList::from(vec!['a', 'b', 'c']);
/// let mut walker = Walker::new(list.clone());
///
/// assert!(walker.inc());
/// assert!(walker.inc());
/// assert!(!walker.inc());
/// assert_eq!(walker.current(), Some('c'));
///
/// list.pop();
/// assert_eq!(walker.current(), Some('b'));
/// ```
#[derive(Debug)]
pub struct Walker<T> {
    list: ObservableList<T>,
    index: usize,
}

impl<T: Clone> Walker<T> {
    /// Creates a walker positioned at the first item of `list`.
    #[must_use]
    pub fn new(list: ObservableList<T>) -> Self {
        Self { list, index: 0 }
    }

    /// The list this walker moves over.
    #[must_use]
    pub fn list(&self) -> &ObservableList<T> {
        &self.list
    }

    /// The current position, clamped to the last item of the list.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index.min(self.list.len().saturating_sub(1))
    }

    /// Moves to `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `index` is not a position of the list.
    pub fn set_index(&mut self, index: usize) -> Result<()> {
        let len = self.list.len();

        if index >= len {
            return Err(Error::index(index, len));
        }

        self.index = index;
        Ok(())
    }

    /// The item at the current position, or `None` if the list is empty.
    #[must_use]
    pub fn current(&self) -> Option<T> {
        self.list.get(self.index()).ok()
    }

    /// Moves one item forward. Returns `false` if already at the last item.
    pub fn inc(&mut self) -> bool {
        let index = self.index();

        match index.checked_add(1) {
            Some(next) if next < self.list.len() => {
                self.index = next;
                true
            }
            _ => {
                self.index = index;
                false
            }
        }
    }

    /// Moves one item back. Returns `false` if already at the first item.
    pub fn dec(&mut self) -> bool {
        let index = self.index();

        match index.checked_sub(1) {
            Some(previous) => {
                self.index = previous;
                true
            }
            None => {
                self.index = index;
                false
            }
        }
    }
}

impl<T: Clone + Identity> Walker<T> {
    /// Moves to the first occurrence of `item`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `item` is not in the list; the position is unchanged.
    pub fn set_current(&mut self, item: &T) -> Result<()> {
        self.index = self.list.position_of(item).ok_or_else(Error::item)?;
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn empty_list_has_no_current_item() {
        let mut walker = Walker::new(ObservableList::<u8>::new());

        assert_eq!(walker.index(), 0);
        assert_eq!(walker.current(), None);
        assert!(!walker.inc());
        assert!(!walker.dec());
        assert!(walker.set_index(0).is_err());
    }

    #[test]
    fn moves_within_bounds() {
        let mut walker = Walker::new(ObservableList::from(vec![1, 2, 3]));

        assert!(!walker.dec());
        walker.set_index(2).unwrap();
        assert!(!walker.inc());
        assert!(walker.dec());
        assert_eq!(walker.current(), Some(2));
        assert!(walker.set_index(3).is_err());
        assert_eq!(walker.index(), 1);
    }

    #[test]
    fn clamps_after_list_shrinks() {
        let list = ObservableList::from(vec![1, 2, 3, 4]);
        let mut walker = Walker::new(list.clone());
        walker.set_index(3).unwrap();

        list.delete(0).unwrap();
        list.delete(0).unwrap();

        assert_eq!(walker.index(), 1);
        assert_eq!(walker.current(), Some(4));
        assert!(walker.dec());
        assert_eq!(walker.current(), Some(3));
    }

    #[test]
    fn set_current_finds_by_identity() {
        let first = Rc::new("same");
        let second = Rc::new("same");
        let list = ObservableList::from(vec![Rc::clone(&first), Rc::clone(&second)]);
        let mut walker = Walker::new(list);

        walker.set_current(&second).unwrap();
        assert_eq!(walker.index(), 1);

        assert!(walker.set_current(&Rc::new("same")).is_err());
        assert_eq!(walker.index(), 1);
    }
}
