use std::cell::RefCell;
use std::fmt;
use std::mem;

use recycle_pool::{LocalRecyclePool, Recycle};
use tracing::trace;

use crate::Result;

/// Positional list of pooled widgets.
///
/// Widgets are made from and recycled into the pool as positions are added and removed. Pool
/// hooks run while the list is not borrowed.
pub(crate) struct Children<W> {
    pool: LocalRecyclePool,
    widgets: RefCell<Vec<Box<W>>>,
}

impl<W: Recycle> Children<W> {
    pub(crate) fn new(pool: LocalRecyclePool) -> Self {
        Self {
            pool,
            widgets: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn pool(&self) -> &LocalRecyclePool {
        &self.pool
    }

    pub(crate) fn len(&self) -> usize {
        self.widgets.borrow().len()
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&[Box<W>]) -> R) -> R {
        f(&self.widgets.borrow())
    }

    pub(crate) fn insert(&self, index: usize, args: W::Args) -> Result<()> {
        let widget = self.pool.make::<W>(args)?;

        let mut widgets = self.widgets.borrow_mut();
        let index = index.min(widgets.len());
        widgets.insert(index, widget);

        trace!(index, "widget inserted");
        Ok(())
    }

    pub(crate) fn remove(&self, index: usize) -> Result<()> {
        let removed = {
            let mut widgets = self.widgets.borrow_mut();
            (index < widgets.len()).then(|| widgets.remove(index))
        };

        if let Some(widget) = removed {
            self.pool.recycle(widget)?;
            trace!(index, "widget removed");
        }

        Ok(())
    }

    /// Replaces the widget at `index` with one made for `args`. The old widget is recycled
    /// first, so the new one can reuse its allocation.
    pub(crate) fn replace(&self, index: usize, args: W::Args) -> Result<()> {
        self.remove(index)?;
        self.insert(index, args)
    }

    pub(crate) fn swap(&self, a: usize, b: usize) {
        let mut widgets = self.widgets.borrow_mut();

        if a < widgets.len() && b < widgets.len() {
            widgets.swap(a, b);
            trace!(a, b, "widgets swapped");
        }
    }

    pub(crate) fn clear(&self) -> Result<()> {
        let widgets = mem::take(&mut *self.widgets.borrow_mut());
        let count = widgets.len();

        for widget in widgets {
            self.pool.recycle(widget)?;
        }

        trace!(count, "widgets cleared");
        Ok(())
    }

    pub(crate) fn rebuild(&self, models: impl IntoIterator<Item = W::Args>) -> Result<()> {
        self.clear()?;

        for args in models {
            let widget = self.pool.make::<W>(args)?;
            self.widgets.borrow_mut().push(widget);
        }

        Ok(())
    }
}

impl<W> fmt::Debug for Children<W> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Children")
            .field("len", &self.widgets.borrow().len())
            .finish_non_exhaustive()
    }
}
