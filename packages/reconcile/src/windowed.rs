use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use observable::{Identity, Observable, ObservableList};
use tracing::{debug, trace};

use crate::binding::Binding;
use crate::flat::{next, reconcile_from};
use crate::{Edits, ReconcileTarget, Result};

/// Random access to the sequence a [`WindowedReconciler`] shows a window of.
pub trait WindowSource {
    /// The items of the sequence.
    type Item;

    /// Number of items in the sequence.
    fn source_len(&self) -> usize;

    /// The item at `index`, if there is one.
    fn item_at(&self, index: usize) -> Option<Self::Item>;
}

impl<T: Clone> WindowSource for ObservableList<T> {
    type Item = T;

    fn source_len(&self) -> usize {
        self.len()
    }

    fn item_at(&self, index: usize) -> Option<T> {
        self.get(index).ok()
    }
}

impl<T: Clone> WindowSource for Vec<T> {
    type Item = T;

    fn source_len(&self) -> usize {
        self.len()
    }

    fn item_at(&self, index: usize) -> Option<T> {
        self.get(index).cloned()
    }
}

/// Default number of items shown by a [`WindowedReconciler`].
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Keeps a target collection equal to a sliding window over a larger source.
///
/// The window starts at `displayed_index` and holds up to `window_size` consecutive source
/// items. After every operation:
///
/// * `target[i]` is the same item as `source[displayed_index + i]` for every position of the
///   target, and
/// * the target holds `min(window_size, source_len - displayed_index)` items, or none at all if
///   the window starts past the end of the source.
///
/// Scrolling by one item only touches the ends of the target: the item leaving the window is
/// removed, the item entering it is added and the items in between are kept.
///
/// The target must support [`push_front()`][ReconcileTarget::push_front] and
/// [`pop_front()`][ReconcileTarget::pop_front] for scrolling and
/// [`swap()`][ReconcileTarget::swap] for re-scans. [`ObservableList`] supports all three.
///
/// This reconciler owns its source and only looks at it when asked to. To follow an observable
/// source instead, create a [`BoundWindowedReconciler`] with
/// [`attach()`][WindowedReconcilerBuilder::attach].
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use observable::ObservableList;
/// use reconcile::WindowedReconciler;
///
/// let source: Vec<Rc<u32>> = (0..100).map(Rc::new).collect();
/// let target = ObservableList::new();
///
/// let mut window = WindowedReconciler::builder()
///     .window_size(3)
///     .build(source, target.clone())
///     .unwrap();
///
/// assert_eq!(target.to_vec(), vec![Rc::new(0), Rc::new(1), Rc::new(2)]);
///
/// assert!(window.scroll_forward().unwrap());
/// assert_eq!(target.to_vec(), vec![Rc::new(1), Rc::new(2), Rc::new(3)]);
/// ```
#[derive(Debug)]
pub struct WindowedReconciler<W, Tg> {
    source: W,
    target: Tg,
    frame: Frame,
}

impl WindowedReconciler<(), ()> {
    /// Creates a builder for a windowed reconciler.
    pub fn builder() -> WindowedReconcilerBuilder {
        WindowedReconcilerBuilder::new()
    }
}

impl<W, Tg> WindowedReconciler<W, Tg>
where
    W: WindowSource,
    Tg: ReconcileTarget<Item = W::Item>,
    W::Item: Identity,
{
    fn new(source: W, target: Tg, frame: Frame) -> Result<Self> {
        let window = Self {
            source,
            target,
            frame,
        };

        window.refresh()?;
        Ok(window)
    }

    /// Index in the source of the first item of the window.
    #[must_use]
    pub fn displayed_index(&self) -> usize {
        self.frame.displayed_index
    }

    /// Maximum number of items in the window.
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.frame.window_size
    }

    /// The windowed source.
    #[must_use]
    pub fn source(&self) -> &W {
        &self.source
    }

    /// Mutable access to the windowed source. Call [`refresh()`][Self::refresh] after changing
    /// it.
    #[must_use]
    pub fn source_mut(&mut self) -> &mut W {
        &mut self.source
    }

    /// The target holding the window.
    #[must_use]
    pub fn target(&self) -> &Tg {
        &self.target
    }

    /// Moves the start of the window to `displayed_index` and reconciles the whole window.
    ///
    /// # Errors
    ///
    /// Returns an error if the target lacks a capability that reconciliation requires.
    pub fn set_displayed_index(&mut self, displayed_index: usize) -> Result<Edits> {
        self.frame.displayed_index = displayed_index;
        self.refresh()
    }

    /// Changes the size of the window and reconciles the whole window.
    ///
    /// # Errors
    ///
    /// Returns an error if the target lacks a capability that reconciliation requires.
    pub fn set_window_size(&mut self, window_size: usize) -> Result<Edits> {
        self.frame.window_size = window_size;
        self.refresh()
    }

    /// Reconciles the whole window, e.g. after the source changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the target lacks a capability that reconciliation requires.
    pub fn refresh(&self) -> Result<Edits> {
        self.frame.refresh(&self.source, &self.target)
    }

    /// Moves the window one item towards the end of the source.
    ///
    /// Returns `false` without doing anything if the window already starts at the last item.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is not double-ended.
    pub fn scroll_forward(&mut self) -> Result<bool> {
        self.frame.scroll_forward(&self.source, &self.target)
    }

    /// Moves the window one item towards the start of the source.
    ///
    /// Returns `false` without doing anything if the window already starts at the first item.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is not double-ended.
    pub fn scroll_backward(&mut self) -> Result<bool> {
        self.frame.scroll_backward(&self.source, &self.target)
    }
}

/// A [`WindowedReconciler`] that also follows an observable source.
///
/// On [`attach()`][WindowedReconcilerBuilder::attach], the reconciler subscribes to every event
/// kind of the source and fills the window. After that, every event of the source reconciles the
/// whole window again, so the window is current as soon as a source mutation returns. Dropping
/// the reconciler unsubscribes it from the source.
///
/// Scrolling, resizing and moving the window work through a shared reference, because the
/// window position is shared with the event handlers.
///
/// The target must not be the source, nor anything whose changes feed back into the source.
///
/// # Panics
///
/// Panics if a pass triggered by a source event fails. This can only happen if the target lacks
/// a capability that reconciliation requires.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use observable::ObservableList;
/// use reconcile::WindowedReconciler;
///
/// let source = ObservableList::from((0..5).map(Rc::new).collect::<Vec<_>>());
/// let target = ObservableList::new();
///
/// let window = WindowedReconciler::builder()
///     .window_size(2)
///     .attach(source.clone(), target.clone())
///     .unwrap();
///
/// source.delete(0).unwrap();
/// assert_eq!(target.to_vec(), vec![Rc::new(1), Rc::new(2)]);
///
/// window.scroll_forward().unwrap();
/// assert_eq!(target.to_vec(), vec![Rc::new(2), Rc::new(3)]);
/// ```
pub struct BoundWindowedReconciler<S, Tg>
where
    S: Observable,
{
    binding: Rc<Binding<S, Tg>>,
    frame: Rc<Cell<Frame>>,
}

impl<S, Tg> BoundWindowedReconciler<S, Tg>
where
    S: Observable + WindowSource + 'static,
    Tg: ReconcileTarget<Item = <S as WindowSource>::Item> + 'static,
{
    fn attach(source: S, target: Tg, frame: Frame) -> Result<Self> {
        let frame = Rc::new(Cell::new(frame));
        let shared = Rc::clone(&frame);

        let binding = Binding::attach(
            source,
            target,
            Box::new(move |source: &S, target: &Tg| shared.get().refresh(source, target)),
        )?;

        Ok(Self { binding, frame })
    }

    /// Index in the source of the first item of the window.
    #[must_use]
    pub fn displayed_index(&self) -> usize {
        self.frame.get().displayed_index
    }

    /// Maximum number of items in the window.
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.frame.get().window_size
    }

    /// Moves the start of the window to `displayed_index` and reconciles the whole window.
    ///
    /// # Errors
    ///
    /// Returns an error if the target lacks a capability that reconciliation requires.
    pub fn set_displayed_index(&self, displayed_index: usize) -> Result<Edits> {
        let mut frame = self.frame.get();
        frame.displayed_index = displayed_index;
        self.frame.set(frame);

        self.binding.run()
    }

    /// Changes the size of the window and reconciles the whole window.
    ///
    /// # Errors
    ///
    /// Returns an error if the target lacks a capability that reconciliation requires.
    pub fn set_window_size(&self, window_size: usize) -> Result<Edits> {
        let mut frame = self.frame.get();
        frame.window_size = window_size;
        self.frame.set(frame);

        self.binding.run()
    }

    /// Reconciles the whole window now, regardless of source events.
    ///
    /// # Errors
    ///
    /// Returns an error if the target lacks a capability that reconciliation requires.
    pub fn refresh(&self) -> Result<Edits> {
        self.binding.run()
    }

    /// Moves the window one item towards the end of the source.
    ///
    /// Returns `false` without doing anything if the window already starts at the last item.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is not double-ended.
    pub fn scroll_forward(&self) -> Result<bool> {
        let mut frame = self.frame.get();
        let moved = frame.scroll_forward(self.binding.source(), self.binding.target());
        self.frame.set(frame);

        moved
    }

    /// Moves the window one item towards the start of the source.
    ///
    /// Returns `false` without doing anything if the window already starts at the first item.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is not double-ended.
    pub fn scroll_backward(&self) -> Result<bool> {
        let mut frame = self.frame.get();
        let moved = frame.scroll_backward(self.binding.source(), self.binding.target());
        self.frame.set(frame);

        moved
    }
}

impl<S, Tg> BoundWindowedReconciler<S, Tg>
where
    S: Observable,
{
    /// The observed source.
    #[must_use]
    pub fn source(&self) -> &S {
        self.binding.source()
    }

    /// The target holding the window.
    #[must_use]
    pub fn target(&self) -> &Tg {
        self.binding.target()
    }

    /// Number of whole-window passes, including the one run on attach. Scrolling is not counted.
    #[must_use]
    pub fn passes(&self) -> usize {
        self.binding.passes()
    }

    /// Sum of the edits of all whole-window passes.
    #[must_use]
    pub fn total_edits(&self) -> Edits {
        self.binding.total_edits()
    }
}

impl<S, Tg> fmt::Debug for BoundWindowedReconciler<S, Tg>
where
    S: Observable,
{
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundWindowedReconciler")
            .field("frame", &self.frame.get())
            .field("passes", &self.passes())
            .finish_non_exhaustive()
    }
}

/// Where a window starts and how many items it holds.
#[derive(Clone, Copy, Debug)]
struct Frame {
    window_size: usize,
    displayed_index: usize,
}

impl Frame {
    fn refresh<W, Tg>(self, source: &W, target: &Tg) -> Result<Edits>
    where
        W: WindowSource + ?Sized,
        Tg: ReconcileTarget<Item = W::Item> + ?Sized,
    {
        let edits = self.scan_from(source, target, 0)?;

        debug!(
            displayed_index = self.displayed_index,
            window_size = self.window_size,
            inserts = edits.inserts(),
            swaps = edits.swaps(),
            deletes = edits.deletes(),
            "window reconciled"
        );

        Ok(edits)
    }

    fn scroll_forward<W, Tg>(&mut self, source: &W, target: &Tg) -> Result<bool>
    where
        W: WindowSource + ?Sized,
        Tg: ReconcileTarget<Item = W::Item> + ?Sized,
    {
        let last = source.source_len().saturating_sub(1);

        if self.displayed_index >= last {
            return Ok(false);
        }

        if !target.is_empty() {
            target.pop_front()?;
        }

        self.displayed_index = next(self.displayed_index);

        let edits = self.scan_from(source, target, target.len())?;

        trace!(
            displayed_index = self.displayed_index,
            inserts = edits.inserts(),
            "scrolled forward"
        );

        Ok(true)
    }

    fn scroll_backward<W, Tg>(&mut self, source: &W, target: &Tg) -> Result<bool>
    where
        W: WindowSource + ?Sized,
        Tg: ReconcileTarget<Item = W::Item> + ?Sized,
    {
        let Some(previous) = self.displayed_index.checked_sub(1) else {
            return Ok(false);
        };

        self.displayed_index = previous;

        let entering = if self.window_size == 0 {
            None
        } else {
            source.item_at(previous)
        };

        let Some(item) = entering else {
            // The window was past the end of the source or shows nothing.
            self.refresh(source, target)?;
            return Ok(true);
        };

        target.push_front(item)?;
        let edits = self.scan_from(source, target, 1)?;

        trace!(
            displayed_index = self.displayed_index,
            deletes = edits.deletes(),
            "scrolled backward"
        );

        Ok(true)
    }

    /// Reconciles window positions from `start` onwards.
    fn scan_from<W, Tg>(self, source: &W, target: &Tg, start: usize) -> Result<Edits>
    where
        W: WindowSource + ?Sized,
        Tg: ReconcileTarget<Item = W::Item> + ?Sized,
    {
        let start = start.min(target.len());

        let items = (start..self.window_size).map_while(|position| {
            self.displayed_index
                .checked_add(position)
                .and_then(|index| source.item_at(index))
        });

        reconcile_from(target, start, items)
    }
}

/// Creates instances of [`WindowedReconciler`] and [`BoundWindowedReconciler`].
///
/// The window holds [`DEFAULT_WINDOW_SIZE`] items starting at the first item of the source
/// unless configured otherwise.
#[derive(Debug)]
#[must_use]
pub struct WindowedReconcilerBuilder {
    frame: Frame,
}

impl WindowedReconcilerBuilder {
    pub(crate) fn new() -> Self {
        Self {
            frame: Frame {
                window_size: DEFAULT_WINDOW_SIZE,
                displayed_index: 0,
            },
        }
    }

    /// Sets the maximum number of items in the window.
    pub fn window_size(mut self, window_size: usize) -> Self {
        self.frame.window_size = window_size;
        self
    }

    /// Sets the index in the source of the first item of the window.
    pub fn displayed_index(mut self, displayed_index: usize) -> Self {
        self.frame.displayed_index = displayed_index;
        self
    }

    /// Creates the reconciler and fills `target` with the initial window.
    ///
    /// The reconciler does not observe `source`; call
    /// [`refresh()`][WindowedReconciler::refresh] after changing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the target lacks a capability that reconciliation requires.
    pub fn build<W, Tg>(self, source: W, target: Tg) -> Result<WindowedReconciler<W, Tg>>
    where
        W: WindowSource,
        Tg: ReconcileTarget<Item = W::Item>,
        W::Item: Identity,
    {
        WindowedReconciler::new(source, target, self.frame)
    }

    /// Creates a reconciler that follows every event of `source`, and fills `target` with the
    /// initial window.
    ///
    /// # Errors
    ///
    /// Returns an error if the target lacks a capability that reconciliation requires. The
    /// source is unbound again in that case.
    pub fn attach<S, Tg>(self, source: S, target: Tg) -> Result<BoundWindowedReconciler<S, Tg>>
    where
        S: Observable + WindowSource + 'static,
        Tg: ReconcileTarget<Item = <S as WindowSource>::Item> + 'static,
    {
        BoundWindowedReconciler::attach(source, target, self.frame)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::RefCell;

    use observable::{Event, EventKind, ListEvent};
    use static_assertions::assert_not_impl_any;

    use super::*;
    use crate::Error;
    use crate::target::tests::InsertOnly;

    assert_not_impl_any!(
        BoundWindowedReconciler<ObservableList<Rc<u32>>, ObservableList<Rc<u32>>>: Send, Sync
    );

    fn source(len: u32) -> Vec<Rc<u32>> {
        (0..len).map(Rc::new).collect()
    }

    fn values(target: &ObservableList<Rc<u32>>) -> Vec<u32> {
        target.to_vec().iter().map(|item| **item).collect()
    }

    fn windowed(
        len: u32,
        window_size: usize,
        displayed_index: usize,
    ) -> WindowedReconciler<Vec<Rc<u32>>, ObservableList<Rc<u32>>> {
        WindowedReconciler::builder()
            .window_size(window_size)
            .displayed_index(displayed_index)
            .build(source(len), ObservableList::new())
            .unwrap()
    }

    #[test]
    fn defaults() {
        let window = WindowedReconciler::builder()
            .build(source(20), ObservableList::new())
            .unwrap();

        assert_eq!(window.window_size(), DEFAULT_WINDOW_SIZE);
        assert_eq!(window.displayed_index(), 0);
        assert_eq!(values(window.target()), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn window_larger_than_source_shows_whole_source() {
        let window = windowed(3, 5, 0);

        assert_eq!(values(window.target()), vec![0, 1, 2]);
    }

    #[test]
    fn window_near_end_is_truncated() {
        let window = windowed(10, 5, 8);

        assert_eq!(values(window.target()), vec![8, 9]);
    }

    #[test]
    fn empty_source_clears_window() {
        let mut window = windowed(5, 3, 0);

        window.source_mut().clear();
        window.refresh().unwrap();

        assert!(window.target().is_empty());
        assert!(!window.scroll_forward().unwrap());
    }

    #[test]
    fn scroll_forward_touches_only_the_ends() {
        let mut window = windowed(10, 3, 0);
        let kept = window.target().get(1).unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in EventKind::ALL {
            let log = Rc::clone(&log);
            window.target().subscribe(
                kind,
                Rc::new(move |event: &ListEvent<Rc<u32>>| log.borrow_mut().push(event.kind())),
            );
        }

        assert!(window.scroll_forward().unwrap());

        assert_eq!(values(window.target()), vec![1, 2, 3]);
        assert!(Rc::ptr_eq(&window.target().get(0).unwrap(), &kept));
        assert_eq!(*log.borrow(), vec![EventKind::Remove, EventKind::Insert]);
    }

    #[test]
    fn scroll_forward_stops_at_last_item() {
        let mut window = windowed(3, 2, 1);

        assert!(window.scroll_forward().unwrap());
        assert_eq!(values(window.target()), vec![2]);

        assert!(!window.scroll_forward().unwrap());
        assert_eq!(window.displayed_index(), 2);
        assert_eq!(values(window.target()), vec![2]);
    }

    #[test]
    fn scroll_backward_trims_tail() {
        let mut window = windowed(10, 3, 5);

        assert!(window.scroll_backward().unwrap());
        assert_eq!(window.displayed_index(), 4);
        assert_eq!(values(window.target()), vec![4, 5, 6]);

        let mut at_start = windowed(10, 3, 0);
        assert!(!at_start.scroll_backward().unwrap());
        assert_eq!(values(at_start.target()), vec![0, 1, 2]);
    }

    #[test]
    fn scroll_backward_from_past_the_end() {
        let mut window = windowed(3, 2, 7);
        assert!(window.target().is_empty());

        assert!(window.scroll_backward().unwrap());
        assert_eq!(window.displayed_index(), 6);
        assert!(window.target().is_empty());

        window.set_displayed_index(3).unwrap();
        assert!(window.scroll_backward().unwrap());
        assert_eq!(values(window.target()), vec![2]);
    }

    #[test]
    fn resizing_and_jumping_keep_the_invariant() {
        let mut window = windowed(20, 4, 0);

        window.set_window_size(6).unwrap();
        assert_eq!(values(window.target()), vec![0, 1, 2, 3, 4, 5]);

        window.set_displayed_index(16).unwrap();
        assert_eq!(values(window.target()), vec![16, 17, 18, 19]);

        window.set_window_size(0).unwrap();
        assert!(window.target().is_empty());
    }

    #[test]
    fn refresh_of_unchanged_source_is_a_no_op() {
        let window = windowed(10, 4, 3);

        assert!(window.refresh().unwrap().is_empty());
    }

    #[test]
    fn scroll_forward_needs_pop_front() {
        let mut window = WindowedReconciler::builder()
            .window_size(3)
            .build(source(10), InsertOnly::new(Vec::new()))
            .unwrap();
        assert_eq!(window.target().values(), vec![0, 1, 2]);

        assert!(matches!(
            window.scroll_forward(),
            Err(Error::InvariantViolation {
                capability: "pop_front"
            })
        ));
        assert_eq!(window.target().values(), vec![0, 1, 2]);
    }

    #[test]
    fn scroll_backward_needs_push_front() {
        let mut window = WindowedReconciler::builder()
            .window_size(3)
            .displayed_index(4)
            .build(source(10), InsertOnly::new(Vec::new()))
            .unwrap();

        assert!(matches!(
            window.scroll_backward(),
            Err(Error::InvariantViolation {
                capability: "push_front"
            })
        ));
        assert_eq!(window.target().values(), vec![4, 5, 6]);
    }

    #[test]
    fn initial_fill_needs_swap_when_items_are_reordered() {
        let items = source(6);
        let target = InsertOnly::new(vec![Rc::clone(&items[1]), Rc::clone(&items[0])]);

        let result = WindowedReconciler::builder()
            .window_size(2)
            .build(items, target);

        assert!(matches!(
            result,
            Err(Error::InvariantViolation { capability: "swap" })
        ));
    }

    #[test]
    fn bound_window_follows_source_events() {
        let source = ObservableList::from(source(6));
        let target = ObservableList::new();

        let window = WindowedReconciler::builder()
            .window_size(3)
            .displayed_index(1)
            .attach(source.clone(), target.clone())
            .unwrap();
        assert_eq!(values(&target), vec![1, 2, 3]);
        assert_eq!(source.subscription_count(), EventKind::COUNT);

        source.delete(0).unwrap();
        assert_eq!(values(&target), vec![2, 3, 4]);

        source.push_front(Rc::new(9));
        assert_eq!(values(&target), vec![1, 2, 3]);

        source.clear();
        assert!(target.is_empty());
        assert_eq!(window.passes(), 4);

        drop(window);
        assert_eq!(source.subscription_count(), 0);

        source.append(Rc::new(7));
        assert!(target.is_empty());
    }

    #[test]
    fn bound_window_moves_through_shared_handle() {
        let source = ObservableList::from(source(10));
        let target = ObservableList::new();

        let window = WindowedReconciler::builder()
            .window_size(2)
            .attach(source.clone(), target.clone())
            .unwrap();

        assert!(window.scroll_forward().unwrap());
        assert_eq!(window.displayed_index(), 1);
        assert_eq!(values(&target), vec![1, 2]);

        window.set_window_size(4).unwrap();
        assert_eq!(values(&target), vec![1, 2, 3, 4]);

        // Events use the moved window.
        source.delete(2).unwrap();
        assert_eq!(values(&target), vec![1, 3, 4, 5]);

        window.set_displayed_index(7).unwrap();
        assert_eq!(values(&target), vec![8, 9]);

        assert!(window.scroll_backward().unwrap());
        assert_eq!(window.window_size(), 4);
        assert_eq!(values(&target), vec![7, 8, 9]);
    }
}
