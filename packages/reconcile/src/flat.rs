use std::fmt;
use std::rc::Rc;

use observable::{Identity, Observable};
use tracing::{debug, trace};

use crate::binding::Binding;
use crate::{Edits, ReconcileTarget, Result};

/// Edits `target` until it holds exactly the items of `source`, in order, matched by identity.
///
/// The target is scanned front to back alongside the source. At each position:
///
/// 1. If the target already holds the source item there, it is kept.
/// 2. Otherwise, if the source item is found later in the target, the two are swapped.
/// 3. Otherwise, the source item is inserted.
///
/// Target items left over after the source is exhausted are deleted, last first.
///
/// Items that survive keep their identity, so whatever a view built for them is kept too. A pass
/// over a target that already matches the source applies no edits.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use observable::ObservableList;
/// use reconcile::reconcile;
///
/// let (a, b, c) = (Rc::new('a'), Rc::new('b'), Rc::new('c'));
/// let target = ObservableList::from(vec![Rc::clone(&a), Rc::clone(&b), Rc::clone(&c)]);
///
/// let edits = reconcile(&target, [Rc::clone(&c), Rc::clone(&a)]).unwrap();
///
/// assert_eq!(target.to_vec(), vec![c, a]);
/// assert_eq!(edits.swaps(), 2);
/// assert_eq!(edits.deletes(), 1);
/// ```
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`][crate::Error::InvariantViolation] if a swap is needed
/// and the target does not support swapping. Edits applied before the failure remain applied.
pub fn reconcile<Tg, I>(target: &Tg, source: I) -> Result<Edits>
where
    Tg: ReconcileTarget + ?Sized,
    I: IntoIterator<Item = Tg::Item>,
{
    let edits = reconcile_from(target, 0, source)?;

    debug!(
        inserts = edits.inserts(),
        swaps = edits.swaps(),
        deletes = edits.deletes(),
        "reconciled"
    );

    Ok(edits)
}

/// Reconciles the part of `target` from position `start` onwards, leaving earlier items alone.
///
/// `start` must not exceed the length of the target.
pub(crate) fn reconcile_from<Tg, I>(target: &Tg, start: usize, source: I) -> Result<Edits>
where
    Tg: ReconcileTarget + ?Sized,
    I: IntoIterator<Item = Tg::Item>,
{
    let mut edits = Edits::default();
    let mut index = start;

    for item in source {
        if index < target.len() {
            let matched = target
                .item_at(index)
                .is_some_and(|current| current.is_same(&item));

            if matched {
                index = next(index);
                continue;
            }

            if let Some(found) = target.position_from(&item, next(index)) {
                trace!(index, found, "swap");
                target.swap(index, found)?;
                edits.record_swap();
                index = next(index);
                continue;
            }
        }

        trace!(index, "insert");
        target.insert(index, item)?;
        edits.record_insert();
        index = next(index);
    }

    while let Some(last) = target.len().checked_sub(1) {
        if last < index {
            break;
        }

        trace!(index = last, "delete");
        target.delete(last)?;
        edits.record_delete();
    }

    Ok(edits)
}

pub(crate) fn next(index: usize) -> usize {
    index
        .checked_add(1)
        .expect("a collection cannot have more than usize::MAX items")
}

/// Keeps a target collection reconciled with a sequence produced from an observable source.
///
/// On [`attach()`][Self::attach], the reconciler subscribes to every event kind of the source
/// and runs one pass immediately. After that, every event of the source triggers a new pass in
/// which the producer is called afresh and [`reconcile()`] is applied to the target.
///
/// Dropping the reconciler unsubscribes it from the source.
///
/// The target must not be the source, nor anything whose changes feed back into the source.
///
/// # Panics
///
/// A pass triggered by a source event has no caller to return an error to. If such a pass
/// fails, the reconciler panics. This can only happen if the target lacks a capability that
/// reconciliation requires, which the eager pass of [`attach()`][Self::attach] usually reveals
/// first.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use observable::ObservableList;
/// use reconcile::Reconciler;
///
/// let source = ObservableList::from(vec![Rc::new(1), Rc::new(2), Rc::new(3)]);
/// let target = ObservableList::new();
///
/// // Show only the odd numbers.
/// let reconciler = Reconciler::attach(source.clone(), target.clone(), |source| {
///     source
///         .to_vec()
///         .into_iter()
///         .filter(|item: &Rc<i32>| **item % 2 == 1)
/// })
/// .unwrap();
///
/// assert_eq!(target.len(), 2);
///
/// source.append(Rc::new(5));
/// assert_eq!(target.len(), 3);
/// assert_eq!(reconciler.passes(), 2);
/// ```
pub struct Reconciler<S, Tg>
where
    S: Observable,
{
    binding: Rc<Binding<S, Tg>>,
}

impl<S, Tg> Reconciler<S, Tg>
where
    S: Observable + 'static,
    Tg: ReconcileTarget + 'static,
{
    /// Binds `target` to `source` and runs the first pass.
    ///
    /// `producer` is called on every pass and yields the items the target must hold.
    ///
    /// # Errors
    ///
    /// Returns an error if the first pass fails. The source is unbound again in that case.
    pub fn attach<F, I>(source: S, target: Tg, producer: F) -> Result<Self>
    where
        F: Fn(&S) -> I + 'static,
        I: IntoIterator<Item = Tg::Item>,
    {
        let binding = Binding::attach(
            source,
            target,
            Box::new(move |source: &S, target: &Tg| reconcile(target, producer(source))),
        )?;

        Ok(Self { binding })
    }
}

impl<S, Tg> Reconciler<S, Tg>
where
    S: Observable,
{
    /// Runs a pass now, regardless of source events.
    ///
    /// # Errors
    ///
    /// Returns an error if the target lacks a capability that the pass requires.
    pub fn run(&self) -> Result<Edits> {
        self.binding.run()
    }

    /// The observed source.
    #[must_use]
    pub fn source(&self) -> &S {
        self.binding.source()
    }

    /// The reconciled target.
    #[must_use]
    pub fn target(&self) -> &Tg {
        self.binding.target()
    }

    /// Number of completed passes, including the one run on attach.
    #[must_use]
    pub fn passes(&self) -> usize {
        self.binding.passes()
    }

    /// Sum of the edits of all completed passes.
    #[must_use]
    pub fn total_edits(&self) -> Edits {
        self.binding.total_edits()
    }
}

impl<S, Tg> fmt::Debug for Reconciler<S, Tg>
where
    S: Observable,
{
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("passes", &self.passes())
            .field("total_edits", &self.total_edits())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::RefCell;

    use observable::{EventKind, ListEvent, ObservableList};
    use static_assertions::assert_not_impl_any;

    use super::*;
    use crate::Error;
    use crate::target::tests::InsertOnly;

    assert_not_impl_any!(Reconciler<ObservableList<Rc<u32>>, ObservableList<Rc<u32>>>: Send, Sync);

    fn items(count: u32) -> Vec<Rc<u32>> {
        (0..count).map(Rc::new).collect()
    }

    fn pick(items: &[Rc<u32>], order: &[usize]) -> Vec<Rc<u32>> {
        order
            .iter()
            .map(|&position| Rc::clone(&items[position]))
            .collect()
    }

    fn same(left: &[Rc<u32>], right: &[Rc<u32>]) -> bool {
        left.len() == right.len() && left.iter().zip(right).all(|(l, r)| Rc::ptr_eq(l, r))
    }

    #[test]
    fn fills_empty_target() {
        let source = items(3);
        let target = ObservableList::new();

        let edits = reconcile(&target, source.clone()).unwrap();

        assert!(same(&target.to_vec(), &source));
        assert_eq!(edits.inserts(), 3);
        assert_eq!(edits.total(), 3);
    }

    #[test]
    fn empty_source_clears_target() {
        let target = ObservableList::from(items(3));

        let edits = reconcile(&target, Vec::new()).unwrap();

        assert!(target.is_empty());
        assert_eq!(edits.deletes(), 3);
    }

    #[test]
    fn rotation_takes_two_swaps() {
        let all = items(3);
        let target = ObservableList::from(all.clone());
        let log = Rc::new(RefCell::new(Vec::new()));

        let swaps = Rc::clone(&log);
        target.subscribe(
            EventKind::Swap,
            Rc::new(move |event: &ListEvent<Rc<u32>>| {
                if let ListEvent::Swap { a, b } = event {
                    swaps.borrow_mut().push((*a, *b));
                }
            }),
        );

        let edits = reconcile(&target, pick(&all, &[2, 0, 1])).unwrap();

        assert_eq!(*log.borrow(), vec![(0, 2), (1, 2)]);
        assert_eq!(edits.swaps(), 2);
        assert_eq!(edits.total(), 2);
        assert!(same(&target.to_vec(), &pick(&all, &[2, 0, 1])));
    }

    #[test]
    fn replaced_item_is_inserted_and_old_one_deleted() {
        let all = items(3);
        let target = ObservableList::from(pick(&all, &[0, 1]));

        let edits = reconcile(&target, pick(&all, &[0, 2])).unwrap();

        assert!(same(&target.to_vec(), &pick(&all, &[0, 2])));
        assert_eq!(edits.inserts(), 1);
        assert_eq!(edits.deletes(), 1);
        assert_eq!(edits.swaps(), 0);
    }

    #[test]
    fn equal_values_are_not_the_same_items() {
        let target = ObservableList::from(vec![Rc::new(1)]);
        let replacement = vec![Rc::new(1)];

        let edits = reconcile(&target, replacement.clone()).unwrap();

        assert!(same(&target.to_vec(), &replacement));
        assert_eq!(edits.inserts(), 1);
        assert_eq!(edits.deletes(), 1);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let all = items(6);
        let target = ObservableList::from(pick(&all, &[5, 1, 4]));
        let source = pick(&all, &[1, 2, 3, 4]);

        reconcile(&target, source.clone()).unwrap();
        let edits = reconcile(&target, source.clone()).unwrap();

        assert!(edits.is_empty());
        assert!(same(&target.to_vec(), &source));
    }

    #[test]
    fn follows_source_events_until_dropped() {
        let source = ObservableList::from(items(2));
        let target = ObservableList::new();

        let reconciler = Reconciler::attach(source.clone(), target.clone(), |source| {
            source.to_vec()
        })
        .unwrap();

        assert_eq!(reconciler.passes(), 1);
        assert_eq!(source.subscription_count(), EventKind::COUNT);
        assert!(same(&target.to_vec(), &source.to_vec()));

        source.push_front(Rc::new(9));
        source.swap(0, 2).unwrap();
        source.delete(1).unwrap();

        assert_eq!(reconciler.passes(), 4);
        assert!(same(&target.to_vec(), &source.to_vec()));
        assert_eq!(reconciler.total_edits().inserts(), 3);

        drop(reconciler);
        assert_eq!(source.subscription_count(), 0);

        source.clear();
        assert_eq!(target.len(), 2);
    }

    #[test]
    fn needed_swap_fails_on_target_without_swap() {
        let all = items(2);
        let target = InsertOnly::new(all.clone());

        let result = reconcile(&target, pick(&all, &[1, 0]));

        assert!(matches!(
            result,
            Err(Error::InvariantViolation { capability: "swap" })
        ));
        assert_eq!(target.values(), vec![0, 1]);
    }

    #[test]
    fn target_without_swap_is_fine_when_no_swap_is_needed() {
        let all = items(3);
        let target = InsertOnly::new(pick(&all, &[0, 2]));

        let edits = reconcile(&target, pick(&all, &[0, 1])).unwrap();

        assert_eq!(target.values(), vec![0, 1]);
        assert_eq!(edits.inserts(), 1);
        assert_eq!(edits.deletes(), 1);
    }

    #[test]
    fn attach_reports_missing_swap_and_unbinds() {
        let all = items(2);
        let source = ObservableList::from(pick(&all, &[1, 0]));

        let result = Reconciler::attach(source.clone(), InsertOnly::new(all), |source| {
            source.to_vec()
        });

        assert!(matches!(
            result,
            Err(Error::InvariantViolation { capability: "swap" })
        ));
        assert_eq!(source.subscription_count(), 0);
    }
}
