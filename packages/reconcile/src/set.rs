use std::fmt;
use std::rc::Rc;

use observable::{Identity, Observable, ObservableSet};
use tracing::{debug, trace};

use crate::binding::Binding;
use crate::{Edits, Result};

/// Edits `target` until its members are exactly the items of `source`, matched by identity.
///
/// Source items that are not members are added. Members that the source no longer yields are
/// removed. Members that the source still yields are left alone, so sets have nothing to swap.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use observable::ObservableSet;
/// use reconcile::reconcile_set;
///
/// let (kept, gone) = (Rc::new("kept"), Rc::new("gone"));
/// let target = ObservableSet::from_iter([Rc::clone(&kept), Rc::clone(&gone)]);
///
/// let edits = reconcile_set(&target, [Rc::new("new"), Rc::clone(&kept)]).unwrap();
///
/// assert!(target.contains(&kept));
/// assert!(!target.contains(&gone));
/// assert_eq!(edits.inserts(), 1);
/// assert_eq!(edits.deletes(), 1);
/// ```
///
/// # Errors
///
/// Returns an error if the target rejects an edit.
pub fn reconcile_set<T, I>(target: &ObservableSet<T>, source: I) -> Result<Edits>
where
    T: Clone + Identity,
    I: IntoIterator<Item = T>,
{
    let mut edits = Edits::default();
    let mut wanted: Vec<T> = Vec::new();

    for item in source {
        if wanted.iter().any(|seen| seen.is_same(&item)) {
            continue;
        }

        if target.add(item.clone()) {
            trace!("add");
            edits.record_insert();
        }

        wanted.push(item);
    }

    for member in target.to_vec() {
        if !wanted.iter().any(|item| item.is_same(&member)) {
            trace!("discard");
            target.remove(&member)?;
            edits.record_delete();
        }
    }

    debug!(
        inserts = edits.inserts(),
        deletes = edits.deletes(),
        "reconciled set"
    );

    Ok(edits)
}

/// Keeps an [`ObservableSet`] reconciled with items produced from an observable source.
///
/// This is the set counterpart of [`Reconciler`][crate::Reconciler] and binds to its source the
/// same way: every event of the source triggers a pass of [`reconcile_set()`], one pass runs on
/// attach and dropping the reconciler unbinds it.
///
/// # Panics
///
/// Panics if a pass triggered by a source event fails.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use observable::{ObservableList, ObservableSet};
/// use reconcile::SetReconciler;
///
/// let source = ObservableList::from(vec![Rc::new(1), Rc::new(2)]);
/// let target = ObservableSet::new();
///
/// let _reconciler = SetReconciler::attach(source.clone(), target.clone(), |source| {
///     source.to_vec()
/// })
/// .unwrap();
///
/// source.pop();
/// assert_eq!(target.len(), 1);
/// ```
pub struct SetReconciler<S, T>
where
    S: Observable,
{
    binding: Rc<Binding<S, ObservableSet<T>>>,
}

impl<S, T> SetReconciler<S, T>
where
    S: Observable + 'static,
    T: Clone + Identity + 'static,
{
    /// Binds `target` to `source` and runs the first pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the first pass fails. The source is unbound again in that case.
    pub fn attach<F, I>(source: S, target: ObservableSet<T>, producer: F) -> Result<Self>
    where
        F: Fn(&S) -> I + 'static,
        I: IntoIterator<Item = T>,
    {
        let binding = Binding::attach(
            source,
            target,
            Box::new(move |source: &S, target: &ObservableSet<T>| {
                reconcile_set(target, producer(source))
            }),
        )?;

        Ok(Self { binding })
    }
}

impl<S, T> SetReconciler<S, T>
where
    S: Observable,
{
    /// Runs a pass now, regardless of source events.
    ///
    /// # Errors
    ///
    /// Returns an error if the target rejects an edit.
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
    pub fn target(&self) -> &ObservableSet<T> {
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

impl<S, T> fmt::Debug for SetReconciler<S, T>
where
    S: Observable,
{
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetReconciler")
            .field("passes", &self.passes())
            .field("total_edits", &self.total_edits())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::RefCell;

    use observable::{EventKind, ObservableList, SetEvent};

    use super::*;

    fn items(count: u32) -> Vec<Rc<u32>> {
        (0..count).map(Rc::new).collect()
    }

    #[test]
    fn fills_empty_target() {
        let source = items(3);
        let target = ObservableSet::new();

        let edits = reconcile_set(&target, source.clone()).unwrap();

        assert_eq!(edits.inserts(), 3);
        assert!(source.iter().all(|item| target.contains(item)));
    }

    #[test]
    fn unchanged_source_is_a_no_op() {
        let source = items(3);
        let target = ObservableSet::from_iter(source.iter().rev().cloned());
        let events = Rc::new(RefCell::new(0));

        for kind in EventKind::ALL {
            let events = Rc::clone(&events);
            target.subscribe(
                kind,
                Rc::new(move |_: &SetEvent<Rc<u32>>| *events.borrow_mut() += 1),
            );
        }

        let edits = reconcile_set(&target, source).unwrap();

        assert!(edits.is_empty());
        assert_eq!(*events.borrow(), 0);
    }

    #[test]
    fn removes_members_missing_from_source() {
        let all = items(4);
        let target = ObservableSet::from_iter(all[..3].iter().cloned());

        let edits = reconcile_set(
            &target,
            [Rc::clone(&all[1]), Rc::clone(&all[3]), Rc::clone(&all[1])],
        )
        .unwrap();

        assert_eq!(edits.inserts(), 1);
        assert_eq!(edits.deletes(), 2);
        assert_eq!(edits.swaps(), 0);
        assert_eq!(target.len(), 2);
        assert!(target.contains(&all[1]));
        assert!(target.contains(&all[3]));
    }

    #[test]
    fn follows_source_until_dropped() {
        let source = ObservableList::from(items(3));
        let target = ObservableSet::new();

        let reconciler = SetReconciler::attach(source.clone(), target.clone(), |source| {
            source
                .to_vec()
                .into_iter()
                .filter(|item: &Rc<u32>| **item % 2 == 0)
        })
        .unwrap();

        assert_eq!(target.len(), 2);

        source.append(Rc::new(4));
        source.delete(0).unwrap();

        assert_eq!(target.len(), 2);
        assert_eq!(reconciler.passes(), 3);
        assert_eq!(reconciler.total_edits().inserts(), 3);
        assert_eq!(reconciler.total_edits().deletes(), 1);

        drop(reconciler);
        assert_eq!(source.subscription_count(), 0);
    }
}
