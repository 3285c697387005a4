use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use foldhash::{HashSet, HashSetExt};
use observable::{Identity, Observable, ObservableMap};
use tracing::{debug, trace};

use crate::binding::Binding;
use crate::{Edits, Result};

/// Edits `target` until it holds exactly the key-item pairs of `source`.
///
/// * Keys missing from the target are inserted, in source order.
/// * Keys whose item in the target is not the same item as in the source are set.
/// * Target keys absent from the source are deleted, last first in key order.
///
/// Keys that are present in both keep their position in the key order.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use observable::ObservableMap;
/// use reconcile::reconcile_keyed;
///
/// let kept = Rc::new("kept");
/// let target = ObservableMap::from_iter([("a", Rc::clone(&kept)), ("b", Rc::new("gone"))]);
///
/// let edits = reconcile_keyed(&target, [("c", Rc::new("new")), ("a", kept)]).unwrap();
///
/// assert_eq!(target.keys(), vec!["a", "c"]);
/// assert_eq!(edits.inserts(), 1);
/// assert_eq!(edits.deletes(), 1);
/// ```
///
/// # Errors
///
/// Returns an error if the target rejects an edit.
pub fn reconcile_keyed<K, V, I>(target: &ObservableMap<K, V>, source: I) -> Result<Edits>
where
    K: Clone + Eq + Hash + fmt::Debug,
    V: Clone + Identity,
    I: IntoIterator<Item = (K, V)>,
{
    let mut edits = Edits::default();
    let mut wanted = HashSet::new();

    for (key, item) in source {
        match target.get(&key) {
            Ok(current) if current.is_same(&item) => {}
            Ok(_) => {
                trace!(?key, "set");
                target.set(key.clone(), item);
                edits.record_set();
            }
            Err(_) => {
                trace!(?key, "insert");
                target.set(key.clone(), item);
                edits.record_insert();
            }
        }

        wanted.insert(key);
    }

    for key in target.keys().iter().rev() {
        if !wanted.contains(key) {
            trace!(?key, "delete");
            target.delete(key)?;
            edits.record_delete();
        }
    }

    debug!(
        inserts = edits.inserts(),
        sets = edits.sets(),
        deletes = edits.deletes(),
        "reconciled keyed"
    );

    Ok(edits)
}

/// Keeps an [`ObservableMap`] reconciled with key-item pairs produced from an observable source.
///
/// This is the keyed counterpart of [`Reconciler`][crate::Reconciler] and binds to its source
/// the same way: every event of the source triggers a pass of [`reconcile_keyed()`], one pass
/// runs on attach and dropping the reconciler unbinds it.
///
/// # Panics
///
/// Panics if a pass triggered by a source event fails.
pub struct KeyedReconciler<S, K, V>
where
    S: Observable,
{
    binding: Rc<Binding<S, ObservableMap<K, V>>>,
}

impl<S, K, V> KeyedReconciler<S, K, V>
where
    S: Observable + 'static,
    K: Clone + Eq + Hash + fmt::Debug + 'static,
    V: Clone + Identity + 'static,
{
    /// Binds `target` to `source` and runs the first pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the first pass fails. The source is unbound again in that case.
    pub fn attach<F, I>(source: S, target: ObservableMap<K, V>, producer: F) -> Result<Self>
    where
        F: Fn(&S) -> I + 'static,
        I: IntoIterator<Item = (K, V)>,
    {
        let binding = Binding::attach(
            source,
            target,
            Box::new(move |source: &S, target: &ObservableMap<K, V>| {
                reconcile_keyed(target, producer(source))
            }),
        )?;

        Ok(Self { binding })
    }
}

impl<S, K, V> KeyedReconciler<S, K, V>
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
    pub fn target(&self) -> &ObservableMap<K, V> {
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

impl<S, K, V> fmt::Debug for KeyedReconciler<S, K, V>
where
    S: Observable,
{
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedReconciler")
            .field("passes", &self.passes())
            .field("total_edits", &self.total_edits())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::RefCell;

    use observable::{EventKind, MapEvent, ObservableList};

    use super::*;

    #[test]
    fn keeps_identical_items_untouched() {
        let one = Rc::new(1);
        let target = ObservableMap::from_iter([("a", Rc::clone(&one))]);

        let edits = reconcile_keyed(&target, [("a", Rc::clone(&one))]).unwrap();

        assert!(edits.is_empty());
    }

    #[test]
    fn equal_but_different_item_is_set_in_place() {
        let target = ObservableMap::from_iter([("a", Rc::new(1)), ("b", Rc::new(2))]);
        let replacement = Rc::new(1);

        let edits = reconcile_keyed(
            &target,
            [("a", Rc::clone(&replacement)), ("b", target.get(&"b").unwrap())],
        )
        .unwrap();

        assert_eq!(edits.sets(), 1);
        assert_eq!(edits.total(), 1);
        assert!(Rc::ptr_eq(&target.get(&"a").unwrap(), &replacement));
        assert_eq!(target.keys(), vec!["a", "b"]);
    }

    #[test]
    fn deletes_in_reverse_key_order() {
        let target = ObservableMap::from_iter([
            ("a", Rc::new(1)),
            ("b", Rc::new(2)),
            ("c", Rc::new(3)),
        ]);
        let deleted = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&deleted);
        target.subscribe(
            EventKind::Remove,
            Rc::new(move |event: &MapEvent<&'static str, Rc<i32>>| {
                if let MapEvent::Remove { index, key, .. } = event {
                    log.borrow_mut().push((*index, *key));
                }
            }),
        );

        let b = target.get(&"b").unwrap();
        reconcile_keyed(&target, [("b", b)]).unwrap();

        assert_eq!(*deleted.borrow(), vec![(2, "c"), (0, "a")]);
        assert_eq!(target.keys(), vec!["b"]);
    }

    #[test]
    fn follows_source_until_dropped() {
        let source = ObservableList::from(vec![Rc::new(10), Rc::new(20)]);
        let target = ObservableMap::new();

        let reconciler = KeyedReconciler::attach(source.clone(), target.clone(), |source| {
            source
                .to_vec()
                .into_iter()
                .map(|item: Rc<u32>| (*item, item))
        })
        .unwrap();

        assert_eq!(target.keys(), vec![10, 20]);

        source.delete(0).unwrap();
        source.append(Rc::new(30));
        assert_eq!(target.keys(), vec![20, 30]);
        assert_eq!(reconciler.passes(), 3);

        drop(reconciler);
        assert_eq!(source.subscription_count(), 0);
    }
}
