#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Converges an observable collection on a generated sequence of items.
//!
//! A view over a collection often shows a derived sequence: a filtered subset, a sorted copy or
//! a window of a longer list. Rebuilding the shown collection on every change would destroy and
//! recreate whatever was built for each item. Reconciliation instead edits the shown collection
//! in place, keeping every item that is still wanted.
//!
//! Items are matched by [`Identity`][observable::Identity], not by value.
//!
//! # Flavors
//!
//! * [`reconcile()`] scans a [`ReconcileTarget`] front to back against a source sequence and
//!   inserts, swaps or deletes to converge. [`Reconciler`] re-runs it whenever an observable
//!   source changes.
//! * [`WindowedReconciler`] shows a sliding window of a [`WindowSource`] and scrolls it by
//!   editing only the ends of the target. [`BoundWindowedReconciler`] also follows an
//!   observable source.
//! * [`reconcile_keyed()`] and [`KeyedReconciler`] do the same for an
//!   [`ObservableMap`][observable::ObservableMap].
//! * [`reconcile_set()`] and [`SetReconciler`] do the same for an
//!   [`ObservableSet`][observable::ObservableSet], where only membership matters.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use observable::ObservableList;
//! use reconcile::reconcile;
//!
//! let (a, b, c) = (Rc::new("a"), Rc::new("b"), Rc::new("c"));
//! let target = ObservableList::from(vec![Rc::clone(&a), Rc::clone(&b), Rc::clone(&c)]);
//!
//! let edits = reconcile(&target, [Rc::clone(&c), Rc::clone(&a), Rc::clone(&b)]).unwrap();
//! assert_eq!(target.to_vec(), vec![c, a, b]);
//! assert_eq!(edits.swaps(), 2);
//!
//! // Nothing left to do.
//! let edits = reconcile(&target, target.to_vec()).unwrap();
//! assert!(edits.is_empty());
//! ```

mod binding;
mod edits;
mod error;
mod flat;
mod keyed;
mod set;
mod target;
mod windowed;

pub use edits::*;
pub use error::*;
pub use flat::{Reconciler, reconcile};
pub use keyed::*;
pub use set::*;
pub use target::*;
pub use windowed::*;
