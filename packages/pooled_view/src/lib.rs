#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Views that keep one pooled widget per item of an observable collection.
//!
//! [`ListView`] follows an [`ObservableList`][observable::ObservableList] and [`MapView`] follows
//! an [`ObservableMap`][observable::ObservableMap]. Both make their widgets with a
//! [`LocalRecyclePool`][recycle_pool::LocalRecyclePool] and hand them back to it when items go
//! away, so a view over a long-lived, churning collection settles on a fixed set of allocations.
//!
//! Widgets implement [`DataWidget`], a [`Recycle`][recycle_pool::Recycle] type whose arguments
//! are the model it displays.
//!
//! Views only react to the events of their collection. To keep a view in step with some other
//! data, reconcile the collection against that data: items the reconciler retains are never
//! removed from the collection, so their widgets are never recycled either.
//!
//! The package also provides [`Controller`], which routes input commands through a stack of
//! [`Interactive`] targets from the innermost focused element outwards.

mod children;
mod controller;
mod error;
mod list_view;
mod map_view;
mod widget;

pub use controller::*;
pub use error::*;
pub use list_view::*;
pub use map_view::*;
pub use widget::*;
