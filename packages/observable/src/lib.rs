#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Collections that announce every mutation to their subscribers.
//!
//! [`ObservableList`] is an ordered, double-ended sequence, [`ObservableMap`] is a keyed
//! collection with an explicit key order and [`ObservableSet`] holds distinct items without
//! positions. All are cloneable single-threaded handles implementing [`Observable`], the seam
//! through which views and reconcilers react to changes.
//!
//! Every mutating call dispatches exactly one event, synchronously, before it returns:
//!
//! | Kind     | Dispatched by                                                    |
//! |----------|------------------------------------------------------------------|
//! | `Insert` | `insert`, `append`, `push_front`, map `set` of a new key, set `add` |
//! | `Remove` | `delete`, `pop`, `pop_front`, `remove_item`, map `delete`, set `discard` |
//! | `Set`    | `set`                                                            |
//! | `Swap`   | `swap`                                                           |
//! | `Clear`  | `clear`                                                          |
//! | `Update` | `extend`, `sort_by`, `reverse`, `replace_all`, `refresh`, map `update`, set operators |
//!
//! Positions in events always address storage order: an inserted item is at the reported index
//! and a removed item was at the reported index.
//!
//! Also provided are [`SubscriptionRegistry`], which makes binding to a source and unbinding
//! from it symmetric, [`Walker`], a cursor over a list, and [`Identity`], the notion of sameness
//! used to find items.
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use observable::{EventKind, MapEvent, Observable, ObservableMap};
//!
//! let map = ObservableMap::from_iter([("x", 1), ("y", 2)]);
//! let removed = Rc::new(RefCell::new(None));
//!
//! let seen = Rc::clone(&removed);
//! map.subscribe(
//!     EventKind::Remove,
//!     Rc::new(move |event: &MapEvent<&str, i32>| {
//!         if let MapEvent::Remove { index, key, .. } = event {
//!             *seen.borrow_mut() = Some((*index, *key));
//!         }
//!     }),
//! );
//!
//! map.delete(&"x").unwrap();
//!
//! assert_eq!(*removed.borrow(), Some((0, "x")));
//! assert_eq!(map.keys(), vec!["y"]);
//! ```

mod error;
mod event;
mod identity;
mod list;
mod map;
mod observable;
mod registry;
mod set;
mod subscribers;
mod walker;

pub use error::*;
pub use event::*;
pub use identity::*;
pub use list::*;
pub use map::*;
pub use observable::*;
pub use registry::*;
pub use set::*;
pub use subscribers::{Handler, SubscriptionToken};
pub use walker::*;
