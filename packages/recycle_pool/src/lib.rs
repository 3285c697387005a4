#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! This package provides [`RecyclePool`], an object pool that keeps one free-list per registered
//! type so that released objects can be handed out again instead of being reallocated.
//!
//! Types opt in by implementing [`Recycle`], which supplies a constructor, a setup hook that
//! revives a released instance with new arguments and a teardown hook that returns an instance
//! to a default, reference-free state.
//!
//! # Features
//!
//! - **Per-type capacity**: each type has its own bound on how many released instances are kept.
//!   Instances released into a full free-list are dropped.
//! - **Last in, first out**: `make()` reuses the most recently released instance.
//! - **Stable allocations**: instances are boxed and a reused instance keeps its allocation.
//! - **Explicit instances**: there is no global pool. Construct one and pass it (or a
//!   [`LocalRecyclePool`] handle) to whatever needs it.
//! - **Usage counters**: [`PoolStats`] tells how many instances were created, reused, recycled
//!   and discarded per type.
//!
//! # Example
//!
//! ```rust
//! use recycle_pool::{LocalRecyclePool, Recycle};
//!
//! #[derive(Debug)]
//! struct Widget {
//!     title: String,
//! }
//!
//! impl Recycle for Widget {
//!     type Args = String;
//!
//!     fn create(title: String) -> Self {
//!         Self { title }
//!     }
//!
//!     fn setup(&mut self, title: String) {
//!         self.title = title;
//!     }
//!
//!     fn teardown(&mut self) {
//!         self.title.clear();
//!     }
//! }
//!
//! let pool = LocalRecyclePool::new();
//! pool.register::<Widget>(2);
//!
//! let widget = pool.make::<Widget>("inbox".to_string()).unwrap();
//! assert_eq!(widget.title, "inbox");
//!
//! pool.recycle(widget).unwrap();
//! assert_eq!(pool.free_len::<Widget>().unwrap(), 1);
//!
//! let widget = pool.make::<Widget>("archive".to_string()).unwrap();
//! assert_eq!(widget.title, "archive");
//! assert_eq!(pool.stats::<Widget>().unwrap().reused(), 1);
//! ```

mod builder;
mod error;
mod local_pool;
mod pool;
mod recycle;
mod stats;

pub use builder::*;
pub use error::*;
pub use local_pool::*;
pub use pool::*;
pub use recycle::*;
pub use stats::*;
