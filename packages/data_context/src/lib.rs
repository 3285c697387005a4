#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Identifier assignment, change tracking and selection for models that outlive the program.
//!
//! A [`DataContext`] owns the in-memory set of models of one kind. It gives new models unique
//! identifiers, remembers which models changed or were deleted, and talks to a [`Store`] only
//! when loading or saving. Models describe their stored form through [`Persist`].
//!
//! [`Selector`] tracks which models the user has selected, in single or multi mode, and exposes
//! the selection as an [`ObservableList`][observable::ObservableList].
//!
//! # Identifiers
//!
//! By default, identifiers are 128 random bits rendered as 32 lowercase hexadecimal digits
//! ([`RandomIds`]). A generated identifier that is already in use is discarded and another is
//! generated, up to a configurable number of attempts (see [`DataContextBuilder`]).
//!
//! # Example
//!
//! ```rust
//! use data_context::{DataContext, MemoryStore, Persist, RawRecord};
//!
//! struct Task {
//!     id: Option<String>,
//!     title: String,
//! }
//!
//! impl Persist for Task {
//!     fn id(&self) -> Option<&str> {
//!         self.id.as_deref()
//!     }
//!
//!     fn set_id(&mut self, id: String) {
//!         self.id = Some(id);
//!     }
//!
//!     fn to_record(&self) -> RawRecord {
//!         RawRecord::from([("title".to_string(), self.title.clone())])
//!     }
//!
//!     fn from_record(record: &RawRecord) -> Result<Self, String> {
//!         let title = record.get("title").ok_or("field 'title' is missing")?;
//!
//!         Ok(Self {
//!             id: None,
//!             title: title.clone(),
//!         })
//!     }
//! }
//!
//! let mut tasks = DataContext::<Task>::new();
//! let task = tasks
//!     .put(Task {
//!         id: None,
//!         title: "Water the plants".to_string(),
//!     })
//!     .unwrap();
//!
//! assert_eq!(task.id().unwrap().len(), 32);
//! assert_eq!(tasks.changed_ids(), vec![task.id().unwrap().to_string()]);
//!
//! let mut store = MemoryStore::new();
//! tasks.save(&mut store);
//!
//! assert_eq!(store.len(), 1);
//! assert!(tasks.changed_ids().is_empty());
//! ```

mod context;
mod error;
mod ids;
mod persist;
mod selector;
mod store;

pub use context::*;
pub use error::*;
pub use ids::*;
pub use persist::*;
pub use selector::*;
pub use store::*;
