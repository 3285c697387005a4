use std::collections::BTreeSet;
use std::fmt;
use std::mem;
use std::rc::Rc;

use foldhash::{HashMap, HashMapExt};
use tracing::{debug, trace};

use crate::{Error, IdGenerator, Persist, RandomIds, Result, Store};

/// How many identifiers are generated for a new model before giving up, unless configured
/// otherwise.
pub const DEFAULT_ID_ATTEMPTS: usize = 3;

/// Tracks a set of persisted models by identifier and remembers what changed since the last
/// save.
///
/// Models are shared as `Rc<M>`, so the same instances can be placed in observable collections.
/// Models with interior mutability can be edited in place; call
/// [`mark_changed()`][Self::mark_changed] afterwards to include them in the next save.
///
/// The context never touches a [`Store`] except when asked to [`load()`][Self::load] from it or
/// [`save()`][Self::save] to it.
///
/// # Example
///
/// ```rust
/// use data_context::{DataContext, MemoryStore, Persist, RawRecord, Store};
///
/// struct Tag {
///     id: Option<String>,
///     label: String,
/// }
///
/// impl Persist for Tag {
///     fn id(&self) -> Option<&str> {
///         self.id.as_deref()
///     }
///
///     fn set_id(&mut self, id: String) {
///         self.id = Some(id);
///     }
///
///     fn to_record(&self) -> RawRecord {
///         RawRecord::from([("label".to_string(), self.label.clone())])
///     }
///
///     fn from_record(record: &RawRecord) -> Result<Self, String> {
///         let label = record.get("label").ok_or("field 'label' is missing")?;
///
///         Ok(Self {
///             id: None,
///             label: label.clone(),
///         })
///     }
/// }
///
/// let mut context = DataContext::<Tag>::new();
/// let tag = context
///     .put(Tag {
///         id: None,
///         label: "urgent".to_string(),
///     })
///     .unwrap();
///
/// let mut store = MemoryStore::new();
/// context.save(&mut store);
///
/// let id = tag.id().unwrap();
/// assert_eq!(store.get(id).unwrap()["label"], "urgent");
///
/// let mut reloaded = DataContext::<Tag>::new();
/// assert_eq!(reloaded.load(&store).unwrap(), 1);
/// assert_eq!(reloaded.get(id).unwrap().label, "urgent");
/// ```
pub struct DataContext<M, G = RandomIds> {
    models: HashMap<String, Rc<M>>,

    // Identifiers in the order the models were put or loaded.
    order: Vec<String>,

    changed: BTreeSet<String>,
    deleted: BTreeSet<String>,

    ids: G,
    id_attempts: usize,
}

impl DataContext<()> {
    /// Creates a builder for configuring a data context.
    pub fn builder() -> DataContextBuilder<RandomIds> {
        DataContextBuilder::new()
    }
}

impl<M: Persist> DataContext<M> {
    /// Creates an empty context that generates random identifiers.
    #[must_use]
    pub fn new() -> Self {
        DataContext::builder().build()
    }
}

impl<M: Persist> Default for DataContext<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, G> DataContext<M, G>
where
    M: Persist,
    G: IdGenerator,
{
    fn from_parts(ids: G, id_attempts: usize) -> Self {
        Self {
            models: HashMap::new(),
            order: Vec::new(),
            changed: BTreeSet::new(),
            deleted: BTreeSet::new(),
            ids,
            id_attempts,
        }
    }

    /// Starts tracking `model` and marks it changed.
    ///
    /// A model without an identifier is given a new one. A model whose identifier is already
    /// tracked is not added again; the tracked instance is returned instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdentifierCollision`] if every generated identifier was already in use.
    pub fn put(&mut self, mut model: M) -> Result<Rc<M>> {
        let id = match model.id().map(str::to_string) {
            Some(id) => {
                if let Some(existing) = self.models.get(&id) {
                    return Ok(Rc::clone(existing));
                }

                id
            }
            None => {
                let id = self.unused_id()?;
                model.set_id(id.clone());
                id
            }
        };

        let model = Rc::new(model);

        self.deleted.remove(&id);
        self.changed.insert(id.clone());
        self.models.insert(id.clone(), Rc::clone(&model));

        trace!(%id, "model tracked");
        self.order.push(id);

        Ok(model)
    }

    fn unused_id(&mut self) -> Result<String> {
        for _ in 0..self.id_attempts {
            let candidate = self.ids.generate();

            if !self.models.contains_key(&candidate) && !self.deleted.contains(&candidate) {
                return Ok(candidate);
            }

            trace!(%candidate, "identifier already in use");
        }

        Err(Error::IdentifierCollision {
            attempts: self.id_attempts,
        })
    }

    /// The tracked model with identifier `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Rc<M>> {
        self.models.get(id).cloned()
    }

    /// Whether a model with identifier `id` is tracked.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    /// Number of tracked models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether no models are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Identifiers of the tracked models, in the order they were put or loaded.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.order.clone()
    }

    /// The tracked models, in the order they were put or loaded.
    #[must_use]
    pub fn models(&self) -> Vec<Rc<M>> {
        self.order
            .iter()
            .filter_map(|id| self.models.get(id))
            .cloned()
            .collect()
    }

    /// Stops tracking the model with identifier `id`. Its record is removed from the store on
    /// the next save.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such model is tracked.
    pub fn delete(&mut self, id: &str) -> Result<Rc<M>> {
        let model = self.models.remove(id).ok_or_else(|| Error::not_found(id))?;

        self.order.retain(|tracked| tracked != id);
        self.changed.remove(id);
        self.deleted.insert(id.to_string());

        trace!(id, "model deleted");
        Ok(model)
    }

    /// Includes the model with identifier `id` in the next save.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such model is tracked.
    pub fn mark_changed(&mut self, id: &str) -> Result<()> {
        if !self.models.contains_key(id) {
            return Err(Error::not_found(id));
        }

        self.changed.insert(id.to_string());
        Ok(())
    }

    /// Identifiers of the models that will be written on the next save, in sorted order.
    #[must_use]
    pub fn changed_ids(&self) -> Vec<String> {
        self.changed.iter().cloned().collect()
    }

    /// Identifiers of the records that will be removed on the next save, in sorted order.
    #[must_use]
    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted.iter().cloned().collect()
    }

    /// Whether a save would touch the store.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty() || !self.deleted.is_empty()
    }

    /// Writes pending changes to `store`: first the deletions, then the changed models. Both
    /// change sets are empty afterwards.
    pub fn save<S>(&mut self, store: &mut S)
    where
        S: Store + ?Sized,
    {
        let deleted = mem::take(&mut self.deleted);
        let changed = mem::take(&mut self.changed);

        for id in &deleted {
            store.delete(id);
        }

        for id in &changed {
            if let Some(model) = self.models.get(id) {
                store.put(id, model.to_record());
            }
        }

        debug!(
            deleted = deleted.len(),
            written = changed.len(),
            "data context saved"
        );
    }

    /// Starts tracking every record of `store` that is neither tracked already nor pending
    /// deletion. Loaded models are not marked changed.
    ///
    /// Returns how many models were loaded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if a record cannot be decoded. Nothing is loaded in
    /// that case.
    pub fn load<S>(&mut self, store: &S) -> Result<usize>
    where
        S: Store + ?Sized,
    {
        let mut loaded = Vec::new();

        for id in store.keys() {
            if self.models.contains_key(&id) || self.deleted.contains(&id) {
                continue;
            }

            let Some(record) = store.get(&id) else {
                continue;
            };

            let mut model = M::from_record(&record).map_err(|problem| Error::InvalidRecord {
                id: id.clone(),
                problem,
            })?;
            model.set_id(id.clone());

            loaded.push((id, model));
        }

        let count = loaded.len();

        for (id, model) in loaded {
            self.models.insert(id.clone(), Rc::new(model));
            self.order.push(id);
        }

        debug!(count, "data context loaded");
        Ok(count)
    }
}

impl<M, G> fmt::Debug for DataContext<M, G> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataContext")
            .field("models", &self.order)
            .field("changed", &self.changed)
            .field("deleted", &self.deleted)
            .field("id_attempts", &self.id_attempts)
            .finish_non_exhaustive()
    }
}

/// Builder for creating an instance of [`DataContext`].
///
/// # Examples
///
/// ```
/// use data_context::{DataContext, IdGenerator, RawRecord};
/// # use data_context::Persist;
/// # struct Note(Option<String>);
/// # impl Persist for Note {
/// #     fn id(&self) -> Option<&str> { self.0.as_deref() }
/// #     fn set_id(&mut self, id: String) { self.0 = Some(id); }
/// #     fn to_record(&self) -> RawRecord { RawRecord::new() }
/// #     fn from_record(_: &RawRecord) -> Result<Self, String> { Ok(Self(None)) }
/// # }
///
/// struct Sequential(u64);
///
/// impl IdGenerator for Sequential {
///     fn generate(&mut self) -> String {
///         self.0 += 1;
///         format!("note-{}", self.0)
///     }
/// }
///
/// let mut context: DataContext<Note, Sequential> = DataContext::builder()
///     .id_generator(Sequential(0))
///     .id_attempts(1)
///     .build();
///
/// let note = context.put(Note(None)).unwrap();
/// assert_eq!(note.id(), Some("note-1"));
/// ```
#[derive(Debug)]
#[must_use]
pub struct DataContextBuilder<G> {
    ids: G,
    id_attempts: usize,
}

impl DataContextBuilder<RandomIds> {
    pub(crate) fn new() -> Self {
        Self {
            ids: RandomIds::new(),
            id_attempts: DEFAULT_ID_ATTEMPTS,
        }
    }
}

impl<G: IdGenerator> DataContextBuilder<G> {
    /// Sets the source of identifiers for new models.
    pub fn id_generator<G2: IdGenerator>(self, ids: G2) -> DataContextBuilder<G2> {
        DataContextBuilder {
            ids,
            id_attempts: self.id_attempts,
        }
    }

    /// Sets how many identifiers are generated for a new model before
    /// [`put()`][DataContext::put] gives up. At least one attempt is always made.
    pub fn id_attempts(mut self, attempts: usize) -> Self {
        self.id_attempts = attempts.max(1);
        self
    }

    /// Builds the context with the specified configuration.
    #[must_use]
    pub fn build<M: Persist>(self) -> DataContext<M, G> {
        DataContext::from_parts(self.ids, self.id_attempts)
    }
}
