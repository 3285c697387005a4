use std::any::{Any, TypeId, type_name};
use std::fmt;

use foldhash::{HashMap, HashMapExt};
use tracing::{debug, trace};

use crate::{Error, PoolStats, Recycle, RecyclePoolBuilder, Result};

/// Free-list capacity used by [`RecyclePool::register_default()`] unless the builder says
/// otherwise.
pub const DEFAULT_CAPACITY: usize = 10;

/// An object pool with one free-list per registered type.
///
/// Types are registered once, together with the maximum number of released instances the pool
/// keeps around for them. [`make()`][Self::make] hands out the most recently released instance
/// of the requested type, or constructs a new one when there is none. [`recycle()`][Self::recycle]
/// tears an instance down and keeps it for the next `make()` if its free-list has room.
///
/// Instances are handed out boxed. A reused instance keeps the heap allocation it had before it
/// was recycled, which is the whole point of pooling it.
///
/// For a cloneable single-threaded handle that can be injected into many consumers, use
/// [`LocalRecyclePool`][crate::LocalRecyclePool].
///
/// # Example
///
/// ```rust
/// use recycle_pool::{Recycle, RecyclePool};
///
/// #[derive(Debug)]
/// struct Row {
///     value: u32,
/// }
///
/// impl Recycle for Row {
///     type Args = u32;
///
///     fn create(value: u32) -> Self {
///         Self { value }
///     }
///
///     fn setup(&mut self, value: u32) {
///         self.value = value;
///     }
///
///     fn teardown(&mut self) {
///         self.value = 0;
///     }
/// }
///
/// let mut pool = RecyclePool::new();
/// pool.register::<Row>(4);
///
/// let row = pool.make::<Row>(7).unwrap();
/// let address = &raw const *row;
/// pool.recycle(row).unwrap();
///
/// // The released instance comes back, set up with the new arguments.
/// let row = pool.make::<Row>(9).unwrap();
/// assert_eq!(row.value, 9);
/// assert!(std::ptr::eq(address, &raw const *row));
/// ```
///
/// # Thread safety
///
/// The pool stores type-erased instances that are not required to be [`Send`], so the pool
/// itself is neither [`Send`] nor [`Sync`]. Each thread that needs pooling owns its own pool.
pub struct RecyclePool {
    /// One slot per registered type. We use foldhash for better performance with small tables.
    slots: HashMap<TypeId, TypeSlot>,

    /// Capacity applied by `register_default()`.
    default_capacity: usize,
}

struct TypeSlot {
    type_name: &'static str,

    /// A `fn(T::Args) -> T` for the type this slot is keyed by.
    constructor: Box<dyn Any>,

    capacity: usize,

    /// Released instances, each a `Box<T>` erased to `Box<dyn Any>`. Last in, first out.
    free: Vec<Box<dyn Any>>,

    stats: PoolStats,
}

impl TypeSlot {
    fn trim(&mut self) {
        if self.free.len() > self.capacity {
            trace!(
                type_name = self.type_name,
                dropped = self.free.len().saturating_sub(self.capacity),
                "trimming free-list to new capacity"
            );
            self.free.truncate(self.capacity);
        }
    }
}

impl RecyclePool {
    /// Creates a new pool with default configuration and no registered types.
    ///
    /// For custom configuration, use [`RecyclePool::builder()`].
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for configuring and constructing a [`RecyclePool`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycle_pool::RecyclePool;
    ///
    /// let pool = RecyclePool::builder().default_capacity(32).build();
    /// assert_eq!(pool.default_capacity(), 32);
    /// ```
    pub fn builder() -> RecyclePoolBuilder {
        RecyclePoolBuilder::new()
    }

    #[must_use]
    pub(crate) fn new_inner(default_capacity: usize) -> Self {
        Self {
            slots: HashMap::new(),
            default_capacity,
        }
    }

    /// The free-list capacity that [`register_default()`][Self::register_default] applies.
    #[must_use]
    pub fn default_capacity(&self) -> usize {
        self.default_capacity
    }

    /// Registers `T` with its own [`Recycle::create()`] as the constructor.
    ///
    /// Registering an already registered type replaces its constructor and capacity. If the
    /// capacity shrank, surplus free instances are dropped immediately.
    pub fn register<T: Recycle>(&mut self, capacity: usize) {
        self.register_with::<T>(T::create, capacity);
    }

    /// Registers `T` with the pool's default capacity.
    pub fn register_default<T: Recycle>(&mut self) {
        self.register::<T>(self.default_capacity);
    }

    /// Registers `T` with a custom constructor.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycle_pool::{Recycle, RecyclePool};
    ///
    /// struct Counter(u32);
    ///
    /// impl Recycle for Counter {
    ///     type Args = u32;
    ///
    ///     fn create(start: u32) -> Self {
    ///         Self(start)
    ///     }
    ///
    ///     fn setup(&mut self, start: u32) {
    ///         self.0 = start;
    ///     }
    ///
    ///     fn teardown(&mut self) {
    ///         self.0 = 0;
    ///     }
    /// }
    ///
    /// let mut pool = RecyclePool::new();
    /// pool.register_with::<Counter>(|start| Counter(start * 10), 2);
    ///
    /// assert_eq!(pool.make::<Counter>(3).unwrap().0, 30);
    /// ```
    pub fn register_with<T: Recycle>(&mut self, constructor: fn(T::Args) -> T, capacity: usize) {
        debug!(type_name = type_name::<T>(), capacity, "registering pooled type");

        let slot = self
            .slots
            .entry(TypeId::of::<T>())
            .or_insert_with(|| TypeSlot {
                type_name: type_name::<T>(),
                constructor: Box::new(constructor),
                capacity,
                free: Vec::new(),
                stats: PoolStats::default(),
            });

        slot.constructor = Box::new(constructor);
        slot.capacity = capacity;
        slot.trim();
    }

    /// Changes how many released instances of `T` the pool keeps.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`] if `T` was never registered.
    pub fn set_capacity<T: Recycle>(&mut self, capacity: usize) -> Result<()> {
        let slot = self.slot_mut::<T>()?;
        slot.capacity = capacity;
        slot.trim();
        Ok(())
    }

    /// Returns an instance of `T` initialized with `args`.
    ///
    /// The most recently recycled instance is reused if there is one, after applying
    /// [`Recycle::setup()`] to it. Otherwise a new instance is constructed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`] if `T` was never registered.
    pub fn make<T: Recycle>(&mut self, args: T::Args) -> Result<Box<T>> {
        if let Some(mut instance) = self.take_free::<T>()? {
            instance.setup(args);
            return Ok(instance);
        }

        let constructor = self.constructor::<T>()?;
        Ok(Box::new(constructor(args)))
    }

    /// Tears `instance` down and keeps it for reuse if the free-list of its type has room.
    ///
    /// If the free-list is already at capacity the instance is dropped.
    ///
    /// The caller must not keep using state that the instance still points at after this call;
    /// the pool assumes it has exclusive ownership of every released instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`] if `T` was never registered. The instance is dropped.
    pub fn recycle<T: Recycle>(&mut self, mut instance: Box<T>) -> Result<()> {
        self.ensure_registered::<T>()?;
        instance.teardown();
        self.accept(instance)
    }

    /// Whether `T` has been registered.
    #[must_use]
    pub fn is_registered<T: Recycle>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<T>())
    }

    /// Number of released instances of `T` currently waiting for reuse.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`] if `T` was never registered.
    pub fn free_len<T: Recycle>(&self) -> Result<usize> {
        Ok(self.slot::<T>()?.free.len())
    }

    /// Maximum number of released instances of `T` the pool keeps.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`] if `T` was never registered.
    pub fn capacity<T: Recycle>(&self) -> Result<usize> {
        Ok(self.slot::<T>()?.capacity)
    }

    /// Usage counters for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`] if `T` was never registered.
    pub fn stats<T: Recycle>(&self) -> Result<PoolStats> {
        Ok(self.slot::<T>()?.stats)
    }

    /// Drops every free instance of every type. Registrations and counters are kept.
    pub fn clear(&mut self) {
        for slot in self.slots.values_mut() {
            slot.free.clear();
        }
    }

    pub(crate) fn drain_free(&mut self) -> Vec<Box<dyn Any>> {
        self.slots
            .values_mut()
            .flat_map(|slot| slot.free.drain(..))
            .collect()
    }

    /// Pops the most recently released instance of `T`, if any.
    ///
    /// Setup is left to the caller so that it can run outside of any borrow of the pool.
    pub(crate) fn take_free<T: Recycle>(&mut self) -> Result<Option<Box<T>>> {
        let slot = self.slot_mut::<T>()?;

        let Some(erased) = slot.free.pop() else {
            return Ok(None);
        };

        slot.stats.record_reused();
        trace!(type_name = slot.type_name, "reusing recycled instance");

        let instance = erased
            .downcast::<T>()
            .expect("free-lists are keyed by TypeId so every entry is of the slot's type");

        Ok(Some(instance))
    }

    /// Returns the constructor of `T`, counting the construction it is about to be used for.
    pub(crate) fn constructor<T: Recycle>(&mut self) -> Result<fn(T::Args) -> T> {
        let slot = self.slot_mut::<T>()?;

        slot.stats.record_created();
        trace!(type_name = slot.type_name, "constructing new instance");

        Ok(*slot
            .constructor
            .downcast_ref::<fn(T::Args) -> T>()
            .expect("constructors are keyed by TypeId so every entry is of the slot's type"))
    }

    /// Stores an instance that has already been torn down, or drops it if the free-list is full.
    pub(crate) fn accept<T: Recycle>(&mut self, instance: Box<T>) -> Result<()> {
        let slot = self.slot_mut::<T>()?;

        if slot.free.len() < slot.capacity {
            slot.stats.record_recycled();
            trace!(type_name = slot.type_name, "storing recycled instance");
            slot.free.push(instance);
        } else {
            slot.stats.record_discarded();
            trace!(type_name = slot.type_name, "free-list full, discarding instance");
        }

        Ok(())
    }

    pub(crate) fn ensure_registered<T: Recycle>(&self) -> Result<()> {
        self.slot::<T>().map(|_| ())
    }

    fn slot<T: Recycle>(&self) -> Result<&TypeSlot> {
        self.slots
            .get(&TypeId::of::<T>())
            .ok_or(Error::UnregisteredType {
                type_name: type_name::<T>(),
            })
    }

    fn slot_mut<T: Recycle>(&mut self) -> Result<&mut TypeSlot> {
        self.slots
            .get_mut(&TypeId::of::<T>())
            .ok_or(Error::UnregisteredType {
                type_name: type_name::<T>(),
            })
    }
}

impl Default for RecyclePool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecyclePool {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types = f.debug_map();

        for slot in self.slots.values() {
            types.entry(
                &slot.type_name,
                &format_args!("{}/{} free", slot.free.len(), slot.capacity),
            );
        }

        types.finish()
    }
}
