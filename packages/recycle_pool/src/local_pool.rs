use std::cell::RefCell;
use std::rc::Rc;

use crate::{LocalRecyclePoolBuilder, PoolStats, Recycle, RecyclePool, Result};

/// A single-threaded, cloneable handle to a shared [`RecyclePool`].
///
/// Every clone refers to the same pool, so one pool constructed at startup can be handed to
/// every view and collection that needs one.
///
/// Constructors and the [`Recycle`] hooks run outside of the internal borrow of the pool, so a
/// hook may itself make or recycle other pooled objects through the same handle.
///
/// # Single-threaded design
///
/// This type is neither [`Send`] nor [`Sync`].
///
/// # Example
///
/// ```rust
/// use recycle_pool::{LocalRecyclePool, Recycle};
///
/// struct Cell(char);
///
/// impl Recycle for Cell {
///     type Args = char;
///
///     fn create(c: char) -> Self {
///         Self(c)
///     }
///
///     fn setup(&mut self, c: char) {
///         self.0 = c;
///     }
///
///     fn teardown(&mut self) {
///         self.0 = ' ';
///     }
/// }
///
/// let pool = LocalRecyclePool::new();
/// pool.register::<Cell>(8);
///
/// let for_view = pool.clone();
/// let cell = for_view.make::<Cell>('x').unwrap();
/// for_view.recycle(cell).unwrap();
///
/// assert_eq!(pool.free_len::<Cell>().unwrap(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct LocalRecyclePool {
    inner: Rc<RefCell<RecyclePool>>,
}

impl From<RecyclePool> for LocalRecyclePool {
    fn from(pool: RecyclePool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(pool)),
        }
    }
}

impl LocalRecyclePool {
    /// Creates a new pool handle with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from(RecyclePool::new())
    }

    /// Returns a builder for creating a [`LocalRecyclePool`] with custom configuration.
    pub fn builder() -> LocalRecyclePoolBuilder {
        LocalRecyclePoolBuilder::new()
    }

    /// See [`RecyclePool::default_capacity()`].
    #[must_use]
    pub fn default_capacity(&self) -> usize {
        self.inner.borrow().default_capacity()
    }

    /// See [`RecyclePool::register()`].
    pub fn register<T: Recycle>(&self, capacity: usize) {
        self.inner.borrow_mut().register::<T>(capacity);
    }

    /// See [`RecyclePool::register_default()`].
    pub fn register_default<T: Recycle>(&self) {
        self.inner.borrow_mut().register_default::<T>();
    }

    /// See [`RecyclePool::register_with()`].
    pub fn register_with<T: Recycle>(&self, constructor: fn(T::Args) -> T, capacity: usize) {
        self.inner
            .borrow_mut()
            .register_with::<T>(constructor, capacity);
    }

    /// See [`RecyclePool::set_capacity()`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`][crate::Error::UnregisteredType] if `T` was never
    /// registered.
    pub fn set_capacity<T: Recycle>(&self, capacity: usize) -> Result<()> {
        self.inner.borrow_mut().set_capacity::<T>(capacity)
    }

    /// See [`RecyclePool::make()`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`][crate::Error::UnregisteredType] if `T` was never
    /// registered.
    pub fn make<T: Recycle>(&self, args: T::Args) -> Result<Box<T>> {
        let free = self.inner.borrow_mut().take_free::<T>()?;

        if let Some(mut instance) = free {
            instance.setup(args);
            return Ok(instance);
        }

        let constructor = self.inner.borrow_mut().constructor::<T>()?;
        Ok(Box::new(constructor(args)))
    }

    /// See [`RecyclePool::recycle()`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`][crate::Error::UnregisteredType] if `T` was never
    /// registered. The instance is dropped.
    pub fn recycle<T: Recycle>(&self, mut instance: Box<T>) -> Result<()> {
        self.inner.borrow().ensure_registered::<T>()?;
        instance.teardown();
        self.inner.borrow_mut().accept(instance)
    }

    /// See [`RecyclePool::is_registered()`].
    #[must_use]
    pub fn is_registered<T: Recycle>(&self) -> bool {
        self.inner.borrow().is_registered::<T>()
    }

    /// See [`RecyclePool::free_len()`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`][crate::Error::UnregisteredType] if `T` was never
    /// registered.
    pub fn free_len<T: Recycle>(&self) -> Result<usize> {
        self.inner.borrow().free_len::<T>()
    }

    /// See [`RecyclePool::capacity()`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`][crate::Error::UnregisteredType] if `T` was never
    /// registered.
    pub fn capacity<T: Recycle>(&self) -> Result<usize> {
        self.inner.borrow().capacity::<T>()
    }

    /// See [`RecyclePool::stats()`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredType`][crate::Error::UnregisteredType] if `T` was never
    /// registered.
    pub fn stats<T: Recycle>(&self) -> Result<PoolStats> {
        self.inner.borrow().stats::<T>()
    }

    /// See [`RecyclePool::clear()`].
    pub fn clear(&self) {
        // Destructors of the released instances run after the borrow ends.
        let drained = self.inner.borrow_mut().drain_free();
        drop(drained);
    }
}

impl Default for LocalRecyclePool {
    fn default() -> Self {
        Self::new()
    }
}
