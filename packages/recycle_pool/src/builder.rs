use crate::{DEFAULT_CAPACITY, LocalRecyclePool, RecyclePool};

/// Builder for creating an instance of [`RecyclePool`].
///
/// # Examples
///
/// ```
/// use recycle_pool::RecyclePool;
///
/// // Default pool.
/// let pool = RecyclePool::builder().build();
///
/// // Keep up to 64 released instances of types registered with the default capacity.
/// let pool = RecyclePool::builder().default_capacity(64).build();
/// ```
#[derive(Debug)]
#[must_use]
pub struct RecyclePoolBuilder {
    default_capacity: usize,
}

impl RecyclePoolBuilder {
    pub(crate) fn new() -> Self {
        Self {
            default_capacity: DEFAULT_CAPACITY,
        }
    }

    /// Sets the free-list capacity applied by
    /// [`register_default()`][RecyclePool::register_default].
    pub fn default_capacity(mut self, capacity: usize) -> Self {
        self.default_capacity = capacity;
        self
    }

    /// Builds the pool with the specified configuration.
    ///
    /// For simple cases, prefer [`RecyclePool::new()`] which is equivalent to
    /// `RecyclePool::builder().build()`.
    #[must_use]
    pub fn build(self) -> RecyclePool {
        RecyclePool::new_inner(self.default_capacity)
    }
}

/// Builder for creating an instance of [`LocalRecyclePool`].
///
/// # Examples
///
/// ```
/// use recycle_pool::LocalRecyclePool;
///
/// let pool = LocalRecyclePool::builder().default_capacity(4).build();
/// ```
#[derive(Debug)]
#[must_use]
pub struct LocalRecyclePoolBuilder {
    default_capacity: usize,
}

impl LocalRecyclePoolBuilder {
    pub(crate) fn new() -> Self {
        Self {
            default_capacity: DEFAULT_CAPACITY,
        }
    }

    /// Sets the free-list capacity applied by
    /// [`register_default()`][LocalRecyclePool::register_default].
    pub fn default_capacity(mut self, capacity: usize) -> Self {
        self.default_capacity = capacity;
        self
    }

    /// Builds a single-threaded pool handle with the specified configuration.
    #[must_use]
    pub fn build(self) -> LocalRecyclePool {
        LocalRecyclePool::from(RecyclePool::new_inner(self.default_capacity))
    }
}
