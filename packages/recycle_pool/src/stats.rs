/// Counters describing how the pool has served one registered type.
///
/// Obtained from [`RecyclePool::stats()`][crate::RecyclePool::stats] or
/// [`LocalRecyclePool::stats()`][crate::LocalRecyclePool::stats].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PoolStats {
    created: u64,
    reused: u64,
    recycled: u64,
    discarded: u64,
}

impl PoolStats {
    /// Number of instances constructed from scratch because the free-list was empty.
    #[must_use]
    pub fn created(&self) -> u64 {
        self.created
    }

    /// Number of instances served from the free-list.
    #[must_use]
    pub fn reused(&self) -> u64 {
        self.reused
    }

    /// Number of released instances that were stored on the free-list.
    #[must_use]
    pub fn recycled(&self) -> u64 {
        self.recycled
    }

    /// Number of released instances that were dropped because the free-list was full.
    #[must_use]
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Total number of instances handed out by `make()`, whether new or reused.
    #[must_use]
    pub fn made(&self) -> u64 {
        self.created
            .checked_add(self.reused)
            .expect("pool counters cannot realistically overflow u64")
    }

    pub(crate) fn record_created(&mut self) {
        self.created = bump(self.created);
    }

    pub(crate) fn record_reused(&mut self) {
        self.reused = bump(self.reused);
    }

    pub(crate) fn record_recycled(&mut self) {
        self.recycled = bump(self.recycled);
    }

    pub(crate) fn record_discarded(&mut self) {
        self.discarded = bump(self.discarded);
    }
}

fn bump(counter: u64) -> u64 {
    counter
        .checked_add(1)
        .expect("pool counters cannot realistically overflow u64")
}
