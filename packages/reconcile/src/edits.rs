use std::ops::AddAssign;

/// Counts of the edits one or more reconciliation passes applied to a target.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Edits {
    inserts: usize,
    sets: usize,
    swaps: usize,
    deletes: usize,
}

impl Edits {
    /// Number of items inserted.
    #[must_use]
    pub fn inserts(&self) -> usize {
        self.inserts
    }

    /// Number of items replaced in place. Only keyed reconciliation replaces items.
    #[must_use]
    pub fn sets(&self) -> usize {
        self.sets
    }

    /// Number of swaps performed.
    #[must_use]
    pub fn swaps(&self) -> usize {
        self.swaps
    }

    /// Number of items deleted.
    #[must_use]
    pub fn deletes(&self) -> usize {
        self.deletes
    }

    /// Total number of edits of any kind.
    #[must_use]
    pub fn total(&self) -> usize {
        self.inserts
            .saturating_add(self.sets)
            .saturating_add(self.swaps)
            .saturating_add(self.deletes)
    }

    /// Whether the target was left untouched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub(crate) fn record_insert(&mut self) {
        self.inserts = self.inserts.saturating_add(1);
    }

    pub(crate) fn record_set(&mut self) {
        self.sets = self.sets.saturating_add(1);
    }

    pub(crate) fn record_swap(&mut self) {
        self.swaps = self.swaps.saturating_add(1);
    }

    pub(crate) fn record_delete(&mut self) {
        self.deletes = self.deletes.saturating_add(1);
    }
}

impl AddAssign for Edits {
    fn add_assign(&mut self, rhs: Self) {
        self.inserts = self.inserts.saturating_add(rhs.inserts);
        self.sets = self.sets.saturating_add(rhs.sets);
        self.swaps = self.swaps.saturating_add(rhs.swaps);
        self.deletes = self.deletes.saturating_add(rhs.deletes);
    }
}
