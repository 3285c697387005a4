/// The kinds of change an observable collection announces.
///
/// Each kind owns one slot in a collection's subscriber table. Subscribers register per kind and
/// are called only for events of that kind.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[expect(
    clippy::exhaustive_enums,
    reason = "subscribers are expected to handle every kind; a new kind is a breaking change"
)]
pub enum EventKind {
    /// An item was added at a position.
    Insert,

    /// An item was removed from a position.
    Remove,

    /// The item at a position was replaced.
    Set,

    /// The items at two positions traded places.
    Swap,

    /// All items were removed.
    Clear,

    /// An arbitrary bulk change happened; subscribers must rebuild from the current contents.
    Update,
}

impl EventKind {
    /// Number of event kinds, which is also the size of a subscriber table.
    pub const COUNT: usize = 6;

    /// Every kind, in the order in which bindings are established.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Insert,
        Self::Remove,
        Self::Set,
        Self::Swap,
        Self::Clear,
        Self::Update,
    ];

    /// Position of this kind in a subscriber table.
    #[must_use]
    pub const fn slot(self) -> usize {
        self as usize
    }

    /// Whether events of this kind change the length of the collection.
    #[must_use]
    pub const fn changes_len(self) -> bool {
        matches!(self, Self::Insert | Self::Remove | Self::Clear | Self::Update)
    }
}

/// An event that knows its own [`EventKind`].
pub trait Event {
    /// The kind used to select which subscribers receive this event.
    fn kind(&self) -> EventKind;
}

/// A change to an [`ObservableList`][crate::ObservableList].
///
/// Indices address the list in storage order. For `Insert` the index is where the item now is;
/// for `Remove` it is where the item was before it was removed.
#[derive(Clone, Debug)]
#[expect(
    clippy::exhaustive_enums,
    reason = "mirrors EventKind, which is exhaustive on purpose"
)]
pub enum ListEvent<T> {
    /// `item` was inserted at `index`.
    Insert {
        /// Position of the new item.
        index: usize,
        /// The new item.
        item: T,
    },

    /// `item` was removed from `index`.
    Remove {
        /// Position the item occupied.
        index: usize,
        /// The removed item.
        item: T,
    },

    /// The item at `index` was replaced by `item`.
    Set {
        /// Position of the replaced item.
        index: usize,
        /// The new item.
        item: T,
    },

    /// The items at `a` and `b` traded places.
    Swap {
        /// First position.
        a: usize,
        /// Second position.
        b: usize,
    },

    /// The list was emptied.
    Clear,

    /// The list changed in bulk.
    Update,
}

impl<T> Event for ListEvent<T> {
    fn kind(&self) -> EventKind {
        match self {
            Self::Insert { .. } => EventKind::Insert,
            Self::Remove { .. } => EventKind::Remove,
            Self::Set { .. } => EventKind::Set,
            Self::Swap { .. } => EventKind::Swap,
            Self::Clear => EventKind::Clear,
            Self::Update => EventKind::Update,
        }
    }
}

/// A change to an [`ObservableMap`][crate::ObservableMap].
///
/// Indices are positions in the map's key order, following the same storage-order convention as
/// [`ListEvent`].
#[derive(Clone, Debug)]
#[expect(
    clippy::exhaustive_enums,
    reason = "mirrors EventKind, which is exhaustive on purpose"
)]
pub enum MapEvent<K, V> {
    /// A new `key` was added at `index`.
    Insert {
        /// Position of the new key.
        index: usize,
        /// The new key.
        key: K,
        /// The new item.
        item: V,
    },

    /// `key` was removed from `index`.
    Remove {
        /// Position the key occupied.
        index: usize,
        /// The removed key.
        key: K,
        /// The removed item.
        item: V,
    },

    /// The item of an existing `key` was replaced.
    Set {
        /// Position of the key.
        index: usize,
        /// The key.
        key: K,
        /// The new item.
        item: V,
    },

    /// The keys at positions `a` and `b` traded places.
    Swap {
        /// First position.
        a: usize,
        /// Second position.
        b: usize,
    },

    /// The map was emptied.
    Clear,

    /// The map changed in bulk.
    Update,
}

impl<K, V> Event for MapEvent<K, V> {
    fn kind(&self) -> EventKind {
        match self {
            Self::Insert { .. } => EventKind::Insert,
            Self::Remove { .. } => EventKind::Remove,
            Self::Set { .. } => EventKind::Set,
            Self::Swap { .. } => EventKind::Swap,
            Self::Clear => EventKind::Clear,
            Self::Update => EventKind::Update,
        }
    }
}

/// A change to an [`ObservableSet`][crate::ObservableSet].
///
/// Sets have no positions, so only the affected item is reported. Adding and discarding map to
/// [`EventKind::Insert`] and [`EventKind::Remove`]; a set never dispatches `Set` or `Swap`.
#[derive(Clone, Debug)]
#[expect(
    clippy::exhaustive_enums,
    reason = "covers every EventKind a set can dispatch"
)]
pub enum SetEvent<T> {
    /// `item` was added.
    Add {
        /// The new item.
        item: T,
    },

    /// `item` was discarded.
    Discard {
        /// The discarded item.
        item: T,
    },

    /// The set was emptied.
    Clear,

    /// The set changed in bulk.
    Update,
}

impl<T> Event for SetEvent<T> {
    fn kind(&self) -> EventKind {
        match self {
            Self::Add { .. } => EventKind::Insert,
            Self::Discard { .. } => EventKind::Remove,
            Self::Clear => EventKind::Clear,
            Self::Update => EventKind::Update,
        }
    }
}
