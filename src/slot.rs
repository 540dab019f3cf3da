//! Slot states stored in the table's buffer.

#[derive(Clone, Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
}

/// One position of the probe space.
///
/// `Deleted` is a tombstone: lookups walk past it, inserts may reuse it.
/// Only `Empty` ends a probe sequence.
#[derive(Clone, Debug)]
pub(crate) enum Slot<K, V> {
    Empty,
    Occupied(Entry<K, V>),
    Deleted,
}

impl<K, V> Slot<K, V> {
    #[inline]
    pub(crate) fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(_))
    }

    #[inline]
    pub(crate) fn entry(&self) -> Option<&Entry<K, V>> {
        match self {
            Slot::Occupied(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self) -> Option<&mut Entry<K, V>> {
        match self {
            Slot::Occupied(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn into_entry(self) -> Option<Entry<K, V>> {
        match self {
            Slot::Occupied(e) => Some(e),
            _ => None,
        }
    }
}

// Manual impl: an empty slot needs no `K: Default` or `V: Default`.
impl<K, V> Default for Slot<K, V> {
    fn default() -> Self {
        Slot::Empty
    }
}
