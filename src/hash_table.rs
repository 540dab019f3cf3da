//! HashTable: open addressing with linear probing over a single `Buffer` of slots.

use crate::buffer::Buffer;
use crate::error::TableError;
use crate::slot::{Entry, Slot};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use log::{debug, trace};
use std::collections::hash_map::RandomState;

#[inline]
fn bucket(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

#[inline]
fn next_index(index: usize, capacity: usize) -> usize {
    if index + 1 == capacity {
        0
    } else {
        index + 1
    }
}

#[inline]
fn prev_index(index: usize, capacity: usize) -> usize {
    if index == 0 {
        capacity - 1
    } else {
        index - 1
    }
}

/// First non-occupied slot on the probe path of `hash`. Only used while
/// rebuilding, where the target holds no tombstones and has a free slot.
fn first_free<K, V>(slots: &[Slot<K, V>], hash: u64) -> usize {
    let capacity = slots.len();
    let mut index = bucket(hash, capacity);
    while slots[index].is_occupied() {
        index = next_index(index, capacity);
    }
    index
}

/// Outcome of walking a probe sequence for one key.
enum Probe {
    /// The key lives at this index.
    Found(usize),
    /// The key is absent; this is where an insert should put it (the first
    /// tombstone on the path, else the terminating empty slot).
    Vacant(usize),
    /// Every slot was visited without a match or a free slot.
    Exhausted,
}

pub struct HashTable<K, V, S = RandomState> {
    hasher: S,
    // `slots.size()` is the live entry count.
    pub(crate) slots: Buffer<Slot<K, V>>,
    pub(crate) tombstones: usize,
}

impl<K, V> HashTable<K, V>
where
    K: Eq + Hash,
{
    /// Empty table with capacity 0; the first insert allocates.
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V, S> Default for HashTable<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> HashTable<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            slots: Buffer::default(),
            tombstones: 0,
        }
    }

    /// Aborts on allocation failure; see
    /// [`HashTable::try_with_capacity_and_hasher`].
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            slots: Buffer::new(capacity),
            tombstones: 0,
        }
    }

    pub fn try_with_capacity_and_hasher(capacity: usize, hasher: S) -> Result<Self, TableError> {
        Ok(Self {
            hasher,
            slots: Buffer::try_new(capacity)?,
            tombstones: 0,
        })
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Size of the probe space. Always strictly greater than `len()` once
    /// anything has been inserted.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Drop every entry and tombstone; capacity is kept.
    pub fn clear(&mut self) {
        for slot in self.slots.as_mut_slice() {
            *slot = Slot::Empty;
        }
        self.slots.set_size(0);
        self.tombstones = 0;
    }

    /// Exchange contents with `other` in constant time.
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Entries in slot order. The order changes whenever the table rebuilds.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            table: &self.slots,
            index: 0,
            remaining: self.len(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let remaining = self.len();
        IterMut {
            it: self.slots.as_mut_slice().iter_mut(),
            remaining,
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Free the slot at `index` and return its entry.
    ///
    /// A freed slot whose successor is empty becomes empty itself, and so do
    /// the tombstones directly before it: no probe can pass through them.
    fn release(&mut self, index: usize) -> Option<Entry<K, V>> {
        let capacity = self.capacity();
        let next = next_index(index, capacity);
        let freed = if matches!(self.slots[next], Slot::Empty) {
            Slot::Empty
        } else {
            Slot::Deleted
        };
        let reclaim = matches!(freed, Slot::Empty);
        let entry = core::mem::replace(&mut self.slots[index], freed).into_entry()?;

        if reclaim {
            let mut i = prev_index(index, capacity);
            while matches!(self.slots[i], Slot::Deleted) {
                self.slots[i] = Slot::Empty;
                self.tombstones -= 1;
                i = prev_index(i, capacity);
            }
        } else {
            self.tombstones += 1;
        }
        let n = self.slots.size() - 1;
        self.slots.set_size(n);
        Some(entry)
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Walk the probe sequence of `hash` from its canonical bucket.
    ///
    /// Tombstones are stepped over; the walk stops at the first empty slot
    /// or after `capacity` steps.
    fn probe<Q>(&self, hash: u64, q: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let slots = self.slots.as_slice();
        let capacity = slots.len();
        if capacity == 0 {
            return Probe::Exhausted;
        }

        let mut index = bucket(hash, capacity);
        let mut reusable = None;
        for _ in 0..capacity {
            match &slots[index] {
                Slot::Empty => return Probe::Vacant(reusable.unwrap_or(index)),
                Slot::Deleted => {
                    reusable.get_or_insert(index);
                }
                Slot::Occupied(e) => {
                    if e.hash == hash && e.key.borrow() == q {
                        return Probe::Found(index);
                    }
                }
            }
            index = next_index(index, capacity);
        }

        match reusable {
            Some(index) => Probe::Vacant(index),
            None => Probe::Exhausted,
        }
    }

    pub(crate) fn find_index<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.is_empty() {
            return None;
        }
        match self.probe(self.make_hash(q), q) {
            Probe::Found(index) => Some(index),
            Probe::Vacant(_) | Probe::Exhausted => None,
        }
    }

    /// Make room for one more entry before any slot is written.
    ///
    /// Grows to `(len + 1) * 2` when that exceeds the current capacity.
    /// Otherwise, if tombstones leave fewer than two empty slots, rebuilds
    /// in place at the same capacity.
    fn reserve_one(&mut self) -> Result<(), TableError> {
        let len = self.len();
        let capacity = self.capacity();
        let wanted = len
            .checked_add(1)
            .and_then(|n| n.checked_mul(2))
            .ok_or(TableError::CapacityOverflow)?;

        if wanted > capacity {
            debug!(
                "growing hash table from {} to {} slots ({} live)",
                capacity, wanted, len
            );
            return self.rebuild(wanted);
        }
        // After this function at least two slots are empty, so the insert
        // that follows always finds a vacant slot and `Probe::Exhausted`
        // cannot occur there.
        if self.tombstones > 0 && len + self.tombstones + 2 > capacity {
            trace!(
                "compacting {} tombstones at capacity {}",
                self.tombstones,
                capacity
            );
            return self.rebuild(capacity);
        }
        Ok(())
    }

    /// Move every live entry into fresh storage of `capacity` slots, using
    /// the stored hashes. Allocation happens before anything is moved, so a
    /// failed `try_new` returns with the table untouched (covered by
    /// `tests/growth_allocation_failure.rs`, which fails the allocator).
    fn rebuild(&mut self, capacity: usize) -> Result<(), TableError> {
        let mut old = Buffer::try_new(capacity)?;
        self.slots.swap(&mut old);
        let live = old.size();

        for entry in old.into_iter().filter_map(Slot::into_entry) {
            let index = first_free(self.slots.as_slice(), entry.hash);
            self.slots[index] = Slot::Occupied(entry);
        }
        self.slots.set_size(live);
        self.tombstones = 0;
        Ok(())
    }

    /// Insert `key -> value`, returning the previous value if the key was
    /// already present (in which case `len()` is unchanged).
    ///
    /// The only failure is allocation during growth, which leaves the table
    /// untouched.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        let hash = self.make_hash(&key);
        self.reserve_one()?;

        match self.probe(hash, &key) {
            Probe::Found(index) => match &mut self.slots[index] {
                Slot::Occupied(e) => Ok(Some(core::mem::replace(&mut e.value, value))),
                Slot::Empty | Slot::Deleted => unreachable!("probe matched a free slot"),
            },
            Probe::Vacant(index) => {
                if matches!(self.slots[index], Slot::Deleted) {
                    self.tombstones -= 1;
                }
                self.slots[index] = Slot::Occupied(Entry { key, value, hash });
                let n = self.slots.size() + 1;
                self.slots.set_size(n);
                Ok(None)
            }
            Probe::Exhausted => unreachable!("no free slot after reserve_one"),
        }
    }

    /// Remove `q`, reporting whether it was present.
    pub fn erase<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).is_some()
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.find_index(q)?;
        self.release(index).map(|e| (e.key, e.value))
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_index(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_key_value(q).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.find_index(q)?;
        self.slots[index].entry().map(|e| (&e.key, &e.value))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.find_index(q)?;
        self.slots[index].entry_mut().map(|e| &mut e.value)
    }

    /// Like [`HashTable::get`], but a missing key is an error.
    pub fn at<Q>(&self, q: &Q) -> Result<&V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).ok_or(TableError::NotFound)
    }

    pub fn at_mut<Q>(&mut self, q: &Q) -> Result<&mut V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_mut(q).ok_or(TableError::NotFound)
    }
}

impl<K, V, S> Clone for HashTable<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            slots: self.slots.clone(),
            tombstones: self.tombstones,
        }
    }
}

/// Two tables are equal when they hold the same keys mapped to equal
/// values, regardless of capacity or slot placement.
impl<K, V, S> PartialEq for HashTable<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for HashTable<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashTable<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Renders `{k: v, k: v}` in slot order.
impl<K: fmt::Display, V: fmt::Display, S> fmt::Display for HashTable<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        f.write_str("}")
    }
}

/// Iterator over immutable entries in `HashTable`, in slot order.
///
/// Two iterators compare equal when they walk the same table and stand at
/// the same slot.
pub struct Iter<'a, K, V> {
    // The table's own buffer field: its address identifies the table even
    // when no storage has been allocated.
    table: &'a Buffer<Slot<K, V>>,
    index: usize,
    remaining: usize,
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter {
            table: self.table,
            index: self.index,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> PartialEq for Iter<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.table, other.table) && self.index == other.index
    }
}

impl<'a, K, V> Eq for Iter<'a, K, V> {}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.table.as_slice();
        while let Some(slot) = slots.get(self.index) {
            self.index += 1;
            if let Slot::Occupied(e) = slot {
                self.remaining -= 1;
                return Some((&e.key, &e.value));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}
impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

/// Iterator over mutable entries in `HashTable`.
pub struct IterMut<'a, K, V> {
    it: core::slice::IterMut<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.it.by_ref() {
            if let Slot::Occupied(e) = slot {
                self.remaining -= 1;
                return Some((&e.key, &mut e.value));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}
impl<'a, K, V> FusedIterator for IterMut<'a, K, V> {}

/// Owning iterator; consumes the table.
pub struct IntoIter<K, V> {
    it: std::vec::IntoIter<Slot<K, V>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.it.by_ref() {
            if let Some(e) = slot.into_entry() {
                self.remaining -= 1;
                return Some((e.key, e.value));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}
impl<'a, K, V> FusedIterator for Keys<'a, K, V> {}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}
impl<'a, K, V> FusedIterator for Values<'a, K, V> {}

pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> ExactSizeIterator for ValuesMut<'a, K, V> {}
impl<'a, K, V> FusedIterator for ValuesMut<'a, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a HashTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashTable<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for HashTable<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let remaining = self.len();
        IntoIter {
            it: self.slots.into_iter(),
            remaining,
        }
    }
}
