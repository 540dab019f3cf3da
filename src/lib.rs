//! probe-table: a single-threaded, open-addressing hash table with linear
//! probing, built directly on an owned fixed-capacity slot buffer.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the probing algorithm and the storage it runs on small
//!   enough to reason about independently.
//! - Layers:
//!   - Buffer<T>: owned contiguous storage of exactly `capacity` elements
//!     plus a caller-managed `size`. Deep copy on `Clone`, ownership
//!     transfer via `take`, O(1) `swap`.
//!   - HashTable<K, V, S>: one `Buffer` of slots. Each slot is empty,
//!     occupied, or a tombstone. The buffer's `size` is the live entry
//!     count.
//!
//! Probing
//! - A key's canonical bucket is `hash(key) % capacity`. Lookups walk
//!   forward (wrapping) from there, step over tombstones, and stop at the
//!   first empty slot or after `capacity` steps.
//! - Inserts that miss reuse the first tombstone seen on the path, else the
//!   empty slot that ended the walk.
//!
//! Deletion
//! - Erase leaves a tombstone so keys further along the same chain stay
//!   reachable. A freed slot followed by an empty slot is emptied directly,
//!   together with any tombstones immediately before it.
//!
//! Growth
//! - Before every insert, if `(len + 1) * 2 > capacity` the table is rebuilt
//!   into `(len + 1) * 2` slots. Otherwise, when tombstones leave fewer than
//!   two empty slots, it is rebuilt at the same capacity. Rebuilds drop all
//!   tombstones. Hence `len < capacity` after any insert.
//! - New storage is allocated before anything moves; an allocation failure
//!   is returned and the table is left as it was.
//!
//! Hasher and rehashing invariants
//! - Each occupied slot stores the key's `u64` hash. Rebuilds place entries
//!   by the stored hash, so `K: Hash` runs once per insert call and never
//!   while the table is being rebuilt.
//!
//! Notes and non-goals
//! - Single-threaded, synchronous; no interior mutability.
//! - Iteration order is raw slot order and changes across rebuilds.
//! - No serialization format, no shrinking.

pub mod buffer;
pub mod error;
pub mod hash_table;
mod hash_table_proptest;
mod slot;

// Public surface
pub use buffer::Buffer;
pub use error::TableError;
pub use hash_table::{HashTable, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
