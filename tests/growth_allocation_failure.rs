// Lives in its own test binary: it installs a global allocator that refuses
// requests while the current thread has failures switched on.

use probe_table::{HashTable, TableError};
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

struct FailingAlloc;

thread_local! {
    static FAIL: Cell<bool> = const { Cell::new(false) };
}

fn failing() -> bool {
    FAIL.try_with(|f| f.get()).unwrap_or(false)
}

unsafe impl GlobalAlloc for FailingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if failing() {
            return core::ptr::null_mut();
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if failing() {
            return core::ptr::null_mut();
        }
        System.realloc(ptr, layout, new_size)
    }
}

#[global_allocator]
static GLOBAL: FailingAlloc = FailingAlloc;

fn with_failing_alloc<R>(f: impl FnOnce() -> R) -> R {
    FAIL.with(|flag| flag.set(true));
    let r = f();
    FAIL.with(|flag| flag.set(false));
    r
}

#[test]
fn failed_growth_leaves_table_unchanged() {
    let mut m: HashTable<u32, u32> = HashTable::new();
    m.insert(1, 10).unwrap();
    assert_eq!((m.len(), m.capacity()), (1, 2));

    // len 1 -> growth to 4 slots is due, and that allocation is refused.
    let res = with_failing_alloc(|| m.insert(2, 20));
    assert!(matches!(res, Err(TableError::AllocationFailure(_))));
    assert_eq!((m.len(), m.capacity()), (1, 2));
    assert_eq!(m.at(&1), Ok(&10));
    assert!(!m.contains_key(&2));
    assert_eq!(m.iter().count(), 1);

    // Once allocation works again the same insert goes through.
    assert_eq!(m.insert(2, 20).unwrap(), None);
    assert_eq!((m.len(), m.capacity()), (2, 4));
    assert_eq!(m.at(&2), Ok(&20));
}

#[test]
fn failed_growth_keeps_existing_value_on_overwrite() {
    let mut m: HashTable<String, u32> = HashTable::new();
    m.insert("k".to_string(), 1).unwrap();
    let key = "k".to_string();

    // Growth is checked before the probe, so even an overwrite fails here.
    let res = with_failing_alloc(|| m.insert(key, 2));
    assert!(matches!(res, Err(TableError::AllocationFailure(_))));
    assert_eq!(m.at("k"), Ok(&1));
    assert_eq!(m.len(), 1);
}
