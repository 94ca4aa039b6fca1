//! Concurrent object cache with reader/writer coordination and LRU eviction.
//!
//! A single `Mutex`-guarded bookkeeping structure (fingerprint map + an
//! arena-backed doubly linked recency list + a running `used_bytes` total)
//! plus per-entry atomic reader counts. Readers take the mutex only long
//! enough to look up, pin, and splice-to-head; they release it before
//! touching the entry's bytes. Writers take the mutex to check
//! first-writer-wins, evict from the LRU tail until the new entry fits, and
//! publish. See `DESIGN.md` for why this is not a plain `RwLock`.
//!
//! The "stay alive while pinned, free on last unpin" rule from the data
//! model falls out of normal Rust ownership: a resident entry is held as an
//! `Arc<Entry>` inside the bookkeeping arena, and a read session
//! ([`ReadSession`]) holds a clone of that same `Arc`. Eviction drops the
//! bookkeeping's clone; if a read session still holds one the allocation
//! survives (tracked independently as an "orphaned" `AtomicBool` so it is
//! observable without reaching into `Arc::strong_count`)
//! and is freed automatically — no manual `free`, no reacquired mutex — when
//! the last `ReadSession` drops.
//!
//! The recency list is an arena (`Vec` of slots addressed by index, with a
//! free list for slot reuse) rather than a pointer-based intrusive list, so
//! splice-to-head is `O(1)` index rewiring with no `unsafe`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One resident (or orphaned) cache entry.
struct Entry {
    fingerprint: Vec<u8>,
    bytes: Vec<u8>,
    readers: AtomicUsize,
    orphaned: AtomicBool,
}

struct Slot {
    entry: Arc<Entry>,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Bookkeeping {
    map: HashMap<Vec<u8>, usize>,
    slots: Vec<Option<Slot>>,
    free_slots: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    used_bytes: usize,
}

impl Bookkeeping {
    fn new() -> Self {
        Bookkeeping {
            map: HashMap::new(),
            slots: Vec::new(),
            free_slots: Vec::new(),
            head: None,
            tail: None,
            used_bytes: 0,
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let slot = self.slots[idx].as_ref().expect("unlink on empty slot");
            (slot.prev, slot.next)
        };
        match prev {
            Some(p) => self.slots[p].as_mut().unwrap().next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].as_mut().unwrap().prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_head(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let slot = self.slots[idx].as_mut().unwrap();
            slot.prev = None;
            slot.next = old_head;
        }
        if let Some(h) = old_head {
            self.slots[h].as_mut().unwrap().prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn splice_to_head(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_head(idx);
    }

    fn alloc_slot(&mut self, entry: Arc<Entry>) -> usize {
        let slot = Slot { entry, prev: None, next: None };
        if let Some(idx) = self.free_slots.pop() {
            self.slots[idx] = Some(slot);
            idx
        } else {
            self.slots.push(Some(slot));
            self.slots.len() - 1
        }
    }

    /// Evict the LRU-tail entry. Returns its byte length, or `None` if the
    /// list was empty.
    fn evict_tail(&mut self) -> Option<usize> {
        let idx = self.tail?;
        self.unlink(idx);
        let slot = self.slots[idx].take().expect("tail slot missing");
        self.free_slots.push(idx);
        self.map.remove(&slot.entry.fingerprint);
        let len = slot.entry.bytes.len();
        self.used_bytes -= len;
        slot.entry.orphaned.store(true, Ordering::Release);
        // `slot.entry` (the bookkeeping's Arc clone) drops here. If no
        // ReadSession holds another clone, the entry's memory is freed now;
        // otherwise it lives on, orphaned, until the last session drops.
        Some(len)
    }
}

/// A pinned, borrowed view onto one cache entry's bytes.
///
/// Obtained from [`Cache::read_begin`]; dropping it is the cache's
/// `read_end` — unpinning never reacquires the cache mutex.
pub struct ReadSession {
    entry: Arc<Entry>,
}

impl ReadSession {
    pub fn bytes(&self) -> &[u8] {
        &self.entry.bytes
    }

    pub fn len(&self) -> usize {
        self.entry.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.bytes.is_empty()
    }

    /// Whether this entry has already been evicted from the cache's
    /// bookkeeping while this session still holds it ("orphaned"). Diagnostic
    /// only; callers never need to branch on this to use the bytes correctly.
    pub fn is_orphaned(&self) -> bool {
        self.entry.orphaned.load(Ordering::Acquire)
    }
}

impl Drop for ReadSession {
    fn drop(&mut self) {
        self.entry.readers.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Point-in-time cache snapshot for diagnostics/logging (never invalidates
/// invariants 1–4; does not disturb LRU order or reader counts).
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    pub resident_entries: usize,
    pub used_bytes: usize,
    pub max_bytes: usize,
}

/// The fingerprint→bytes store backing the proxy's object cache.
pub struct Cache {
    inner: Mutex<Bookkeeping>,
    max_bytes: usize,
    max_object_bytes: usize,
}

impl Cache {
    pub fn new(max_bytes: usize, max_object_bytes: usize) -> Self {
        Cache {
            inner: Mutex::new(Bookkeeping::new()),
            max_bytes,
            max_object_bytes,
        }
    }

    /// Look up `fingerprint`. On hit, pins the entry (increments its reader
    /// count) and moves it to MRU before releasing the mutex.
    pub fn read_begin(&self, fingerprint: &[u8]) -> Option<ReadSession> {
        let mut bk = self.inner.lock().expect("cache mutex poisoned");
        let idx = *bk.map.get(fingerprint)?;
        let entry = bk.slots[idx].as_ref().unwrap().entry.clone();
        entry.readers.fetch_add(1, Ordering::AcqRel);
        bk.splice_to_head(idx);
        drop(bk);
        Some(ReadSession { entry })
    }

    /// Insert `bytes` under `fingerprint`, evicting from the LRU tail as
    /// needed to stay within `max_bytes`. A no-op (returns `false`) if an
    /// entry with this fingerprint already exists (first-writer-wins), if
    /// `bytes.len()` exceeds `max_object_bytes`, or if `bytes` cannot fit
    /// even after evicting every other entry.
    pub fn write(&self, fingerprint: &[u8], bytes: Vec<u8>) -> bool {
        let len = bytes.len();
        if len > self.max_object_bytes {
            return false;
        }

        let mut bk = self.inner.lock().expect("cache mutex poisoned");
        if bk.map.contains_key(fingerprint) {
            return false;
        }

        // `len > self.max_bytes` is not special-cased here: the eviction
        // loop below drains the cache down to empty trying to make room
        // (it evicts while `used_bytes + len > max_bytes`, which holds
        // regardless of `used_bytes` once `len` alone exceeds `max_bytes`),
        // and the post-loop check below still refuses the insert.

        while bk.used_bytes + len > self.max_bytes {
            if bk.evict_tail().is_none() {
                break;
            }
        }
        if bk.used_bytes + len > self.max_bytes {
            return false;
        }

        let entry = Arc::new(Entry {
            fingerprint: fingerprint.to_vec(),
            bytes,
            readers: AtomicUsize::new(0),
            orphaned: AtomicBool::new(false),
        });
        let idx = bk.alloc_slot(entry);
        bk.push_head(idx);
        bk.map.insert(fingerprint.to_vec(), idx);
        bk.used_bytes += len;
        true
    }

    /// A point-in-time snapshot; does not pin or reorder anything.
    pub fn stats(&self) -> CacheStats {
        let bk = self.inner.lock().expect("cache mutex poisoned");
        CacheStats {
            resident_entries: bk.map.len(),
            used_bytes: bk.used_bytes,
            max_bytes: self.max_bytes,
        }
    }
}
