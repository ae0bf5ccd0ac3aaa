// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::hash::{calc_hash, equals_const};
use crate::{CacheConfig, Error};
use std::mem;
use symcache_heap::{Allocator, Heap, HeapError, ObjectRef, SweepObserver, Tag};
use tracing::{debug, trace};

/// The smallest number of slots a cache ever has.
pub const MIN_CAPACITY: usize = 8;

/// A canonical, interned identifier. Two symbols are equal exactly when they
/// have the same content, because the cache keeps one object per content.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Symbol(pub(crate) ObjectRef);

impl Symbol {
    /// The address of the symbol's object in the heap.
    #[inline]
    pub fn object(self) -> ObjectRef {
        self.0
    }
}

impl From<Symbol> for ObjectRef {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Slot {
    #[default]
    Empty,
    /// Previously held an entry. Probes continue past it.
    Tombstone,
    Occupied(ObjectRef),
}

/// The result of [SymbolCache::locate].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Location {
    /// The canonical entry for the content and the slot that now holds it.
    Found { slot: usize, object: ObjectRef },
    /// No entry matched. The slot is where an insert should go: the first
    /// tombstone on the probe path, or the empty slot that ended it.
    Vacant(usize),
}

impl Location {
    /// True if the content already has a canonical entry.
    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, Location::Found { .. })
    }

    /// The slot of the entry, or where one would be inserted.
    #[inline]
    pub fn slot(&self) -> usize {
        match *self {
            Location::Found { slot, .. } | Location::Vacant(slot) => slot,
        }
    }
}

/// Open-addressing set of symbols with lazy deletion.
///
/// Invariant: `(len + tombstones) * 2 <= capacity` after every insert, and
/// the capacity is a power of two.
pub struct SymbolCache {
    slots: Vec<Slot>,
    count: usize,
    deleted: usize,
    gensym_attempt_limit: Option<u64>,
}

fn alloc_slots(capacity: usize) -> Result<Vec<Slot>, Error> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(capacity)?;
    slots.resize(capacity, Slot::Empty);
    Ok(slots)
}

fn table_capacity(n: usize) -> Result<usize, Error> {
    let capacity = n.checked_next_power_of_two().ok_or(Error::OutOfMemory)?;
    Ok(capacity.max(MIN_CAPACITY))
}

impl SymbolCache {
    pub fn try_new(config: &CacheConfig) -> Result<Self, Error> {
        let capacity = table_capacity(config.initial_capacity)?;
        Ok(Self {
            slots: alloc_slots(capacity)?,
            count: 0,
            deleted: 0,
            gensym_attempt_limit: config.gensym_attempt_limit,
        })
    }

    /// Number of live symbols.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn tombstones(&self) -> usize {
        self.deleted
    }

    #[inline]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    #[inline]
    pub(crate) fn gensym_attempt_limit(&self) -> Option<u64> {
        self.gensym_attempt_limit
    }

    /// Finds the canonical entry for `bytes` or the slot to insert it into.
    ///
    /// Scans from `hash & (capacity - 1)` to the end, then wraps to the
    /// start. An empty slot ends the scan. Tombstones do not, but the first
    /// one is remembered. A match found past a tombstone is moved into that
    /// tombstone, and its old slot becomes the tombstone, shortening the
    /// probe path for the next lookup.
    ///
    /// # Panics
    /// Panics if the scan visits every slot without finding a match, an empty
    /// slot, or a tombstone. The load factor invariant rules this out.
    #[allow(clippy::panic)]
    pub fn locate<A: Allocator + Clone>(
        &mut self,
        heap: &Heap<A>,
        bytes: &[u8],
        hash: u32,
    ) -> Location {
        let capacity = self.slots.len();
        let start = hash as usize & (capacity - 1);
        let mut first_free = None;

        for i in (start..capacity).chain(0..start) {
            match self.slots[i] {
                Slot::Empty => {
                    return Location::Vacant(first_free.unwrap_or(i));
                }
                Slot::Tombstone => {
                    if first_free.is_none() {
                        first_free = Some(i);
                    }
                }
                Slot::Occupied(object) => {
                    // Entries are removed before their objects are freed, so a
                    // stale entry can only come from misuse of Heap::free.
                    let matches = heap
                        .get(object)
                        .is_some_and(|candidate| equals_const(candidate, bytes, hash));
                    if matches {
                        if let Some(earlier) = first_free {
                            self.slots[earlier] = Slot::Occupied(object);
                            self.slots[i] = Slot::Tombstone;
                            return Location::Found { slot: earlier, object };
                        }
                        return Location::Found { slot: i, object };
                    }
                }
            }
        }

        match first_free {
            Some(slot) => Location::Vacant(slot),
            None => panic!(
                "symbol cache is full: {} live, {} tombstones, capacity {}",
                self.count, self.deleted, capacity
            ),
        }
    }

    /// Inserts `object` at a slot returned as [Location::Vacant] by the
    /// immediately preceding [SymbolCache::locate] for the same content.
    ///
    /// Grows the table first if the insert would break the load factor, in
    /// which case the slot is located again in the new table.
    ///
    /// # Panics
    /// Panics if the slot is occupied, or if the content is found in the
    /// table after a resize. Both mean the caller skipped `locate`.
    #[allow(clippy::panic)]
    pub fn put<A: Allocator + Clone>(
        &mut self,
        heap: &Heap<A>,
        object: ObjectRef,
        mut slot: usize,
    ) -> Result<(), Error> {
        if (self.count + self.deleted + 1) * 2 > self.slots.len() {
            self.grow(heap)?;
            let pending = heap.get(object).ok_or(HeapError::Stale)?;
            let bytes = pending.as_bytes();
            slot = match self.locate(heap, bytes, calc_hash(bytes)) {
                Location::Vacant(slot) => slot,
                Location::Found { object: existing, .. } => {
                    panic!("put of {object:?} collides with interned {existing:?}")
                }
            };
        }

        match self.slots[slot] {
            Slot::Empty => {}
            // Reused tombstones stop counting, so `deleted` matches the slots.
            Slot::Tombstone => self.deleted -= 1,
            Slot::Occupied(existing) => {
                panic!("put of {object:?} into slot {slot} already holding {existing:?}")
            }
        }
        self.slots[slot] = Slot::Occupied(object);
        self.count += 1;
        Ok(())
    }

    /// Rebuilds the table at the smallest power of two that is at least
    /// `2 * len + 1`, dropping every tombstone.
    #[cold]
    #[inline(never)]
    #[allow(clippy::panic)]
    fn grow<A: Allocator + Clone>(&mut self, heap: &Heap<A>) -> Result<(), Error> {
        let old_capacity = self.slots.len();
        let new_capacity = table_capacity(2 * self.count + 1)?;
        let mut slots = alloc_slots(new_capacity)?;
        let mask = new_capacity - 1;

        let mut count = 0;
        for entry in &self.slots {
            let Slot::Occupied(object) = *entry else {
                continue;
            };
            let Some(hash) = heap.get(object).map(|o| o.hash()) else {
                continue;
            };
            let start = hash as usize & mask;
            match (start..new_capacity)
                .chain(0..start)
                .find(|&i| slots[i] == Slot::Empty)
            {
                Some(i) => slots[i] = Slot::Occupied(object),
                None => panic!("rehash into {new_capacity} slots ran out of room"),
            }
            count += 1;
        }

        debug!(
            old_capacity,
            new_capacity,
            live = count,
            dropped_tombstones = self.deleted,
            "symbol cache resized"
        );
        drop(mem::replace(&mut self.slots, slots));
        self.count = count;
        self.deleted = 0;
        Ok(())
    }

    /// Removes the entry for a symbol that is being reclaimed. Returns false,
    /// and does nothing, if the symbol is not in the cache.
    pub fn remove<A: Allocator + Clone>(&mut self, heap: &Heap<A>, object: ObjectRef) -> bool {
        let Some(dying) = heap.get(object) else {
            trace!(?object, "remove of a stale object ignored");
            return false;
        };
        match self.locate(heap, dying.as_bytes(), dying.hash()) {
            Location::Found { slot, object: found } if found == object => {
                self.count -= 1;
                self.deleted += 1;
                self.slots[slot] = Slot::Tombstone;
                true
            }
            _ => {
                trace!(?object, "remove of an object not in the cache ignored");
                false
            }
        }
    }

    /// Returns the canonical symbol for `bytes`, creating it if needed.
    pub fn try_intern_bytes<A: Allocator + Clone>(
        &mut self,
        heap: &mut Heap<A>,
        bytes: &[u8],
    ) -> Result<Symbol, Error> {
        let hash = calc_hash(bytes);
        match self.locate(heap, bytes, hash) {
            Location::Found { object, .. } => Ok(Symbol(object)),
            Location::Vacant(slot) => {
                let object = heap.alloc_tagged(Tag::Symbol, bytes, hash)?;
                self.put(heap, object, slot)?;
                Ok(Symbol(object))
            }
        }
    }

    /// Returns the canonical symbol for `bytes`, creating it if needed.
    ///
    /// # Panics
    /// Panics if memory for the symbol or the table cannot be allocated. The
    /// runtime cannot make progress without symbols.
    #[allow(clippy::expect_used)]
    pub fn intern_bytes<A: Allocator + Clone>(
        &mut self,
        heap: &mut Heap<A>,
        bytes: &[u8],
    ) -> Symbol {
        self.try_intern_bytes(heap, bytes).expect("out of memory while interning a symbol")
    }

    #[inline]
    pub fn intern_str<A: Allocator + Clone>(&mut self, heap: &mut Heap<A>, str: &str) -> Symbol {
        self.intern_bytes(heap, str.as_bytes())
    }

    /// Turns a string object into a symbol.
    ///
    /// If a symbol with the same content exists it is returned and `string`
    /// is left alone for the collector. Otherwise `string` itself is inserted
    /// and re-tagged as a symbol in place, so the returned symbol has the
    /// same address. Callers must not use `string` as a plain string again.
    ///
    /// Passing an object that is already a symbol returns the canonical
    /// symbol for its content, which is itself when it is interned.
    pub fn try_promote_string<A: Allocator + Clone>(
        &mut self,
        heap: &mut Heap<A>,
        string: ObjectRef,
    ) -> Result<Symbol, Error> {
        let object = heap.get(string).ok_or(HeapError::Stale)?;
        let tag = object.tag();
        match self.locate(heap, object.as_bytes(), object.hash()) {
            Location::Found { object, .. } => Ok(Symbol(object)),
            Location::Vacant(_) if tag != Tag::String => Err(HeapError::TagMismatch {
                expected: Tag::String,
                actual: tag,
            }
            .into()),
            Location::Vacant(slot) => {
                self.put(heap, string, slot)?;
                heap.retag(string, Tag::String, Tag::Symbol)?;
                Ok(Symbol(string))
            }
        }
    }

    /// Infallible form of [SymbolCache::try_promote_string].
    ///
    /// # Panics
    /// Panics on allocation failure, or if `string` is stale or an uninterned
    /// symbol.
    #[allow(clippy::expect_used)]
    pub fn promote_string<A: Allocator + Clone>(
        &mut self,
        heap: &mut Heap<A>,
        string: ObjectRef,
    ) -> Symbol {
        self.try_promote_string(heap, string).expect("string promotion to succeed")
    }

    /// The content of a symbol, or `None` if it was reclaimed.
    #[inline]
    pub fn resolve<A: Allocator + Clone>(heap: &Heap<A>, symbol: Symbol) -> Option<&[u8]> {
        heap.get(symbol.0).map(|o| o.as_bytes())
    }
}

impl<A: Allocator + Clone> SweepObserver<A> for SymbolCache {
    fn reclaim(&mut self, heap: &Heap<A>, object: ObjectRef) {
        self.remove(heap, object);
    }
}
