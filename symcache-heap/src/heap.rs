// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{calc_hash, AllocError, Allocator, Global, HeapError, Object, ObjectRef, Tag};
use tracing::debug;

/// Receives reclaimed symbols during [Heap::sweep].
///
/// `reclaim` runs while every object doomed by the sweep is still readable,
/// and strictly before any of their blocks are freed or reused.
pub trait SweepObserver<A: Allocator + Clone = Global> {
    fn reclaim(&mut self, heap: &Heap<A>, object: ObjectRef);
}

/// Counts of what a single [Heap::sweep] reclaimed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SweepStats {
    /// All reclaimed objects, symbols included.
    pub reclaimed: usize,
    /// Reclaimed objects that were tagged [Tag::Symbol].
    pub symbols: usize,
}

struct Block<A: Allocator> {
    generation: u32,
    marked: bool,
    object: Option<Object<A>>,
}

/// Owns the memory of every string and symbol object.
///
/// Freed blocks are recycled through a free list with their generation
/// bumped, which invalidates every outstanding [ObjectRef] to them.
pub struct Heap<A: Allocator + Clone = Global> {
    blocks: Vec<Block<A>>,
    free: Vec<u32>,
    live: usize,
    alloc: A,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<A: Allocator + Clone> Heap<A> {
    /// Creates an empty heap whose object bytes come from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Self {
            blocks: Vec::new(),
            free: Vec::new(),
            live: 0,
            alloc,
        }
    }

    /// Allocates a generic string object, hashing its content.
    pub fn alloc_string(&mut self, bytes: &[u8]) -> Result<ObjectRef, AllocError> {
        self.alloc_tagged(Tag::String, bytes, calc_hash(bytes))
    }

    /// Allocates an object with the given tag and precomputed hash. The hash
    /// must be [calc_hash] of `bytes`.
    pub fn alloc_tagged(
        &mut self,
        tag: Tag,
        bytes: &[u8],
        hash: u32,
    ) -> Result<ObjectRef, AllocError> {
        debug_assert_eq!(calc_hash(bytes), hash);
        let object = Object::try_new_in(tag, bytes, hash, self.alloc.clone())?;

        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = u32::try_from(self.blocks.len()).map_err(|_| AllocError)?;
                self.blocks.try_reserve(1).map_err(|_| AllocError)?;
                self.blocks.push(Block {
                    generation: 0,
                    marked: false,
                    object: None,
                });
                index
            }
        };

        let block = &mut self.blocks[index as usize];
        block.object = Some(object);
        block.marked = false;
        self.live += 1;
        Ok(ObjectRef {
            index,
            generation: block.generation,
        })
    }

    fn block(&self, r: ObjectRef) -> Option<&Block<A>> {
        self.blocks
            .get(r.index as usize)
            .filter(|block| block.generation == r.generation && block.object.is_some())
    }

    fn block_mut(&mut self, r: ObjectRef) -> Option<&mut Block<A>> {
        self.blocks
            .get_mut(r.index as usize)
            .filter(|block| block.generation == r.generation && block.object.is_some())
    }

    /// Returns the object, or `None` if the ref is stale.
    #[inline]
    pub fn get(&self, r: ObjectRef) -> Option<&Object<A>> {
        self.block(r)?.object.as_ref()
    }

    #[inline]
    pub fn tag(&self, r: ObjectRef) -> Option<Tag> {
        self.get(r).map(Object::tag)
    }

    #[inline]
    pub fn is_live(&self, r: ObjectRef) -> bool {
        self.block(r).is_some()
    }

    /// Switches the tag of a live object from `from` to `to` without moving
    /// or copying it. The ref stays valid.
    pub fn retag(&mut self, r: ObjectRef, from: Tag, to: Tag) -> Result<(), HeapError> {
        let object = self
            .block_mut(r)
            .and_then(|block| block.object.as_mut())
            .ok_or(HeapError::Stale)?;
        if object.tag() != from {
            return Err(HeapError::TagMismatch {
                expected: from,
                actual: object.tag(),
            });
        }
        object.set_tag(to);
        Ok(())
    }

    /// Marks an object as reachable for the next [Heap::sweep]. Returns
    /// false if the ref is stale.
    pub fn mark(&mut self, r: ObjectRef) -> bool {
        match self.block_mut(r) {
            Some(block) => {
                block.marked = true;
                true
            }
            None => false,
        }
    }

    /// Frees a single object immediately, without notifying anyone. Only use
    /// this for objects that were never handed to a symbol cache.
    pub fn free(&mut self, r: ObjectRef) -> bool {
        let Some(block) = self.block_mut(r) else {
            return false;
        };
        block.object = None;
        block.marked = false;
        block.generation = block.generation.wrapping_add(1);
        self.free.push(r.index);
        self.live -= 1;
        true
    }

    /// Reclaims every unmarked object, then clears all marks.
    ///
    /// The observer is told about each reclaimed symbol first; no block is
    /// freed until every notification has been delivered.
    pub fn sweep<O>(&mut self, observer: &mut O) -> SweepStats
    where
        O: SweepObserver<A> + ?Sized,
    {
        let mut doomed = Vec::new();
        for (index, block) in self.blocks.iter_mut().enumerate() {
            if block.object.is_some() && !block.marked {
                doomed.push(ObjectRef {
                    index: index as u32,
                    generation: block.generation,
                });
            }
            block.marked = false;
        }

        let mut stats = SweepStats {
            reclaimed: doomed.len(),
            symbols: 0,
        };
        for &r in &doomed {
            if self.tag(r) == Some(Tag::Symbol) {
                observer.reclaim(self, r);
                stats.symbols += 1;
            }
        }
        for r in doomed {
            self.free(r);
        }

        debug!(
            reclaimed = stats.reclaimed,
            symbols = stats.symbols,
            live = self.live,
            "heap sweep finished"
        );
        stats
    }

    /// Number of live objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
