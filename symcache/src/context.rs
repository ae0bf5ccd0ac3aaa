// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{CacheConfig, Error, Symbol, SymbolCache};
use symcache_heap::{Allocator, Global, Heap, ObjectRef, SweepStats};
use tracing::debug;

/// The runtime's object heap together with its symbol cache.
///
/// There is meant to be one of these per runtime. It is created before the
/// first symbol is made and dropped, or [SymbolContext::deinit]ed, at
/// shutdown. Nothing in here is synchronized; the owning thread has
/// exclusive access through `&mut self`.
pub struct SymbolContext<A: Allocator + Clone = Global> {
    heap: Heap<A>,
    cache: SymbolCache,
}

impl SymbolContext {
    /// Allocates the symbol table with `config.initial_capacity` empty slots.
    pub fn init(config: &CacheConfig) -> Result<Self, Error> {
        Self::init_in(config, Global)
    }
}

impl<A: Allocator + Clone> SymbolContext<A> {
    pub fn init_in(config: &CacheConfig, alloc: A) -> Result<Self, Error> {
        let cache = SymbolCache::try_new(config)?;
        debug!(capacity = cache.capacity(), "symbol cache initialized");
        Ok(Self {
            heap: Heap::new_in(alloc),
            cache,
        })
    }

    /// Tears down the table and every object. Outstanding symbols must not
    /// be resolved afterwards; they belong to no context.
    pub fn deinit(self) {
        debug!(
            symbols = self.cache.len(),
            objects = self.heap.len(),
            "symbol cache deinitialized"
        );
    }

    #[inline]
    pub fn heap(&self) -> &Heap<A> {
        &self.heap
    }

    #[inline]
    pub fn cache(&self) -> &SymbolCache {
        &self.cache
    }

    pub fn try_intern_bytes(&mut self, bytes: &[u8]) -> Result<Symbol, Error> {
        self.cache.try_intern_bytes(&mut self.heap, bytes)
    }

    /// See [SymbolCache::intern_bytes].
    pub fn intern_bytes(&mut self, bytes: &[u8]) -> Symbol {
        self.cache.intern_bytes(&mut self.heap, bytes)
    }

    pub fn intern_str(&mut self, str: &str) -> Symbol {
        self.cache.intern_str(&mut self.heap, str)
    }

    /// Allocates a plain string object, which may later be promoted.
    pub fn alloc_string(&mut self, bytes: &[u8]) -> Result<ObjectRef, Error> {
        Ok(self.heap.alloc_string(bytes)?)
    }

    pub fn try_promote_string(&mut self, string: ObjectRef) -> Result<Symbol, Error> {
        self.cache.try_promote_string(&mut self.heap, string)
    }

    /// See [SymbolCache::promote_string].
    pub fn promote_string(&mut self, string: ObjectRef) -> Symbol {
        self.cache.promote_string(&mut self.heap, string)
    }

    pub fn try_gensym(&mut self, prefix: &[u8]) -> Result<Symbol, Error> {
        self.cache.try_gensym(&mut self.heap, prefix)
    }

    /// See [SymbolCache::gensym].
    pub fn gensym(&mut self, prefix: &[u8]) -> Symbol {
        self.cache.gensym(&mut self.heap, prefix)
    }

    /// Drops a symbol's table entry. This is what the collector does for
    /// every symbol it reclaims; calling it for anything else is a no-op.
    pub fn remove(&mut self, object: ObjectRef) -> bool {
        self.cache.remove(&self.heap, object)
    }

    #[inline]
    pub fn resolve(&self, symbol: Symbol) -> Option<&[u8]> {
        SymbolCache::resolve(&self.heap, symbol)
    }

    /// Reclaims every object not listed in `roots`. Reclaimed symbols are
    /// removed from the table before their memory is released.
    pub fn collect(&mut self, roots: &[ObjectRef]) -> SweepStats {
        for &root in roots {
            self.heap.mark(root);
        }
        self.heap.sweep(&mut self.cache)
    }
}
