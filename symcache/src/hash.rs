// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Hash and equality primitives used by the cache's probe loop.

use symcache_heap::{Allocator, Object};

pub use symcache_heap::calc_hash;

/// Checks whether `object` holds exactly `bytes`, whose hash is `hash`.
/// Mismatched hashes and lengths are rejected before touching the bytes.
#[inline]
pub fn equals_const<A: Allocator>(object: &Object<A>, bytes: &[u8], hash: u32) -> bool {
    object.hash() == hash && object.len() == bytes.len() && object.as_bytes() == bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use symcache_heap::Heap;

    #[test]
    fn test_equals_const() {
        let mut heap = Heap::new();
        let r = heap.alloc_string(b"foo").unwrap();
        let object = heap.get(r).unwrap();

        assert!(equals_const(object, b"foo", calc_hash(b"foo")));
        assert!(!equals_const(object, b"fo", calc_hash(b"fo")));
        assert!(!equals_const(object, b"bar", calc_hash(b"bar")));
        // A wrong hash short-circuits even when the bytes match.
        assert!(!equals_const(object, b"foo", calc_hash(b"foo") ^ 1));
    }

    #[test]
    fn test_same_hash_different_bytes() {
        // djb2 collides when raising the first byte by one is offset by
        // lowering the second byte by 33.
        assert_eq!(calc_hash(b"a\x21"), calc_hash(b"b\x00"));

        let mut heap = Heap::new();
        let r = heap.alloc_string(b"a\x21").unwrap();
        let object = heap.get(r).unwrap();
        assert!(!equals_const(object, b"b\x00", calc_hash(b"b\x00")));
    }
}
