// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::{AllocError, Allocator, Global};
use allocator_api2::vec::Vec;
use core::fmt;

/// Computes the 32-bit hash shared by strings and symbols (djb2).
///
/// The hash is stored in every object header when the object is created, so
/// it must never change between releases that share object memory.
#[inline]
pub fn calc_hash(bytes: &[u8]) -> u32 {
    bytes.iter().fold(5381u32, |hash, &byte| {
        (hash << 5).wrapping_add(hash).wrapping_add(byte as u32)
    })
}

/// The allocator classification of an object.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Tag {
    /// A plain byte string with no identity guarantees.
    String,
    /// An interned identifier. At most one live symbol exists per content.
    Symbol,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Tag::String => "string",
            Tag::Symbol => "symbol",
        };
        fmt::Display::fmt(msg, f)
    }
}

/// The address of an object in a [crate::Heap].
///
/// Two refs are equal only if they name the same block in the same
/// generation, so comparing refs is an identity check. Refs do not keep
/// objects alive.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ObjectRef {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl ObjectRef {
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// An immutable byte string with a precomputed hash.
///
/// The bytes are stored followed by a NUL terminator which is not part of
/// the content.
pub struct Object<A: Allocator = Global> {
    tag: Tag,
    hash: u32,
    data: Vec<u8, A>,
}

impl<A: Allocator> Object<A> {
    pub(crate) fn try_new_in(
        tag: Tag,
        bytes: &[u8],
        hash: u32,
        alloc: A,
    ) -> Result<Self, AllocError> {
        let mut data = Vec::new_in(alloc);
        data.try_reserve_exact(bytes.len() + 1).map_err(|_| AllocError)?;
        data.extend_from_slice(bytes);
        data.push(0);
        Ok(Self { tag, hash, data })
    }

    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    #[inline]
    pub(crate) fn set_tag(&mut self, tag: Tag) {
        self.tag = tag;
    }

    #[inline]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Length of the content, excluding the terminator.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.data.len() - 1
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    #[inline]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.data
    }
}

impl<A: Allocator> fmt::Debug for Object<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("tag", &self.tag)
            .field("hash", &self.hash)
            .field("bytes", &String::from_utf8_lossy(self.as_bytes()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_hash_known_values() {
        assert_eq!(5381, calc_hash(b""));
        assert_eq!(5381 * 33 + b'a' as u32, calc_hash(b"a"));
        // Long inputs wrap instead of overflowing.
        let long = [0xffu8; 4096];
        let _ = calc_hash(&long);
        assert_ne!(calc_hash(b"foo"), calc_hash(b"bar"));
    }

    #[test]
    fn test_object_layout() {
        let object =
            Object::try_new_in(Tag::String, b"hello", calc_hash(b"hello"), Global).unwrap();
        assert_eq!(5, object.len());
        assert_eq!(b"hello", object.as_bytes());
        assert_eq!(b"hello\0", object.as_bytes_with_nul());
        assert_eq!(calc_hash(b"hello"), object.hash());
        assert_eq!(Tag::String, object.tag());
    }

    #[test]
    fn test_empty_object_is_terminated() {
        let object = Object::try_new_in(Tag::Symbol, b"", calc_hash(b""), Global).unwrap();
        assert_eq!(0, object.len());
        assert!(object.as_bytes().is_empty());
        assert_eq!(b"\0", object.as_bytes_with_nul());
    }

    #[test]
    fn test_tag_display() {
        assert_eq!("string", Tag::String.to_string());
        assert_eq!("symbol", Tag::Symbol.to_string());
    }
}
