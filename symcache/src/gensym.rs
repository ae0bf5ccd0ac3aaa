// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Generation of fresh symbols for machine-made names.

use crate::hash::calc_hash;
use crate::{Error, Location, Symbol, SymbolCache};
use symcache_heap::{Allocator, Heap, Tag};
use tracing::{trace, warn};

const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_=";
const DIGITS: usize = 6;
const BASE: u8 = 64;

/// Number of distinct suffixes, 64^6.
pub const SUFFIX_SPACE: u64 = (BASE as u64).pow(DIGITS as u32);

/// Adds one to a big-endian base-64 number, wrapping to all zeroes.
fn increment(counter: &mut [u8; DIGITS]) {
    for digit in counter.iter_mut().rev() {
        *digit += 1;
        if *digit < BASE {
            return;
        }
        *digit = 0;
    }
}

impl SymbolCache {
    /// Creates a symbol named `prefix_XXXXXX` that does not exist yet, where
    /// each `X` is a base-64 digit.
    ///
    /// Candidates are tried in counter order starting from `prefix_000000`,
    /// and each one is checked against the table for real. Fails with
    /// [Error::NamespaceExhausted] when the suffix space, or the configured
    /// attempt limit, runs out.
    ///
    /// Since every call restarts at `prefix_000000`, the k-th call for a
    /// prefix costs O(k) probes.
    pub fn try_gensym<A: Allocator + Clone>(
        &mut self,
        heap: &mut Heap<A>,
        prefix: &[u8],
    ) -> Result<Symbol, Error> {
        let mut name = Vec::new();
        name.try_reserve_exact(prefix.len() + 1 + DIGITS)?;
        name.extend_from_slice(prefix);
        name.push(b'_');
        let suffix = name.len();
        name.resize(suffix + DIGITS, ALPHABET[0]);

        // One before the first candidate, so the first increment yields zero.
        let mut counter = [BASE - 1; DIGITS];
        let attempts = self
            .gensym_attempt_limit()
            .map_or(SUFFIX_SPACE, |limit| limit.min(SUFFIX_SPACE));

        for attempt in 0..attempts {
            increment(&mut counter);
            for (byte, &digit) in name[suffix..].iter_mut().zip(&counter) {
                *byte = ALPHABET[digit as usize];
            }

            let hash = calc_hash(&name);
            match self.locate(heap, &name, hash) {
                Location::Vacant(slot) => {
                    let object = heap.alloc_tagged(Tag::Symbol, &name, hash)?;
                    self.put(heap, object, slot)?;
                    return Ok(Symbol(object));
                }
                Location::Found { .. } => {
                    trace!(attempt, "gensym candidate already interned");
                }
            }
        }

        warn!(
            prefix = %String::from_utf8_lossy(prefix),
            attempts,
            "gensym ran out of candidate names"
        );
        Err(Error::NamespaceExhausted { attempts })
    }

    /// Infallible form of [SymbolCache::try_gensym].
    ///
    /// # Panics
    /// Panics on allocation failure or when no unused name is left.
    #[allow(clippy::expect_used)]
    pub fn gensym<A: Allocator + Clone>(&mut self, heap: &mut Heap<A>, prefix: &[u8]) -> Symbol {
        self.try_gensym(heap, prefix).expect("gensym to find an unused name")
    }
}
