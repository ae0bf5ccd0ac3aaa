// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The symbol cache is an open-addressing hash set holding every live symbol
//! of the program. Symbols are interned so there is a single copy of each
//! name, and symbol equality is just a comparison of [ObjectRef]s.
//!
//! The cache does not own symbol memory. Objects live in a
//! [symcache_heap::Heap]; the cache keeps non-owning refs and is told by the
//! heap's sweep, through [symcache_heap::SweepObserver], when a symbol dies.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod cache;
mod config;
mod context;
mod error;
mod gensym;
pub mod hash;

pub use cache::*;
pub use config::*;
pub use context::*;
pub use error::*;
pub use gensym::SUFFIX_SPACE;

pub use symcache_heap::{Heap, HeapError, Object, ObjectRef, SweepStats, Tag};
