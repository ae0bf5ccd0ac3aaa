// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Object memory for the symbol cache.
//!
//! Every object lives in a [Heap] block and is addressed by an [ObjectRef],
//! an index plus a generation counter. A ref stays the object's identity
//! until the block is reclaimed; after that the generation no longer matches
//! and every accessor treats the ref as stale instead of aliasing whatever
//! object reuses the block.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod error;
mod heap;
mod object;

pub use error::*;
pub use heap::*;
pub use object::*;

// Expose allocator_api2 for our users.
pub use allocator_api2::alloc::{AllocError, Allocator, Global};
