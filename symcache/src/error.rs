// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use symcache_heap::{AllocError, HeapError};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("out of memory")]
    OutOfMemory,
    #[error("no unused name found after {attempts} candidates")]
    NamespaceExhausted { attempts: u64 },
    #[error(transparent)]
    Heap(#[from] HeapError),
}

impl From<AllocError> for Error {
    fn from(_: AllocError) -> Error {
        Error::OutOfMemory
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Error {
        Error::OutOfMemory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symcache_heap::Tag;

    #[test]
    fn test_display() {
        assert_eq!("out of memory", Error::OutOfMemory.to_string());
        assert_eq!(
            "no unused name found after 12 candidates",
            Error::NamespaceExhausted { attempts: 12 }.to_string()
        );
        let err = Error::from(HeapError::TagMismatch {
            expected: Tag::String,
            actual: Tag::Symbol,
        });
        assert_eq!("expected a string object, found a symbol object", err.to_string());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Error::OutOfMemory, Error::from(AllocError));
        let mut v = Vec::<u64>::new();
        let reserve = v.try_reserve_exact(usize::MAX).unwrap_err();
        assert_eq!(Error::OutOfMemory, Error::from(reserve));
    }
}
