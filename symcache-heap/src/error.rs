// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::Tag;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, thiserror::Error)]
pub enum HeapError {
    #[error("object reference is stale")]
    Stale,
    #[error("expected a {expected} object, found a {actual} object")]
    TagMismatch { expected: Tag, actual: Tag },
}
