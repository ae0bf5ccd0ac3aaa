// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;

pub const DEFAULT_CAPACITY: usize = 1024;

pub const ENV_INITIAL_CAPACITY: &str = "SYMCACHE_INITIAL_CAPACITY";
pub const ENV_GENSYM_ATTEMPT_LIMIT: &str = "SYMCACHE_GENSYM_ATTEMPT_LIMIT";

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Number of slots allocated at init. Rounded up to a power of two and
    /// to [crate::MIN_CAPACITY].
    pub initial_capacity: usize,
    /// Upper bound on the candidates tried by a single gensym call. `None`
    /// means the whole suffix space, [crate::SUFFIX_SPACE].
    pub gensym_attempt_limit: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            gensym_attempt_limit: None,
        }
    }
}

impl CacheConfig {
    /// Defaults overridden by whichever `SYMCACHE_*` variables are set and
    /// parse. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(capacity) = parse_env::int(ENV_INITIAL_CAPACITY) {
            config.initial_capacity = capacity;
        }
        if let Some(limit) = parse_env::int(ENV_GENSYM_ATTEMPT_LIMIT) {
            config.gensym_attempt_limit = Some(limit);
        }
        config
    }
}

pub mod parse_env {
    use std::{env, str::FromStr};

    pub fn int<T: FromStr>(name: &str) -> Option<T> {
        env::var(name).ok()?.trim().parse::<T>().ok()
    }
}
