// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use symcache::{CacheConfig, Slot, Symbol, SymbolContext, Tag, MIN_CAPACITY};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    // Several tests race to install the subscriber; only the first wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn small_context() -> SymbolContext {
    SymbolContext::init(&CacheConfig {
        initial_capacity: MIN_CAPACITY,
        ..CacheConfig::default()
    })
    .unwrap()
}

#[track_caller]
fn assert_load_factor(context: &SymbolContext) {
    let cache = context.cache();
    assert!(
        (cache.len() + cache.tombstones()) * 2 <= cache.capacity(),
        "{} live + {} tombstones in {} slots",
        cache.len(),
        cache.tombstones(),
        cache.capacity()
    );
}

#[test]
fn end_to_end_scenario() {
    init_logging();
    let mut context = SymbolContext::init(&CacheConfig::default()).unwrap();

    let a = context.intern_bytes(b"foo");
    assert_eq!(a, context.intern_bytes(b"foo"));
    let b = context.intern_bytes(b"bar");
    assert_ne!(a, b);

    assert!(context.remove(a.object()));

    let c = context.intern_bytes(b"foo");
    assert_ne!(a, c);
    assert_eq!(Some(&b"foo"[..]), context.resolve(c));
    assert_eq!(b, context.intern_bytes(b"bar"));
    assert_eq!(Some(&b"bar"[..]), context.resolve(b));

    context.deinit();
}

#[test]
fn end_to_end_with_collector() {
    init_logging();
    let mut context = small_context();

    let roots: Vec<Symbol> = (0..100)
        .map(|i| context.intern_str(&format!("root{i}")))
        .collect();
    let garbage: Vec<Symbol> = (0..100)
        .map(|i| context.intern_str(&format!("garbage{i}")))
        .collect();

    let root_refs: Vec<_> = roots.iter().map(|s| s.object()).collect();
    let stats = context.collect(&root_refs);
    assert_eq!(100, stats.reclaimed);
    assert_eq!(100, stats.symbols);
    assert_eq!(100, context.cache().len());
    assert_load_factor(&context);

    for (i, root) in roots.iter().enumerate() {
        assert_eq!(*root, context.intern_str(&format!("root{i}")));
    }
    for (i, old) in garbage.iter().enumerate() {
        assert_eq!(None, context.resolve(*old));
        let new = context.intern_str(&format!("garbage{i}"));
        assert_ne!(*old, new);
        assert_load_factor(&context);
    }
}

#[test]
fn load_factor_holds_under_churn() {
    init_logging();
    let mut context = small_context();
    let mut live: Vec<Symbol> = Vec::new();

    for round in 0..20 {
        for i in 0..50 {
            live.push(context.intern_str(&format!("r{round}_{i}")));
            assert_load_factor(&context);
        }
        // Drop every other symbol through the collector.
        let keep: Vec<_> = live.iter().step_by(2).map(|s| s.object()).collect();
        context.collect(&keep);
        live = live.into_iter().step_by(2).collect();
        assert_eq!(live.len(), context.cache().len());
        assert_load_factor(&context);
    }

    // Force a rebuild and check that it leaves no tombstones behind.
    let capacity = context.cache().capacity();
    let mut i = 0;
    while context.cache().capacity() == capacity {
        context.intern_str(&format!("grow{i}"));
        i += 1;
    }
    assert_eq!(0, context.cache().tombstones());
    assert!(context
        .cache()
        .slots()
        .iter()
        .all(|slot| *slot != Slot::Tombstone));
}

#[test]
fn promotion_zero_copy() {
    init_logging();
    let mut context = small_context();

    let miss = context.alloc_string(b"newname").unwrap();
    let promoted = context.promote_string(miss);
    assert_eq!(miss, promoted.object());
    assert_eq!(Some(Tag::Symbol), context.heap().tag(miss));

    let canonical = context.intern_str("oldname");
    let hit = context.alloc_string(b"oldname").unwrap();
    let promoted = context.promote_string(hit);
    assert_eq!(canonical, promoted);
    assert_ne!(hit, promoted.object());
    assert_eq!(Some(Tag::String), context.heap().tag(hit));
}

fn check_gensym_collision_freedom(count: usize) {
    init_logging();
    let mut context = SymbolContext::init(&CacheConfig::default()).unwrap();

    // Pre-existing names in the generator's own pattern must be skipped.
    let taken: Vec<Symbol> = ["tmp_000000", "tmp_000007", "tmp_0000zz", "tmp_00010="]
        .iter()
        .map(|name| context.intern_str(name))
        .collect();

    let mut names = HashSet::new();
    for _ in 0..count {
        let symbol = context.gensym(b"tmp");
        assert!(!taken.contains(&symbol));
        let name = context.resolve(symbol).unwrap().to_vec();
        assert_eq!(b"tmp_", &name[..4]);
        assert_eq!(10, name.len());
        assert!(names.insert(name), "gensym returned a duplicate name");
    }
    assert_eq!(count, names.len());
    for symbol in &taken {
        let name = context.resolve(*symbol).unwrap();
        assert!(!names.contains(name));
    }
    assert_eq!(count + taken.len(), context.cache().len());
    assert_load_factor(&context);
}

#[test]
fn gensym_collision_freedom() {
    check_gensym_collision_freedom(if cfg!(miri) { 100 } else { 1_000 });
}

// Every call rescans the names handed out before it, so the full run is only
// practical with optimizations: `cargo test --release`.
#[test]
#[cfg_attr(any(debug_assertions, miri), ignore)]
fn gensym_collision_freedom_10k() {
    check_gensym_collision_freedom(10_000);
}
