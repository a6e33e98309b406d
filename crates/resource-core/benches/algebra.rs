// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the resource algebra.
//!
//! Every monitor operation performs O(tags) algebra under a mutex, so
//! these are the critical-section costs.

use criterion::{criterion_group, criterion_main, Criterion};
use resource_core::{DeviceSpec, ResourceTag, Resources};
use std::hint::black_box;

/// Builds a map covering `n` GPUs with memory, compute, and stream tags.
fn fleet(n: u32, base: u64) -> Resources {
    let mut r = Resources::new();
    for i in 0..n {
        let dev = DeviceSpec::gpu(i);
        r.set(ResourceTag::memory(dev), base + i as u64);
        r.set(ResourceTag::compute(dev), 4);
        r.set(ResourceTag::stream(dev), 128);
    }
    r
}

fn bench_contains(c: &mut Criterion) {
    let avail = fleet(8, 8 << 30);
    let req = fleet(8, 1 << 30);
    c.bench_function("contains/8gpu", |b| {
        b.iter(|| black_box(&avail).contains(black_box(&req)))
    });
}

fn bench_merge_subtract(c: &mut Criterion) {
    let delta = fleet(8, 1 << 30);
    c.bench_function("merge_subtract/8gpu", |b| {
        b.iter(|| {
            let mut acc = fleet(8, 8 << 30);
            acc.merge(black_box(&delta), false);
            acc.subtract(black_box(&delta), false);
            acc
        })
    });
}

fn bench_debug_string(c: &mut Criterion) {
    let r = fleet(8, 8 << 30);
    c.bench_function("debug_string/8gpu", |b| {
        b.iter(|| black_box(&r).debug_string("  "))
    });
}

criterion_group!(benches, bench_contains, bench_merge_subtract, bench_debug_string);
criterion_main!(benches);
