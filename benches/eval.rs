// SPDX-License-Identifier: Apache-2.0

//! Benchmarks evaluating selectors and applying specs against sample data.
//!

mod common;

use common::{SELECTOR_SAMPLES, eval_ctx, sample_data, sample_spec};
use criterion::{Criterion, criterion_group, criterion_main};
use refill::capabilities::{BlockingHttpFetch, PlainFormatter};
use refill::select;
use std::error::Error;

fn do_select() -> Result<(), Box<dyn Error>> {
    let fetch = BlockingHttpFetch::default();
    let formatter = PlainFormatter;
    let ctx = eval_ctx(&fetch, &formatter);
    let data = sample_data();
    let mut count = 0;
    for src in SELECTOR_SAMPLES {
        let _ = select(&data, src, &ctx)?;
        count += 1;
    }
    assert_eq!(count, SELECTOR_SAMPLES.len());
    Ok(())
}

fn do_apply_spec() -> Result<(), Box<dyn Error>> {
    let fetch = BlockingHttpFetch::default();
    let formatter = PlainFormatter;
    let ctx = eval_ctx(&fetch, &formatter);
    let data = sample_data();
    let spec = sample_spec();
    let _ = spec.apply(&data, &ctx)?;
    Ok(())
}

fn eval_selectors(c: &mut Criterion) {
    c.bench_function("Evaluate selectors", |b| b.iter(|| do_select()));
}

fn eval_apply_spec(c: &mut Criterion) {
    c.bench_function("Apply spec", |b| b.iter(|| do_apply_spec()));
}

criterion_group!(benchmarks, eval_selectors, eval_apply_spec);
criterion_main!(benchmarks);
