//! Benchmarks for conversion.
//!
//! Measures the cached conversion paths:
//! - Scalars (numeric and string parsing)
//! - Structures with nested members and lists
//! - Structures into string-keyed maps
//! - Prebuilt converters, which skip resolution entirely

extern crate conv;

use std::collections::HashMap;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use conv::{convert, new_converter, options, Dynamic, Reflect};

#[derive(Reflect, Default, Clone)]
pub struct Item {
    pub sku: String,
    pub qty: u32,
    pub price: f64,
}

#[derive(Reflect, Default, Clone)]
pub struct ItemView {
    pub sku: String,
    pub qty: i64,
    pub price: String,
}

#[derive(Reflect, Default, Clone)]
pub struct Cart {
    pub id: u64,
    pub owner: String,
    pub items: Vec<Item>,
    pub note: Option<String>,
}

#[derive(Reflect, Default, Clone)]
pub struct CartView {
    pub id: i64,
    pub owner: String,
    pub items: Vec<ItemView>,
    pub note: Option<String>,
}

fn cart() -> Cart {
    Cart {
        id: 9,
        owner: "ada".into(),
        items: (0..16)
            .map(|i| Item {
                sku: format!("sku-{i}"),
                qty: i,
                price: f64::from(i) * 1.5,
            })
            .collect(),
        note: Some("gift".into()),
    }
}

/// Benchmark a widening integer conversion.
fn bench_scalar_numeric(c: &mut Criterion) {
    c.bench_function("convert_scalar_numeric", |b| {
        b.iter(|| {
            let out: i64 = convert(black_box(&42u16), &[]).unwrap();
            black_box(out)
        });
    });
}

/// Benchmark parsing a string into a float.
fn bench_scalar_parse(c: &mut Criterion) {
    let text = "1234.5".to_string();
    c.bench_function("convert_scalar_parse", |b| {
        b.iter(|| {
            let out: f64 = convert(black_box(&text), &[]).unwrap();
            black_box(out)
        });
    });
}

/// Benchmark a structure with a list of nested structures.
fn bench_struct_nested(c: &mut Criterion) {
    let src = cart();
    c.bench_function("convert_struct_nested", |b| {
        b.iter(|| {
            let out: CartView = convert(black_box(&src), &[]).unwrap();
            black_box(out)
        });
    });
}

/// Benchmark the same structure with options, which adds fingerprinting.
fn bench_struct_with_options(c: &mut Criterion) {
    let src = cart();
    c.bench_function("convert_struct_with_options", |b| {
        b.iter(|| {
            let opts = [options::banned(["note"]), options::alias("owner", "id")];
            let out: CartView = convert(black_box(&src), &opts).unwrap();
            black_box(out)
        });
    });
}

/// Benchmark a structure into a dynamic map.
fn bench_struct_to_map(c: &mut Criterion) {
    let src = cart();
    c.bench_function("convert_struct_to_map", |b| {
        b.iter(|| {
            let out: HashMap<String, Dynamic> = convert(black_box(&src), &[]).unwrap();
            black_box(out)
        });
    });
}

/// Benchmark a prebuilt converter.
fn bench_prebuilt_converter(c: &mut Criterion) {
    let src = cart();
    let converter = new_converter::<CartView, Cart>(&[]).unwrap();
    c.bench_function("convert_prebuilt", |b| {
        b.iter(|| {
            let mut out = CartView::default();
            converter.convert(&mut out, black_box(&src)).unwrap();
            black_box(out)
        });
    });
}

criterion_group!(
    benches,
    bench_scalar_numeric,
    bench_scalar_parse,
    bench_struct_nested,
    bench_struct_with_options,
    bench_struct_to_map,
    bench_prebuilt_converter,
);
criterion_main!(benches);
