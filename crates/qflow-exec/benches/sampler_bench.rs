//! Benchmarks for dynamic circuit sampling
//!
//! Run with: cargo bench -p qflow-exec

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qflow_exec::CircuitExt;
use qflow_ir::{Circuit, Cond, parse_instructions};

fn ghz_text(n: u32) -> String {
    let mut text = String::from("H 0\n");
    for q in 1..n {
        text.push_str(&format!("CX {} {}\n", q - 1, q));
    }
    text.push('M');
    for q in 0..n {
        text.push_str(&format!(" {q}"));
    }
    text
}

/// Benchmark parsing of instruction text
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for n in &[4, 16, 64] {
        let text = ghz_text(*n);
        group.bench_with_input(BenchmarkId::new("ghz", n), &text, |b, text| {
            b.iter(|| parse_instructions(black_box(text)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark static sampling over growing widths
fn bench_static_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("static_sampling");

    for n in &[2, 6, 10] {
        let circuit = Circuit::parse(&ghz_text(*n)).unwrap();
        let sampler = circuit.compile_sampler(Some(7));
        group.bench_with_input(BenchmarkId::new("ghz_100_shots", n), n, |b, _| {
            b.iter(|| sampler.sample(black_box(100)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark control flow: repeat-until-success and feed-forward
fn bench_dynamic_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_sampling");

    let mut rus = Circuit::new();
    rus.do_while("R 0\nH 0\nM 0", Cond::last_meas(0)).unwrap();
    let sampler = rus.compile_sampler(Some(1));
    group.bench_function("repeat_until_success", |b| {
        b.iter(|| sampler.sample(black_box(100)).unwrap());
    });

    let mut ff = Circuit::parse("H 0\nM 0").unwrap();
    ff.conditional(Cond::last_meas(0), "X 1").unwrap();
    ff.block("M 1").unwrap();
    let sampler = ff.compile_sampler(Some(1));
    group.bench_function("feed_forward", |b| {
        b.iter(|| sampler.sample(black_box(100)).unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_static_sampling,
    bench_dynamic_sampling
);
criterion_main!(benches);
