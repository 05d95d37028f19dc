//! Lexer throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dtc_lex::tokenize;
use dtc_util::FileId;

fn bench_declaration_line(c: &mut Criterion) {
    let line = "int accumulator = (first + second) * third - fourth / 2;";
    c.bench_function("lex_declaration_line", |b| {
        b.iter(|| {
            let mut tokens = Vec::new();
            tokenize(black_box(line), 1, FileId(0), &mut tokens).unwrap();
            tokens
        })
    });
}

fn bench_operator_heavy_line(c: &mut Criterion) {
    let line = "a <<= b >>= c |= d &= e ^= f ~= g == h != i <= j >= k && l || m";
    c.bench_function("lex_operator_heavy_line", |b| {
        b.iter(|| {
            let mut tokens = Vec::new();
            tokenize(black_box(line), 1, FileId(0), &mut tokens).unwrap();
            tokens
        })
    });
}

fn bench_function_program(c: &mut Criterion) {
    let lines: Vec<String> = (0..64)
        .map(|i| format!("int value{i} = {i} * ({i} + 1); # running product"))
        .collect();
    c.bench_function("lex_64_line_program", |b| {
        b.iter(|| {
            let mut tokens = Vec::new();
            for (idx, line) in lines.iter().enumerate() {
                tokenize(black_box(line), idx as u32 + 1, FileId(0), &mut tokens).unwrap();
            }
            tokens
        })
    });
}

criterion_group!(
    benches,
    bench_declaration_line,
    bench_operator_heavy_line,
    bench_function_program
);
criterion_main!(benches);
