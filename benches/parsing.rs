use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lossless_yaml::{parse_cst, parse_document, stringify, Options};

const CONFIG: &str = "# service definition
name: web # public name
image: registry.example.com/web:1.4.2

ports: [80, 443]
env:
  LOG_LEVEL: info
  RETRIES: 3
  TIMEOUT: 2.5
volumes:
  - /data:/var/lib/data
  - /logs:/var/log
description: |
  Serves the public site.
  Restarted nightly.
";

fn block_map(size: usize) -> String {
    (0..size)
        .map(|i| format!("key{i}: value {i} # note {i}\n"))
        .collect()
}

fn flow_seq(size: usize) -> String {
    let items: Vec<String> = (0..size).map(|i| i.to_string()).collect();
    format!("[{}]\n", items.join(", "))
}

fn nested(depth: usize) -> String {
    let mut out = String::new();
    for level in 0..depth {
        out.push_str(&"  ".repeat(level));
        out.push_str(&format!("level{level}:\n"));
    }
    out.push_str(&"  ".repeat(depth));
    out.push_str("leaf: true\n");
    out
}

fn benchmark_parse_cst(c: &mut Criterion) {
    c.bench_function("parse_cst_config", |b| b.iter(|| parse_cst(black_box(CONFIG))));
}

fn benchmark_parse_document(c: &mut Criterion) {
    c.bench_function("parse_document_config", |b| {
        b.iter(|| parse_document(black_box(CONFIG)))
    });
}

fn benchmark_block_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_map");

    for size in [10, 100, 1000].iter() {
        let src = block_map(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &src, |b, src| {
            b.iter(|| parse_document(black_box(src)))
        });
    }
    group.finish();
}

fn benchmark_flow_seq(c: &mut Criterion) {
    let mut group = c.benchmark_group("flow_seq");

    for size in [10, 100, 1000].iter() {
        let src = flow_seq(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &src, |b, src| {
            b.iter(|| parse_document(black_box(src)))
        });
    }
    group.finish();
}

fn benchmark_nested(c: &mut Criterion) {
    let src = nested(32);
    c.bench_function("parse_nested_32", |b| b.iter(|| parse_document(black_box(&src))));
}

fn benchmark_stringify(c: &mut Criterion) {
    let mut group = c.benchmark_group("stringify");

    let doc = parse_document(CONFIG);
    group.bench_function("document_config", |b| b.iter(|| black_box(&doc).to_string()));

    let big = parse_document(&block_map(1000));
    let options = Options::new();
    if let Some(node) = big.contents.as_ref() {
        group.bench_function("block_map_1000", |b| {
            b.iter(|| stringify(black_box(node), &options))
        });
    }
    group.finish();
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let doc = parse_document(CONFIG);
    let json = serde_json::to_string(&doc).unwrap();

    let mut group = c.benchmark_group("comparison");

    group.bench_function("yaml_parse", |b| b.iter(|| parse_document(black_box(CONFIG))));
    group.bench_function("json_parse", |b| {
        b.iter(|| serde_json::from_str::<serde_json::Value>(black_box(&json)))
    });
    group.bench_function("yaml_to_json", |b| {
        b.iter(|| serde_json::to_value(black_box(&doc)))
    });
    group.finish();
}

fn benchmark_roundtrip(c: &mut Criterion) {
    c.bench_function("roundtrip_config", |b| {
        b.iter(|| {
            let doc = parse_document(black_box(CONFIG));
            parse_document(&doc.to_string())
        })
    });
}

criterion_group!(
    benches,
    benchmark_parse_cst,
    benchmark_parse_document,
    benchmark_block_map,
    benchmark_flow_seq,
    benchmark_nested,
    benchmark_stringify,
    benchmark_comparison_with_json,
    benchmark_roundtrip
);
criterion_main!(benches);
