//! Benchmarks the full pipeline (lex through VM execution) on a handful of
//! representative documents, and the individual stages on the larger one
//! so regressions in a single stage don't hide behind the others.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use svgscene::{compile, run};

const SINGLE_RECT: &str = r#"Rectangle { x: 0 y: 0 width: 40 height: 20 fill_color: "blue" }"#;

const NESTED_TREE: &str = r#"
def Row { int spacing: 4; }

Row {
    id: row
    Rectangle { id: a x: 0 y: 0 width: 10 height: 10 fill_color: "red" }
    Rectangle { id: b x: a.width + row.spacing y: 0 width: 10 height: 10 fill_color: "green" }
    Rectangle { x: b.x + b.width + row.spacing y: 0 width: 10 height: 10 fill_color: "blue" }
}
"#;

const LOOP_HEAVY: &str = r#"
def Counter {
    int total: 0;
    def draw() {
        int i: 0;
        while (i < 200) {
            total = total + i;
            i = i + 1;
        }
        print(total);
    }
}

Counter { id: c }
"#;

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("compile_single_rect", |b| {
        b.iter(|| black_box(compile(SINGLE_RECT).unwrap()));
    });
    c.bench_function("run_single_rect", |b| {
        b.iter(|| black_box(run(SINGLE_RECT).unwrap()));
    });

    c.bench_function("compile_nested_tree", |b| {
        b.iter(|| black_box(compile(NESTED_TREE).unwrap()));
    });
    c.bench_function("run_nested_tree", |b| {
        b.iter(|| black_box(run(NESTED_TREE).unwrap()));
    });

    c.bench_function("run_loop_heavy", |b| {
        b.iter(|| black_box(run(LOOP_HEAVY).unwrap()));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
