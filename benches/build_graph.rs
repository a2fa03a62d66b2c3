use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use import_atlas::graph::GraphBuilder;
use std::fs;
use std::path::Path;

/// Chain-heavy synthetic tree: every file imports up to five predecessors.
fn synth_project(root: &Path, files: usize) {
    for i in 0..files {
        let imports: String =
            (i.saturating_sub(5)..i).map(|j| format!("import './mod{j}';\n")).collect();
        fs::write(root.join(format!("mod{i}.js")), imports).unwrap();
    }
}

fn bench_build_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_graph");

    for size in [50usize, 200] {
        let dir = tempfile::tempdir().unwrap();
        synth_project(dir.path(), size);
        let builder = GraphBuilder::new(dir.path()).expect("open root");
        group.bench_function(BenchmarkId::new("build_project", size), |b| {
            b.iter(|| {
                let graph = builder.build_project();
                black_box(graph.file_count())
            })
        });
    }

    group.finish();
}

criterion_group!(name = benches; config = Criterion::default(); targets = bench_build_graph);
criterion_main!(benches);
