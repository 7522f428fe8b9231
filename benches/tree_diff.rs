use criterion::{black_box, criterion_group, criterion_main, Criterion};
use md_publish::markdown::markdown_to_blocks;
use md_publish::tree::{build_hash_tree, diff, ScanEntry};

fn sample_entries(edit: usize) -> Vec<ScanEntry> {
    let mut entries = Vec::new();
    for dir in 0..20 {
        entries.push(ScanEntry::directory(format!("section-{dir}")));
        for file in 0..50 {
            let content = if dir * 50 + file == edit {
                format!("# Page {file}\n\nEdited body.")
            } else {
                format!("# Page {file}\n\nBody of page {file} in section {dir}.")
            };
            entries.push(ScanEntry::file(
                format!("section-{dir}/page-{file}.md"),
                content,
            ));
        }
    }
    entries
}

fn tree_bench(c: &mut Criterion) {
    let entries = sample_entries(usize::MAX);
    c.bench_function("build_hash_tree_1000_files", |b| {
        b.iter(|| build_hash_tree(black_box(&entries)).unwrap());
    });

    let old = build_hash_tree(&entries).unwrap();
    let new = build_hash_tree(&sample_entries(517)).unwrap();
    c.bench_function("diff_single_edit_1000_files", |b| {
        b.iter(|| diff(black_box(Some(&old)), black_box(&new)));
    });
}

fn markdown_bench(c: &mut Criterion) {
    let doc = "# Title\n\nSome **bold** and `code` with a [link](https://example.com).\n\n- one\n- two\n\n```rust\nfn main() {}\n```\n".repeat(50);
    c.bench_function("markdown_to_blocks_50_sections", |b| {
        b.iter(|| markdown_to_blocks(black_box(&doc)));
    });
}

criterion_group!(benches, tree_bench, markdown_bench);
criterion_main!(benches);
