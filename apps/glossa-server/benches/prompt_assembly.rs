//! Prompt Assembly Benchmarks
//!
//! Prompt building runs on every copy-to-clipboard click, so it should stay
//! well under a millisecond even for dense pages.
//!
//! Run with: `cargo bench --bench prompt_assembly`

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use glossa_server::session::prompt::build_prompt;

/// Synthetic page text of roughly `words` words
fn page_text(words: usize) -> String {
    let mut text = String::new();
    for i in 0..words {
        if i > 0 {
            text.push(' ');
        }
        text.push_str("lorem");
    }
    text
}

fn populated_cache(pages: usize, words_per_page: usize) -> HashMap<usize, String> {
    (1..=pages).map(|n| (n, page_text(words_per_page))).collect()
}

fn bench_prompt_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("prompt_assembly");

    for words_per_page in [100usize, 500, 2000] {
        let cache = populated_cache(50, words_per_page);
        // Rough bytes of the three-page context window
        group.throughput(Throughput::Bytes((words_per_page * 6 * 3) as u64));
        group.bench_with_input(
            BenchmarkId::new("three_page_window", words_per_page),
            &cache,
            |b, cache| {
                b.iter(|| build_prompt(black_box("selected phrase"), black_box(25), cache));
            },
        );
    }

    group.finish();
}

fn bench_edge_pages(c: &mut Criterion) {
    let cache = populated_cache(50, 500);

    c.bench_function("prompt_assembly/first_page", |b| {
        b.iter(|| build_prompt(black_box("selected phrase"), black_box(1), &cache));
    });

    c.bench_function("prompt_assembly/last_page", |b| {
        b.iter(|| build_prompt(black_box("selected phrase"), black_box(50), &cache));
    });
}

criterion_group!(benches, bench_prompt_assembly, bench_edge_pages);
criterion_main!(benches);
