use criterion::{criterion_group, criterion_main, Criterion};
use ranklab_core::index::CollectionStats;
use ranklab_core::scoring::{Bm25, Bm25Params, QueryLikelihood, ScoringModel};

fn synthetic_collection(num_docs: usize, doc_len: usize, vocab: usize) -> CollectionStats {
    let docs = (0..num_docs)
        .map(|i| {
            let terms = (0..doc_len).map(|j| format!("w{}", (i * 31 + j * 7) % vocab)).collect();
            (format!("doc{i}"), terms)
        })
        .collect();
    CollectionStats::from_documents(docs)
}

fn bench_rank(c: &mut Criterion) {
    let stats = synthetic_collection(2000, 60, 800);
    let query: Vec<String> = ["w3", "w42", "w101", "w250"].iter().map(|s| s.to_string()).collect();

    let bm25 = Bm25::new(&stats, Bm25Params::default()).unwrap();
    c.bench_function("bm25_rank_2k_docs", |b| b.iter(|| bm25.rank(&query, Some(100))));

    let ql = QueryLikelihood::new(&stats, 2000.0).unwrap();
    c.bench_function("ql_rank_2k_docs", |b| b.iter(|| ql.rank(&query, Some(100))));
}

criterion_group!(benches, bench_rank);
criterion_main!(benches);
