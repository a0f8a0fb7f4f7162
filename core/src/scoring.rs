use crate::error::RanklabError;
use crate::index::CollectionStats;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A statistical ranking model over a shared read-only collection index.
///
/// Implementations must return a finite score for every document,
/// including zero-length documents and query terms absent from the
/// vocabulary.
pub trait ScoringModel {
    /// The collection the model scores against.
    fn collection(&self) -> &CollectionStats;

    /// Relevance score of the document at position `doc` for the query.
    fn score(&self, query_terms: &[String], doc: usize) -> f64;

    /// Score every document and sort by score descending. The sort is
    /// stable: equal scores keep original document order. `top_k`
    /// truncates the result; `top_k >= N` returns all documents.
    fn rank(&self, query_terms: &[String], top_k: Option<usize>) -> Vec<(usize, f64)> {
        let stats = self.collection();
        let mut scored: Vec<(usize, f64)> = (0..stats.num_docs())
            .map(|doc| (doc, self.score(query_terms, doc)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        if let Some(k) = top_k {
            scored.truncate(k);
        }
        scored
    }
}

/// Okapi BM25 parameters: `k1` controls term-frequency saturation, `b`
/// controls length normalization.
#[derive(Debug, Clone, Copy)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

/// Okapi BM25 with `idf(t) = ln(1 + (N - df + 0.5) / (df + 0.5))`,
/// precomputed per distinct term at construction.
pub struct Bm25<'a> {
    stats: &'a CollectionStats,
    k1: f64,
    b: f64,
    idf: HashMap<String, f64>,
}

impl<'a> Bm25<'a> {
    pub fn new(stats: &'a CollectionStats, params: Bm25Params) -> Result<Self, RanklabError> {
        if params.k1 <= 0.0 {
            return Err(RanklabError::Config(format!("k1 must be positive, got {}", params.k1)));
        }
        if !(0.0..=1.0).contains(&params.b) {
            return Err(RanklabError::Config(format!("b must be in [0, 1], got {}", params.b)));
        }
        let n = stats.num_docs() as f64;
        let idf = stats
            .terms()
            .map(|(term, df)| {
                let df = df as f64;
                (term.to_string(), (1.0 + (n - df + 0.5) / (df + 0.5)).ln())
            })
            .collect();
        Ok(Self { stats, k1: params.k1, b: params.b, idf })
    }
}

impl ScoringModel for Bm25<'_> {
    fn collection(&self) -> &CollectionStats {
        self.stats
    }

    fn score(&self, query_terms: &[String], doc: usize) -> f64 {
        let dl = self.stats.doc_len(doc) as f64;
        let mut total = 0.0;
        for term in query_terms {
            let tf = self.stats.term_freq(doc, term) as f64;
            if tf == 0.0 {
                // Absent terms contribute 0, never a penalty. Unseen
                // terms (df = 0) are covered by the same branch.
                continue;
            }
            let idf = self.idf.get(term).copied().unwrap_or(0.0);
            // tf > 0 implies a non-empty collection, so avg_doc_len > 0.
            let norm = self.k1 * (1.0 - self.b + self.b * dl / self.stats.avg_doc_len());
            total += idf * tf * (self.k1 + 1.0) / (tf + norm);
        }
        total
    }
}

/// Dirichlet-smoothed query-likelihood model. The background unigram
/// model is add-one smoothed over collection frequencies, so every
/// query term has a strictly positive probability and contributes a
/// finite log term for every document.
pub struct QueryLikelihood<'a> {
    stats: &'a CollectionStats,
    mu: f64,
}

impl<'a> QueryLikelihood<'a> {
    pub const DEFAULT_MU: f64 = 2000.0;

    pub fn new(stats: &'a CollectionStats, mu: f64) -> Result<Self, RanklabError> {
        if mu <= 0.0 {
            return Err(RanklabError::Config(format!("mu must be positive, got {mu}")));
        }
        Ok(Self { stats, mu })
    }
}

impl ScoringModel for QueryLikelihood<'_> {
    fn collection(&self) -> &CollectionStats {
        self.stats
    }

    fn score(&self, query_terms: &[String], doc: usize) -> f64 {
        let dl = self.stats.doc_len(doc) as f64;
        let bg_total = (self.stats.collection_len() + self.stats.vocab_size() as u64).max(1) as f64;
        let mut total = 0.0;
        for term in query_terms {
            let cf = self.stats.collection_freq(term) as f64;
            let p_bg = (cf + 1.0) / bg_total;
            let tf = self.stats.term_freq(doc, term) as f64;
            let p = (tf + self.mu * p_bg) / (dl + self.mu);
            total += p.ln();
        }
        total
    }
}
