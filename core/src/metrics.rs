//! Ranking quality metrics over a run and a set of relevance judgments.
//!
//! Queries are included only when they appear in both the run and the
//! judgments *and* carry at least one grade > 0 judgment; queries with
//! no relevant documents are silently skipped and contribute to none
//! of the averages, including `num_q`. All per-query metrics are macro
//! averages (one value per query, then the mean over queries); the
//! pooled counters `num_ret`/`num_rel`/`num_rel_ret` and the
//! micro-recall diagnostic are the only cross-query totals.

use crate::rank::{Run, ScoredDoc};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Judgments: query id -> document id -> relevance grade. Documents
/// absent from the inner map are implicitly grade 0.
pub type Judgments = HashMap<String, HashMap<String, u32>>;

pub const DEFAULT_RECALL_CUTOFFS: &[usize] = &[5, 10, 15, 20, 30, 100, 200, 500, 1000];

#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub recall_cutoffs: Vec<usize>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self { recall_cutoffs: DEFAULT_RECALL_CUTOFFS.to_vec() }
    }
}

/// Metrics for a single included query. `recall_at` and `hits_at` are
/// parallel to the cutoff list passed to [`evaluate_query`].
#[derive(Debug, Clone)]
pub struct QueryEval {
    pub num_ret: usize,
    pub total_rel: usize,
    pub num_rel_ret: usize,
    pub recall_at: Vec<f64>,
    pub hits_at: Vec<usize>,
    pub p_at_10: f64,
    pub reciprocal_rank: f64,
    pub average_precision: f64,
    pub ndcg_at_10: f64,
}

fn gain(grade: u32) -> f64 {
    2f64.powi(grade as i32) - 1.0
}

fn discount(rank: usize) -> f64 {
    ((rank + 1) as f64).log2()
}

/// Evaluate one ranking against one judgment map. Returns `None` when
/// the judgments contain no relevant (grade > 0) document; such
/// queries are excluded from every aggregate.
pub fn evaluate_query(
    retrieved: &[ScoredDoc],
    judgments: &HashMap<String, u32>,
    cutoffs: &[usize],
) -> Option<QueryEval> {
    let relevant: HashSet<&str> = judgments
        .iter()
        .filter(|(_, &g)| g > 0)
        .map(|(d, _)| d.as_str())
        .collect();
    let total_rel = relevant.len();
    if total_rel == 0 {
        return None;
    }

    let mut num_rel_ret = 0usize;
    let mut first_rel_rank: Option<usize> = None;
    let mut precision_sum = 0.0;
    let mut hits_in_top_10 = 0usize;
    let mut dcg = 0.0;
    let mut hits_at = vec![0usize; cutoffs.len()];

    for (i, result) in retrieved.iter().enumerate() {
        let rank = i + 1;
        let is_rel = relevant.contains(result.doc_id.as_str());
        if is_rel {
            num_rel_ret += 1;
            if first_rel_rank.is_none() {
                first_rel_rank = Some(rank);
            }
            // Precision at this rank, accumulated for AP. num_rel_ret
            // is the cumulative relevant-hit count at `rank`.
            precision_sum += num_rel_ret as f64 / rank as f64;
            for (c, &k) in cutoffs.iter().enumerate() {
                if rank <= k {
                    hits_at[c] += 1;
                }
            }
        }
        if rank <= 10 {
            // P@10 keeps its own counter so it stays independently
            // testable from the AP accumulation above.
            if is_rel {
                hits_in_top_10 += 1;
            }
            let grade = judgments.get(result.doc_id.as_str()).copied().unwrap_or(0);
            dcg += gain(grade) / discount(rank);
        }
    }

    let recall_at = hits_at.iter().map(|&h| h as f64 / total_rel as f64).collect();
    // Fewer than 10 retrieved: the denominator is what was retrieved.
    let p_denom = retrieved.len().min(10);
    let p_at_10 = if p_denom == 0 { 0.0 } else { hits_in_top_10 as f64 / p_denom as f64 };
    let reciprocal_rank = first_rel_rank.map_or(0.0, |r| 1.0 / r as f64);
    // Normalized by total_rel, not by the number of hits: missing
    // relevant documents pull AP down.
    let average_precision = precision_sum / total_rel as f64;

    // Ideal DCG comes from the judged grades, not from what was
    // retrieved.
    let mut graded: Vec<u32> = judgments.values().copied().collect();
    graded.sort_unstable_by(|a, b| b.cmp(a));
    let idcg: f64 = graded
        .iter()
        .take(10)
        .enumerate()
        .map(|(i, &g)| gain(g) / discount(i + 1))
        .sum();
    let ndcg_at_10 = if idcg > 0.0 { dcg / idcg } else { 0.0 };

    Some(QueryEval {
        num_ret: retrieved.len(),
        total_rel,
        num_rel_ret,
        recall_at,
        hits_at,
        p_at_10,
        reciprocal_rank,
        average_precision,
        ndcg_at_10,
    })
}

/// Aggregated report over all included queries.
#[derive(Debug, Clone)]
pub struct EvalReport {
    pub run_tag: String,
    pub num_q: usize,
    pub num_ret: usize,
    pub num_rel: usize,
    pub num_rel_ret: usize,
    pub map: f64,
    pub p_at_10: f64,
    pub mrr: f64,
    pub ndcg_at_10: f64,
    pub recall_cutoffs: Vec<usize>,
    /// Macro recall@K, parallel to `recall_cutoffs`.
    pub recall_at: Vec<f64>,
    /// Pooled micro-recall@K diagnostic, parallel to `recall_cutoffs`.
    /// Never a substitute for the macro values.
    pub micro_recall_at: Vec<f64>,
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

/// Evaluate a run against judgments, macro-averaging per-query metrics
/// and pooling the raw counters.
pub fn evaluate_run(run: &Run, judgments: &Judgments, config: &EvalConfig) -> EvalReport {
    let cutoffs = &config.recall_cutoffs;
    let mut evals: Vec<QueryEval> = Vec::new();
    let mut num_ret = 0usize;
    let mut num_rel = 0usize;
    let mut num_rel_ret = 0usize;
    let mut micro_hits = vec![0usize; cutoffs.len()];

    for entry in &run.entries {
        let Some(judged) = judgments.get(&entry.query_id) else {
            tracing::debug!(query_id = %entry.query_id, "query not judged, skipped");
            continue;
        };
        let Some(eval) = evaluate_query(&entry.ranking, judged, cutoffs) else {
            tracing::debug!(query_id = %entry.query_id, "no relevant judgments, skipped");
            continue;
        };
        num_ret += eval.num_ret;
        num_rel += eval.total_rel;
        num_rel_ret += eval.num_rel_ret;
        for (c, &h) in eval.hits_at.iter().enumerate() {
            micro_hits[c] += h;
        }
        evals.push(eval);
    }

    let num_q = evals.len();
    let micro_recall_at = micro_hits
        .iter()
        .map(|&h| if num_rel == 0 { 0.0 } else { h as f64 / num_rel as f64 })
        .collect();
    let recall_at = (0..cutoffs.len())
        .map(|c| mean(evals.iter().map(|e| e.recall_at[c]), num_q))
        .collect();

    tracing::debug!(num_q, num_ret, num_rel_ret, "run evaluated");

    EvalReport {
        run_tag: run.tag.clone(),
        num_q,
        num_ret,
        num_rel,
        num_rel_ret,
        map: mean(evals.iter().map(|e| e.average_precision), num_q),
        p_at_10: mean(evals.iter().map(|e| e.p_at_10), num_q),
        mrr: mean(evals.iter().map(|e| e.reciprocal_rank), num_q),
        ndcg_at_10: mean(evals.iter().map(|e| e.ndcg_at_10), num_q),
        recall_cutoffs: cutoffs.clone(),
        recall_at,
        micro_recall_at,
    }
}

impl EvalReport {
    /// The pooled micro-recall diagnostic as its own table, kept apart
    /// from the macro report.
    pub fn micro_recall_table(&self) -> String {
        let mut out = String::from("micro-recall (pooled over queries):\n");
        for (&k, &r) in self.recall_cutoffs.iter().zip(&self.micro_recall_at) {
            out.push_str(&format!("recall@{k:<4} all {r:.4}\n"));
        }
        out
    }
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "runid all {}", self.run_tag)?;
        writeln!(f, "num_q    all {}", self.num_q)?;
        writeln!(f, "num_ret  all {}", self.num_ret)?;
        writeln!(f, "num_rel  all {}", self.num_rel)?;
        writeln!(f, "num_rel_ret all {}", self.num_rel_ret)?;
        writeln!(f, "map      all {:.4}", self.map)?;
        writeln!(f, "P_10     all {:.4}", self.p_at_10)?;
        for (&k, &r) in self.recall_cutoffs.iter().zip(&self.recall_at) {
            writeln!(f, "recall_{k:<3} all {r:.4}")?;
        }
        writeln!(f, "MRR      all {:.4}", self.mrr)?;
        writeln!(f, "ndcg_cut_10 all {:.4}", self.ndcg_at_10)?;
        Ok(())
    }
}
