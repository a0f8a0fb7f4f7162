//! File formats at the engine boundary: run files, relevance
//! judgments, and the corpus/query sources.
//!
//! Run and judgment lines that do not match their expected shape are
//! skipped, never fatal. Unreadable files and corpus/query documents
//! that are not valid JSON abort the run.

use crate::error::RanklabError;
use crate::metrics::Judgments;
use crate::rank::{Run, RunEntry, ScoredDoc};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Str(String),
    Num(i64),
}

impl IdValue {
    fn into_string(self) -> String {
        match self {
            IdValue::Str(s) => s,
            IdValue::Num(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CorpusDoc {
    #[serde(alias = "name")]
    id: IdValue,
    #[serde(alias = "content", alias = "body")]
    text: String,
}

#[derive(Debug, Deserialize)]
struct QueryRecord {
    #[serde(alias = "qid")]
    query_id: IdValue,
    #[serde(alias = "question")]
    text: String,
}

fn parse_error(path: &Path, message: impl ToString) -> RanklabError {
    RanklabError::Parse { path: path.display().to_string(), message: message.to_string() }
}

/// Load a JSONL corpus: one `{"id", "text"}` object per line (the
/// `name`/`content` field names are accepted as aliases). Blank lines
/// are ignored; a line that is not valid JSON aborts the load.
pub fn load_corpus(path: &Path) -> Result<Vec<(String, String)>, RanklabError> {
    let reader = BufReader::new(File::open(path)?);
    let mut docs = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: CorpusDoc = serde_json::from_str(&line)
            .map_err(|e| parse_error(path, format!("line {}: {e}", lineno + 1)))?;
        docs.push((doc.id.into_string(), doc.text));
    }
    tracing::info!(num_docs = docs.len(), path = %path.display(), "corpus loaded");
    Ok(docs)
}

/// Load a JSON array of `{"query_id", "text"}` objects. When `filter`
/// is given, only query ids listed in it (first whitespace-delimited
/// field per line) are kept; query-file order is preserved.
pub fn load_queries(
    path: &Path,
    filter: Option<&Path>,
) -> Result<Vec<(String, String)>, RanklabError> {
    let reader = BufReader::new(File::open(path)?);
    let records: Vec<QueryRecord> =
        serde_json::from_reader(reader).map_err(|e| parse_error(path, e))?;

    let keep: Option<std::collections::HashSet<String>> = match filter {
        Some(fpath) => {
            let reader = BufReader::new(File::open(fpath)?);
            let mut ids = std::collections::HashSet::new();
            for line in reader.lines() {
                let line = line?;
                if let Some(id) = line.split_whitespace().next() {
                    ids.insert(id.to_string());
                }
            }
            Some(ids)
        }
        None => None,
    };

    let queries: Vec<(String, String)> = records
        .into_iter()
        .map(|r| (r.query_id.into_string(), r.text))
        .filter(|(qid, _)| keep.as_ref().map_or(true, |k| k.contains(qid)))
        .collect();
    tracing::info!(num_queries = queries.len(), path = %path.display(), "queries loaded");
    Ok(queries)
}

/// Load relevance judgments: `<query_id> 0 <document_id> <grade>`,
/// exactly four whitespace-separated fields. Malformed lines are
/// skipped.
pub fn load_judgments(path: &Path) -> Result<Judgments, RanklabError> {
    let reader = BufReader::new(File::open(path)?);
    let mut judgments: Judgments = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 4 {
            continue;
        }
        let Ok(grade) = parts[3].parse::<u32>() else {
            continue;
        };
        judgments
            .entry(parts[0].to_string())
            .or_default()
            .insert(parts[2].to_string(), grade);
    }
    tracing::info!(num_queries = judgments.len(), path = %path.display(), "judgments loaded");
    Ok(judgments)
}

/// Write a run in the six-field line format:
/// `<query_id> Q0 <document_id> <rank> <score> <tag>`, ranks 1-based,
/// scores at fixed 6-decimal precision.
pub fn write_run(path: &Path, run: &Run) -> Result<(), RanklabError> {
    let mut out = BufWriter::new(File::create(path)?);
    for entry in &run.entries {
        for (i, result) in entry.ranking.iter().enumerate() {
            writeln!(
                out,
                "{} Q0 {} {} {:.6} {}",
                entry.query_id,
                result.doc_id,
                i + 1,
                result.score,
                run.tag
            )?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Parse a run file. Document ids may contain spaces: everything
/// between the `<query_id> Q0` prefix and the trailing
/// `<rank> <score> <tag>` suffix is the id. Lines with fewer than six
/// fields, a missing `Q0`, or unparseable rank/score are skipped.
/// Rankings are ordered by the rank field; queries keep first-seen
/// order.
pub fn load_run(path: &Path) -> Result<Run, RanklabError> {
    let reader = BufReader::new(File::open(path)?);
    let mut order: Vec<String> = Vec::new();
    let mut by_query: HashMap<String, Vec<(u64, ScoredDoc)>> = HashMap::new();
    let mut tag = String::from("run");

    for line in reader.lines() {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 6 || parts[1] != "Q0" {
            continue;
        }
        let n = parts.len();
        let Ok(rank) = parts[n - 3].parse::<u64>() else {
            continue;
        };
        let Ok(score) = parts[n - 2].parse::<f64>() else {
            continue;
        };
        let doc_id = parts[2..n - 3].join(" ");
        tag = parts[n - 1].to_string();
        let query_id = parts[0].to_string();
        if !by_query.contains_key(&query_id) {
            order.push(query_id.clone());
        }
        by_query
            .entry(query_id)
            .or_default()
            .push((rank, ScoredDoc { doc_id, score }));
    }

    let entries = order
        .into_iter()
        .map(|query_id| {
            let mut results = by_query.remove(&query_id).unwrap_or_default();
            results.sort_by_key(|&(rank, _)| rank);
            RunEntry { query_id, ranking: results.into_iter().map(|(_, r)| r).collect() }
        })
        .collect();
    Ok(Run { tag, entries })
}
