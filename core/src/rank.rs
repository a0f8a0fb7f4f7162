use crate::error::RanklabError;
use crate::scoring::ScoringModel;

/// One retrieved document with its model score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDoc {
    pub doc_id: String,
    pub score: f64,
}

/// Ranked results for one query, sorted by score descending with
/// stable tie-break on original document order.
#[derive(Debug, Clone)]
pub struct RunEntry {
    pub query_id: String,
    pub ranking: Vec<ScoredDoc>,
}

/// A full run: one ranking per query, in query order, never mutated
/// after construction.
#[derive(Debug, Clone)]
pub struct Run {
    pub tag: String,
    pub entries: Vec<RunEntry>,
}

/// Rank every query in `queries` with `model`, keeping at most `top_k`
/// results per query. Fails if the collection is empty; an empty query
/// term sequence is defined behavior (all documents score the model's
/// neutral value, in original order).
pub fn run_queries<M: ScoringModel>(
    model: &M,
    queries: &[(String, Vec<String>)],
    top_k: Option<usize>,
    tag: &str,
) -> Result<Run, RanklabError> {
    let stats = model.collection();
    if stats.is_empty() {
        return Err(RanklabError::Config("cannot rank against an empty collection".into()));
    }
    let mut entries = Vec::with_capacity(queries.len());
    for (query_id, terms) in queries {
        let ranking = model
            .rank(terms, top_k)
            .into_iter()
            .map(|(doc, score)| ScoredDoc { doc_id: stats.doc_id(doc).to_string(), score })
            .collect();
        entries.push(RunEntry { query_id: query_id.clone(), ranking });
    }
    tracing::info!(num_queries = entries.len(), tag, "ranked query set");
    Ok(Run { tag: tag.to_string(), entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::CollectionStats;
    use crate::scoring::{Bm25, Bm25Params};

    fn doc(id: &str, terms: &[&str]) -> (String, Vec<String>) {
        (id.to_string(), terms.iter().map(|t| t.to_string()).collect())
    }

    fn q(id: &str, terms: &[&str]) -> (String, Vec<String>) {
        (id.to_string(), terms.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn empty_collection_is_a_config_error() {
        let stats = CollectionStats::from_documents(vec![]);
        let model = Bm25::new(&stats, Bm25Params::default()).unwrap();
        let err = run_queries(&model, &[q("q1", &["x"])], None, "test").unwrap_err();
        assert!(matches!(err, RanklabError::Config(_)));
    }

    #[test]
    fn ties_keep_original_document_order() {
        // Identical documents tie exactly; the stable sort must keep
        // collection order.
        let stats = CollectionStats::from_documents(vec![
            doc("first", &["x"]),
            doc("second", &["x"]),
            doc("third", &["x"]),
        ]);
        let model = Bm25::new(&stats, Bm25Params::default()).unwrap();
        let run = run_queries(&model, &[q("q1", &["x"])], None, "t").unwrap();
        let ids: Vec<&str> = run.entries[0].ranking.iter().map(|r| r.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn truncates_to_top_k_per_query() {
        let stats = CollectionStats::from_documents(vec![
            doc("a", &["x", "x"]),
            doc("b", &["x"]),
            doc("c", &["y"]),
        ]);
        let model = Bm25::new(&stats, Bm25Params::default()).unwrap();
        let run = run_queries(&model, &[q("q1", &["x"]), q("q2", &["y"])], Some(1), "t").unwrap();
        assert_eq!(run.entries.len(), 2);
        assert_eq!(run.entries[0].ranking.len(), 1);
        assert_eq!(run.entries[0].ranking[0].doc_id, "a");
        assert_eq!(run.entries[1].ranking[0].doc_id, "c");
    }
}
