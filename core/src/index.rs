use std::collections::HashMap;

/// Collection-wide statistics built once from segmented documents.
///
/// Read-only after construction. Document positional index is stable
/// for the lifetime of a run and is the join key between scores and
/// external document ids.
pub struct CollectionStats {
    doc_ids: Vec<String>,
    term_freqs: Vec<HashMap<String, u32>>,
    doc_lens: Vec<u32>,
    cf: HashMap<String, u64>,
    df: HashMap<String, u32>,
    collection_len: u64,
    avg_doc_len: f64,
}

impl CollectionStats {
    /// Build statistics from an ordered sequence of (document id, term
    /// sequence) pairs. Zero documents and zero-length documents are
    /// both legal; derived aggregates stay finite.
    pub fn from_documents(docs: Vec<(String, Vec<String>)>) -> Self {
        let mut doc_ids = Vec::with_capacity(docs.len());
        let mut term_freqs = Vec::with_capacity(docs.len());
        let mut doc_lens = Vec::with_capacity(docs.len());
        let mut cf: HashMap<String, u64> = HashMap::new();
        let mut df: HashMap<String, u32> = HashMap::new();
        let mut collection_len: u64 = 0;

        for (id, terms) in docs {
            let len = terms.len() as u32;
            let mut tf: HashMap<String, u32> = HashMap::new();
            for term in terms {
                *tf.entry(term).or_insert(0) += 1;
            }
            for (term, &count) in &tf {
                *cf.entry(term.clone()).or_insert(0) += count as u64;
                *df.entry(term.clone()).or_insert(0) += 1;
            }
            collection_len += len as u64;
            doc_ids.push(id);
            term_freqs.push(tf);
            doc_lens.push(len);
        }

        let avg_doc_len = if doc_ids.is_empty() {
            0.0
        } else {
            collection_len as f64 / doc_ids.len() as f64
        };

        tracing::debug!(
            num_docs = doc_ids.len(),
            vocab_size = cf.len(),
            collection_len,
            "collection statistics built"
        );

        Self { doc_ids, term_freqs, doc_lens, cf, df, collection_len, avg_doc_len }
    }

    pub fn num_docs(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    pub fn doc_id(&self, doc: usize) -> &str {
        &self.doc_ids[doc]
    }

    pub fn doc_len(&self, doc: usize) -> u32 {
        self.doc_lens[doc]
    }

    /// Frequency of `term` within the document at position `doc`.
    pub fn term_freq(&self, doc: usize, term: &str) -> u32 {
        self.term_freqs[doc].get(term).copied().unwrap_or(0)
    }

    /// Total occurrences of `term` across the collection; 0 if absent.
    pub fn collection_freq(&self, term: &str) -> u64 {
        self.cf.get(term).copied().unwrap_or(0)
    }

    /// Number of documents containing `term` at least once; 0 if absent.
    pub fn doc_freq(&self, term: &str) -> u32 {
        self.df.get(term).copied().unwrap_or(0)
    }

    /// Distinct terms with their document frequency.
    pub fn terms(&self) -> impl Iterator<Item = (&str, u32)> {
        self.df.iter().map(|(t, &d)| (t.as_str(), d))
    }

    pub fn collection_len(&self) -> u64 {
        self.collection_len
    }

    pub fn vocab_size(&self) -> usize {
        self.cf.len()
    }

    pub fn avg_doc_len(&self) -> f64 {
        self.avg_doc_len
    }
}
