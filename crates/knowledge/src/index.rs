//! In-memory BM25 index over the knowledge corpus.
//!
//! Built once at startup, read-only afterwards, so concurrent searches need
//! no locking. Scoring uses the standard BM25 constants (k1 = 1.2, b = 0.75)
//! with ties broken by original corpus order for deterministic results.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;
use triage_common::Result;

use crate::entry::{load_entries, KnowledgeEntry};

const K1: f32 = 1.2;
const B: f32 = 0.75;

/// Tokenize by lower-casing and splitting on whitespace.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect()
}

pub struct KnowledgeIndex {
    entries: Vec<KnowledgeEntry>,
    /// Token -> (corpus position, term frequency) postings.
    postings: HashMap<String, Vec<(usize, u32)>>,
    doc_lengths: Vec<u32>,
    avg_doc_length: f32,
}

impl KnowledgeIndex {
    /// Build the index over a corpus of entries.
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        let mut postings: HashMap<String, Vec<(usize, u32)>> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(entries.len());

        for (pos, entry) in entries.iter().enumerate() {
            let tokens = tokenize(&entry.index_text());
            doc_lengths.push(tokens.len() as u32);

            let mut term_counts: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *term_counts.entry(token).or_insert(0) += 1;
            }
            for (token, freq) in term_counts {
                postings.entry(token).or_default().push((pos, freq));
            }
        }

        let total_len: u32 = doc_lengths.iter().sum();
        let avg_doc_length = if entries.is_empty() {
            0.0
        } else {
            total_len as f32 / entries.len() as f32
        };

        debug!(
            entries = entries.len(),
            tokens = postings.len(),
            "knowledge index built"
        );

        Self {
            entries,
            postings,
            doc_lengths,
            avg_doc_length,
        }
    }

    /// Load the corpus from a JSON file and build the index.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_entries(path)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank corpus entries against the query, best match first.
    ///
    /// Only entries sharing at least one token with the query are scored;
    /// an empty or zero-overlap query returns an empty vec, which downstream
    /// logic reads as "new issue".
    pub fn search(&self, query: &str, top_k: usize) -> Vec<KnowledgeEntry> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() || self.entries.is_empty() {
            return Vec::new();
        }

        let doc_count = self.entries.len() as f32;
        let mut scores: HashMap<usize, f32> = HashMap::new();

        for token in &query_tokens {
            if let Some(posting) = self.postings.get(token) {
                let n = posting.len() as f32;
                let idf = ((doc_count - n + 0.5) / (n + 0.5) + 1.0).ln();

                for &(pos, tf) in posting {
                    let doc_len = self.doc_lengths[pos] as f32;
                    let norm = 1.0 - B + B * (doc_len / self.avg_doc_length.max(1.0));
                    let tf_score = (tf as f32 * (K1 + 1.0)) / (tf as f32 + K1 * norm);
                    *scores.entry(pos).or_insert(0.0) += idf * tf_score;
                }
            }
        }

        let mut ranked: Vec<(usize, f32)> = scores.into_iter().collect();
        // Score descending; ties broken by corpus position ascending.
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(top_k);

        ranked
            .into_iter()
            .map(|(pos, _)| self.entries[pos].clone())
            .collect()
    }
}
