//! Static knowledge base with lexical ranking.
//!
//! The corpus of known issues is loaded once from a JSON file at startup and
//! is immutable for the process lifetime. [`KnowledgeIndex`] ranks entries
//! against a query with BM25 scoring; a query sharing no tokens with any
//! entry simply returns no matches. Construction is the only thing that can
//! fail; the process must not serve traffic with a corpus that failed to
//! load.

pub mod entry;
pub mod index;

pub use entry::{load_entries, KnowledgeEntry};
pub use index::KnowledgeIndex;
