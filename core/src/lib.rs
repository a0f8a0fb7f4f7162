pub mod error;
pub mod index;
pub mod metrics;
pub mod persist;
pub mod rank;
pub mod scoring;
pub mod tokenizer;

pub use error::RanklabError;
pub use metrics::Judgments;
pub use index::CollectionStats;
pub use rank::{Run, RunEntry, ScoredDoc};
pub use scoring::ScoringModel;
