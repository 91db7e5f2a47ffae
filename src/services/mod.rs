pub mod feedback;
pub mod similarity;
pub mod tfidf;

pub use feedback::{append_feedback, CsvFeedbackStore, FeedbackStore};
pub use similarity::{SimilarityEngine, SimilarityMatrix};
