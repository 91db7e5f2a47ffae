pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use catalog::{load_catalog, Catalog};
pub use models::{Anime, FeedbackRecord, GenreFilter};
pub use services::{append_feedback, SimilarityEngine};
