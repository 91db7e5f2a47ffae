//! Content-based similarity over genre tags.
//!
//! The engine is built once from a loaded catalog and is read-only after
//! that, so it can be shared across request handlers without locking.

use std::sync::Arc;
use std::time::Instant;

use crate::{
    catalog::Catalog,
    models::{Anime, GenreFilter},
    services::tfidf::TfidfMatrix,
};

/// Dense, symmetric all-pairs cosine similarity, row-major
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Computes the upper triangle and mirrors it. The diagonal is pinned to
    /// 1.0, including rows whose tags produced no features.
    pub fn from_tfidf(tfidf: &TfidfMatrix) -> Self {
        let rows = tfidf.rows();
        let size = rows.len();
        let mut values = vec![0.0; size * size];

        for i in 0..size {
            values[i * size + i] = 1.0;
            for j in (i + 1)..size {
                let score = rows[i].dot(&rows[j]).clamp(0.0, 1.0);
                values[i * size + j] = score;
                values[j * size + i] = score;
            }
        }

        Self { size, values }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.size && j < self.size {
            Some(self.values[i * self.size + j])
        } else {
            None
        }
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        (i < self.size).then(|| &self.values[i * self.size..(i + 1) * self.size])
    }
}

/// Precomputed similarity state plus the catalog it was built from
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    catalog: Arc<Catalog>,
    matrix: SimilarityMatrix,
}

impl SimilarityEngine {
    pub fn build(catalog: Arc<Catalog>) -> Self {
        let started = Instant::now();

        let documents: Vec<&str> = catalog
            .items()
            .iter()
            .map(|item| item.genres.as_str())
            .collect();
        let tfidf = TfidfMatrix::fit_transform(documents.as_slice());
        let matrix = SimilarityMatrix::from_tfidf(&tfidf);

        tracing::info!(
            items = matrix.size(),
            vocabulary = tfidf.vocabulary().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Similarity matrix built"
        );

        Self { catalog, matrix }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// Similarity between the rows at positions `i` and `j`
    pub fn similarity(&self, i: usize, j: usize) -> Option<f64> {
        self.matrix.get(i, j)
    }

    /// Ranks every other item against `title` by descending similarity.
    ///
    /// Ties keep catalog order. The filter is applied before truncating to
    /// `count`. An unknown title yields an empty list.
    pub fn recommend(&self, title: &str, count: usize, filter: &GenreFilter) -> Vec<Anime> {
        let Some(target) = self.catalog.position(title) else {
            tracing::debug!(title, "No catalog entry for recommendation target");
            return Vec::new();
        };
        if count == 0 {
            return Vec::new();
        }
        let Some(scores) = self.matrix.row(target) else {
            return Vec::new();
        };

        let mut candidates: Vec<(usize, f64)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|&(position, _)| position != target)
            .collect();
        // sort_by is stable, so equal scores stay in catalog order
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        let recommendations: Vec<Anime> = candidates
            .into_iter()
            .filter_map(|(position, _)| self.catalog.item(position))
            .filter(|item| filter.matches(item))
            .take(count)
            .cloned()
            .collect();

        tracing::debug!(
            title,
            count,
            genre = %filter,
            returned = recommendations.len(),
            "Recommendations ranked"
        );

        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::anime;

    fn engine(items: Vec<Anime>) -> SimilarityEngine {
        SimilarityEngine::build(Arc::new(Catalog::from_items(items)))
    }

    fn sample() -> SimilarityEngine {
        engine(vec![
            anime("A", "Action, Comedy"),
            anime("B", "Action"),
            anime("C", "Romance"),
        ])
    }

    fn titles(items: &[Anime]) -> Vec<&str> {
        items.iter().map(|a| a.title.as_str()).collect()
    }

    #[test]
    fn test_shared_genre_ranks_first() {
        let engine = sample();
        let result = engine.recommend("A", 2, &GenreFilter::All);
        assert_eq!(titles(&result), vec!["B", "C"]);
    }

    #[test]
    fn test_genre_filter() {
        let engine = sample();
        let result = engine.recommend("A", 5, &GenreFilter::parse("Romance"));
        assert_eq!(titles(&result), vec!["C"]);

        let result = engine.recommend("A", 5, &GenreFilter::parse("Horror"));
        assert!(result.is_empty());
    }

    #[test]
    fn test_filter_applies_before_truncation() {
        let engine = engine(vec![
            anime("Target", "Action, Drama"),
            anime("Close", "Action, Drama"),
            anime("Near", "Action"),
            anime("Far", "Drama, Romance"),
        ]);
        let result = engine.recommend("Target", 1, &GenreFilter::parse("Romance"));
        assert_eq!(titles(&result), vec!["Far"]);
    }

    #[test]
    fn test_unknown_title_is_empty() {
        let engine = sample();
        assert!(engine
            .recommend("nonexistent title", 5, &GenreFilter::All)
            .is_empty());
    }

    #[test]
    fn test_count_bounds() {
        let engine = sample();
        assert!(engine.recommend("A", 0, &GenreFilter::All).is_empty());
        assert_eq!(engine.recommend("A", 100, &GenreFilter::All).len(), 2);
        assert_eq!(engine.recommend("B", 1, &GenreFilter::All).len(), 1);
    }

    #[test]
    fn test_never_returns_query_item() {
        let engine = engine(vec![
            anime("A", "Action"),
            anime("B", "Action"),
            anime("C", "Action"),
        ]);
        for title in ["A", "B", "C"] {
            let result = engine.recommend(title, 10, &GenreFilter::All);
            assert_eq!(result.len(), 2);
            assert!(result.iter().all(|a| a.title != title));
        }
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let engine = engine(vec![
            anime("Query", "Mystery"),
            anime("First", "Mystery"),
            anime("Unrelated", "Sports"),
            anime("Second", "Mystery"),
        ]);
        let result = engine.recommend("Query", 3, &GenreFilter::All);
        assert_eq!(titles(&result), vec!["First", "Second", "Unrelated"]);
    }

    #[test]
    fn test_matrix_diagonal_and_symmetry() {
        let engine = engine(vec![
            anime("A", "Action, Comedy"),
            anime("B", "Action"),
            anime("C", ""),
            anime("D", "Comedy, Slice of Life"),
        ]);
        let size = engine.matrix().size();
        assert_eq!(size, 4);
        for i in 0..size {
            assert_eq!(engine.similarity(i, i), Some(1.0));
            for j in 0..size {
                let score = engine.similarity(i, j).unwrap();
                assert!((0.0..=1.0).contains(&score));
                assert_eq!(score, engine.similarity(j, i).unwrap());
                assert!(score <= engine.similarity(i, i).unwrap());
            }
        }
        assert_eq!(engine.similarity(4, 0), None);
    }

    #[test]
    fn test_duplicate_title_queries_first_row() {
        let engine = engine(vec![
            anime("Dup", "Action"),
            anime("Fighter", "Action"),
            anime("Dup", "Romance"),
            anime("Lover", "Romance"),
        ]);
        let result = engine.recommend("Dup", 1, &GenreFilter::All);
        assert_eq!(titles(&result), vec!["Fighter"]);
        // the later duplicate is still a candidate
        let result = engine.recommend("Lover", 1, &GenreFilter::All);
        assert_eq!(result[0].genres, "Romance");
    }

    #[test]
    fn test_empty_catalog() {
        let engine = engine(Vec::new());
        assert_eq!(engine.matrix().size(), 0);
        assert!(engine.recommend("A", 3, &GenreFilter::All).is_empty());
    }
}
