use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Lowest accepted rating
pub const MIN_RATING: u8 = 1;
/// Highest accepted rating
pub const MAX_RATING: u8 = 5;

/// A single user submission; one row of the feedback store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackRecord {
    /// Title of the anime the feedback is about
    pub anime: String,
    pub rating: u8,
    pub comment: String,
}

impl FeedbackRecord {
    /// Creates a record, rejecting ratings outside 1..=5
    pub fn new(anime: impl Into<String>, rating: u8, comment: impl Into<String>) -> AppResult<Self> {
        let record = Self {
            anime: anime.into(),
            rating,
            comment: comment.into(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks the rating range and that the anime identifier is present
    pub fn validate(&self) -> AppResult<()> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(AppError::InvalidInput(format!(
                "Rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, self.rating
            )));
        }
        if self.anime.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Feedback must name an anime".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_feedback() {
        let record = FeedbackRecord::new("Mushishi", 5, "Quiet and beautiful").unwrap();
        assert_eq!(record.anime, "Mushishi");
        assert_eq!(record.rating, 5);
    }

    #[test]
    fn test_rating_bounds() {
        assert!(FeedbackRecord::new("Mushishi", 1, "").is_ok());
        assert!(matches!(
            FeedbackRecord::new("Mushishi", 0, ""),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            FeedbackRecord::new("Mushishi", 6, ""),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_blank_anime_rejected() {
        assert!(matches!(
            FeedbackRecord::new("   ", 3, "no title"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_feedback_serialization() {
        let record = FeedbackRecord::new("Mushishi", 4, "Slow, but good").unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"anime":"Mushishi","rating":4,"comment":"Slow, but good"}"#
        );
    }
}
