//! Append-only feedback store backed by a CSV file.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    models::FeedbackRecord,
};

/// Header row of the feedback file
pub const FEEDBACK_HEADER: [&str; 3] = ["anime", "rating", "comment"];

/// Appends `record` to the CSV store at `path`.
///
/// The record is validated before the file is touched. The header is written
/// when the file is new or empty. Existing rows are never rewritten; a
/// missing final newline is completed before the new row. Failures are
/// returned to the caller.
pub fn append_feedback<P: AsRef<Path>>(path: P, record: &FeedbackRecord) -> AppResult<()> {
    record.validate()?;

    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?;
    let len = file.metadata()?.len();
    let needs_header = len == 0;
    if len > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            file.write_all(b"\n")?;
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if needs_header {
        writer.write_record(FEEDBACK_HEADER)?;
    }
    writer.serialize(record)?;
    writer.flush()?;

    tracing::info!(
        path = %path.display(),
        anime = %record.anime,
        rating = record.rating,
        "Feedback appended"
    );

    Ok(())
}

/// Reads every record in the store; a missing file is an empty store
pub fn read_feedback<P: AsRef<Path>>(path: P) -> AppResult<Vec<FeedbackRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// Persistence seam for user feedback
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn append(&self, record: FeedbackRecord) -> AppResult<()>;

    async fn list(&self) -> AppResult<Vec<FeedbackRecord>>;
}

/// CSV-file store. Writes from this process go through one mutex, so at
/// most one append is in flight at a time. Other processes are not
/// coordinated with.
pub struct CsvFeedbackStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvFeedbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl FeedbackStore for CsvFeedbackStore {
    async fn append(&self, record: FeedbackRecord) -> AppResult<()> {
        record.validate()?;

        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || append_feedback(path, &record))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
    }

    async fn list(&self) -> AppResult<Vec<FeedbackRecord>> {
        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_feedback(path))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(anime: &str, rating: u8, comment: &str) -> FeedbackRecord {
        FeedbackRecord::new(anime, rating, comment).unwrap()
    }

    #[test]
    fn test_first_append_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.csv");

        append_feedback(&path, &record("Monster", 5, "Gripping")).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "anime,rating,comment\nMonster,5,Gripping\n");
    }

    #[test]
    fn test_second_append_keeps_first_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.csv");

        append_feedback(&path, &record("Monster", 5, "Gripping")).unwrap();
        append_feedback(&path, &record("Haikyu!!", 4, "")).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec!["anime,rating,comment", "Monster,5,Gripping", "Haikyu!!,4,"]
        );
    }

    #[test]
    fn test_quoted_comment_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.csv");
        let tricky = record("Mob Psycho 100", 5, "Funny, loud\nand \"weird\"");

        append_feedback(&path, &tricky).unwrap();

        assert_eq!(read_feedback(&path).unwrap(), vec![tricky]);
    }

    #[test]
    fn test_out_of_range_rating_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.csv");
        let bad = FeedbackRecord {
            anime: "Monster".to_string(),
            rating: 42,
            comment: String::new(),
        };

        assert!(matches!(
            append_feedback(&path, &bad),
            Err(AppError::InvalidInput(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_append_completes_unterminated_last_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.csv");
        std::fs::write(&path, "anime,rating,comment").unwrap();

        append_feedback(&path, &record("Monster", 3, "tense")).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "anime,rating,comment\nMonster,3,tense\n");
        assert_eq!(read_feedback(&path).unwrap(), vec![record("Monster", 3, "tense")]);
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("feedback.csv");
        let result = append_feedback(&path, &record("Monster", 3, ""));
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn test_read_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_feedback(dir.path().join("none.csv")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_rejects_invalid_rating() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvFeedbackStore::new(dir.path().join("feedback.csv"));
        let bad = FeedbackRecord {
            anime: "Monster".to_string(),
            rating: 9,
            comment: String::new(),
        };
        assert!(matches!(
            store.append(bad).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CsvFeedbackStore::new(dir.path().join("feedback.csv")));

        let mut tasks = Vec::new();
        for i in 0..20u8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .append(record("Frieren", i % 5 + 1, &format!("comment {}", i)))
                    .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 20);
        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents.matches("anime,rating,comment").count(), 1);
    }
}
