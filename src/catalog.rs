//! Catalog loading and normalization.
//!
//! The catalog is read once from a delimited file and never mutated. Per-row
//! problems are normalized to defaults; only an unreadable source or missing
//! columns fail the load.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::Anime,
};

/// Columns every catalog source must provide
pub const REQUIRED_COLUMNS: [&str; 6] = ["title", "genres", "mean", "image", "num_episodes", "rank"];

/// Column positions resolved from the header row
struct ColumnMap {
    title: usize,
    genres: usize,
    mean: usize,
    image: usize,
    num_episodes: usize,
    rank: usize,
}

impl ColumnMap {
    fn from_headers(headers: &csv::ByteRecord) -> AppResult<Self> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().to_string())
            .collect();
        let find = |column: &str| names.iter().position(|name| name == column);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|column| find(column).is_none())
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::MissingColumns(missing));
        }

        // Every lookup below succeeded in the check above
        let position = |column: &str| find(column).unwrap_or_default();
        Ok(Self {
            title: position("title"),
            genres: position("genres"),
            mean: position("mean"),
            image: position("image"),
            num_episodes: position("num_episodes"),
            rank: position("rank"),
        })
    }

    fn read_row(&self, record: &csv::ByteRecord) -> Anime {
        let field = |idx: usize| {
            record
                .get(idx)
                .map(|raw| String::from_utf8_lossy(raw).trim().to_string())
                .unwrap_or_default()
        };

        Anime {
            title: field(self.title),
            genres: field(self.genres),
            mean: parse_score(&field(self.mean)),
            image: field(self.image),
            num_episodes: parse_count(&field(self.num_episodes)).unwrap_or(0),
            rank: parse_count(&field(self.rank)),
        }
    }
}

/// Parses a non-negative whole number, accepting decimal spellings like "12.0"
fn parse_count(raw: &str) -> Option<u32> {
    let value = raw.trim().parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value.trunc().min(u32::MAX as f64) as u32)
    } else {
        None
    }
}

fn parse_score(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalized, read-only item table with a title index
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Anime>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog from already-normalized items.
    ///
    /// When titles repeat, the first occurrence owns the title in the lookup.
    /// Later duplicates stay in the table and can still be recommended.
    pub fn from_items(items: Vec<Anime>) -> Self {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if index.contains_key(&item.title) {
                tracing::warn!(
                    title = %item.title,
                    row = position,
                    "Duplicate title; keeping first occurrence for lookup"
                );
                continue;
            }
            index.insert(item.title.clone(), position);
        }
        Self { items, index }
    }

    /// Reads and normalizes catalog rows from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let columns = ColumnMap::from_headers(reader.byte_headers()?)?;

        let mut items = Vec::new();
        for record in reader.byte_records() {
            items.push(columns.read_row(&record?));
        }

        Ok(Self::from_items(items))
    }

    /// Number of rows, duplicates included
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Anime] {
        &self.items
    }

    /// Row at `position` in catalog order
    pub fn item(&self, position: usize) -> Option<&Anime> {
        self.items.get(position)
    }

    /// Row position owning `title`
    pub fn position(&self, title: &str) -> Option<usize> {
        self.index.get(title).copied()
    }

    pub fn get(&self, title: &str) -> Option<&Anime> {
        self.position(title).and_then(|position| self.item(position))
    }

    /// All distinct genre labels, sorted
    pub fn genre_universe(&self) -> BTreeSet<String> {
        self.items
            .iter()
            .flat_map(Anime::genre_labels)
            .map(str::to_string)
            .collect()
    }

    /// Items with a mean score, highest first; ties keep catalog order
    pub fn top_rated(&self, limit: usize) -> Vec<&Anime> {
        let mut rated: Vec<(&Anime, f64)> = self
            .items
            .iter()
            .filter_map(|item| item.mean.map(|mean| (item, mean)))
            .collect();
        rated.sort_by(|a, b| b.1.total_cmp(&a.1));
        rated.into_iter().take(limit).map(|(item, _)| item).collect()
    }
}

/// Loads the catalog file at `path`; any failure here is fatal at startup
pub fn load_catalog<P: AsRef<Path>>(path: P) -> AppResult<Catalog> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AppError::CatalogUnavailable {
        path: path.display().to_string(),
        source,
    })?;

    let catalog = Catalog::from_reader(file)?;

    tracing::info!(
        path = %path.display(),
        items = catalog.len(),
        unique_titles = catalog.index.len(),
        "Catalog loaded"
    );

    Ok(catalog)
}
