use std::fs::File;
use std::io::Read;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CategoryLoadError {
    #[error("failed to read category source: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse category table: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse category export: {0}")]
    Json(#[from] serde_json::Error),
    #[error("category source has no '{0}' column")]
    MissingColumn(&'static str),
    #[error("category {0:?} has a non-numeric id {1:?}")]
    BadId(String, String),
    #[error("category {0} has no usable name")]
    MissingName(i64),
    #[error("category source is empty")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub category_id: i64,
    pub category_name: String,
}

/// Row shape of the database exporter's JSON output.
#[derive(Debug, Deserialize)]
struct ExportedCategory {
    category_id: i64,
    #[serde(default)]
    name_en: Option<String>,
    #[serde(default)]
    name_fr: Option<String>,
}

/// The process-wide category table. Loaded once at startup, never mutated,
/// shared read-only by every generator.
#[derive(Debug, Clone)]
pub struct CategoryStore {
    categories: Vec<Category>,
}

impl CategoryStore {
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<CategoryStore, CategoryLoadError> {
        Self::from_csv_reader(File::open(path)?)
    }

    /// Accepts either a `name` column or the exporter's `name_en`/`name_fr`
    /// pair (English preferred, French fallback). Ids are parsed up front so
    /// event generation can never fail on a malformed row later.
    pub fn from_csv_reader(reader: impl Read) -> Result<CategoryStore, CategoryLoadError> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|header| header == name);

        let id_column = column("category_id").ok_or(CategoryLoadError::MissingColumn(
            "category_id",
        ))?;
        let name_column = column("name");
        let name_en_column = column("name_en");
        let name_fr_column = column("name_fr");
        if name_column.is_none() && name_en_column.is_none() && name_fr_column.is_none() {
            return Err(CategoryLoadError::MissingColumn("name"));
        }

        let mut categories = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let field = |index: Option<usize>| {
                index
                    .and_then(|i| record.get(i))
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
            };

            let raw_id = record.get(id_column).unwrap_or_default().trim();
            let name = field(name_column)
                .or_else(|| field(name_en_column))
                .or_else(|| field(name_fr_column));

            let category_id: i64 = raw_id.parse().map_err(|_| {
                CategoryLoadError::BadId(
                    name.unwrap_or_default().to_string(),
                    raw_id.to_string(),
                )
            })?;
            let category_name = name
                .map(String::from)
                .ok_or(CategoryLoadError::MissingName(category_id))?;

            categories.push(Category {
                category_id,
                category_name,
            });
        }

        Self::from_categories(categories)
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<CategoryStore, CategoryLoadError> {
        Self::from_json_reader(File::open(path)?)
    }

    pub fn from_json_reader(reader: impl Read) -> Result<CategoryStore, CategoryLoadError> {
        let exported: Vec<ExportedCategory> = serde_json::from_reader(reader)?;

        let categories = exported
            .into_iter()
            .map(|row| {
                let name = [row.name_en, row.name_fr]
                    .into_iter()
                    .flatten()
                    .map(|value| value.trim().to_string())
                    .find(|value| !value.is_empty())
                    .ok_or(CategoryLoadError::MissingName(row.category_id))?;

                Ok(Category {
                    category_id: row.category_id,
                    category_name: name,
                })
            })
            .collect::<Result<Vec<Category>, CategoryLoadError>>()?;

        Self::from_categories(categories)
    }

    pub fn from_categories(categories: Vec<Category>) -> Result<CategoryStore, CategoryLoadError> {
        if categories.is_empty() {
            return Err(CategoryLoadError::Empty);
        }
        Ok(CategoryStore { categories })
    }

    /// Uniform random pick. The store is never empty by construction.
    pub fn pick(&self, rng: &mut impl Rng) -> &Category {
        self.categories
            .choose(rng)
            .expect("store is non-empty by construction")
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
