pub mod indexer;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

pub use indexer::{CatalogIndexer, IndexStats};

/// One catalog product. `id` is the stable row index from the source table.
/// Immutable once indexed.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogDocument {
    pub id: usize,
    pub category: String,
    pub title: String,
    pub price: f64,
    pub rating: Option<f64>,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    main_category: String,
    title: String,
    price: Option<f64>,
    average_rating: Option<f64>,
    description: Option<String>,
}

const REQUIRED_COLUMNS: [&str; 5] = [
    "main_category",
    "title",
    "price",
    "average_rating",
    "description",
];

/// Load the product table. A missing required column is a configuration
/// error and fails fast; missing description/rating *values* are treated as
/// empty/absent, not an error.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogDocument>, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| {
            ApiError::Configuration(format!("failed to open catalog {}: {}", path.display(), e))
        })?;

    let headers = reader.headers().map_err(ApiError::internal)?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(ApiError::Configuration(format!(
                "catalog is missing required column '{}'",
                column
            )));
        }
    }

    let mut documents = Vec::new();
    for (idx, row) in reader.deserialize::<CatalogRow>().enumerate() {
        let row = row.map_err(|e| {
            ApiError::Configuration(format!("failed to parse catalog row {}: {}", idx, e))
        })?;
        documents.push(CatalogDocument {
            id: idx,
            category: row.main_category,
            title: row.title,
            price: row.price.unwrap_or(0.0).max(0.0),
            rating: row.average_rating,
            description: row.description.unwrap_or_default(),
        });
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write csv");
        file
    }

    #[test]
    fn loads_rows_with_stable_ids() {
        let file = write_csv(
            "main_category,title,price,average_rating,description\n\
             Guitars,Stratocaster,699.99,4.8,Classic electric guitar\n\
             Drums,Snare,120.0,4.1,Maple shell\n",
        );
        let docs = load_catalog(file.path()).expect("catalog should load");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, 0);
        assert_eq!(docs[1].id, 1);
        assert_eq!(docs[0].title, "Stratocaster");
        assert_eq!(docs[1].category, "Drums");
    }

    #[test]
    fn missing_rating_and_description_values_are_tolerated() {
        let file = write_csv(
            "main_category,title,price,average_rating,description\n\
             Guitars,Telecaster,649.0,,\n",
        );
        let docs = load_catalog(file.path()).expect("catalog should load");
        assert_eq!(docs[0].rating, None);
        assert_eq!(docs[0].description, "");
    }

    #[test]
    fn missing_required_column_fails_fast() {
        let file = write_csv("main_category,title,average_rating,description\nGuitars,LP,4.5,x\n");
        let err = load_catalog(file.path()).unwrap_err();
        assert!(err.to_string().contains("price"));
    }
}
