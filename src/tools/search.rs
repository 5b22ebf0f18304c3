//! Product search over the catalog index.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::Value;

use super::{string_arg, Tool, ToolError};
use crate::retrieval::{RankedDocument, Ranker};

const TOP_K: usize = 5;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchProductsArgs {
    /// Free-text search query about products.
    pub query: String,
}

pub struct SearchProductsTool {
    ranker: Arc<Ranker>,
}

impl SearchProductsTool {
    pub fn new(ranker: Arc<Ranker>) -> Self {
        Self { ranker }
    }
}

#[async_trait]
impl Tool for SearchProductsTool {
    fn name(&self) -> &'static str {
        "search_products"
    }

    fn description(&self) -> &'static str {
        "Search for products in the catalog. Input should be a search query about products. \
         Returns a list of relevant products with their categories, titles, prices and ratings. \
         Use this when the user asks about specific products or wants recommendations."
    }

    fn input_schema(&self) -> Value {
        serde_json::to_value(schema_for!(SearchProductsArgs)).unwrap_or_default()
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let query = string_arg(args, &["query", "q", "input"])
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ToolError::InvalidInput("Search query missing".to_string()))?;

        let results = self
            .ranker
            .search(&query, TOP_K)
            .await
            .map_err(|err| ToolError::Execution(format!("Error searching products: {}", err)))?;

        if results.is_empty() {
            return Ok(format!("No matching products found for '{}'.", query));
        }

        Ok(format!("Products found:\n{}", format_results(&results)))
    }
}

/// Render results as an aligned text table with category, title, price,
/// rating and relevance columns.
fn format_results(results: &[RankedDocument]) -> String {
    let headers = ["category", "title", "price", "rating", "relevance"];
    let rows: Vec<[String; 5]> = results
        .iter()
        .map(|ranked| {
            [
                ranked.document.category.clone(),
                ranked.document.title.clone(),
                format!("{:.2}", ranked.document.price),
                ranked
                    .document
                    .rating
                    .map(|r| format!("{:.1}", r))
                    .unwrap_or_else(|| "N/A".to_string()),
                format!("{:.4}", ranked.score),
            ]
        })
        .collect();

    let mut widths: [usize; 5] = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: [&str; 5]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(headers)];
    for row in &rows {
        lines.push(render([&row[0], &row[1], &row[2], &row[3], &row[4]]));
    }
    lines.join("\n")
}
