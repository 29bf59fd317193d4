//! Review source adapter
//!
//! Uploaded tables and scraper output are two different shapes; both are
//! resolved here into one canonical sequence of [`Review`] records so that
//! nothing downstream has to know where the reviews came from.

use crate::config::IngestConfig;
use crate::normalizer::normalize;
use fraudfilter_core::{Error, ProductInfo, Result, Review, ReviewId};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, warn};

/// One cell of a parsed table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Empty,
}

impl FieldValue {
    /// Cell as text, if it has any content
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Self::Number(n) => Some(Cow::Owned(n.to_string())),
            Self::Empty => None,
        }
    }

    /// Cell as a number, parsing text cells
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Empty => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

/// Tabular dataset: named columns, rows of cells
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<FieldValue>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<FieldValue>) {
        self.rows.push(row);
    }

    /// Find a column by name, ignoring surrounding whitespace and ASCII case
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One review object as extracted by the scraper
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedReview {
    #[serde(
        default,
        alias = "customer_review",
        alias = "review_text",
        deserialize_with = "loose_text"
    )]
    pub text: Option<String>,

    /// Unparsable ratings such as "4.0 out of 5 stars" read as `None`
    #[serde(default, deserialize_with = "loose_number")]
    pub rating: Option<f32>,

    #[serde(default, deserialize_with = "loose_text")]
    pub reviewer_id: Option<String>,
}

/// Any JSON value a scraper might put in a review field
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn loose_number<'de, D>(deserializer: D) -> std::result::Result<Option<f32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<LooseValue>::deserialize(deserializer)? {
        Some(LooseValue::Number(n)) => Some(n as f32),
        Some(LooseValue::Text(s)) => s.trim().parse().ok(),
        Some(LooseValue::Other(_)) | None => None,
    })
}

fn loose_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<LooseValue>::deserialize(deserializer)? {
        Some(LooseValue::Number(n)) => Some(n.to_string()),
        Some(LooseValue::Text(s)) => Some(s),
        Some(LooseValue::Other(_)) | None => None,
    })
}

/// Output of the scraping collaborator for one product page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub product_id: String,
    pub product_name: String,

    #[serde(default)]
    pub csv_path: Option<String>,

    /// `None` signals that scraping failed outright
    #[serde(default)]
    pub reviews: Option<Vec<ScrapedReview>>,
}

/// The two input origins
#[derive(Debug, Clone)]
pub enum ReviewSource {
    Tabular(Table),
    Scrape(ScrapeResult),
}

/// Canonical reviews plus what was excluded on the way in
#[derive(Debug, Clone)]
pub struct SourceBatch {
    /// Product metadata, present for scraped input
    pub product: Option<ProductInfo>,

    pub reviews: Vec<Review>,

    /// Rows whose text was blank after normalization
    pub skipped: Vec<ReviewId>,
}

impl SourceBatch {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Rows seen before filtering
    pub fn total_input(&self) -> usize {
        self.reviews.len() + self.skipped.len()
    }
}

/// Resolves either input origin into canonical review records
#[derive(Debug, Clone, Default)]
pub struct ReviewAdapter {
    config: IngestConfig,
}

impl ReviewAdapter {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Resolve any source
    pub fn adapt(&self, source: ReviewSource) -> Result<SourceBatch> {
        match source {
            ReviewSource::Tabular(table) => self.from_table(&table),
            ReviewSource::Scrape(scrape) => self.from_scrape_result(scrape),
        }
    }

    /// Read reviews out of an uploaded table
    ///
    /// Fails with `Schema` if the text column is missing and with
    /// `EmptyInput` if no row has usable text.
    pub fn from_table(&self, table: &Table) -> Result<SourceBatch> {
        let text_col = table.column_index(&self.config.text_column).ok_or_else(|| {
            Error::schema(format!(
                "required column '{}' not found (columns: {})",
                self.config.text_column,
                table.headers.join(", ")
            ))
        })?;

        let rating_col = self
            .config
            .rating_column
            .as_deref()
            .and_then(|c| table.column_index(c));
        let reviewer_col = self
            .config
            .reviewer_column
            .as_deref()
            .and_then(|c| table.column_index(c));

        let mut reviews = Vec::with_capacity(table.len());
        let mut skipped = Vec::new();

        for (index, row) in table.rows.iter().enumerate() {
            let id = ReviewId(index);
            let text = row
                .get(text_col)
                .and_then(FieldValue::as_text)
                .map(|t| normalize(&t))
                .unwrap_or_default();

            let Some(review) = Review::new(id, text) else {
                debug!("Skipping row {}: blank review text", index);
                skipped.push(id);
                continue;
            };

            let rating = rating_col
                .and_then(|c| row.get(c))
                .and_then(FieldValue::as_number)
                .and_then(|r| self.config.rating_scale.bound(r as f32));
            let reviewer = reviewer_col
                .and_then(|c| row.get(c))
                .and_then(FieldValue::as_text)
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty());

            reviews.push(review.with_rating(rating).with_reviewer(reviewer));
        }

        self.finish(None, reviews, skipped)
    }

    /// Read reviews out of scraper output
    ///
    /// A missing or empty review list is `EmptyInput`.
    pub fn from_scrape_result(&self, scrape: ScrapeResult) -> Result<SourceBatch> {
        let product = ProductInfo {
            product_id: scrape.product_id,
            product_name: scrape.product_name,
            csv_path: scrape.csv_path,
        };

        let extracted = scrape.reviews.ok_or_else(|| {
            Error::empty_input(format!(
                "no reviews found or scraping failed for product '{}'",
                product.product_id
            ))
        })?;

        let mut reviews = Vec::with_capacity(extracted.len());
        let mut skipped = Vec::new();

        for (index, item) in extracted.into_iter().enumerate() {
            let id = ReviewId(index);
            let text = item.text.as_deref().map(normalize).unwrap_or_default();

            let Some(review) = Review::new(id, text) else {
                debug!("Skipping scraped review {}: blank review text", index);
                skipped.push(id);
                continue;
            };

            let rating = item
                .rating
                .and_then(|r| self.config.rating_scale.bound(r));
            let reviewer = item
                .reviewer_id
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty());

            reviews.push(review.with_rating(rating).with_reviewer(reviewer));
        }

        self.finish(Some(product), reviews, skipped)
    }

    fn finish(
        &self,
        product: Option<ProductInfo>,
        reviews: Vec<Review>,
        skipped: Vec<ReviewId>,
    ) -> Result<SourceBatch> {
        if !skipped.is_empty() {
            warn!("Skipped {} rows with blank review text", skipped.len());
        }

        if reviews.is_empty() {
            return Err(Error::empty_input(format!(
                "no usable reviews ({} rows skipped)",
                skipped.len()
            )));
        }

        Ok(SourceBatch {
            product,
            reviews,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        let mut table = Table::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|c| FieldValue::from(*c)).collect());
        }
        table
    }

    #[test]
    fn test_blank_row_skipped() {
        let table = table(
            &["customer_review", "rating"],
            &[&["Loved it", "5"], &["   ", "1"], &["Broke in a day", "2"]],
        );

        let batch = ReviewAdapter::default().from_table(&table).unwrap();

        assert_eq!(batch.reviews.len(), 2);
        assert_eq!(batch.skipped_count(), 1);
        assert_eq!(batch.skipped, vec![ReviewId(1)]);
        assert_eq!(batch.total_input(), 3);
        assert_eq!(batch.reviews[0].id(), ReviewId(0));
        assert_eq!(batch.reviews[1].id(), ReviewId(2));
        assert_eq!(batch.reviews[0].text(), "loved it");
        assert!(batch.product.is_none());
    }

    #[test]
    fn test_missing_text_column_is_schema_error() {
        let table = table(&["review", "rating"], &[&["Loved it", "5"]]);
        let err = ReviewAdapter::default().from_table(&table).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_column_lookup_ignores_case_and_padding() {
        let table = table(&[" Customer_Review "], &[&["fine"]]);
        let batch = ReviewAdapter::default().from_table(&table).unwrap();
        assert_eq!(batch.reviews.len(), 1);
    }

    #[test]
    fn test_all_blank_is_empty_input() {
        let table = table(&["customer_review"], &[&[""], &["\t"]]);
        let err = ReviewAdapter::default().from_table(&table).unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));

        let no_rows = table_with_no_rows();
        let err = ReviewAdapter::default().from_table(&no_rows).unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
    }

    fn table_with_no_rows() -> Table {
        Table::new(vec!["customer_review".to_string()])
    }

    #[test]
    fn test_short_row_treated_as_blank() {
        let table = table(&["rating", "customer_review"], &[&["4"], &["3", "ok"]]);
        let batch = ReviewAdapter::default().from_table(&table).unwrap();
        assert_eq!(batch.skipped, vec![ReviewId(0)]);
        assert_eq!(batch.reviews[0].rating(), Some(3.0));
    }

    #[test]
    fn test_rating_bounded_and_reviewer_read() {
        let table = table(
            &["customer_review", "rating", "reviewer_id"],
            &[&["good", "9", "u1"], &["bad", "abc", ""], &["meh", "3", " u3 "]],
        );
        let batch = ReviewAdapter::default().from_table(&table).unwrap();

        assert_eq!(batch.reviews[0].rating(), None);
        assert_eq!(batch.reviews[0].reviewer_id(), Some("u1"));
        assert_eq!(batch.reviews[1].rating(), None);
        assert_eq!(batch.reviews[1].reviewer_id(), None);
        assert_eq!(batch.reviews[2].rating(), Some(3.0));
        assert_eq!(batch.reviews[2].reviewer_id(), Some("u3"));
    }

    #[test]
    fn test_numeric_text_cell() {
        let mut table = Table::new(vec!["customer_review".to_string()]);
        table.push_row(vec![FieldValue::Number(42.0)]);
        let batch = ReviewAdapter::default().from_table(&table).unwrap();
        assert_eq!(batch.reviews[0].text(), "42");
    }

    #[test]
    fn test_scrape_result_mapping() {
        let scrape = ScrapeResult {
            product_id: "B0001".to_string(),
            product_name: "Kettle".to_string(),
            csv_path: Some("reviews/B0001.csv".to_string()),
            reviews: Some(vec![
                ScrapedReview {
                    text: Some("Boils FAST".to_string()),
                    rating: Some(5.0),
                    reviewer_id: None,
                },
                ScrapedReview::default(),
            ]),
        };

        let batch = ReviewAdapter::default().from_scrape_result(scrape).unwrap();
        let product = batch.product.as_ref().unwrap();
        assert_eq!(product.product_id, "B0001");
        assert_eq!(product.csv_path.as_deref(), Some("reviews/B0001.csv"));
        assert_eq!(batch.reviews.len(), 1);
        assert_eq!(batch.reviews[0].text(), "boils fast");
        assert_eq!(batch.skipped, vec![ReviewId(1)]);
    }

    #[test]
    fn test_scrape_without_reviews_is_empty_input() {
        let scrape = ScrapeResult {
            product_id: "B0002".to_string(),
            product_name: "Toaster".to_string(),
            csv_path: None,
            reviews: None,
        };
        let err = ReviewAdapter::default()
            .adapt(ReviewSource::Scrape(scrape.clone()))
            .unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));

        let empty = ScrapeResult {
            reviews: Some(Vec::new()),
            ..scrape
        };
        let err = ReviewAdapter::default().from_scrape_result(empty).unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
    }

    #[test]
    fn test_scraped_review_aliases() {
        let json = r#"{"customer_review": "nice", "rating": 4}"#;
        let review: ScrapedReview = serde_json::from_str(json).unwrap();
        assert_eq!(review.text.as_deref(), Some("nice"));
        assert_eq!(review.rating, Some(4.0));
    }

    #[test]
    fn test_messy_scraped_fields_keep_the_review() {
        let json = r#"{
            "product_id": "B07X",
            "product_name": "Headphones",
            "reviews": [
                {"customer_review": "Solid", "rating": "4.0 out of 5 stars", "reviewer_id": 1234},
                {"customer_review": "Great", "rating": "5", "reviewer_id": null},
                {"customer_review": "Meh", "rating": {"stars": 2}, "reviewer_id": ["x"]}
            ]
        }"#;
        let scrape: ScrapeResult = serde_json::from_str(json).unwrap();
        let extracted = scrape.reviews.clone().unwrap();
        assert_eq!(extracted[0].rating, None);
        assert_eq!(extracted[0].reviewer_id.as_deref(), Some("1234"));
        assert_eq!(extracted[1].rating, Some(5.0));
        assert_eq!(extracted[2].rating, None);
        assert_eq!(extracted[2].reviewer_id, None);

        let batch = ReviewAdapter::new(IngestConfig::default())
            .from_scrape_result(scrape)
            .unwrap();
        assert_eq!(batch.reviews.len(), 3);
        assert_eq!(batch.reviews[0].rating(), None);
        assert_eq!(batch.reviews[0].reviewer_id(), Some("1234"));
        assert_eq!(batch.reviews[1].rating(), Some(5.0));
    }
}
