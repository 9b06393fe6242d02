//! Catalog fetcher.
//!
//! Retrieves the full product catalog from a WooCommerce-style REST endpoint,
//! one page at a time, and normalizes each record into the stock-relevant
//! projection. Pages are fetched strictly sequentially: the last-page signal
//! is a page shorter than `per_page`, and any page error abandons the whole
//! fetch with no partial snapshot.
//!
//! The HTTP transport sits behind [`BaseCatalogSource`] so the pagination
//! loop and the body classification are testable without a network.

use anyhow::Context;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::stock::{ProductRecord, Snapshot};

/// Upstream sentinel for an available product; anything else is out of stock.
const IN_STOCK_STATUS: &str = "instock";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The API answered with a structured error payload instead of records.
    #[error("catalog API error {code}: {message}")]
    Upstream { code: String, message: String },
    /// The response body is not parseable JSON.
    #[error("failed to parse catalog response as JSON: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    /// The body parsed, but is not a list of product records.
    #[error("unexpected catalog response structure: not a list of products")]
    UnexpectedShape,
    /// Connection, timeout, or other transport failure.
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One page of the catalog, as a raw response body.
#[async_trait]
pub trait BaseCatalogSource: Send + Sync {
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<String, FetchError>;
}

/// Raw upstream product shape (the fields we project).
#[derive(Debug, Deserialize)]
struct RawProduct {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    stock_status: String,
    #[serde(default)]
    categories: Vec<RawCategory>,
    #[serde(default)]
    permalink: String,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(default)]
    name: String,
}

impl From<RawProduct> for ProductRecord {
    fn from(raw: RawProduct) -> Self {
        ProductRecord {
            id: raw.id,
            name: raw.name,
            in_stock: raw.stock_status == IN_STOCK_STATUS,
            categories: raw.categories.into_iter().map(|c| c.name).collect(),
            url: raw.permalink,
        }
    }
}

/// Classify one page body: a record list, an error payload, or junk.
fn parse_page(body: &str) -> Result<Vec<ProductRecord>, FetchError> {
    let value: Value = serde_json::from_str(body)?;

    // An error payload is a single object carrying a `code` key rather than
    // a list of records, whatever the code's type.
    if let Some(obj) = value.as_object() {
        if let Some(code) = obj.get("code") {
            let code = match code.as_str() {
                Some(s) => s.to_string(),
                None => code.to_string(),
            };
            let message = obj
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(FetchError::Upstream { code, message });
        }
        return Err(FetchError::UnexpectedShape);
    }

    let raw: Vec<RawProduct> =
        serde_json::from_value(value).map_err(|_| FetchError::UnexpectedShape)?;

    Ok(raw.into_iter().map(ProductRecord::from).collect())
}

/// Fetch the complete catalog as one snapshot.
///
/// Pages start at 1 and stop at the first page shorter than `per_page`.
/// Any error halts immediately: no partial snapshot, no further requests.
pub async fn fetch_catalog(
    source: &dyn BaseCatalogSource,
    per_page: u32,
) -> Result<Snapshot, FetchError> {
    let mut snapshot = Snapshot::new();
    let mut page = 1u32;

    loop {
        let body = source.fetch_page(page, per_page).await?;
        let records = parse_page(&body)?;
        let page_len = records.len() as u32;

        for record in records {
            snapshot.insert(record.id, record);
        }

        // A short page is the last-page signal. An empty page always ends
        // the fetch, so a zero per_page cannot page forever.
        if page_len == 0 || page_len < per_page {
            break;
        }
        page += 1;
    }

    tracing::debug!("Fetched {} products across {} page(s)", snapshot.len(), page);
    Ok(snapshot)
}

/// HTTP implementation of [`BaseCatalogSource`] against the catalog REST API.
///
/// Authenticates with a Basic-Auth header built from the consumer key pair.
pub struct CatalogClient {
    client: reqwest::Client,
    api_url: String,
    auth_header: String,
}

impl CatalogClient {
    pub fn new(
        api_url: String,
        consumer_key: &str,
        consumer_secret: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let credentials = format!("{}:{}", consumer_key, consumer_secret);
        let auth_header = format!("Basic {}", STANDARD.encode(credentials));

        Ok(Self {
            client,
            api_url,
            auth_header,
        })
    }
}

#[async_trait]
impl BaseCatalogSource for CatalogClient {
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<String, FetchError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("per_page", per_page), ("page", page)])
            .header(header::AUTHORIZATION, &self.auth_header)
            .send()
            .await?;

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn product_json(id: u64, name: &str, status: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "stock_status": status,
            "categories": [{"name": "Tools"}, {"name": "Sale"}],
            "permalink": format!("https://shop.example/product/{}", id),
        })
    }

    #[test]
    fn test_parse_page_normalizes_records() {
        let body = json!([
            product_json(7, "Widget", "instock"),
            product_json(9, "Gadget", "outofstock"),
        ])
        .to_string();

        let records = parse_page(&body).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 7);
        assert!(records[0].in_stock);
        assert_eq!(records[0].categories, vec!["Tools", "Sale"]);
        assert_eq!(records[0].url, "https://shop.example/product/7");
        assert!(!records[1].in_stock);
    }

    #[test]
    fn test_parse_page_unknown_status_is_out_of_stock() {
        // Only the exact sentinel counts as in stock.
        let body = json!([product_json(1, "Widget", "onbackorder")]).to_string();
        let records = parse_page(&body).unwrap();
        assert!(!records[0].in_stock);
    }

    #[test]
    fn test_parse_page_error_payload() {
        let body = json!({
            "code": "woocommerce_rest_cannot_view",
            "message": "Sorry, you cannot list resources."
        })
        .to_string();

        match parse_page(&body) {
            Err(FetchError::Upstream { code, message }) => {
                assert_eq!(code, "woocommerce_rest_cannot_view");
                assert_eq!(message, "Sorry, you cannot list resources.");
            }
            other => panic!("expected Upstream error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_page_error_payload_non_string_code() {
        let body = json!({"code": 500, "message": "boom"}).to_string();

        match parse_page(&body) {
            Err(FetchError::Upstream { code, message }) => {
                assert_eq!(code, "500");
                assert_eq!(message, "boom");
            }
            other => panic!("expected Upstream error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_page_non_json_body() {
        assert!(matches!(
            parse_page("<html>502 Bad Gateway</html>"),
            Err(FetchError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_page_wrong_shape() {
        // An object without an error code is neither records nor an error.
        assert!(matches!(
            parse_page(r#"{"products": []}"#),
            Err(FetchError::UnexpectedShape)
        ));
        assert!(matches!(
            parse_page("42"),
            Err(FetchError::UnexpectedShape)
        ));
    }

    /// Scripted page source: serves canned bodies and records which pages
    /// were requested.
    struct ScriptedSource {
        pages: Vec<String>,
        requested: Mutex<Vec<u32>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<String>) -> Self {
            Self {
                pages,
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<u32> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BaseCatalogSource for ScriptedSource {
        async fn fetch_page(&self, page: u32, _per_page: u32) -> Result<String, FetchError> {
            self.requested.lock().unwrap().push(page);
            Ok(self
                .pages
                .get((page - 1) as usize)
                .cloned()
                .unwrap_or_else(|| "[]".to_string()))
        }
    }

    #[tokio::test]
    async fn test_pagination_stops_after_short_page() {
        let source = ScriptedSource::new(vec![
            json!([
                product_json(1, "Widget", "instock"),
                product_json(2, "Gadget", "outofstock"),
            ])
            .to_string(),
            json!([product_json(3, "Cog", "instock")]).to_string(),
        ]);

        let snapshot = fetch_catalog(&source, 2).await.unwrap();

        assert_eq!(source.requested(), vec![1, 2]);
        assert_eq!(snapshot.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_short_first_page_is_single_request() {
        let source =
            ScriptedSource::new(vec![json!([product_json(1, "Widget", "instock")]).to_string()]);

        let snapshot = fetch_catalog(&source, 100).await.unwrap();

        assert_eq!(source.requested(), vec![1]);
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn test_error_page_halts_pagination() {
        let source = ScriptedSource::new(vec![
            json!([
                product_json(1, "Widget", "instock"),
                product_json(2, "Gadget", "instock"),
            ])
            .to_string(),
            json!({"code": "internal_error", "message": "boom"}).to_string(),
            json!([product_json(3, "Cog", "instock")]).to_string(),
        ]);

        let result = fetch_catalog(&source, 2).await;

        assert!(matches!(result, Err(FetchError::Upstream { .. })));
        // Page 3 must never be requested after the error.
        assert_eq!(source.requested(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_zero_per_page_still_terminates() {
        // With per_page 0 no page can ever be "short", so the empty-page
        // stop is what ends the fetch.
        let source = ScriptedSource::new(vec![
            json!([product_json(1, "Widget", "instock")]).to_string(),
        ]);

        let snapshot = fetch_catalog(&source, 0).await.unwrap();

        assert_eq!(source.requested(), vec![1, 2]);
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_catalog_is_empty_snapshot() {
        let source = ScriptedSource::new(vec!["[]".to_string()]);
        let snapshot = fetch_catalog(&source, 100).await.unwrap();
        assert!(snapshot.is_empty());
    }
}
