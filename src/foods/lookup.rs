use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::LookupConfig;
use crate::foods::model::{FoodItem, NutriScore};

pub const FALLBACK_NAME: &str = "Unknown product";
pub const FALLBACK_BRAND: &str = "Unknown brand";

const SEARCH_FIELDS: &str =
    "code,product_name,product_name_fr,product_name_en,brands,image_url,nutriscore_grade,nutriments";

/// Food database boundary. Failures are caught and logged inside the
/// implementation and surface as `None` / empty, never as errors.
#[async_trait]
pub trait FoodLookup: Send + Sync {
    async fn by_barcode(&self, code: &str) -> Option<FoodItem>;
    async fn by_text(&self, query: &str) -> Vec<FoodItem>;
}

// Loosely-typed payload as OpenFoodFacts returns it. Everything is optional;
// `normalize` fills the defaults so the core never sees these types.

#[derive(Debug, Default, Deserialize)]
struct RawProduct {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    product_name_fr: Option<String>,
    #[serde(default)]
    product_name_en: Option<String>,
    #[serde(default)]
    brands: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    nutriscore_grade: Option<String>,
    #[serde(default)]
    nutriments: RawNutriments,
}

#[derive(Debug, Default, Deserialize)]
struct RawNutriments {
    #[serde(default, rename = "energy-kcal_100g")]
    energy_kcal_100g: Option<f64>,
    #[serde(default, rename = "proteins_100g")]
    proteins_100g: Option<f64>,
    #[serde(default, rename = "carbohydrates_100g")]
    carbohydrates_100g: Option<f64>,
    #[serde(default, rename = "fat_100g")]
    fat_100g: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    #[serde(default)]
    status: Option<i64>,
    #[serde(default)]
    product: Option<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    products: Vec<RawProduct>,
}

fn macro_or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.max(0.0),
        _ => 0.0,
    }
}

fn normalize(code: &str, product: RawProduct) -> FoodItem {
    let name = [
        product.product_name.as_deref(),
        product.product_name_fr.as_deref(),
        product.product_name_en.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|s| !s.is_empty())
    .unwrap_or(FALLBACK_NAME)
    .to_string();

    let brand = product
        .brands
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_BRAND)
        .to_string();

    FoodItem {
        id: code.to_string(),
        name,
        brand,
        image_url: product.image_url.filter(|s| !s.trim().is_empty()),
        nutriscore: product
            .nutriscore_grade
            .as_deref()
            .map(NutriScore::from_grade)
            .unwrap_or_default(),
        calories: macro_or_zero(product.nutriments.energy_kcal_100g),
        protein_g: macro_or_zero(product.nutriments.proteins_100g),
        carbs_g: macro_or_zero(product.nutriments.carbohydrates_100g),
        fat_g: macro_or_zero(product.nutriments.fat_100g),
    }
}

fn normalize_products(products: Vec<RawProduct>) -> Vec<FoodItem> {
    products
        .into_iter()
        .filter_map(|mut product| {
            let code = product
                .code
                .take()
                .map(|c| c.trim().to_string())
                .unwrap_or_default();
            if code.is_empty() {
                debug!("skipping search result without a product code");
                return None;
            }
            Some(normalize(&code, product))
        })
        .collect()
}

pub struct OpenFoodFactsClient {
    http: reqwest::Client,
    config: LookupConfig,
}

impl OpenFoodFactsClient {
    pub fn new(config: LookupConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn fetch_product(&self, code: &str) -> anyhow::Result<Option<FoodItem>> {
        let url = format!("{}/{}.json", self.config.product_url, code);
        let response = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .context("openfoodfacts product request")?;

        // Unknown barcodes come back as 404 with a status-0 body.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let envelope: ProductEnvelope = response
            .error_for_status()
            .context("openfoodfacts product status")?
            .json()
            .await
            .context("openfoodfacts product payload")?;
        if envelope.status == Some(0) {
            return Ok(None);
        }
        Ok(envelope.product.map(|p| normalize(code, p)))
    }

    async fn fetch_search(&self, query: &str) -> anyhow::Result<Vec<FoodItem>> {
        let page_size = self.config.page_size.to_string();
        let envelope: SearchEnvelope = self
            .http
            .get(&self.config.search_url)
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", page_size.as_str()),
                ("fields", SEARCH_FIELDS),
            ])
            .send()
            .await
            .context("openfoodfacts search request")?
            .error_for_status()
            .context("openfoodfacts search status")?
            .json()
            .await
            .context("openfoodfacts search payload")?;
        Ok(normalize_products(envelope.products))
    }
}

#[async_trait]
impl FoodLookup for OpenFoodFactsClient {
    async fn by_barcode(&self, code: &str) -> Option<FoodItem> {
        match self.fetch_product(code).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, %code, "barcode lookup failed");
                None
            }
        }
    }

    async fn by_text(&self, query: &str) -> Vec<FoodItem> {
        if query.is_empty() {
            return Vec::new();
        }
        match self.fetch_search(query).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, query, "food search failed");
                Vec::new()
            }
        }
    }
}
