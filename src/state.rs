use std::sync::Arc;

use crate::config::AppConfig;
use crate::foods::lookup::{FoodLookup, OpenFoodFactsClient};
use crate::storage::{FileStore, MealStore, MemoryStore};

/// Shared handles to the external collaborators. Cloned freely; mutation of
/// draft/flow state happens in the owning flow on the single UI thread, so
/// nothing here needs a lock of its own.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub lookup: Arc<dyn FoodLookup>,
    pub store: Arc<dyn MealStore>,
}

impl AppState {
    pub fn init() -> Self {
        let config = Arc::new(AppConfig::from_env());
        let lookup =
            Arc::new(OpenFoodFactsClient::new(config.lookup.clone())) as Arc<dyn FoodLookup>;
        let store = Arc::new(FileStore::new(config.data_file.clone())) as Arc<dyn MealStore>;
        Self {
            config,
            lookup,
            store,
        }
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        lookup: Arc<dyn FoodLookup>,
        store: Arc<dyn MealStore>,
    ) -> Self {
        Self {
            config,
            lookup,
            store,
        }
    }

    pub fn fake() -> Self {
        use async_trait::async_trait;

        use crate::config::LookupConfig;
        use crate::foods::model::FoodItem;

        struct OfflineLookup;

        #[async_trait]
        impl FoodLookup for OfflineLookup {
            async fn by_barcode(&self, _code: &str) -> Option<FoodItem> {
                None
            }

            async fn by_text(&self, _query: &str) -> Vec<FoodItem> {
                Vec::new()
            }
        }

        let config = AppConfig {
            data_file: "unused.json".into(),
            lookup: LookupConfig {
                product_url: "http://localhost/product".into(),
                search_url: "http://localhost/search".into(),
                user_agent: "nutritrack/test".into(),
                page_size: 10,
            },
        };

        Self {
            config: Arc::new(config),
            lookup: Arc::new(OfflineLookup) as Arc<dyn FoodLookup>,
            store: Arc::new(MemoryStore::new()) as Arc<dyn MealStore>,
        }
    }
}
