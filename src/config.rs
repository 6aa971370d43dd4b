use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub product_url: String,
    pub search_url: String,
    pub user_agent: String,
    pub page_size: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub lookup: LookupConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let data_file = std::env::var("NUTRITRACK_DATA_FILE")
            .unwrap_or_else(|_| "nutritrack.json".into())
            .into();
        let lookup = LookupConfig {
            product_url: std::env::var("OFF_PRODUCT_URL")
                .unwrap_or_else(|_| "https://fr.openfoodfacts.org/api/v2/product".into()),
            search_url: std::env::var("OFF_SEARCH_URL")
                .unwrap_or_else(|_| "https://fr.openfoodfacts.org/cgi/search.pl".into()),
            user_agent: std::env::var("OFF_USER_AGENT")
                .unwrap_or_else(|_| "nutritrack/0.1".into()),
            page_size: std::env::var("OFF_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
        };
        Self { data_file, lookup }
    }
}
