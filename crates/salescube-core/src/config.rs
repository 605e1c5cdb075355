use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: String,
    pub docs_dir: String,
    pub seed: u64,
    pub sample_url: String,
    pub sample_timeout_secs: u64,
    pub duckdb_memory_limit: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            data_dir: std::env::var("SALESCUBE_DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string()),
            docs_dir: std::env::var("SALESCUBE_DOCS_DIR")
                .unwrap_or_else(|_| "./docs".to_string()),
            seed: std::env::var("SALESCUBE_SEED")
                .unwrap_or_else(|_| "42".to_string())
                .parse()
                .map_err(|e| format!("invalid seed: {e}"))?,
            sample_url: std::env::var("SALESCUBE_SAMPLE_URL")
                .unwrap_or_else(|_| "https://httpbin.org/json".to_string()),
            sample_timeout_secs: std::env::var("SALESCUBE_SAMPLE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            duckdb_memory_limit: std::env::var("SALESCUBE_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "512MB".to_string()),
        })
    }

    /// Path of the DuckDB database file inside `data_dir`.
    pub fn db_path(&self) -> String {
        format!("{}/salescube.duckdb", self.data_dir)
    }

    pub fn sample_timeout(&self) -> Duration {
        Duration::from_secs(self.sample_timeout_secs)
    }
}
