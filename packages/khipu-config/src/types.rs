use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub storage: Storage,
	pub search: Search,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub index: Option<DocumentIndexConfig>,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Connection settings for the external document-search service. Only
/// required when `search.backend` is `index`.
#[derive(Debug, Deserialize, Clone)]
pub struct DocumentIndexConfig {
	pub url: String,
	pub api_key: String,
	pub collection: String,
	#[serde(default = "default_max_per_page")]
	pub max_per_page: i64,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Search {
	/// Which searcher backs task retrieval: `database` or `index`.
	pub backend: String,
}

fn default_max_per_page() -> i64 {
	250
}

fn default_timeout_ms() -> u64 {
	10_000
}
