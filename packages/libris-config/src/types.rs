use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub provider: Provider,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Bibliographic metadata provider endpoints (OpenLibrary-shaped).
#[derive(Debug, Deserialize)]
pub struct Provider {
	pub api_base: String,
	pub covers_base: String,
	pub timeout_ms: u64,
	#[serde(default = "default_search_limit")]
	pub search_limit: u32,
}

fn default_search_limit() -> u32 {
	10
}
