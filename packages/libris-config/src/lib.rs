mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Postgres, Provider, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.provider.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "provider.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.provider.covers_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "provider.covers_base must be non-empty.".to_string(),
		});
	}
	if cfg.provider.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "provider.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.provider.search_limit == 0 {
		return Err(Error::Validation {
			message: "provider.search_limit must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	// Work keys and endpoint paths carry their own leading slash.
	while cfg.provider.api_base.ends_with('/') {
		cfg.provider.api_base.pop();
	}
	while cfg.provider.covers_base.ends_with('/') {
		cfg.provider.covers_base.pop();
	}
}
