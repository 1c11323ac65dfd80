mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, DocumentIndexConfig, Postgres, Search, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
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
	if !matches!(cfg.search.backend.as_str(), "database" | "index") {
		return Err(Error::Validation {
			message: "search.backend must be one of database or index.".to_string(),
		});
	}

	if cfg.search.backend == "index" {
		let Some(index) = cfg.storage.index.as_ref() else {
			return Err(Error::Validation {
				message: "storage.index is required when search.backend is index.".to_string(),
			});
		};

		if index.url.trim().is_empty() {
			return Err(Error::Validation {
				message: "storage.index.url must be non-empty.".to_string(),
			});
		}
		if index.collection.trim().is_empty() {
			return Err(Error::Validation {
				message: "storage.index.collection must be non-empty.".to_string(),
			});
		}
		if index.max_per_page <= 0 {
			return Err(Error::Validation {
				message: "storage.index.max_per_page must be greater than zero.".to_string(),
			});
		}
	}

	Ok(())
}
