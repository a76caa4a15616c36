mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Alignment, Config, EmbeddingProviderConfig, Providers, Qdrant, Service, Storage, Thresholds,
};

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

pub fn normalize(cfg: &mut Config) {
	while cfg.providers.embedding.api_base.ends_with('/') {
		cfg.providers.embedding.api_base.pop();
	}

	if !cfg.providers.embedding.path.starts_with('/') {
		cfg.providers.embedding.path.insert(0, '/');
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.providers.embedding.model.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.model must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.alignment.top_k == 0 {
		return Err(Error::Validation {
			message: "alignment.top_k must be greater than zero.".to_string(),
		});
	}

	let thresholds = cfg.alignment.thresholds;

	for (name, value) in [("strong", thresholds.strong), ("medium", thresholds.medium)] {
		if !value.is_finite() || !(0.0..=1.0).contains(&value) {
			return Err(Error::Validation {
				message: format!("alignment.thresholds.{name} must be within [0, 1]."),
			});
		}
	}
	if thresholds.medium > thresholds.strong {
		return Err(Error::Validation {
			message: "alignment.thresholds.medium must not exceed alignment.thresholds.strong."
				.to_string(),
		});
	}

	Ok(())
}
