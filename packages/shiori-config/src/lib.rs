mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Classify, Config, EmbeddingProviderConfig, Providers, ScorerProviderConfig, Suggest};

use std::{fs, path::Path};

use shiori_domain::taxonomy::Category;

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
	if cfg.classify.auto_confirm_threshold > 100 {
		return Err(Error::Validation {
			message: "classify.auto_confirm_threshold must be 100 or less.".to_string(),
		});
	}
	if cfg.classify.show_button_threshold > 100 {
		return Err(Error::Validation {
			message: "classify.show_button_threshold must be 100 or less.".to_string(),
		});
	}
	if cfg.classify.auto_confirm_threshold < cfg.classify.show_button_threshold {
		return Err(Error::Validation {
			message: "classify.auto_confirm_threshold must be at least classify.show_button_threshold."
				.to_string(),
		});
	}

	for name in &cfg.classify.excluded_categories {
		if Category::from_name(name).is_none() {
			return Err(Error::Validation {
				message: format!("classify.excluded_categories contains unknown category {name:?}."),
			});
		}
	}

	if cfg.providers.scorer.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.scorer.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.max_input_chars == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.max_input_chars must be greater than zero.".to_string(),
		});
	}

	// The scorer only needs credentials while classification can call it.
	if cfg.classify.enabled && cfg.providers.scorer.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider scorer api_key must be non-empty when classify.enabled is true."
				.to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}

	if cfg.suggest.relevance_floor > 100 {
		return Err(Error::Validation {
			message: "suggest.relevance_floor must be 100 or less.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for name in &mut cfg.classify.excluded_categories {
		*name = name.trim().to_ascii_lowercase();
	}
	cfg.classify.excluded_categories.retain(|name| !name.is_empty());
}
