use serde::Deserialize;
use serde_json::{Map, Value};

use shiori_domain::taxonomy::Category;

#[derive(Debug, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub classify: Classify,
	pub providers: Providers,
	#[serde(default)]
	pub suggest: Suggest,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Classify {
	pub enabled: bool,
	pub auto_confirm_threshold: u8,
	pub show_button_threshold: u8,
	/// Category names the scorer fan-out skips. Pattern detection still
	/// applies to them.
	pub excluded_categories: Vec<String>,
}
impl Default for Classify {
	fn default() -> Self {
		Self {
			enabled: true,
			auto_confirm_threshold: 95,
			show_button_threshold: 60,
			excluded_categories: Vec::new(),
		}
	}
}
impl Classify {
	/// Excluded names resolved against the taxonomy. Validation rejects
	/// unknown names before a config reaches callers, so the lossy filter
	/// drops nothing in practice.
	pub fn excluded(&self) -> Vec<Category> {
		self.excluded_categories.iter().filter_map(|name| Category::from_name(name)).collect()
	}
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub scorer: ScorerProviderConfig,
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct ScorerProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	/// Minimum delay between two embedding calls.
	pub min_interval_ms: u64,
	/// Inputs longer than this are truncated before the call.
	pub max_input_chars: u32,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Suggest {
	/// Semantic suggestions below this score drop their category entirely.
	pub relevance_floor: u8,
}
impl Default for Suggest {
	fn default() -> Self {
		Self { relevance_floor: 60 }
	}
}
