use std::{
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use color_eyre::eyre;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use shiori_config::{Config, EmbeddingProviderConfig, ScorerProviderConfig};
use shiori_domain::taxonomy::Category;
use shiori_service::{BoxFuture, EmbeddingProvider, ScoreProvider};

const TEST_CONFIG_TOML: &str = r#"
[classify]
enabled = true
auto_confirm_threshold = 95
show_button_threshold = 60
excluded_categories = []

[providers.scorer]
provider_id = "test"
api_base = "http://localhost:0"
api_key = "test-scorer-key"
path = "/v1/chat/completions"
model = "test-scorer"
temperature = 0.0
timeout_ms = 1000
default_headers = {}

[providers.embedding]
provider_id = "test"
api_base = "http://localhost:0"
api_key = "test-embedding-key"
path = "/v1/embeddings"
model = "test-embedding"
dimensions = 1536
timeout_ms = 1000
min_interval_ms = 1000
max_input_chars = 8000
default_headers = {}

[suggest]
relevance_floor = 60
"#;

/// A valid config with test credentials and short timeouts. Tests mutate the
/// fields they care about.
pub fn test_config() -> Config {
	toml::from_str(TEST_CONFIG_TOML).expect("Test config must parse.")
}

/// Installs a fmt subscriber honoring RUST_LOG. Safe to call repeatedly.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).try_init();
}

/// First line of the classification prompt for a category. Scorer stubs key
/// their per-category rules off it.
pub fn category_marker(category: Category) -> String {
	format!("Category: {category}")
}

fn rendered_content(messages: &[Value]) -> String {
	messages
		.iter()
		.filter_map(|message| message.get("content").and_then(Value::as_str))
		.collect::<Vec<_>>()
		.join("\n")
}

/// Scores by prompt content: the first rule whose needle appears in the
/// rendered messages wins, the fallback covers the rest. Counts calls.
pub struct ScriptedScorer {
	rules: Vec<(String, u8)>,
	fallback: u8,
	calls: Arc<AtomicUsize>,
}

impl ScriptedScorer {
	pub fn new(fallback: u8) -> Self {
		Self { rules: Vec::new(), fallback, calls: Arc::new(AtomicUsize::new(0)) }
	}

	pub fn with_rule(mut self, needle: &str, score: u8) -> Self {
		self.rules.push((needle.to_string(), score));

		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl ScoreProvider for ScriptedScorer {
	fn score<'a>(
		&'a self,
		_cfg: &'a ScorerProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<u8>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let rendered = rendered_content(messages);
		let score = self
			.rules
			.iter()
			.find(|(needle, _)| rendered.contains(needle.as_str()))
			.map(|(_, score)| *score)
			.unwrap_or(self.fallback);

		Box::pin(async move { Ok(score) })
	}
}

/// Fails calls whose rendered prompt contains any marker (every call when the
/// marker list is empty); the rest answer with the fallback score.
pub struct FailingScorer {
	markers: Vec<String>,
	fallback: u8,
	calls: Arc<AtomicUsize>,
}

impl FailingScorer {
	pub fn always() -> Self {
		Self::for_markers(&[], 0)
	}

	pub fn for_markers(markers: &[&str], fallback: u8) -> Self {
		Self {
			markers: markers.iter().map(|marker| marker.to_string()).collect(),
			fallback,
			calls: Arc::new(AtomicUsize::new(0)),
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl ScoreProvider for FailingScorer {
	fn score<'a>(
		&'a self,
		_cfg: &'a ScorerProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<u8>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let rendered = rendered_content(messages);
		let fail = self.markers.is_empty()
			|| self.markers.iter().any(|marker| rendered.contains(marker.as_str()));
		let fallback = self.fallback;

		Box::pin(async move {
			if fail {
				Err(eyre::eyre!("Scripted provider failure."))
			} else {
				Ok(fallback)
			}
		})
	}
}

/// Stalls calls whose rendered prompt contains any marker (every call when
/// the marker list is empty) before answering; the rest answer immediately.
pub struct SlowScorer {
	markers: Vec<String>,
	delay: Duration,
	score: u8,
}

impl SlowScorer {
	pub fn new(delay: Duration, score: u8) -> Self {
		Self { markers: Vec::new(), delay, score }
	}

	pub fn for_markers(markers: &[&str], delay: Duration, score: u8) -> Self {
		Self { markers: markers.iter().map(|marker| marker.to_string()).collect(), delay, score }
	}
}

impl ScoreProvider for SlowScorer {
	fn score<'a>(
		&'a self,
		_cfg: &'a ScorerProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<u8>> {
		let rendered = rendered_content(messages);
		let stall = self.markers.is_empty()
			|| self.markers.iter().any(|marker| rendered.contains(marker.as_str()));
		let delay = self.delay;
		let score = self.score;

		Box::pin(async move {
			if stall {
				tokio::time::sleep(delay).await;
			}

			Ok(score)
		})
	}
}

/// Returns zero vectors at the configured dimension, recording every input it
/// was handed.
#[derive(Default)]
pub struct CountingEmbedding {
	calls: Arc<AtomicUsize>,
	inputs: Arc<Mutex<Vec<String>>>,
}

impl CountingEmbedding {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn inputs(&self) -> Vec<String> {
		self.inputs.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}

impl EmbeddingProvider for CountingEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.inputs.lock().unwrap_or_else(|err| err.into_inner()).push(text.to_string());

		let vector = vec![0.0; cfg.dimensions as usize];

		Box::pin(async move { Ok(vector) })
	}
}

/// Returns a fixed vector regardless of input; handy for dimension checks.
pub struct ScriptedEmbedding {
	vector: Vec<f32>,
}

impl ScriptedEmbedding {
	pub fn new(vector: Vec<f32>) -> Self {
		Self { vector }
	}
}

impl EmbeddingProvider for ScriptedEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		let vector = self.vector.clone();

		Box::pin(async move { Ok(vector) })
	}
}
