pub mod classify;
pub mod embed;
pub mod rank;
pub mod suggest;

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use serde_json::Value;

use embed::RateGate;
pub use rank::{MatchKind, RankedItem, ScoredRow};
use shiori_config::{Config, EmbeddingProviderConfig, ScorerProviderConfig};
use shiori_providers::{embedding, scorer};
pub use suggest::SuggestionCandidate;

pub type Result<T> = std::result::Result<T, Error>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Answers one prompt with an integer score in 0-100.
pub trait ScoreProvider
where
	Self: Send + Sync,
{
	fn score<'a>(
		&'a self,
		cfg: &'a ScorerProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<u8>>;
}

/// Embeds one text into a fixed-dimension vector.
pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>>;
}

#[derive(Debug)]
pub enum Error {
	Provider { message: String },
}

#[derive(Clone)]
pub struct Providers {
	pub scorer: Arc<dyn ScoreProvider>,
	pub embedding: Arc<dyn EmbeddingProvider>,
}

/// The classification and ranking engine. Transport, storage and presentation
/// live with the callers; this type only scores, ranks and selects.
pub struct ShioriService {
	pub cfg: Config,
	pub providers: Providers,
	rate_gate: RateGate,
}

struct DefaultProviders;

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Provider { message } => write!(f, "Provider error: {message}"),
		}
	}
}

impl std::error::Error for Error {}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl ScoreProvider for DefaultProviders {
	fn score<'a>(
		&'a self,
		cfg: &'a ScorerProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<u8>> {
		Box::pin(scorer::score(cfg, messages))
	}
}

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(embedding::embed(cfg, text))
	}
}

impl Providers {
	pub fn new(scorer: Arc<dyn ScoreProvider>, embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { scorer, embedding }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { scorer: provider.clone(), embedding: provider }
	}
}

impl ShioriService {
	pub fn new(cfg: Config) -> Self {
		Self::with_providers(cfg, Providers::default())
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		let rate_gate =
			RateGate::new(Duration::from_millis(cfg.providers.embedding.min_interval_ms));

		Self { cfg, providers, rate_gate }
	}
}
