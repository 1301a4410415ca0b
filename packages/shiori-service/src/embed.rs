use std::time::Duration;

use tokio::{sync::Mutex, time::Instant};
use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, Result, ShioriService};

/// One-permit leaky bucket: at most one embedding call per interval. The lock
/// is held across the sleep, so concurrent callers line up FIFO behind it.
pub(crate) struct RateGate {
	min_interval: Duration,
	last_call: Mutex<Option<Instant>>,
}

impl RateGate {
	pub(crate) fn new(min_interval: Duration) -> Self {
		Self { min_interval, last_call: Mutex::new(None) }
	}

	pub(crate) async fn acquire(&self) {
		let mut last_call = self.last_call.lock().await;

		if let Some(previous) = *last_call {
			let elapsed = previous.elapsed();

			if elapsed < self.min_interval {
				tokio::time::sleep(self.min_interval - elapsed).await;
			}
		}

		*last_call = Some(Instant::now());
	}
}

/// Cuts the input at the configured budget on a grapheme boundary. The model
/// enforces a hard token ceiling; silent truncation is accepted behavior.
pub(crate) fn truncate_input(text: &str, max_chars: usize) -> &str {
	match text.grapheme_indices(true).nth(max_chars) {
		Some((index, _)) => &text[..index],
		None => text,
	}
}

impl ShioriService {
	/// Embeds one text, rate-gated and truncated to the configured budget.
	/// Unlike classification, embedding failures surface as errors: callers
	/// need the vector, so there is nothing to degrade to.
	pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
		self.rate_gate.acquire().await;

		let cfg = &self.cfg.providers.embedding;
		let input = truncate_input(text, cfg.max_input_chars as usize);
		let vector = self.providers.embedding.embed(cfg, input).await?;

		if vector.len() != cfg.dimensions as usize {
			return Err(Error::Provider {
				message: format!(
					"Embedding dimension mismatch: expected {}, got {}.",
					cfg.dimensions,
					vector.len()
				),
			});
		}

		Ok(vector)
	}

	/// Embeds texts strictly one after another; every call passes through the
	/// rate gate, so a batch never exceeds the provider's rate ceiling.
	pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		let mut vectors = Vec::with_capacity(texts.len());

		for text in texts {
			vectors.push(self.embed(text).await?);
		}

		Ok(vectors)
	}
}
