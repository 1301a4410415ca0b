use std::time::Duration;

use futures::future::join_all;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use shiori_domain::taxonomy::Category;

use crate::ShioriService;

/// One entry from the store's time-windowed suggestion pool. The caller owns
/// impression bookkeeping and increments counts after selection; selection
/// itself never mutates anything.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SuggestionCandidate {
	pub id: Uuid,
	pub category: Category,
	pub text: String,
	pub created_at: OffsetDateTime,
	pub impression_count: u32,
}

impl ShioriService {
	/// Picks at most one candidate per category, in taxonomy order, weighting
	/// each entry by `1 / (1 + impressions)` so less-shown items win more
	/// often without ever excluding the rest. Categories with an empty
	/// sub-pool are simply absent from the result.
	pub fn select_weighted_random(&self, pool: &[SuggestionCandidate]) -> Vec<SuggestionCandidate> {
		select_weighted_random_with(pool, &mut rand::rng())
	}

	/// Re-scores every candidate against a free-text query and keeps the best
	/// per category, in taxonomy order; categories whose best score falls
	/// below the relevance floor are dropped. One scoring call per candidate,
	/// so callers cap the pool size before invoking this.
	pub async fn select_by_llm_score(
		&self,
		pool: &[SuggestionCandidate],
		query: &str,
	) -> Vec<SuggestionCandidate> {
		if pool.is_empty() {
			return Vec::new();
		}

		let deadline = Duration::from_millis(self.cfg.providers.scorer.timeout_ms);
		let branches = pool.iter().map(|candidate| async move {
			let messages = build_relevance_messages(query, &candidate.text);
			let call = self.providers.scorer.score(&self.cfg.providers.scorer, &messages);

			match tokio::time::timeout(deadline, call).await {
				Ok(Ok(score)) => (candidate, score),
				Ok(Err(err)) => {
					warn!(error = %err, candidate_id = %candidate.id, "Relevance scoring failed.");

					(candidate, 0)
				},
				Err(_) => {
					warn!(candidate_id = %candidate.id, "Relevance scoring timed out.");

					(candidate, 0)
				},
			}
		});
		let scored = join_all(branches).await;
		let floor = self.cfg.suggest.relevance_floor;
		let mut picked = Vec::new();

		for category in Category::ALL {
			let mut best: Option<(&SuggestionCandidate, u8)> = None;

			for &(candidate, score) in &scored {
				if candidate.category != category {
					continue;
				}
				// Strict comparison keeps the earliest candidate on ties.
				if best.is_none_or(|(_, best_score)| score > best_score) {
					best = Some((candidate, score));
				}
			}

			if let Some((candidate, score)) = best
				&& score >= floor
			{
				picked.push(candidate.clone());
			}
		}

		picked
	}
}

/// Deterministic core of the weighted draw; tests drive it with a seeded RNG.
pub fn select_weighted_random_with<R>(
	pool: &[SuggestionCandidate],
	rng: &mut R,
) -> Vec<SuggestionCandidate>
where
	R: Rng + ?Sized,
{
	let mut picked = Vec::new();

	for category in Category::ALL {
		let sub_pool = pool
			.iter()
			.filter(|candidate| candidate.category == category)
			.collect::<Vec<_>>();

		if sub_pool.is_empty() {
			continue;
		}

		let weights = sub_pool
			.iter()
			.map(|candidate| 1.0 / (1.0 + f64::from(candidate.impression_count)))
			.collect::<Vec<_>>();
		let total = weights.iter().sum::<f64>();
		let draw = rng.random_range(0.0..total);

		picked.push(sub_pool[pick_index(&weights, draw)].clone());
	}

	picked
}

/// Cumulative-weight sampling: returns the first index whose cumulative
/// weight exceeds the draw.
fn pick_index(weights: &[f64], draw: f64) -> usize {
	let mut cumulative = 0.0;

	for (index, weight) in weights.iter().enumerate() {
		cumulative += weight;

		if draw < cumulative {
			return index;
		}
	}

	// Rounding can push the cumulative sum just short of the total.
	weights.len() - 1
}

fn build_relevance_messages(query: &str, text: &str) -> Vec<Value> {
	let system_prompt = "You are a relevance engine for short saved notes. \
Reply with a single integer from 0 to 100: how relevant the note is to the \
query. Do not add explanations or any other text.";
	let user_prompt = format!("Query: {query}\nNote text:\n{text}");

	vec![
		serde_json::json!({ "role": "system", "content": system_prompt }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

#[cfg(test)]
mod tests {
	use super::{build_relevance_messages, pick_index};

	#[test]
	fn pick_index_walks_cumulative_weights() {
		let weights = [1.0, 0.5, 0.25];

		assert_eq!(pick_index(&weights, 0.0), 0);
		assert_eq!(pick_index(&weights, 0.99), 0);
		assert_eq!(pick_index(&weights, 1.0), 1);
		assert_eq!(pick_index(&weights, 1.49), 1);
		assert_eq!(pick_index(&weights, 1.5), 2);
		assert_eq!(pick_index(&weights, 1.74), 2);
	}

	#[test]
	fn pick_index_tolerates_a_draw_at_the_total() {
		let weights = [0.1, 0.2];

		assert_eq!(pick_index(&weights, 0.3), 1);
		assert_eq!(pick_index(&weights, 0.300_000_1), 1);
	}

	#[test]
	fn relevance_messages_embed_query_and_note() {
		let messages = build_relevance_messages("dinner ideas", "weeknight pasta");
		let user = messages[1]["content"].as_str().expect("user content");

		assert!(user.starts_with("Query: dinner ideas\n"));
		assert!(user.contains("weeknight pasta"));
	}
}
