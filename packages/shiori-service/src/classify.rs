use std::time::Duration;

use futures::future::join_all;
use serde_json::Value;
use tracing::warn;

use shiori_domain::{
	pattern,
	score::{Action, CategoryScore},
	taxonomy::Category,
};

use crate::ShioriService;

impl ShioriService {
	/// Scores the note against every category and returns the entries worth
	/// surfacing (action is auto-confirm or show-button), ordered by
	/// descending score with taxonomy order breaking ties.
	pub async fn classify(&self, text: &str, urls: &[String]) -> Vec<CategoryScore> {
		let mut entries = self.classify_all(text, urls).await;

		entries.retain(|entry| entry.action != Action::Skip);

		entries
	}

	/// Unfiltered variant: one entry per category regardless of action, so a
	/// manual override can target any category. Skip-tier entries keep their
	/// raw sub-threshold score, which keeps the sorted-by-confidence order
	/// truthful.
	pub async fn classify_all(&self, text: &str, urls: &[String]) -> Vec<CategoryScore> {
		if !self.cfg.classify.enabled {
			return Vec::new();
		}

		let patterns = pattern::detect(text, urls);
		let excluded = self.cfg.classify.excluded();
		let deadline = Duration::from_millis(self.cfg.providers.scorer.timeout_ms);
		let branches = Category::ALL.into_iter().map(|category| {
			let excluded = excluded.contains(&category);

			async move {
				if excluded {
					return (category, 0);
				}

				let messages = build_category_messages(category, text, urls);
				let call = self.providers.scorer.score(&self.cfg.providers.scorer, &messages);

				// A branch failure degrades that category alone; siblings
				// keep running.
				match tokio::time::timeout(deadline, call).await {
					Ok(Ok(score)) => (category, score),
					Ok(Err(err)) => {
						warn!(error = %err, category = %category, "Category scoring failed.");

						(category, 0)
					},
					Err(_) => {
						warn!(category = %category, "Category scoring timed out.");

						(category, 0)
					},
				}
			}
		});
		let model_scores = join_all(branches).await;
		let auto_confirm = self.cfg.classify.auto_confirm_threshold;
		let show_button = self.cfg.classify.show_button_threshold;
		let mut entries = model_scores
			.into_iter()
			.map(|(category, model_score)| {
				let score = fused_score(patterns.get(category), model_score);

				CategoryScore::new(category, score, auto_confirm, show_button)
			})
			.collect::<Vec<_>>();

		entries.sort_by(|a, b| {
			b.score.cmp(&a.score).then_with(|| a.category.rank().cmp(&b.category.rank()))
		});

		entries
	}
}

/// A pattern score overrides the model only when it is strictly stronger, so
/// deterministic detection can raise a score but never lower one.
fn fused_score(pattern_score: Option<u8>, model_score: u8) -> u8 {
	match pattern_score {
		Some(score) if score > model_score => score,
		_ => model_score,
	}
}

fn build_category_messages(category: Category, text: &str, urls: &[String]) -> Vec<Value> {
	let system_prompt = "You are a classification engine for short saved notes. \
Reply with a single integer from 0 to 100: the confidence that the note belongs \
to the named category. Do not add explanations or any other text.";
	let links = if urls.is_empty() { "(none)".to_string() } else { urls.join("\n") };
	let user_prompt = format!(
		"Category: {category}\nTypical signals: {cues}\nNote text:\n{text}\nLinks:\n{links}",
		cues = category_cues(category),
	);

	vec![
		serde_json::json!({ "role": "system", "content": system_prompt }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

fn category_cues(category: Category) -> &'static str {
	match category {
		Category::Japanese =>
			"Japanese language content or study material, kana or kanji text, vocabulary, grammar notes",
		Category::Recipe =>
			"cooking instructions, ingredient lists, dishes to make, links to recipe sites",
		Category::Video => "things to watch, video links, channels, films, streams",
		Category::Code =>
			"programming, repositories, libraries, technical documentation, code snippets",
		Category::Shopping => "things to buy, product links, prices, wish-list entries",
		Category::Idea => "original thoughts, plans, project ideas, things to try",
	}
}
