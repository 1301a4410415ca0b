use unicode_normalization::UnicodeNormalization;
use unicode_script::{Script, UnicodeScript};
use url::Url;

use crate::taxonomy::Category;

const KANA_SCORE: u8 = 85;
const FULL_WRITING_SCORE: u8 = 95;
const FULL_WRITING_MIN_CHARS: usize = 3;

struct Allowlist {
	category: Category,
	score: u8,
	domains: &'static [&'static str],
	path_fragments: &'static [&'static str],
}

const ALLOWLISTS: [Allowlist; 4] = [
	Allowlist {
		category: Category::Video,
		score: 95,
		domains: &["youtube.com", "youtu.be", "vimeo.com", "twitch.tv", "nicovideo.jp"],
		path_fragments: &["/watch", "/shorts/"],
	},
	Allowlist {
		category: Category::Code,
		score: 95,
		domains: &["github.com", "gitlab.com", "bitbucket.org", "crates.io", "docs.rs"],
		path_fragments: &[],
	},
	Allowlist {
		category: Category::Recipe,
		score: 92,
		domains: &["allrecipes.com", "cookpad.com", "seriouseats.com", "bonappetit.com", "food52.com"],
		path_fragments: &["/recipe/", "/recipes/"],
	},
	Allowlist {
		category: Category::Shopping,
		score: 90,
		domains: &["amazon.com", "amazon.co.jp", "ebay.com", "etsy.com", "rakuten.co.jp"],
		path_fragments: &["/dp/", "/gp/product"],
	},
];

/// Deterministic scores keyed by category. A missing entry means no rule
/// fired, which is distinct from a score of zero: absence never overrides the
/// model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternScores {
	scores: [Option<u8>; Category::ALL.len()],
}

impl PatternScores {
	pub fn get(&self, category: Category) -> Option<u8> {
		self.scores[category.rank()]
	}

	pub fn is_empty(&self) -> bool {
		self.scores.iter().all(Option::is_none)
	}

	fn raise(&mut self, category: Category, score: u8) {
		let slot = &mut self.scores[category.rank()];

		if slot.is_none_or(|existing| existing < score) {
			*slot = Some(score);
		}
	}
}

/// Scores categories from deterministic signals alone: script detection for
/// Japanese and domain/path allowlists for link-bound categories. Pure and
/// synchronous; the classifier fuses these with model scores afterwards.
pub fn detect(text: &str, urls: &[String]) -> PatternScores {
	let mut scores = PatternScores::default();

	if let Some(score) = japanese_script_score(text) {
		scores.raise(Category::Japanese, score);
	}
	for raw in urls {
		// Notes often carry pasted hosts without a scheme; retry with one.
		let Ok(url) = Url::parse(raw).or_else(|_| Url::parse(&format!("https://{raw}"))) else {
			continue;
		};

		for list in &ALLOWLISTS {
			if matches_allowlist(list, &url) {
				scores.raise(list.category, list.score);
			}
		}
	}

	scores
}

fn japanese_script_score(text: &str) -> Option<u8> {
	let normalized: String = text.nfkc().collect();
	let mut kana = 0usize;
	let mut japanese = 0usize;

	for ch in normalized.chars() {
		match ch.script() {
			Script::Hiragana | Script::Katakana => {
				kana += 1;
				japanese += 1;
			},
			Script::Han => japanese += 1,
			_ => {},
		}
	}

	// Han alone is ambiguous with Chinese, so kana gates the rule entirely.
	if kana == 0 {
		return None;
	}
	if japanese >= FULL_WRITING_MIN_CHARS {
		return Some(FULL_WRITING_SCORE);
	}

	Some(KANA_SCORE)
}

fn matches_allowlist(list: &Allowlist, url: &Url) -> bool {
	if let Some(host) = url.host_str()
		&& list.domains.iter().any(|domain| host_matches(host, domain))
	{
		return true;
	}

	list.path_fragments.iter().any(|fragment| url.path().contains(fragment))
}

fn host_matches(host: &str, domain: &str) -> bool {
	host == domain || host.strip_suffix(domain).is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
mod tests {
	use super::detect;
	use crate::taxonomy::Category;

	fn urls(raw: &[&str]) -> Vec<String> {
		raw.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn plain_english_yields_nothing() {
		let scores = detect("buy milk tomorrow", &[]);

		assert!(scores.is_empty());
	}

	#[test]
	fn single_kana_scores_eighty_five() {
		let scores = detect("the particle \u{306F} marks the topic", &[]);

		assert_eq!(scores.get(Category::Japanese), Some(85));
	}

	#[test]
	fn four_katakana_characters_score_ninety_five() {
		let scores = detect("\u{30A2}\u{30A4}\u{30A6}\u{30A8}", &[]);

		assert_eq!(scores.get(Category::Japanese), Some(95));
	}

	#[test]
	fn kana_with_kanji_scores_ninety_five() {
		// One hiragana plus three Han characters.
		let scores = detect("\u{65E5}\u{672C}\u{8A9E}\u{3060}", &[]);

		assert_eq!(scores.get(Category::Japanese), Some(95));
	}

	#[test]
	fn han_only_text_yields_nothing() {
		// Indistinguishable from Chinese without kana.
		let scores = detect("\u{4F60}\u{597D}\u{4E16}\u{754C}", &[]);

		assert_eq!(scores.get(Category::Japanese), None);
	}

	#[test]
	fn halfwidth_katakana_normalizes_before_counting() {
		let scores = detect("\u{FF71}\u{FF72}\u{FF73}", &[]);

		assert_eq!(scores.get(Category::Japanese), Some(95));
	}

	#[test]
	fn video_domain_matches_with_and_without_scheme() {
		let with_scheme = detect("", &urls(&["https://www.youtube.com/watch?v=abc"]));
		let bare = detect("", &urls(&["youtu.be/abc"]));

		assert_eq!(with_scheme.get(Category::Video), Some(95));
		assert_eq!(bare.get(Category::Video), Some(95));
	}

	#[test]
	fn host_matching_requires_a_label_boundary() {
		let lookalike = detect("", &urls(&["https://notyoutube.com/a"]));
		let subdomain = detect("", &urls(&["https://music.youtube.com/"]));

		assert_eq!(lookalike.get(Category::Video), None);
		assert_eq!(subdomain.get(Category::Video), Some(95));
	}

	#[test]
	fn path_fragment_matches_on_unknown_domains() {
		let scores = detect("", &urls(&["https://example.org/recipes/123"]));

		assert_eq!(scores.get(Category::Recipe), Some(92));
	}

	#[test]
	fn code_list_matches_by_domain_only() {
		let scores = detect("", &urls(&["https://github.com/hack-ink/shiori"]));

		assert_eq!(scores.get(Category::Code), Some(95));
		assert_eq!(scores.get(Category::Video), None);
	}

	#[test]
	fn shopping_path_fragment_fires_at_ninety() {
		let scores = detect("", &urls(&["https://amazon.co.jp/dp/B000000000"]));

		assert_eq!(scores.get(Category::Shopping), Some(90));
	}

	#[test]
	fn category_score_takes_the_max_across_urls() {
		let scores = detect(
			"",
			&urls(&["https://example.org/watch/1", "https://www.youtube.com/watch?v=abc"]),
		);

		// Both URLs match the video list; the score stays at the list value.
		assert_eq!(scores.get(Category::Video), Some(95));
	}

	#[test]
	fn unparseable_urls_are_skipped() {
		let scores = detect("", &urls(&["http://[not-a-url", "https://github.com/x"]));

		assert_eq!(scores.get(Category::Code), Some(95));
	}

	#[test]
	fn text_and_urls_score_independent_categories() {
		let scores = detect("\u{30E9}\u{30FC}\u{30E1}\u{30F3}", &urls(&["https://cookpad.com/jp/1"]));

		assert_eq!(scores.get(Category::Japanese), Some(95));
		assert_eq!(scores.get(Category::Recipe), Some(92));
		assert!(!scores.is_empty());
	}
}
