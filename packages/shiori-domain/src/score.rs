use serde::{Deserialize, Serialize};

use crate::taxonomy::Category;

pub const MAX_SCORE: u8 = 100;

/// Confidence bucket derived from a score via fixed breakpoints. Only actions
/// move with configuration; tiers do not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
	Insufficient,
	Low,
	Moderate,
	High,
	Definite,
}

/// What the UI does with a scored category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
	Skip,
	ShowButton,
	AutoConfirm,
}

/// One category's outcome for a single classification request. Computed fresh
/// per request and never mutated afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
	pub category: Category,
	pub score: u8,
	pub tier: Tier,
	pub action: Action,
}

impl Tier {
	pub fn for_score(score: u8) -> Self {
		match score {
			0..=59 => Self::Insufficient,
			60..=69 => Self::Low,
			70..=84 => Self::Moderate,
			85..=94 => Self::High,
			_ => Self::Definite,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Insufficient => "insufficient",
			Self::Low => "low",
			Self::Moderate => "moderate",
			Self::High => "high",
			Self::Definite => "definite",
		}
	}
}

impl Action {
	pub fn for_score(score: u8, auto_confirm_threshold: u8, show_button_threshold: u8) -> Self {
		if score >= auto_confirm_threshold {
			Self::AutoConfirm
		} else if score >= show_button_threshold {
			Self::ShowButton
		} else {
			Self::Skip
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Skip => "skip",
			Self::ShowButton => "show-button",
			Self::AutoConfirm => "auto-confirm",
		}
	}
}

impl CategoryScore {
	pub fn new(
		category: Category,
		score: u8,
		auto_confirm_threshold: u8,
		show_button_threshold: u8,
	) -> Self {
		let score = score.min(MAX_SCORE);

		Self {
			category,
			score,
			tier: Tier::for_score(score),
			action: Action::for_score(score, auto_confirm_threshold, show_button_threshold),
		}
	}
}

impl std::fmt::Display for Tier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::fmt::Display for Action {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Clamps a raw model answer into the score range.
pub fn clamp_score(value: i64) -> u8 {
	value.clamp(0, MAX_SCORE as i64) as u8
}

#[cfg(test)]
mod tests {
	use super::{Action, CategoryScore, Tier, clamp_score};
	use crate::taxonomy::Category;

	#[test]
	fn tier_breakpoints_are_fixed() {
		assert_eq!(Tier::for_score(0), Tier::Insufficient);
		assert_eq!(Tier::for_score(59), Tier::Insufficient);
		assert_eq!(Tier::for_score(60), Tier::Low);
		assert_eq!(Tier::for_score(69), Tier::Low);
		assert_eq!(Tier::for_score(70), Tier::Moderate);
		assert_eq!(Tier::for_score(84), Tier::Moderate);
		assert_eq!(Tier::for_score(85), Tier::High);
		assert_eq!(Tier::for_score(94), Tier::High);
		assert_eq!(Tier::for_score(95), Tier::Definite);
		assert_eq!(Tier::for_score(100), Tier::Definite);
	}

	#[test]
	fn action_follows_configured_thresholds() {
		assert_eq!(Action::for_score(59, 95, 60), Action::Skip);
		assert_eq!(Action::for_score(60, 95, 60), Action::ShowButton);
		assert_eq!(Action::for_score(94, 95, 60), Action::ShowButton);
		assert_eq!(Action::for_score(95, 95, 60), Action::AutoConfirm);

		// Stricter auto-confirm threshold moves only the auto-confirm edge.
		assert_eq!(Action::for_score(95, 100, 60), Action::ShowButton);
		assert_eq!(Action::for_score(100, 100, 60), Action::AutoConfirm);
	}

	#[test]
	fn clamp_keeps_scores_in_range() {
		assert_eq!(clamp_score(-5), 0);
		assert_eq!(clamp_score(0), 0);
		assert_eq!(clamp_score(72), 72);
		assert_eq!(clamp_score(100), 100);
		assert_eq!(clamp_score(1_000), 100);
	}

	#[test]
	fn category_score_clamps_and_derives_both_fields() {
		let entry = CategoryScore::new(Category::Video, 255, 95, 60);

		assert_eq!(entry.score, 100);
		assert_eq!(entry.tier, Tier::Definite);
		assert_eq!(entry.action, Action::AutoConfirm);
	}

	#[test]
	fn serde_names_match_the_ui_contract() {
		let entry = CategoryScore::new(Category::Shopping, 88, 95, 60);
		let json = serde_json::to_value(entry).expect("serialize failed");

		assert_eq!(json["category"], "shopping");
		assert_eq!(json["tier"], "high");
		assert_eq!(json["action"], "show-button");
	}
}
