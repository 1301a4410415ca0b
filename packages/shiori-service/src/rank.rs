use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::ShioriService;

pub(crate) const SEMANTIC_WEIGHT: f32 = 0.7;
pub(crate) const LEXICAL_WEIGHT: f32 = 0.3;

/// One row from the store's candidate query. Similarities are precomputed by
/// the store (cosine for semantic, trigram or substring for lexical), both
/// normalized to [0, 1]; a missing component means that signal did not match.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ScoredRow {
	pub id: Uuid,
	pub semantic: Option<f32>,
	pub lexical: Option<f32>,
}

/// Which similarity components were present on the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum MatchKind {
	#[serde(rename = "semantic")]
	Semantic,
	#[serde(rename = "lexical")]
	Lexical,
	#[serde(rename = "semantic+lexical")]
	SemanticLexical,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedItem {
	pub id: Uuid,
	pub semantic_score: Option<f32>,
	pub lexical_score: Option<f32>,
	pub combined_score: f32,
	pub match_kind: MatchKind,
}

impl ShioriService {
	/// Pure post-processing fusion over store-scored rows; threshold-based
	/// row selection and total-count bookkeeping stay with the store.
	pub fn rank_hybrid(&self, rows: Vec<ScoredRow>) -> Vec<RankedItem> {
		rank_hybrid(rows)
	}
}

/// Fuses each row's components into `0.7 * semantic + 0.3 * lexical` (absent
/// components count as zero) and sorts by the combined score descending, id
/// breaking ties so the order is total and reproducible.
pub fn rank_hybrid(rows: Vec<ScoredRow>) -> Vec<RankedItem> {
	let mut items = Vec::with_capacity(rows.len());

	for row in rows {
		let match_kind = match (row.semantic, row.lexical) {
			(Some(_), Some(_)) => MatchKind::SemanticLexical,
			(Some(_), None) => MatchKind::Semantic,
			(None, Some(_)) => MatchKind::Lexical,
			(None, None) => {
				warn!(id = %row.id, "Ranked row carries no similarity component.");

				continue;
			},
		};
		let semantic_score = row.semantic.map(|value| value.clamp(0.0, 1.0));
		let lexical_score = row.lexical.map(|value| value.clamp(0.0, 1.0));
		let combined_score = (SEMANTIC_WEIGHT * semantic_score.unwrap_or(0.0)
			+ LEXICAL_WEIGHT * lexical_score.unwrap_or(0.0))
		.clamp(0.0, 1.0);

		items.push(RankedItem { id: row.id, semantic_score, lexical_score, combined_score, match_kind });
	}

	items.sort_by(|a, b| {
		cmp_f32_desc(a.combined_score, b.combined_score).then_with(|| a.id.cmp(&b.id))
	});

	items
}

fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
