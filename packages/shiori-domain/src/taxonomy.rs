use serde::{Deserialize, Serialize};

/// A note category. The set is closed; adding a variant is a deployment-wide
/// schema change, not a runtime concern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
	Japanese,
	Recipe,
	Video,
	Code,
	Shopping,
	Idea,
}

impl Category {
	/// Display and tie-break order. Every surface iterates categories through
	/// this table so output order never depends on map iteration.
	pub const ALL: [Self; 6] =
		[Self::Japanese, Self::Recipe, Self::Video, Self::Code, Self::Shopping, Self::Idea];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Japanese => "japanese",
			Self::Recipe => "recipe",
			Self::Video => "video",
			Self::Code => "code",
			Self::Shopping => "shopping",
			Self::Idea => "idea",
		}
	}

	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|category| category.as_str() == name)
	}

	/// Position in [`Self::ALL`]. Variant declaration order matches the table.
	pub fn rank(self) -> usize {
		self as usize
	}
}

impl std::fmt::Display for Category {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
