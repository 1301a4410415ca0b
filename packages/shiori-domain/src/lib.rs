pub mod pattern;
pub mod score;
pub mod taxonomy;
