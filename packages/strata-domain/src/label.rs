use serde::{Deserialize, Serialize};

use strata_config::Thresholds;

/// Categorical alignment bucket derived from a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignmentLabel {
	Strong,
	Medium,
	Weak,
}
impl AlignmentLabel {
	/// Boundary scores belong to the higher bucket: a score exactly at the
	/// strong threshold is Strong, exactly at the medium threshold is Medium.
	pub fn for_score(score: f64, thresholds: &Thresholds) -> Self {
		if score >= thresholds.strong {
			Self::Strong
		} else if score >= thresholds.medium {
			Self::Medium
		} else {
			Self::Weak
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Strong => "Strong",
			Self::Medium => "Medium",
			Self::Weak => "Weak",
		}
	}
}
impl std::fmt::Display for AlignmentLabel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
