use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Learner persona bucket. The set is closed; adding a bucket is a code change.
///
/// Declaration order doubles as the iteration order of [`ScoreMap`] and the
/// tie-break order when ranking equal scores.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Security,
    Developer,
    Cloud,
    Data,
    Devops,
    Networking,
    Beginner,
}

/// Raw per-category accumulator. Values are non-negative.
pub type ScoreMap = BTreeMap<Category, f64>;

/// Per-category integer percentages in `0..=100`.
pub type NormalizedScoreMap = BTreeMap<Category, u8>;

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Security,
        Category::Developer,
        Category::Cloud,
        Category::Data,
        Category::Devops,
        Category::Networking,
        Category::Beginner,
    ];

    /// Stable lowercase key, e.g. "devops".
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::Developer => "developer",
            Self::Cloud => "cloud",
            Self::Data => "data",
            Self::Devops => "devops",
            Self::Networking => "networking",
            Self::Beginner => "beginner",
        }
    }

    /// Human-readable persona label shown next to the score bars.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Security => "Cybersecurity Specialist",
            Self::Developer => "Software Developer",
            Self::Cloud => "Cloud Engineer",
            Self::Data => "Data & AI Analyst",
            Self::Devops => "DevOps Engineer",
            Self::Networking => "Network Engineer",
            Self::Beginner => "Tech Explorer",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .ok_or_else(|| EngineError::UnknownCategory(s.to_string()))
    }
}

/// Add `delta` into `scores` in place.
///
/// The accumulator belongs to the caller; the engine never holds on to it.
pub fn accumulate(scores: &mut ScoreMap, delta: &ScoreMap) {
    for (&category, &weight) in delta {
        *scores.entry(category).or_insert(0.0) += weight;
    }
}
