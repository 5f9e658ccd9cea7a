/// Score normalization and ranking over caller-owned [`ScoreMap`]s.
///
/// Inputs frequently come straight out of a user-progress store, so every
/// public function treats malformed values as "no data": it logs a warning and
/// returns the empty result instead of propagating an error.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::category::{Category, NormalizedScoreMap, ScoreMap};
use crate::error::EngineError;

/// Highest raw score plus the full descending ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TopCategory {
    pub category: Option<Category>,
    pub score: f64,
    pub ranked: Vec<(Category, f64)>,
}

impl TopCategory {
    fn empty() -> Self {
        Self {
            category: None,
            score: 0.0,
            ranked: Vec::new(),
        }
    }
}

/// Display-ready view of an accumulated score map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PersonaSummary {
    /// Leading category, `None` when nothing has been recorded yet.
    pub category: Option<Category>,
    pub label: String,
    pub score: f64,
    pub normalized: NormalizedScoreMap,
    pub ranked: Vec<(Category, f64)>,
}

/// Rescale so the largest value becomes 100. Divides by at least 1.
///
/// Returns an empty map for empty input or when any value is negative or
/// not finite.
pub fn normalize(scores: &ScoreMap) -> NormalizedScoreMap {
    try_normalize(scores).unwrap_or_else(|e| {
        warn!(error = %e, "discarding malformed score map");
        NormalizedScoreMap::new()
    })
}

fn try_normalize(scores: &ScoreMap) -> Result<NormalizedScoreMap, EngineError> {
    validate(scores)?;
    let max = scores.values().copied().fold(0.0_f64, f64::max);
    let divisor = max.max(1.0);
    Ok(scores
        .iter()
        .map(|(&category, &value)| {
            let pct = (value / divisor * 100.0).round().clamp(0.0, 100.0);
            // pct is an integer in 0..=100
            (category, pct as u8)
        })
        .collect())
}

/// [`normalize`] for an untrusted JSON object of `category -> number`.
pub fn normalize_json(scores: &Value) -> NormalizedScoreMap {
    match scores_from_json(scores) {
        Ok(scores) => normalize(&scores),
        Err(e) => {
            warn!(error = %e, "discarding malformed score map");
            NormalizedScoreMap::new()
        }
    }
}

/// Rank categories by raw score, highest first.
///
/// The sort is stable over taxonomy order, so equal scores keep the order in
/// which [`Category`] declares them.
pub fn top_category(scores: &ScoreMap) -> TopCategory {
    if let Err(e) = validate(scores) {
        warn!(error = %e, "discarding malformed score map");
        return TopCategory::empty();
    }

    let mut ranked: Vec<(Category, f64)> = scores.iter().map(|(&c, &v)| (c, v)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    match ranked.first() {
        Some(&(category, score)) => TopCategory {
            category: Some(category),
            score,
            ranked,
        },
        None => TopCategory::empty(),
    }
}

/// [`top_category`] for an untrusted JSON object.
pub fn top_category_json(scores: &Value) -> TopCategory {
    match scores_from_json(scores) {
        Ok(scores) => top_category(&scores),
        Err(e) => {
            warn!(error = %e, "discarding malformed score map");
            TopCategory::empty()
        }
    }
}

/// Combine ranking and normalization for display.
pub fn persona_summary(scores: &ScoreMap) -> PersonaSummary {
    let top = top_category(scores);
    let label = top.category.unwrap_or(Category::Beginner).label().to_string();
    PersonaSummary {
        category: top.category,
        label,
        score: top.score,
        normalized: normalize(scores),
        ranked: top.ranked,
    }
}

/// Parse a JSON object of category keys to numbers.
///
/// `null` reads as an empty map. Unknown keys and non-numeric values are errors.
pub fn scores_from_json(value: &Value) -> Result<ScoreMap, EngineError> {
    let object = match value {
        Value::Object(object) => object,
        Value::Null => return Ok(ScoreMap::new()),
        Value::Bool(_) => return Err(EngineError::NotAnObject("a boolean")),
        Value::Number(_) => return Err(EngineError::NotAnObject("a number")),
        Value::String(_) => return Err(EngineError::NotAnObject("a string")),
        Value::Array(_) => return Err(EngineError::NotAnObject("an array")),
    };

    let mut scores = ScoreMap::new();
    for (key, raw) in object {
        let category: Category = key.parse()?;
        let value = raw.as_f64().ok_or_else(|| EngineError::MalformedScore {
            key: key.clone(),
            reason: format!("expected a number, got {raw}"),
        })?;
        scores.insert(category, value);
    }
    validate(&scores)?;
    Ok(scores)
}

fn validate(scores: &ScoreMap) -> Result<(), EngineError> {
    for (category, &value) in scores {
        if !value.is_finite() {
            return Err(EngineError::MalformedScore {
                key: category.to_string(),
                reason: format!("{value} is not finite"),
            });
        }
        if value < 0.0 {
            return Err(EngineError::MalformedScore {
                key: category.to_string(),
                reason: format!("{value} is negative"),
            });
        }
    }
    Ok(())
}
