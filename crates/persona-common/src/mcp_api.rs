use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::category::{Category, NormalizedScoreMap, ScoreMap};
use crate::roadmap::{ParsedDocument, RoadmapVariant};
use crate::scoring::PersonaSummary;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TitleParams {
    /// Lesson or course title, e.g. "Introduction to Networking (CCNA)".
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CourseDeltaParams {
    /// Course title, used when the catalog category matches no group.
    #[serde(default)]
    pub title: Option<String>,
    /// Free-text catalog category such as "Cloud & DevOps".
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ScoresParams {
    /// Object of category key to raw score, e.g. {"security": 30, "cloud": 12}.
    pub scores: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ParseRoadmapParams {
    /// Roadmap text as returned by the model.
    pub text: String,
    /// Parser variant: "job_roadmap" or "unified" (default: server setting).
    #[serde(default)]
    pub variant: Option<RoadmapVariant>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecordProgressParams {
    /// Stable user identifier.
    pub user_id: String,
    /// Completed lesson or course title.
    #[serde(default)]
    pub title: Option<String>,
    /// Catalog category of the completed course, if known.
    #[serde(default)]
    pub course_category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UserParams {
    /// Stable user identifier.
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClassifyTitleResponse {
    pub category: Category,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TitleDeltaResponse {
    pub category: Category,
    pub delta: ScoreMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CourseDeltaResponse {
    pub delta: ScoreMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NormalizeScoresResponse {
    pub normalized: NormalizedScoreMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ParseRoadmapResponse {
    pub variant: RoadmapVariant,
    pub document: ParsedDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecordProgressResponse {
    pub user_id: String,
    pub delta: ScoreMap,
    /// Accumulated scores after this event; only the delta when not persisted.
    pub scores: ScoreMap,
    pub persisted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PersonaResponse {
    pub user_id: String,
    pub redis_available: bool,
    pub scores: ScoreMap,
    pub persona: PersonaSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResetProgressResponse {
    pub user_id: String,
    pub cleared: bool,
}
