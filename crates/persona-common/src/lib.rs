pub mod category;
pub mod classifier;
pub mod error;
pub mod mcp_api;
pub mod redis;
pub mod roadmap;
pub mod scoring;

pub use category::{accumulate, Category, NormalizedScoreMap, ScoreMap};
pub use classifier::{classify, classify_opt, delta_for_course, delta_for_title, Course};
pub use roadmap::{parse_roadmap_document, ParsedDocument, Phase, RoadmapOptions, RoadmapVariant};
pub use scoring::{normalize, normalize_json, persona_summary, top_category, top_category_json};
