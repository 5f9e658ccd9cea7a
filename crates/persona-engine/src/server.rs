use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::info;

use crate::progress::ProgressStore;
use persona_common::classifier::{classify, delta_for_course, delta_for_title, Course};
use persona_common::mcp_api::{
    ClassifyTitleResponse, CourseDeltaParams, CourseDeltaResponse, NormalizeScoresResponse,
    ParseRoadmapParams, ParseRoadmapResponse, PersonaResponse, RecordProgressParams,
    RecordProgressResponse, ResetProgressResponse, ScoresParams, TitleDeltaResponse, TitleParams,
    UserParams,
};
use persona_common::roadmap::{parse_roadmap_document, RoadmapOptions, RoadmapVariant};
use persona_common::scoring::{normalize_json, persona_summary, top_category_json, TopCategory};

#[derive(Clone)]
pub struct PersonaEngineServer {
    progress: Arc<ProgressStore>,
    default_variant: RoadmapVariant,
    tool_router: ToolRouter<PersonaEngineServer>,
}

impl PersonaEngineServer {
    pub fn new(progress: Arc<ProgressStore>, default_variant: RoadmapVariant) -> Self {
        Self {
            progress,
            default_variant,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl PersonaEngineServer {
    #[tool(description = "Classify a lesson or course title into a learner persona category.")]
    async fn classify_title(
        &self,
        Parameters(params): Parameters<TitleParams>,
    ) -> Result<Json<ClassifyTitleResponse>, String> {
        let category = classify(&params.title);
        Ok(Json(ClassifyTitleResponse {
            category,
            label: category.label().to_string(),
        }))
    }

    #[tool(description = "Score delta earned by completing a lesson, from its title. Project and capstone titles weigh 1.25x.")]
    async fn title_delta(
        &self,
        Parameters(params): Parameters<TitleParams>,
    ) -> Result<Json<TitleDeltaResponse>, String> {
        Ok(Json(TitleDeltaResponse {
            category: classify(&params.title),
            delta: delta_for_title(&params.title),
        }))
    }

    #[tool(description = "Score delta earned by completing a catalog course, from its category (falls back to the title).")]
    async fn course_delta(
        &self,
        Parameters(params): Parameters<CourseDeltaParams>,
    ) -> Result<Json<CourseDeltaResponse>, String> {
        let course = Course {
            title: params.title.unwrap_or_default(),
            category: params.category.unwrap_or_default(),
        };
        Ok(Json(CourseDeltaResponse {
            delta: delta_for_course(&course),
        }))
    }

    #[tool(description = "Convert raw category scores into 0-100 percentages relative to the highest score.")]
    async fn normalize_scores(
        &self,
        Parameters(params): Parameters<ScoresParams>,
    ) -> Result<Json<NormalizeScoresResponse>, String> {
        Ok(Json(NormalizeScoresResponse {
            normalized: normalize_json(&params.scores),
        }))
    }

    #[tool(description = "Rank raw category scores and return the leading category.")]
    async fn top_category(
        &self,
        Parameters(params): Parameters<ScoresParams>,
    ) -> Result<Json<TopCategory>, String> {
        Ok(Json(top_category_json(&params.scores)))
    }

    #[tool(description = "Split an AI-generated career roadmap into summary, monthly phases, recommendations and next actions.")]
    async fn parse_roadmap(
        &self,
        Parameters(params): Parameters<ParseRoadmapParams>,
    ) -> Result<Json<ParseRoadmapResponse>, String> {
        let variant = params.variant.unwrap_or(self.default_variant);
        let document = parse_roadmap_document(&params.text, &RoadmapOptions::for_variant(variant));
        info!(
            variant = variant.as_str(),
            phases = document.phases.len(),
            "roadmap parsed"
        );
        Ok(Json(ParseRoadmapResponse { variant, document }))
    }

    #[tool(description = "Record a completed lesson or course for a user and return their accumulated scores.")]
    async fn record_progress(
        &self,
        Parameters(params): Parameters<RecordProgressParams>,
    ) -> Result<Json<RecordProgressResponse>, String> {
        let course = Course {
            title: params.title.unwrap_or_default(),
            category: params.course_category.unwrap_or_default(),
        };
        let delta = delta_for_course(&course);

        let recorded = self
            .progress
            .record(&params.user_id, &delta)
            .await
            .map_err(|e| format!("record failed: {e}"))?;

        Ok(Json(RecordProgressResponse {
            user_id: params.user_id,
            delta,
            scores: recorded.scores,
            persisted: recorded.persisted,
        }))
    }

    #[tool(description = "Get a user's accumulated scores, percentages and leading persona.")]
    async fn get_persona(
        &self,
        Parameters(params): Parameters<UserParams>,
    ) -> Result<Json<PersonaResponse>, String> {
        let stored = self
            .progress
            .scores(&params.user_id)
            .await
            .map_err(|e| format!("lookup failed: {e}"))?;
        let redis_available = stored.is_some();
        let scores = stored.unwrap_or_default();

        Ok(Json(PersonaResponse {
            user_id: params.user_id,
            redis_available,
            persona: persona_summary(&scores),
            scores,
        }))
    }

    #[tool(description = "Clear all recorded progress for a user.")]
    async fn reset_progress(
        &self,
        Parameters(params): Parameters<UserParams>,
    ) -> Result<Json<ResetProgressResponse>, String> {
        self.progress
            .reset(&params.user_id)
            .await
            .map_err(|e| format!("reset failed: {e}"))?;
        Ok(Json(ResetProgressResponse {
            user_id: params.user_id,
            cleared: true,
        }))
    }
}

#[tool_handler]
impl ServerHandler for PersonaEngineServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "persona-engine".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Learner persona engine. Use classify_title, title_delta and course_delta to \
                 score completed content, record_progress and get_persona to accumulate and read \
                 a user's persona, normalize_scores and top_category for ad-hoc score maps, and \
                 parse_roadmap to split AI-generated career roadmaps into sections."
                    .to_string(),
            ),
        }
    }
}
