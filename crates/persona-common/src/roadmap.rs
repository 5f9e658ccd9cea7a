/// Section parser for LLM-generated career roadmaps.
///
/// The input loosely follows markdown: `#` headings name sections by their
/// leading keyword, standalone `Month <n>` or `Week <n>` labels open
/// time-boxed phases, and `-`/`*` lines are bullets. Parsing never fails; unrecognised structure just
/// yields emptier output.
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EngineError;

/// A titled, time-boxed group of action items, e.g. "Month 1".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Phase {
    pub title: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParsedDocument {
    /// Outcome section joined into one line; every source line is followed by a space.
    pub summary: String,
    pub phases: Vec<Phase>,
    pub recommendations: Vec<String>,
    pub actions: Vec<String>,
}

/// Which roadmap surface produced the text. Each keeps its own tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoadmapVariant {
    /// Job roadmap: strict heading keywords, phases only under a Month heading.
    #[default]
    JobRoadmap,
    /// Unified roadmap: wider keywords, bare `Month <n>` lines accepted anywhere
    /// when the document has no phases heading.
    Unified,
}

impl RoadmapVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JobRoadmap => "job_roadmap",
            Self::Unified => "unified",
        }
    }
}

impl FromStr for RoadmapVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "job_roadmap" | "job" => Ok(Self::JobRoadmap),
            "unified" => Ok(Self::Unified),
            other => Err(format!(
                "unknown roadmap variant: '{other}' (expected job_roadmap or unified)"
            )),
        }
    }
}

/// Leading heading keywords per section, lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionKeywords {
    pub summary: Vec<&'static str>,
    pub phases: Vec<&'static str>,
    pub recommendations: Vec<&'static str>,
    pub actions: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadmapOptions {
    pub keywords: SectionKeywords,
    /// Without any phases heading, collect `Month <n>` lines from the whole document.
    pub allow_headingless_month_fallback: bool,
}

impl RoadmapOptions {
    pub fn job_roadmap() -> Self {
        Self {
            keywords: SectionKeywords {
                summary: vec!["outcome"],
                phases: vec!["month"],
                recommendations: vec!["recommended"],
                actions: vec!["next"],
            },
            allow_headingless_month_fallback: false,
        }
    }

    pub fn unified() -> Self {
        Self {
            keywords: SectionKeywords {
                summary: vec!["outcome", "summary", "overview"],
                phases: vec!["month", "roadmap", "timeline"],
                recommendations: vec!["recommended", "projects", "resources"],
                actions: vec!["next", "action"],
            },
            allow_headingless_month_fallback: true,
        }
    }

    pub fn for_variant(variant: RoadmapVariant) -> Self {
        match variant {
            RoadmapVariant::JobRoadmap => Self::job_roadmap(),
            RoadmapVariant::Unified => Self::unified(),
        }
    }

    fn section_for(&self, heading: &str) -> Option<Section> {
        let lowered = heading.to_lowercase();
        let starts = |words: &[&str]| words.iter().any(|w| lowered.starts_with(w));
        let kw = &self.keywords;
        if starts(&kw.summary) {
            Some(Section::Summary)
        } else if starts(&kw.phases) {
            Some(Section::Phases)
        } else if starts(&kw.recommendations) {
            Some(Section::Recommendations)
        } else if starts(&kw.actions) {
            Some(Section::Actions)
        } else {
            None
        }
    }
}

impl Default for RoadmapOptions {
    fn default() -> Self {
        Self::job_roadmap()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    Phases,
    Recommendations,
    Actions,
}

struct Patterns {
    heading: Regex,
    month: Regex,
}

static PATTERNS: LazyLock<Result<Patterns, EngineError>> = LazyLock::new(|| {
    let compile = |pattern: &str| {
        Regex::new(pattern).map_err(|source| EngineError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
    };
    Ok(Patterns {
        heading: compile(r"^#+\s*(.*?)\s*$")?,
        month: compile(r"(?i)^(?:month|week)\s*\d+\s*(?:[:\-–—(].*)?$")?,
    })
});

/// Split a roadmap into summary, phases, recommendations and next actions.
pub fn parse_roadmap_document(text: &str, options: &RoadmapOptions) -> ParsedDocument {
    let patterns = match &*PATTERNS {
        Ok(patterns) => patterns,
        Err(e) => {
            warn!(error = %e, "roadmap patterns unavailable, returning empty document");
            return ParsedDocument::default();
        }
    };

    let mut doc = ParsedDocument::default();
    let mut current: Option<Section> = None;
    let mut open_phase: Option<Phase> = None;
    let mut saw_phases_heading = false;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || is_rule(line) {
            continue;
        }

        if let Some(heading) = heading_text(patterns, line) {
            flush(&mut open_phase, &mut doc.phases);
            // "### Month 1" or "### Week 1" both selects the section and opens the phase
            let label = month_title(patterns, heading);
            current = match label {
                Some(_) => Some(Section::Phases),
                None => options.section_for(heading),
            };
            if current == Some(Section::Phases) {
                saw_phases_heading = true;
                open_phase = label.map(Phase::titled);
            }
            continue;
        }

        match current {
            Some(Section::Summary) => {
                doc.summary.push_str(line);
                doc.summary.push(' ');
            }
            Some(Section::Phases) => {
                if let Some(title) = month_title(patterns, line) {
                    flush(&mut open_phase, &mut doc.phases);
                    open_phase = Some(Phase::titled(title));
                } else if let Some(phase) = open_phase.as_mut() {
                    let item = strip_bullet(line).unwrap_or(line);
                    if !item.is_empty() {
                        phase.bullets.push(item.to_string());
                    }
                }
            }
            Some(Section::Recommendations) => push_bullet(&mut doc.recommendations, line),
            Some(Section::Actions) => push_bullet(&mut doc.actions, line),
            None => {}
        }
    }
    flush(&mut open_phase, &mut doc.phases);

    if !saw_phases_heading && options.allow_headingless_month_fallback {
        doc.phases = headingless_month_phases(patterns, text);
        debug!(phases = doc.phases.len(), "used headingless month fallback");
    }

    doc
}

/// Collect `Month <n>` blocks from anywhere in the document. Only bullets are
/// kept, since surrounding prose belongs to other sections; a heading closes
/// the open phase.
fn headingless_month_phases(patterns: &Patterns, text: &str) -> Vec<Phase> {
    let mut phases = Vec::new();
    let mut open_phase: Option<Phase> = None;

    for line in text.lines().map(str::trim) {
        if line.is_empty() || is_rule(line) {
            continue;
        }
        let candidate = match heading_text(patterns, line) {
            Some(heading) => {
                flush(&mut open_phase, &mut phases);
                heading
            }
            None => line,
        };
        if let Some(title) = month_title(patterns, candidate) {
            flush(&mut open_phase, &mut phases);
            open_phase = Some(Phase::titled(title));
        } else if let Some(phase) = open_phase.as_mut() {
            push_bullet(&mut phase.bullets, line);
        }
    }
    flush(&mut open_phase, &mut phases);
    phases
}

impl Phase {
    fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            bullets: Vec::new(),
        }
    }
}

fn flush(open_phase: &mut Option<Phase>, phases: &mut Vec<Phase>) {
    if let Some(phase) = open_phase.take() {
        phases.push(phase);
    }
}

/// Heading text with `#` markers and leading decoration (emoji, numbering, bold) removed.
fn heading_text<'a>(patterns: &Patterns, line: &'a str) -> Option<&'a str> {
    let caps = patterns.heading.captures(line)?;
    let text = caps.get(1)?.as_str();
    Some(text.trim_start_matches(|c: char| !c.is_alphabetic()))
}

/// Phase title when `line` opens a phase, e.g. "**Month 2:**" gives "Month 2".
fn month_title<'a>(patterns: &Patterns, line: &'a str) -> Option<&'a str> {
    let unbolded = line.trim_matches('*').trim();
    if !patterns.month.is_match(unbolded) {
        return None;
    }
    Some(unbolded.trim_end_matches(|c: char| c == ':' || c == '*').trim_end())
}

/// Text after a leading `-` or `*` bullet marker. Bold text (`**`) is not a bullet.
fn strip_bullet(line: &str) -> Option<&str> {
    if line.starts_with("**") {
        return None;
    }
    line.strip_prefix(|c: char| c == '-' || c == '*').map(str::trim)
}

fn push_bullet(items: &mut Vec<String>, line: &str) {
    if let Some(item) = strip_bullet(line).filter(|item| !item.is_empty()) {
        items.push(item.to_string());
    }
}

/// Horizontal rules such as `---` or `***`.
fn is_rule(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| matches!(c, '-' | '*' | '_'))
}
