/// Keyword classification of course and lesson titles into persona buckets.
///
/// Rules are ordered `(pattern, Category)` pairs evaluated top to bottom; the
/// first pattern that matches anywhere in the lower-cased input wins. Patterns
/// are compiled once. If compilation ever fails, every entry point logs the
/// error and falls back to the beginner path instead of panicking.
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::category::{Category, ScoreMap};
use crate::error::EngineError;

/// Title rules in priority order. `Beginner` is the fallback and has no rule.
const TITLE_RULES: &[(&str, Category)] = &[
    (
        r"cyber|security|\bhack|pen ?test|penetration|\bsoc\b|\bsiem\b|malware|forensic|firewall|threat|vulnerab|exploit|\bctf\b|\bkali\b|owasp|incident response|cissp",
        Category::Security,
    ),
    (
        r"devops|docker|kubernetes|\bk8s\b|terraform|ansible|ci ?/ ?cd|jenkins|\bhelm\b|gitops|container",
        Category::Devops,
    ),
    (
        r"cloud|\baws\b|azure|\bgcp\b|serverless|\blambda\b|\bec2\b|\bs3\b",
        Category::Cloud,
    ),
    (
        r"\bdata\b|machine learning|deep learning|\bml\b|\bai\b|artificial intelligence|analytics|\bsql\b|pandas|power ?bi|tableau|\bllms?\b",
        Category::Data,
    ),
    (
        r"network|ccna|ccnp|routing|switching|tcp/ip|subnet|vlan|wireshark|cisco",
        Category::Networking,
    ),
    (
        r"develop|programming|coding|\bcode\b|python|javascript|typescript|\bjava\b|golang|\bgo (?:lang|programming)\b|\brust\b|c\+\+|\breact\b|node\.?js|\bweb\b|full ?-?stack|frontend|backend|\bapi\b|\bgit\b",
        Category::Developer,
    ),
];

/// Signals a larger unit of work; scales every title weight by [`PROJECT_MULTIPLIER`].
const PROJECT_PATTERN: &str = r"(?i)project|capstone|mini project";
const PROJECT_MULTIPLIER: f64 = 1.25;

const INFRA_COURSE: &str =
    r"cloud|devops|\baws\b|azure|\bgcp\b|infrastructure|kubernetes|docker|\bsre\b";
const PROGRAMMING_COURSE: &str =
    r"programming|\bweb\b|full ?-?stack|software|develop|coding|frontend|backend|mobile";
const DATA_COURSE: &str =
    r"\bdata\b|data science|\bml\b|machine learning|\bai\b|artificial intelligence|analytics";
const SECURITY_COURSE: &str = r"security|cyber|network|hacking|forensic";

struct Rule {
    pattern: Regex,
    category: Category,
}

struct CourseRule {
    pattern: Regex,
    delta: &'static [(Category, f64)],
}

static TITLE_CLASSIFIER: LazyLock<Result<Vec<Rule>, EngineError>> = LazyLock::new(|| {
    TITLE_RULES
        .iter()
        .map(|&(pattern, category)| -> Result<Rule, EngineError> {
            Ok(Rule {
                pattern: compile(pattern)?,
                category,
            })
        })
        .collect()
});

static COURSE_CLASSIFIER: LazyLock<Result<Vec<CourseRule>, EngineError>> = LazyLock::new(|| {
    let groups: [(&str, &'static [(Category, f64)]); 4] = [
        (INFRA_COURSE, &[(Category::Cloud, 12.0), (Category::Devops, 8.0)]),
        (PROGRAMMING_COURSE, &[(Category::Developer, 12.0)]),
        (DATA_COURSE, &[(Category::Data, 12.0), (Category::Developer, 4.0)]),
        (
            SECURITY_COURSE,
            &[(Category::Security, 12.0), (Category::Networking, 5.0)],
        ),
    ];
    groups
        .into_iter()
        .map(|(pattern, delta)| -> Result<CourseRule, EngineError> {
            Ok(CourseRule {
                pattern: compile(pattern)?,
                delta,
            })
        })
        .collect()
});

static PROJECT_SIGNAL: LazyLock<Result<Regex, EngineError>> =
    LazyLock::new(|| compile(PROJECT_PATTERN));

fn compile(pattern: &str) -> Result<Regex, EngineError> {
    Regex::new(pattern).map_err(|source| EngineError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// A course record as stored by the catalog. Missing fields deserialize empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
}

/// Classify a lesson or course title. Unmatched input is [`Category::Beginner`].
pub fn classify(title: &str) -> Category {
    try_classify(title).unwrap_or_else(|e| {
        warn!(error = %e, "title rules unavailable, classifying as beginner");
        Category::Beginner
    })
}

/// [`classify`] for optional input; `None` reads as the empty title.
pub fn classify_opt(title: Option<&str>) -> Category {
    classify(title.unwrap_or_default())
}

fn try_classify(title: &str) -> Result<Category, &'static EngineError> {
    let rules = (*TITLE_CLASSIFIER).as_ref()?;
    let lowered = title.to_lowercase();
    Ok(rules
        .iter()
        .find(|rule| rule.pattern.is_match(&lowered))
        .map_or(Category::Beginner, |rule| rule.category))
}

/// Fixed primary/secondary weights for one classification event.
fn base_weights(category: Category) -> &'static [(Category, f64)] {
    match category {
        Category::Security => &[(Category::Security, 10.0), (Category::Developer, 2.0)],
        Category::Devops => &[(Category::Devops, 10.0), (Category::Cloud, 4.0)],
        Category::Cloud => &[(Category::Cloud, 10.0), (Category::Devops, 3.0)],
        Category::Data => &[(Category::Data, 10.0), (Category::Developer, 3.0)],
        Category::Networking => &[(Category::Networking, 10.0), (Category::Security, 3.0)],
        Category::Developer => &[(Category::Developer, 10.0), (Category::Data, 2.0)],
        Category::Beginner => &[(Category::Beginner, 6.0)],
    }
}

/// Whether the title names a project-sized unit of work.
pub fn is_project(title: &str) -> bool {
    match &*PROJECT_SIGNAL {
        Ok(re) => re.is_match(title),
        Err(e) => {
            warn!(error = %e, "project signal unavailable, using base weights");
            false
        }
    }
}

/// Score delta for completing the lesson or course named `title`.
pub fn delta_for_title(title: &str) -> ScoreMap {
    let category = classify(title);
    let multiplier = if is_project(title) {
        PROJECT_MULTIPLIER
    } else {
        1.0
    };
    base_weights(category)
        .iter()
        .map(|&(c, weight)| (c, (weight * multiplier).round()))
        .collect()
}

/// Score delta for a catalog course.
///
/// The free-text catalog category is tried first against broad groups; when
/// none match, the delta comes from the title via [`delta_for_title`].
pub fn delta_for_course(course: &Course) -> ScoreMap {
    match course_group_delta(&course.category) {
        Ok(Some(delta)) => delta,
        Ok(None) => delta_for_title(&course.title),
        Err(e) => {
            warn!(error = %e, "course rules unavailable, falling back to title");
            delta_for_title(&course.title)
        }
    }
}

fn course_group_delta(category: &str) -> Result<Option<ScoreMap>, &'static EngineError> {
    let rules = (*COURSE_CLASSIFIER).as_ref()?;
    let lowered = category.to_lowercase();
    Ok(rules
        .iter()
        .find(|rule| rule.pattern.is_match(&lowered))
        .map(|rule| rule.delta.iter().copied().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_keyword_fixtures() {
        let cases = [
            ("Introduction to Networking (CCNA)", Category::Networking),
            ("AWS Certified Training", Category::Cloud),
            ("DevOps (Docker & Kubernetes)", Category::Devops),
            ("Golang", Category::Developer),
            ("Cybersecurity Essentials for All", Category::Security),
            ("Home Lab Setup", Category::Beginner),
        ];
        for (title, expected) in cases {
            assert_eq!(classify(title), expected, "title: {title}");
        }
    }

    #[test]
    fn empty_and_missing_titles_are_beginner() {
        assert_eq!(classify(""), Category::Beginner);
        assert_eq!(classify_opt(None), Category::Beginner);
        assert_eq!(classify_opt(Some("   ")), Category::Beginner);
    }

    #[test]
    fn earlier_rules_win_on_overlap() {
        assert_eq!(classify("Cloud Security Fundamentals"), Category::Security);
        assert_eq!(classify("Kubernetes on AWS"), Category::Devops);
        assert_eq!(classify("Python for Data Analysis"), Category::Data);
    }

    #[test]
    fn language_names_need_context() {
        assert_eq!(classify("Go Programming Basics"), Category::Developer);
        assert_eq!(classify("Node.js Essentials"), Category::Developer);
        assert_eq!(classify("NodeJS REST services"), Category::Developer);
        assert_eq!(classify("Go Live Checklist"), Category::Beginner);
        assert_eq!(classify("Tree Nodes Explained"), Category::Beginner);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify("WIRESHARK DEEP DIVE"), Category::Networking);
    }

    #[test]
    fn classification_is_deterministic() {
        for title in ["Terraform Basics", "SQL for Analysts", "", "Rust Ownership"] {
            assert_eq!(classify(title), classify(title));
        }
    }

    #[test]
    fn title_delta_uses_weight_table() {
        let delta = delta_for_title("Ethical Hacking 101");
        assert_eq!(
            delta,
            ScoreMap::from([(Category::Security, 10.0), (Category::Developer, 2.0)])
        );

        let delta = delta_for_title("Terraform Basics");
        assert_eq!(
            delta,
            ScoreMap::from([(Category::Devops, 10.0), (Category::Cloud, 4.0)])
        );
    }

    #[test]
    fn project_titles_scale_every_weight() {
        let base = delta_for_title("Build a Cloud Pipeline");
        let scaled = delta_for_title("Capstone Project: Build a Cloud Pipeline");

        assert_eq!(base.keys().collect::<Vec<_>>(), scaled.keys().collect::<Vec<_>>());
        for (category, weight) in &base {
            assert_eq!(scaled[category], (weight * 1.25).round(), "category: {category}");
        }
        assert_eq!(scaled[&Category::Cloud], 13.0);
        assert_eq!(scaled[&Category::Devops], 4.0);
    }

    #[test]
    fn mini_project_counts_as_project() {
        assert!(is_project("Mini Project: Port Scanner"));
        assert!(!is_project("Port Scanning Basics"));
    }

    #[test]
    fn empty_title_delta_is_beginner_path() {
        assert_eq!(delta_for_title(""), ScoreMap::from([(Category::Beginner, 6.0)]));
    }

    #[test]
    fn course_category_groups_take_precedence() {
        let course = Course {
            title: "Ethical Hacking 101".to_string(),
            category: "Cloud & DevOps".to_string(),
        };
        assert_eq!(
            delta_for_course(&course),
            ScoreMap::from([(Category::Cloud, 12.0), (Category::Devops, 8.0)])
        );

        let course = Course {
            title: String::new(),
            category: "Full Stack Web Development".to_string(),
        };
        assert_eq!(
            delta_for_course(&course),
            ScoreMap::from([(Category::Developer, 12.0)])
        );

        let course = Course {
            title: String::new(),
            category: "Data Science & AI".to_string(),
        };
        assert_eq!(
            delta_for_course(&course),
            ScoreMap::from([(Category::Data, 12.0), (Category::Developer, 4.0)])
        );

        let course = Course {
            title: String::new(),
            category: "Networking".to_string(),
        };
        assert_eq!(
            delta_for_course(&course),
            ScoreMap::from([(Category::Security, 12.0), (Category::Networking, 5.0)])
        );
    }

    #[test]
    fn unmatched_course_category_falls_back_to_title() {
        let course = Course {
            title: "Golang Capstone Project".to_string(),
            category: "Bootcamp".to_string(),
        };
        assert_eq!(
            delta_for_course(&course),
            ScoreMap::from([(Category::Developer, 13.0), (Category::Data, 3.0)])
        );
    }

    #[test]
    fn course_with_missing_fields_is_beginner_path() {
        let course: Course = serde_json::from_str("{}").unwrap();
        assert_eq!(
            delta_for_course(&course),
            ScoreMap::from([(Category::Beginner, 6.0)])
        );
    }
}
