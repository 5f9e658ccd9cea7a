/// Per-user score accumulation backed by Redis.
///
/// Key schema:
/// - `persona:v1:progress:{user_id}` — hash of category key to float score
///
/// Persistence is optional. Without Redis, recording still returns the delta
/// and reads return nothing.
use persona_common::category::{Category, ScoreMap};
use persona_common::error::CommonError;
use persona_common::redis::RedisCache;
use tracing::{info, warn};

use crate::error::AppError;

const KEY_PREFIX: &str = "persona:v1:progress:";
const MAX_USER_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub scores: ScoreMap,
    pub persisted: bool,
}

pub struct ProgressStore {
    redis: RedisCache,
    ttl_secs: Option<u64>,
}

impl ProgressStore {
    pub fn new(redis: RedisCache, ttl_secs: Option<u64>) -> Self {
        Self { redis, ttl_secs }
    }

    pub async fn is_available(&self) -> bool {
        self.redis.is_available().await
    }

    /// Add `delta` to the user's stored scores and return the new totals.
    ///
    /// The increments, the TTL refresh and the read-back run as one Redis
    /// transaction, so `persisted: false` means nothing was written.
    pub async fn record(&self, user_id: &str, delta: &ScoreMap) -> Result<Recorded, AppError> {
        validate_user_id(user_id)?;
        let key = progress_key(user_id);

        let Some(fields) = self
            .redis
            .hincr_all_by_float(&key, &increments(delta), self.ttl_secs)
            .await
        else {
            warn!(user_id, "progress not persisted");
            return Ok(Recorded {
                scores: delta.clone(),
                persisted: false,
            });
        };

        let scores = parse_stored_scores(fields);
        info!(user_id, categories = scores.len(), "progress recorded");
        Ok(Recorded {
            scores,
            persisted: true,
        })
    }

    /// Stored scores for the user, `None` when Redis is unavailable.
    pub async fn scores(&self, user_id: &str) -> Result<Option<ScoreMap>, AppError> {
        validate_user_id(user_id)?;
        let fields = self.redis.hgetall(&progress_key(user_id)).await;
        Ok(fields.map(parse_stored_scores))
    }

    /// Forget everything recorded for the user.
    pub async fn reset(&self, user_id: &str) -> Result<(), AppError> {
        validate_user_id(user_id)?;
        if self.redis.delete(&progress_key(user_id)).await {
            info!(user_id, "progress reset");
            Ok(())
        } else {
            Err(CommonError::RedisUnavailable.into())
        }
    }
}

fn progress_key(user_id: &str) -> String {
    format!("{KEY_PREFIX}{user_id}")
}

fn increments(delta: &ScoreMap) -> Vec<(&'static str, f64)> {
    delta
        .iter()
        .map(|(category, &weight)| (category.as_str(), weight))
        .collect()
}

fn validate_user_id(user_id: &str) -> Result<(), AppError> {
    if user_id.is_empty() {
        return Err(AppError::InvalidUserId("user_id must not be empty".to_string()));
    }
    if user_id.len() > MAX_USER_ID_LEN {
        return Err(AppError::InvalidUserId(format!(
            "user_id longer than {MAX_USER_ID_LEN} characters"
        )));
    }
    if let Some(bad) = user_id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(*c, '_' | '.' | ':' | '-')))
    {
        return Err(AppError::InvalidUserId(format!(
            "unexpected character {bad:?} in '{user_id}'"
        )));
    }
    Ok(())
}

/// Stored fields that are not a known category or not a finite non-negative
/// number are skipped.
fn parse_stored_scores<I>(fields: I) -> ScoreMap
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut scores = ScoreMap::new();
    for (field, value) in fields {
        let Ok(category) = field.parse::<Category>() else {
            warn!(field = %field, "skipping unknown progress field");
            continue;
        };
        match value.parse::<f64>() {
            Ok(score) if score.is_finite() && score >= 0.0 => {
                scores.insert(category, score);
            }
            _ => warn!(field = %field, value = %value, "skipping malformed progress value"),
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_store() -> ProgressStore {
        ProgressStore::new(RedisCache::disabled(), None)
    }

    #[test]
    fn key_uses_versioned_prefix() {
        assert_eq!(progress_key("u-42"), "persona:v1:progress:u-42");
    }

    #[test]
    fn user_id_validation() {
        assert!(validate_user_id("firebase:AbC_12.3-x").is_ok());
        assert!(matches!(validate_user_id(""), Err(AppError::InvalidUserId(_))));
        assert!(matches!(validate_user_id("a b"), Err(AppError::InvalidUserId(_))));
        assert!(matches!(
            validate_user_id(&"x".repeat(MAX_USER_ID_LEN + 1)),
            Err(AppError::InvalidUserId(_))
        ));
    }

    #[test]
    fn stored_scores_skip_bad_fields() {
        let fields = vec![
            ("cloud".to_string(), "22.5".to_string()),
            ("devops".to_string(), "8".to_string()),
            ("marketing".to_string(), "3".to_string()),
            ("data".to_string(), "lots".to_string()),
            ("security".to_string(), "-1".to_string()),
        ];
        let scores = parse_stored_scores(fields);
        assert_eq!(
            scores,
            ScoreMap::from([(Category::Cloud, 22.5), (Category::Devops, 8.0)])
        );
    }

    #[tokio::test]
    async fn record_without_redis_returns_delta() {
        let store = offline_store();
        let delta = ScoreMap::from([(Category::Security, 10.0), (Category::Developer, 2.0)]);
        let recorded = store.record("student-1", &delta).await.unwrap();
        assert!(!recorded.persisted);
        assert_eq!(recorded.scores, delta);
    }

    #[test]
    fn increments_cover_every_delta_category() {
        let delta = ScoreMap::from([(Category::Cloud, 12.0), (Category::Devops, 8.0)]);
        assert_eq!(increments(&delta), vec![("cloud", 12.0), ("devops", 8.0)]);
    }

    #[tokio::test]
    async fn record_with_ttl_without_redis_writes_nothing() {
        let store = ProgressStore::new(RedisCache::disabled(), Some(3600));
        let delta = ScoreMap::from([(Category::Data, 10.0), (Category::Developer, 3.0)]);
        let recorded = store.record("student-2", &delta).await.unwrap();
        assert_eq!(
            recorded,
            Recorded {
                scores: delta,
                persisted: false,
            }
        );
        assert_eq!(store.scores("student-2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn record_rejects_invalid_user() {
        let store = offline_store();
        let err = store.record("", &ScoreMap::new()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidUserId(_)));
    }

    #[tokio::test]
    async fn scores_without_redis_are_none() {
        let store = offline_store();
        assert_eq!(store.scores("student-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn reset_without_redis_reports_unavailable() {
        let store = offline_store();
        let err = store.reset("student-1").await.unwrap_err();
        assert!(matches!(err, AppError::Common(CommonError::RedisUnavailable)));
    }
}
