use persona_common::roadmap::RoadmapVariant;

use crate::error::AppError;

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Redis connection URL (e.g. "redis://127.0.0.1:6379"). `None` disables the progress store.
    pub redis_url: Option<String>,
    /// Parser variant used by `parse_roadmap` when the caller does not pick one.
    pub roadmap_variant: RoadmapVariant,
    /// Expiry applied to a user's progress hash after each update. `None` keeps it forever.
    pub progress_ttl_secs: Option<u64>,
    /// Serve MCP over TCP on this address instead of stdio.
    pub tcp_listen_addr: Option<String>,
}

impl Config {
    /// All optional:
    /// - `REDIS_URL`: Redis connection string
    /// - `PERSONA_ROADMAP_VARIANT`: `job_roadmap` (default) or `unified`
    /// - `PERSONA_PROGRESS_TTL_SECS`: progress expiry in seconds, `0` or unset for none
    /// - `MCP_TCP_LISTEN_ADDR`: e.g. "127.0.0.1:8090"
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let roadmap_variant = match non_empty("PERSONA_ROADMAP_VARIANT") {
            Some(raw) => raw
                .parse::<RoadmapVariant>()
                .map_err(|e| AppError::Config(format!("PERSONA_ROADMAP_VARIANT: {e}")))?,
            None => RoadmapVariant::default(),
        };

        let progress_ttl_secs = match non_empty("PERSONA_PROGRESS_TTL_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| {
                    AppError::Config(format!("PERSONA_PROGRESS_TTL_SECS: {e}"))
                })?;
                (secs > 0).then_some(secs)
            }
            None => None,
        };

        Ok(Self {
            redis_url: non_empty("REDIS_URL"),
            roadmap_variant,
            progress_ttl_secs,
            tcp_listen_addr: non_empty("MCP_TCP_LISTEN_ADDR"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.redis_url, None);
        assert_eq!(config.roadmap_variant, RoadmapVariant::JobRoadmap);
        assert_eq!(config.progress_ttl_secs, None);
        assert_eq!(config.tcp_listen_addr, None);
    }

    #[test]
    fn reads_all_variables() {
        let config = load(&[
            ("REDIS_URL", "redis://127.0.0.1:6379"),
            ("PERSONA_ROADMAP_VARIANT", "unified"),
            ("PERSONA_PROGRESS_TTL_SECS", "86400"),
            ("MCP_TCP_LISTEN_ADDR", "127.0.0.1:8090"),
        ])
        .unwrap();
        assert_eq!(config.redis_url.as_deref(), Some("redis://127.0.0.1:6379"));
        assert_eq!(config.roadmap_variant, RoadmapVariant::Unified);
        assert_eq!(config.progress_ttl_secs, Some(86_400));
        assert_eq!(config.tcp_listen_addr.as_deref(), Some("127.0.0.1:8090"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load(&[("REDIS_URL", "  "), ("PERSONA_ROADMAP_VARIANT", "")]).unwrap();
        assert_eq!(config.redis_url, None);
        assert_eq!(config.roadmap_variant, RoadmapVariant::JobRoadmap);
    }

    #[test]
    fn zero_ttl_disables_expiry() {
        let config = load(&[("PERSONA_PROGRESS_TTL_SECS", "0")]).unwrap();
        assert_eq!(config.progress_ttl_secs, None);
    }

    #[test]
    fn rejects_unknown_variant() {
        let err = load(&[("PERSONA_ROADMAP_VARIANT", "weekly")]).unwrap_err();
        assert!(
            matches!(err, AppError::Config(ref msg) if msg.starts_with("PERSONA_ROADMAP_VARIANT")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn rejects_non_numeric_ttl() {
        let err = load(&[("PERSONA_PROGRESS_TTL_SECS", "a day")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)), "unexpected error: {err:?}");
    }
}
