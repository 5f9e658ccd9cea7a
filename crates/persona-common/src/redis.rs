/// Redis wrapper with graceful degradation.
///
/// All operations return `Option<T>` or `bool`. On any Redis error the
/// operation logs a warning and reports failure; callers carry on without
/// persistence. The engine is fully functional without Redis.
use std::collections::HashMap;

use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::warn;

use crate::error::CommonError;

pub struct RedisCache {
    client: Option<redis::Client>,
}

impl RedisCache {
    /// Attempt to create a client. If the URL is `None` or invalid, returns a
    /// `RedisCache` whose operations are all no-ops.
    pub fn new(url: Option<&str>) -> Self {
        let client = url.and_then(|u| {
            redis::Client::open(u)
                .inspect_err(|e| warn!(error = %e, url = u, "failed to create redis client, persistence disabled"))
                .ok()
        });
        Self { client }
    }

    /// A wrapper that never touches the network.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CommonError> {
        let client = self.client.as_ref().ok_or(CommonError::RedisUnavailable)?;
        Ok(client.get_multiplexed_async_connection().await?)
    }

    /// Send a PING. Returns `true` if Redis is reachable.
    pub async fn is_available(&self) -> bool {
        let Ok(mut conn) = self.connection().await else {
            return false;
        };
        let result: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        result.is_ok()
    }

    /// Apply every `HINCRBYFLOAT` increment, refresh the TTL and read the hash
    /// back in one `MULTI`/`EXEC` transaction. Either all increments land and
    /// the updated fields are returned, or nothing is written and `None` comes back.
    pub async fn hincr_all_by_float(
        &self,
        key: &str,
        increments: &[(&str, f64)],
        ttl_secs: Option<u64>,
    ) -> Option<HashMap<String, String>> {
        let mut conn = self
            .connection()
            .await
            .inspect_err(|e| warn!(error = %e, "redis connection failed"))
            .ok()?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for &(field, delta) in increments {
            pipe.cmd("HINCRBYFLOAT").arg(key).arg(field).arg(delta).ignore();
        }
        if let Some(ttl) = ttl_secs {
            pipe.expire(key, i64::try_from(ttl).unwrap_or(i64::MAX)).ignore();
        }
        pipe.hgetall(key);

        let (fields,): (HashMap<String, String>,) = pipe
            .query_async(&mut conn)
            .await
            .inspect_err(|e| {
                warn!(
                    error = %e,
                    key,
                    fields = increments.len(),
                    ttl_secs,
                    "redis increment transaction failed"
                )
            })
            .ok()?;
        Some(fields)
    }

    /// `HGETALL key`. A missing key yields an empty map.
    pub async fn hgetall(&self, key: &str) -> Option<HashMap<String, String>> {
        let mut conn = self
            .connection()
            .await
            .inspect_err(|e| warn!(error = %e, "redis connection failed"))
            .ok()?;
        conn.hgetall(key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis HGETALL failed"))
            .ok()
    }

    /// Delete a specific key. Returns `true` if successful.
    pub async fn delete(&self, key: &str) -> bool {
        let Ok(mut conn) = self
            .connection()
            .await
            .inspect_err(|e| warn!(error = %e, "redis connection failed"))
        else {
            return false;
        };
        conn.del::<_, ()>(key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis DEL failed"))
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_cache_degrades() {
        let cache = RedisCache::disabled();
        assert!(!cache.is_available().await);
        assert!(cache
            .hincr_all_by_float("k", &[("cloud", 4.0), ("devops", 3.0)], Some(60))
            .await
            .is_none());
        assert!(cache.hgetall("k").await.is_none());
        assert!(!cache.delete("k").await);
    }

    #[test]
    fn invalid_url_disables_client() {
        let cache = RedisCache::new(Some("not a redis url"));
        assert!(cache.client.is_none());
    }
}
