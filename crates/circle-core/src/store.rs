//! Bounded store calls

use std::future::Future;
use std::time::Duration;

use circle_db::DbResult;

use crate::AuthError;

/// Run a store call under `limit`.
///
/// An elapsed timer maps to `TransientUnavailable`, as do transient
/// database errors. `op` names the call in logs.
pub async fn bounded<T, F>(limit: Duration, op: &'static str, fut: F) -> Result<T, AuthError>
where
    F: Future<Output = DbResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(AuthError::from),
        Err(_) => {
            tracing::warn!(op, timeout_ms = limit.as_millis() as u64, "Store call timed out");
            Err(AuthError::TransientUnavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circle_db::DbError;

    #[tokio::test]
    async fn test_passes_through_value() {
        let value = bounded(Duration::from_secs(1), "ok", async { Ok::<_, DbError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_elapsed_is_transient() {
        let result: Result<(), _> = bounded(Duration::from_millis(10), "slow", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(AuthError::TransientUnavailable)));
    }

    #[tokio::test]
    async fn test_maps_db_errors() {
        let result: Result<(), _> =
            bounded(Duration::from_secs(1), "missing", async { Err(DbError::NotFound) }).await;
        assert!(matches!(result, Err(AuthError::NotFound)));
    }
}
