//! PostgreSQL session slot repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::SessionSlotRow;
use crate::repo::SessionRepository;

/// PostgreSQL session slot repository
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a new session repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Option<SessionSlotRow>> {
        let slot = sqlx::query_as::<_, SessionSlotRow>(
            r#"
            SELECT user_id, refresh_token_hash, expires_at, updated_at
            FROM session_slots
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(slot)
    }

    async fn replace(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO session_slots (user_id, refresh_token_hash, expires_at, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET refresh_token_hash = EXCLUDED.refresh_token_hash,
                          expires_at = EXCLUDED.expires_at,
                          updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn compare_and_swap(
        &self,
        user_id: Uuid,
        expected_hash: &str,
        new_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        // The WHERE clause makes check and set one statement: of two racing
        // rotations only one can still see `expected_hash`.
        let result = sqlx::query(
            r#"
            UPDATE session_slots
            SET refresh_token_hash = $3, expires_at = $4, updated_at = NOW()
            WHERE user_id = $1 AND refresh_token_hash = $2
            "#,
        )
        .bind(user_id)
        .bind(expected_hash)
        .bind(new_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        let swapped = result.rows_affected() == 1;
        if !swapped {
            tracing::debug!(%user_id, "Session slot compare-and-swap found a different value");
        }
        Ok(swapped)
    }

    async fn clear(&self, user_id: Uuid) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE session_slots
            SET refresh_token_hash = NULL, expires_at = NULL, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
