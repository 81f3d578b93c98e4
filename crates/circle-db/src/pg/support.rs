//! PostgreSQL support edge repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::ProfileRow;
use crate::repo::SupportRepository;

/// PostgreSQL support edge repository
#[derive(Clone)]
pub struct PgSupportRepository {
    pool: PgPool,
}

impl PgSupportRepository {
    /// Create a new support repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SupportRepository for PgSupportRepository {
    async fn add(&self, supporter: Uuid, supporting: Uuid) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO supports (supporter, supporting)
            VALUES ($1, $2)
            ON CONFLICT (supporter, supporting) DO NOTHING
            "#,
        )
        .bind(supporter)
        .bind(supporting)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove(&self, supporter: Uuid, supporting: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM supports WHERE supporter = $1 AND supporting = $2")
            .bind(supporter)
            .bind(supporting)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn count_supporters(&self, user_id: Uuid) -> DbResult<u64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM supports WHERE supporting = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.max(0) as u64)
    }

    async fn count_supporting(&self, user_id: Uuid) -> DbResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM supports WHERE supporter = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn exists(&self, supporter: Uuid, supporting: Uuid) -> DbResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM supports WHERE supporter = $1 AND supporting = $2)",
        )
        .bind(supporter)
        .bind(supporting)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn profile_view(
        &self,
        target: Uuid,
        viewer: Option<Uuid>,
    ) -> DbResult<Option<ProfileRow>> {
        // One statement, one snapshot: the counts and the flag cannot be torn.
        let profile = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT u.id, u.username, u.full_name, u.dp, u.cover_pic,
                   (SELECT COUNT(*) FROM supports s WHERE s.supporting = u.id) AS supporters_count,
                   (SELECT COUNT(*) FROM supports s WHERE s.supporter = u.id) AS supporting_count,
                   COALESCE(
                       EXISTS (SELECT 1 FROM supports s
                               WHERE s.supporter = $2 AND s.supporting = u.id),
                       FALSE
                   ) AS is_supporter
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(target)
        .bind(viewer)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }
}
