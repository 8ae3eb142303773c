use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;

/// key: member-directory -> active roster seam
///
/// The member registry itself is owned elsewhere; the dues core only ever
/// asks it who is currently active.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn list_active_members(&self) -> AppResult<Vec<Uuid>>;
}

/// Directory adapter over the externally owned `members` table.
#[derive(Clone)]
pub struct PgMemberDirectory {
    pool: PgPool,
}

impl PgMemberDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberDirectory for PgMemberDirectory {
    async fn list_active_members(&self) -> AppResult<Vec<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM members WHERE active = TRUE ORDER BY joined_at")
                .fetch_all(&self.pool)
                .await?;
        Ok(ids)
    }
}
