use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::friends::repo_types::{
    CanonicalPair, Friendship, FriendshipRow, FriendshipStatus, NewFriendship,
};

const FRIENDSHIP_COLUMNS: &str =
    "id, user_id, friend_id, requester_id, status, debt_user_id, created_at, updated_at";

/// Live (not soft-deleted) friendship rows.
#[async_trait]
pub trait FriendshipRepo: Send + Sync {
    async fn find_between(&self, pair: CanonicalPair) -> anyhow::Result<Option<Friendship>>;
    /// Returns `None` when a live row for the pair already exists.
    async fn insert(&self, new: NewFriendship) -> anyhow::Result<Option<Friendship>>;
    /// Pending row `id` of which `member` is one side.
    async fn find_pending_by_id(&self, id: i64, member: i64)
        -> anyhow::Result<Option<Friendship>>;
    async fn set_status(&self, id: i64, status: FriendshipStatus) -> anyhow::Result<Friendship>;
    async fn set_debt(&self, id: i64, debt_user_id: Option<i64>) -> anyhow::Result<Friendship>;
    async fn soft_delete(&self, id: i64) -> anyhow::Result<()>;
    /// Rows with `status` that contain `user_id` on either side, oldest first.
    async fn list_for_member(
        &self,
        user_id: i64,
        status: FriendshipStatus,
    ) -> anyhow::Result<Vec<Friendship>>;
}

#[derive(Clone)]
pub struct PgFriendshipRepo {
    db: PgPool,
}

impl PgFriendshipRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FriendshipRepo for PgFriendshipRepo {
    async fn find_between(&self, pair: CanonicalPair) -> anyhow::Result<Option<Friendship>> {
        let row = sqlx::query_as::<_, FriendshipRow>(&format!(
            r#"
            SELECT {FRIENDSHIP_COLUMNS}
              FROM friendships
             WHERE user_id = $1 AND friend_id = $2 AND deleted_at IS NULL
            "#
        ))
        .bind(pair.low())
        .bind(pair.high())
        .fetch_optional(&self.db)
        .await
        .context("find friendship by pair")?;
        row.map(Friendship::try_from).transpose()
    }

    async fn insert(&self, new: NewFriendship) -> anyhow::Result<Option<Friendship>> {
        // the partial unique index on live pairs turns a concurrent duplicate into no row
        let row = sqlx::query_as::<_, FriendshipRow>(&format!(
            r#"
            INSERT INTO friendships (user_id, friend_id, requester_id, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            RETURNING {FRIENDSHIP_COLUMNS}
            "#
        ))
        .bind(new.pair().low())
        .bind(new.pair().high())
        .bind(new.requester_id())
        .bind(new.status().as_str())
        .fetch_optional(&self.db)
        .await
        .context("insert friendship")?;
        row.map(Friendship::try_from).transpose()
    }

    async fn find_pending_by_id(
        &self,
        id: i64,
        member: i64,
    ) -> anyhow::Result<Option<Friendship>> {
        let row = sqlx::query_as::<_, FriendshipRow>(&format!(
            r#"
            SELECT {FRIENDSHIP_COLUMNS}
              FROM friendships
             WHERE id = $1
               AND (user_id = $2 OR friend_id = $2)
               AND status = 'pending'
               AND deleted_at IS NULL
            "#
        ))
        .bind(id)
        .bind(member)
        .fetch_optional(&self.db)
        .await
        .context("find pending friendship")?;
        row.map(Friendship::try_from).transpose()
    }

    async fn set_status(&self, id: i64, status: FriendshipStatus) -> anyhow::Result<Friendship> {
        let row = sqlx::query_as::<_, FriendshipRow>(&format!(
            r#"
            UPDATE friendships
               SET status = $2, updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL
            RETURNING {FRIENDSHIP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&self.db)
        .await
        .context("update friendship status")?;
        row.try_into()
    }

    async fn set_debt(&self, id: i64, debt_user_id: Option<i64>) -> anyhow::Result<Friendship> {
        let row = sqlx::query_as::<_, FriendshipRow>(&format!(
            r#"
            UPDATE friendships
               SET debt_user_id = $2, updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL
            RETURNING {FRIENDSHIP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(debt_user_id)
        .fetch_one(&self.db)
        .await
        .context("update friendship debt")?;
        row.try_into()
    }

    async fn soft_delete(&self, id: i64) -> anyhow::Result<()> {
        sqlx::query("UPDATE friendships SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.db)
            .await
            .context("soft delete friendship")?;
        Ok(())
    }

    async fn list_for_member(
        &self,
        user_id: i64,
        status: FriendshipStatus,
    ) -> anyhow::Result<Vec<Friendship>> {
        let rows = sqlx::query_as::<_, FriendshipRow>(&format!(
            r#"
            SELECT {FRIENDSHIP_COLUMNS}
              FROM friendships
             WHERE (user_id = $1 OR friend_id = $1)
               AND status = $2
               AND deleted_at IS NULL
             ORDER BY created_at, id
            "#
        ))
        .bind(user_id)
        .bind(status.as_str())
        .fetch_all(&self.db)
        .await
        .context("list friendships")?;
        rows.into_iter().map(Friendship::try_from).collect()
    }
}
