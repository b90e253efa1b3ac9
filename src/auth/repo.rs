use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::auth::repo_types::{
    AccountHistory, NewHistoryEvent, NewUser, PasswordReset, ProfileUpdate, User,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, pin_hash, img_url, phone, \
     phone_digits, gender, birthday, status, created_at, updated_at, deleted_at";

/// Credential store: user records and the lookups the rest of the app needs.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Live (not soft-deleted) user by id.
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// Returns `None` when the email is already taken.
    async fn create(&self, new: NewUser) -> anyhow::Result<Option<User>>;
    async fn update_profile(&self, id: i64, update: ProfileUpdate) -> anyhow::Result<User>;
    async fn update_password(&self, id: i64, password_hash: &str) -> anyhow::Result<()>;
    /// Users whose normalized phone equals any of `variants`.
    async fn find_by_phone_digits(&self, variants: &[String]) -> anyhow::Result<Vec<User>>;
    /// Fallback for rows without `phone_digits`: literal raw phone, or the raw
    /// phone stripped of `+`, space and `-` matching any of `variants`.
    async fn find_by_raw_phone(&self, raw: &str, variants: &[String])
        -> anyhow::Result<Vec<User>>;
    /// Case-insensitive substring match on the display name.
    async fn search_by_name(&self, needle: &str) -> anyhow::Result<Vec<User>>;
    /// `(id, phone)` of users that have a phone but no normalized copy yet.
    async fn list_missing_phone_digits(&self) -> anyhow::Result<Vec<(i64, String)>>;
    async fn set_phone_digits(&self, id: i64, digits: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait PasswordResetRepo: Send + Sync {
    /// Drops every earlier code for `email` and stores the new one.
    async fn replace(
        &self,
        email: &str,
        otp: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<PasswordReset>;
    async fn find(&self, email: &str, otp: &str) -> anyhow::Result<Option<PasswordReset>>;
    async fn delete(&self, id: i64) -> anyhow::Result<()>;
}

#[async_trait]
pub trait HistoryRepo: Send + Sync {
    async fn record(&self, event: NewHistoryEvent) -> anyhow::Result<()>;
    /// Newest first.
    async fn list_by_user(&self, user_id: i64) -> anyhow::Result<Vec<AccountHistory>>;
}

/// Escapes `LIKE` metacharacters so `needle` matches literally under `ESCAPE '\'`.
fn like_literal(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, pin_hash, img_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.pin_hash)
        .bind(&new.img_url)
        .fetch_optional(&self.db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    async fn update_profile(&self, id: i64, update: ProfileUpdate) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET name         = COALESCE($2, name),
                   img_url      = COALESCE($3, img_url),
                   phone        = COALESCE($4, phone),
                   phone_digits = COALESCE($5, phone_digits),
                   gender       = COALESCE($6, gender),
                   birthday     = COALESCE($7, birthday),
                   status       = COALESCE($8, status),
                   updated_at   = now()
             WHERE id = $1 AND deleted_at IS NULL
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.img_url)
        .bind(update.phone)
        .bind(update.phone_digits)
        .bind(update.gender)
        .bind(update.birthday)
        .bind(update.status)
        .fetch_one(&self.db)
        .await
        .context("update profile")?;
        Ok(user)
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.db)
            .await
            .context("update password")?;
        Ok(())
    }

    async fn find_by_phone_digits(&self, variants: &[String]) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
              FROM users
             WHERE phone_digits = ANY($1) AND deleted_at IS NULL
             ORDER BY id
            "#
        ))
        .bind(variants)
        .fetch_all(&self.db)
        .await
        .context("find users by phone digits")?;
        Ok(users)
    }

    async fn find_by_raw_phone(
        &self,
        raw: &str,
        variants: &[String],
    ) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
              FROM users
             WHERE deleted_at IS NULL
               AND (phone = $1
                    OR REPLACE(REPLACE(REPLACE(phone, '+', ''), ' ', ''), '-', '') = ANY($2))
             ORDER BY id
            "#
        ))
        .bind(raw)
        .bind(variants)
        .fetch_all(&self.db)
        .await
        .context("find users by raw phone")?;
        Ok(users)
    }

    async fn search_by_name(&self, needle: &str) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
              FROM users
             WHERE LOWER(name) LIKE '%' || LOWER($1) || '%' ESCAPE '\' AND deleted_at IS NULL
             ORDER BY id
            "#
        ))
        .bind(like_literal(needle))
        .fetch_all(&self.db)
        .await
        .context("search users by name")?;
        Ok(users)
    }

    async fn list_missing_phone_digits(&self) -> anyhow::Result<Vec<(i64, String)>> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT id, phone
              FROM users
             WHERE phone IS NOT NULL AND phone <> ''
               AND (phone_digits IS NULL OR phone_digits = '')
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list users missing phone digits")?;
        Ok(rows)
    }

    async fn set_phone_digits(&self, id: i64, digits: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET phone_digits = $2 WHERE id = $1")
            .bind(id)
            .bind(digits)
            .execute(&self.db)
            .await
            .context("set phone digits")?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgPasswordResetRepo {
    db: PgPool,
}

impl PgPasswordResetRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PasswordResetRepo for PgPasswordResetRepo {
    async fn replace(
        &self,
        email: &str,
        otp: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<PasswordReset> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        sqlx::query("DELETE FROM password_resets WHERE email = $1")
            .bind(email)
            .execute(&mut *tx)
            .await
            .context("delete previous otp")?;
        let reset = sqlx::query_as::<_, PasswordReset>(
            r#"
            INSERT INTO password_resets (email, otp, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, email, otp, expires_at, created_at
            "#,
        )
        .bind(email)
        .bind(otp)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await
        .context("insert otp")?;
        tx.commit().await.context("commit tx")?;
        Ok(reset)
    }

    async fn find(&self, email: &str, otp: &str) -> anyhow::Result<Option<PasswordReset>> {
        let reset = sqlx::query_as::<_, PasswordReset>(
            r#"
            SELECT id, email, otp, expires_at, created_at
              FROM password_resets
             WHERE email = $1 AND otp = $2
             ORDER BY created_at DESC
             LIMIT 1
            "#,
        )
        .bind(email)
        .bind(otp)
        .fetch_optional(&self.db)
        .await
        .context("find otp")?;
        Ok(reset)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM password_resets WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete otp")?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgHistoryRepo {
    db: PgPool,
}

impl PgHistoryRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HistoryRepo for PgHistoryRepo {
    async fn record(&self, event: NewHistoryEvent) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO account_histories (user_id, event, description)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(event.user_id)
        .bind(event.event.as_str())
        .bind(event.event.description())
        .execute(&self.db)
        .await
        .context("insert account history")?;
        Ok(())
    }

    async fn list_by_user(&self, user_id: i64) -> anyhow::Result<Vec<AccountHistory>> {
        let rows = sqlx::query_as::<_, AccountHistory>(
            r#"
            SELECT id, user_id, event, description, created_at
              FROM account_histories
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list account history")?;
        Ok(rows)
    }
}
