use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,                    // stored trimmed and lower-cased
    pub password_hash: String,            // Argon2 hash, never exposed
    pub pin_hash: Option<String>,
    pub img_url: Option<String>,
    pub phone: Option<String>,            // as entered by the user
    pub phone_digits: Option<String>,     // digits-only copy used for lookups
    pub gender: Option<String>,
    pub birthday: Option<OffsetDateTime>,
    pub status: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,
}

/// Fields captured at registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub pin_hash: Option<String>,
    pub img_url: Option<String>,
}

/// Partial profile update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub img_url: Option<String>,
    pub phone: Option<String>,
    pub phone_digits: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<OffsetDateTime>,
    pub status: Option<String>,
}

/// One-time password issued for a reset request.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordReset {
    pub id: i64,
    pub email: String,
    pub otp: String,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl PasswordReset {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now > self.expires_at
    }
}

/// Login/logout audit entry.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AccountHistory {
    pub id: i64,
    pub user_id: i64,
    pub event: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    Login,
    Logout,
}

impl HistoryEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Login => "User logged in",
            Self::Logout => "User logged out",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewHistoryEvent {
    pub user_id: i64,
    pub event: HistoryEvent,
}
