use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::auth::repo_types::User;

/// The caller's own profile with the derived balance.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub img: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<String>,
    pub status: Option<String>,
    pub balance: Decimal,
}

impl MeView {
    pub fn new(user: User, balance: Decimal) -> Self {
        Self {
            id: user.id,
            birthday: user.birthday.and_then(|b| b.format(&Rfc3339).ok()),
            name: user.name,
            email: user.email,
            img: user.img_url,
            phone: user.phone,
            gender: user.gender,
            status: user.status,
            balance,
        }
    }
}

/// Partial update; absent or empty fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(alias = "nama")]
    pub name: Option<String>,
    #[serde(alias = "img_url")]
    pub img: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<String>,
    pub status: Option<String>,
}

/// What other users may see.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub img: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub joined: OffsetDateTime,
}

impl From<User> for PublicProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            img: u.img_url,
            joined: u.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvatarResponse {
    pub img: String,
}
