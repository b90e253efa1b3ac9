use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::repo_types::User;
use crate::friends::repo_types::FriendshipStatus;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub phone: Option<String>,
    pub name: Option<String>,
    pub q: Option<String>,
}

/// Body for sending and answering requests by phone.
#[derive(Debug, Deserialize)]
pub struct PhoneRequest {
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserHit {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub img: Option<String>,
    pub is_friend: bool,
    pub has_pending: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub users: Vec<UserHit>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FriendView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub img: Option<String>,
    pub is_debt: bool,
    pub status: FriendshipStatus,
}

impl FriendView {
    pub fn new(friend: &User, status: FriendshipStatus, is_debt: bool) -> Self {
        Self {
            id: friend.id,
            name: friend.name.clone(),
            email: friend.email.clone(),
            phone: friend.phone.clone(),
            img: friend.img_url.clone(),
            is_debt,
            status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FriendsResponse {
    pub friends: Vec<FriendView>,
}

/// A pending request seen from one side; `id` is the friendship id.
#[derive(Debug, Serialize, Deserialize)]
pub struct PendingItem {
    pub id: i64,
    pub friend_id: i64,
    pub friend_name: String,
    pub friend_phone: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PendingResponse {
    pub sent: Vec<PendingItem>,
    pub received: Vec<PendingItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DebtToggled {
    pub friend_id: i64,
    pub debt_user_id: Option<i64>,
    pub is_debt: bool,
}
