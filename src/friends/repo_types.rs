use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendshipStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for FriendshipStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => anyhow::bail!("unknown friendship status {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a user cannot be paired with themselves")]
pub struct SelfReference;

/// Unordered pair of distinct users, stored as `(low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalPair {
    low: i64,
    high: i64,
}

impl CanonicalPair {
    pub fn new(a: i64, b: i64) -> Result<Self, SelfReference> {
        if a == b {
            return Err(SelfReference);
        }
        Ok(Self {
            low: a.min(b),
            high: a.max(b),
        })
    }

    pub fn low(&self) -> i64 {
        self.low
    }

    pub fn high(&self) -> i64 {
        self.high
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.low == user_id || self.high == user_id
    }
}

/// A friend request about to be stored. Only constructible through
/// [`NewFriendship::request`], so every row is canonically ordered.
#[derive(Debug, Clone, Copy)]
pub struct NewFriendship {
    pair: CanonicalPair,
    requester_id: i64,
}

impl NewFriendship {
    pub fn request(requester_id: i64, target_id: i64) -> Result<Self, SelfReference> {
        Ok(Self {
            pair: CanonicalPair::new(requester_id, target_id)?,
            requester_id,
        })
    }

    pub fn pair(&self) -> CanonicalPair {
        self.pair
    }

    pub fn requester_id(&self) -> i64 {
        self.requester_id
    }

    pub fn status(&self) -> FriendshipStatus {
        FriendshipStatus::Pending
    }
}

#[derive(Debug, FromRow)]
pub struct FriendshipRow {
    pub id: i64,
    pub user_id: i64,
    pub friend_id: i64,
    pub requester_id: i64,
    pub status: String,
    pub debt_user_id: Option<i64>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct Friendship {
    pub id: i64,
    pub user_id: i64,
    pub friend_id: i64,
    pub requester_id: i64,
    pub status: FriendshipStatus,
    pub debt_user_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Friendship {
    pub fn pair(&self) -> CanonicalPair {
        CanonicalPair {
            low: self.user_id,
            high: self.friend_id,
        }
    }

    pub fn has_member(&self, user_id: i64) -> bool {
        self.pair().contains(user_id)
    }

    /// The member opposite `user_id`; `user_id` is assumed to be a member.
    pub fn counterpart_of(&self, user_id: i64) -> i64 {
        if self.user_id == user_id {
            self.friend_id
        } else {
            self.user_id
        }
    }

    pub fn is_debt_for(&self, user_id: i64) -> bool {
        self.debt_user_id == Some(user_id)
    }

    /// Debt marker after `actor` toggles it: cleared if it names the actor,
    /// otherwise set to the actor.
    pub fn toggled_debt(&self, actor: i64) -> Option<i64> {
        if self.is_debt_for(actor) {
            None
        } else {
            Some(actor)
        }
    }
}

impl TryFrom<FriendshipRow> for Friendship {
    type Error = anyhow::Error;

    fn try_from(r: FriendshipRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            friend_id: r.friend_id,
            requester_id: r.requester_id,
            status: r.status.parse()?,
            debt_user_id: r.debt_user_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}
