use tracing::{debug, info, warn};

use crate::{
    auth::repo_types::User,
    error::{AppError, AppResult},
    friends::{
        dto::{
            DebtToggled, FriendView, FriendsResponse, PendingItem, PendingResponse, SearchParams,
            UserHit,
        },
        phone::{digits_only, looks_like_phone, phone_variants},
        repo_types::{CanonicalPair, Friendship, FriendshipStatus, NewFriendship},
    },
    state::AppState,
};

/// How the counterpart of a pending request is identified.
#[derive(Debug, Clone)]
pub enum RequestLookup {
    ById(i64),
    ByPhone(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

#[derive(Debug, PartialEq, Eq)]
enum SearchTarget {
    Phone(String),
    Name(String),
    Both { phone: String, name: String },
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn classify(params: SearchParams) -> Option<SearchTarget> {
    let phone = non_empty(params.phone);
    let name = non_empty(params.name);
    match (phone, name) {
        (Some(phone), Some(name)) => Some(SearchTarget::Both { phone, name }),
        (Some(phone), None) => Some(SearchTarget::Phone(phone)),
        (None, Some(name)) => Some(SearchTarget::Name(name)),
        (None, None) => non_empty(params.q).map(|q| {
            if looks_like_phone(&q) {
                SearchTarget::Phone(q)
            } else {
                SearchTarget::Name(q)
            }
        }),
    }
}

/// Users whose phone matches `raw`: the normalized column first, then the
/// stored raw phone.
async fn find_by_phone(state: &AppState, raw: &str) -> AppResult<Vec<User>> {
    let variants = phone_variants(raw);
    if variants.is_empty() {
        return Ok(Vec::new());
    }
    let found = state.users.find_by_phone_digits(&variants).await?;
    if !found.is_empty() {
        return Ok(found);
    }
    Ok(state.users.find_by_raw_phone(raw, &variants).await?)
}

async fn require_by_phone(state: &AppState, raw: &str) -> AppResult<User> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::bad_request("Phone number is required"));
    }
    if digits_only(raw).is_empty() {
        return Err(AppError::bad_request("Phone number is invalid"));
    }
    find_by_phone(state, raw)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            debug!(phone = %raw, "no user for phone");
            AppError::not_found("User not found")
        })
}

fn self_reference() -> AppError {
    AppError::bad_request("Cannot send friend request to yourself")
}

pub async fn search(state: &AppState, me: &User, params: SearchParams) -> AppResult<Vec<UserHit>> {
    let target =
        classify(params).ok_or_else(|| AppError::bad_request("Phone or name is required"))?;
    debug!(?target, "friend search");

    let (phone, name) = match target {
        SearchTarget::Phone(p) => (Some(p), None),
        SearchTarget::Name(n) => (None, Some(n)),
        SearchTarget::Both { phone, name } => (Some(phone), Some(name)),
    };

    let mut found = match &phone {
        Some(p) => find_by_phone(state, p).await?,
        None => Vec::new(),
    };
    if found.is_empty() {
        if let Some(n) = &name {
            found = state.users.search_by_name(n).await?;
        }
    }
    if found.is_empty() {
        return Err(AppError::not_found("User not found"));
    }

    let mut hits = Vec::with_capacity(found.len());
    for user in found {
        let existing = match CanonicalPair::new(me.id, user.id) {
            Ok(pair) => state.friendships.find_between(pair).await?,
            Err(_) => None,
        };
        let status = existing.map(|f| f.status);
        hits.push(UserHit {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            img: user.img_url,
            is_friend: status == Some(FriendshipStatus::Accepted),
            has_pending: status == Some(FriendshipStatus::Pending),
        });
    }
    Ok(hits)
}

pub async fn send_request(state: &AppState, me: &User, phone: &str) -> AppResult<Friendship> {
    let target = require_by_phone(state, phone).await?;
    let new = NewFriendship::request(me.id, target.id).map_err(|_| self_reference())?;

    if let Some(existing) = state.friendships.find_between(new.pair()).await? {
        warn!(
            friendship_id = existing.id,
            status = existing.status.as_str(),
            "duplicate friend request"
        );
        return Err(match existing.status {
            FriendshipStatus::Accepted => AppError::conflict("Already friends"),
            _ => AppError::conflict("Friend request already sent"),
        });
    }

    // a concurrent request for the same pair wins the unique index
    let created = state
        .friendships
        .insert(new)
        .await?
        .ok_or_else(|| AppError::conflict("Friend request already sent"))?;

    info!(friendship_id = created.id, from = me.id, to = target.id, "friend request sent");
    Ok(created)
}

async fn resolve_pending(
    state: &AppState,
    me: &User,
    lookup: RequestLookup,
) -> AppResult<Option<Friendship>> {
    match lookup {
        RequestLookup::ById(id) => Ok(state.friendships.find_pending_by_id(id, me.id).await?),
        RequestLookup::ByPhone(phone) => {
            let counterpart = require_by_phone(state, &phone).await?;
            let pair = CanonicalPair::new(me.id, counterpart.id).map_err(|_| self_reference())?;
            Ok(state
                .friendships
                .find_between(pair)
                .await?
                .filter(|f| f.status == FriendshipStatus::Pending))
        }
    }
}

/// Accepts or rejects a pending request `me` is part of. Rejection removes the row.
pub async fn respond(
    state: &AppState,
    me: &User,
    lookup: RequestLookup,
    decision: Decision,
) -> AppResult<Friendship> {
    let pending = resolve_pending(state, me, lookup)
        .await?
        .ok_or_else(|| AppError::not_found("Friend request not found"))?;

    match decision {
        Decision::Accept => {
            let accepted = state
                .friendships
                .set_status(pending.id, FriendshipStatus::Accepted)
                .await?;
            info!(friendship_id = accepted.id, user_id = me.id, "friend request accepted");
            Ok(accepted)
        }
        Decision::Reject => {
            state.friendships.soft_delete(pending.id).await?;
            info!(friendship_id = pending.id, user_id = me.id, "friend request rejected");
            Ok(pending)
        }
    }
}

pub async fn list_friends(state: &AppState, me: &User) -> AppResult<FriendsResponse> {
    let rows = state
        .friendships
        .list_for_member(me.id, FriendshipStatus::Accepted)
        .await?;

    let mut friends = Vec::with_capacity(rows.len());
    for row in rows {
        // counterpart may have been soft-deleted since
        if let Some(friend) = state.users.find_by_id(row.counterpart_of(me.id)).await? {
            friends.push(FriendView::new(&friend, row.status, row.is_debt_for(me.id)));
        }
    }
    Ok(FriendsResponse { friends })
}

pub async fn list_pending(state: &AppState, me: &User) -> AppResult<PendingResponse> {
    let rows = state
        .friendships
        .list_for_member(me.id, FriendshipStatus::Pending)
        .await?;

    let mut out = PendingResponse::default();
    for row in rows {
        let Some(friend) = state.users.find_by_id(row.counterpart_of(me.id)).await? else {
            continue;
        };
        let item = PendingItem {
            id: row.id,
            friend_id: friend.id,
            friend_name: friend.name,
            friend_phone: friend.phone.unwrap_or_default(),
            created_at: row.created_at,
        };
        if row.requester_id == me.id {
            out.sent.push(item);
        } else {
            out.received.push(item);
        }
    }
    Ok(out)
}

async fn find_pair(state: &AppState, me: &User, counterpart: i64) -> AppResult<Friendship> {
    let pair = CanonicalPair::new(me.id, counterpart)
        .map_err(|_| AppError::bad_request("Cannot use yourself as a friend"))?;
    state
        .friendships
        .find_between(pair)
        .await?
        .ok_or_else(|| AppError::not_found("Friendship not found"))
}

pub async fn remove(state: &AppState, me: &User, counterpart: i64) -> AppResult<()> {
    let row = find_pair(state, me, counterpart).await?;
    state.friendships.soft_delete(row.id).await?;
    info!(friendship_id = row.id, user_id = me.id, "friendship removed");
    Ok(())
}

pub async fn toggle_debt(state: &AppState, me: &User, counterpart: i64) -> AppResult<DebtToggled> {
    let row = find_pair(state, me, counterpart).await?;
    if row.status != FriendshipStatus::Accepted {
        return Err(AppError::not_found("Friendship not found"));
    }

    let updated = state
        .friendships
        .set_debt(row.id, row.toggled_debt(me.id))
        .await?;
    info!(friendship_id = updated.id, debt_user_id = ?updated.debt_user_id, "debt toggled");
    Ok(DebtToggled {
        friend_id: counterpart,
        debt_user_id: updated.debt_user_id,
        is_debt: updated.is_debt_for(me.id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(phone: Option<&str>, name: Option<&str>, q: Option<&str>) -> SearchParams {
        SearchParams {
            phone: phone.map(Into::into),
            name: name.map(Into::into),
            q: q.map(Into::into),
        }
    }

    #[test]
    fn free_text_with_enough_digits_is_a_phone() {
        assert_eq!(
            classify(params(None, None, Some("+62 812 34"))),
            Some(SearchTarget::Phone("+62 812 34".into()))
        );
    }

    #[test]
    fn free_text_with_letters_is_a_name() {
        assert_eq!(
            classify(params(None, None, Some("  Budi "))),
            Some(SearchTarget::Name("Budi".into()))
        );
        assert_eq!(
            classify(params(None, None, Some("1234"))),
            Some(SearchTarget::Name("1234".into()))
        );
    }

    #[test]
    fn explicit_fields_win_over_free_text() {
        assert_eq!(
            classify(params(Some("0812"), None, Some("Budi"))),
            Some(SearchTarget::Phone("0812".into()))
        );
        assert_eq!(
            classify(params(Some("0812"), Some("Budi"), None)),
            Some(SearchTarget::Both {
                phone: "0812".into(),
                name: "Budi".into()
            })
        );
    }

    #[test]
    fn blank_params_are_missing() {
        assert_eq!(classify(params(Some(" "), Some(""), None)), None);
        assert_eq!(classify(SearchParams::default()), None);
    }
}
