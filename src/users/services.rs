use bytes::Bytes;
use rust_decimal::Decimal;
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};
use tracing::{info, warn};

use crate::{
    auth::repo_types::{ProfileUpdate, User},
    error::{AppError, AppResult},
    friends::phone::digits_only,
    ledger::services::balance,
    state::AppState,
    storage::ext_from_mime,
    users::dto::{MeView, UpdateProfileRequest},
};

/// Accepts a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_birthday(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(ts);
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc())
}

fn filled(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub async fn me_view(state: &AppState, user: User) -> AppResult<MeView> {
    let balance: Decimal = balance(state, user.id).await?;
    Ok(MeView::new(user, balance))
}

pub async fn update_profile(
    state: &AppState,
    user: &User,
    req: UpdateProfileRequest,
) -> AppResult<MeView> {
    let birthday = match filled(req.birthday) {
        Some(raw) => Some(parse_birthday(&raw).ok_or_else(|| {
            warn!(user_id = user.id, birthday = %raw, "unparseable birthday");
            AppError::bad_request("Invalid birthday, expected RFC 3339 or YYYY-MM-DD")
        })?),
        None => None,
    };

    let phone = filled(req.phone);
    let update = ProfileUpdate {
        name: filled(req.name),
        img_url: filled(req.img),
        phone_digits: phone.as_deref().map(digits_only),
        phone,
        gender: filled(req.gender),
        birthday,
        status: filled(req.status),
    };

    let updated = state.users.update_profile(user.id, update).await?;
    info!(user_id = user.id, "profile updated");
    me_view(state, updated).await
}

/// Stores the image and points the user's avatar at it; returns the public URL.
pub async fn upload_avatar(
    state: &AppState,
    user: &User,
    body: Bytes,
    content_type: &str,
) -> AppResult<String> {
    if body.is_empty() {
        return Err(AppError::bad_request("avatar file is empty"));
    }
    let ext = ext_from_mime(content_type)
        .ok_or_else(|| AppError::bad_request(format!("Unsupported image type {content_type}")))?;

    let key = format!(
        "avatars/{}/{}.{}",
        user.id,
        state.clock.now().unix_timestamp(),
        ext
    );
    state.storage.put_object(&key, body, content_type).await?;
    let url = state.storage.public_url(&key);

    state
        .users
        .update_profile(
            user.id,
            ProfileUpdate {
                img_url: Some(url.clone()),
                ..Default::default()
            },
        )
        .await?;

    info!(user_id = user.id, %key, "avatar uploaded");
    Ok(url)
}

/// Fills `phone_digits` for users that only have a raw phone. Returns how many rows changed.
pub async fn backfill_phone_digits(state: &AppState) -> anyhow::Result<usize> {
    let missing = state.users.list_missing_phone_digits().await?;
    let mut updated = 0;
    for (id, phone) in missing {
        let digits = digits_only(&phone);
        if digits.is_empty() {
            continue;
        }
        state.users.set_phone_digits(id, &digits).await?;
        updated += 1;
    }
    Ok(updated)
}
