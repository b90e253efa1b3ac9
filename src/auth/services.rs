use axum::extract::FromRef;
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use time::Duration;
use tracing::{error, info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, OtpIssued, PublicUser, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_secret, verify_secret},
        repo_types::{HistoryEvent, NewHistoryEvent, NewUser, PasswordReset, User},
    },
    error::{AppError, AppResult},
    state::AppState,
};

/// Lifetime of a password reset code.
pub const OTP_TTL: Duration = Duration::minutes(15);

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < 6 {
        return Err(AppError::bad_request("Password must be at least 6 characters"));
    }
    Ok(())
}

fn validate_pin(pin: &str) -> AppResult<()> {
    let ok = (4..=6).contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit());
    if !ok {
        return Err(AppError::bad_request("PIN must be 4 to 6 digits"));
    }
    Ok(())
}

/// Six-digit numeric code in `100000..=999999`.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

pub async fn register(state: &AppState, req: RegisterRequest) -> AppResult<User> {
    let name = req.name.trim().to_string();
    let email = normalize_email(&req.email);

    if name.is_empty() {
        return Err(AppError::bad_request("Name is required"));
    }
    if email.is_empty() {
        return Err(AppError::bad_request("Email is required"));
    }
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::bad_request("Invalid email"));
    }
    validate_password(&req.password)?;

    let pin = req.pin.filter(|p| !p.is_empty());
    let pin_hash = match pin {
        Some(pin) => {
            validate_pin(&pin)?;
            Some(hash_secret(&pin)?)
        }
        None => None,
    };

    let new = NewUser {
        name,
        email: email.clone(),
        password_hash: hash_secret(&req.password)?,
        pin_hash,
        img_url: req.img_url.filter(|u| !u.is_empty()),
    };

    let user = state.users.create(new).await?.ok_or_else(|| {
        warn!(%email, "email already registered");
        AppError::conflict("Email already registered")
    })?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user)
}

pub async fn login(state: &AppState, req: LoginRequest) -> AppResult<LoginResponse> {
    let email = normalize_email(&req.email);
    if email.is_empty() {
        return Err(AppError::bad_request("Email is required"));
    }
    if req.password.is_empty() {
        return Err(AppError::bad_request("Password is required"));
    }

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(AppError::unauthorized("Invalid credentials"));
    };

    if !verify_secret(&req.password, &user.password_hash)? {
        warn!(%email, user_id = user.id, "login invalid password");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(user.id)?;

    state.audit.record(NewHistoryEvent {
        user_id: user.id,
        event: HistoryEvent::Login,
    });

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(LoginResponse {
        token,
        token_type: "Bearer".into(),
        expires_in: keys.ttl_secs(),
        user: PublicUser::from(&user),
    })
}

pub fn logout(state: &AppState, user: &User) {
    state.audit.record(NewHistoryEvent {
        user_id: user.id,
        event: HistoryEvent::Logout,
    });
    info!(user_id = user.id, "user logged out");
}

async fn require_user(state: &AppState, email: &str) -> AppResult<User> {
    if email.is_empty() {
        return Err(AppError::bad_request("Email is required"));
    }
    state.users.find_by_email(email).await?.ok_or_else(|| {
        warn!(%email, "password reset for unknown email");
        AppError::not_found("User not found")
    })
}

/// Replaces any earlier code for the account and mails a fresh one.
pub async fn issue_otp(state: &AppState, raw_email: &str) -> AppResult<OtpIssued> {
    let email = normalize_email(raw_email);
    let user = require_user(state, &email).await?;

    let otp = generate_otp();
    let expires_at = state.clock.now() + OTP_TTL;
    state.resets.replace(&user.email, &otp, expires_at).await?;

    if let Err(e) = state.mailer.send_otp(&user.email, &otp).await {
        error!(error = %e, email = %user.email, "failed to send otp");
        return Err(AppError::Internal(e.context("send otp")));
    }

    info!(user_id = user.id, "password reset otp issued");
    Ok(OtpIssued {
        email: user.email,
        expires_in: OTP_TTL.whole_seconds(),
    })
}

/// Looks up a live code for `email`. An expired code is reported but left in place.
pub async fn check_otp(state: &AppState, raw_email: &str, otp: &str) -> AppResult<PasswordReset> {
    let email = normalize_email(raw_email);
    let user = require_user(state, &email).await?;

    let otp = otp.trim();
    if otp.is_empty() {
        return Err(AppError::bad_request("OTP is required"));
    }

    let reset = state.resets.find(&user.email, otp).await?.ok_or_else(|| {
        warn!(user_id = user.id, "invalid otp");
        AppError::unprocessable("Invalid OTP")
    })?;

    if reset.is_expired_at(state.clock.now()) {
        warn!(user_id = user.id, "expired otp");
        return Err(AppError::unprocessable("OTP has expired"));
    }
    Ok(reset)
}

pub async fn reset_password(
    state: &AppState,
    raw_email: &str,
    otp: &str,
    password: &str,
) -> AppResult<()> {
    validate_password(password)?;
    let reset = check_otp(state, raw_email, otp).await?;

    let user = require_user(state, &reset.email).await?;
    state
        .users
        .update_password(user.id, &hash_secret(password)?)
        .await?;
    state.resets.delete(reset.id).await?;

    // the password is already changed; a failed notice must not undo it
    if let Err(e) = state.mailer.send_password_changed(&user.email).await {
        warn!(error = %e, user_id = user.id, "failed to send password change notice");
    }

    info!(user_id = user.id, "password reset");
    Ok(())
}
