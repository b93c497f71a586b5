use axum::{
    extract::{FromRef, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, ChangePasswordRequest, DeleteAccountRequest, LoginRequest, MeResponse,
            MessageResponse, ProfileResponse, PublicUser, RegisterRequest, RegisterResponse,
            UpdateProfileRequest,
        },
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo,
    },
    error::{is_unique_violation, ApiError},
    state::AppState,
    validation::{is_strong_password, is_valid_email, sanitize_text},
    visitors::VisitorInfo,
};

/// Phrase the client must echo back before the account is removed.
const DELETE_CONFIRMATION: &str = "delete my account";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/profile", put(update_profile))
        .route("/auth/change-password", put(change_password))
        .route("/auth/account", delete(delete_account))
}

fn checked_name(raw: Option<&str>) -> Result<String, ApiError> {
    let name = raw.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    if name.chars().count() > 50 {
        return Err(ApiError::Validation(
            "name must be at most 50 characters".into(),
        ));
    }
    Ok(sanitize_text(name))
}

#[instrument(skip(state, headers, payload))]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let name = checked_name(payload.name.as_deref())?;

    let email = payload
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    if email.is_empty() {
        return Err(ApiError::Validation("email is required".into()));
    }
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(ApiError::Validation("email is not valid".into()));
    }

    let password = payload.password.as_deref().unwrap_or_default();
    if !is_strong_password(password) {
        return Err(ApiError::Validation(
            "password must be at least 6 characters with a letter and a digit".into(),
        ));
    }

    if repo::find_by_email(&state.db, &email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(ApiError::Conflict("email already registered".into()));
    }

    let hash = hash_password(password)?;
    // A registration racing on the same email loses on the unique index.
    let user = match repo::create(&state.db, &name, &email, &hash).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::Conflict("email already registered".into()));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");

    // Visitor capture and the Telegram push are best-effort; the response
    // never waits on them.
    let visitor = VisitorInfo::from_headers(&headers);
    let db = state.db.clone();
    let notifier = state.notifier.clone();
    let (notify_name, notify_email) = (user.name.clone(), user.email.clone());
    tokio::spawn(async move {
        if let Err(e) = crate::visitors::repo::record(&db, &visitor).await {
            warn!(error = %e, "visitor capture failed");
        }
        notifier
            .notify_new_user(&notify_name, &notify_email, &visitor)
            .await;
    });

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "registration successful, please log in".into(),
            user: PublicUser {
                id: user.id,
                name: user.name,
                email: user.email,
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = payload
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    let password = payload.password.as_deref().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation("email and password are required".into()));
    }

    // Unknown email and wrong password produce the same response.
    let user = repo::find_by_email(&state.db, &email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash) {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    // Deactivated accounts get the same generic response.
    if !user.is_active {
        warn!(user_id = %user.id, "login on inactive account");
        return Err(ApiError::InvalidCredentials);
    }

    if let Err(e) = repo::touch_last_login(&state.db, user.id).await {
        warn!(error = %e, user_id = %user.id, "failed to update last login");
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    }))
}

#[instrument(skip_all)]
pub async fn me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse { user })
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let name = checked_name(payload.name.as_deref())?;

    let updated = repo::update_name(&state.db, user.id, &name)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    info!(user_id = %updated.id, "profile updated");
    Ok(Json(ProfileResponse {
        message: "profile updated".into(),
        user: updated,
    }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let current = payload.current_password.as_deref().unwrap_or_default();
    let new = payload.new_password.as_deref().unwrap_or_default();
    if current.is_empty() || new.is_empty() {
        return Err(ApiError::Validation(
            "current and new password are required".into(),
        ));
    }

    let record = repo::find_by_id(&state.db, user.id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    if !verify_password(current, &record.password_hash) {
        return Err(ApiError::Validation("current password is incorrect".into()));
    }
    if !is_strong_password(new) {
        return Err(ApiError::Validation(
            "password must be at least 6 characters with a letter and a digit".into(),
        ));
    }

    let hash = hash_password(new)?;
    repo::update_password(&state.db, user.id, &hash).await?;

    info!(user_id = %user.id, "password changed");
    Ok(Json(MessageResponse {
        message: "password changed".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<DeleteAccountRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.confirm.as_deref() != Some(DELETE_CONFIRMATION) {
        return Err(ApiError::Validation(format!(
            "confirmation phrase must be \"{DELETE_CONFIRMATION}\""
        )));
    }

    repo::delete_account(&state.db, user.id).await?;

    info!(user_id = %user.id, "account deleted");
    Ok(Json(MessageResponse {
        message: "account deleted".into(),
    }))
}
