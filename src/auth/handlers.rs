use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, SignupRequest, SignupResponse},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        services::{is_valid_email, non_empty},
    },
    error::ApiError,
    state::AppState,
    users::{
        repo::{CreateUserError, NewUser, Role, User},
        services::strip_reserved,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/farmers/signup", post(signup_farmer))
        .route("/investors/signup", post(signup_investor))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
async fn signup_farmer(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    signup(state, Role::Farmer, payload).await
}

#[instrument(skip(state, payload))]
async fn signup_investor(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    signup(state, Role::Investor, payload).await
}

async fn signup(
    state: AppState,
    role: Role,
    mut payload: SignupRequest,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::validation("Password too short"));
    }

    // Early exit only; the unique index is the source of truth.
    if User::find_by_email(&state.db, &payload.email)
        .await
        .map_err(ApiError::internal)?
        .is_some()
    {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::duplicate_email());
    }

    let hash = hash_password(&payload.password).map_err(ApiError::internal)?;
    let profile = strip_reserved(payload.extra);

    let new = NewUser {
        email: &payload.email,
        password_hash: &hash,
        role,
        full_name: payload.full_name.as_deref(),
        phone: payload.phone.as_deref(),
        profile: serde_json::Value::Object(profile),
    };

    match User::create(&state.db, new).await {
        Ok(user) => {
            info!(user_id = %user.id, email = %user.email, %role, "user registered");
            Ok((
                StatusCode::CREATED,
                Json(SignupResponse {
                    status: true,
                    message: "User registered successfully",
                }),
            ))
        }
        // Lost the race between pre-check and insert; same outcome as the
        // pre-check catching it.
        Err(CreateUserError::DuplicateEmail) => {
            warn!(email = %payload.email, "duplicate insert raced past pre-check");
            Err(ApiError::duplicate_email())
        }
        Err(CreateUserError::Db(e)) => {
            error!(error = %e, "create user failed");
            Err(ApiError::internal(e))
        }
    }
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    // Email is normalized for lookup; the password is only presence-checked,
    // never altered.
    let (Some(email), Some(password)) = (
        non_empty(payload.email),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::validation("Please enter email and password"));
    };
    let email = email.to_lowercase();

    let user = User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::internal)?;

    // Unknown email and wrong password are indistinguishable to the caller.
    let Some(user) = user else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::invalid_credentials());
    };

    if !verify_password(&password, &user.password_hash).map_err(ApiError::internal)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::invalid_credentials());
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, user.role).map_err(ApiError::internal)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        status: true,
        message: "You are logged in successfully",
        token,
        user,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_excludes_password_hash() {
        let user = User {
            id: uuid::Uuid::new_v4(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$fake".into(),
            role: Role::Farmer,
            full_name: None,
            phone: None,
            image: None,
            profile: serde_json::json!({}),
            created_at: time::OffsetDateTime::now_utc(),
        };
        let body = serde_json::to_value(LoginResponse {
            status: true,
            message: "You are logged in successfully",
            token: "tok".into(),
            user,
        })
        .expect("serialize");
        assert_eq!(body["status"], serde_json::json!(true));
        assert_eq!(body["token"], "tok");
        assert!(body["user"].get("password_hash").is_none());
        assert_eq!(body["user"]["role"], "farmer");
    }
}
