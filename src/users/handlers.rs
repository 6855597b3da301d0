use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    state::AppState,
    users::{
        dto::{list_envelope, user_envelope},
        repo::{ProfileChanges, Role, User},
        services::{apply_profile_update, Upload},
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/farmers", get(list_farmers))
        .route("/investors", get(list_investors))
        .route("/farmers/:farmer_id", get(get_farmer).patch(update_farmer))
        .route(
            "/investors/:investor_id",
            get(get_investor).patch(update_investor),
        )
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB, profile image included
}

// --- list by role ---

#[instrument(skip(state))]
async fn list_farmers(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    list(state, Role::Farmer).await
}

#[instrument(skip(state))]
async fn list_investors(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    list(state, Role::Investor).await
}

async fn list(state: AppState, role: Role) -> Result<Json<Value>, ApiError> {
    let users = User::list_by_role(&state.db, role)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(list_envelope(role, &users)))
}

// --- get one by role ---

#[instrument(skip(state))]
async fn get_farmer(
    State(state): State<AppState>,
    Path(farmer_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    get_one(state, Role::Farmer, farmer_id).await
}

#[instrument(skip(state))]
async fn get_investor(
    State(state): State<AppState>,
    Path(investor_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    get_one(state, Role::Investor, investor_id).await
}

async fn get_one(state: AppState, role: Role, id: Uuid) -> Result<Json<Value>, ApiError> {
    let user = User::find_by_id_and_role(&state.db, id, role)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(ApiError::not_found)?;
    Ok(Json(user_envelope(role, &user, None)))
}

// --- profile update ---

#[instrument(skip(state, mp))]
async fn update_farmer(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(farmer_id): Path<Uuid>,
    mp: Multipart,
) -> Result<Json<Value>, ApiError> {
    info!(actor = %claims.sub, target = %farmer_id, "farmer profile update");
    update(state, Role::Farmer, farmer_id, mp).await
}

#[instrument(skip(state, mp))]
async fn update_investor(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(investor_id): Path<Uuid>,
    mp: Multipart,
) -> Result<Json<Value>, ApiError> {
    info!(actor = %claims.sub, target = %investor_id, "investor profile update");
    update(state, Role::Investor, investor_id, mp).await
}

async fn update(
    state: AppState,
    role: Role,
    id: Uuid,
    mp: Multipart,
) -> Result<Json<Value>, ApiError> {
    let (fields, upload) = read_update_form(mp).await?;
    // Whatever role the client submitted is gone by here; from_fields strips
    // it and the repo update is keyed on the endpoint's role.
    let changes = ProfileChanges::from_fields(fields);
    let user = apply_profile_update(&state, role, id, changes, upload).await?;
    Ok(Json(user_envelope(
        role,
        &user,
        Some("User profile successfully updated"),
    )))
}

/// Text parts become profile fields; the `image` file part, when present,
/// becomes the upload.
async fn read_update_form(
    mut mp: Multipart,
) -> Result<(serde_json::Map<String, Value>, Option<Upload>), ApiError> {
    let mut fields = serde_json::Map::new();
    let mut upload = None;

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.to_string()))?
    {
        let Some(name) = field.name().map(|s| s.to_string()) else {
            continue;
        };
        if name == "image" && field.file_name().is_some() {
            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "upload.bin".into());
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let body = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(e.to_string()))?;
            upload = Some(Upload {
                filename,
                content_type,
                body,
            });
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::validation(e.to_string()))?;
            fields.insert(name, Value::String(text));
        }
    }

    Ok((fields, upload))
}
