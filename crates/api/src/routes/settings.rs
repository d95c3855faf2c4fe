//! Store settings routes: theme colors, palette presets, and the
//! background image. Reads are public so the storefront can style itself;
//! writes are admin only.

use axum::{Json, extract::State};
use tracing::{info, instrument};

use crate::db::SettingsRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{SettingView, setting::keys};
use crate::state::AppState;

async fn read_setting(state: &AppState, key: &str) -> Result<Json<SettingView>> {
    let setting = SettingsRepository::new(state.db()).get(key).await?;
    Ok(Json(setting.map_or_else(
        || SettingView {
            key: key.to_string(),
            value: serde_json::Value::Null,
        },
        SettingView::from,
    )))
}

async fn write_setting(
    state: &AppState,
    key: &str,
    value: serde_json::Value,
) -> Result<Json<SettingView>> {
    let bson = mongodb::bson::to_bson(&value)
        .map_err(|e| crate::error::AppError::BadRequest(format!("invalid value: {e}")))?;
    SettingsRepository::new(state.db()).upsert(key, bson).await?;
    info!(key, "setting updated");
    Ok(Json(SettingView {
        key: key.to_string(),
        value,
    }))
}

/// GET /api/settings/theme
#[instrument(skip(state))]
pub async fn get_theme(State(state): State<AppState>) -> Result<Json<SettingView>> {
    read_setting(&state, keys::THEME).await
}

/// PUT /api/settings/theme
#[instrument(skip(state, value))]
pub async fn put_theme(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(value): Json<serde_json::Value>,
) -> Result<Json<SettingView>> {
    write_setting(&state, keys::THEME, value).await
}

/// GET /api/settings/presets
#[instrument(skip(state))]
pub async fn get_presets(State(state): State<AppState>) -> Result<Json<SettingView>> {
    read_setting(&state, keys::PRESETS).await
}

/// PUT /api/settings/presets
#[instrument(skip(state, value))]
pub async fn put_presets(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(value): Json<serde_json::Value>,
) -> Result<Json<SettingView>> {
    write_setting(&state, keys::PRESETS, value).await
}

/// GET /api/settings/background
#[instrument(skip(state))]
pub async fn get_background(State(state): State<AppState>) -> Result<Json<SettingView>> {
    read_setting(&state, keys::BACKGROUND).await
}

/// PUT /api/settings/background
#[instrument(skip(state, value))]
pub async fn put_background(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(value): Json<serde_json::Value>,
) -> Result<Json<SettingView>> {
    write_setting(&state, keys::BACKGROUND, value).await
}
