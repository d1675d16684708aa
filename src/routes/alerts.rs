//! # 알림 설정 / 알림 로그 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/alerts/settings | `list_settings` | 내 알림 설정 전체 |
//! | POST | /api/v1/alerts/settings | `create_setting` | 새 알림 설정 |
//! | PATCH | /api/v1/alerts/settings/{id} | `update_setting` | 임계값/활성 여부 수정 |
//! | DELETE | /api/v1/alerts/settings/{id} | `delete_setting` | 설정 삭제 (로그는 남음) |
//! | POST | /api/v1/alerts/toggle | `toggle_settings` | 내 설정 전체 켜기/끄기 |
//! | GET | /api/v1/alerts/logs | `list_logs` | 내 알림 로그 (최신순) |
//!
//! 모든 핸들러는 `AuthUser`로 현재 사용자를 확인합니다.
//! 다른 사용자의 설정 ID로 수정/삭제를 요청하면 존재 여부를 드러내지 않도록 404를 돌려줍니다.

use crate::{
    db,
    error::AppError,
    middleware::AuthUser,
    models::*,
    routes::AppState,
    services::alert_settings,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `GET /alerts/settings` → `{ "settings": [...] }`
pub async fn list_settings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let settings = alert_settings::find_all_by_user(&state.pool, &auth.user_id).await?;
    Ok(Json(json!({ "settings": settings })))
}

/// `POST /alerts/settings` + `{ "type": "AIRQUALITY", "threshold": "보통" }`
///
/// 성공하면 201과 저장된 설정을 돌려줍니다. 단위는 종류에서 자동으로 정해집니다.
pub async fn create_setting(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateAlertSettingRequest>,
) -> Result<(StatusCode, Json<AlertSetting>), AppError> {
    let setting = alert_settings::create(&state.pool, &auth.user_id, &req).await?;
    Ok((StatusCode::CREATED, Json(setting)))
}

/// 설정이 현재 사용자의 것인지 확인합니다. 없거나 남의 것이면 NotFound.
async fn ensure_owned(state: &AppState, user_id: &str, id: &str) -> Result<(), AppError> {
    match db::get_alert_setting(&state.pool, id).await? {
        Some(setting) if setting.user_id == user_id => Ok(()),
        _ => Err(AppError::NotFound),
    }
}

/// `PATCH /alerts/settings/{id}` + `{ "threshold"?: ..., "active"?: bool }`
pub async fn update_setting(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateAlertSettingRequest>,
) -> Result<Json<AlertSetting>, AppError> {
    ensure_owned(&state, &auth.user_id, &id).await?;
    let setting = alert_settings::update(&state.pool, &id, &req).await?;
    Ok(Json(setting))
}

/// `DELETE /alerts/settings/{id}` → 204 No Content
pub async fn delete_setting(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ensure_owned(&state, &auth.user_id, &id).await?;
    alert_settings::remove(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /alerts/toggle` + `{ "active": false }` → `{ "active": false, "updated": n }`
pub async fn toggle_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ToggleAlertsRequest>,
) -> Result<Json<Value>, AppError> {
    let updated = alert_settings::toggle_all(&state.pool, &auth.user_id, req.active).await?;
    Ok(Json(json!({ "active": req.active, "updated": updated })))
}

/// `GET /alerts/logs` → `{ "logs": [...] }`
///
/// 각 로그에는 연결된 설정이 `alert_setting`으로 붙습니다 (삭제되었으면 null).
pub async fn list_logs(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let logs = db::list_alert_logs(&state.pool, &auth.user_id).await?;
    Ok(Json(json!({ "logs": logs })))
}
