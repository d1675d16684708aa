//! # 알림 설정 레지스트리 서비스
//!
//! 알림 설정의 생성/조회/수정/삭제/일괄 토글을 담당합니다.
//! 종류별 검증(등급 문자열, 숫자 파싱)과 중복 방지가 여기서 이루어지고,
//! SQL은 `db::alert_settings`에 맡깁니다.
//!
//! ## 에러
//! - `Conflict`: 같은 사용자가 같은 종류의 설정을 두 번 만들 때
//! - `BadRequest`: 알 수 없는 종류/조건, 잘못된 임계값
//! - `NotFound`: 존재하지 않는 설정 ID, 등록되지 않은 사용자

use sqlx::SqlitePool;

use crate::{db, error::AppError, models::*, services::threshold};

fn parse_type(raw: &str) -> Result<AlertType, AppError> {
    raw.trim().parse().map_err(AppError::BadRequest)
}

fn parse_condition(raw: Option<&str>) -> Result<Condition, AppError> {
    match raw {
        None => Ok(Condition::Above),
        Some(raw) => raw.trim().parse().map_err(AppError::BadRequest),
    }
}

/// 새 알림 설정을 만듭니다.
///
/// (사용자, 종류) 조합은 하나만 허용됩니다. 이미 있으면 기존 설정은 건드리지 않고
/// `Conflict`를 반환합니다. 여기서의 조회는 빠른 거절용이고, 동시에 들어온 요청은
/// DB의 유니크 인덱스가 막아 한쪽만 성공합니다.
///
/// 소유자가 `users`에 없으면 `NotFound`입니다.
pub async fn create(
    pool: &SqlitePool,
    user_id: &str,
    req: &CreateAlertSettingRequest,
) -> Result<AlertSetting, AppError> {
    let kind = parse_type(&req.alert_type)?;

    // 토큰은 유효해도 이 서버에 계정 행이 없을 수 있습니다 (외래 키 위반 대신 404)
    if !db::user_exists(pool, user_id).await? {
        return Err(AppError::NotFound);
    }

    if db::find_alert_setting_by_type(pool, user_id, kind)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Alert setting for {kind} already exists"
        )));
    }

    let condition = parse_condition(req.condition.as_deref())?;
    let threshold = threshold::resolve(kind, &req.threshold)?;

    let setting = db::create_alert_setting(
        pool,
        user_id,
        kind,
        condition,
        threshold,
        req.active.unwrap_or(true),
    )
    .await?;

    tracing::info!(user_id, setting_id = %setting.id, alert_type = %kind, "Alert setting created");
    Ok(setting)
}

/// 사용자의 모든 설정 (활성 여부와 무관)
pub async fn find_all_by_user(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<AlertSetting>, AppError> {
    db::list_alert_settings(pool, user_id).await
}

/// 스케줄러의 주 읽기 경로: 전체 사용자의 활성 설정 + 소유자 지역
pub async fn find_all_active(pool: &SqlitePool) -> Result<Vec<ActiveAlertSetting>, AppError> {
    db::list_active_alert_settings(pool).await
}

/// 임계값과 활성 여부를 부분 수정합니다.
///
/// 임계값은 생성할 때와 같은 규칙으로 다시 검증합니다 (종류는 저장된 값을 따름).
pub async fn update(
    pool: &SqlitePool,
    id: &str,
    req: &UpdateAlertSettingRequest,
) -> Result<AlertSetting, AppError> {
    let existing = db::get_alert_setting(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let threshold = match &req.threshold {
        Some(input) => {
            let kind = existing.kind().ok_or_else(|| {
                AppError::Internal(format!("Stored alert type is invalid: {}", existing.alert_type))
            })?;
            Some(threshold::resolve(kind, input)?)
        }
        None => None,
    };

    db::update_alert_setting(pool, id, threshold, req.active)
        .await?
        .ok_or(AppError::NotFound)
}

/// 설정을 삭제합니다. 이 설정으로 생긴 로그는 남습니다.
pub async fn remove(pool: &SqlitePool, id: &str) -> Result<(), AppError> {
    if !db::delete_alert_setting(pool, id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(setting_id = id, "Alert setting removed");
    Ok(())
}

/// 사용자의 모든 설정을 한 번에 켜거나 끕니다. 바뀐 설정 수를 반환합니다.
pub async fn toggle_all(pool: &SqlitePool, user_id: &str, active: bool) -> Result<u64, AppError> {
    let changed = db::set_user_alerts_active(pool, user_id, active).await?;
    tracing::info!(user_id, active, changed, "Alert settings toggled");
    Ok(changed)
}
