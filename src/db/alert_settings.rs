//! # 알림 설정 데이터베이스 쿼리 모듈
//!
//! `alert_settings` 테이블의 CRUD와 스케줄러용 조회 쿼리입니다.
//! 모든 함수는 `SqlitePool` 참조를 받아 비동기로 실행됩니다.
//!
//! 검증(임계값 변환, 중복 검사)은 `services::alert_settings`가 먼저 합니다.
//! 동시에 들어온 같은 종류의 생성은 `(user_id, alert_type)` 유니크 인덱스가 막고,
//! 여기서 `Conflict`로 바꿔 돌려줍니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

/// 모든 SELECT가 같은 컬럼 순서를 쓰도록 한 곳에 모아둡니다.
const SETTING_COLUMNS: &str =
    "id, user_id, alert_type, condition, threshold, unit, active, created_at, updated_at";

/// 사용자의 모든 알림 설정을 조회합니다. 활성 여부로 거르지 않습니다.
pub async fn list_alert_settings(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<AlertSetting>, AppError> {
    let settings = sqlx::query_as::<_, AlertSetting>(&format!(
        "SELECT {SETTING_COLUMNS} FROM alert_settings WHERE user_id = ? ORDER BY created_at, id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(settings)
}

/// ID로 알림 설정 하나를 조회합니다.
pub async fn get_alert_setting(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<AlertSetting>, AppError> {
    let setting = sqlx::query_as::<_, AlertSetting>(&format!(
        "SELECT {SETTING_COLUMNS} FROM alert_settings WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(setting)
}

/// 사용자가 같은 종류의 설정을 이미 가지고 있는지 확인할 때 씁니다.
pub async fn find_alert_setting_by_type(
    pool: &SqlitePool,
    user_id: &str,
    kind: AlertType,
) -> Result<Option<AlertSetting>, AppError> {
    let setting = sqlx::query_as::<_, AlertSetting>(&format!(
        "SELECT {SETTING_COLUMNS} FROM alert_settings WHERE user_id = ? AND alert_type = ? LIMIT 1"
    ))
    .bind(user_id)
    .bind(kind.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(setting)
}

/// 새 알림 설정을 저장하고 저장된 행을 반환합니다.
///
/// 단위(unit)는 종류에서 결정되므로 인자로 받지 않습니다.
/// 같은 사용자의 같은 종류가 이미 있으면 `AppError::Conflict`입니다.
pub async fn create_alert_setting(
    pool: &SqlitePool,
    user_id: &str,
    kind: AlertType,
    condition: Condition,
    threshold: f64,
    active: bool,
) -> Result<AlertSetting, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO alert_settings (id, user_id, alert_type, condition, threshold, unit, active)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(kind.as_str())
    .bind(condition.as_str())
    .bind(threshold)
    .bind(kind.unit())
    .bind(active)
    .execute(pool)
    .await
    .map_err(|e| {
        // (user_id, alert_type) 유니크 인덱스: 동시에 들어온 같은 종류의 생성 요청
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::Conflict(format!("Alert setting for {kind} already exists"));
            }
        }
        AppError::Database(e)
    })?;

    get_alert_setting(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created alert setting".to_string()))
}

/// 임계값과 활성 여부를 부분 업데이트합니다.
///
/// `COALESCE(?, column)`: 바인딩한 값이 NULL(None)이면 기존 값을 유지합니다.
/// 한 번의 UPDATE로 처리하므로 두 필드가 함께 바뀌거나 둘 다 그대로입니다.
///
/// ## 반환값
/// - `Ok(Some(AlertSetting))`: 업데이트 후의 설정
/// - `Ok(None)`: 해당 ID의 설정이 없음
pub async fn update_alert_setting(
    pool: &SqlitePool,
    id: &str,
    threshold: Option<f64>,
    active: Option<bool>,
) -> Result<Option<AlertSetting>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE alert_settings
        SET threshold = COALESCE(?, threshold),
            active = COALESCE(?, active),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(threshold)
    .bind(active)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_alert_setting(pool, id).await
}

/// ID로 알림 설정을 삭제합니다 (하드 삭제).
///
/// 이 설정으로 생긴 로그는 `ON DELETE SET NULL`로 남고 참조만 지워집니다.
pub async fn delete_alert_setting(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM alert_settings WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 사용자의 모든 설정의 활성 여부를 한 문장으로 바꿉니다.
///
/// 단일 UPDATE 문이므로 일부만 바뀌는 경우는 없습니다. 바뀐 행 수를 반환합니다.
pub async fn set_user_alerts_active(
    pool: &SqlitePool,
    user_id: &str,
    active: bool,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE alert_settings
        SET active = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE user_id = ?
        "#,
    )
    .bind(active)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// 모든 사용자의 활성 설정을 소유자의 지역과 함께 한 번에 읽습니다.
///
/// 스케줄러의 주 읽기 경로입니다. 지역이 없는 사용자도 결과에 포함되며
/// (LEFT JOIN), 지역 검사는 스케줄러가 설정별로 합니다.
///
/// ```text
/// alert_settings ──→ users ──→ locations
///     (active = 1)     (1)      (0..1)
/// ```
pub async fn list_active_alert_settings(
    pool: &SqlitePool,
) -> Result<Vec<ActiveAlertSetting>, AppError> {
    let settings = sqlx::query_as::<_, ActiveAlertSetting>(
        r#"
        SELECT s.id, s.user_id, s.alert_type, s.condition, s.threshold,
               l.id AS location_id, l.sido, l.gugun, l.nx, l.ny
        FROM alert_settings s
        JOIN users u ON u.id = s.user_id
        LEFT JOIN locations l ON l.id = u.location_id
        WHERE s.active = 1
        ORDER BY s.user_id, s.created_at
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(settings)
}
