//! # 알림 로그 데이터베이스 쿼리 모듈
//!
//! `alert_logs`는 추가 전용(append-only) 테이블입니다.
//! 스케줄러만 행을 추가하며, 수정하거나 삭제하는 함수는 없습니다.
//! 중복 제거도 하지 않으므로 같은 조건이 매 주기마다 만족되면 매번 로그가 쌓입니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

/// 알림 로그를 한 건 추가하고 저장된 행을 반환합니다.
///
/// `created_at`은 DB의 DEFAULT 값으로 서버 시간이 기록됩니다.
pub async fn create_alert_log(
    pool: &SqlitePool,
    user_id: &str,
    alert_setting_id: Option<&str>,
    actual_value: f64,
    unit: &str,
    message: &str,
    alert_type: &str,
) -> Result<AlertLog, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO alert_logs (id, user_id, alert_setting_id, alert_type, actual_value, unit, message)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(alert_setting_id)
    .bind(alert_type)
    .bind(actual_value)
    .bind(unit)
    .bind(message)
    .execute(pool)
    .await?;

    get_alert_log(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created alert log".to_string()))
}

pub async fn get_alert_log(pool: &SqlitePool, id: &str) -> Result<Option<AlertLog>, AppError> {
    let log = sqlx::query_as::<_, AlertLog>(
        r#"
        SELECT id, user_id, alert_setting_id, alert_type, actual_value, unit, message, created_at
        FROM alert_logs
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(log)
}

/// 로그 + LEFT JOIN한 설정 컬럼. 설정이 삭제되었으면 `s_*` 컬럼이 모두 NULL입니다.
#[derive(sqlx::FromRow)]
struct AlertLogRow {
    #[sqlx(flatten)]
    log: AlertLog,
    s_id: Option<String>,
    s_user_id: Option<String>,
    s_alert_type: Option<String>,
    s_condition: Option<String>,
    s_threshold: Option<f64>,
    s_unit: Option<String>,
    s_active: Option<bool>,
    s_created_at: Option<String>,
    s_updated_at: Option<String>,
}

impl From<AlertLogRow> for AlertLogWithSetting {
    fn from(row: AlertLogRow) -> Self {
        let alert_setting = match (
            row.s_id,
            row.s_user_id,
            row.s_alert_type,
            row.s_condition,
            row.s_threshold,
            row.s_unit,
            row.s_active,
            row.s_created_at,
            row.s_updated_at,
        ) {
            (
                Some(id),
                Some(user_id),
                Some(alert_type),
                Some(condition),
                Some(threshold),
                Some(unit),
                Some(active),
                Some(created_at),
                Some(updated_at),
            ) => Some(AlertSetting {
                id,
                user_id,
                alert_type,
                condition,
                threshold,
                unit,
                active,
                created_at,
                updated_at,
            }),
            _ => None,
        };

        Self {
            log: row.log,
            alert_setting,
        }
    }
}

/// 사용자의 알림 로그를 최신순으로 조회합니다.
///
/// 같은 밀리초에 생긴 로그는 UUIDv7 ID의 역순으로 정렬해 순서를 고정합니다.
pub async fn list_alert_logs(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<AlertLogWithSetting>, AppError> {
    let rows = sqlx::query_as::<_, AlertLogRow>(
        r#"
        SELECT l.id, l.user_id, l.alert_setting_id, l.alert_type, l.actual_value,
               l.unit, l.message, l.created_at,
               s.id AS s_id, s.user_id AS s_user_id, s.alert_type AS s_alert_type,
               s.condition AS s_condition, s.threshold AS s_threshold, s.unit AS s_unit,
               s.active AS s_active, s.created_at AS s_created_at,
               s.updated_at AS s_updated_at
        FROM alert_logs l
        LEFT JOIN alert_settings s ON s.id = l.alert_setting_id
        WHERE l.user_id = ?
        ORDER BY l.created_at DESC, l.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AlertLogWithSetting::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_alert_setting, delete_alert_setting, testing};
    use std::time::Duration;

    #[tokio::test]
    async fn logs_survive_setting_deletion() {
        let pool = testing::pool().await;
        testing::insert_user(&pool, "u1", None).await;
        let setting =
            create_alert_setting(&pool, "u1", AlertType::Temperature, Condition::Above, 30.0, true)
                .await
                .unwrap();

        create_alert_log(&pool, "u1", Some(&setting.id), 31.0, "°C", "더움", "TEMPERATURE")
            .await
            .unwrap();

        let logs = list_alert_logs(&pool, "u1").await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].alert_setting.as_ref().unwrap().id, setting.id);

        assert!(delete_alert_setting(&pool, &setting.id).await.unwrap());

        let logs = list_alert_logs(&pool, "u1").await.unwrap();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].log.alert_setting_id.is_none());
        assert!(logs[0].alert_setting.is_none());
        assert_eq!(logs[0].log.actual_value, 31.0);
        assert_eq!(logs[0].log.message, "더움");
    }

    #[tokio::test]
    async fn logs_are_newest_first_and_scoped_to_user() {
        let pool = testing::pool().await;
        testing::insert_user(&pool, "u1", None).await;
        testing::insert_user(&pool, "u2", None).await;

        create_alert_log(&pool, "u1", None, 1.0, "%", "first", "HUMIDITY")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        create_alert_log(&pool, "u1", None, 2.0, "%", "second", "HUMIDITY")
            .await
            .unwrap();
        create_alert_log(&pool, "u2", None, 3.0, "%", "other", "HUMIDITY")
            .await
            .unwrap();

        let logs = list_alert_logs(&pool, "u1").await.unwrap();
        let messages: Vec<_> = logs.iter().map(|l| l.log.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
    }
}
