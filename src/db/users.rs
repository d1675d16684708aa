//! # 사용자 / 지역 조회 쿼리 모듈
//!
//! 계정은 인증 시스템이 만들고, 이 서버는 사용자 존재 여부와 사용자 → 지역 매핑만 읽습니다.

use crate::error::AppError;
use crate::models::UserLocationRow;
use sqlx::SqlitePool;

/// 사용자의 지역 컬럼. 사용자가 없으면 None, 지역이 없으면 지역 컬럼이 모두 NULL인 행.
pub async fn find_user_location(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Option<UserLocationRow>, AppError> {
    let row = sqlx::query_as::<_, UserLocationRow>(
        r#"
        SELECT l.id AS location_id, l.sido, l.gugun, l.nx, l.ny
        FROM users u
        LEFT JOIN locations l ON l.id = u.location_id
        WHERE u.id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn user_exists(pool: &SqlitePool, user_id: &str) -> Result<bool, AppError> {
    let found: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(found.is_some())
}

pub async fn location_exists(pool: &SqlitePool, location_id: i64) -> Result<bool, AppError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM locations WHERE id = ?")
        .bind(location_id)
        .fetch_optional(pool)
        .await?;

    Ok(found.is_some())
}
