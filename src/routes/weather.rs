//! # 날씨 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/weather/current` → 현재 사용자 지역의 통합 스냅샷
//! - `PUT /api/v1/weather/forecasts` → (수집기) 지역의 현재 날씨 저장
//! - `PUT /api/v1/weather/air-quality/{location_id}` → (수집기) 지역의 대기질 저장
//!
//! 외부 공공 API에서 데이터를 모으는 수집기는 이 서버 밖에 있고,
//! 수집한 결과를 PUT 엔드포인트로 밀어 넣습니다.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    db,
    error::AppError,
    middleware::AuthUser,
    models::*,
    routes::AppState,
    services::weather::fetch_snapshot,
};

/// `GET /weather/current` → `{ "region": {...}, "weather": {...} }`
///
/// 예보와 대기질은 스케줄러와 같은 방식으로 따로 조회하므로,
/// 한쪽이 없으면 해당 필드만 null입니다.
pub async fn current_weather(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let region = db::find_user_location(&state.pool, &auth.user_id)
        .await?
        .ok_or(AppError::NotFound)?
        .region()
        .ok_or_else(|| AppError::BadRequest("User has no complete region registered".to_string()))?;

    let snapshot = fetch_snapshot(state.weather.as_ref(), &region, state.fetch_timeout).await;
    Ok(Json(json!({ "region": region, "weather": snapshot })))
}

/// `PUT /weather/forecasts` + `{ "sido": "...", "gugun": "...", "temperature": 21.5, ... }`
pub async fn store_forecast(
    State(state): State<AppState>,
    Json(reading): Json<ForecastReading>,
) -> Result<Json<Forecast>, AppError> {
    if reading.sido.trim().is_empty() {
        return Err(AppError::BadRequest("sido is required".to_string()));
    }
    let forecast = db::upsert_forecast(&state.pool, &reading).await?;
    tracing::debug!(sido = %forecast.sido, gugun = %forecast.gugun, "Forecast stored");
    Ok(Json(forecast))
}

/// `PUT /weather/air-quality/{location_id}` + `{ "pm10_value": "45", ... }`
///
/// 등록되지 않은 지역 ID면 404입니다.
pub async fn store_air_quality(
    State(state): State<AppState>,
    Path(location_id): Path<i64>,
    Json(reading): Json<AirQualityReading>,
) -> Result<Json<AirQuality>, AppError> {
    if !db::location_exists(&state.pool, location_id).await? {
        return Err(AppError::NotFound);
    }
    let air = db::upsert_air_quality(&state.pool, location_id, &reading).await?;
    tracing::debug!(location_id, "Air quality stored");
    Ok(Json(air))
}

#[cfg(test)]
mod tests {
    use crate::db;
    use crate::routes::testing::{send, state};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn ingest_then_read_current_weather() {
        let state = state().await;
        db::testing::insert_location(&state.pool, 1, "서울특별시", "강남구", Some(61), Some(126))
            .await;
        db::testing::insert_user(&state.pool, "u1", Some(1)).await;

        let (status, _) = send(
            &state,
            Method::PUT,
            "/weather/forecasts",
            None,
            Some(json!({ "sido": "서울특별시", "gugun": "강남구", "temperature": 21.5 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &state,
            Method::PUT,
            "/weather/air-quality/1",
            None,
            Some(json!({ "pm10_value": 45, "data_time": "2026-10-16 10:00" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pm10_value"], "45");

        let (status, body) = send(&state, Method::GET, "/weather/current", Some("u1"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["region"]["gugun"], "강남구");
        assert_eq!(body["weather"]["temperature"], 21.5);
        assert_eq!(body["weather"]["pm10"], 45.0);
        assert!(body["weather"]["humidity"].is_null());
    }

    #[tokio::test]
    async fn ingest_rejects_unknown_location_and_blank_sido() {
        let state = state().await;
        let (status, _) = send(
            &state,
            Method::PUT,
            "/weather/air-quality/42",
            None,
            Some(json!({ "pm10_value": "-" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &state,
            Method::PUT,
            "/weather/forecasts",
            None,
            Some(json!({ "sido": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn current_weather_needs_complete_region() {
        let state = state().await;
        db::testing::insert_user(&state.pool, "drifter", None).await;

        let (status, _) = send(&state, Method::GET, "/weather/current", Some("drifter"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&state, Method::GET, "/weather/current", Some("ghost"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
