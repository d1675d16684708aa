//! # 날씨 데이터 저장소 쿼리 모듈
//!
//! 외부 수집기가 쓰고, 스케줄러와 `/weather/current`가 읽는 테이블입니다.
//! - `weather_forecasts`: (시/도, 구/군) 단위 현재 날씨
//! - `air_qualities`: 지역 ID 단위 대기질

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

pub async fn get_forecast(
    pool: &SqlitePool,
    sido: &str,
    gugun: &str,
) -> Result<Option<Forecast>, AppError> {
    let forecast = sqlx::query_as::<_, Forecast>(
        r#"
        SELECT sido, gugun, temperature, humidity, wind_speed,
               precipitation_type, sky_condition, updated_at
        FROM weather_forecasts
        WHERE sido = ? AND gugun = ?
        "#,
    )
    .bind(sido)
    .bind(gugun)
    .fetch_optional(pool)
    .await?;

    Ok(forecast)
}

/// 지역의 현재 날씨를 저장합니다. 이미 있으면 덮어씁니다.
///
/// `ON CONFLICT ... DO UPDATE`: SQLite의 UPSERT 구문.
/// `excluded.컬럼`은 새로 넣으려던 값을 가리킵니다.
pub async fn upsert_forecast(
    pool: &SqlitePool,
    reading: &ForecastReading,
) -> Result<Forecast, AppError> {
    let sido = reading.sido.trim();
    let gugun = reading.gugun.trim();

    sqlx::query(
        r#"
        INSERT INTO weather_forecasts
            (sido, gugun, temperature, humidity, wind_speed, precipitation_type, sky_condition)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(sido, gugun) DO UPDATE SET
            temperature = excluded.temperature,
            humidity = excluded.humidity,
            wind_speed = excluded.wind_speed,
            precipitation_type = excluded.precipitation_type,
            sky_condition = excluded.sky_condition,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#,
    )
    .bind(sido)
    .bind(gugun)
    .bind(reading.temperature)
    .bind(reading.humidity)
    .bind(reading.wind_speed)
    .bind(&reading.precipitation_type)
    .bind(&reading.sky_condition)
    .execute(pool)
    .await?;

    get_forecast(pool, sido, gugun)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve stored forecast".to_string()))
}

pub async fn get_air_quality(
    pool: &SqlitePool,
    location_id: i64,
) -> Result<Option<AirQuality>, AppError> {
    let air = sqlx::query_as::<_, AirQuality>(
        r#"
        SELECT location_id, pm10_value, pm25_value, data_time
        FROM air_qualities
        WHERE location_id = ?
        "#,
    )
    .bind(location_id)
    .fetch_optional(pool)
    .await?;

    Ok(air)
}

/// 지역의 대기질을 저장합니다. 이미 있으면 덮어씁니다.
pub async fn upsert_air_quality(
    pool: &SqlitePool,
    location_id: i64,
    reading: &AirQualityReading,
) -> Result<AirQuality, AppError> {
    sqlx::query(
        r#"
        INSERT INTO air_qualities (location_id, pm10_value, pm25_value, data_time)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(location_id) DO UPDATE SET
            pm10_value = excluded.pm10_value,
            pm25_value = excluded.pm25_value,
            data_time = excluded.data_time
        "#,
    )
    .bind(location_id)
    .bind(reading.pm10_text())
    .bind(reading.pm25_text())
    .bind(&reading.data_time)
    .execute(pool)
    .await?;

    get_air_quality(pool, location_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve stored air quality".to_string()))
}
