//! # 날씨 조회 서비스
//!
//! 스케줄러와 `/weather/current`가 날씨를 읽는 경계(trait)입니다.
//! 실제 구현(`DbWeatherSource`)은 수집기가 채운 테이블을 읽고,
//! 테스트에서는 실패하는 구현을 끼워 넣어 설정별 격리를 확인합니다.
//!
//! `#[async_trait]`: `Arc<dyn WeatherSource>`처럼 트레이트 객체로 쓰기 위해 필요합니다.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{db, error::AppError, models::*};

#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// (시/도, 구/군)의 현재 날씨. 저장된 값이 없으면 `AppError::NotFound`.
    async fn forecast_by_region(&self, sido: &str, gugun: &str) -> Result<Forecast, AppError>;

    /// 지역 ID의 대기질. 저장된 값이 없으면 `AppError::NotFound`.
    async fn air_quality_by_location(&self, location_id: i64) -> Result<AirQuality, AppError>;
}

/// 날씨 데이터 저장소(SQLite)를 읽는 기본 구현
#[derive(Clone)]
pub struct DbWeatherSource {
    pool: SqlitePool,
}

impl DbWeatherSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WeatherSource for DbWeatherSource {
    async fn forecast_by_region(&self, sido: &str, gugun: &str) -> Result<Forecast, AppError> {
        db::get_forecast(&self.pool, sido, gugun)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn air_quality_by_location(&self, location_id: i64) -> Result<AirQuality, AppError> {
        db::get_air_quality(&self.pool, location_id)
            .await?
            .ok_or(AppError::NotFound)
    }
}

/// 예보와 대기질을 동시에, 서로 독립적으로 조회하여 스냅샷을 만듭니다.
///
/// 한쪽 조회가 실패하거나 제한 시간을 넘기면 그 부분만 비워 두고 경고를 남깁니다.
/// 다른 쪽 결과는 그대로 사용합니다.
pub async fn fetch_snapshot(
    source: &dyn WeatherSource,
    region: &Region,
    timeout: std::time::Duration,
) -> WeatherSnapshot {
    let (forecast, air) = tokio::join!(
        tokio::time::timeout(timeout, source.forecast_by_region(&region.sido, &region.gugun)),
        tokio::time::timeout(timeout, source.air_quality_by_location(region.location_id)),
    );

    let forecast = match forecast {
        Ok(Ok(forecast)) => Some(forecast),
        Ok(Err(e)) => {
            tracing::warn!(sido = %region.sido, gugun = %region.gugun, error = %e, "Forecast fetch failed");
            None
        }
        Err(_) => {
            tracing::warn!(sido = %region.sido, gugun = %region.gugun, "Forecast fetch timed out");
            None
        }
    };

    let air = match air {
        Ok(Ok(air)) => Some(air),
        Ok(Err(e)) => {
            tracing::warn!(location_id = region.location_id, error = %e, "Air quality fetch failed");
            None
        }
        Err(_) => {
            tracing::warn!(location_id = region.location_id, "Air quality fetch timed out");
            None
        }
    };

    WeatherSnapshot::combine(forecast.as_ref(), air.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing;
    use std::time::Duration;

    struct BrokenForecast {
        inner: DbWeatherSource,
    }

    #[async_trait]
    impl WeatherSource for BrokenForecast {
        async fn forecast_by_region(&self, _: &str, _: &str) -> Result<Forecast, AppError> {
            Err(AppError::Internal("upstream 503".into()))
        }

        async fn air_quality_by_location(&self, id: i64) -> Result<AirQuality, AppError> {
            self.inner.air_quality_by_location(id).await
        }
    }

    /// 대기질 응답이 오지 않는 소스
    struct StalledAirQuality {
        inner: DbWeatherSource,
    }

    #[async_trait]
    impl WeatherSource for StalledAirQuality {
        async fn forecast_by_region(&self, sido: &str, gugun: &str) -> Result<Forecast, AppError> {
            self.inner.forecast_by_region(sido, gugun).await
        }

        async fn air_quality_by_location(&self, _: i64) -> Result<AirQuality, AppError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(AppError::Internal("stalled".into()))
        }
    }

    fn region() -> Region {
        Region {
            location_id: 1,
            sido: "서울특별시".into(),
            gugun: "강남구".into(),
            nx: 61,
            ny: 126,
        }
    }

    #[tokio::test]
    async fn db_source_reports_missing_readings() {
        let pool = testing::pool().await;
        let source = DbWeatherSource::new(pool);
        assert!(matches!(
            source.forecast_by_region("서울특별시", "강남구").await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            source.air_quality_by_location(1).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn failed_half_leaves_other_half_intact() {
        let pool = testing::pool().await;
        testing::insert_location(&pool, 1, "서울특별시", "강남구", Some(61), Some(126)).await;
        db::upsert_air_quality(
            &pool,
            1,
            &AirQualityReading {
                pm10_value: Some(serde_json::json!("95")),
                pm25_value: None,
                data_time: None,
            },
        )
        .await
        .unwrap();

        let source = BrokenForecast {
            inner: DbWeatherSource::new(pool),
        };
        let snapshot = fetch_snapshot(&source, &region(), Duration::from_secs(1)).await;
        assert_eq!(snapshot.temperature, None);
        assert_eq!(snapshot.pm10, Some(95.0));
    }

    #[tokio::test]
    async fn timed_out_half_leaves_other_half_intact() {
        let pool = testing::pool().await;
        db::upsert_forecast(
            &pool,
            &ForecastReading {
                sido: "서울특별시".into(),
                gugun: "강남구".into(),
                temperature: Some(18.5),
                humidity: Some(40.0),
                wind_speed: None,
                precipitation_type: None,
                sky_condition: None,
            },
        )
        .await
        .unwrap();

        let source = StalledAirQuality {
            inner: DbWeatherSource::new(pool),
        };
        let started = std::time::Instant::now();
        let snapshot = fetch_snapshot(&source, &region(), Duration::from_millis(50)).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(snapshot.temperature, Some(18.5));
        assert_eq!(snapshot.humidity, Some(40.0));
        assert_eq!(snapshot.pm10, None);
    }
}
