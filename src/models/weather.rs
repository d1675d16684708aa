//! # 날씨 모델 정의
//!
//! 외부 수집기가 저장한 지역별 현재 날씨(`Forecast`)와 대기질(`AirQuality`),
//! 그리고 둘을 합친 평가용 스냅샷(`WeatherSnapshot`)을 정의합니다.
//!
//! 이 서버는 데이터의 신선도를 검사하지 않습니다.
//! 수집기가 마지막으로 쓴 값이 곧 현재 값입니다.

use serde::{Deserialize, Serialize};

use super::AlertType;

/// 지역별 현재 날씨 — `weather_forecasts` 테이블 한 행
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Forecast {
    pub sido: String,
    pub gugun: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    /// 강수 형태 (없음/비/눈 등 원문 코드)
    pub precipitation_type: Option<String>,
    /// 하늘 상태 (맑음/구름많음/흐림 등 원문 코드)
    pub sky_condition: Option<String>,
    pub updated_at: String,
}

/// 수집기가 보내는 현재 날씨 — `PUT /api/v1/weather/forecasts`
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastReading {
    pub sido: String,
    #[serde(default)]
    pub gugun: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub precipitation_type: Option<String>,
    pub sky_condition: Option<String>,
}

/// 지역별 대기질 — `air_qualities` 테이블 한 행
///
/// 공공 API는 측정값을 문자열로 주고, 점검 중이면 `"-"`를 보냅니다.
/// 원문 그대로 저장하고 평가할 때 숫자로 바꿉니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AirQuality {
    pub location_id: i64,
    pub pm10_value: Option<String>,
    pub pm25_value: Option<String>,
    pub data_time: Option<String>,
}

impl AirQuality {
    /// PM10 측정값. 숫자로 읽을 수 없으면 None.
    pub fn pm10(&self) -> Option<f64> {
        parse_measurement(self.pm10_value.as_deref())
    }
}

/// 수집기가 보내는 대기질 — `PUT /api/v1/weather/air-quality/{location_id}`
///
/// 측정값은 숫자(`45`)나 문자열(`"45"`, `"-"`) 어느 쪽이든 받습니다.
#[derive(Debug, Clone, Deserialize)]
pub struct AirQualityReading {
    pub pm10_value: Option<serde_json::Value>,
    pub pm25_value: Option<serde_json::Value>,
    pub data_time: Option<String>,
}

impl AirQualityReading {
    pub fn pm10_text(&self) -> Option<String> {
        self.pm10_value.as_ref().map(measurement_text)
    }

    pub fn pm25_text(&self) -> Option<String> {
        self.pm25_value.as_ref().map(measurement_text)
    }
}

fn measurement_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_measurement(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// 평가용 통합 스냅샷
///
/// 예보와 대기질은 따로 조회되며, 한쪽 조회가 실패하면 그 부분만 None이 됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub precipitation_type: Option<String>,
    pub sky_condition: Option<String>,
    pub pm10: Option<f64>,
}

impl WeatherSnapshot {
    pub fn combine(forecast: Option<&Forecast>, air: Option<&AirQuality>) -> Self {
        Self {
            temperature: forecast.and_then(|f| f.temperature),
            humidity: forecast.and_then(|f| f.humidity),
            wind_speed: forecast.and_then(|f| f.wind_speed),
            precipitation_type: forecast.and_then(|f| f.precipitation_type.clone()),
            sky_condition: forecast.and_then(|f| f.sky_condition.clone()),
            pm10: air.and_then(AirQuality::pm10),
        }
    }

    /// 알림 종류에 해당하는 실제 측정값
    pub fn value_for(&self, kind: AlertType) -> Option<f64> {
        match kind {
            AlertType::Temperature => self.temperature,
            AlertType::Humidity => self.humidity,
            AlertType::Wind => self.wind_speed,
            AlertType::AirQuality => self.pm10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn air(pm10: Option<&str>) -> AirQuality {
        AirQuality {
            location_id: 1,
            pm10_value: pm10.map(String::from),
            pm25_value: None,
            data_time: None,
        }
    }

    #[test]
    fn pm10_parses_text_measurements() {
        assert_eq!(air(Some("45")).pm10(), Some(45.0));
        assert_eq!(air(Some(" 80 ")).pm10(), Some(80.0));
        assert_eq!(air(Some("-")).pm10(), None);
        assert_eq!(air(None).pm10(), None);
    }

    #[test]
    fn snapshot_keeps_available_half() {
        let snapshot = WeatherSnapshot::combine(None, Some(&air(Some("120"))));
        assert_eq!(snapshot.value_for(AlertType::AirQuality), Some(120.0));
        assert_eq!(snapshot.value_for(AlertType::Temperature), None);
    }

    #[test]
    fn reading_accepts_numbers_and_strings() {
        let reading: AirQualityReading =
            serde_json::from_str(r#"{"pm10_value": 45, "pm25_value": "-"}"#).unwrap();
        assert_eq!(reading.pm10_text().as_deref(), Some("45"));
        assert_eq!(reading.pm25_text().as_deref(), Some("-"));
    }
}
