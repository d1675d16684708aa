//! # 알림 모델 정의
//!
//! 알림 설정(AlertSetting), 알림 로그(AlertLog), 실시간 알림 이벤트(AlertEvent)와
//! 이들을 만들고 수정할 때 클라이언트가 보내는 요청 본문을 정의합니다.
//!
//! ## 구조체 역할
//! - `AlertType`, `Condition`: 닫힌 열거형. 경계(API 입력)에서 문자열을 파싱합니다.
//! - `Threshold`: 숫자 또는 문자열로 들어오는 임계값 입력
//! - `AlertSetting`: `alert_settings` 테이블 한 행
//! - `ActiveAlertSetting`: 스케줄러가 한 번에 읽는 활성 설정 + 소유자 지역
//! - `AlertLog`: `alert_logs` 테이블 한 행 (추가 전용)
//! - `AlertEvent`: 실시간 채널로 전송되는 알림

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Region;

/// 알림 종류: 어떤 측정값을 감시할지 결정합니다.
///
/// JSON과 DB에는 `TEMPERATURE`, `HUMIDITY`, `WIND`, `AIRQUALITY`로 저장됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertType {
    Temperature,
    Humidity,
    Wind,
    AirQuality,
}

impl AlertType {
    pub const ALL: [AlertType; 4] = [
        AlertType::Temperature,
        AlertType::Humidity,
        AlertType::Wind,
        AlertType::AirQuality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "TEMPERATURE",
            Self::Humidity => "HUMIDITY",
            Self::Wind => "WIND",
            Self::AirQuality => "AIRQUALITY",
        }
    }

    /// 종류별 고정 단위. 사용자가 따로 지정할 수 없습니다.
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
            Self::Wind => "m/s",
            Self::AirQuality => "μg/m³",
        }
    }

    /// 알림 메시지에 쓰이는 한국어 이름
    pub fn label(&self) -> &'static str {
        match self {
            Self::Temperature => "기온",
            Self::Humidity => "습도",
            Self::Wind => "풍속",
            Self::AirQuality => "미세먼지",
        }
    }
}

impl FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown alert type: {s}"))
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 비교 조건: 실제 값이 임계값보다 높은지, 낮은지, 같은지
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Above,
    Below,
    Equal,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::Below => "below",
            Self::Equal => "equal",
        }
    }

    /// 메시지용 표현: above → "이상", below → "이하", equal → "같음"
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::Above => "이상",
            Self::Below => "이하",
            Self::Equal => "같음",
        }
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "above" => Ok(Self::Above),
            "below" => Ok(Self::Below),
            "equal" => Ok(Self::Equal),
            _ => Err(format!("unknown condition: {s}")),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 임계값 입력: `30`, `"30"`, `"보통"`처럼 숫자나 문자열로 들어옵니다.
///
/// `#[serde(untagged)]`: JSON 값의 모양(숫자/문자열)만 보고 variant를 고릅니다.
/// 어떤 숫자로 저장할지는 알림 종류에 따라 `services::threshold::resolve`가 결정합니다.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Number(f64),
    Text(String),
}

/// 알림 설정 엔티티 — DB의 `alert_settings` 테이블 한 행에 대응합니다.
///
/// `alert_type`과 `condition`은 DB 원문 문자열 그대로 보관합니다.
/// 파싱할 수 없는 값이 저장되어 있어도 목록 조회는 실패하지 않고,
/// 스케줄러가 해당 설정만 건너뜁니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AlertSetting {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub condition: String,
    /// 항상 숫자로 저장됩니다 (대기질 등급은 하한값으로 변환됨)
    pub threshold: f64,
    pub unit: String,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl AlertSetting {
    pub fn kind(&self) -> Option<AlertType> {
        self.alert_type.parse().ok()
    }
}

/// 알림 설정 생성 요청 — `POST /api/v1/alerts/settings`
///
/// `type`은 문자열로 받아서 직접 파싱합니다.
/// serde 열거형으로 받으면 알 수 없는 값이 400이 아닌 422로 거절되기 때문입니다.
#[derive(Debug, Deserialize)]
pub struct CreateAlertSettingRequest {
    #[serde(rename = "type")]
    pub alert_type: String,
    pub threshold: Threshold,
    /// 생략하면 "above"
    pub condition: Option<String>,
    /// 생략하면 true
    pub active: Option<bool>,
}

/// 알림 설정 수정 요청 — `PATCH /api/v1/alerts/settings/{id}`
///
/// 종류(type)와 단위(unit)는 생성 후 바꿀 수 없으므로 필드가 없습니다.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAlertSettingRequest {
    pub threshold: Option<Threshold>,
    pub active: Option<bool>,
}

/// 전체 켜기/끄기 요청 — `POST /api/v1/alerts/toggle`
#[derive(Debug, Deserialize)]
pub struct ToggleAlertsRequest {
    pub active: bool,
}

/// 스케줄러의 주 읽기 경로: 활성 설정 + 소유자 + 소유자의 지역을 한 번에 읽은 행
///
/// 지역은 LEFT JOIN이므로 모든 지역 컬럼이 Option입니다.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActiveAlertSetting {
    pub id: String,
    pub user_id: String,
    pub alert_type: String,
    pub condition: String,
    pub threshold: f64,
    pub location_id: Option<i64>,
    pub sido: Option<String>,
    pub gugun: Option<String>,
    pub nx: Option<i64>,
    pub ny: Option<i64>,
}

impl ActiveAlertSetting {
    /// 평가에 쓸 수 있는 완전한 지역 정보. 시/도가 비었거나 격자 좌표가 없으면 None.
    pub fn region(&self) -> Option<Region> {
        Region::from_columns(
            self.location_id,
            self.sido.as_deref(),
            self.gugun.as_deref(),
            self.nx,
            self.ny,
        )
    }
}

/// 알림 로그 엔티티 — `alert_logs` 테이블 한 행
///
/// 타입/단위/메시지는 트리거 시점의 사본이라, 설정이 바뀌거나 삭제되어도 의미가 유지됩니다.
/// 설정이 삭제되면 `alert_setting_id`만 NULL이 됩니다.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AlertLog {
    pub id: String,
    pub user_id: String,
    pub alert_setting_id: Option<String>,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub actual_value: f64,
    pub unit: String,
    pub message: String,
    pub created_at: String,
}

/// 로그 조회 응답: 로그 + (남아 있다면) 연결된 알림 설정
#[derive(Debug, Clone, Serialize)]
pub struct AlertLogWithSetting {
    #[serde(flatten)]
    pub log: AlertLog,
    pub alert_setting: Option<AlertSetting>,
}

/// 실시간 채널로 전송되는 알림 이벤트 (저장되지 않음)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    pub message: String,
    pub actual_value: Option<f64>,
    pub unit: Option<String>,
    pub created_at: String,
}

impl AlertEvent {
    pub fn from_log(log: &AlertLog) -> Self {
        Self {
            id: log.id.clone(),
            alert_type: Some(log.alert_type.clone()),
            message: log.message.clone(),
            actual_value: Some(log.actual_value),
            unit: Some(log.unit.clone()),
            created_at: log.created_at.clone(),
        }
    }

    /// 테스트 전송용: 메시지만 있는 이벤트
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            alert_type: None,
            message: message.into(),
            actual_value: None,
            unit: None,
            created_at: chrono::Utc::now()
                .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                .to_string(),
        }
    }
}

/// 테스트 알림 전송 요청 — `POST /api/v1/alerts/test/{user_id}`
#[derive(Debug, Deserialize)]
pub struct TestAlertRequest {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(sido: Option<&str>, nx: Option<i64>, ny: Option<i64>) -> ActiveAlertSetting {
        ActiveAlertSetting {
            id: "s1".into(),
            user_id: "u1".into(),
            alert_type: "TEMPERATURE".into(),
            condition: "above".into(),
            threshold: 30.0,
            location_id: Some(1),
            sido: sido.map(String::from),
            gugun: Some("강남구".into()),
            nx,
            ny,
        }
    }

    #[test]
    fn alert_type_parses_wire_names() {
        assert_eq!("AIRQUALITY".parse::<AlertType>(), Ok(AlertType::AirQuality));
        assert_eq!("WIND".parse::<AlertType>(), Ok(AlertType::Wind));
        assert!("airquality".parse::<AlertType>().is_err());
        assert_eq!(
            serde_json::to_string(&AlertType::AirQuality).unwrap(),
            "\"AIRQUALITY\""
        );
    }

    #[test]
    fn units_follow_type() {
        assert_eq!(AlertType::Temperature.unit(), "°C");
        assert_eq!(AlertType::Humidity.unit(), "%");
        assert_eq!(AlertType::Wind.unit(), "m/s");
        assert_eq!(AlertType::AirQuality.unit(), "μg/m³");
    }

    #[test]
    fn threshold_accepts_number_or_string() {
        let n: Threshold = serde_json::from_str("30").unwrap();
        let s: Threshold = serde_json::from_str("\"보통\"").unwrap();
        assert_eq!(n, Threshold::Number(30.0));
        assert_eq!(s, Threshold::Text("보통".into()));
    }

    #[test]
    fn region_requires_sido_and_grid() {
        assert!(active(Some("서울특별시"), Some(61), Some(126)).region().is_some());
        assert!(active(None, Some(61), Some(126)).region().is_none());
        assert!(active(Some("  "), Some(61), Some(126)).region().is_none());
        assert!(active(Some("서울특별시"), None, Some(126)).region().is_none());
        assert!(active(Some("서울특별시"), Some(61), None).region().is_none());
    }
}
