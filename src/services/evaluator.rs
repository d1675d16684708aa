//! # 알림 조건 평가기
//!
//! (종류, 조건, 임계값, 실제 값) → 알림 여부를 결정하는 순수 함수입니다.
//! I/O도 부작용도 없으므로 스케줄러의 어느 지점에서든 호출할 수 있습니다.
//!
//! ## 규칙
//! - 실제 값이 없으면(None) 절대 알리지 않습니다.
//! - 기온/습도/풍속: above → `>`, below → `<`, equal → `==`
//! - 대기질: above → `>=` (등급 하한값은 경계 포함), below → `<`, equal → 알리지 않음

use crate::models::{AlertType, Condition};

pub fn should_trigger(
    kind: AlertType,
    condition: Condition,
    threshold: f64,
    actual: Option<f64>,
) -> bool {
    let Some(actual) = actual else {
        return false;
    };

    match kind {
        AlertType::Temperature | AlertType::Humidity | AlertType::Wind => match condition {
            Condition::Above => actual > threshold,
            Condition::Below => actual < threshold,
            Condition::Equal => actual == threshold,
        },
        AlertType::AirQuality => match condition {
            Condition::Above => actual >= threshold,
            Condition::Below => actual < threshold,
            Condition::Equal => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONDITIONS: [Condition; 3] = [Condition::Above, Condition::Below, Condition::Equal];
    const SAMPLES: [f64; 7] = [-10.0, 0.0, 29.999, 30.0, 30.001, 55.5, 150.0];

    #[test]
    fn numeric_types_compare_strictly() {
        for kind in [AlertType::Temperature, AlertType::Humidity, AlertType::Wind] {
            for t in SAMPLES {
                for a in SAMPLES {
                    assert_eq!(should_trigger(kind, Condition::Above, t, Some(a)), a > t);
                    assert_eq!(should_trigger(kind, Condition::Below, t, Some(a)), a < t);
                    assert_eq!(should_trigger(kind, Condition::Equal, t, Some(a)), a == t);
                }
            }
        }
    }

    #[test]
    fn air_quality_above_is_inclusive() {
        assert!(should_trigger(AlertType::AirQuality, Condition::Above, 80.0, Some(80.0)));
        assert!(!should_trigger(AlertType::AirQuality, Condition::Above, 80.0, Some(79.999)));
        assert!(should_trigger(AlertType::AirQuality, Condition::Below, 80.0, Some(79.999)));
        assert!(!should_trigger(AlertType::AirQuality, Condition::Below, 80.0, Some(80.0)));
        assert!(!should_trigger(AlertType::AirQuality, Condition::Equal, 80.0, Some(80.0)));
    }

    #[test]
    fn missing_value_never_triggers() {
        for kind in AlertType::ALL {
            for condition in CONDITIONS {
                for t in SAMPLES {
                    assert!(!should_trigger(kind, condition, t, None));
                }
            }
        }
    }
}
