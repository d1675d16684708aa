//! # 임계값 변환 서비스
//!
//! 대기질 등급 ↔ 숫자 변환과, API 경계에서 들어온 임계값 입력(`Threshold`)을
//! 저장용 숫자로 바꾸는 함수를 제공합니다.
//!
//! ## 대기질 등급표 (PM10, μg/m³)
//! | 등급 | 하한값 |
//! |------|--------|
//! | 좋음 | 0 |
//! | 보통 | 30 |
//! | 나쁨 | 80 |
//! | 매우 나쁨 | 150 |
//!
//! 하한값은 경계를 포함합니다. 정확히 80이면 "보통"이 아니라 "나쁨"입니다.

use crate::error::AppError;
use crate::models::{AlertType, Threshold};

/// (등급, 하한값) 표. 하한값 오름차순으로 정렬되어 있어야 합니다.
pub const AIR_QUALITY_GRADES: [(&str, f64); 4] = [
    ("좋음", 0.0),
    ("보통", 30.0),
    ("나쁨", 80.0),
    ("매우 나쁨", 150.0),
];

/// 등급 문자열을 하한값으로 바꿉니다. 알 수 없는 등급이면 None.
pub fn grade_to_value(grade: &str) -> Option<f64> {
    let grade = grade.trim();
    AIR_QUALITY_GRADES
        .iter()
        .find(|(label, _)| *label == grade)
        .map(|(_, floor)| *floor)
}

/// 측정값이 속한 등급. 하한값을 넘는 마지막 등급을 고릅니다.
///
/// 음수(이상치)는 가장 낮은 등급("좋음")으로 취급합니다.
pub fn value_to_grade(value: f64) -> &'static str {
    AIR_QUALITY_GRADES
        .iter()
        .rev()
        .find(|(_, floor)| value >= *floor)
        .map(|(label, _)| *label)
        .unwrap_or(AIR_QUALITY_GRADES[0].0)
}

/// API 경계에서 받은 임계값을 저장할 숫자로 확정합니다.
///
/// - `AIRQUALITY`: 네 가지 등급 문자열 중 하나여야 하고, 하한값으로 바뀝니다.
/// - 그 외: 유한한 숫자이거나 유한한 숫자로 파싱되는 문자열이어야 합니다.
///
/// 생성과 수정이 모두 이 함수를 거치므로 검증 규칙이 한 곳에만 있습니다.
pub fn resolve(kind: AlertType, input: &Threshold) -> Result<f64, AppError> {
    match (kind, input) {
        (AlertType::AirQuality, Threshold::Text(grade)) => grade_to_value(grade).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Air quality threshold must be one of 좋음, 보통, 나쁨, 매우 나쁨 (got {grade:?})"
            ))
        }),
        (AlertType::AirQuality, Threshold::Number(n)) => Err(AppError::BadRequest(format!(
            "Air quality threshold must be a grade name, not a number ({n})"
        ))),
        (_, Threshold::Number(n)) if n.is_finite() => Ok(*n),
        (_, Threshold::Number(n)) => Err(AppError::BadRequest(format!(
            "Threshold must be a finite number (got {n})"
        ))),
        (_, Threshold::Text(raw)) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| {
                AppError::BadRequest(format!("Threshold must be a number (got {raw:?})"))
            }),
    }
}

/// 메시지용 값 표현: 대기질은 등급 이름, 나머지는 숫자 + 단위
pub fn display_value(kind: AlertType, value: f64) -> String {
    match kind {
        AlertType::AirQuality => value_to_grade(value).to_string(),
        _ => format!("{}{}", value, kind.unit()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grades_round_trip_at_floors() {
        for (grade, floor) in AIR_QUALITY_GRADES {
            assert_eq!(grade_to_value(grade), Some(floor));
            assert_eq!(value_to_grade(grade_to_value(grade).unwrap()), grade);
        }
    }

    #[test]
    fn grade_floors_are_inclusive() {
        assert_eq!(value_to_grade(29.9), "좋음");
        assert_eq!(value_to_grade(30.0), "보통");
        assert_eq!(value_to_grade(79.999), "보통");
        assert_eq!(value_to_grade(80.0), "나쁨");
        assert_eq!(value_to_grade(149.0), "나쁨");
        assert_eq!(value_to_grade(150.0), "매우 나쁨");
        assert_eq!(value_to_grade(900.0), "매우 나쁨");
        assert_eq!(value_to_grade(-1.0), "좋음");
    }

    #[test]
    fn resolves_air_quality_grades_only() {
        let moderate = Threshold::Text("보통".into());
        assert_eq!(resolve(AlertType::AirQuality, &moderate).unwrap(), 30.0);
        assert!(matches!(
            resolve(AlertType::AirQuality, &Threshold::Text("아주 좋음".into())),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            resolve(AlertType::AirQuality, &Threshold::Number(30.0)),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn resolves_numeric_thresholds() {
        assert_eq!(
            resolve(AlertType::Temperature, &Threshold::Number(-5.5)).unwrap(),
            -5.5
        );
        assert_eq!(
            resolve(AlertType::Wind, &Threshold::Text(" 12.5 ".into())).unwrap(),
            12.5
        );
        assert!(matches!(
            resolve(AlertType::Temperature, &Threshold::Text("not-a-number".into())),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            resolve(AlertType::Humidity, &Threshold::Text("".into())),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            resolve(AlertType::Humidity, &Threshold::Text("NaN".into())),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn displays_values_by_type() {
        assert_eq!(display_value(AlertType::Temperature, 31.0), "31°C");
        assert_eq!(display_value(AlertType::Wind, 7.5), "7.5m/s");
        assert_eq!(display_value(AlertType::AirQuality, 95.0), "나쁨");
    }
}
