//! # 서비스(비즈니스 로직) 모듈
//!
//! 라우트 핸들러와 DB 계층 사이에서 규칙을 적용하는 코드입니다.
//! - `alert_settings`: 알림 설정 검증과 등록/수정/삭제
//! - `threshold`: 임계값 입력 해석, 대기질 등급 변환
//! - `evaluator`: 트리거 여부 판단 (순수 함수)
//! - `weather`: 날씨 조회 경계(`WeatherSource`)와 스냅샷 조합
//! - `notifier`: 사용자별 실시간 채널
//! - `scheduler`: 주기 평가 루프

pub mod alert_settings;
pub mod evaluator;
pub mod notifier;
pub mod scheduler;
pub mod threshold;
pub mod weather;

pub use notifier::NotificationHub;
pub use scheduler::{AlertScheduler, RunSummary};
pub use weather::{DbWeatherSource, WeatherSource};
