//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `alert`: 알림 설정, 알림 로그, 실시간 알림 이벤트
//! - `user`: 사용자 → 지역 매핑
//! - `weather`: 지역별 현재 날씨와 대기질
//!
//! `pub use X::*;`로 재공개하여 `crate::models::AlertSetting`처럼 짧게 접근합니다.

pub mod alert;
pub mod user;
pub mod weather;

pub use alert::*;
pub use user::*;
pub use weather::*;
