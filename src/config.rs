//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: Bearer 토큰 검증에 사용할 비밀키 (필수)
//! - `HOST` / `PORT`: 서버 바인딩 주소와 포트
//! - `ALERT_INTERVAL_SECS`: 알림 평가 주기 (기본 600초 = 10분)
//! - `ALERT_MAX_CONCURRENCY`: 한 번의 평가에서 동시에 처리할 설정 수
//! - `WEATHER_FETCH_TIMEOUT_SECS`: 날씨/대기질 조회 한 건의 제한 시간
//! - `NOTIFY_CHANNEL_CAPACITY`: 사용자별 실시간 채널의 버퍼 크기

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 파일 경로 (예: "sqlite:data/nalssi.db")
    pub database_url: String,
    /// JWT 토큰 검증에 사용하는 비밀키
    pub jwt_secret: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// 알림 스케줄러 실행 주기
    pub alert_interval: Duration,
    /// 설정별 평가 작업의 최대 동시 실행 수
    pub alert_max_concurrency: usize,
    /// 외부 날씨 조회 한 건당 제한 시간
    pub weather_fetch_timeout: Duration,
    /// 사용자별 broadcast 채널 용량
    pub notify_channel_capacity: usize,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있고, 파싱에 실패해도 기본값을 사용합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 3000),
            alert_interval: Duration::from_secs(parse_or("ALERT_INTERVAL_SECS", 600u64).max(1)),
            alert_max_concurrency: parse_or("ALERT_MAX_CONCURRENCY", 8usize).max(1),
            weather_fetch_timeout: Duration::from_secs(
                parse_or("WEATHER_FETCH_TIMEOUT_SECS", 10u64).max(1),
            ),
            notify_channel_capacity: parse_or("NOTIFY_CHANNEL_CAPACITY", 32usize).max(1),
        })
    }
}

/// 선택 환경변수를 읽어 파싱하고, 없거나 파싱에 실패하면 기본값을 돌려줍니다.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}
