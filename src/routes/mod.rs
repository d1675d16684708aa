//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! Axum에서 핸들러는 HTTP 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 각 하위 모듈:
//! - `alerts`: 알림 설정 CRUD, 일괄 토글, 알림 로그 조회
//! - `stream`: 실시간 알림 구독(SSE), 테스트 전송, 수동 실행
//! - `weather`: 현재 날씨 조회와 수집기용 저장 엔드포인트
//! - `health`: 서버 상태 확인 (헬스체크)

pub mod alerts;
pub mod health;
pub mod stream;
pub mod weather;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use sqlx::SqlitePool;

use crate::services::{AlertScheduler, NotificationHub, WeatherSource};

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 스케줄러와 핸들러가 같은 `NotificationHub`를 공유해야 스케줄러의 알림이
/// SSE 구독자에게 전달됩니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀 (내부적으로 Arc로 공유)
    pub pool: SqlitePool,
    /// JWT 토큰 검증용 비밀키
    pub jwt_secret: String,
    /// 사용자별 실시간 알림 채널
    pub hub: Arc<NotificationHub>,
    /// 현재 날씨 조회 경계
    pub weather: Arc<dyn WeatherSource>,
    /// `POST /alerts/run`이 주기 루프와 같은 single-flight 플래그를 쓰도록 공유합니다
    pub scheduler: Arc<AlertScheduler>,
    /// 날씨 조회 한 건의 제한 시간
    pub fetch_timeout: Duration,
}

/// `/api/v1` 아래에 붙일 API 라우터를 만듭니다.
///
/// `{id}`: axum 0.8의 경로 파라미터 문법 (Path<String>으로 핸들러에서 추출)
pub fn api_router(state: AppState) -> Router {
    Router::new()
        // 알림 설정 CRUD
        .route(
            "/alerts/settings",
            get(alerts::list_settings).post(alerts::create_setting),
        )
        .route(
            "/alerts/settings/{id}",
            patch(alerts::update_setting).delete(alerts::delete_setting),
        )
        .route("/alerts/toggle", post(alerts::toggle_settings))
        .route("/alerts/logs", get(alerts::list_logs))
        // 실시간 구독과 운영용 엔드포인트
        .route("/alerts/stream/{user_id}", get(stream::subscribe))
        .route("/alerts/test/{user_id}", post(stream::send_test_alert))
        .route("/alerts/run", post(stream::run_now))
        // 날씨
        .route("/weather/current", get(weather::current_weather))
        .route("/weather/forecasts", put(weather::store_forecast))
        .route(
            "/weather/air-quality/{location_id}",
            put(weather::store_air_quality),
        )
        .route("/health", get(health::health_check))
        .with_state(state)
}

/// 라우터 테스트 공용 준비물
#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::db;
    use crate::middleware::auth::issue_test_token;
    use crate::services::DbWeatherSource;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    pub const SECRET: &str = "test-secret";

    pub async fn state() -> AppState {
        let pool = db::testing::pool().await;
        let hub = Arc::new(NotificationHub::new(8));
        let weather: Arc<dyn WeatherSource> = Arc::new(DbWeatherSource::new(pool.clone()));
        let scheduler = Arc::new(AlertScheduler::new(
            pool.clone(),
            Arc::clone(&weather),
            Arc::clone(&hub),
            Duration::from_secs(600),
            4,
            Duration::from_secs(2),
        ));
        AppState {
            pool,
            jwt_secret: SECRET.to_string(),
            hub,
            weather,
            scheduler,
            fetch_timeout: Duration::from_secs(2),
        }
    }

    pub fn token(user_id: &str) -> String {
        issue_test_token(user_id, SECRET, chrono::Duration::minutes(5))
    }

    /// 요청 하나를 보내고 (상태 코드, JSON 본문)을 돌려줍니다. 본문이 비었으면 Null.
    pub async fn send(
        state: &AppState,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(user)));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = api_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
