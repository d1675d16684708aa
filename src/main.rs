//! # 날씨 알림 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 연결 풀 생성과 마이그레이션
//! 4. 실시간 채널(NotificationHub), 날씨 조회, 스케줄러 조립
//! 5. 스케줄러를 백그라운드 태스크로 시작
//! 6. API 라우터 설정과 HTTP 서버 시작

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use config::Config;
use routes::AppState;
use services::{AlertScheduler, DbWeatherSource, NotificationHub, WeatherSource};
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 에러 없이 넘어갑니다
    dotenvy::dotenv().ok();

    // RUST_LOG가 없으면 이 크레이트와 HTTP 계층을 debug 레벨로 출력합니다
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nalssi_alert=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting alert server on {}:{}", config.host, config.port);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 공유 서비스 조립 ──
    // 스케줄러와 HTTP 핸들러가 같은 hub를 써야 스케줄러 알림이 SSE 구독자에게 도착합니다.
    let hub = Arc::new(NotificationHub::new(config.notify_channel_capacity));
    let weather: Arc<dyn WeatherSource> = Arc::new(DbWeatherSource::new(pool.clone()));
    let scheduler = Arc::new(AlertScheduler::new(
        pool.clone(),
        Arc::clone(&weather),
        Arc::clone(&hub),
        config.alert_interval,
        config.alert_max_concurrency,
        config.weather_fetch_timeout,
    ));

    // 주기 루프는 서버와 함께 계속 돌아갑니다. 프로세스 종료 시 함께 중단됩니다.
    tokio::spawn(Arc::clone(&scheduler).run());

    let state = AppState {
        pool,
        jwt_secret: config.jwt_secret.clone(),
        hub,
        weather,
        scheduler,
        fetch_timeout: config.weather_fetch_timeout,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api/v1", routes::api_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
