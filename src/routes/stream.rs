//! # 실시간 알림 스트림 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET  /api/v1/alerts/stream/{user_id}` → SSE 구독 (이벤트 이름: `alert`)
//! - `POST /api/v1/alerts/test/{user_id}`   → 임의 메시지 전송 (운영/디버그용)
//! - `POST /api/v1/alerts/run`              → 스케줄러를 지금 한 번 실행 (운영/디버그용)
//!
//! 브라우저 `EventSource`는 헤더를 붙일 수 없으므로 스트림은 경로의 사용자 ID로 구독합니다.
//!
//! ## SSE 흐름
//! ```text
//! 클라이언트 연결 → hub.subscribe() → [이벤트 대기 ↔ 전송 반복] → 연결 종료 → Subscription drop → 채널 정리
//! ```
//! 이벤트가 없는 동안에는 keep-alive 주석을 보내 프록시가 연결을 끊지 않게 합니다.

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::stream::{self, Stream};
use serde_json::{json, Value};

use crate::{error::AppError, models::*, routes::AppState, services::RunSummary};

/// 알림 이벤트 하나를 SSE 프레임으로 바꿉니다.
fn to_sse_event(event: &AlertEvent) -> Event {
    Event::default()
        .event("alert")
        .id(event.id.clone())
        .json_data(event)
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to serialize alert event");
            Event::default().comment("serialization failed")
        })
}

/// `GET /alerts/stream/{user_id}` — 사용자의 실시간 알림을 구독합니다.
///
/// `stream::unfold`: 구독(Subscription)을 상태로 들고 다니며 다음 이벤트를 하나씩 꺼냅니다.
/// 클라이언트가 끊으면 axum이 스트림을 drop하고, 그와 함께 구독도 해제됩니다.
pub async fn subscribe(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.hub.subscribe(&user_id);

    let events = stream::unfold(subscription, |mut subscription| async move {
        let event = subscription.recv().await?;
        Some((Ok::<_, Infallible>(to_sse_event(&event)), subscription))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// `POST /alerts/test/{user_id}` + `{ "message": "..." }` → `{ "delivered": n }`
///
/// 로그를 남기지 않습니다. 구독자가 없으면 `delivered`는 0입니다.
pub async fn send_test_alert(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<TestAlertRequest>,
) -> Json<Value> {
    let delivered = state.hub.push(&user_id, AlertEvent::text(req.message));
    tracing::info!(%user_id, delivered, "Test alert pushed");
    Json(json!({ "delivered": delivered }))
}

/// `POST /alerts/run` — 주기를 기다리지 않고 한 번 실행합니다.
///
/// 주기 루프와 같은 스케줄러를 쓰므로, 실행 중이면 409를 돌려줍니다.
/// 클라이언트가 응답 전에 끊어도 실행은 끝까지 진행됩니다.
pub async fn run_now(State(state): State<AppState>) -> Result<Json<RunSummary>, AppError> {
    state
        .scheduler
        .run_now()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::Conflict("An alert run is already in progress".to_string()))
}
