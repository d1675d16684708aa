//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok", "live_channels": n }`
//!
//! 로드밸런서나 컨테이너 헬스체크용입니다. `live_channels`는 현재 열려 있는
//! 사용자별 실시간 채널 수로, 구독 정리가 제대로 되는지 확인할 때 씁니다.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::AppState;

/// `GET /health` — 서버 상태를 확인합니다. 실패하지 않습니다.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "live_channels": state.hub.channel_count()
    }))
}
