//! # 실시간 알림 전송(Fan-out) 서비스
//!
//! 사용자 ID → broadcast 채널 맵을 관리합니다.
//! 저장하지 않는 최선 노력(best-effort) 전송이며, 영구 기록은 `alert_logs`가 담당합니다.
//!
//! ## 채널 수명
//! ```text
//! subscribe() ─→ [채널 생성(없으면)] ─→ 구독자 연결 해제 ─→ [채널 제거]
//! ```
//! - 구독자가 없을 때 보낸 이벤트는 조용히 버려집니다 (버퍼링/재시도 없음).
//! - 채널은 `subscribe()`만 만듭니다. push는 채널을 만들지 않고, 수신자가 없는 채널을
//!   만나면 그 자리에서 제거합니다. 구독 없이 push만 받는 사용자가 맵에 쌓이지 않습니다.
//!
//! 맵은 `std::sync::Mutex`로 보호합니다. 잠금 구간에 `.await`가 없으므로
//! 비동기 Mutex가 필요하지 않고, `Drop`에서도 잠글 수 있습니다.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast::{self, error::RecvError};

use crate::models::AlertEvent;

type ChannelMap = HashMap<String, broadcast::Sender<AlertEvent>>;

pub struct NotificationHub {
    channels: Mutex<ChannelMap>,
    capacity: usize,
}

impl NotificationHub {
    /// `capacity`: 사용자별 채널이 느린 구독자를 위해 쌓아둘 수 있는 이벤트 수
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// 잠금이 오염(poisoned)되어도 맵 자체는 일관된 상태이므로 그대로 사용합니다.
    fn channels(&self) -> MutexGuard<'_, ChannelMap> {
        self.channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 사용자의 실시간 알림 스트림을 구독합니다. 채널이 없으면 새로 만듭니다.
    ///
    /// 반환된 `Subscription`이 drop되면(클라이언트 연결 해제) 채널 정리가 시도됩니다.
    pub fn subscribe(self: &Arc<Self>, user_id: &str) -> Subscription {
        let receiver = self
            .channels()
            .entry(user_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();

        tracing::debug!(user_id, "Alert stream subscriber attached");

        Subscription {
            receiver,
            hub: Arc::clone(self),
            user_id: user_id.to_string(),
        }
    }

    /// 사용자에게 이벤트를 보냅니다. 전달받은 구독자 수를 반환합니다.
    ///
    /// 구독자가 없으면 0을 반환하고 이벤트는 버려집니다.
    pub fn push(&self, user_id: &str, event: AlertEvent) -> usize {
        let mut channels = self.channels();
        let Some(sender) = channels.get(user_id) else {
            tracing::debug!(user_id, "No alert stream for user, event dropped");
            return 0;
        };

        // send()는 수신자가 하나도 없을 때만 Err를 반환합니다
        match sender.send(event) {
            Ok(delivered) => delivered,
            Err(_) => {
                channels.remove(user_id);
                tracing::debug!(user_id, "No live subscriber, alert event dropped and channel removed");
                0
            }
        }
    }

    /// 현재 맵에 있는 채널 수
    pub fn channel_count(&self) -> usize {
        self.channels().len()
    }

    /// 구독 해제 시 호출됩니다. 떠나는 구독자가 마지막이면 채널을 제거합니다.
    ///
    /// 호출 시점에 떠나는 구독자의 수신자가 아직 살아 있으므로 1 이하를 기준으로 봅니다.
    fn release(&self, user_id: &str) {
        let mut channels = self.channels();
        let last = channels
            .get(user_id)
            .is_some_and(|sender| sender.receiver_count() <= 1);
        if last {
            channels.remove(user_id);
            tracing::debug!(user_id, "Alert stream closed, channel removed");
        }
    }
}

/// 한 사용자의 실시간 알림 구독
pub struct Subscription {
    receiver: broadcast::Receiver<AlertEvent>,
    hub: Arc<NotificationHub>,
    user_id: String,
}

impl Subscription {
    /// 다음 이벤트를 기다립니다. 채널이 닫히면 None.
    ///
    /// 구독자가 너무 느려 버퍼가 넘치면 놓친 이벤트는 건너뛰고 계속 받습니다.
    pub async fn recv(&mut self) -> Option<AlertEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(user_id = %self.user_id, skipped, "Alert subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.release(&self.user_id);
    }
}
