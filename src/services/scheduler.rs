//! # 알림 스케줄러
//!
//! 일정 주기마다 모든 활성 알림 설정을 평가하고, 조건이 맞으면
//! 알림 로그를 남긴 뒤 실시간 채널로 전송합니다.
//!
//! ## 한 번의 실행(run) 흐름
//! ```text
//! 활성 설정 조회 ─┬─ 설정 1 ─→ 지역 확인 → 날씨 조회 → 평가 → 로그 저장 → 전송
//!                 ├─ 설정 2 ─→ ...
//!                 └─ 설정 N ─→ ...
//!                             (세마포어로 동시 실행 수 제한)
//! ```
//! - 설정마다 독립된 태스크로 처리합니다. 한 설정의 실패(패닉 포함)는 다른 설정에 영향이 없습니다.
//! - 로그 저장이 전송보다 먼저입니다. 로그 저장이 실패하면 그 설정의 전송도 하지 않습니다.
//! - 이전 실행이 끝나지 않았으면 새 실행은 건너뜁니다 (single-flight).
//! - 모든 결과는 `RunSummary`로 모여 반환되고 로그로 남습니다.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};

use crate::{
    db,
    error::AppError,
    models::*,
    services::{
        alert_settings, evaluator,
        notifier::NotificationHub,
        threshold,
        weather::{fetch_snapshot, WeatherSource},
    },
};

/// 설정 하나의 평가 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SettingStatus {
    /// 조건 충족: 로그를 남기고 `delivered`명의 구독자에게 전송함
    Triggered {
        log_id: String,
        actual_value: f64,
        delivered: usize,
    },
    /// 조건 불충족, 또는 실제 값이 없어 평가하지 않음
    NotTriggered { actual_value: Option<f64> },
    /// 지역 누락, 알 수 없는 종류/조건 등으로 평가 대상이 아님
    Skipped { reason: String },
    /// 로그 저장 실패, 태스크 패닉 등
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingOutcome {
    pub setting_id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub status: SettingStatus,
}

/// 한 번의 실행 요약
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub triggered: usize,
    pub not_triggered: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outcomes: Vec<SettingOutcome>,
}

impl RunSummary {
    fn record(&mut self, outcome: SettingOutcome) {
        self.total += 1;
        match outcome.status {
            SettingStatus::Triggered { .. } => self.triggered += 1,
            SettingStatus::NotTriggered { .. } => self.not_triggered += 1,
            SettingStatus::Skipped { .. } => self.skipped += 1,
            SettingStatus::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }
}

/// 설정별 태스크가 공유하는 의존성. 모두 복제 비용이 작습니다 (Arc / 풀 핸들).
#[derive(Clone)]
struct EvalContext {
    pool: SqlitePool,
    weather: Arc<dyn WeatherSource>,
    hub: Arc<NotificationHub>,
    fetch_timeout: Duration,
}

pub struct AlertScheduler {
    ctx: EvalContext,
    interval: Duration,
    max_concurrency: usize,
    running: AtomicBool,
}

/// 실행 중 플래그를 drop 시점에 내려 줍니다 (패닉이나 조기 반환에서도).
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl AlertScheduler {
    pub fn new(
        pool: SqlitePool,
        weather: Arc<dyn WeatherSource>,
        hub: Arc<NotificationHub>,
        interval: Duration,
        max_concurrency: usize,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            ctx: EvalContext {
                pool,
                weather,
                hub,
                fetch_timeout,
            },
            interval,
            max_concurrency: max_concurrency.max(1),
            running: AtomicBool::new(false),
        }
    }

    /// 주기 실행 루프. 서버가 종료될 때까지 돌아갑니다.
    ///
    /// 실행이 주기보다 오래 걸려 놓친 틱은 몰아서 실행하지 않고 건너뜁니다.
    pub async fn run(self: Arc<Self>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            max_concurrency = self.max_concurrency,
            "Alert scheduler started"
        );

        let mut tick = interval(self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tick.tick().await;
            match self.run_once().await {
                Ok(Some(_)) => {}
                Ok(None) => tracing::warn!("Previous alert run still in progress, skipping"),
                Err(e) => tracing::error!(error = %e, "Alert run failed to load settings"),
            }
        }
    }

    /// 별도 태스크에서 한 번 실행하고 그 결과를 기다립니다.
    ///
    /// 설정별 태스크는 `run_once`의 `JoinSet`에 묶여 있어서, `run_once`를 기다리던 쪽이
    /// 사라지면(예: HTTP 클라이언트 연결 끊김) 진행 중인 평가도 함께 중단됩니다.
    /// 실행을 독립된 태스크로 띄우면 호출자가 떠나도 끝까지 진행됩니다.
    pub async fn run_now(self: &Arc<Self>) -> Result<Option<RunSummary>, AppError> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.run_once().await })
            .await
            .map_err(|e| AppError::Internal(format!("Alert run task failed: {e}")))?
    }

    /// 한 번 실행합니다. 주기 루프처럼 실행 태스크를 직접 소유한 곳에서 부릅니다.
    ///
    /// ## 반환값
    /// - `Ok(Some(summary))`: 실행 완료
    /// - `Ok(None)`: 이전 실행이 아직 진행 중이라 건너뜀
    /// - `Err(...)`: 활성 설정 목록을 읽지 못함 (설정별 에러는 summary에 기록됨)
    pub async fn run_once(&self) -> Result<Option<RunSummary>, AppError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(None);
        }
        let _guard = RunGuard(&self.running);

        let settings = alert_settings::find_all_active(&self.ctx.pool).await?;
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();
        // 태스크가 패닉하면 JoinError에는 태스크 ID만 남으므로 설정 정보를 따로 보관합니다
        let mut owners = HashMap::new();

        for setting in settings {
            let ids = (setting.id.clone(), setting.user_id.clone());
            let ctx = self.ctx.clone();
            let semaphore = Arc::clone(&semaphore);

            let handle = tasks.spawn(async move {
                let status = match semaphore.acquire_owned().await {
                    Ok(_permit) => evaluate_setting(&ctx, &setting).await,
                    Err(_) => SettingStatus::Failed {
                        reason: "concurrency limiter closed".to_string(),
                    },
                };
                SettingOutcome {
                    setting_id: setting.id,
                    user_id: setting.user_id,
                    status,
                }
            });
            owners.insert(handle.id(), ids);
        }

        let mut summary = RunSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    let (setting_id, user_id) = owners.remove(&e.id()).unwrap_or_default();
                    tracing::error!(%setting_id, %user_id, error = %e, "Alert evaluation task panicked");
                    summary.record(SettingOutcome {
                        setting_id,
                        user_id,
                        status: SettingStatus::Failed {
                            reason: e.to_string(),
                        },
                    });
                }
            }
        }

        tracing::info!(
            total = summary.total,
            triggered = summary.triggered,
            not_triggered = summary.not_triggered,
            skipped = summary.skipped,
            failed = summary.failed,
            "Alert run finished"
        );
        Ok(Some(summary))
    }
}

/// 설정 하나를 평가합니다. 에러를 밖으로 내보내지 않고 결과 상태로 바꿉니다.
async fn evaluate_setting(ctx: &EvalContext, setting: &ActiveAlertSetting) -> SettingStatus {
    let Some(region) = setting.region() else {
        tracing::warn!(setting_id = %setting.id, user_id = %setting.user_id, "Owner has no usable region, skipping");
        return SettingStatus::Skipped {
            reason: "owner region missing or incomplete".to_string(),
        };
    };

    let Ok(kind) = setting.alert_type.parse::<AlertType>() else {
        tracing::warn!(setting_id = %setting.id, alert_type = %setting.alert_type, "Unknown alert type, skipping");
        return SettingStatus::Skipped {
            reason: format!("unknown alert type: {}", setting.alert_type),
        };
    };

    let Ok(condition) = setting.condition.parse::<Condition>() else {
        tracing::warn!(setting_id = %setting.id, condition = %setting.condition, "Unknown condition, skipping");
        return SettingStatus::Skipped {
            reason: format!("unknown condition: {}", setting.condition),
        };
    };

    let snapshot = fetch_snapshot(ctx.weather.as_ref(), &region, ctx.fetch_timeout).await;
    let actual = snapshot.value_for(kind);

    if actual.is_none() {
        tracing::warn!(setting_id = %setting.id, alert_type = %kind, "No current value for alert type");
    }

    if !evaluator::should_trigger(kind, condition, setting.threshold, actual) {
        return SettingStatus::NotTriggered {
            actual_value: actual,
        };
    }

    // should_trigger가 true면 actual은 항상 Some입니다
    let Some(actual) = actual else {
        return SettingStatus::NotTriggered { actual_value: None };
    };

    match notify(ctx, setting, kind, condition, actual).await {
        Ok(status) => status,
        Err(e) => {
            tracing::error!(setting_id = %setting.id, user_id = %setting.user_id, error = %e, "Failed to record alert");
            SettingStatus::Failed {
                reason: e.to_string(),
            }
        }
    }
}

/// 로그를 먼저 저장하고, 성공하면 실시간 채널로 보냅니다.
async fn notify(
    ctx: &EvalContext,
    setting: &ActiveAlertSetting,
    kind: AlertType,
    condition: Condition,
    actual: f64,
) -> Result<SettingStatus, AppError> {
    let message = compose_message(kind, condition, setting.threshold, actual);

    let log = db::create_alert_log(
        &ctx.pool,
        &setting.user_id,
        Some(&setting.id),
        actual,
        kind.unit(),
        &message,
        kind.as_str(),
    )
    .await?;

    let delivered = ctx.hub.push(&setting.user_id, AlertEvent::from_log(&log));
    tracing::info!(
        setting_id = %setting.id,
        user_id = %setting.user_id,
        alert_type = %kind,
        actual,
        delivered,
        "Alert triggered"
    );

    Ok(SettingStatus::Triggered {
        log_id: log.id,
        actual_value: actual,
        delivered,
    })
}

/// 사람이 읽는 알림 메시지
///
/// 예: `[기온] 현재 31°C (설정: 30°C 이상)`, `[미세먼지] 현재 나쁨 (설정: 보통 이상)`
pub fn compose_message(kind: AlertType, condition: Condition, threshold: f64, actual: f64) -> String {
    format!(
        "[{}] 현재 {} (설정: {} {})",
        kind.label(),
        threshold::display_value(kind, actual),
        threshold::display_value(kind, threshold),
        condition.phrase()
    )
}
