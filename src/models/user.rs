//! # 사용자 지역 모델
//!
//! 사용자 계정 자체는 인증 시스템이 관리하고, 이 서버는 알림 평가에 필요한
//! 사용자 → 지역 매핑만 읽습니다.

use serde::{Deserialize, Serialize};

/// 사용자의 지역: 시/도(sido), 구/군(gugun), 예보 격자 좌표(nx, ny)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub location_id: i64,
    pub sido: String,
    pub gugun: String,
    pub nx: i64,
    pub ny: i64,
}

impl Region {
    /// LEFT JOIN으로 읽은 지역 컬럼들로부터 완전한 지역을 만듭니다.
    ///
    /// 지역이 없거나, 시/도가 비었거나, 격자 좌표(nx, ny) 중 하나라도 없으면 None.
    /// 구/군은 없어도 됩니다 (시/도 단위 지역).
    pub fn from_columns(
        location_id: Option<i64>,
        sido: Option<&str>,
        gugun: Option<&str>,
        nx: Option<i64>,
        ny: Option<i64>,
    ) -> Option<Self> {
        let sido = sido.map(str::trim).filter(|s| !s.is_empty())?;
        Some(Self {
            location_id: location_id?,
            sido: sido.to_string(),
            gugun: gugun.unwrap_or_default().trim().to_string(),
            nx: nx?,
            ny: ny?,
        })
    }
}

/// `users` ⟕ `locations` 조회 결과 한 행
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserLocationRow {
    pub location_id: Option<i64>,
    pub sido: Option<String>,
    pub gugun: Option<String>,
    pub nx: Option<i64>,
    pub ny: Option<i64>,
}

impl UserLocationRow {
    pub fn region(&self) -> Option<Region> {
        Region::from_columns(
            self.location_id,
            self.sido.as_deref(),
            self.gugun.as_deref(),
            self.nx,
            self.ny,
        )
    }
}
