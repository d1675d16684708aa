//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 서비스(services/)와 라우트 핸들러(routes/)가 이 모듈의 함수를 호출합니다.
//!
//! 각 하위 모듈:
//! - `alert_settings`: 알림 설정 CRUD와 스케줄러용 활성 설정 조회
//! - `alert_logs`: 알림 로그 추가/조회 (추가 전용)
//! - `users`: 사용자 → 지역 조회
//! - `weather`: 지역별 현재 날씨와 대기질 저장/조회

pub mod alert_logs;
pub mod alert_settings;
pub mod users;
pub mod weather;

pub use alert_logs::*;
pub use alert_settings::*;
pub use users::*;
pub use weather::*;

/// 테스트용 인메모리 DB와 고정 데이터(fixture)
///
/// 인메모리 SQLite는 연결마다 별도 DB이므로 연결을 하나로 고정하고,
/// 유휴 연결이 닫혀 데이터가 사라지지 않도록 수명 제한을 끕니다.
#[cfg(test)]
pub mod testing {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    pub async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrations");
        pool
    }

    /// 여러 연결이 같은 DB를 보는 파일 기반 풀. 동시성 테스트용입니다.
    ///
    /// 인메모리 DB는 연결마다 따로라서 연결 간 경합을 재현할 수 없습니다.
    pub async fn file_pool(max_connections: u32) -> (SqlitePool, PathBuf) {
        let path = std::env::temp_dir().join(format!("nalssi-{}.db", uuid::Uuid::now_v7()));
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10));
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .expect("file sqlite");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrations");
        (pool, path)
    }

    /// `file_pool`이 만든 DB 파일과 WAL 부속 파일을 지웁니다.
    pub fn remove_file_db(path: &Path) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.as_os_str().to_owned();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }

    pub async fn insert_location(
        pool: &SqlitePool,
        id: i64,
        sido: &str,
        gugun: &str,
        nx: Option<i64>,
        ny: Option<i64>,
    ) {
        sqlx::query("INSERT INTO locations (id, sido, gugun, nx, ny) VALUES (?, ?, ?, ?, ?)")
            .bind(id)
            .bind(sido)
            .bind(gugun)
            .bind(nx)
            .bind(ny)
            .execute(pool)
            .await
            .expect("insert location");
    }

    pub async fn insert_user(pool: &SqlitePool, id: &str, location_id: Option<i64>) {
        sqlx::query("INSERT INTO users (id, username, location_id) VALUES (?, ?, ?)")
            .bind(id)
            .bind(format!("user-{id}"))
            .bind(location_id)
            .execute(pool)
            .await
            .expect("insert user");
    }
}
