//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 사용자 프로필을 저장하는 문서 저장소입니다.
//! 라우트 핸들러는 `ProfileStore` 트레이트를 통해서만 이 계층을 사용합니다.
//!
//! 하위 모듈:
//! - `profiles`: `users` 테이블 병합 저장/조회 쿼리

pub mod profiles;

pub use profiles::{ProfileStore, SqliteProfileStore};

use sqlx::SqlitePool;

/// 아직 적용되지 않은 마이그레이션(./migrations)을 순서대로 실행합니다.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
