//! # 사용자 프로필 저장소
//!
//! `users` 테이블에 프로필을 병합 저장(merge write)하는 쿼리 함수들입니다.
//!
//! ## 병합 규칙
//! ```text
//! 처음 저장 : 모든 필드 + created_at + updated_at
//! 다시 저장 : 지정한 필드 + updated_at   (created_at은 그대로)
//! ```
//! 타임스탬프는 SQLite의 `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`로 기록되는 서버 시각입니다.

use async_trait::async_trait; // 트레이트 객체(dyn ProfileStore)에서 async fn을 쓰기 위한 매크로
use sqlx::SqlitePool; // SQLite 연결 풀 (여러 연결을 재사용)

use crate::error::AppError;
use crate::models::{ProfileUpsert, UserProfileRecord};

/// 프로필 문서 저장소
///
/// main에서 한 번 만들어 `AppState`에 주입합니다.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// 내부 사용자 ID를 키로 프로필을 병합 저장합니다.
    async fn upsert_profile(&self, profile: &ProfileUpsert) -> Result<(), AppError>;

    /// 내부 사용자 ID로 프로필 하나를 조회합니다.
    async fn find_profile(&self, id: &str) -> Result<Option<UserProfileRecord>, AppError>;
}

/// SQLite 구현
#[derive(Clone)]
pub struct SqliteProfileStore {
    pool: SqlitePool,
}

impl SqliteProfileStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn upsert_profile(&self, profile: &ProfileUpsert) -> Result<(), AppError> {
        upsert_profile(&self.pool, profile).await
    }

    async fn find_profile(&self, id: &str) -> Result<Option<UserProfileRecord>, AppError> {
        find_profile(&self.pool, id).await
    }
}

/// 프로필을 병합 저장합니다.
///
/// `ON CONFLICT ... DO UPDATE`는 나열한 컬럼만 갱신하므로
/// `created_at`과 이후 추가될 다른 컬럼은 건드리지 않습니다.
/// email/nickname이 None이면 NULL을 명시적으로 기록합니다.
pub async fn upsert_profile(pool: &SqlitePool, profile: &ProfileUpsert) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, kakao_user_id, email, nickname, provider, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?,
                strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        ON CONFLICT(id) DO UPDATE SET
            kakao_user_id = excluded.kakao_user_id,
            email         = excluded.email,
            nickname      = excluded.nickname,
            provider      = excluded.provider,
            updated_at    = excluded.updated_at
        "#,
    )
    .bind(&profile.id)
    .bind(&profile.kakao_user_id)
    .bind(profile.email.as_deref()) // None이면 SQL NULL
    .bind(profile.nickname.as_deref())
    .bind(profile.provider)
    .execute(pool)
    .await?;

    Ok(())
}

/// 내부 사용자 ID로 프로필을 조회합니다.
pub async fn find_profile(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<UserProfileRecord>, AppError> {
    let record = sqlx::query_as::<_, UserProfileRecord>(
        r#"
        SELECT id, kakao_user_id, email, nickname, provider, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}
