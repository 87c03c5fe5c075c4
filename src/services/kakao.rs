//! # 카카오 액세스 토큰 검증 서비스
//!
//! 클라이언트가 보낸 카카오 액세스 토큰으로 카카오 사용자 정보 API를 호출하여
//! 토큰이 유효한지, 그리고 요청에 적힌 카카오 사용자 ID와 같은 계정인지 확인합니다.
//!
//! ## 엔드포인트
//! - `GET https://kapi.kakao.com/v2/user/me` (`Authorization: Bearer <token>`)
//!
//! 검증 없이 토큰을 발급하면 카카오 사용자 ID만 알아도 누구나
//! 그 사용자의 커스텀 토큰을 받을 수 있으므로, 기본 설정에서는 검증을 강제합니다.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// 카카오 검증 단계의 에러
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 카카오가 토큰을 거절함 (만료, 위조 등)
    #[error("카카오 토큰 검증 실패 (status {0})")]
    Rejected(StatusCode),

    /// 토큰은 유효하지만 다른 카카오 계정의 토큰임
    #[error("카카오 계정이 일치하지 않습니다 (expected {expected}, got {actual})")]
    AccountMismatch { expected: String, actual: String },

    /// 네트워크 장애, 타임아웃, 응답 파싱 실패
    #[error("카카오 API 호출 실패: {0}")]
    Transport(#[from] reqwest::Error),
}

/// `/v2/user/me` 응답 중 필요한 부분
#[derive(Debug, Clone, Deserialize)]
pub struct KakaoProfile {
    /// 카카오 회원번호
    pub id: i64,
    #[serde(default)]
    pub kakao_account: Option<KakaoAccount>,
    #[serde(default)]
    pub properties: Option<KakaoProperties>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KakaoAccount {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile: Option<KakaoAccountProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KakaoAccountProfile {
    #[serde(default)]
    pub nickname: Option<String>,
}

/// 구버전 앱에서 내려오는 사용자 속성
#[derive(Debug, Clone, Deserialize)]
pub struct KakaoProperties {
    #[serde(default)]
    pub nickname: Option<String>,
}

impl KakaoProfile {
    pub fn email(&self) -> Option<&str> {
        self.kakao_account
            .as_ref()
            .and_then(|account| account.email.as_deref())
    }

    /// 카카오계정 프로필의 닉네임, 없으면 사용자 속성의 닉네임
    pub fn nickname(&self) -> Option<&str> {
        self.kakao_account
            .as_ref()
            .and_then(|account| account.profile.as_ref())
            .and_then(|profile| profile.nickname.as_deref())
            .or_else(|| {
                self.properties
                    .as_ref()
                    .and_then(|props| props.nickname.as_deref())
            })
    }

    /// 요청의 카카오 사용자 ID와 이 프로필이 같은 계정인지 확인합니다.
    pub fn ensure_matches(&self, social_user_id: &str) -> Result<(), ProviderError> {
        let actual = self.id.to_string();
        if actual != social_user_id {
            return Err(ProviderError::AccountMismatch {
                expected: social_user_id.to_string(),
                actual,
            });
        }
        Ok(())
    }
}

/// 소셜 로그인 제공자의 액세스 토큰을 검증합니다.
#[async_trait]
pub trait ProviderVerifier: Send + Sync {
    async fn verify(&self, access_token: &str) -> Result<KakaoProfile, ProviderError>;
}

/// reqwest 기반 카카오 API 클라이언트
pub struct KakaoClient {
    http: reqwest::Client,
    base_url: String,
}

impl KakaoClient {
    /// `base_url`은 보통 `https://kapi.kakao.com`입니다. 끝의 `/`는 붙이지 않습니다.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ProviderVerifier for KakaoClient {
    async fn verify(&self, access_token: &str) -> Result<KakaoProfile, ProviderError> {
        let response = self
            .http
            .get(format!("{}/v2/user/me", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, "kakao rejected access token");
            return Err(ProviderError::Rejected(status));
        }

        Ok(response.json::<KakaoProfile>().await?)
    }
}
