//! # 에러 처리 모듈
//!
//! 토큰 교환 요청을 처리하면서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 모든 에러 종류를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 `{"error": "<메시지>"}` HTTP 응답으로 자동 변환
//!
//! 모든 실패는 핸들러 경계에서 응답으로 바뀌며, 요청 밖으로 전파되지 않습니다.

use axum::{
    extract::rejection::JsonRejection,  // JSON 본문 추출 실패 사유 (형식 오류, Content-Type 누락 등)
    http::StatusCode,                   // HTTP 상태 코드 (200, 400, 500 등)
    response::{IntoResponse, Response}, // Axum의 응답 변환 트레이트
    Json,                               // JSON 응답 래퍼
};
use serde_json::json; // json! 매크로: JSON 객체를 간편하게 생성
use thiserror::Error; // thiserror: 커스텀 에러 타입을 쉽게 만들어주는 매크로 크레이트

use crate::models::MISSING_SOCIAL_USER_ID;
use crate::services::{custom_token::TokenError, kakao::ProviderError};

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 잘못된 요청 (HTTP 400) — 필수 입력 누락, JSON 형식 오류
    #[error("{0}")]
    BadRequest(String),

    /// 카카오 액세스 토큰 검증 실패 (HTTP 401)
    #[error("{0}")]
    Unauthorized(String),

    /// 커스텀 토큰 발급 실패 (HTTP 500)
    #[error(transparent)]
    TokenMint(#[from] TokenError),

    /// 카카오 API 호출 자체가 실패 (HTTP 500)
    #[error(transparent)]
    Provider(ProviderError),

    /// 프로필 저장소 오류 (HTTP 500)
    /// #[from]: sqlx 함수의 에러에 `?`를 쓰면 자동으로 AppError::Database로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 그 밖의 서버 내부 오류 (HTTP 500)
    #[error("{0}")]
    Internal(String),
}

// 본문 파싱 실패는 모두 400입니다.
//
// 본문 없이(Content-Type 없이) 보낸 요청은 "ID를 보내지 않은" 요청과 같으므로
// 필수 필드 누락 메시지로 응답합니다. 그 외에는 Axum이 만든 설명을 그대로 씁니다.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                AppError::BadRequest(MISSING_SOCIAL_USER_ID.to_string())
            }
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

// 카카오가 토큰을 거절한 경우와 네트워크 장애를 구분합니다.
// 전자는 호출자의 잘못(401), 후자는 서버 쪽 문제(500)입니다.
impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        if matches!(
            err,
            ProviderError::Rejected(_) | ProviderError::AccountMismatch { .. }
        ) {
            AppError::Unauthorized(err.to_string())
        } else {
            AppError::Provider(err)
        }
    }
}

impl AppError {
    /// 이 에러에 대응하는 HTTP 상태 코드
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::TokenMint(_)
            | AppError::Provider(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 본문은 항상 `{"error": "<메시지>"}` 형태입니다.
    /// 서버 오류도 원인 메시지를 그대로 돌려주므로, 호출자가 실패 원인을 볼 수 있습니다.
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
