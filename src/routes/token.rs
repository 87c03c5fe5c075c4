//! # 카카오 커스텀 토큰 교환 핸들러
//!
//! 카카오 사용자 ID를 받아 내부 사용자 ID(`kakao:<id>`)에 묶인 커스텀 토큰을 발급하고,
//! 사용자 프로필을 병합 저장합니다.
//!
//! ## 엔드포인트
//! - `OPTIONS /createKakaoCustomToken` → 204 (CORS 사전 요청)
//! - `POST    /createKakaoCustomToken` → `{ "customToken": "..." }`
//!
//! ## 처리 순서
//! ```text
//! 요청 수신 → 입력 검증 → [카카오 토큰 검증] → 토큰 발급 → 프로필 저장 → 응답
//!                │                 │               │            │
//!                └── 400           └── 401/500     └── 500      └── 500 (또는 경고 후 200)
//! ```
//! 요청 사이에 남는 상태는 없으며, 재시도도 하지 않습니다.

use axum::{
    extract::{rejection::JsonRejection, State}, // State: 공유 상태 추출기, JsonRejection: 본문 파싱 실패 사유
    http::StatusCode,                           // HTTP 상태 코드
    Json,                                       // JSON 요청 추출기 겸 응답 래퍼
};
use serde_json::{json, Map, Value}; // 개발자 클레임(JSON 객체) 생성용

use crate::{
    app::AppState,
    error::AppError,
    models::{
        internal_user_id, ProfileUpsert, TokenExchangeRequest, TokenExchangeResponse,
        MISSING_SOCIAL_USER_ID, PROVIDER_TAG,
    },
};

/// 검증이 켜져 있는데 카카오 액세스 토큰이 없을 때의 에러 메시지
pub const MISSING_ACCESS_TOKEN: &str = "카카오 액세스 토큰이 필요합니다.";

/// `OPTIONS /createKakaoCustomToken` — CORS 사전 요청에 빈 본문으로 응답합니다.
///
/// CORS 헤더는 미들웨어가 붙이므로 여기서는 상태 코드만 반환합니다.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// `POST /createKakaoCustomToken` — 카카오 사용자 ID를 커스텀 토큰으로 교환합니다.
///
/// 본문 파싱 실패도 직접 받아서 `{"error": ...}` 형태의 400으로 바꿉니다.
pub async fn create_custom_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenExchangeRequest>, JsonRejection>,
) -> Result<Json<TokenExchangeResponse>, AppError> {
    // `?`는 Err(JsonRejection)를 From 구현을 통해 AppError로 바꿔 바로 반환합니다.
    let Json(req) = payload?;

    let social_user_id = req
        .social_user_id()
        .ok_or_else(|| AppError::BadRequest(MISSING_SOCIAL_USER_ID.to_string()))?;

    let uid = internal_user_id(social_user_id);

    match exchange(&state, &req, social_user_id, &uid).await {
        Ok(custom_token) => {
            tracing::info!(uid = %uid, "카카오 Custom Token 생성 성공");
            Ok(Json(TokenExchangeResponse { custom_token }))
        }
        Err(err) => {
            if err.status().is_server_error() {
                tracing::error!(uid = %uid, error = %err, "Custom Token 생성 오류");
            } else {
                tracing::warn!(uid = %uid, error = %err, "Custom Token 요청 거절");
            }
            Err(err)
        }
    }
}

/// 검증된 입력으로 토큰 발급과 프로필 저장을 수행합니다.
async fn exchange(
    state: &AppState,
    req: &TokenExchangeRequest,
    social_user_id: &str,
    uid: &str,
) -> Result<String, AppError> {
    let mut email = req.email().map(str::to_owned);
    let mut nickname = req.nickname().map(str::to_owned);

    if state.policy.verify_provider_token {
        let verifier = state.verifier.as_ref().ok_or_else(|| {
            AppError::Internal("provider verification is enabled but no verifier is configured".into())
        })?;
        let access_token = req
            .access_token()
            .ok_or_else(|| AppError::BadRequest(MISSING_ACCESS_TOKEN.to_string()))?;

        let profile = verifier.verify(access_token).await?;
        profile.ensure_matches(social_user_id)?;

        // 요청에 없는 값은 카카오가 알려준 값으로 채웁니다.
        email = email.or_else(|| profile.email().map(str::to_owned));
        nickname = nickname.or_else(|| profile.nickname().map(str::to_owned));
    }

    let claims = state
        .policy
        .attach_provider_claims
        .then(|| provider_claims(social_user_id));

    let custom_token = state
        .minter
        .mint_custom_token(uid, claims.as_ref())
        .await?;

    let profile = ProfileUpsert::new(social_user_id, email, nickname);
    if let Err(err) = state.profiles.upsert_profile(&profile).await {
        if state.policy.fail_on_persist_error {
            return Err(err);
        }
        tracing::warn!(uid = %uid, error = %err, "프로필 저장 실패, 발급한 토큰은 그대로 반환합니다");
    }

    Ok(custom_token)
}

/// 토큰에 실을 카카오 정보 클레임
pub fn provider_claims(social_user_id: &str) -> Map<String, Value> {
    let mut claims = Map::new();
    claims.insert("provider".into(), json!(PROVIDER_TAG));
    claims.insert("kakaoUserId".into(), json!(social_user_id));
    claims
}
