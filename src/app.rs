//! # 애플리케이션 조립
//!
//! 공유 상태(`AppState`)와 라우터를 만듭니다.
//! main.rs와 통합 테스트가 같은 함수로 라우터를 조립하므로, 테스트는 실제 서버와
//! 같은 미들웨어 구성을 거칩니다.

use std::sync::Arc; // 스레드 간에 안전하게 공유되는 참조 카운팅 포인터

use axum::{
    routing::{get, post}, // HTTP 메서드별 라우팅 함수들
    Router,               // 라우터: URL 경로와 핸들러를 연결하는 구조체
};
use tower::limit::GlobalConcurrencyLimitLayer; // 라우터 전체가 공유하는 동시 처리 수 제한
use tower_http::trace::TraceLayer; // HTTP 요청/응답 로깅 미들웨어

use crate::{
    config::ExchangePolicy,
    db::ProfileStore,
    middleware::cors::with_cors_headers,
    routes,
    services::{ProviderVerifier, TokenMinter},
};

/// 토큰 교환 엔드포인트 경로
pub const TOKEN_EXCHANGE_PATH: &str = "/createKakaoCustomToken";

/// 애플리케이션 공유 상태
///
/// 협력 객체들은 프로세스 시작 시 한 번 만들어지고, 이후에는 읽기 전용으로 공유됩니다.
/// `Arc`를 clone해도 객체 자체는 복제되지 않습니다.
#[derive(Clone)]
pub struct AppState {
    /// 커스텀 토큰 발급기
    pub minter: Arc<dyn TokenMinter>,
    /// 프로필 저장소
    pub profiles: Arc<dyn ProfileStore>,
    /// 카카오 토큰 검증기 (검증을 끈 경우 None)
    pub verifier: Option<Arc<dyn ProviderVerifier>>,
    /// 핸들러 동작 스위치
    pub policy: ExchangePolicy,
}

/// 전체 라우터를 만듭니다.
///
/// 레이어 순서(바깥쪽부터): CORS 헤더 → 요청 로깅 → 동시 처리 제한 → 핸들러
pub fn build_router(state: AppState, max_concurrent_requests: usize) -> Router {
    let router = Router::new()
        .route(
            TOKEN_EXCHANGE_PATH,
            post(routes::create_custom_token).options(routes::preflight),
        )
        .route("/health", get(routes::health_check))
        .with_state(state)
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent_requests))
        .layer(TraceLayer::new_for_http());

    with_cors_headers(router)
}
