//! # CORS 헤더 미들웨어
//!
//! 모든 응답에 허용적인 CORS 헤더를 무조건 붙입니다.
//! `tower_http::cors::CorsLayer`는 `Origin` 헤더가 있는 요청에만 헤더를 붙이므로,
//! 여기서는 `SetResponseHeaderLayer`로 에러 응답을 포함한 모든 응답에 같은 헤더를 씁니다.
//!
//! ```text
//! Access-Control-Allow-Origin: *
//! Access-Control-Allow-Methods: GET, POST, OPTIONS
//! Access-Control-Allow-Headers: Content-Type
//! ```

use axum::{
    http::{header, HeaderValue}, // 표준 헤더 이름 상수와 헤더 값 타입
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer; // 응답 헤더를 설정하는 미들웨어

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// 라우터의 모든 응답에 CORS 헤더를 추가합니다.
pub fn with_cors_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
}
