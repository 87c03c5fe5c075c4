//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /health` → `{ "status": "ok" }`
//!
//! 로드밸런서나 컨테이너 오케스트레이터가 서버 상태를 확인할 때 사용합니다.
//! 토큰 발급기나 저장소는 호출하지 않습니다.

use axum::Json;                // JSON 응답 래퍼
use serde_json::{json, Value}; // JSON 생성 유틸리티

/// `GET /health` — 서버 상태를 확인합니다.
///
/// `Json<Value>`를 반환하면 Axum이 `Content-Type: application/json`과 상태 코드 200을 붙여 줍니다.
/// `Value`는 serde_json의 동적 JSON 타입이라, 응답 구조체를 따로 만들 필요가 없습니다.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok"
    }))
}
