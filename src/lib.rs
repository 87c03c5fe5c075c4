//! # 카카오 커스텀 토큰 교환 서버
//!
//! 카카오 로그인으로 얻은 사용자 ID를 인증 플랫폼용 커스텀 토큰으로 바꿔주는
//! 단일 엔드포인트 서버입니다. 토큰을 발급하면서 사용자 프로필도 함께 저장합니다.
//!
//! 모듈 구성:
//! - `config`: 환경변수 설정
//! - `error`: 에러 타입과 HTTP 응답 변환
//! - `models`: 요청/응답, 프로필 레코드
//! - `db`: 프로필 저장소 (SQLite)
//! - `services`: 커스텀 토큰 발급, 카카오 토큰 검증
//! - `routes`: HTTP 핸들러
//! - `middleware`: CORS 헤더
//! - `app`: 상태와 라우터 조립

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use app::{build_router, AppState};
