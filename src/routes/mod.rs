//! # 라우트 핸들러 모듈
//!
//! - `token`: 카카오 커스텀 토큰 교환 (CORS 사전 요청 포함)
//! - `health`: 서버 상태 확인

pub mod health;
pub mod token;

pub use health::*;
pub use token::*;
