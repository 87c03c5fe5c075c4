//! # 미들웨어 모듈
//!
//! - `cors`: 모든 응답에 CORS 헤더 추가

pub mod cors;
