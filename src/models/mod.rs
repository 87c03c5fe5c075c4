//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `profile`: 토큰 교환 요청/응답과 사용자 프로필 레코드

pub mod profile;

pub use profile::*;
