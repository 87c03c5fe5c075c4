//! # 외부 서비스 모듈
//!
//! 핸들러가 의존하는 외부 협력자들을 정의합니다.
//! - `custom_token`: 커스텀 토큰 발급 (신원 토큰 서비스)
//! - `kakao`: 카카오 액세스 토큰 검증
//!
//! 각 협력자는 트레이트로 정의되어 있어 테스트에서 대역(test double)으로 바꿀 수 있습니다.

pub mod custom_token;
pub mod kakao;

pub use custom_token::{JwtCustomTokenMinter, TokenError, TokenMinter};
pub use kakao::{KakaoClient, KakaoProfile, ProviderError, ProviderVerifier};
