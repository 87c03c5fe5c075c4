//! # 커스텀 토큰 발급 서비스
//!
//! 내부 사용자 ID(`kakao:<id>`)에 묶인 서명된 커스텀 토큰을 만듭니다.
//! 클라이언트는 이 토큰을 인증 플랫폼에 제출하여 정식 세션 자격 증명으로 교환합니다.
//!
//! ## 토큰 형식
//! ```text
//! header : { "alg": "RS256", "typ": "JWT" }
//! payload: { iss, sub, aud, iat, exp, uid, claims? }
//! ```
//! - `iss`, `sub`: 서비스 계정 이메일
//! - `aud`: Identity Toolkit audience
//! - `exp`: 발급 시각으로부터 최대 1시간
//! - `claims`: 선택적인 개발자 클레임 (예: `{"provider": "kakao"}`)

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{Config, SigningKeySource};

/// uid의 최대 길이 (문자 수)
pub const MAX_UID_LENGTH: usize = 128;

/// 개발자 클레임을 JSON으로 직렬화했을 때의 최대 길이 (문자 수, 바이트 수가 아님)
pub const MAX_DEVELOPER_CLAIMS_LENGTH: usize = 1000;

/// 개발자 클레임에 쓸 수 없는 예약된 이름들
pub const RESERVED_CLAIMS: &[&str] = &[
    "acr", "amr", "at_hash", "aud", "auth_time", "azp", "cnf", "c_hash", "exp", "firebase",
    "iat", "iss", "jti", "nbf", "nonce", "sub",
];

/// 커스텀 토큰 발급 중 발생할 수 있는 에러
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("uid must be a non-empty string with at most 128 characters")]
    InvalidUid,

    #[error("developer claim \"{0}\" is reserved and cannot be specified")]
    ReservedClaim(String),

    #[error("developer claims must not exceed 1000 characters when serialized")]
    ClaimsTooLarge,

    #[error("failed to read signing key: {0}")]
    KeyFile(#[from] std::io::Error),

    #[error("invalid signing key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign custom token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("failed to serialize developer claims: {0}")]
    Claims(#[from] serde_json::Error),

    /// 원격 서명 서비스 등 다른 구현에서 발생한 장애
    #[error("token service error: {0}")]
    Service(String),
}

/// 커스텀 토큰의 페이로드
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomTokenClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims: Option<Map<String, Value>>,
}

/// 신원 토큰 서비스: 주어진 uid에 대한 서명된 커스텀 토큰을 발급합니다.
///
/// main에서 한 번 만들어 `AppState`를 통해 핸들러에 주입됩니다.
/// 서명을 원격 서비스(IAM 등)에 맡기는 구현도 넣을 수 있도록 async로 정의합니다.
#[async_trait]
pub trait TokenMinter: Send + Sync {
    async fn mint_custom_token(
        &self,
        uid: &str,
        developer_claims: Option<&Map<String, Value>>,
    ) -> Result<String, TokenError>;
}

/// `jsonwebtoken`으로 직접 서명하는 기본 구현
pub struct JwtCustomTokenMinter {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtCustomTokenMinter {
    /// 설정에서 서명 키를 읽어 발급기를 만듭니다.
    ///
    /// PEM 키는 RS256, 비밀키는 HS256으로 서명합니다.
    pub fn from_config(config: &Config) -> Result<Self, TokenError> {
        let (encoding_key, algorithm) = match &config.signing_key {
            SigningKeySource::PemFile(path) => {
                let pem = std::fs::read(path)?;
                let key = EncodingKey::from_rsa_pem(&pem).map_err(TokenError::InvalidKey)?;
                (key, Algorithm::RS256)
            }
            SigningKeySource::PemInline(pem) => {
                let key =
                    EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(TokenError::InvalidKey)?;
                (key, Algorithm::RS256)
            }
            SigningKeySource::Secret(secret) => {
                (EncodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
            }
        };

        Ok(Self {
            encoding_key,
            algorithm,
            issuer: config.token_issuer.clone(),
            audience: config.token_audience.clone(),
            ttl: Duration::seconds(config.token_ttl_secs),
        })
    }

    /// HS256 비밀키로 바로 만듭니다. (로컬 개발, 테스트용)
    pub fn with_secret(secret: &str, issuer: &str, audience: &str, ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// 서명에 사용하는 알고리즘
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn sign(
        &self,
        uid: &str,
        developer_claims: Option<&Map<String, Value>>,
    ) -> Result<String, TokenError> {
        validate_uid(uid)?;
        if let Some(claims) = developer_claims {
            validate_developer_claims(claims)?;
        }

        let now = Utc::now();
        let claims = CustomTokenClaims {
            iss: self.issuer.clone(),
            sub: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            uid: uid.to_string(),
            // 빈 클레임 객체는 넣지 않습니다.
            claims: developer_claims.filter(|c| !c.is_empty()).cloned(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }
}

#[async_trait]
impl TokenMinter for JwtCustomTokenMinter {
    async fn mint_custom_token(
        &self,
        uid: &str,
        developer_claims: Option<&Map<String, Value>>,
    ) -> Result<String, TokenError> {
        self.sign(uid, developer_claims)
    }
}

/// uid는 비어 있지 않고 128자 이하여야 합니다.
pub fn validate_uid(uid: &str) -> Result<(), TokenError> {
    let len = uid.chars().count();
    if len == 0 || len > MAX_UID_LENGTH {
        return Err(TokenError::InvalidUid);
    }
    Ok(())
}

/// 개발자 클레임이 예약어를 쓰지 않고 크기 제한 안에 있는지 확인합니다.
pub fn validate_developer_claims(claims: &Map<String, Value>) -> Result<(), TokenError> {
    if let Some(reserved) = claims.keys().find(|k| RESERVED_CLAIMS.contains(&k.as_str())) {
        return Err(TokenError::ReservedClaim(reserved.clone()));
    }
    if serde_json::to_string(claims)?.chars().count() > MAX_DEVELOPER_CLAIMS_LENGTH {
        return Err(TokenError::ClaimsTooLarge);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};
    use serde_json::json;

    const SECRET: &str = "test-secret";
    const ISSUER: &str = "svc@example.iam.gserviceaccount.com";
    const AUDIENCE: &str = crate::config::DEFAULT_TOKEN_AUDIENCE;

    fn decode_claims(token: &str) -> CustomTokenClaims {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUDIENCE]);
        validation.set_issuer(&[ISSUER]);
        decode::<CustomTokenClaims>(token, &DecodingKey::from_secret(SECRET.as_bytes()), &validation)
            .unwrap()
            .claims
    }

    #[tokio::test]
    async fn mints_token_bound_to_uid() {
        let minter = JwtCustomTokenMinter::with_secret(SECRET, ISSUER, AUDIENCE, 3600);

        let token = minter.mint_custom_token("kakao:12345", None).await.unwrap();
        let claims = decode_claims(&token);

        assert_eq!(claims.uid, "kakao:12345");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.sub, ISSUER);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.claims.is_none());
    }

    #[tokio::test]
    async fn embeds_developer_claims() {
        let minter = JwtCustomTokenMinter::with_secret(SECRET, ISSUER, AUDIENCE, 600);
        let extra = json!({ "provider": "kakao", "kakaoUserId": "12345" });

        let token = minter
            .mint_custom_token("kakao:12345", extra.as_object())
            .await
            .unwrap();
        let claims = decode_claims(&token);

        assert_eq!(claims.claims.unwrap(), *extra.as_object().unwrap());
    }

    #[tokio::test]
    async fn rejects_reserved_claim_names() {
        let minter = JwtCustomTokenMinter::with_secret(SECRET, ISSUER, AUDIENCE, 600);
        let extra = json!({ "sub": "someone-else" });

        let err = minter
            .mint_custom_token("kakao:1", extra.as_object())
            .await
            .unwrap_err();

        assert!(matches!(err, TokenError::ReservedClaim(name) if name == "sub"));
    }

    #[test]
    fn uid_length_is_bounded() {
        assert!(validate_uid("").is_err());
        assert!(validate_uid(&"a".repeat(MAX_UID_LENGTH)).is_ok());
        assert!(validate_uid(&"a".repeat(MAX_UID_LENGTH + 1)).is_err());
    }

    #[test]
    fn claims_limit_counts_characters_not_bytes() {
        // 한글 한 글자는 UTF-8로 3바이트이지만 한 글자로 셉니다.
        let mut claims = Map::new();
        claims.insert("nickname".into(), Value::String("가".repeat(400)));

        assert!(serde_json::to_string(&claims).unwrap().len() > MAX_DEVELOPER_CLAIMS_LENGTH);
        assert!(validate_developer_claims(&claims).is_ok());
    }

    #[test]
    fn oversized_claims_are_rejected() {
        let mut claims = Map::new();
        claims.insert("blob".into(), Value::String("x".repeat(MAX_DEVELOPER_CLAIMS_LENGTH)));

        assert!(matches!(
            validate_developer_claims(&claims),
            Err(TokenError::ClaimsTooLarge)
        ));
    }

    // ── RS256 (서비스 계정 개인키) 경로 ──

    const RSA_PRIVATE_KEY: &str = include_str!("../../tests/fixtures/custom_token_rsa_private.pem");
    const RSA_PUBLIC_KEY: &str = include_str!("../../tests/fixtures/custom_token_rsa_public.pem");

    fn rsa_config(key_vars: &[(&str, String)]) -> Config {
        let mut vars: Vec<(String, String)> = vec![
            ("DATABASE_URL".into(), "sqlite::memory:".into()),
            ("TOKEN_ISSUER".into(), ISSUER.into()),
            ("TOKEN_TTL_SECS".into(), "900".into()),
        ];
        vars.extend(key_vars.iter().map(|(k, v)| (k.to_string(), v.clone())));
        Config::from_lookup(move |name| {
            vars.iter()
                .find(|(k, _)| k.as_str() == name)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    fn decode_rs256(token: &str) -> CustomTokenClaims {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[AUDIENCE]);
        validation.set_issuer(&[ISSUER]);
        let key = DecodingKey::from_rsa_pem(RSA_PUBLIC_KEY.as_bytes()).unwrap();
        decode::<CustomTokenClaims>(token, &key, &validation)
            .unwrap()
            .claims
    }

    #[tokio::test]
    async fn inline_pem_with_escaped_newlines_signs_rs256() {
        // .env 한 줄에 적은 것처럼 실제 개행을 "\n" 두 글자로 바꿔 넣습니다.
        let escaped = RSA_PRIVATE_KEY.trim_end().replace('\n', "\\n");
        assert!(!escaped.contains('\n'));

        let config = rsa_config(&[("TOKEN_PRIVATE_KEY", escaped)]);
        let minter = JwtCustomTokenMinter::from_config(&config).unwrap();
        assert_eq!(minter.algorithm(), Algorithm::RS256);

        let extra = json!({ "provider": "kakao" });
        let token = minter
            .mint_custom_token("kakao:12345", extra.as_object())
            .await
            .unwrap();
        let claims = decode_rs256(&token);

        assert_eq!(claims.uid, "kakao:12345");
        assert_eq!(claims.exp - claims.iat, 900);
        assert_eq!(claims.claims.unwrap()["provider"], "kakao");
    }

    #[tokio::test]
    async fn pem_file_signs_rs256() {
        let path = concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/custom_token_rsa_private.pem"
        );
        let config = rsa_config(&[("TOKEN_PRIVATE_KEY_PATH", path.to_string())]);
        let minter = JwtCustomTokenMinter::from_config(&config).unwrap();

        let token = minter.mint_custom_token("kakao:7", None).await.unwrap();

        assert_eq!(decode_rs256(&token).uid, "kakao:7");
    }

    #[test]
    fn unreadable_or_invalid_keys_fail_construction() {
        let missing = rsa_config(&[(
            "TOKEN_PRIVATE_KEY_PATH",
            "/nonexistent/custom-token-key.pem".to_string(),
        )]);
        assert!(matches!(
            JwtCustomTokenMinter::from_config(&missing),
            Err(TokenError::KeyFile(_))
        ));

        let garbage = rsa_config(&[("TOKEN_PRIVATE_KEY", "not a pem".to_string())]);
        assert!(matches!(
            JwtCustomTokenMinter::from_config(&garbage),
            Err(TokenError::InvalidKey(_))
        ));
    }
}
