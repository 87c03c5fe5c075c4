//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `HOST`, `PORT`: 서버 바인딩 주소
//! - `DATABASE_URL`: 사용자 프로필을 저장할 SQLite 데이터베이스 경로
//! - `TOKEN_ISSUER`: 커스텀 토큰의 `iss`/`sub`에 들어갈 서비스 계정 이메일
//! - `TOKEN_PRIVATE_KEY_PATH` / `TOKEN_PRIVATE_KEY` / `TOKEN_SIGNING_SECRET`: 서명 키
//! - `TOKEN_AUDIENCE`, `TOKEN_TTL_SECS`: 토큰의 `aud`와 수명
//! - `ATTACH_PROVIDER_CLAIMS`: 토큰에 카카오 정보를 커스텀 클레임으로 포함할지 여부
//! - `FAIL_ON_PERSIST_ERROR`: 토큰 발급 후 프로필 저장 실패를 500으로 처리할지 여부
//! - `VERIFY_PROVIDER_TOKEN`: 토큰 발급 전 카카오 액세스 토큰을 검증할지 여부
//! - `KAKAO_API_BASE_URL`, `KAKAO_TIMEOUT_SECS`: 카카오 API 호출 설정
//! - `MAX_CONCURRENT_REQUESTS`: 동시에 처리할 최대 요청 수

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// 커스텀 토큰의 기본 audience (Identity Toolkit)
pub const DEFAULT_TOKEN_AUDIENCE: &str =
    "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit";

/// 커스텀 토큰의 최대 수명 (1시간). 이보다 긴 값은 잘라냅니다.
pub const MAX_TOKEN_TTL_SECS: i64 = 3600;

/// 카카오 API 기본 주소
pub const DEFAULT_KAKAO_API_BASE_URL: &str = "https://kapi.kakao.com";

/// 설정 로딩 중 발생할 수 있는 에러
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 필수 환경변수가 없음
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    /// 값의 형식이 잘못됨 (예: PORT=abc)
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// 커스텀 토큰 서명 키를 어디서 가져올지 나타냅니다.
///
/// 운영 환경에서는 서비스 계정의 RSA 개인키(RS256)를 사용하고,
/// 로컬 개발 환경에서는 대칭키(HS256)로 대신할 수 있습니다.
#[derive(Clone)]
pub enum SigningKeySource {
    /// PEM 파일 경로
    PemFile(PathBuf),
    /// PEM 문자열 (환경변수에 직접 넣은 경우)
    PemInline(String),
    /// HS256 비밀키
    Secret(String),
}

// 비밀키가 로그에 찍히지 않도록 Debug를 직접 구현합니다.
impl std::fmt::Debug for SigningKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SigningKeySource::PemFile(path) => f.debug_tuple("PemFile").field(path).finish(),
            SigningKeySource::PemInline(_) => f.write_str("PemInline(..)"),
            SigningKeySource::Secret(_) => f.write_str("Secret(..)"),
        }
    }
}

/// 토큰 교환 핸들러의 동작 방식을 결정하는 스위치 모음
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangePolicy {
    /// `true`면 `{"provider": "kakao", "kakaoUserId": ...}`를 토큰 클레임에 포함
    pub attach_provider_claims: bool,
    /// `true`면 토큰 발급 후 프로필 저장이 실패했을 때 500을 반환
    /// `false`면 경고 로그만 남기고 발급된 토큰으로 200을 반환
    pub fail_on_persist_error: bool,
    /// `true`면 카카오 액세스 토큰을 검증한 뒤에만 토큰을 발급
    pub verify_provider_token: bool,
}

impl Default for ExchangePolicy {
    fn default() -> Self {
        Self {
            attach_provider_claims: true,
            fail_on_persist_error: true,
            verify_provider_token: true,
        }
    }
}

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후 main에서 협력 객체를 만드는 데 사용합니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// SQLite 데이터베이스 경로 (예: "sqlite:data/users.db?mode=rwc")
    pub database_url: String,
    /// 서비스 계정 이메일
    pub token_issuer: String,
    /// 서명 키 출처
    pub signing_key: SigningKeySource,
    /// 토큰의 `aud` 클레임
    pub token_audience: String,
    /// 토큰 수명(초), 1..=3600
    pub token_ttl_secs: i64,
    /// 핸들러 동작 스위치
    pub policy: ExchangePolicy,
    /// 카카오 API 기본 주소
    pub kakao_api_base_url: String,
    /// 카카오 API 호출 타임아웃(초)
    pub kakao_timeout_secs: u64,
    /// 동시 처리 요청 수 상한
    pub max_concurrent_requests: usize,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`, `TOKEN_ISSUER`와 서명 키 중 하나는 필수입니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없어도 동작합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 임의의 조회 함수로부터 설정을 만듭니다.
    ///
    /// 테스트에서 프로세스 환경변수를 건드리지 않고 설정을 구성할 때 사용합니다.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 빈 문자열은 설정하지 않은 것으로 취급합니다.
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let signing_key = if let Some(path) = get("TOKEN_PRIVATE_KEY_PATH") {
            SigningKeySource::PemFile(PathBuf::from(path))
        } else if let Some(pem) = get("TOKEN_PRIVATE_KEY") {
            // .env 파일에서는 개행을 "\n"으로 적는 경우가 많아 실제 개행으로 바꿉니다.
            SigningKeySource::PemInline(pem.replace("\\n", "\n"))
        } else if let Some(secret) = get("TOKEN_SIGNING_SECRET") {
            SigningKeySource::Secret(secret)
        } else {
            return Err(ConfigError::Missing("TOKEN_PRIVATE_KEY_PATH"));
        };

        let defaults = ExchangePolicy::default();

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or::<u16>(get("PORT"), "PORT", 3000)?,
            database_url: require("DATABASE_URL")?,
            token_issuer: require("TOKEN_ISSUER")?,
            signing_key,
            token_audience: get("TOKEN_AUDIENCE")
                .unwrap_or_else(|| DEFAULT_TOKEN_AUDIENCE.to_string()),
            token_ttl_secs: parse_or(get("TOKEN_TTL_SECS"), "TOKEN_TTL_SECS", MAX_TOKEN_TTL_SECS)?
                .clamp(1, MAX_TOKEN_TTL_SECS),
            policy: ExchangePolicy {
                attach_provider_claims: parse_flag(
                    get("ATTACH_PROVIDER_CLAIMS"),
                    "ATTACH_PROVIDER_CLAIMS",
                    defaults.attach_provider_claims,
                )?,
                fail_on_persist_error: parse_flag(
                    get("FAIL_ON_PERSIST_ERROR"),
                    "FAIL_ON_PERSIST_ERROR",
                    defaults.fail_on_persist_error,
                )?,
                verify_provider_token: parse_flag(
                    get("VERIFY_PROVIDER_TOKEN"),
                    "VERIFY_PROVIDER_TOKEN",
                    defaults.verify_provider_token,
                )?,
            },
            kakao_api_base_url: get("KAKAO_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_KAKAO_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            kakao_timeout_secs: parse_or::<u64>(get("KAKAO_TIMEOUT_SECS"), "KAKAO_TIMEOUT_SECS", 5)?,
            max_concurrent_requests: parse_or::<usize>(
                get("MAX_CONCURRENT_REQUESTS"),
                "MAX_CONCURRENT_REQUESTS",
                10,
            )?
            .max(1),
        })
    }
}

/// 값이 있으면 파싱하고, 없으면 기본값을 사용합니다.
fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

/// "true"/"false", "1"/"0", "yes"/"no", "on"/"off"를 불리언으로 해석합니다.
fn parse_flag(value: Option<String>, name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn applies_defaults_for_optional_settings() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("TOKEN_ISSUER", "svc@example.iam.gserviceaccount.com"),
            ("TOKEN_SIGNING_SECRET", "dev-secret"),
        ]))
        .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.token_audience, DEFAULT_TOKEN_AUDIENCE);
        assert_eq!(config.token_ttl_secs, 3600);
        assert_eq!(config.policy, ExchangePolicy::default());
        assert_eq!(config.kakao_api_base_url, "https://kapi.kakao.com");
        assert_eq!(config.max_concurrent_requests, 10);
        assert!(matches!(config.signing_key, SigningKeySource::Secret(_)));
    }

    #[test]
    fn missing_signing_key_is_an_error() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("TOKEN_ISSUER", "svc@example.com"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::Missing("TOKEN_PRIVATE_KEY_PATH")));
    }

    #[test]
    fn pem_path_takes_precedence_and_flags_parse() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("TOKEN_ISSUER", "svc@example.com"),
            ("TOKEN_PRIVATE_KEY_PATH", "/run/secrets/key.pem"),
            ("TOKEN_SIGNING_SECRET", "ignored"),
            ("ATTACH_PROVIDER_CLAIMS", "false"),
            ("FAIL_ON_PERSIST_ERROR", "0"),
            ("VERIFY_PROVIDER_TOKEN", "off"),
            ("TOKEN_TTL_SECS", "86400"),
            ("KAKAO_API_BASE_URL", "http://localhost:9000/"),
        ]))
        .unwrap();

        assert!(matches!(config.signing_key, SigningKeySource::PemFile(_)));
        assert!(!config.policy.attach_provider_claims);
        assert!(!config.policy.fail_on_persist_error);
        assert!(!config.policy.verify_provider_token);
        assert_eq!(config.token_ttl_secs, MAX_TOKEN_TTL_SECS);
        assert_eq!(config.kakao_api_base_url, "http://localhost:9000");
    }

    #[test]
    fn rejects_malformed_values() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("TOKEN_ISSUER", "svc@example.com"),
            ("TOKEN_SIGNING_SECRET", "s"),
            ("PORT", "http"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }
}
