//! # 사용자 프로필 모델 정의
//!
//! 토큰 교환 요청/응답과, `users` 테이블에 저장되는 프로필 레코드를 정의합니다.
//!
//! ## 내부 사용자 ID
//! ```text
//! internal_user_id = "kakao" + ":" + 카카오 사용자 ID
//! ```
//! 입력만으로 결정되는 순수 함수이므로 같은 카카오 계정은 항상 같은 내부 ID를 갖고,
//! 같은 요청을 여러 번 보내도 하나의 프로필만 갱신됩니다.

use serde::{Deserialize, Deserializer, Serialize};

/// 외부 로그인 제공자 태그. 내부 사용자 ID의 네임스페이스로 쓰입니다.
pub const PROVIDER_TAG: &str = "kakao";

/// 제공자 태그와 소셜 ID 사이의 구분자
pub const ID_SEPARATOR: char = ':';

/// 카카오 사용자 ID가 없을 때의 에러 메시지
pub const MISSING_SOCIAL_USER_ID: &str = "카카오 사용자 ID가 필요합니다.";

/// 카카오 사용자 ID로부터 내부 사용자 ID를 만듭니다.
///
/// 예: `"12345"` → `"kakao:12345"`
pub fn internal_user_id(social_user_id: &str) -> String {
    format!("{PROVIDER_TAG}{ID_SEPARATOR}{social_user_id}")
}

/// 프로필 레코드 — DB의 `users` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileRecord {
    /// 내부 사용자 ID (`kakao:<id>`), 기본키
    pub id: String,
    /// 카카오 사용자 ID
    pub kakao_user_id: String,
    /// 이메일 — 없으면 NULL로 명시적으로 저장됩니다.
    pub email: Option<String>,
    /// 닉네임 — 없으면 NULL로 명시적으로 저장됩니다.
    pub nickname: Option<String>,
    /// 항상 "kakao"
    pub provider: String,
    /// 처음 저장된 시각 (ISO 8601, 서버 시각). 이후 갱신되지 않습니다.
    pub created_at: String,
    /// 마지막으로 저장된 시각 (ISO 8601, 서버 시각)
    pub updated_at: String,
}

/// 병합 저장(merge write)에 넘기는 필드 묶음
///
/// 타임스탬프는 저장소가 서버 시각으로 채우므로 여기에는 없습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpsert {
    pub id: String,
    pub kakao_user_id: String,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub provider: &'static str,
}

impl ProfileUpsert {
    /// 카카오 사용자 ID로부터 내부 ID를 계산하여 저장할 필드를 만듭니다.
    pub fn new(social_user_id: &str, email: Option<String>, nickname: Option<String>) -> Self {
        Self {
            id: internal_user_id(social_user_id),
            kakao_user_id: social_user_id.to_string(),
            email,
            nickname,
            provider: PROVIDER_TAG,
        }
    }
}

/// 토큰 교환 요청 — `POST /createKakaoCustomToken`의 요청 본문
///
/// 필드 이름은 `socialUserId` 형식과 기존 앱이 보내던 `kakaoUserId` 형식을 모두 받습니다.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchangeRequest {
    /// 카카오 사용자 ID (필수). 문자열과 숫자 모두 허용합니다.
    #[serde(default, alias = "kakaoUserId", deserialize_with = "string_or_number")]
    pub social_user_id: Option<String>,
    /// 카카오 액세스 토큰. 검증이 켜져 있으면 필수입니다.
    #[serde(default, alias = "kakaoAccessToken")]
    pub social_access_token: Option<String>,
    #[serde(default, alias = "kakaoEmail")]
    pub email: Option<String>,
    #[serde(default, alias = "kakaoNickname")]
    pub nickname: Option<String>,
}

impl TokenExchangeRequest {
    /// 앞뒤 공백을 제거한 카카오 사용자 ID. 비어 있으면 None
    pub fn social_user_id(&self) -> Option<&str> {
        self.social_user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn access_token(&self) -> Option<&str> {
        non_empty(self.social_access_token.as_deref())
    }

    /// 빈 문자열은 값이 없는 것으로 취급합니다.
    pub fn email(&self) -> Option<&str> {
        non_empty(self.email.as_deref())
    }

    pub fn nickname(&self) -> Option<&str> {
        non_empty(self.nickname.as_deref())
    }
}

/// 토큰 교환 성공 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenExchangeResponse {
    #[serde(rename = "customToken")]
    pub custom_token: String,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

// 카카오 회원번호는 숫자이므로 클라이언트가 JSON 숫자로 보내는 경우가 많습니다.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::Text(text) => text,
            StringOrNumber::Number(number) => number.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_user_id_is_prefixed_and_deterministic() {
        assert_eq!(internal_user_id("12345"), "kakao:12345");
        assert_eq!(internal_user_id("12345"), internal_user_id("12345"));
        assert_ne!(internal_user_id("12345"), internal_user_id("12346"));
    }

    #[test]
    fn accepts_both_field_spellings() {
        let social: TokenExchangeRequest =
            serde_json::from_str(r#"{"socialUserId": "42", "email": "a@b.c"}"#).unwrap();
        let legacy: TokenExchangeRequest = serde_json::from_str(
            r#"{"kakaoUserId": "42", "kakaoAccessToken": "tok", "kakaoNickname": "라이언"}"#,
        )
        .unwrap();

        assert_eq!(social.social_user_id(), Some("42"));
        assert_eq!(social.email(), Some("a@b.c"));
        assert_eq!(legacy.social_user_id(), Some("42"));
        assert_eq!(legacy.access_token(), Some("tok"));
        assert_eq!(legacy.nickname(), Some("라이언"));
    }

    #[test]
    fn numeric_id_is_rendered_in_decimal() {
        let req: TokenExchangeRequest =
            serde_json::from_str(r#"{"kakaoUserId": 3141592653}"#).unwrap();

        assert_eq!(req.social_user_id(), Some("3141592653"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let req: TokenExchangeRequest = serde_json::from_str(
            r#"{"socialUserId": "   ", "email": "", "nickname": null}"#,
        )
        .unwrap();

        assert_eq!(req.social_user_id(), None);
        assert_eq!(req.email(), None);
        assert_eq!(req.nickname(), None);
    }

    #[test]
    fn upsert_derives_key_from_social_id() {
        let upsert = ProfileUpsert::new("99", None, Some("춘식".into()));

        assert_eq!(upsert.id, "kakao:99");
        assert_eq!(upsert.kakao_user_id, "99");
        assert_eq!(upsert.provider, PROVIDER_TAG);
        assert_eq!(upsert.email, None);
    }
}
