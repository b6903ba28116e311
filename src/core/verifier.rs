use crate::adapters::http::OutsetaClient;
use crate::adapters::jwks::HttpKeySetSource;
use crate::domain::model::Profile;
use crate::domain::ports::KeySetSource;
use crate::utils::error::{OutsetaError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub const PROFILE_PATH: &str = "/api/v1/profile";

/// Outseta 簽發的 JWT claims；未知欄位保留在 `extra`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        rename = "outseta:accountUid",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub account_uid: Option<String>,
    #[serde(
        rename = "outseta:isPrimary",
        default,
        deserialize_with = "lenient_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_primary: Option<bool>,
    #[serde(default, deserialize_with = "numeric_date", skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, deserialize_with = "numeric_date", skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// NumericDate 可以帶小數秒，捨去小數部分
fn numeric_date<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?
        .filter(|seconds| seconds.is_finite())
        .map(|seconds| seconds.trunc() as i64))
}

/// `outseta:isPrimary` 可能是布林值或 "true"/"false" 字串
fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(flag)) => Some(flag),
        Some(Value::String(text)) => match text.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerificationMethod {
    KeySet,
    Profile,
    #[default]
    Both,
}

impl VerificationMethod {
    pub fn uses_key_set(self) -> bool {
        matches!(self, Self::KeySet | Self::Both)
    }

    pub fn uses_profile(self) -> bool {
        matches!(self, Self::Profile | Self::Both)
    }
}

impl FromStr for VerificationMethod {
    type Err = OutsetaError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "keyset" | "jwks" => Ok(Self::KeySet),
            "profile" => Ok(Self::Profile),
            "both" | "" => Ok(Self::Both),
            other => Err(OutsetaError::validation(format!(
                "Unknown verification method '{}': expected keyset, profile or both",
                other
            ))),
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::KeySet => "keyset",
            Self::Profile => "profile",
            Self::Both => "both",
        })
    }
}

/// Profile 驗證結果：本地解碼（未驗簽）的 claims 與遠端回傳的人員資料
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileVerification {
    pub claims: Claims,
    pub profile: Profile,
}

/// 依所選方法填入的驗證結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerificationResult {
    pub key_set_claims: Option<Claims>,
    pub profile_claims: Option<Claims>,
    pub profile: Option<Profile>,
}

pub struct TokenVerifier<K: KeySetSource = HttpKeySetSource> {
    key_source: K,
    api: OutsetaClient,
}

impl TokenVerifier<HttpKeySetSource> {
    pub fn for_tenant(api: OutsetaClient) -> Self {
        let key_source = HttpKeySetSource::for_tenant(&api);
        Self::new(key_source, api)
    }
}

impl<K: KeySetSource> TokenVerifier<K> {
    pub fn new(key_source: K, api: OutsetaClient) -> Self {
        Self { key_source, api }
    }

    /// 以租戶公開的 JWK Set 驗證簽章與到期時間
    pub async fn verify_with_key_set(&self, token: &str) -> Result<Claims> {
        let token = check_structure(token)?;
        tracing::debug!("Verifying token with JWK Set...");

        let header = decode_header(token).map_err(key_set_error)?;
        let key_set = self.key_source.key_set().await.map_err(key_set_error)?;
        let jwk = select_key(&key_set, header.kid.as_deref())?;
        check_key_algorithm(jwk, header.alg)?;
        let key = DecodingKey::from_jwk(jwk).map_err(key_set_error)?;

        let mut validation = Validation::new(header.alg);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(token, &key, &validation).map_err(key_set_error)?;

        // exp 等於現在也視為過期
        if data.claims.exp.is_some_and(|exp| exp <= Utc::now().timestamp()) {
            return Err(key_set_error("ExpiredSignature"));
        }

        tracing::debug!("Token verified successfully with JWK Set");
        log_json("JWT Payload", &data.claims);
        Ok(data.claims)
    }

    /// 遠端接受 token 即視為驗證通過；一併回傳的 claims 為本地解碼，不檢查簽章
    pub async fn verify_with_profile_endpoint(&self, token: &str) -> Result<ProfileVerification> {
        let token = check_structure(token)?;
        let claims = decode_unverified(token)?;
        tracing::debug!("Verifying token with Profile endpoint...");

        let request = self
            .api
            .bearer_request(Method::GET, PROFILE_PATH, token)
            .query(&[("fields", "*")]);

        let response = self
            .api
            .execute(PROFILE_PATH, request)
            .await
            .map_err(|e| OutsetaError::ProfileVerificationError {
                status: None,
                message: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(OutsetaError::ProfileVerificationError {
                status: Some(response.status.as_u16()),
                message: response.error_message(),
            });
        }

        let profile: Profile = serde_json::from_slice(&response.body).map_err(|e| {
            OutsetaError::ProfileVerificationError {
                status: Some(response.status.as_u16()),
                message: format!("Unexpected profile response: {}", e),
            }
        })?;

        tracing::debug!("Token verified successfully with Profile endpoint");
        log_json("Profile Response", &profile);
        log_json("Decoded JWT Payload", &claims);
        Ok(ProfileVerification { claims, profile })
    }

    /// `Both` 先做 JWK Set 驗證；任一步失敗即中止
    pub async fn verify(&self, token: &str, method: VerificationMethod) -> Result<VerificationResult> {
        let token = check_structure(token)?;
        let mut result = VerificationResult::default();

        if method.uses_key_set() {
            tracing::info!("Method 1: Verifying with JWK Set");
            result.key_set_claims = Some(self.verify_with_key_set(token).await?);
        }

        if method.uses_profile() {
            tracing::info!("Method 2: Verifying with Profile Endpoint");
            let verified = self.verify_with_profile_endpoint(token).await?;
            result.profile_claims = Some(verified.claims);
            result.profile = Some(verified.profile);
        }

        Ok(result)
    }
}

/// 三段式 `header.payload.signature`，每段不得為空
pub fn check_structure(token: &str) -> Result<&str> {
    let token = token.trim();
    if token.is_empty() {
        return Err(OutsetaError::validation("JWT token is required"));
    }

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments.iter().any(|segment| segment.is_empty()) {
        return Err(OutsetaError::validation(
            "Invalid JWT format. JWT should have three parts separated by dots.",
        ));
    }
    Ok(token)
}

/// 解碼 payload 段，不檢查簽章
pub fn decode_unverified(token: &str) -> Result<Claims> {
    let token = check_structure(token)?;
    let payload = token.split('.').nth(1).unwrap_or_default();

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| OutsetaError::validation(format!("JWT payload is not base64url: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| OutsetaError::validation(format!("JWT payload is not a JSON object: {}", e)))
}

fn select_key<'a>(key_set: &'a JwkSet, kid: Option<&str>) -> Result<&'a Jwk> {
    let found = match kid {
        Some(kid) => key_set.find(kid),
        None if key_set.keys.len() == 1 => {
            tracing::warn!("Token header has no kid; using the only key in the set");
            key_set.keys.first()
        }
        None => None,
    };

    found.ok_or_else(|| OutsetaError::KeySetVerificationError {
        cause: match kid {
            Some(kid) => format!("no key with kid '{}' in the JSON Web Key Set", kid),
            None => "no applicable key found in the JSON Web Key Set".to_string(),
        },
    })
}

/// 金鑰宣告了 `alg` 時，必須與 token header 的演算法一致
fn check_key_algorithm(jwk: &Jwk, alg: Algorithm) -> Result<()> {
    let Some(declared) = jwk.common.key_algorithm else {
        return Ok(());
    };

    let declared_name = serde_json::to_value(declared).map_err(key_set_error)?;
    let header_name = serde_json::to_value(alg).map_err(key_set_error)?;
    if declared_name != header_name {
        return Err(key_set_error(format!(
            "token algorithm {} does not match key algorithm {}",
            header_name, declared_name
        )));
    }
    Ok(())
}

fn key_set_error(cause: impl fmt::Display) -> OutsetaError {
    OutsetaError::KeySetVerificationError {
        cause: cause.to_string(),
    }
}

fn log_json<T: Serialize>(title: &str, value: &T) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        tracing::debug!(
            "--- {} ---\n{}",
            title,
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CountingKeySource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl KeySetSource for CountingKeySource {
        async fn key_set(&self) -> Result<JwkSet> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(JwkSet { keys: vec![] })
        }
    }

    fn encode_segment(value: &Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
    }

    fn unsigned_token(claims: Value) -> String {
        format!(
            "{}.{}.c2lnbmF0dXJl",
            encode_segment(&json!({"alg": "RS256", "typ": "JWT"})),
            encode_segment(&claims)
        )
    }

    #[test]
    fn test_check_structure_rejects_wrong_segment_counts() {
        for token in ["", "   ", "abc", "a.b", "a.b.c.d", "a..c", ".b.c"] {
            assert!(
                matches!(check_structure(token), Err(OutsetaError::ValidationError { .. })),
                "token {:?} should be rejected",
                token
            );
        }
        assert_eq!(check_structure("  a.b.c \n").unwrap(), "a.b.c");
    }

    #[test]
    fn test_decode_unverified_reads_outseta_claims() {
        let token = unsigned_token(json!({
            "sub": "p1",
            "email": "jane@example.com",
            "outseta:accountUid": "A1",
            "outseta:isPrimary": "true",
            "exp": 1_900_000_000,
            "aud": "acme.outseta.com"
        }));

        let claims = decode_unverified(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("p1"));
        assert_eq!(claims.account_uid.as_deref(), Some("A1"));
        assert_eq!(claims.is_primary, Some(true));
        assert_eq!(claims.extra.get("aud"), Some(&json!("acme.outseta.com")));
    }

    #[test]
    fn test_decode_unverified_rejects_garbage_payload() {
        assert!(matches!(
            decode_unverified("aaa.!!!.ccc"),
            Err(OutsetaError::ValidationError { .. })
        ));
        let not_json = format!("aaa.{}.ccc", URL_SAFE_NO_PAD.encode("not json"));
        assert!(matches!(
            decode_unverified(&not_json),
            Err(OutsetaError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_numeric_dates_may_be_fractional() {
        let token = unsigned_token(json!({"sub": "p1", "iat": 1_700_000_000.75, "exp": 1_900_000_000.5}));

        let claims = decode_unverified(&token).unwrap();
        assert_eq!(claims.iat, Some(1_700_000_000));
        assert_eq!(claims.exp, Some(1_900_000_000));
    }

    #[test]
    fn test_key_algorithm_must_match_header() {
        let jwk: Jwk = serde_json::from_value(json!({
            "kty": "RSA",
            "kid": "k1",
            "alg": "RS256",
            "n": "AQAB",
            "e": "AQAB"
        }))
        .unwrap();

        assert!(check_key_algorithm(&jwk, Algorithm::RS256).is_ok());
        assert!(matches!(
            check_key_algorithm(&jwk, Algorithm::RS512),
            Err(OutsetaError::KeySetVerificationError { .. })
        ));

        let mut undeclared = jwk.clone();
        undeclared.common.key_algorithm = None;
        assert!(check_key_algorithm(&undeclared, Algorithm::RS512).is_ok());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("both".parse::<VerificationMethod>().unwrap(), VerificationMethod::Both);
        assert_eq!("JWKS".parse::<VerificationMethod>().unwrap(), VerificationMethod::KeySet);
        assert_eq!("keyset".parse::<VerificationMethod>().unwrap(), VerificationMethod::KeySet);
        assert_eq!("profile".parse::<VerificationMethod>().unwrap(), VerificationMethod::Profile);
        assert!("magic".parse::<VerificationMethod>().is_err());
        assert_eq!(VerificationMethod::default(), VerificationMethod::Both);
    }

    #[tokio::test]
    async fn test_malformed_token_never_touches_key_source() {
        let source = CountingKeySource::default();
        let calls = source.calls.clone();
        let verifier = TokenVerifier::new(source, OutsetaClient::new("http://127.0.0.1:9", None));

        for method in [
            VerificationMethod::KeySet,
            VerificationMethod::Profile,
            VerificationMethod::Both,
        ] {
            let err = verifier.verify("only.two", method).await.unwrap_err();
            assert!(matches!(err, OutsetaError::ValidationError { .. }));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_key_set_fails_key_set_verification() {
        let verifier = TokenVerifier::new(
            CountingKeySource::default(),
            OutsetaClient::new("http://127.0.0.1:9", None),
        );
        let token = unsigned_token(json!({"sub": "p1"}));

        let err = verifier.verify_with_key_set(&token).await.unwrap_err();
        assert!(matches!(err, OutsetaError::KeySetVerificationError { .. }));
        assert!(err.to_string().starts_with("JWK Set verification failed:"));
    }
}
