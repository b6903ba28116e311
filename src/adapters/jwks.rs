use crate::adapters::http::OutsetaClient;
use crate::domain::ports::KeySetSource;
use crate::utils::error::{OutsetaError, Result};
use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use reqwest::Client;

pub const JWKS_PATH: &str = "/.well-known/jwks";

/// 每次呼叫都重新抓取租戶公開的 JWK Set（不快取）
#[derive(Debug, Clone)]
pub struct HttpKeySetSource {
    client: Client,
    url: String,
}

impl HttpKeySetSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn for_tenant(api: &OutsetaClient) -> Self {
        Self::new(api.http().clone(), api.url(JWKS_PATH))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl KeySetSource for HttpKeySetSource {
    async fn key_set(&self) -> Result<JwkSet> {
        tracing::debug!("Fetching JWK Set from {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(OutsetaError::ApiError {
                endpoint: JWKS_PATH.to_string(),
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or_default().to_string(),
                validation_errors: Vec::new(),
            });
        }

        let key_set: JwkSet = response.json().await?;
        tracing::debug!("JWK Set contains {} key(s)", key_set.keys.len());
        Ok(key_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetches_fresh_key_set_every_call() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path(JWKS_PATH);
            then.status(200).json_body(json!({
                "keys": [{
                    "kty": "RSA",
                    "kid": "k1",
                    "use": "sig",
                    "alg": "RS256",
                    "n": "sXchDaQebHnPiGvyDOAT4saGEUetSyo9MKLOoWFsueri23bOdgWp4Dy1WlUzewbgBHod5pcM9H95GQRV3JDXboIRROSBigeC5yjU1hGzHHyXss8UDprecbAYxknTcQkhslANGRUZmdTOQ5qTRsLAt6BTYuyvVRdhS8exSZEy_c4gs_7svlJJQ4H9_NxsiIoLwAEk7-Q3UXERGYw_75IDrGA84-lA_-Ct4eTlXHBIY2EaV7t7LjJaynVJCpkv4LKjTTAumiGUIuQhrNhZLuF_RJLqHpM2kgWFLU7-VTdL1VbC2tejvcI2BlMkEpk1BzBZI0KQB0GaDWFLN-aEAw3vRw",
                    "e": "AQAB"
                }]
            }));
        });

        let source = HttpKeySetSource::new(Client::new(), server.url(JWKS_PATH));
        let first = source.key_set().await.unwrap();
        let second = source.key_set().await.unwrap();

        mock.assert_hits(2);
        assert_eq!(first.keys.len(), 1);
        assert!(second.find("k1").is_some());
    }

    #[test]
    fn test_for_tenant_uses_well_known_path() {
        let api = OutsetaClient::new("https://demo.outseta.com/", None);
        let source = HttpKeySetSource::for_tenant(&api);
        assert_eq!(source.url(), "https://demo.outseta.com/.well-known/jwks");
    }

    #[tokio::test]
    async fn test_unavailable_endpoint_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(JWKS_PATH);
            then.status(503);
        });

        let source = HttpKeySetSource::new(Client::new(), server.url(JWKS_PATH));
        let err = source.key_set().await.unwrap_err();
        assert!(err.to_string().contains("[503]"));
    }
}
