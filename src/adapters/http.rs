use crate::config::{Credential, OutsetaConfig};
use crate::domain::model::ErrorBody;
use crate::utils::error::{OutsetaError, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// Outseta REST 用戶端：組出 base URL 與授權標頭，並將非成功狀態轉為 `ApiError`
#[derive(Debug, Clone)]
pub struct OutsetaClient {
    client: Client,
    base_url: String,
    credential: Option<Credential>,
}

/// 已完成請求的原始狀態碼與主體
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub endpoint: String,
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl OutsetaClient {
    pub fn new(base_url: impl Into<String>, credential: Option<Credential>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential,
        }
    }

    /// 依設定建立；只有明確設定時才加上逾時
    pub fn from_config(config: &OutsetaConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url()?,
            credential: config.credential().ok(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// 帶 `Authorization: Outseta {key}:{secret}` 的請求
    pub fn tenant_request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let credential = self
            .credential
            .as_ref()
            .ok_or_else(|| OutsetaError::MissingConfigError {
                field: "OUTSETA_API_KEY / OUTSETA_API_SECRET".to_string(),
            })?;

        Ok(self
            .client
            .request(method, self.url(path))
            .header(AUTHORIZATION, credential.authorization_header())
            .header(CONTENT_TYPE, "application/json"))
    }

    /// 帶 `Authorization: Bearer {token}` 的請求
    pub fn bearer_request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
    }

    pub async fn execute(&self, endpoint: &str, request: RequestBuilder) -> Result<ApiResponse> {
        tracing::debug!("Making API request to: {}", endpoint);
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        let body = response.bytes().await?.to_vec();
        Ok(ApiResponse {
            endpoint: endpoint.to_string(),
            status,
            body,
        })
    }

    pub async fn get<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = self.tenant_request(Method::GET, path)?.query(query);
        self.execute(path, request).await?.into_json()
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.tenant_request(Method::POST, path)?.json(body);
        self.execute(path, request).await?.into_json()
    }

    pub async fn put<B, T>(&self, path: &str, query: &[(&str, &str)], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.tenant_request(Method::PUT, path)?.query(query).json(body);
        self.execute(path, request).await?.into_json()
    }
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// 錯誤主體不是 JSON 時回傳空白預設值
    pub fn error_body(&self) -> ErrorBody {
        serde_json::from_slice(&self.body).unwrap_or_default()
    }

    pub fn error_message(&self) -> String {
        error_message_from(&self.error_body(), self.status)
    }

    pub fn into_api_error(self) -> OutsetaError {
        let body = self.error_body();
        let validation_errors = body.entity_validation_errors.clone().unwrap_or_default();
        for entity in &validation_errors {
            for line in entity.describe() {
                tracing::debug!("Validation error: {}", line);
            }
        }

        OutsetaError::ApiError {
            message: error_message_from(&body, self.status),
            status: self.status.as_u16(),
            endpoint: self.endpoint,
            validation_errors,
        }
    }

    /// 成功時解碼為 `T`；主體不符合結構時也視為 `ApiError`
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T> {
        if !self.is_success() {
            return Err(self.into_api_error());
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&self.body) {
                tracing::debug!(
                    "--- {} response ---\n{}",
                    self.endpoint,
                    serde_json::to_string_pretty(&value).unwrap_or_default()
                );
            }
        }

        serde_json::from_slice(&self.body).map_err(|e| OutsetaError::ApiError {
            endpoint: self.endpoint.clone(),
            status: self.status.as_u16(),
            message: format!("Unexpected response body: {}", e),
            validation_errors: Vec::new(),
        })
    }
}

/// 將 `segments` 逐段百分比編碼後接在 `prefix` 之後
pub fn resource_path(prefix: &str, segments: &[&str]) -> Result<String> {
    let invalid = || OutsetaError::validation(format!("Invalid resource path: {}", prefix));
    let mut url = Url::parse("http://localhost").map_err(|_| invalid())?;
    url.set_path(prefix);
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .extend(segments);
    Ok(url.path().to_string())
}

/// 依序取 `ErrorMessage` → `Message` → HTTP 狀態說明 → 空字串
pub fn error_message_from(body: &ErrorBody, status: StatusCode) -> String {
    let non_empty = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    };

    non_empty(&body.error_message)
        .or_else(|| non_empty(&body.message))
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_default()
}
