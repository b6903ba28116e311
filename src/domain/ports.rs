use crate::utils::error::Result;
use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;

/// 公鑰集合來源；快取層可以包裝此 trait 而不改動驗證邏輯
#[async_trait]
pub trait KeySetSource: Send + Sync {
    async fn key_set(&self) -> Result<JwkSet>;
}

/// 先取得 context，從中解析出依賴，再以解析結果送出變更；
/// 前一步完全成功後才會執行下一步
#[async_trait]
pub trait DependentCall: Send + Sync {
    type Context: Send;
    type Resolved: Send;
    type Output: Send;

    fn describe(&self) -> String;
    async fn fetch_context(&self) -> Result<Self::Context>;
    fn resolve(&self, context: Self::Context) -> Result<Self::Resolved>;
    async fn submit(&self, resolved: Self::Resolved) -> Result<Self::Output>;
}

/// 互動式輸入（問題、選單、確認）
pub trait Prompter {
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String>;
    fn select(&mut self, message: &str, choices: &[String], default: usize) -> Result<usize>;
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;
    fn notify(&mut self, message: &str);
}
