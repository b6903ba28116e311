// Adapters 層：外部系統的具體實作

pub mod http;
pub mod jwks;

pub use http::{ApiResponse, OutsetaClient};
pub use jwks::HttpKeySetSource;
