// Domain 層：傳輸格式模型與 ports（介面）

pub mod model;
pub mod ports;
