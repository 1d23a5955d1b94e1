/*
 * Responsibility
 * - 起動時に一度だけ読み込む静的 route 分類 (RouteRule / RouteTable)
 * - path → (minRole, authenticated, ownership scope) の解決
 * - ownership-scoped route の resource id 抽出 (理由コード付きの Result で返す)
 */
pub mod pattern;
pub mod table;

use thiserror::Error;

pub use pattern::PathPattern;
pub use table::{OwnershipScope, ResourceIdError, RouteMatch, RouteRule, RouteTable};

#[derive(Debug, Error)]
pub enum RouteRuleError {
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },
    #[error("ownership-scoped route '{pattern}' must require the merchant role")]
    OwnershipRequiresMerchant { pattern: String },
    #[error("ownership placeholder '{{{param}}}' is not part of route '{pattern}'")]
    UnknownParam { pattern: String, param: String },
    #[error("failed to read route rules: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse route rules: {0}")]
    Json(#[from] serde_json::Error),
}
