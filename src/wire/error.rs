//! 编解码错误

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// 字段无法放进线上格式（编码侧）
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    /// 字节数不够装下正在解码的头部
    #[error("truncated {what}: need {need} bytes, got {got}")]
    Truncated {
        what: &'static str,
        need: usize,
        got: usize,
    },
}

impl WireError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        WireError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
