use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// 后端没有给出可读错误信息时返回给调用方的提示
pub const BACKEND_FALLBACK_MESSAGE: &str =
    "An unexpected error occurred. Please check your API key.";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Backend(String),

    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部错误: {0}")]
    Other(String),
}

impl EngineError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl From<anyhow::Error> for EngineError {
    fn from(value: anyhow::Error) -> Self {
        Self::Other(format!("{value:#}"))
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(value: reqwest::Error) -> Self {
        Self::Backend(value.to_string())
    }
}
