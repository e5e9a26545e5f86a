//! 分发核心统一错误定义
//!
//! 单处理器模式（invoke）原样向调用方传播这些错误；
//! 扇出模式（send/publish）按处理器隔离，交给可选的错误回调。
//!
use crate::identity::Identity;
use thiserror::Error;

/// 解析器无法构造处理器实例
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("handler not registered: handler={handler}")]
    NotRegistered { handler: &'static str },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("handler construction failed: handler={handler}, reason={source}")]
    Construction {
        handler: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MediatorError {
    #[error("no handler found: message={message}")]
    NoHandler { message: &'static str },

    #[error("more than one handler found: message={message}, handlers={handlers:?}")]
    AmbiguousHandler {
        message: &'static str,
        handlers: Vec<&'static str>,
    },

    #[error("handler has no result: handler={handler}, result={result}")]
    NoResultCapability {
        handler: &'static str,
        result: &'static str,
    },

    #[error("forbidden: identity={identity}, message={message}, handler={handler}")]
    Forbidden {
        identity: Identity,
        message: &'static str,
        handler: &'static str,
    },

    #[error("handler failed: handler={handler}, message={message}, reason={source}")]
    HandlerExecution {
        handler: &'static str,
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("resolution: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("cancelled: message={message}")]
    Cancelled { message: &'static str },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// 统一 Result 类型别名
pub type MediatorResult<T> = Result<T, MediatorError>;
