use bon::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 调用主体（Identity）
///
/// 一次分发调用的执行者。调用方未提供时使用匿名身份；
/// 原样传递给可鉴权处理器与执行上下文，不做解释。
///
/// ```rust
/// use mediator::identity::Identity;
///
/// let alice = Identity::builder()
///     .name("alice")
///     .authentication_type("bearer")
///     .authenticated(true)
///     .build();
/// assert!(alice.is_authenticated());
/// assert!(Identity::default().is_anonymous());
/// ```
#[derive(Builder, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// 主体名称
    #[builder(into)]
    name: String,
    /// 认证方式（如 bearer、cookie、system）
    #[builder(into)]
    authentication_type: Option<String>,
    /// 是否已认证
    #[builder(default)]
    authenticated: bool,
}

impl Identity {
    pub const ANONYMOUS: &'static str = "ANONYMOUS";
    pub const SYSTEM: &'static str = "SYSTEM";

    /// 匿名身份：未认证
    pub fn anonymous() -> Self {
        Self {
            name: Self::ANONYMOUS.to_string(),
            authentication_type: None,
            authenticated: false,
        }
    }

    /// 系统身份：后台任务等非用户发起的调用
    pub fn system() -> Self {
        Self {
            name: Self::SYSTEM.to_string(),
            authentication_type: Some("system".to_string()),
            authenticated: true,
        }
    }

    /// 已认证的普通用户
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            authentication_type: None,
            authenticated: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn authentication_type(&self) -> Option<&str> {
        self.authentication_type.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_anonymous(&self) -> bool {
        !self.authenticated && self.name == Self::ANONYMOUS
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
