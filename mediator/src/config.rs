use crate::identity::Identity;
use bon::Builder;

/// 分发配置
#[derive(Builder, Clone, Debug)]
pub struct DispatchConfig {
    /// 调用方未提供身份时使用的身份
    #[builder(default = Identity::anonymous())]
    pub fallback_identity: Identity,
    /// 扇出模式下未提供错误回调时，是否以 warn 级别记录被吞掉的错误
    #[builder(default = true)]
    pub log_isolated_errors: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
