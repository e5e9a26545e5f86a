use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 可分发的消息（Message）
///
/// 任意值类型，只要声明了该标记契约，即可提交给中介者分发；
/// 分发时以运行时类型（`TypeId`）定位处理器。
/// - 通常通过 `#[message]` 宏实现；
/// - `NAME`：消息的稳定名称，用于日志与错误信息。避免依赖 `type_name::<T>()`。
pub trait Message: Send + Sync + 'static {
    /// 消息的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;
}

/// 消息类型标识：注册表的键
#[derive(Clone, Copy)]
pub struct MessageType {
    id: TypeId,
    name: &'static str,
}

impl MessageType {
    pub fn of<M: Message>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: M::NAME,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageType {}

impl Hash for MessageType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageType({})", self.name)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
