//! 消息处理器（MessageHandler）与可选能力
//!
//! 处理器以 `MessageHandler<M>` 作为基础能力，另外可以声明三种相互独立的能力：
//! - `Initializable`：在鉴权之前执行的一次性准备；
//! - `Authorizable`：在 `handle` 之前判断调用主体是否有权执行；
//! - `ResultProducing`：`handle` 完成后可读取的结果，仅用于带结果的单处理器调用。
//!
//! 能力通过 `as_*` 查询方法逐个实例检测，默认返回 `None`；
//! 处理器实现对应 trait 后在查询方法中返回 `Some(self)` 即可。
//! 只实现 trait 而不覆盖查询方法时，分发引擎看不到该能力（例如鉴权会被跳过），
//! 可使用 [`handler_capabilities!`](crate::handler_capabilities) 生成查询方法。
//!
use crate::{identity::Identity, message::Message};
use async_trait::async_trait;
use std::any::{Any, TypeId, type_name};
use tokio_util::sync::CancellationToken;

/// 消息处理器
///
/// 可选能力需要在 `as_*` 中显式暴露：
///
/// ```rust
/// use async_trait::async_trait;
/// use mediator::{Authorizable, CancellationToken, Identity, MessageHandler, message};
///
/// #[message]
/// struct Withdraw {
///     amount: u64,
/// }
///
/// struct WithdrawHandler;
///
/// #[async_trait]
/// impl MessageHandler<Withdraw> for WithdrawHandler {
///     async fn handle(&mut self, cmd: &Withdraw, _c: &CancellationToken) -> anyhow::Result<()> {
///         anyhow::ensure!(cmd.amount > 0, "empty withdrawal");
///         Ok(())
///     }
///
///     mediator::handler_capabilities!(authorizable);
/// }
///
/// #[async_trait]
/// impl Authorizable for WithdrawHandler {
///     async fn is_authorized(&self, who: &Identity, _c: &CancellationToken) -> anyhow::Result<bool> {
///         Ok(who.is_authenticated())
///     }
/// }
/// ```
#[async_trait]
pub trait MessageHandler<M>: Send + Sync + 'static
where
    M: Message,
{
    async fn handle(&mut self, message: &M, cancellation: &CancellationToken)
    -> anyhow::Result<()>;

    fn as_initializable(&mut self) -> Option<&mut dyn Initializable> {
        None
    }

    fn as_authorizable(&self) -> Option<&dyn Authorizable> {
        None
    }

    fn as_result_producing(&mut self) -> Option<&mut dyn DynResultProducing> {
        None
    }
}

/// 在 `MessageHandler<M>` 的 impl 中生成能力查询方法
///
/// 可选 `initializable`、`authorizable`、`result_producing`，可组合；
/// 处理器未实现对应 trait 时编译失败。
#[macro_export]
macro_rules! handler_capabilities {
    (initializable) => {
        fn as_initializable(&mut self) -> ::core::option::Option<&mut dyn $crate::Initializable> {
            ::core::option::Option::Some(self)
        }
    };
    (authorizable) => {
        fn as_authorizable(&self) -> ::core::option::Option<&dyn $crate::Authorizable> {
            ::core::option::Option::Some(self)
        }
    };
    (result_producing) => {
        fn as_result_producing(
            &mut self,
        ) -> ::core::option::Option<&mut dyn $crate::DynResultProducing> {
            ::core::option::Option::Some(self)
        }
    };
    ($first:ident, $($rest:ident),+ $(,)?) => {
        $crate::handler_capabilities!($first);
        $($crate::handler_capabilities!($rest);)+
    };
}

/// 可初始化：每次调用该处理器时执行一次，早于鉴权与处理
#[async_trait]
pub trait Initializable: Send + Sync {
    async fn initialize(&mut self, cancellation: &CancellationToken) -> anyhow::Result<()>;
}

/// 可鉴权：返回 `false` 时处理器不会被执行
#[async_trait]
pub trait Authorizable: Send + Sync {
    async fn is_authorized(
        &self,
        identity: &Identity,
        cancellation: &CancellationToken,
    ) -> anyhow::Result<bool>;
}

/// 产出结果：`handle` 完成后取出
pub trait ResultProducing: Send + Sync {
    type Output: Send + 'static;

    fn take_result(&mut self) -> Self::Output;
}

/// `ResultProducing` 的类型擦除形式，供分发引擎按 `TypeId` 匹配结果类型
pub trait DynResultProducing: Send + Sync {
    fn result_type(&self) -> TypeId;

    fn result_type_name(&self) -> &'static str;

    fn take_boxed_result(&mut self) -> Box<dyn Any + Send>;
}

impl<T> DynResultProducing for T
where
    T: ResultProducing,
{
    fn result_type(&self) -> TypeId {
        TypeId::of::<T::Output>()
    }

    fn result_type_name(&self) -> &'static str {
        type_name::<T::Output>()
    }

    fn take_boxed_result(&mut self) -> Box<dyn Any + Send> {
        Box::new(self.take_result())
    }
}
