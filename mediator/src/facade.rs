use crate::{dispatcher::OnError, error::MediatorResult, identity::Identity, message::Message};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// 中介者（Mediator）
///
/// 面向调用方的统一入口，屏蔽具体的分发实现：
/// - `invoke`：恰好一个处理器，错误原样传播；
/// - `invoke_with_result`：恰好一个处理器，并返回其结果；
/// - `send`：至少一个处理器，逐个隔离错误；
/// - `publish`：发后即忘，零个处理器亦可。
///
/// 该 trait 带有泛型方法，通常以具体实现类型注入使用。
#[async_trait]
pub trait Mediator: Send + Sync {
    async fn invoke<M>(
        &self,
        message: M,
        identity: Option<&Identity>,
        cancellation: &CancellationToken,
    ) -> MediatorResult<()>
    where
        M: Message;

    async fn invoke_with_result<R, M>(
        &self,
        message: M,
        identity: Option<&Identity>,
        cancellation: &CancellationToken,
    ) -> MediatorResult<R>
    where
        R: Send + 'static,
        M: Message;

    async fn send<M>(
        &self,
        message: M,
        identity: Option<&Identity>,
        on_error: Option<OnError<'_, M>>,
        cancellation: &CancellationToken,
    ) -> MediatorResult<()>
    where
        M: Message;

    async fn publish<M>(
        &self,
        message: M,
        identity: Option<&Identity>,
        on_error: Option<OnError<'_, M>>,
        cancellation: &CancellationToken,
    ) -> MediatorResult<()>
    where
        M: Message;
}
