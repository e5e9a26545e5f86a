use crate::{
    dispatcher::{Dispatcher, OnError},
    error::MediatorResult,
    facade::Mediator,
    identity::Identity,
    message::Message,
    registry::HandlerRegistry,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 进程内中介者：仅持有分发引擎的引用，可作为长生命周期单例克隆共享
#[derive(Clone)]
pub struct InProcessMediator {
    dispatcher: Arc<Dispatcher>,
}

impl InProcessMediator {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn registry(&self) -> &HandlerRegistry {
        self.dispatcher.registry()
    }
}

#[async_trait]
impl Mediator for InProcessMediator {
    async fn invoke<M>(
        &self,
        message: M,
        identity: Option<&Identity>,
        cancellation: &CancellationToken,
    ) -> MediatorResult<()>
    where
        M: Message,
    {
        self.dispatcher
            .invoke_one(message, identity, cancellation)
            .await
    }

    async fn invoke_with_result<R, M>(
        &self,
        message: M,
        identity: Option<&Identity>,
        cancellation: &CancellationToken,
    ) -> MediatorResult<R>
    where
        R: Send + 'static,
        M: Message,
    {
        self.dispatcher
            .invoke_one_with_result::<R, M>(message, identity, cancellation)
            .await
    }

    async fn send<M>(
        &self,
        message: M,
        identity: Option<&Identity>,
        on_error: Option<OnError<'_, M>>,
        cancellation: &CancellationToken,
    ) -> MediatorResult<()>
    where
        M: Message,
    {
        self.dispatcher
            .send_expecting_at_least_one(message, identity, on_error, cancellation)
            .await
    }

    async fn publish<M>(
        &self,
        message: M,
        identity: Option<&Identity>,
        on_error: Option<OnError<'_, M>>,
        cancellation: &CancellationToken,
    ) -> MediatorResult<()>
    where
        M: Message,
    {
        self.dispatcher
            .publish_best_effort(message, identity, on_error, cancellation)
            .await
    }
}
