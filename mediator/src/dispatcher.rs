//! 分发引擎（Dispatcher）
//!
//! 四种调用模式：
//! - `invoke_one`：必须恰好一个处理器，错误原样传播；
//! - `invoke_one_with_result`：同上，且处理器需产出指定类型的结果；
//! - `send_expecting_at_least_one`：至少一个处理器，之后与 publish 相同；
//! - `publish_best_effort`：零个处理器即空操作，按注册顺序依次执行，逐个隔离错误。
//!
use crate::{
    config::DispatchConfig,
    error::{MediatorError, MediatorResult},
    execution::{ExecutionContext, Outcome, UnitOfWork, UnitOfWorkFuture},
    identity::Identity,
    invocation::{HandlerCall, ResultSlot},
    message::{Message, MessageType},
    registry::{HandlerRegistry, HandlerType},
};
use std::any::type_name;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// 扇出模式下单个处理器失败时的回调：(消息, 身份, 错误)
pub type OnError<'a, M> = &'a (dyn Fn(&M, &Identity, MediatorError) + Send + Sync);

pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    context: Arc<dyn ExecutionContext>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<HandlerRegistry>,
        context: Arc<dyn ExecutionContext>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            context,
            config,
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// 调用唯一的处理器，错误原样传播给调用方
    pub async fn invoke_one<M>(
        &self,
        message: M,
        identity: Option<&Identity>,
        cancellation: &CancellationToken,
    ) -> MediatorResult<()>
    where
        M: Message,
    {
        let identity = self.identity_or_fallback(identity);
        let handler_type = self.single_handler_type::<M>()?;

        self.invoke_handler(&handler_type, &message, identity, cancellation, None)
            .await
            .map(|_| ())
    }

    /// 调用唯一的处理器并返回其结果
    pub async fn invoke_one_with_result<R, M>(
        &self,
        message: M,
        identity: Option<&Identity>,
        cancellation: &CancellationToken,
    ) -> MediatorResult<R>
    where
        R: Send + 'static,
        M: Message,
    {
        let identity = self.identity_or_fallback(identity);
        let handler_type = self.single_handler_type::<M>()?;
        let slot = ResultSlot::of::<R>();

        let outcome = self
            .invoke_handler(&handler_type, &message, identity, cancellation, Some(slot))
            .await?;

        let Some(boxed) = outcome else {
            return Err(MediatorError::NoResultCapability {
                handler: handler_type.name(),
                result: slot.name,
            });
        };

        match boxed.downcast::<R>() {
            Ok(result) => Ok(*result),
            Err(_) => Err(MediatorError::TypeMismatch {
                expected: type_name::<R>(),
                found: "unknown",
            }),
        }
    }

    /// 至少需要一个处理器；执行方式与 `publish_best_effort` 相同
    pub async fn send_expecting_at_least_one<M>(
        &self,
        message: M,
        identity: Option<&Identity>,
        on_error: Option<OnError<'_, M>>,
        cancellation: &CancellationToken,
    ) -> MediatorResult<()>
    where
        M: Message,
    {
        self.fan_out(true, message, identity, on_error, cancellation)
            .await
    }

    /// 尽力而为地投递给所有处理器
    pub async fn publish_best_effort<M>(
        &self,
        message: M,
        identity: Option<&Identity>,
        on_error: Option<OnError<'_, M>>,
        cancellation: &CancellationToken,
    ) -> MediatorResult<()>
    where
        M: Message,
    {
        self.fan_out(false, message, identity, on_error, cancellation)
            .await
    }

    async fn fan_out<M>(
        &self,
        expect_at_least_one: bool,
        message: M,
        identity: Option<&Identity>,
        on_error: Option<OnError<'_, M>>,
        cancellation: &CancellationToken,
    ) -> MediatorResult<()>
    where
        M: Message,
    {
        let identity = self.identity_or_fallback(identity);
        let handler_types = self.registry.lookup(&MessageType::of::<M>());

        if expect_at_least_one && handler_types.is_empty() {
            return Err(MediatorError::NoHandler { message: M::NAME });
        }

        tracing::debug!(
            message_type = M::NAME,
            handlers = handler_types.len(),
            "fanning out message"
        );

        for handler_type in &handler_types {
            if cancellation.is_cancelled() {
                return Err(MediatorError::Cancelled { message: M::NAME });
            }

            let Err(err) = self
                .invoke_handler(handler_type, &message, identity, cancellation, None)
                .await
            else {
                continue;
            };

            // 取消属于整个调用，不按处理器隔离
            if let MediatorError::Cancelled { .. } = err {
                return Err(err);
            }

            match on_error {
                Some(callback) => callback(&message, identity, err),
                None if self.config.log_isolated_errors => {
                    tracing::warn!(
                        message_type = M::NAME,
                        handler = handler_type.name(),
                        error = %err,
                        "handler failed, error discarded"
                    );
                }
                None => {}
            }
        }

        Ok(())
    }

    async fn invoke_handler<M>(
        &self,
        handler_type: &HandlerType,
        message: &M,
        identity: &Identity,
        cancellation: &CancellationToken,
        expected_result: Option<ResultSlot>,
    ) -> MediatorResult<Outcome>
    where
        M: Message,
    {
        let span = tracing::debug_span!(
            "handle_message",
            message_type = M::NAME,
            handler = handler_type.name()
        );

        let unit_of_work: UnitOfWork<'_> = Box::new(move |resolver, cancellation| {
            let work: UnitOfWorkFuture<'_> = Box::pin(async move {
                handler_type
                    .invoke(HandlerCall {
                        resolver: resolver.as_ref(),
                        handler_type,
                        message,
                        identity,
                        cancellation: &cancellation,
                        expected_result,
                    })
                    .await
            });
            work
        });

        self.context
            .execute(identity, cancellation, unit_of_work)
            .instrument(span)
            .await
    }

    fn single_handler_type<M: Message>(&self) -> MediatorResult<HandlerType> {
        let mut handler_types = self.registry.lookup(&MessageType::of::<M>());

        match handler_types.len() {
            0 => Err(MediatorError::NoHandler { message: M::NAME }),
            1 => Ok(handler_types.remove(0)),
            _ => Err(MediatorError::AmbiguousHandler {
                message: M::NAME,
                handlers: handler_types.iter().map(HandlerType::name).collect(),
            }),
        }
    }

    fn identity_or_fallback<'a>(&'a self, identity: Option<&'a Identity>) -> &'a Identity {
        identity.unwrap_or(&self.config.fallback_identity)
    }
}
