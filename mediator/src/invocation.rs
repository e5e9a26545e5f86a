//! 单处理器调用协议
//!
//! 每一次处理器调用都在执行上下文的工作单元内完成：
//! 解析实例 → 初始化（可选）→ 鉴权（可选）→ 处理。
//! 顺序固定，每一步开始前检查取消信号。
//!
use crate::{
    error::{MediatorError, MediatorResult, ResolutionError},
    execution::Outcome,
    handler::MessageHandler,
    identity::Identity,
    message::Message,
    registry::HandlerType,
    resolver::Resolver,
};
use futures_core::future::BoxFuture;
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub(crate) type InvokeFn =
    Arc<dyn for<'a> Fn(HandlerCall<'a>) -> BoxFuture<'a, MediatorResult<Outcome>> + Send + Sync>;

/// 调用方期望的结果类型
#[derive(Clone, Copy, Debug)]
pub(crate) struct ResultSlot {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
}

impl ResultSlot {
    pub(crate) fn of<R: 'static>() -> Self {
        Self {
            id: TypeId::of::<R>(),
            name: type_name::<R>(),
        }
    }
}

pub(crate) struct HandlerCall<'a> {
    pub(crate) resolver: &'a dyn Resolver,
    pub(crate) handler_type: &'a HandlerType,
    pub(crate) message: &'a (dyn Any + Send + Sync),
    pub(crate) identity: &'a Identity,
    pub(crate) cancellation: &'a CancellationToken,
    pub(crate) expected_result: Option<ResultSlot>,
}

/// 为 (M, H) 生成类型擦除的调用函数，在注册时捕获泛型
pub(crate) fn invoker<M, H>() -> InvokeFn
where
    M: Message,
    H: MessageHandler<M>,
{
    Arc::new(run::<M, H>)
}

fn run<'a, M, H>(call: HandlerCall<'a>) -> BoxFuture<'a, MediatorResult<Outcome>>
where
    M: Message,
    H: MessageHandler<M>,
{
    Box::pin(run_protocol::<M, H>(call))
}

async fn run_protocol<M, H>(call: HandlerCall<'_>) -> MediatorResult<Outcome>
where
    M: Message,
    H: MessageHandler<M>,
{
    let HandlerCall {
        resolver,
        handler_type,
        message,
        identity,
        cancellation,
        expected_result,
    } = call;

    // 正常情况下这里的 downcast 永远不会失败（注册时 HandlerType 与 M 绑定）
    let Some(message) = message.downcast_ref::<M>() else {
        return Err(MediatorError::TypeMismatch {
            expected: type_name::<M>(),
            found: "unknown",
        });
    };
    let handler_name = handler_type.name();
    let handler_failed = |source: anyhow::Error| MediatorError::HandlerExecution {
        handler: handler_name,
        message: M::NAME,
        source,
    };

    ensure_not_cancelled::<M>(cancellation)?;
    let instance = resolver.resolve(handler_type).await?;
    let mut instance = instance
        .downcast::<H>()
        .map_err(|_| ResolutionError::TypeMismatch {
            expected: type_name::<H>(),
            found: "unknown",
        })?;
    // 同一处理器可能实现多个 MessageHandler<_>，能力查询需显式指定 M
    let handler: &mut H = &mut instance;

    if let Some(expected) = expected_result {
        let produces = <H as MessageHandler<M>>::as_result_producing(handler)
            .is_some_and(|r| r.result_type() == expected.id);
        if !produces {
            return Err(MediatorError::NoResultCapability {
                handler: handler_name,
                result: expected.name,
            });
        }
    }

    if let Some(initializable) = <H as MessageHandler<M>>::as_initializable(handler) {
        ensure_not_cancelled::<M>(cancellation)?;
        tracing::trace!(handler = handler_name, "initializing handler");
        initializable
            .initialize(cancellation)
            .await
            .map_err(handler_failed)?;
    }

    if let Some(authorizable) = <H as MessageHandler<M>>::as_authorizable(handler) {
        ensure_not_cancelled::<M>(cancellation)?;
        let authorized = authorizable
            .is_authorized(identity, cancellation)
            .await
            .map_err(handler_failed)?;
        if !authorized {
            tracing::debug!(
                handler = handler_name,
                identity = %identity,
                "identity rejected by handler"
            );
            return Err(MediatorError::Forbidden {
                identity: identity.clone(),
                message: M::NAME,
                handler: handler_name,
            });
        }
    }

    ensure_not_cancelled::<M>(cancellation)?;
    <H as MessageHandler<M>>::handle(handler, message, cancellation)
        .await
        .map_err(handler_failed)?;

    let outcome = match expected_result {
        Some(_) => <H as MessageHandler<M>>::as_result_producing(handler)
            .map(|r| r.take_boxed_result()),
        None => None,
    };
    Ok(outcome)
}

fn ensure_not_cancelled<M: Message>(cancellation: &CancellationToken) -> MediatorResult<()> {
    if cancellation.is_cancelled() {
        return Err(MediatorError::Cancelled { message: M::NAME });
    }
    Ok(())
}
