//! 执行上下文（ExecutionContext）
//!
//! 宿主运行时提供的环境边界：在其事务/身份作用域内执行一个工作单元，
//! 并原样返回工作单元的结果或错误。解析与处理在同一个工作单元内完成。
//!
use crate::{error::MediatorResult, identity::Identity, resolver::Resolver};
use async_trait::async_trait;
use futures_core::future::BoxFuture;
use std::any::Any;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// 工作单元的产出：仅在调用方请求结果时携带处理器结果
pub type Outcome = Option<Box<dyn Any + Send>>;

pub type UnitOfWorkFuture<'a> = BoxFuture<'a, MediatorResult<Outcome>>;

/// 工作单元：接收作用域内的解析器与取消信号
pub type UnitOfWork<'a> =
    Box<dyn FnOnce(Arc<dyn Resolver>, CancellationToken) -> UnitOfWorkFuture<'a> + Send + 'a>;

#[async_trait]
pub trait ExecutionContext: Send + Sync {
    async fn execute<'a>(
        &'a self,
        identity: &'a Identity,
        cancellation: &'a CancellationToken,
        unit_of_work: UnitOfWork<'a>,
    ) -> MediatorResult<Outcome>;
}

/// 进程内执行上下文
/// - 直接在调用方的执行流上运行工作单元；
/// - 以 tracing span 承载身份信息，不引入事务语义。
pub struct InProcessExecutionContext {
    resolver: Arc<dyn Resolver>,
}

impl InProcessExecutionContext {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl ExecutionContext for InProcessExecutionContext {
    async fn execute<'a>(
        &'a self,
        identity: &'a Identity,
        cancellation: &'a CancellationToken,
        unit_of_work: UnitOfWork<'a>,
    ) -> MediatorResult<Outcome> {
        let span = tracing::debug_span!(
            "unit_of_work",
            identity = %identity,
            authenticated = identity.is_authenticated()
        );

        unit_of_work(self.resolver.clone(), cancellation.clone())
            .instrument(span)
            .await
    }
}
