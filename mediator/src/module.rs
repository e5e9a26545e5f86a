//! 启动装配（MessageHandlingModule）
//!
//! 显式、确定性的注册步骤：按声明顺序把 (消息, 处理器, 工厂) 写入注册表与解析器，
//! 然后组装出中介者。注册表在 `build` 之后只读。
//!
//! ```rust
//! use async_trait::async_trait;
//! use mediator::{CancellationToken, Mediator, MessageHandler, MessageHandlingModule, message};
//!
//! #[message]
//! struct Ping;
//!
//! struct PingHandler;
//!
//! #[async_trait]
//! impl MessageHandler<Ping> for PingHandler {
//!     async fn handle(&mut self, _ping: &Ping, _c: &CancellationToken) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mediator = MessageHandlingModule::new()
//!     .handler::<Ping, _, _>(|| Ok(PingHandler))
//!     .build()?;
//! mediator.invoke(Ping, None, &CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```
use crate::{
    config::DispatchConfig,
    dispatcher::Dispatcher,
    error::MediatorResult,
    execution::{ExecutionContext, InProcessExecutionContext},
    handler::MessageHandler,
    in_process_mediator::InProcessMediator,
    message::{Message, MessageType},
    registry::{HandlerRegistry, HandlerType},
    resolver::{FactoryResolver, Resolver},
};
use std::sync::Arc;

/// 注册工厂并返回其槽位
type FactoryRegistration = Box<dyn FnOnce(&FactoryResolver) -> usize + Send>;

struct Registration {
    message_type: MessageType,
    handler_type: HandlerType,
    register_factory: FactoryRegistration,
}

#[derive(Default)]
pub struct MessageHandlingModule {
    registrations: Vec<Registration>,
    config: DispatchConfig,
}

impl MessageHandlingModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明处理器：`H` 处理消息 `M`，实例由 `factory` 在每次分发时创建
    /// 同一 `H` 可以多次声明，每次声明使用各自的工厂
    pub fn handler<M, H, F>(mut self, factory: F) -> Self
    where
        M: Message,
        H: MessageHandler<M>,
        F: Fn() -> anyhow::Result<H> + Send + Sync + 'static,
    {
        self.registrations.push(Registration {
            message_type: MessageType::of::<M>(),
            handler_type: HandlerType::of::<M, H>(),
            register_factory: Box::new(move |resolver| resolver.register::<H, F>(factory)),
        });
        self
    }

    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// 使用进程内执行上下文组装中介者
    pub fn build(self) -> MediatorResult<InProcessMediator> {
        self.build_with(|resolver| -> Arc<dyn ExecutionContext> {
            Arc::new(InProcessExecutionContext::new(resolver))
        })
    }

    /// 由宿主提供执行上下文（例如包裹事务或身份作用域），解析器由本模块提供
    pub fn build_with<F>(self, context: F) -> MediatorResult<InProcessMediator>
    where
        F: FnOnce(Arc<dyn Resolver>) -> Arc<dyn ExecutionContext>,
    {
        let mut registry = HandlerRegistry::new();
        let resolver = FactoryResolver::new();

        // 同一处理器类型的每次声明都对应自己的工厂槽位
        for registration in self.registrations {
            let slot = (registration.register_factory)(&resolver);
            registry.add(
                registration.message_type,
                registration.handler_type.with_slot(slot),
            )?;
        }

        tracing::debug!(
            messages = registry.registered_messages().len(),
            "message handling assembled"
        );

        let context = context(Arc::new(resolver));
        let dispatcher = Dispatcher::new(Arc::new(registry), context, self.config);

        Ok(InProcessMediator::new(Arc::new(dispatcher)))
    }
}
