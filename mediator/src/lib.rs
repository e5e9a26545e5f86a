//! 进程内类型化消息分发核心（mediator）
//!
//! 提供以消息运行时类型为键的处理器注册表，以及按统一执行约定解析、
//! 鉴权、初始化并调用处理器的分发引擎：
//! - 注册表（`registry`）：消息类型 → 有序的处理器类型列表，启动时构建、之后只读；
//! - 分发引擎（`dispatcher`）：invoke / invoke_with_result / send / publish 四种模式；
//! - 中介者（`facade` / `in_process_mediator`）：面向调用方的统一入口；
//! - 处理器能力（`handler`）：基础处理能力 + 可初始化 / 可鉴权 / 产出结果；
//! - 外部协作者边界：解析器（`resolver`）与执行上下文（`execution`）；
//! - 启动装配（`module`）：显式、确定性的处理器注册。
//!
//! 典型用法：
//! 1. 用 `#[message]` 声明消息，为处理器实现 `MessageHandler<M>`；
//! 2. 通过 `MessageHandlingModule` 按顺序注册处理器工厂并 `build`；
//! 3. 持有 `InProcessMediator`（可克隆的单例），按场景选择四种调用模式。
//!
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod execution;
pub mod facade;
pub mod handler;
pub mod identity;
pub mod in_process_mediator;
mod invocation;
pub mod message;
pub mod module;
pub mod registry;
pub mod resolver;

pub use config::DispatchConfig;
pub use dispatcher::{Dispatcher, OnError};
pub use error::{MediatorError, MediatorResult, ResolutionError};
pub use execution::{ExecutionContext, InProcessExecutionContext, UnitOfWork};
pub use facade::Mediator;
pub use handler::{
    Authorizable, DynResultProducing, Initializable, MessageHandler, ResultProducing,
};
pub use identity::Identity;
pub use in_process_mediator::InProcessMediator;
pub use mediator_macros::message;
pub use message::{Message, MessageType};
pub use module::MessageHandlingModule;
pub use registry::{HandlerDescriptor, HandlerRegistry, HandlerType};
pub use resolver::{FactoryResolver, Resolver};
pub use tokio_util::sync::CancellationToken;

// 允许在本 crate 内部通过 ::mediator 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::mediator 路径。
extern crate self as mediator;
