use crate::{
    error::{MediatorError, MediatorResult},
    execution::Outcome,
    handler::MessageHandler,
    invocation::{self, HandlerCall, InvokeFn},
    message::{Message, MessageType},
};
use futures_core::future::BoxFuture;
use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;

/// 处理器类型标识
///
/// 指向一个可构造的处理器类型（而非实例），可比较、可廉价克隆。
/// 构造时捕获 `MessageHandler<M>` 的泛型调用入口，分发时无需反射。
/// `slot` 区分同一处理器类型的多次注册，解析器据此选择对应的工厂。
#[derive(Clone)]
pub struct HandlerType {
    id: TypeId,
    name: &'static str,
    message_type: MessageType,
    slot: usize,
    invoke: InvokeFn,
}

impl HandlerType {
    pub fn of<M, H>() -> Self
    where
        M: Message,
        H: MessageHandler<M>,
    {
        Self {
            id: TypeId::of::<H>(),
            name: type_name::<H>(),
            message_type: MessageType::of::<M>(),
            slot: 0,
            invoke: invocation::invoker::<M, H>(),
        }
    }

    /// 指定注册槽位（同一处理器类型第几次注册）
    pub fn with_slot(mut self, slot: usize) -> Self {
        self.slot = slot;
        self
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 该处理器所处理的消息类型
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub(crate) fn invoke<'a>(
        &self,
        call: HandlerCall<'a>,
    ) -> BoxFuture<'a, MediatorResult<Outcome>> {
        (self.invoke)(call)
    }
}

impl PartialEq for HandlerType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.message_type == other.message_type && self.slot == other.slot
    }
}

impl Eq for HandlerType {}

impl fmt::Debug for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerType")
            .field("name", &self.name)
            .field("message_type", &self.message_type)
            .field("slot", &self.slot)
            .finish()
    }
}

/// (消息类型, 处理器类型) 描述符
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerDescriptor {
    pub message_type: MessageType,
    pub handler_type: HandlerType,
}

impl HandlerDescriptor {
    pub fn of<M, H>() -> Self
    where
        M: Message,
        H: MessageHandler<M>,
    {
        Self {
            message_type: MessageType::of::<M>(),
            handler_type: HandlerType::of::<M, H>(),
        }
    }
}

/// 处理器注册表
///
/// - 消息类型 → 有序的处理器类型列表；
/// - 只追加：同一键的多次注册按插入顺序保留，重复的 (消息, 处理器) 对也不去重；
/// - 写入需要 `&mut self`：启动装配阶段写入，放入 `Arc` 共享后只读。
///
/// 组装完成后只能拿到只读视图：
///
/// ```rust,compile_fail
/// use async_trait::async_trait;
/// use mediator::{
///     CancellationToken, HandlerType, MessageHandler, MessageHandlingModule, MessageType, message,
/// };
///
/// #[message]
/// struct Ping;
///
/// struct PingHandler;
///
/// #[async_trait]
/// impl MessageHandler<Ping> for PingHandler {
///     async fn handle(&mut self, _m: &Ping, _c: &CancellationToken) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
///
/// let mediator = MessageHandlingModule::new().build().unwrap();
/// mediator
///     .registry()
///     .add(MessageType::of::<Ping>(), HandlerType::of::<Ping, PingHandler>())
///     .unwrap();
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<TypeId, (MessageType, Vec<HandlerType>)>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条描述符；处理器类型必须声明为处理该消息类型
    pub fn add(
        &mut self,
        message_type: MessageType,
        handler_type: HandlerType,
    ) -> MediatorResult<()> {
        if handler_type.message_type() != message_type {
            return Err(MediatorError::TypeMismatch {
                expected: message_type.name(),
                found: handler_type.message_type().name(),
            });
        }

        tracing::debug!(
            message_type = message_type.name(),
            handler = handler_type.name(),
            "handler registered"
        );

        self.handlers
            .entry(message_type.id())
            .or_insert_with(|| (message_type, Vec::new()))
            .1
            .push(handler_type);

        Ok(())
    }

    pub fn add_descriptor(&mut self, descriptor: HandlerDescriptor) -> MediatorResult<()> {
        self.add(descriptor.message_type, descriptor.handler_type)
    }

    /// 按插入顺序返回处理器类型；未注册的消息类型返回空列表
    pub fn lookup(&self, message_type: &MessageType) -> Vec<HandlerType> {
        self.handlers
            .get(&message_type.id())
            .map(|(_, handler_types)| handler_types.clone())
            .unwrap_or_default()
    }

    pub fn lookup_for<M: Message>(&self) -> Vec<HandlerType> {
        self.lookup(&MessageType::of::<M>())
    }

    pub fn handler_count(&self, message_type: &MessageType) -> usize {
        self.handlers
            .get(&message_type.id())
            .map_or(0, |(_, handler_types)| handler_types.len())
    }

    /// 全部描述符（消息之间无顺序保证，同一消息内保持插入顺序）
    pub fn descriptors(&self) -> Vec<HandlerDescriptor> {
        self.handlers
            .values()
            .flat_map(|(message_type, handler_types)| {
                handler_types
                    .iter()
                    .map(|handler_type| HandlerDescriptor {
                        message_type: *message_type,
                        handler_type: handler_type.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// 获取已注册的消息名列表（只读视图）
    pub fn registered_messages(&self) -> Vec<&'static str> {
        self.handlers
            .values()
            .map(|(message_type, _)| message_type.name())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::task::JoinSet;
    use tokio_util::sync::CancellationToken;

    #[crate::message]
    struct Order;

    #[crate::message]
    struct Ping;

    struct First;
    struct Second;

    #[async_trait]
    impl MessageHandler<Order> for First {
        async fn handle(&mut self, _m: &Order, _c: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl MessageHandler<Order> for Second {
        async fn handle(&mut self, _m: &Order, _c: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl MessageHandler<Ping> for First {
        async fn handle(&mut self, _m: &Ping, _c: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn lookup_of_unregistered_message_is_empty() {
        let registry = HandlerRegistry::new();
        assert!(registry.lookup_for::<Ping>().is_empty());
        assert_eq!(registry.handler_count(&MessageType::of::<Ping>()), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn lookup_preserves_insertion_order_and_duplicates() {
        let mut registry = HandlerRegistry::new();
        let order = MessageType::of::<Order>();
        registry.add(order, HandlerType::of::<Order, Second>()).unwrap();
        registry.add(order, HandlerType::of::<Order, First>()).unwrap();
        registry.add(order, HandlerType::of::<Order, Second>()).unwrap();

        let names: Vec<_> = registry
            .lookup(&order)
            .iter()
            .map(|h| h.name().rsplit("::").next().unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["Second", "First", "Second"]);
        assert_eq!(registry.handler_count(&order), 3);
        assert_eq!(registry.registered_messages(), vec!["Order"]);
    }

    #[test]
    fn same_handler_type_is_keyed_per_message() {
        let mut registry = HandlerRegistry::new();
        registry
            .add_descriptor(HandlerDescriptor::of::<Order, First>())
            .unwrap();
        registry
            .add_descriptor(HandlerDescriptor::of::<Ping, First>())
            .unwrap();

        let for_order = registry.lookup_for::<Order>();
        let for_ping = registry.lookup_for::<Ping>();
        assert_eq!(for_order.len(), 1);
        assert_eq!(for_ping.len(), 1);
        assert_eq!(for_order[0].id(), for_ping[0].id());
        assert_ne!(for_order[0], for_ping[0]);
        assert_eq!(registry.descriptors().len(), 2);
    }

    #[test]
    fn slots_distinguish_repeated_registrations() {
        let mut registry = HandlerRegistry::new();
        let order = MessageType::of::<Order>();
        registry
            .add(order, HandlerType::of::<Order, First>().with_slot(0))
            .unwrap();
        registry
            .add(order, HandlerType::of::<Order, First>().with_slot(1))
            .unwrap();

        let handler_types = registry.lookup(&order);
        assert_eq!(handler_types.len(), 2);
        assert_eq!(handler_types[0].id(), handler_types[1].id());
        assert_eq!(handler_types[1].slot(), 1);
        assert_ne!(handler_types[0], handler_types[1]);
    }

    #[test]
    fn add_rejects_handler_declared_for_another_message() {
        let mut registry = HandlerRegistry::new();
        let err = registry
            .add(MessageType::of::<Ping>(), HandlerType::of::<Order, First>())
            .unwrap_err();
        match err {
            MediatorError::TypeMismatch { expected, found } => {
                assert_eq!(expected, "Ping");
                assert_eq!(found, "Order");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(registry.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_lookup_is_safe() {
        let mut registry = HandlerRegistry::new();
        registry
            .add_descriptor(HandlerDescriptor::of::<Order, First>())
            .unwrap();
        registry
            .add_descriptor(HandlerDescriptor::of::<Order, Second>())
            .unwrap();
        let registry = Arc::new(registry);

        let mut set = JoinSet::new();
        for _ in 0..64 {
            let registry = registry.clone();
            set.spawn(async move { registry.lookup_for::<Order>().len() });
        }
        while let Some(res) = set.join_next().await {
            assert_eq!(res.unwrap(), 2);
        }
    }
}
