use crate::{error::ResolutionError, registry::HandlerType};
use async_trait::async_trait;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// 处理器解析器（Resolver）
///
/// 根据处理器类型构造一个新的处理器实例；每次分发、每个处理器各调用一次。
/// 宿主可以接入自己的依赖注入容器，默认提供基于工厂函数的 [`FactoryResolver`]。
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, handler_type: &HandlerType)
    -> Result<Box<dyn Any + Send>, ResolutionError>;
}

type HandlerFactory = Arc<dyn Fn() -> anyhow::Result<Box<dyn Any + Send>> + Send + Sync>;

/// 基于工厂函数的解析器
/// - 按 (处理器 TypeId, 注册槽位) 保存工厂，同一类型的多次注册各自保留；
/// - 每次解析都调用工厂创建新实例，不做缓存。
#[derive(Default)]
pub struct FactoryResolver {
    factories: DashMap<TypeId, Vec<HandlerFactory>>,
}

impl FactoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加处理器工厂，返回其注册槽位（配合 `HandlerType::with_slot` 使用）
    pub fn register<H, F>(&self, factory: F) -> usize
    where
        H: Send + 'static,
        F: Fn() -> anyhow::Result<H> + Send + Sync + 'static,
    {
        let factory: HandlerFactory =
            Arc::new(move || factory().map(|handler| Box::new(handler) as Box<dyn Any + Send>));
        let mut factories = self.factories.entry(TypeId::of::<H>()).or_default();
        factories.push(factory);
        factories.len() - 1
    }

    pub fn contains<H: 'static>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<H>())
    }
}

#[async_trait]
impl Resolver for FactoryResolver {
    async fn resolve(
        &self,
        handler_type: &HandlerType,
    ) -> Result<Box<dyn Any + Send>, ResolutionError> {
        let factory = self
            .factories
            .get(&handler_type.id())
            .and_then(|factories| factories.get(handler_type.slot()).cloned());
        let Some(factory) = factory else {
            return Err(ResolutionError::NotRegistered {
                handler: handler_type.name(),
            });
        };

        factory().map_err(|source| ResolutionError::Construction {
            handler: handler_type.name(),
            source,
        })
    }
}
