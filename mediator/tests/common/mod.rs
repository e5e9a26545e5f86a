#![allow(dead_code)]

use async_trait::async_trait;
use mediator::{
    Authorizable, CancellationToken, Identity, Initializable, MediatorError, MessageHandler,
    message,
};
use std::sync::{Arc, Mutex};

/// 记录处理器各阶段调用的日志，按发生顺序保存
#[derive(Clone, Default)]
pub struct Journal {
    inner: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.inner.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.inner.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == entry)
            .count()
    }
}

/// 收集扇出模式下被隔离的错误
#[derive(Clone, Default)]
pub struct ErrorSink {
    inner: Arc<Mutex<Vec<(String, MediatorError)>>>,
}

impl ErrorSink {
    pub fn push(&self, identity: &Identity, err: MediatorError) {
        self.inner
            .lock()
            .unwrap()
            .push((identity.name().to_string(), err));
    }

    pub fn take(&self) -> Vec<(String, MediatorError)> {
        std::mem::take(&mut *self.inner.lock().unwrap())
    }
}

#[message]
#[derive(Debug, Clone)]
pub struct Order {
    pub id: u32,
}

#[message]
#[derive(Debug, Clone)]
pub struct Ping;

/// 普通处理器：记录自身名称
pub struct Recording {
    pub label: &'static str,
    pub journal: Journal,
}

#[async_trait]
impl MessageHandler<Order> for Recording {
    async fn handle(&mut self, order: &Order, _c: &CancellationToken) -> anyhow::Result<()> {
        self.journal.record(format!("{}:{}", self.label, order.id));
        Ok(())
    }
}

/// 处理失败的处理器
pub struct Failing {
    pub journal: Journal,
}

#[async_trait]
impl MessageHandler<Order> for Failing {
    async fn handle(&mut self, order: &Order, _c: &CancellationToken) -> anyhow::Result<()> {
        self.journal.record(format!("failing:{}", order.id));
        anyhow::bail!("order {} rejected by stock check", order.id)
    }
}

/// 只允许已认证身份的处理器
pub struct Guarded {
    pub journal: Journal,
}

#[async_trait]
impl MessageHandler<Order> for Guarded {
    async fn handle(&mut self, order: &Order, _c: &CancellationToken) -> anyhow::Result<()> {
        self.journal.record(format!("guarded:{}", order.id));
        Ok(())
    }

    fn as_authorizable(&self) -> Option<&dyn Authorizable> {
        Some(self)
    }
}

#[async_trait]
impl Authorizable for Guarded {
    async fn is_authorized(
        &self,
        identity: &Identity,
        _c: &CancellationToken,
    ) -> anyhow::Result<bool> {
        self.journal.record(format!("authorize:{}", identity.name()));
        Ok(identity.is_authenticated())
    }
}

/// 同时可初始化与可鉴权的处理器，用于校验执行顺序
pub struct Staged {
    pub journal: Journal,
    pub ready: bool,
}

impl Staged {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ready: false,
        }
    }
}

#[async_trait]
impl MessageHandler<Order> for Staged {
    async fn handle(&mut self, _order: &Order, _c: &CancellationToken) -> anyhow::Result<()> {
        anyhow::ensure!(self.ready, "handled before initialization");
        self.journal.record("handle");
        Ok(())
    }

    mediator::handler_capabilities!(initializable, authorizable);
}

#[async_trait]
impl Initializable for Staged {
    async fn initialize(&mut self, _c: &CancellationToken) -> anyhow::Result<()> {
        self.journal.record("initialize");
        self.ready = true;
        Ok(())
    }
}

#[async_trait]
impl Authorizable for Staged {
    async fn is_authorized(
        &self,
        _identity: &Identity,
        _c: &CancellationToken,
    ) -> anyhow::Result<bool> {
        self.journal.record("authorize");
        Ok(true)
    }
}

/// 初始化失败的处理器：鉴权与处理都不应发生
pub struct BrokenInit {
    pub journal: Journal,
}

#[async_trait]
impl MessageHandler<Order> for BrokenInit {
    async fn handle(&mut self, _order: &Order, _c: &CancellationToken) -> anyhow::Result<()> {
        self.journal.record("handle");
        Ok(())
    }

    mediator::handler_capabilities!(initializable, authorizable);
}

#[async_trait]
impl Initializable for BrokenInit {
    async fn initialize(&mut self, _c: &CancellationToken) -> anyhow::Result<()> {
        self.journal.record("initialize");
        anyhow::bail!("connection refused")
    }
}

#[async_trait]
impl Authorizable for BrokenInit {
    async fn is_authorized(
        &self,
        _identity: &Identity,
        _c: &CancellationToken,
    ) -> anyhow::Result<bool> {
        self.journal.record("authorize");
        Ok(true)
    }
}

/// 鉴权本身出错的处理器
pub struct BrokenAuthorize {
    pub journal: Journal,
}

#[async_trait]
impl MessageHandler<Order> for BrokenAuthorize {
    async fn handle(&mut self, _order: &Order, _c: &CancellationToken) -> anyhow::Result<()> {
        self.journal.record("handle");
        Ok(())
    }

    mediator::handler_capabilities!(authorizable);
}

#[async_trait]
impl Authorizable for BrokenAuthorize {
    async fn is_authorized(
        &self,
        _identity: &Identity,
        _c: &CancellationToken,
    ) -> anyhow::Result<bool> {
        self.journal.record("authorize");
        anyhow::bail!("policy store unavailable")
    }
}

/// 鉴权时触发取消：之后的处理步骤应被取消检查拦下
pub struct CancelOnAuthorize {
    pub journal: Journal,
    pub token: CancellationToken,
}

#[async_trait]
impl MessageHandler<Order> for CancelOnAuthorize {
    async fn handle(&mut self, _order: &Order, _c: &CancellationToken) -> anyhow::Result<()> {
        self.journal.record("handle");
        Ok(())
    }

    mediator::handler_capabilities!(authorizable);
}

#[async_trait]
impl Authorizable for CancelOnAuthorize {
    async fn is_authorized(
        &self,
        _identity: &Identity,
        _c: &CancellationToken,
    ) -> anyhow::Result<bool> {
        self.journal.record("authorize");
        self.token.cancel();
        Ok(true)
    }
}
