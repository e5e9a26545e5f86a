use async_trait::async_trait;
use mediator::{
    Authorizable, CancellationToken, DynResultProducing, Identity, Mediator, MediatorError,
    MessageHandler, MessageHandlingModule, OnError, ResultProducing, message,
};

#[message(name = "orders.place")]
#[derive(Debug)]
struct PlaceOrder {
    id: u32,
    amount: u64,
}

#[message(name = "orders.placed")]
#[derive(Debug)]
struct OrderPlaced {
    id: u32,
}

#[message]
#[derive(Debug)]
struct Ping;

/// 下单并返回订单金额
#[derive(Default)]
struct PlaceOrderHandler {
    accepted: u64,
}

#[async_trait]
impl MessageHandler<PlaceOrder> for PlaceOrderHandler {
    async fn handle(&mut self, cmd: &PlaceOrder, _c: &CancellationToken) -> anyhow::Result<()> {
        println!("PlaceOrder: id={}, amount={}", cmd.id, cmd.amount);
        self.accepted = cmd.amount;
        Ok(())
    }

    fn as_authorizable(&self) -> Option<&dyn Authorizable> {
        Some(self)
    }

    fn as_result_producing(&mut self) -> Option<&mut dyn DynResultProducing> {
        Some(self)
    }
}

#[async_trait]
impl Authorizable for PlaceOrderHandler {
    async fn is_authorized(
        &self,
        identity: &Identity,
        _c: &CancellationToken,
    ) -> anyhow::Result<bool> {
        Ok(identity.is_authenticated())
    }
}

impl ResultProducing for PlaceOrderHandler {
    type Output = u64;

    fn take_result(&mut self) -> u64 {
        self.accepted
    }
}

struct SendReceipt;

#[async_trait]
impl MessageHandler<OrderPlaced> for SendReceipt {
    async fn handle(&mut self, evt: &OrderPlaced, _c: &CancellationToken) -> anyhow::Result<()> {
        println!("SendReceipt: order={}", evt.id);
        Ok(())
    }
}

struct SyncWarehouse;

#[async_trait]
impl MessageHandler<OrderPlaced> for SyncWarehouse {
    async fn handle(&mut self, evt: &OrderPlaced, _c: &CancellationToken) -> anyhow::Result<()> {
        anyhow::bail!("warehouse offline, order={}", evt.id)
    }
}

struct Audit;

#[async_trait]
impl MessageHandler<OrderPlaced> for Audit {
    async fn handle(&mut self, evt: &OrderPlaced, _c: &CancellationToken) -> anyhow::Result<()> {
        println!("Audit: order={}", evt.id);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mediator = MessageHandlingModule::new()
        .handler::<PlaceOrder, _, _>(|| Ok(PlaceOrderHandler::default()))
        .handler::<OrderPlaced, _, _>(|| Ok(SendReceipt))
        .handler::<OrderPlaced, _, _>(|| Ok(SyncWarehouse))
        .handler::<OrderPlaced, _, _>(|| Ok(Audit))
        .build()?;
    let token = CancellationToken::new();
    let alice = Identity::user("alice");

    let amount: u64 = mediator
        .invoke_with_result(
            PlaceOrder {
                id: 42,
                amount: 1_999,
            },
            Some(&alice),
            &token,
        )
        .await?;
    println!("accepted amount={amount}");

    // 单个处理器失败不影响其余处理器
    let on_error: OnError<'_, OrderPlaced> =
        &|evt: &OrderPlaced, identity: &Identity, err: MediatorError| {
            eprintln!(
                "isolated failure: order={}, identity={identity}, error={err}",
                evt.id
            );
        };
    mediator
        .publish(OrderPlaced { id: 42 }, Some(&alice), Some(on_error), &token)
        .await?;

    // 匿名身份 -> Forbidden
    if let Err(err @ MediatorError::Forbidden { .. }) = mediator
        .invoke(PlaceOrder { id: 43, amount: 5 }, None, &token)
        .await
    {
        eprintln!("Forbidden as expected: {err}");
    }

    // 未注册的消息：publish 为空操作，invoke 返回 NoHandler
    mediator.publish(Ping, None, None, &token).await?;
    if let Err(MediatorError::NoHandler { message }) = mediator.invoke(Ping, None, &token).await {
        eprintln!("NoHandler as expected for message: {message}");
    }

    Ok(())
}
