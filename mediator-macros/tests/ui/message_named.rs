use mediator::message;
use mediator::message::{Message, MessageType};

#[message(name = "orders.place")]
#[derive(Debug, Clone)]
struct PlaceOrder(u64);

fn main() {
    assert_eq!(PlaceOrder::NAME, "orders.place");
    assert_eq!(MessageType::of::<PlaceOrder>().name(), "orders.place");
    let _ = format!("{:?}", PlaceOrder(1).clone()); // 原有 derive 保持不变
}
