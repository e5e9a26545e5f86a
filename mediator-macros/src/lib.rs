use proc_macro::TokenStream;

mod message;

/// 消息宏
/// 为结构体或枚举实现 `::mediator::message::Message`，使其可以被中介者分发。
/// 支持键值形式：
/// - `#[message]`：消息名称默认为类型名
/// - `#[message(name = "orders.place")]`：指定稳定的消息名称
#[proc_macro_attribute]
pub fn message(attr: TokenStream, item: TokenStream) -> TokenStream {
    message::expand(attr, item)
}
