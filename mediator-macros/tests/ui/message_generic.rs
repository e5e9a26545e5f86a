use mediator::message;
use mediator::message::Message;

#[message(name = "envelope")]
struct Envelope<T> {
    #[allow(dead_code)]
    payload: T,
}

fn name_of<M: Message>() -> &'static str {
    M::NAME
}

fn main() {
    assert_eq!(name_of::<Envelope<String>>(), "envelope");
    assert_eq!(name_of::<Envelope<u32>>(), "envelope");
}
