use mediator::message;
use mediator::message::Message;

#[message]
struct CreateUser {
    #[allow(dead_code)]
    name: String,
}

#[message]
enum AccountEvent {
    #[allow(dead_code)]
    Opened,
    #[allow(dead_code)]
    Closed,
}

fn main() {
    assert_eq!(CreateUser::NAME, "CreateUser");
    assert_eq!(AccountEvent::NAME, "AccountEvent");
}
