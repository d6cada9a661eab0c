#[path = "integration/test_helpers.rs"]
mod test_helpers;

use gameframe::core::Message;
use gameframe::core::commands::{CommandHandler, PingHandler};
use test_helpers::TestSession;

#[tokio::test]
async fn test_ping_answers_pong() {
    let mut ts = TestSession::new();
    let request = Message::parse("ping").unwrap();
    PingHandler.handle(&request, &ts.session).await.unwrap();

    let response = Message::parse(&ts.next_line().await).unwrap();
    assert_eq!(response.command(), "pong");
    assert_eq!(response.seq(), None);
}

#[tokio::test]
async fn test_ping_echoes_seq() {
    let mut ts = TestSession::new();
    let request = Message::parse("ping seq=9").unwrap();
    PingHandler.handle(&request, &ts.session).await.unwrap();

    assert_eq!(ts.next_line().await, "pong seq=9");
}
