#[path = "integration/test_helpers.rs"]
mod test_helpers;

use gameframe::core::Message;
use gameframe::core::commands::{CommandHandler, SumHandler};
use test_helpers::TestSession;

#[tokio::test]
async fn test_sum_adds_operands() {
    let mut ts = TestSession::new();
    let request = Message::parse("sum a=10 b=20 seq=3").unwrap();
    SumHandler.handle(&request, &ts.session).await.unwrap();

    let response = Message::parse(&ts.next_line().await).unwrap();
    assert_eq!(response.command(), "sum");
    assert_eq!(response.param("a"), Some("10"));
    assert_eq!(response.param("b"), Some("20"));
    assert_eq!(response.param("result"), Some("30"));
    assert_eq!(response.seq(), Some("3"));
}

#[tokio::test]
async fn test_sum_negative_operands() {
    let mut ts = TestSession::new();
    let request = Message::parse("sum a=-5 b=3").unwrap();
    SumHandler.handle(&request, &ts.session).await.unwrap();

    let response = Message::parse(&ts.next_line().await).unwrap();
    assert_eq!(response.param("result"), Some("-2"));
}

#[tokio::test]
async fn test_sum_missing_operand() {
    let mut ts = TestSession::new();
    let request = Message::parse("sum a=10 seq=7").unwrap();
    SumHandler.handle(&request, &ts.session).await.unwrap();

    let response = Message::parse(&ts.next_line().await).unwrap();
    assert_eq!(response.command(), "error");
    assert_eq!(response.param("code"), Some("INVALID_PARAMETER"));
    assert_eq!(response.seq(), Some("7"));
}

#[tokio::test]
async fn test_sum_non_integer_operand() {
    let mut ts = TestSession::new();
    let request = Message::parse("sum a=ten b=20 seq=8").unwrap();
    SumHandler.handle(&request, &ts.session).await.unwrap();

    let response = Message::parse(&ts.next_line().await).unwrap();
    assert_eq!(response.param("code"), Some("INVALID_PARAMETER"));
    assert_eq!(response.seq(), Some("8"));
}

#[tokio::test]
async fn test_sum_saturates_instead_of_overflowing() {
    let mut ts = TestSession::new();
    let line = format!("sum a={} b=1", i64::MAX);
    let request = Message::parse(&line).unwrap();
    SumHandler.handle(&request, &ts.session).await.unwrap();

    let response = Message::parse(&ts.next_line().await).unwrap();
    assert_eq!(response.param("result"), Some(i64::MAX.to_string().as_str()));
}
