// tests/integration/server_test.rs

use gameframe::config::Config;
use gameframe::core::Message;
use gameframe::server;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

struct TestServer {
    addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
    handle: JoinHandle<()>,
}

async fn start_server(mut config: Config) -> TestServer {
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    config.metrics.enabled = false;
    let ctx = server::setup(config).await.expect("server setup");
    let addr = ctx.local_addr().expect("bound address");
    let shutdown_tx = ctx.shutdown_tx.clone();
    let handle = tokio::spawn(server::serve(ctx));
    TestServer {
        addr,
        shutdown_tx,
        handle,
    }
}

struct Client {
    reader: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    /// Connects and consumes the five-line welcome banner.
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect");
        let (read_half, writer) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(read_half).lines(),
            writer,
        };
        let banner = client.recv_line().await.expect("welcome line");
        assert!(banner.contains("welcome"));
        for _ in 0..4 {
            client.recv_line().await.expect("banner line");
        }
        client
    }

    async fn send_line(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("write");
    }

    /// The next line, or `None` on clean EOF.
    async fn recv_line(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(10), self.reader.next_line())
            .await
            .expect("timed out waiting for a line")
            .expect("read")
    }

    async fn recv_message(&mut self) -> Message {
        let line = self.recv_line().await.expect("a response line");
        Message::parse(&line).expect("parseable response")
    }
}

#[tokio::test]
async fn test_echo_round_trip() {
    let server = start_server(Config::default()).await;
    let mut client = Client::connect(server.addr).await;

    client.send_line("echo msg=hello seq=1").await;
    let response = client.recv_message().await;
    assert_eq!(response.command(), "echo");
    assert_eq!(response.param("msg"), Some("hello"));
    assert_eq!(response.seq(), Some("1"));
    server.handle.abort();
}

#[tokio::test]
async fn test_sum_and_invalid_operands() {
    let server = start_server(Config::default()).await;
    let mut client = Client::connect(server.addr).await;

    client.send_line("sum a=10 b=32 seq=2").await;
    let response = client.recv_message().await;
    assert_eq!(response.param("result"), Some("42"));
    assert_eq!(response.seq(), Some("2"));

    client.send_line("sum a=2 b=abc seq=3").await;
    let response = client.recv_message().await;
    assert_eq!(response.command(), "error");
    assert_eq!(response.param("code"), Some("INVALID_PARAMETER"));
    assert_eq!(response.seq(), Some("3"));
    server.handle.abort();
}

#[tokio::test]
async fn test_unknown_command_and_parse_error() {
    let server = start_server(Config::default()).await;
    let mut client = Client::connect(server.addr).await;

    client.send_line("teleport x=1 seq=4").await;
    let response = client.recv_message().await;
    assert_eq!(response.param("code"), Some("UNKNOWN_COMMAND"));
    assert_eq!(response.seq(), Some("4"));

    // Malformed parameter token: connection survives, no seq is echoed.
    client.send_line("echo msg").await;
    let response = client.recv_message().await;
    assert_eq!(response.param("code"), Some("PARSE_ERROR"));
    assert_eq!(response.param("message"), Some("invalid_format"));
    assert_eq!(response.seq(), None);

    // Still serving afterwards.
    client.send_line("ping seq=5").await;
    let response = client.recv_message().await;
    assert_eq!(response.command(), "pong");
    assert_eq!(response.seq(), Some("5"));
    server.handle.abort();
}

#[tokio::test]
async fn test_time_command() {
    let server = start_server(Config::default()).await;
    let mut client = Client::connect(server.addr).await;

    client.send_line("time seq=6").await;
    let response = client.recv_message().await;
    assert_eq!(response.command(), "time");
    assert!(response.param("timestamp").unwrap().parse::<i64>().is_ok());
    assert!(response.param("datetime").unwrap().contains('T'));
    server.handle.abort();
}

#[tokio::test]
async fn test_player_save_and_get() {
    let server = start_server(Config::default()).await;
    let mut client = Client::connect(server.addr).await;

    client.send_line("player-save name=alice level=10 seq=1").await;
    let response = client.recv_message().await;
    assert_eq!(response.param("ok"), Some("true"));
    let id = response.param("id").expect("assigned id").to_string();

    client.send_line(&format!("player-get id={id} seq=2")).await;
    let response = client.recv_message().await;
    assert_eq!(response.param("ok"), Some("true"));
    assert_eq!(response.param("name"), Some("alice"));
    assert_eq!(response.param("level"), Some("10"));

    // Persistence is shared across connections of one server.
    let mut other = Client::connect(server.addr).await;
    other.send_line(&format!("player-get id={id}")).await;
    let response = other.recv_message().await;
    assert_eq!(response.param("name"), Some("alice"));
    server.handle.abort();
}

#[tokio::test]
async fn test_quit_closes_connection() {
    let server = start_server(Config::default()).await;
    let mut client = Client::connect(server.addr).await;

    client.send_line("quit").await;
    assert_eq!(client.recv_line().await.as_deref(), Some("bye!"));
    assert_eq!(client.recv_line().await, None);
    server.handle.abort();
}

#[tokio::test]
async fn test_exit_is_case_insensitive() {
    let server = start_server(Config::default()).await;
    let mut client = Client::connect(server.addr).await;

    client.send_line("EXIT").await;
    assert_eq!(client.recv_line().await.as_deref(), Some("bye!"));
    assert_eq!(client.recv_line().await, None);
    server.handle.abort();
}

#[tokio::test]
async fn test_writer_idle_sends_ping() {
    let mut config = Config::default();
    config.idle.writer_secs = 1;
    config.idle.reader_secs = 60;
    let server = start_server(config).await;
    let mut client = Client::connect(server.addr).await;

    // No traffic in either direction: the server probes with a ping.
    assert_eq!(client.recv_line().await.as_deref(), Some("ping"));
    server.handle.abort();
}

#[tokio::test]
async fn test_reader_idle_closes_connection() {
    let mut config = Config::default();
    config.idle.reader_secs = 1;
    config.idle.writer_secs = 60;
    let server = start_server(config).await;
    let mut client = Client::connect(server.addr).await;

    // Send nothing: the server closes the silent connection.
    assert_eq!(client.recv_line().await, None);
    server.handle.abort();
}

#[tokio::test]
async fn test_inbound_traffic_resets_reader_idle() {
    let mut config = Config::default();
    config.idle.reader_secs = 2;
    config.idle.writer_secs = 60;
    let server = start_server(config).await;
    let mut client = Client::connect(server.addr).await;

    // Keep the connection busy past the idle threshold.
    for seq in 0..3 {
        tokio::time::sleep(Duration::from_millis(900)).await;
        client.send_line(&format!("ping seq={seq}")).await;
        let response = client.recv_message().await;
        assert_eq!(response.command(), "pong");
    }
    server.handle.abort();
}

#[tokio::test]
async fn test_graceful_shutdown_notifies_clients() {
    let server = start_server(Config::default()).await;
    let mut client = Client::connect(server.addr).await;

    server.shutdown_tx.send(()).expect("shutdown signal");

    assert_eq!(
        client.recv_line().await.as_deref(),
        Some("server is shutting down")
    );
    assert_eq!(client.recv_line().await, None);

    tokio::time::timeout(Duration::from_secs(10), server.handle)
        .await
        .expect("server should stop")
        .expect("serve task should not panic");
}

#[tokio::test]
async fn test_oversized_line_closes_connection() {
    let server = start_server(Config::default()).await;
    let mut client = Client::connect(server.addr).await;

    let huge = format!("echo msg={}", "x".repeat(9000));
    client.send_line(&huge).await;
    assert_eq!(client.recv_line().await, None);
    server.handle.abort();
}
