use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

use chat_relay::Server;
use chat_relay::config::ServerConfig;

const IO_TIMEOUT: Duration = Duration::from_secs(5);
const WELCOME: &[u8] = b"Welcome to the Chat! Please enter your name:\n";
const CHAT_FULL: &[u8] = b"The Chat is Maximum";

fn test_config(max_clients: usize) -> ServerConfig {
    ServerConfig {
        bind_address: "127.0.0.1".to_string(),
        port: 0,
        max_clients,
        ..ServerConfig::default()
    }
}

// Starts a server on an ephemeral port and returns its address.
async fn start_test_server(max_clients: usize) -> SocketAddr {
    let server = Server::new(test_config(max_clients))
        .await
        .expect("failed to bind test server");
    let addr = server.local_addr().expect("listener has no local address");
    tokio::spawn(async move {
        server.start().await;
    });
    addr
}

// Reads exactly `expected.len()` bytes and asserts them.
async fn expect_bytes(stream: &mut TcpStream, expected: &[u8]) {
    let mut buf = vec![0u8; expected.len()];
    timeout(IO_TIMEOUT, stream.read_exact(&mut buf))
        .await
        .expect("timed out waiting for payload")
        .expect("connection closed early");
    assert_eq!(buf, expected, "unexpected bytes from server");
}

// Waits until the server closes the connection.
async fn expect_closed(stream: &mut TcpStream) {
    let mut buf = [0u8; 64];
    let n = timeout(IO_TIMEOUT, stream.read(&mut buf))
        .await
        .expect("timed out waiting for close")
        .expect("read failed while waiting for close");
    assert_eq!(n, 0, "expected server to close the connection");
}

// Connects and names a client, consuming the welcome banner and the
// client's own join notification.
async fn join_chat(addr: SocketAddr, name: &str) -> TcpStream {
    let mut stream = TcpStream::connect(addr).await.expect("connect failed");
    expect_bytes(&mut stream, WELCOME).await;
    stream
        .write_all(format!("{}\n", name).as_bytes())
        .await
        .expect("failed to send name");
    expect_bytes(&mut stream, format!("{} joined the Chat \n", name).as_bytes()).await;
    stream
}

// Connects, retrying past capacity rejections. A departing client's
// admission slot is released shortly after its departure broadcast, so a
// freed slot may not be observable immediately.
async fn connect_admitted(addr: SocketAddr) -> TcpStream {
    let mut attempts = 50;
    loop {
        let mut stream = TcpStream::connect(addr).await.expect("connect failed");
        let mut first = [0u8; 1];
        let n = timeout(IO_TIMEOUT, stream.read(&mut first))
            .await
            .expect("timed out waiting for greeting")
            .expect("read failed while waiting for greeting");
        if n == 1 && first[0] == WELCOME[0] {
            expect_bytes(&mut stream, &WELCOME[1..]).await;
            return stream;
        }

        attempts -= 1;
        assert!(attempts > 0, "server never freed an admission slot");
        sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn test_join_notification_reaches_named_clients() {
    let addr = start_test_server(2).await;

    let mut alice = join_chat(addr, "alice").await;
    let _bob = join_chat(addr, "bob").await;

    expect_bytes(&mut alice, b"bob joined the Chat \n").await;
}

#[tokio::test]
async fn test_messages_are_tagged_with_sender_name() {
    let addr = start_test_server(2).await;

    let mut alice = join_chat(addr, "alice").await;
    let mut bob = join_chat(addr, "bob").await;
    expect_bytes(&mut alice, b"bob joined the Chat \n").await;

    alice.write_all(b"hello").await.expect("write failed");
    expect_bytes(&mut bob, b"[alice]hello").await;
}

#[tokio::test]
async fn test_payload_bytes_are_relayed_verbatim() {
    let addr = start_test_server(2).await;

    let mut alice = join_chat(addr, "alice").await;
    let mut bob = join_chat(addr, "bob").await;
    expect_bytes(&mut alice, b"bob joined the Chat \n").await;

    // Embedded newline, NUL, and non-UTF-8 bytes must survive untouched.
    let payload = [b'h', b'i', b'\n', 0x00, 0xFF, 0x07];
    bob.write_all(&payload).await.expect("write failed");

    let mut expected = b"[bob]".to_vec();
    expected.extend_from_slice(&payload);
    expect_bytes(&mut alice, &expected).await;
}

#[tokio::test]
async fn test_name_line_terminator_is_stripped() {
    let addr = start_test_server(2).await;

    let mut dave = TcpStream::connect(addr).await.expect("connect failed");
    expect_bytes(&mut dave, WELCOME).await;
    dave.write_all(b"dave\r\n").await.expect("failed to send name");

    expect_bytes(&mut dave, b"dave joined the Chat \n").await;
}

#[tokio::test]
async fn test_connection_beyond_capacity_is_rejected() {
    let addr = start_test_server(1).await;

    let _solo = join_chat(addr, "solo").await;

    let mut rejected = TcpStream::connect(addr).await.expect("connect failed");
    expect_bytes(&mut rejected, CHAT_FULL).await;
    expect_closed(&mut rejected).await;
}

#[tokio::test]
async fn test_unnamed_client_still_occupies_a_slot() {
    let addr = start_test_server(1).await;

    // Admission happens at accept time, before name negotiation.
    let mut lurker = TcpStream::connect(addr).await.expect("connect failed");
    expect_bytes(&mut lurker, WELCOME).await;

    let mut rejected = TcpStream::connect(addr).await.expect("connect failed");
    expect_bytes(&mut rejected, CHAT_FULL).await;
    expect_closed(&mut rejected).await;
}

#[tokio::test]
async fn test_disconnect_frees_an_admission_slot() {
    let addr = start_test_server(1).await;

    let solo = join_chat(addr, "solo").await;
    drop(solo);

    let mut next = connect_admitted(addr).await;
    next.write_all(b"next\n").await.expect("failed to send name");
    expect_bytes(&mut next, b"next joined the Chat \n").await;
}

#[tokio::test]
async fn test_empty_name_is_rejected_without_announcement() {
    let addr = start_test_server(2).await;

    let mut alice = join_chat(addr, "alice").await;

    let mut nameless = TcpStream::connect(addr).await.expect("connect failed");
    expect_bytes(&mut nameless, WELCOME).await;
    nameless.write_all(b"\n").await.expect("write failed");
    expect_bytes(&mut nameless, b"No name provided").await;
    expect_closed(&mut nameless).await;

    // The very next bytes alice sees must be bob's join: the nameless
    // client produced no join or departure notification.
    let _bob = join_chat(addr, "bob").await;
    expect_bytes(&mut alice, b"bob joined the Chat \n").await;
}

#[tokio::test]
async fn test_departure_notification_reaches_named_clients() {
    let addr = start_test_server(2).await;

    let mut alice = join_chat(addr, "alice").await;
    let bob = join_chat(addr, "bob").await;
    expect_bytes(&mut alice, b"bob joined the Chat \n").await;

    drop(bob);
    expect_bytes(&mut alice, b"bob left the Chat \n").await;
}

// The end-to-end scenario: admission, naming, tagged relay, departure,
// and slot reuse on one server.
#[tokio::test]
async fn test_full_chat_scenario() {
    let addr = start_test_server(2).await;

    // alice joins; her own join notification is the only broadcast.
    let mut alice = join_chat(addr, "alice").await;

    // bob joins; alice is notified.
    let mut bob = join_chat(addr, "bob").await;
    expect_bytes(&mut alice, b"bob joined the Chat \n").await;

    // carol is rejected at capacity.
    let mut carol = TcpStream::connect(addr).await.expect("connect failed");
    expect_bytes(&mut carol, CHAT_FULL).await;
    expect_closed(&mut carol).await;

    // alice talks; bob receives the tagged payload, alice her own echo.
    alice.write_all(b"hello").await.expect("write failed");
    expect_bytes(&mut bob, b"[alice]hello").await;
    expect_bytes(&mut alice, b"[alice]hello").await;

    // bob leaves; alice is notified and the slot frees up.
    drop(bob);
    expect_bytes(&mut alice, b"bob left the Chat \n").await;

    // carol can join now.
    let mut carol = connect_admitted(addr).await;
    carol.write_all(b"carol\n").await.expect("failed to send name");
    expect_bytes(&mut carol, b"carol joined the Chat \n").await;
    expect_bytes(&mut alice, b"carol joined the Chat \n").await;
}
