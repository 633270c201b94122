use std::net::SocketAddr;

use bytes::Bytes;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Duration;

use ttlpaste_kv::{ServerConfig, run};
use ttlpaste_protocol::{Connection, Frame};
use ttlpaste_storage::Db;

async fn start_server(requirepass: Option<&str>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = ServerConfig {
        requirepass: requirepass.map(str::to_string),
        ..ServerConfig::default()
    };
    tokio::spawn(run(listener, Db::new(), config, std::future::pending()));
    addr
}

async fn connect(addr: SocketAddr) -> Connection {
    Connection::new(TcpStream::connect(addr).await.unwrap())
}

/// Helper: envia um comando e lê o frame de resposta.
async fn send_command(conn: &mut Connection, args: &[&str]) -> Frame {
    conn.write_frame(&Frame::array_from_strs(args)).await.unwrap();
    conn.read_frame()
        .await
        .unwrap()
        .expect("server closed connection unexpectedly")
}

#[tokio::test]
async fn test_ping_pong() {
    let mut conn = connect(start_server(None).await).await;

    assert_eq!(
        send_command(&mut conn, &["PING"]).await,
        Frame::Simple("PONG".into())
    );
    assert_eq!(
        send_command(&mut conn, &["PING", "hello"]).await,
        Frame::Bulk(Bytes::from("hello"))
    );
}

#[tokio::test]
async fn test_set_get_ttl_del() {
    let mut conn = connect(start_server(None).await).await;
    let key = "file:rust-abc:data";

    let response = send_command(&mut conn, &["SET", key, "{}", "EX", "600", "NX"]).await;
    assert_eq!(response, Frame::ok());

    assert_eq!(
        send_command(&mut conn, &["GET", key]).await,
        Frame::Bulk(Bytes::from("{}"))
    );
    assert_eq!(send_command(&mut conn, &["TTL", key]).await, Frame::Integer(600));

    assert_eq!(send_command(&mut conn, &["DEL", key]).await, Frame::Integer(1));
    assert_eq!(send_command(&mut conn, &["GET", key]).await, Frame::Null);
    assert_eq!(send_command(&mut conn, &["TTL", key]).await, Frame::Integer(-2));
    assert_eq!(send_command(&mut conn, &["DEL", key]).await, Frame::Integer(0));
}

#[tokio::test]
async fn test_set_nx_keeps_first_value() {
    let mut conn = connect(start_server(None).await).await;

    send_command(&mut conn, &["SET", "k", "v1", "NX"]).await;
    assert_eq!(
        send_command(&mut conn, &["SET", "k", "v2", "NX"]).await,
        Frame::Null
    );
    assert_eq!(
        send_command(&mut conn, &["GET", "k"]).await,
        Frame::Bulk(Bytes::from("v1"))
    );
}

#[tokio::test]
async fn test_ttl_persistent_key() {
    let mut conn = connect(start_server(None).await).await;

    send_command(&mut conn, &["SET", "forever", "v"]).await;
    assert_eq!(
        send_command(&mut conn, &["TTL", "forever"]).await,
        Frame::Integer(-1)
    );
}

#[tokio::test]
async fn test_set_with_px_expires() {
    let mut conn = connect(start_server(None).await).await;

    let response = send_command(&mut conn, &["SET", "temp", "val", "PX", "100"]).await;
    assert_eq!(response, Frame::ok());

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(send_command(&mut conn, &["GET", "temp"]).await, Frame::Null);
    assert_eq!(
        send_command(&mut conn, &["TTL", "temp"]).await,
        Frame::Integer(-2)
    );
}

#[tokio::test]
async fn test_requirepass_gates_commands() {
    let mut conn = connect(start_server(Some("s3cret")).await).await;

    match send_command(&mut conn, &["GET", "k"]).await {
        Frame::Error(msg) => assert!(msg.starts_with("NOAUTH")),
        other => panic!("expected NOAUTH, got {other:?}"),
    }

    match send_command(&mut conn, &["AUTH", "wrong"]).await {
        Frame::Error(msg) => assert!(msg.starts_with("WRONGPASS")),
        other => panic!("expected WRONGPASS, got {other:?}"),
    }

    assert_eq!(
        send_command(&mut conn, &["AUTH", "default", "s3cret"]).await,
        Frame::ok()
    );
    assert_eq!(send_command(&mut conn, &["GET", "k"]).await, Frame::Null);
}

#[tokio::test]
async fn test_auth_without_requirepass_errors() {
    let mut conn = connect(start_server(None).await).await;

    match send_command(&mut conn, &["AUTH", "pw"]).await {
        Frame::Error(msg) => assert!(msg.contains("without any password configured")),
        other => panic!("expected error frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_command() {
    let mut conn = connect(start_server(None).await).await;

    match send_command(&mut conn, &["FOOBAR"]).await {
        Frame::Error(msg) => assert!(msg.contains("unknown command")),
        other => panic!("expected error frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_syntax_error_keeps_connection_open() {
    let mut conn = connect(start_server(None).await).await;

    match send_command(&mut conn, &["SET", "k", "v", "EX", "0"]).await {
        Frame::Error(msg) => assert!(msg.starts_with("ERR")),
        other => panic!("expected error frame, got {other:?}"),
    }
    assert_eq!(
        send_command(&mut conn, &["PING"]).await,
        Frame::Simple("PONG".into())
    );
}

#[tokio::test]
async fn test_zero_max_connections_still_accepts() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = ServerConfig {
        max_connections: 0,
        ..ServerConfig::default()
    };
    tokio::spawn(run(listener, Db::new(), config, std::future::pending()));

    let mut conn = connect(addr).await;
    let reply = tokio::time::timeout(Duration::from_secs(1), send_command(&mut conn, &["PING"]))
        .await
        .expect("server never answered");
    assert_eq!(reply, Frame::Simple("PONG".into()));
}
