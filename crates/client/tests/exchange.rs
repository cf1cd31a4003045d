//! End-to-end exchange tests against live fixture servers.
//!
//! Each test binds a fixture server on an ephemeral port, points one (or
//! two) exchanges at it and asserts on the delivered result. The fixtures
//! speak raw bytes on purpose: the interesting cases are exactly the ones a
//! well-behaved HTTP library would refuse to produce.

use std::time::Duration;

use micro_client::connection::HttpExchange;
use micro_client::handler::make_callback;
use micro_client::protocol::{ExchangeRequest, ExchangeResult};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Serves one connection: drain the request head, write `response`, close.
async fn serve_once(response: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf).await;
        stream.write_all(response).await.unwrap();
        // dropping the stream closes the connection, which ends the body
    });

    format!("127.0.0.1:{}", addr.port())
}

/// Serves one connection and hands back the captured request head.
async fn serve_capture(response: &'static [u8]) -> (String, oneshot::Receiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            if n == 0 || request.windows(4).any(|window| window == b"\r\n\r\n") {
                break;
            }
        }
        let _ = tx.send(request);
        stream.write_all(response).await.unwrap();
    });

    (format!("127.0.0.1:{}", addr.port()), rx)
}

async fn run_exchange(request: ExchangeRequest) -> ExchangeResult {
    HttpExchange::new(Handle::current(), request).run().await
}

#[tokio::test]
async fn success_roundtrip() {
    let host = serve_once(b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nServer: fixture\r\n\r\nhello world").await;

    let request = ExchangeRequest::builder().host(host).path("/greeting").timeout_secs(5).build().unwrap();
    let result = run_exchange(request).await;

    assert!(result.is_success());
    assert_eq!(result.headers_text(), "Content-Type: text/plain\r\nServer: fixture\r\n");
    assert_eq!(result.body_text(), "hello world");
}

#[tokio::test]
async fn callback_fires_exactly_once() {
    let host = serve_once(b"HTTP/1.0 200 OK\r\nServer: fixture\r\n\r\nok").await;
    let request = ExchangeRequest::builder().host(host).timeout_secs(5).build().unwrap();

    let (tx, rx) = oneshot::channel();
    let join = HttpExchange::new(Handle::current(), request).spawn(make_callback(move |result| {
        tx.send(result).unwrap();
    }));

    let result = rx.await.unwrap();
    assert!(result.is_success());
    assert_eq!(result.body_text(), "ok");

    // the task ends after the single dispatch; nothing fires afterwards
    join.await.unwrap();
}

#[tokio::test]
async fn close_after_headers_yields_empty_body_success() {
    let host = serve_once(b"HTTP/1.1 204 No Content\r\nServer: fixture\r\n\r\n").await;

    let request = ExchangeRequest::builder().host(host).timeout_secs(5).build().unwrap();
    let result = run_exchange(request).await;

    assert!(result.is_success());
    assert_eq!(result.headers_text(), "Server: fixture\r\n");
    assert_eq!(result.body_text(), "");
}

#[tokio::test]
async fn empty_header_block_is_success() {
    let host = serve_once(b"HTTP/1.1 200 OK\r\n\r\npayload").await;

    let request = ExchangeRequest::builder().host(host).timeout_secs(5).build().unwrap();
    let result = run_exchange(request).await;

    assert!(result.is_success());
    assert_eq!(result.headers_text(), "");
    assert_eq!(result.body_text(), "payload");
}

#[tokio::test]
async fn garbage_status_line_is_malformed() {
    let host = serve_once(b"GARBAGE\r\n").await;

    let request = ExchangeRequest::builder().host(host).timeout_secs(5).build().unwrap();
    let result = run_exchange(request).await;

    let (error_text, headers_text, body_text) = result.into_parts();
    assert_eq!(error_text, "MalformedStatusLine");
    assert_eq!(headers_text, "");
    assert_eq!(body_text, "");
}

#[tokio::test]
async fn silent_server_times_out_not_before_deadline() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = format!("127.0.0.1:{}", listener.local_addr().unwrap().port());

    tokio::spawn(async move {
        // accept, then hold the connection open without writing a byte
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
        drop(stream);
    });

    let request = ExchangeRequest::builder().host(host).timeout_secs(1).build().unwrap();
    let started = Instant::now();
    let result = run_exchange(request).await;

    assert_eq!(result.error_text(), "Timeout");
    assert!(started.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn keep_alive_flag_selects_connection_header() {
    let (host, captured) = serve_capture(b"HTTP/1.1 200 OK\r\n\r\n").await;
    let request = ExchangeRequest::builder().host(host).keep_alive(true).timeout_secs(5).build().unwrap();
    let result = run_exchange(request).await;
    assert!(result.is_success());

    let head = captured.await.unwrap();
    let head = String::from_utf8(head).unwrap();
    assert!(head.contains("Connection: keep-alive\r\n"), "request head was: {head}");

    let (host, captured) = serve_capture(b"HTTP/1.1 200 OK\r\n\r\n").await;
    let request = ExchangeRequest::builder().host(host).keep_alive(false).timeout_secs(5).build().unwrap();
    let result = run_exchange(request).await;
    assert!(result.is_success());

    let head = String::from_utf8(captured.await.unwrap()).unwrap();
    assert!(head.contains("Connection: close\r\n"), "request head was: {head}");
}

#[tokio::test]
async fn request_line_and_content_reach_the_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = format!("127.0.0.1:{}", listener.local_addr().unwrap().port());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        // the fixture knows the body it expects; read until it arrives
        while !request.ends_with(b"a=1&b=2") {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed before the body arrived");
            request.extend_from_slice(&buf[..n]);
        }
        let _ = tx.send(request);
        stream.write_all(b"HTTP/1.1 200 OK\r\n\r\n").await.unwrap();
    });

    let request = ExchangeRequest::builder()
        .host(host)
        .path("/submit")
        .method("POST")
        .content("a=1&b=2")
        .timeout_secs(5)
        .build()
        .unwrap();
    let result = run_exchange(request).await;
    assert!(result.is_success());

    let wire = String::from_utf8(rx.await.unwrap()).unwrap();
    assert!(wire.starts_with("POST /submit HTTP/1.0\r\n"), "request was: {wire}");
    assert!(wire.contains("Content-Length: 7\r\n"));
    assert!(wire.ends_with("\r\n\r\na=1&b=2"));
}

#[tokio::test]
async fn concurrent_exchanges_do_not_interfere() {
    let fast_host = serve_once(b"HTTP/1.1 200 OK\r\nServer: fast\r\n\r\nalpha").await;

    let silent_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let silent_host = format!("127.0.0.1:{}", silent_listener.local_addr().unwrap().port());
    tokio::spawn(async move {
        let (stream, _) = silent_listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
        drop(stream);
    });

    let fast = ExchangeRequest::builder().host(fast_host).timeout_secs(10).build().unwrap();
    let silent = ExchangeRequest::builder().host(silent_host).timeout_secs(1).build().unwrap();

    let (fast_result, silent_result) = tokio::join!(run_exchange(fast), run_exchange(silent));

    // the timeout on one exchange leaves the other's natural completion alone
    assert!(fast_result.is_success());
    assert_eq!(fast_result.body_text(), "alpha");
    assert_eq!(silent_result.error_text(), "Timeout");
}

#[tokio::test]
async fn refused_endpoint_is_connect_failed() {
    // bind to learn a free port, then close it again
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = format!("127.0.0.1:{}", listener.local_addr().unwrap().port());
    drop(listener);

    let request = ExchangeRequest::builder().host(host).timeout_secs(5).build().unwrap();
    let result = run_exchange(request).await;

    assert_eq!(result.error_text(), "ConnectFailed");
    assert_eq!(result.headers_text(), "");
    assert_eq!(result.body_text(), "");
}

#[tokio::test]
async fn unresolvable_host_is_resolve_failed() {
    // `.invalid` is reserved and never resolves
    let request = ExchangeRequest::builder().host("unresolvable.invalid").timeout_secs(5).build().unwrap();
    let result = run_exchange(request).await;

    assert_eq!(result.error_text(), "ResolveFailed");
}
