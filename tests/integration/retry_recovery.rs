//! Transient failures, exhaustion and racing chains.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use sheetconv::endpoint::PayloadKind;
use sheetconv::retry::RetryPolicy;
use sheetconv::{ConversionOptions, ConvertError};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{client, fast_config};

/// An address nothing listens on.
fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Read one HTTP request off `stream`, headers and `Content-Length` body.
fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let n = stream.read(&mut chunk).expect("read request");
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let body_len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + body_len {
            return;
        }
    }
}

#[tokio::test]
async fn test_first_two_of_five_attempts_fail_then_succeed() {
    let server = MockServer::start().await;
    let call_count = Arc::new(AtomicU32::new(0));
    let call_count_clone = Arc::clone(&call_count);

    // First two attempts hang past the per-attempt timeout.
    Mock::given(method("POST"))
        .respond_with(move |_req: &wiremock::Request| {
            if call_count_clone.fetch_add(1, Ordering::SeqCst) < 2 {
                ResponseTemplate::new(200).set_delay(Duration::from_millis(1_500))
            } else {
                ResponseTemplate::new(200).set_body_bytes(b"final-body".to_vec())
            }
        })
        .mount(&server)
        .await;

    let client = client(
        PayloadKind::Json,
        ConversionOptions::default(),
        fast_config(&server.uri(), 1).with_timeout_ms(150),
    );

    let bytes = client.convert_json("{}").await.unwrap();
    assert_eq!(bytes, b"final-body");
    assert_eq!(call_count.load(Ordering::SeqCst), 3);
    assert_eq!(client.attempt_log().len(), 2);
}

#[tokio::test]
async fn test_unreachable_service_surfaces_transport_error() {
    let client = client(
        PayloadKind::Json,
        ConversionOptions::default(),
        fast_config(&closed_port_url(), 1),
    );

    match client.convert_json("{}").await.unwrap_err() {
        ConvertError::Transport { attempts, .. } => assert_eq!(attempts, 5),
        e => panic!("Wrong error type: {e:?}"),
    }
    assert_eq!(client.attempt_log().len(), 5);
}

#[tokio::test]
async fn test_racing_chains_each_use_full_budget() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(15)
        .mount(&server)
        .await;

    let client = client(
        PayloadKind::Json,
        ConversionOptions::default(),
        fast_config(&server.uri(), 3),
    );

    let err = client.convert_json("{}").await.unwrap_err();
    assert!(matches!(err, ConvertError::Transport { attempts: 5, .. }));

    let chains: std::collections::HashSet<u32> =
        client.attempt_log().iter().map(|r| r.chain).collect();
    assert_eq!(chains.len(), 3);
}

#[tokio::test]
async fn test_racing_chains_return_single_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("once"))
        .mount(&server)
        .await;

    let client = client(
        PayloadKind::Json,
        ConversionOptions::default(),
        fast_config(&server.uri(), 3),
    );

    assert_eq!(client.convert_json("{}").await.unwrap(), b"once");
    let received = server.received_requests().await.unwrap().len();
    assert!((1..=3).contains(&received), "received {received}");
}

#[tokio::test]
async fn test_backoff_applies_between_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let policy = RetryPolicy::new()
        .with_concurrency(1)
        .with_max_attempts(3)
        .with_base_delay_ms(40)
        .with_max_jitter_ms(10);
    let client = client(
        PayloadKind::Json,
        ConversionOptions::default(),
        fast_config(&server.uri(), 1).with_retry(policy),
    );

    let start = std::time::Instant::now();
    assert!(client.convert_json("{}").await.is_err());
    // 40ms before the second attempt, 80ms before the third.
    assert!(start.elapsed() >= Duration::from_millis(120));
}

#[tokio::test]
async fn test_deadline_bounds_whole_retry_sequence() {
    let client = client(
        PayloadKind::Json,
        ConversionOptions::default(),
        fast_config(&closed_port_url(), 1)
            .with_retry(
                RetryPolicy::new()
                    .with_concurrency(1)
                    .with_base_delay_ms(1_000)
                    .with_max_jitter_ms(0),
            )
            .with_deadline_ms(200),
    );

    let err = client.convert_json("{}").await.unwrap_err();
    assert_eq!(err, ConvertError::DeadlineExceeded { deadline_ms: 200 });
}

#[tokio::test]
async fn test_truncated_body_is_response_read() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}", listener.local_addr().expect("local addr"));
    let hits = Arc::new(AtomicU32::new(0));
    let hits_clone = Arc::clone(&hits);

    // Promise 100 bytes, send 5, hang up.
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            hits_clone.fetch_add(1, Ordering::SeqCst);
            read_request(&mut stream);
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort");
            let _ = stream.flush();
        }
    });

    let client = client(
        PayloadKind::Json,
        ConversionOptions::default(),
        fast_config(&url, 1),
    );

    let err = client.convert_json("{}").await.unwrap_err();
    assert!(
        matches!(err, ConvertError::ResponseRead { .. }),
        "unexpected error: {err:?}"
    );
    assert!(!err.is_retryable());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(client.attempt_log().is_empty());
}

#[tokio::test]
async fn test_losing_chains_dropped_before_body_read() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}", listener.local_addr().expect("local addr"));
    let loser_closed = Arc::new(AtomicBool::new(false));
    let loser_closed_clone = Arc::clone(&loser_closed);

    thread::spawn(move || {
        let (mut winner, _) = listener.accept().expect("accept winner");
        read_request(&mut winner);
        winner
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n")
            .expect("write head");

        // The second chain's request is never answered.
        let (mut loser, _) = listener.accept().expect("accept loser");
        read_request(&mut loser);
        let (closed_tx, closed_rx) = mpsc::channel();
        thread::spawn(move || {
            let mut byte = [0_u8; 1];
            if matches!(loser.read(&mut byte), Ok(0) | Err(_)) {
                let _ = closed_tx.send(());
            }
        });

        // Hold the body back until the losing connection goes away.
        if closed_rx.recv_timeout(Duration::from_secs(3)).is_ok() {
            loser_closed_clone.store(true, Ordering::SeqCst);
        }
        let _ = winner.write_all(b"hello");
        let _ = winner.flush();
    });

    let client = client(
        PayloadKind::Json,
        ConversionOptions::default(),
        fast_config(&url, 2).with_timeout_ms(5_000),
    );

    let bytes = client.convert_json("{}").await.unwrap();
    assert_eq!(bytes, b"hello");
    assert!(loser_closed.load(Ordering::SeqCst));
}
