use std::sync::Arc;

use eventive_core::{BlockAttributes, DateRange};
use eventive_donations::{
    BlockOutcome, ClientSettings, DonationProgressEngine, DonationSource, ProgressError,
    RestDonationClient, hydrate_page,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serve one canned HTTP response on a local port.
/// Returns the API root to point the client at, and the request line received.
async fn stub_server(status: &str, body: &str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let request = String::from_utf8_lossy(&buf);
        let request_line = request.lines().next().unwrap_or_default().to_string();
        let _ = tx.send(request_line);
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });

    (format!("http://{addr}/wp-json"), rx)
}

fn client(api_root: String) -> RestDonationClient {
    // Talk to the stub directly even when a proxy is configured in the environment
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    RestDonationClient::with_http(http, ClientSettings::new(api_root))
}

#[tokio::test]
async fn test_fetch_sends_encoded_query() {
    let (root, request) = stub_server("200 OK", r#"{"transactions":[]}"#).await;
    let range = DateRange::new(Some("2025-01-01 00:00"), Some("2025-12-31 23:59")).unwrap();

    let batch = client(root).fetch_transactions(&range).await.unwrap();
    assert!(batch.is_empty());

    let line = request.await.unwrap();
    assert_eq!(
        line,
        "GET /wp-json/eventive/v1/donations?start_time=2025-01-01%2000%3A00&end_time=2025-12-31%2023%3A59&type=PAYMENT HTTP/1.1"
    );
}

#[tokio::test]
async fn test_end_to_end_progress() {
    let body = r#"{"transactions":[{"category":{"ref_label":"Donation"},"gross":"100000"},{"category":{"ref_label":"Refund"},"gross":"5000"}]}"#;
    let (root, _request) = stub_server("200 OK", body).await;
    let engine = DonationProgressEngine::new(Arc::new(client(root)));

    let result = engine
        .compute(&BlockAttributes::new(Some("2025-01-01"), Some("2025-12-31"), Some(1000.0)))
        .await
        .unwrap();
    assert_eq!(result.total_display(), "1000.00");
    assert_eq!(result.percent_display(), "100.00");
}

#[tokio::test]
async fn test_non_success_status() {
    let (root, _request) = stub_server("500 Internal Server Error", r#"{"code":"oops"}"#).await;
    let range = DateRange::new(Some("a"), Some("b")).unwrap();

    let err = client(root).fetch_transactions(&range).await.unwrap_err();
    assert_eq!(err, ProgressError::RemoteRequest { status: 500 });
    assert_eq!(err.to_string(), "HTTP error! status: 500");
}

#[tokio::test]
async fn test_malformed_body() {
    let (root, _request) = stub_server("200 OK", "<html>not json</html>").await;
    let range = DateRange::new(Some("a"), Some("b")).unwrap();

    let err = client(root).fetch_transactions(&range).await.unwrap_err();
    assert!(matches!(err, ProgressError::MalformedResponse(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop to get a port nothing listens on
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let engine = DonationProgressEngine::new(Arc::new(client(format!("http://{addr}/wp-json"))));

    let outcome = engine
        .run(&BlockAttributes::new(Some("a"), Some("b"), None))
        .await;
    assert!(matches!(outcome, BlockOutcome::Failed(ProgressError::Transport(_))));
    assert!(outcome.markup().starts_with("<p class=\"eventive-donations-error\">Error loading donations: "));
}

#[tokio::test]
async fn test_hydrate_page_over_http() {
    let body = r#"{"transactions":[{"category":{"ref_label":"Donation"},"gross":5000}]}"#;
    let (root, _request) = stub_server("200 OK", body).await;
    let engine = DonationProgressEngine::new(Arc::new(client(root)));

    let page = format!(
        "<body>{}</body>",
        BlockAttributes::new(Some("2025-05-01"), Some("2025-05-31"), Some(200.0)).placeholder_markup()
    );
    let hydrated = hydrate_page(&engine, &page).await;

    assert_eq!(hydrated.failure_count(), 0);
    assert!(hydrated.html.contains("$50.00 of $200.00 raised (25.00%)"));
    assert!(hydrated.html.contains("width: 25.00%;"));
}
