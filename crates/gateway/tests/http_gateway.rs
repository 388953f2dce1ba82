//! `HttpGateway` against a one-shot local HTTP responder.

use std::time::Duration;

use flashcards_core::model::{CategoryDraft, CategoryId, FlashcardId, FlashcardPatch};
use gateway::{CategoryGateway, FlashcardGateway, GatewayConfig, GatewayError, HttpGateway};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Answers a single request with `status` and `body`; yields the raw request.
async fn respond_once(status: &'static str, body: &'static str) -> (HttpGateway, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    let config = GatewayConfig::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
    (HttpGateway::new(&config).unwrap(), handle)
}

#[tokio::test]
async fn list_categories_decodes_envelope() {
    let (gateway, server) = respond_once(
        "200 OK",
        r#"{"categories":[{"id":1,"name":"Verbs","flashcardsCount":3,"knownFlashcardsCount":2}]}"#,
    )
    .await;

    let listed = gateway.list_categories().await.unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("GET /categories HTTP/1.1"));
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), CategoryId::new(1));
    assert_eq!(listed[0].flashcards_count(), 3);
}

#[tokio::test]
async fn update_flashcard_sends_only_patched_fields() {
    let (gateway, server) = respond_once(
        "200 OK",
        r#"{"flashcard":{"id":5,"categoryId":2,"question":"Q","answer":"A","isKnown":true,"isBookmarked":false}}"#,
    )
    .await;

    let updated = gateway
        .update_flashcard(FlashcardId::new(5), &FlashcardPatch::known(true))
        .await
        .unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("PUT /flashcards/5 HTTP/1.1"));
    assert!(request.ends_with(r#"{"isKnown":true}"#));
    assert!(updated.is_known());
}

#[tokio::test]
async fn conflict_maps_to_validation() {
    let (gateway, server) = respond_once("409 Conflict", r#"{"message":"name already taken"}"#).await;

    let err = gateway
        .create_category(&CategoryDraft::new("Verbs").unwrap())
        .await
        .unwrap_err();
    server.await.unwrap();

    assert_eq!(err, GatewayError::Validation("name already taken".into()));
}

#[tokio::test]
async fn missing_entity_maps_to_not_found() {
    let (gateway, server) = respond_once("404 Not Found", "").await;

    let err = gateway.delete_flashcard(FlashcardId::new(9)).await.unwrap_err();
    let request = server.await.unwrap();

    assert!(request.starts_with("DELETE /flashcards/9 HTTP/1.1"));
    assert_eq!(err, GatewayError::NotFound);
}

#[tokio::test]
async fn undecodable_body_maps_to_network() {
    let (gateway, server) = respond_once("200 OK", "<html>oops</html>").await;

    let err = gateway.get_category(CategoryId::new(1)).await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, GatewayError::Network(_)));
}

#[tokio::test]
async fn refused_connection_maps_to_network() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = GatewayConfig::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let gateway = HttpGateway::new(&config).unwrap();
    let err = gateway.list_categories().await.unwrap_err();

    assert!(matches!(err, GatewayError::Network(_)));
}
