//! Wire-level checks for the leaderboard and Telegram clients.

use aoc_notifier::error::AppError;
use aoc_notifier::models::Leaderboard;
use aoc_notifier::services::{LeaderboardClient, LeaderboardSource, Notifier, TelegramNotifier};
use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOARD_PATH: &str = "/2020/leaderboard/private/view/123456";

fn leaderboard_client(server: &MockServer) -> LeaderboardClient {
    let url = format!("{}{}", server.uri(), BOARD_PATH);
    LeaderboardClient::new(Client::new(), &url, "cafe").unwrap()
}

fn telegram(server: &MockServer) -> TelegramNotifier {
    TelegramNotifier::new(Client::new(), server.uri(), "test-token")
}

// ────────────────────────────────────────────────────────────────────────────
// Leaderboard fetch
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_sends_session_cookie_to_json_endpoint() {
    let server = MockServer::start().await;
    let body = json!({
        "event": "2020",
        "owner_id": "379505",
        "members": {
            "379505": {
                "id": "379505",
                "name": "Alice",
                "stars": 1,
                "local_score": 10,
                "global_score": 0,
                "last_star_ts": "1606801892",
                "completion_day_level": {
                    "1": {"1": {"get_star_ts": "1606801892"}}
                }
            }
        }
    });

    Mock::given(method("GET"))
        .and(path(format!("{BOARD_PATH}.json")))
        .and(header("cookie", "session=cafe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let value = leaderboard_client(&server).fetch().await.unwrap();
    let board = Leaderboard::from_value(value).unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board.get("379505").unwrap().local_score, 10);
}

#[tokio::test]
async fn test_fetch_maps_server_error_to_bad_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = leaderboard_client(&server).fetch().await.unwrap_err();
    assert!(matches!(err, AppError::BadStatus { status: 500 }), "got {err}");
    assert!(err.is_fetch_failure());
    assert!(!err.is_validation_failure());
}

#[tokio::test]
async fn test_fetch_rejects_html_body() {
    let server = MockServer::start().await;

    // An expired session redirects to a login page served with 200
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<!DOCTYPE html><html><body>Log in</body></html>"),
        )
        .mount(&server)
        .await;

    let err = leaderboard_client(&server).fetch().await.unwrap_err();
    assert!(err.is_validation_failure(), "got {err}");
    assert!(!err.is_fetch_failure());
}

// ────────────────────────────────────────────────────────────────────────────
// Telegram delivery
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_send_posts_markdown_pre_block() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bottest-token/sendMessage"))
        .and(body_partial_json(json!({
            "chat_id": "-100",
            "text": "```\npos  score\n```",
            "parse_mode": "MarkdownV2"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"message_id": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    telegram(&server).send("-100", "pos  score").await.unwrap();
}

#[tokio::test]
async fn test_send_maps_api_rejection_to_delivery_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;

    let err = telegram(&server).send("-100", "hi").await.unwrap_err();
    match err {
        AppError::Delivery { channel, message } => {
            assert_eq!(channel, "-100");
            assert!(message.contains("chat not found"), "message: {message}");
        }
        other => panic!("expected delivery error, got {other}"),
    }
}

#[tokio::test]
async fn test_send_rejects_ok_false_with_success_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": false})))
        .mount(&server)
        .await;

    let err = telegram(&server).send("42", "hi").await.unwrap_err();
    assert!(matches!(err, AppError::Delivery { .. }), "got {err}");
}

#[tokio::test]
async fn test_send_maps_unreadable_reply_to_delivery_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = telegram(&server).send("42", "hi").await.unwrap_err();
    match err {
        AppError::Delivery { message, .. } => {
            assert!(message.contains("502"), "message: {message}");
            assert!(!message.contains("test-token"));
        }
        other => panic!("expected delivery error, got {other}"),
    }
}
