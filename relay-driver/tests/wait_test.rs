//! Tests for the wait-for-reply engine: newest-match, watermark folding, outgoing echoes,
//! bounded window, and error propagation. Time is paused so polls run instantly.

mod common;

use common::scripted_gateway::{text, ScriptedGateway};
use relay_core::{ChatRef, Message};
use relay_driver::classifier::{self, Classifier};
use relay_driver::{wait_for_reply, Cursor, PollSettings};
use std::sync::Arc;
use std::time::Duration;

const BOT: &str = "@bot";

fn contains(name: &'static str, needle: &'static str) -> Classifier {
    Classifier::new(name, move |m: &Message| m.body().contains(needle))
}

/// **Test: Several matching messages in one poll → the newest is returned.**
///
/// **Setup:** Cursor at 0; three incoming messages all containing "ready".
/// **Action:** `wait_for_reply` with a "ready" classifier.
/// **Expected:** Returns the last pushed message; watermark equals its id.
#[tokio::test(start_paused = true)]
async fn test_returns_newest_match() {
    let gateway = ScriptedGateway::new();
    gateway.push(BOT, text("ready one"));
    gateway.push(BOT, text("ready two"));
    let newest = gateway.push(BOT, text("ready three"));

    let mut cursor = Cursor::new(ChatRef::new(BOT), 0);
    let reply = wait_for_reply(
        &gateway,
        &mut cursor,
        &contains("ready", "ready"),
        Duration::from_secs(10),
        PollSettings::default(),
    )
    .await
    .unwrap()
    .expect("should match");

    assert_eq!(reply.id, newest);
    assert_eq!(reply.body(), "ready three");
    assert_eq!(cursor.watermark(), newest);
}

/// **Test: A reply that arrives after a few polls is found.**
#[tokio::test(start_paused = true)]
async fn test_reply_arriving_later() {
    let gateway = Arc::new(ScriptedGateway::new());
    let mut cursor = Cursor::at_latest(gateway.as_ref(), ChatRef::new(BOT)).await.unwrap();

    let pusher = Arc::clone(&gateway);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(7)).await;
        pusher.push(BOT, text("Send your token"));
    });

    let reply = wait_for_reply(
        gateway.as_ref(),
        &mut cursor,
        &classifier::token_prompt(),
        Duration::from_secs(20),
        PollSettings::default(),
    )
    .await
    .unwrap();

    assert_eq!(reply.map(|m| m.body().to_string()).as_deref(), Some("Send your token"));
}

/// **Test: The driver's own echo never satisfies a wait, but still advances the watermark.**
#[tokio::test(start_paused = true)]
async fn test_outgoing_echo_ignored() {
    let gateway = ScriptedGateway::new();
    let mut echo = text("please send the token");
    echo.outgoing = true;
    let echo_id = gateway.push(BOT, echo);

    let mut cursor = Cursor::new(ChatRef::new(BOT), 0);
    let reply = wait_for_reply(
        &gateway,
        &mut cursor,
        &classifier::token_prompt(),
        Duration::from_secs(9),
        PollSettings::default(),
    )
    .await
    .unwrap();

    assert!(reply.is_none());
    assert_eq!(cursor.watermark(), echo_id);
}

/// **Test: A message folded into the watermark is never reconsidered by a later wait.**
///
/// **Setup:** One incoming "hello" message.
/// **Action:** Wait for "bye" (times out), then wait for "hello" with the same cursor.
/// **Expected:** Both waits return `None`.
#[tokio::test(start_paused = true)]
async fn test_non_matching_not_reconsidered() {
    let gateway = ScriptedGateway::new();
    let id = gateway.push(BOT, text("hello"));

    let mut cursor = Cursor::new(ChatRef::new(BOT), 0);
    let first = wait_for_reply(
        &gateway,
        &mut cursor,
        &contains("bye", "bye"),
        Duration::from_secs(6),
        PollSettings::default(),
    )
    .await
    .unwrap();
    assert!(first.is_none());
    assert_eq!(cursor.watermark(), id);

    let second = wait_for_reply(
        &gateway,
        &mut cursor,
        &contains("hello", "hello"),
        Duration::from_secs(6),
        PollSettings::default(),
    )
    .await
    .unwrap();
    assert!(second.is_none());
}

/// **Test: The watermark never moves backwards.**
#[tokio::test(start_paused = true)]
async fn test_watermark_monotonic() {
    let gateway = ScriptedGateway::new();
    gateway.push(BOT, text("old reply"));

    let mut cursor = Cursor::new(ChatRef::new(BOT), 5_000);
    let reply = wait_for_reply(
        &gateway,
        &mut cursor,
        &contains("reply", "reply"),
        Duration::from_secs(6),
        PollSettings::default(),
    )
    .await
    .unwrap();

    assert!(reply.is_none());
    assert_eq!(cursor.watermark(), 5_000);

    cursor.advance(10);
    assert_eq!(cursor.watermark(), 5_000);
}

/// **Test: Messages beyond the fetch window are not inspected.**
///
/// **Setup:** A matching message followed by eight non-matching ones (window is 8).
/// **Action:** Wait for the matching text.
/// **Expected:** `None`; the match was pushed out of the window.
#[tokio::test(start_paused = true)]
async fn test_bounded_window() {
    let gateway = ScriptedGateway::new();
    gateway.push(BOT, text("target"));
    for i in 0..8 {
        gateway.push(BOT, text(&format!("noise {}", i)));
    }

    let mut cursor = Cursor::new(ChatRef::new(BOT), 0);
    let reply = wait_for_reply(
        &gateway,
        &mut cursor,
        &contains("target", "target"),
        Duration::from_secs(10),
        PollSettings::default(),
    )
    .await
    .unwrap();

    assert!(reply.is_none());
}

/// **Test: Gateway errors while fetching propagate to the caller.**
#[tokio::test(start_paused = true)]
async fn test_fetch_error_propagates() {
    let gateway = ScriptedGateway::new();
    gateway.fail_next_fetches(1);

    let mut cursor = Cursor::new(ChatRef::new(BOT), 0);
    let result = wait_for_reply(
        &gateway,
        &mut cursor,
        &classifier::token_prompt(),
        Duration::from_secs(10),
        PollSettings::default(),
    )
    .await;

    assert!(result.is_err());
}

/// **Test: A history fetch that never returns cannot outlive the wait timeout.**
///
/// **Setup:** Gateway whose `fetch_recent` stays pending forever.
/// **Action:** `wait_for_reply` with a 20 s timeout, itself bounded by one hour.
/// **Expected:** `Ok(None)` well before the hour is up.
#[tokio::test(start_paused = true)]
async fn test_stalled_fetch_bounded_by_timeout() {
    let gateway = ScriptedGateway::new();
    gateway.stall_fetches();

    let mut cursor = Cursor::new(ChatRef::new(BOT), 0);
    let started = tokio::time::Instant::now();
    let reply = tokio::time::timeout(
        Duration::from_secs(3600),
        wait_for_reply(
            &gateway,
            &mut cursor,
            &classifier::token_prompt(),
            Duration::from_secs(20),
            PollSettings::default(),
        ),
    )
    .await
    .expect("wait must end at its own timeout")
    .unwrap();

    assert!(reply.is_none());
    assert!(started.elapsed() <= Duration::from_secs(21));
}

/// **Test: Positioning a cursor on a stalled chat fails instead of hanging.**
#[tokio::test(start_paused = true)]
async fn test_stalled_latest_id_is_an_error() {
    let gateway = ScriptedGateway::new();
    gateway.stall_fetches();

    let result = tokio::time::timeout(
        Duration::from_secs(3600),
        Cursor::at_latest(&gateway, ChatRef::new(BOT)),
    )
    .await
    .expect("cursor positioning must be bounded");

    assert!(matches!(result, Err(relay_core::RelayError::Gateway(_))));
}
