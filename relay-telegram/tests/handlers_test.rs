//! Command router end to end: access gate, settings prompts, admin commands and the job
//! selection flow, against an in-memory database and a recording bot.

mod common;

use common::{harness, SUDO};
use relay_core::JobStatus;

/// **Test: /start answers differently with and without access.**
///
/// **Setup:** Sudo user 1 (from config) and unknown user 7.
/// **Expected:** Sudo gets the welcome; user 7 is told to contact an admin with their ID.
#[tokio::test]
async fn test_start_with_and_without_access() {
    let h = harness().await;

    let sudo = h.reply(SUDO, "/start").await;
    assert!(sudo.starts_with("👋 Welcome, User 1!"));

    let stranger = h.reply(7, "/start").await;
    assert!(stranger.contains("You need a subscription"));
    assert!(stranger.contains("7"));
}

/// **Test: Users without access are refused on commands and ignored on plain text.**
#[tokio::test]
async fn test_denied_user() {
    let h = harness().await;

    assert_eq!(h.reply(7, "/status").await, "❌ No access. Contact admin.");
    assert_eq!(h.say(7, "hello there").await, None);
    assert!(h.reply(7, "/help").await.starts_with("📖 Commands"));
}

/// **Test: /adduser grants access and notifies the new user.**
///
/// **Action:** Sudo runs `/adduser 7 10`; user 7 then runs /me.
/// **Expected:** Confirmation reply; user 7 received the grant notice and shows as Subscribed.
#[tokio::test]
async fn test_adduser_grants_access() {
    let h = harness().await;

    let reply = h.reply(SUDO, "/adduser 7 10").await;
    assert_eq!(reply, "✅ Subscribed!\n🆔 7\n📅 10 days");
    assert!(h
        .bot
        .sent_to(7)
        .iter()
        .any(|t| t.starts_with("🎉 Access Granted!")));

    let me = h.reply(7, "/me").await;
    assert!(me.contains("✅ Subscribed"));
    assert!(h.reply(7, "/status").await.starts_with("📊 Your Settings"));
}

/// **Test: Admin commands are sudo only.**
#[tokio::test]
async fn test_admin_commands_require_sudo() {
    let h = harness().await;
    h.reply(SUDO, "/adduser 7").await;

    assert_eq!(h.reply(7, "/stats").await, "❌ Sudo only.");
    assert_eq!(h.reply(7, "/adduser 8").await, "❌ Sudo only.");
    assert!(h.reply(SUDO, "/adduser abc").await.contains("numbers only"));
}

/// **Test: A banned user is refused everything, and sudo cannot ban themselves.**
#[tokio::test]
async fn test_ban_and_unban() {
    let h = harness().await;
    h.reply(SUDO, "/adduser 7").await;

    assert_eq!(h.reply(SUDO, "/banuser 7").await, "🔨 Banned: 7");
    assert_eq!(h.reply(7, "/start").await, "🚫 You are banned from this bot.");
    assert_eq!(h.reply(7, "anything").await, "🚫 You are banned from this bot.");

    assert_eq!(h.reply(SUDO, "/banuser 1").await, "❌ Can't ban yourself.");

    assert_eq!(h.reply(SUDO, "/unbanuser 7").await, "✅ Unbanned: 7");
    assert!(h.reply(7, "/start").await.starts_with("👋 Welcome"));
}

/// **Test: Setting prompts validate input and stay open until a valid answer arrives.**
///
/// **Action:** /SetToken, a short token, then a valid one; /SetupCommand answered with
/// "/Mahi"; /SetExtractor answered with "/skip".
/// **Expected:** Short token rejected; valid token saved; slash answers consumed by the prompt.
#[tokio::test]
async fn test_setting_prompts() {
    let h = harness().await;

    assert!(h.reply(SUDO, "/SetToken").await.starts_with("🔑 Set PW Token"));
    assert_eq!(
        h.reply(SUDO, "short").await,
        "❌ Too short. Send a valid access token."
    );
    assert_eq!(
        h.reply(SUDO, "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.payload").await,
        "✅ Token saved!"
    );
    // Prompt closed: further text goes nowhere.
    assert_eq!(h.say(SUDO, "more text").await, None);

    h.reply(SUDO, "/SetupCommand").await;
    assert_eq!(h.reply(SUDO, "/Mahi").await, "✅ Command set: /Mahi");

    h.reply(SUDO, "/SetExtractor").await;
    assert_eq!(
        h.reply(SUDO, "/skip").await,
        format!("✅ Extractor set: {}", storage::DEFAULT_EXTRACTOR_BOT)
    );

    assert_eq!(h.reply(SUDO, "/SetupCredit @relay").await, "✅ Credit set: @relay");

    let user = h.components.settings.get_user(SUDO).await.unwrap().unwrap();
    assert_eq!(user.uploader_command.as_deref(), Some("/Mahi"));
    assert_eq!(user.credit.as_deref(), Some("@relay"));
}

/// **Test: Batches and channels can be added, listed and removed by number.**
#[tokio::test]
async fn test_batches_and_channels() {
    let h = harness().await;

    assert!(h
        .reply(SUDO, "/AddBatch Arjuna JEE")
        .await
        .starts_with("✅ Batch added: Arjuna JEE"));
    assert_eq!(h.reply(SUDO, "/AddBatch Arjuna JEE").await, "ℹ️ Already saved: Arjuna JEE");
    assert_eq!(h.reply(SUDO, "/AddBatch ab").await, "❌ Batch name too short.");
    assert!(h.reply(SUDO, "/Batches").await.contains("1. Arjuna JEE"));

    let prompt = h.reply(SUDO, "/DelBatch").await;
    assert!(prompt.contains("1. Arjuna JEE"));
    assert_eq!(h.reply(SUDO, "1").await, "✅ Removed: Arjuna JEE");
    assert!(h.reply(SUDO, "/Batches").await.contains("None saved yet"));

    assert!(h
        .reply(SUDO, "/AddChannel 12345")
        .await
        .starts_with("❌ Send a channel ID"));
    assert!(h
        .reply(SUDO, "/AddChannel -1001234567890 Main")
        .await
        .starts_with("✅ Channel added: -1001234567890"));
    assert!(h
        .reply(SUDO, "/Channels")
        .await
        .contains("Main (-1001234567890)"));
    h.reply(SUDO, "/DelChannel").await;
    assert_eq!(h.reply(SUDO, "-1001234567890").await, "✅ Removed: -1001234567890");
    assert!(h.components.settings.channels(SUDO).await.unwrap().is_empty());
}

/// **Test: /StartExtraction lists what is missing and opens no selection.**
#[tokio::test]
async fn test_start_extraction_requires_setup() {
    let h = harness().await;

    let reply = h.reply(SUDO, "/StartExtraction").await;
    assert!(reply.starts_with("⚠️ Setup incomplete!"));
    assert!(reply.contains("/SetToken"));
    assert!(reply.contains("/AddChannel"));
    assert_eq!(h.say(SUDO, "1").await, None);
}

/// **Test: Choosing a batch and a channel starts a job whose failure lands on the status
/// message and in the job history.**
///
/// **Setup:** Complete setup for the sudo user; the bridge is offline, so the first send fails.
/// **Action:** /StartExtraction, "9" (invalid), "2", then "1".
/// **Expected:** Selection prompts; the status message ends in "Unexpected Error"; one failed
/// record for the chosen course and channel.
#[tokio::test]
async fn test_extraction_flow_starts_job() {
    let mut h = harness().await;
    h.configure(SUDO).await;

    let batches = h.reply(SUDO, "/StartExtraction").await;
    assert!(batches.contains("Step 1/2"));
    assert!(batches.contains("1. Arjuna JEE"));
    assert!(h.reply(SUDO, "9").await.starts_with("❌ Invalid choice"));

    let channels = h.reply(SUDO, "2").await;
    assert!(channels.starts_with("✅ Batch: Lakshya NEET"));
    assert!(channels.contains("1. Main"));

    assert_eq!(h.say(SUDO, "1").await, None);
    assert!(h
        .bot
        .sent_to(SUDO)
        .iter()
        .any(|t| t.starts_with("🚀 Extraction Started")));

    let last = h.final_edit().await;
    assert_eq!(last.chat_id, SUDO);
    assert_eq!(last.message_id, "1");
    assert!(last.text.starts_with("❌ Unexpected Error"));
    assert!(last.text.contains("bridge offline"));

    let jobs = h.components.jobs.recent_for_user(SUDO, 10).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].course, "Lakshya NEET");
    assert_eq!(jobs[0].channel_id, "-100111");
    assert_eq!(jobs[0].status(), JobStatus::Failed);
    assert!(!h.components.coordinator.is_active(SUDO));
}

/// **Test: Unknown commands get a hint; /cancel closes an open prompt.**
#[tokio::test]
async fn test_unknown_command_and_cancel() {
    let h = harness().await;

    assert_eq!(h.reply(SUDO, "/frobnicate").await, "❓ Unknown command. See /help");

    h.reply(SUDO, "/SetToken").await;
    assert_eq!(h.reply(SUDO, "/cancel").await, "✅ Cancelled.");
    assert_eq!(h.say(SUDO, "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.payload").await, None);
    let user = h.components.settings.get_user(SUDO).await.unwrap().unwrap();
    assert!(user.token.is_none());
}
