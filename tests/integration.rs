#![cfg(test)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use mockall::mock;
use thread_bot::{
    base::{
        config::{Config, ConfigInner},
        types::{ChatMessage, InboundEvent, PostedMessage, Res, ThreadKey, Void},
    },
    interaction::{chat_event::handle_chat_event, dispatcher::Dispatcher, identity::Identity, ledger::DedupLedger, registry::ThreadRegistry},
    runtime::Runtime,
    service::{
        chat::{ChatClient, GenericChatClient},
        responder::ResponderClient,
    },
};

const BOT: &str = "BOT";

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn auth_test(&self) -> Res<String>;
        async fn post_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Res<PostedMessage>;
        async fn start(&self, dispatcher: Dispatcher) -> Void;
    }
}

/// Every `(channel, anchor, text)` the mock was asked to post.
type Posts = Arc<Mutex<Vec<(String, String, String)>>>;

fn get_mock_chat(posts: Posts) -> MockChat {
    let mut mock = MockChat::new();

    mock.expect_auth_test().returning(|| Ok(BOT.to_string()));
    mock.expect_start().returning(|_| Ok(()));
    mock.expect_post_message().returning(move |channel, thread_ts, text| {
        posts.lock().unwrap().push((channel.to_string(), thread_ts.to_string(), text.to_string()));
        Ok(PostedMessage {
            channel: channel.to_string(),
            ts: "999.999".to_string(),
        })
    });

    mock
}

/// Helper function to setup a dispatcher over a recording mock.
async fn setup_dispatcher(threshold: usize) -> (Dispatcher, Posts) {
    let posts = Posts::default();
    let chat = ChatClient::new(Arc::new(get_mock_chat(posts.clone())));

    let identity = Identity::resolve(&chat).await.expect("Failed to resolve identity");
    let dispatcher = Dispatcher::new(identity, DedupLedger::new(threshold), ThreadRegistry::new(), chat, ResponderClient::echo());

    (dispatcher, posts)
}

fn posts_of(posts: &Posts) -> Vec<(String, String, String)> {
    posts.lock().unwrap().clone()
}

fn post(channel: &str, anchor: &str, text: &str) -> (String, String, String) {
    (channel.to_string(), anchor.to_string(), text.to_string())
}

fn mention(author: &str, text: &str, channel: &str, ts: &str) -> InboundEvent {
    InboundEvent::Mention(ChatMessage {
        channel: channel.to_string(),
        ts: ts.to_string(),
        thread_ts: None,
        author: author.to_string(),
        text: text.to_string(),
    })
}

fn message(author: &str, text: &str, channel: &str, ts: &str, thread_ts: Option<&str>) -> InboundEvent {
    InboundEvent::Message(ChatMessage {
        channel: channel.to_string(),
        ts: ts.to_string(),
        thread_ts: thread_ts.map(str::to_string),
        author: author.to_string(),
        text: text.to_string(),
    })
}

fn test_config() -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            slack_bot_token: "xoxb-test".to_string(),
            slack_signing_secret: Some("test_secret".to_string()),
            listen_address: "127.0.0.1:0".to_string(),
            events_path: "/slack/events".to_string(),
            dedup_threshold: 5,
            compact_interval_secs: 60,
            ..Default::default()
        }),
    }
}

// Scenarios.

#[tokio::test]
async fn test_mention_replies_in_thread_and_activates_it() {
    let (dispatcher, posts) = setup_dispatcher(1000).await;

    dispatcher.handle(&mention("U1", "<@BOT> hello", "C1", "100.1")).await.expect("Failed to handle mention");

    assert_eq!(posts_of(&posts), vec![post("C1", "100.1", "hello")]);
    assert!(dispatcher.registry().is_active(&ThreadKey::new("C1", "100.1")));
    assert_eq!(dispatcher.ledger().len(), 1);
}

#[tokio::test]
async fn test_thread_continuation_after_mention() {
    let (dispatcher, posts) = setup_dispatcher(1000).await;

    dispatcher.handle(&mention("U1", "<@BOT> hello", "C1", "100.1")).await.unwrap();
    dispatcher.handle(&message("U1", "ok continuing", "C1", "100.2", Some("100.1"))).await.unwrap();

    assert_eq!(posts_of(&posts), vec![post("C1", "100.1", "hello"), post("C1", "100.1", "ok continuing")]);
    assert_eq!(dispatcher.registry().len(), 1);
}

#[tokio::test]
async fn test_top_level_message_is_ignored() {
    let (dispatcher, posts) = setup_dispatcher(1000).await;

    dispatcher.handle(&message("U1", "just chatting", "C1", "100.1", None)).await.unwrap();

    assert!(posts_of(&posts).is_empty());
    assert!(dispatcher.ledger().is_empty());
    assert!(dispatcher.registry().is_empty());
}

#[tokio::test]
async fn test_replayed_mention_is_answered_once() {
    let (dispatcher, posts) = setup_dispatcher(1000).await;
    let event = mention("U1", "<@BOT> hello", "C1", "100.1");

    dispatcher.handle(&event).await.unwrap();
    dispatcher.handle(&event).await.unwrap();

    assert_eq!(posts_of(&posts).len(), 1);
}

#[tokio::test]
async fn test_replayed_thread_reply_is_answered_once() {
    let (dispatcher, posts) = setup_dispatcher(1000).await;
    let reply = message("U1", "ok continuing", "C1", "100.2", Some("100.1"));

    dispatcher.handle(&mention("U1", "<@BOT> hello", "C1", "100.1")).await.unwrap();
    dispatcher.handle(&reply).await.unwrap();
    dispatcher.handle(&reply).await.unwrap();

    assert_eq!(posts_of(&posts).len(), 2);
}

#[tokio::test]
async fn test_own_messages_never_trigger_a_reply() {
    let (dispatcher, posts) = setup_dispatcher(1000).await;

    dispatcher.handle(&mention("U1", "<@BOT> hello", "C1", "100.1")).await.unwrap();
    posts.lock().unwrap().clear();

    dispatcher.handle(&mention(BOT, "<@BOT> hello me", "C1", "200.1")).await.unwrap();
    dispatcher.handle(&message(BOT, "hello", "C1", "100.2", Some("100.1"))).await.unwrap();
    dispatcher.handle(&message(BOT, "<@BOT> again", "C1", "100.3", Some("100.1"))).await.unwrap();

    assert!(posts_of(&posts).is_empty());
    assert_eq!(dispatcher.ledger().len(), 1);
}

#[tokio::test]
async fn test_ignored_events_do_not_consume_the_ledger() {
    let (dispatcher, posts) = setup_dispatcher(1000).await;

    dispatcher.handle(&message("U1", "side conversation", "C1", "300.2", Some("300.1"))).await.unwrap();
    dispatcher.handle(&message("U1", "top level", "C1", "300.3", None)).await.unwrap();
    dispatcher.handle(&InboundEvent::Other).await.unwrap();

    assert!(posts_of(&posts).is_empty());
    assert!(dispatcher.ledger().is_empty());
}

#[tokio::test]
async fn test_re_mention_in_thread_keeps_markup_and_activates_thread() {
    let (dispatcher, posts) = setup_dispatcher(1000).await;

    dispatcher.handle(&message("U1", "<@BOT> can you help", "C1", "400.2", Some("400.1"))).await.unwrap();
    dispatcher.handle(&message("U2", "following up", "C1", "400.3", Some("400.1"))).await.unwrap();

    assert_eq!(posts_of(&posts), vec![post("C1", "400.1", "<@BOT> can you help"), post("C1", "400.1", "following up")]);
    assert!(dispatcher.registry().is_active(&ThreadKey::new("C1", "400.1")));
}

#[tokio::test]
async fn test_mention_inside_thread_anchors_on_the_mentioning_message() {
    let (dispatcher, posts) = setup_dispatcher(1000).await;

    let event = InboundEvent::Mention(ChatMessage {
        channel: "C1".to_string(),
        ts: "100.5".to_string(),
        thread_ts: Some("100.1".to_string()),
        author: "U1".to_string(),
        text: "<@BOT> over here".to_string(),
    });

    dispatcher.handle(&event).await.unwrap();

    assert_eq!(posts_of(&posts), vec![post("C1", "100.5", "over here")]);
    assert!(dispatcher.registry().is_active(&ThreadKey::new("C1", "100.5")));
    assert!(!dispatcher.registry().is_active(&ThreadKey::new("C1", "100.1")));
}

#[tokio::test]
async fn test_thread_activity_is_per_channel() {
    let (dispatcher, posts) = setup_dispatcher(1000).await;

    dispatcher.handle(&mention("U1", "<@BOT> hello", "C1", "100.1")).await.unwrap();
    dispatcher.handle(&message("U1", "same ts, other channel", "C2", "100.2", Some("100.1"))).await.unwrap();

    assert_eq!(posts_of(&posts).len(), 1);
}

#[tokio::test]
async fn test_send_failure_is_reported_and_not_retried() {
    let mut mock = MockChat::new();
    mock.expect_auth_test().returning(|| Ok(BOT.to_string()));
    mock.expect_post_message().times(1).returning(|_, _, _| Err(anyhow::anyhow!("channel_not_found")));

    let chat = ChatClient::new(Arc::new(mock));
    let identity = Identity::resolve(&chat).await.unwrap();
    let dispatcher = Dispatcher::new(identity, DedupLedger::default(), ThreadRegistry::new(), chat, ResponderClient::echo());

    let event = mention("U1", "<@BOT> hello", "C1", "100.1");

    let err = dispatcher.handle(&event).await.expect_err("Expected a delivery error");
    assert_eq!(err.channel, "C1");
    assert_eq!(err.anchor, "100.1");
    assert!(err.source.to_string().contains("channel_not_found"));

    // The delivery stays marked, and the thread was never joined.
    assert!(dispatcher.ledger().seen(&thread_bot::base::types::EventKey::new("C1", "100.1")));
    assert!(!dispatcher.registry().is_active(&ThreadKey::new("C1", "100.1")));

    // A redelivery is swallowed instead of retried.
    dispatcher.handle(&event).await.expect("Redelivery should be deduplicated");
}

#[tokio::test]
async fn test_auth_failure_fails_construction() {
    let mut mock = MockChat::new();
    mock.expect_auth_test().returning(|| Err(anyhow::anyhow!("invalid_auth")));
    mock.expect_post_message().never();

    let chat = ChatClient::new(Arc::new(mock));

    let err = Identity::resolve(&chat).await.expect_err("Expected an auth error");
    assert!(err.source.to_string().contains("invalid_auth"));

    assert!(Runtime::with_chat(test_config(), chat, ResponderClient::echo()).await.is_err());
}

#[tokio::test]
async fn test_runtime_wires_config_into_dispatcher() {
    let posts = Posts::default();
    let chat = ChatClient::new(Arc::new(get_mock_chat(posts.clone())));

    let runtime = Runtime::with_chat(test_config(), chat, ResponderClient::echo()).await.expect("Failed to build runtime");

    assert_eq!(runtime.dispatcher.identity().user_id(), BOT);
    assert_eq!(runtime.dispatcher.ledger().threshold(), 5);

    runtime.start().await.expect("Mock listener should return cleanly");
}

// Compaction.

#[tokio::test]
async fn test_compaction_resets_only_past_threshold() {
    let (dispatcher, posts) = setup_dispatcher(2).await;

    dispatcher.handle(&mention("U1", "<@BOT> one", "C1", "1.0")).await.unwrap();
    dispatcher.handle(&mention("U1", "<@BOT> two", "C1", "2.0")).await.unwrap();

    assert!(!dispatcher.compact());
    assert_eq!(dispatcher.ledger().len(), 2);

    dispatcher.handle(&mention("U1", "<@BOT> three", "C1", "3.0")).await.unwrap();

    assert!(dispatcher.compact());
    assert_eq!(dispatcher.ledger().len(), 0);

    // Forgetting is advisory: a late redelivery gets a duplicate reply, while
    // the threads stay active.
    dispatcher.handle(&mention("U1", "<@BOT> one", "C1", "1.0")).await.unwrap();

    assert_eq!(posts_of(&posts).len(), 4);
    assert_eq!(dispatcher.registry().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_periodic_compaction() {
    let (dispatcher, _posts) = setup_dispatcher(1).await;

    dispatcher.handle(&mention("U1", "<@BOT> one", "C1", "1.0")).await.unwrap();
    dispatcher.handle(&mention("U1", "<@BOT> two", "C1", "2.0")).await.unwrap();

    let task = dispatcher.spawn_compaction(Duration::from_secs(60));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(dispatcher.ledger().len(), 2);

    tokio::time::sleep(Duration::from_secs(31)).await;
    tokio::task::yield_now().await;
    assert!(dispatcher.ledger().is_empty());

    task.abort();
}

// Concurrency.

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deliveries_are_all_answered() {
    let (dispatcher, posts) = setup_dispatcher(1000).await;

    let tasks = (0..32).map(|i| {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            let event = mention("U1", &format!("<@BOT> hello {i}"), "C1", &format!("{i}.0"));
            dispatcher.handle(&event).await
        })
    });

    for result in futures::future::join_all(tasks).await {
        result.expect("Task panicked").expect("Failed to handle mention");
    }

    assert_eq!(posts_of(&posts).len(), 32);
    assert_eq!(dispatcher.ledger().len(), 32);
    assert_eq!(dispatcher.registry().len(), 32);
}

#[tokio::test]
async fn test_spawned_handling_posts_reply() {
    let (dispatcher, posts) = setup_dispatcher(1000).await;

    handle_chat_event(mention("U1", "<@BOT> hello", "C1", "100.1"), dispatcher.clone());

    // Wait for the spawned task to finish.
    for _ in 0..50 {
        if !posts_of(&posts).is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(posts_of(&posts), vec![post("C1", "100.1", "hello")]);
}
