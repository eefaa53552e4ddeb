//! Activation behavior of factory-built bindings

use async_trait::async_trait;
use bytes::Bytes;
use protobind::{
    create_simple, create_simple_with, handler_fn, BindingError, Channel, ChannelEvent,
    ProtocolBinding, ProtocolHandler, SessionHandler, SharedChannel,
};
use protobind_test_utils::{init_tracing, MockChannel, DEFAULT_TIMEOUT};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::time::timeout;

/// Controller for a toy chat protocol
#[derive(Clone)]
struct ChatController {
    channel: SharedChannel,
}

impl ChatController {
    async fn say(&self, text: &str) -> protobind::Result<()> {
        self.channel.send(Bytes::copy_from_slice(text.as_bytes())).await
    }
}

/// Shared handler counting its installations
struct ChatHandler {
    installs: Arc<AtomicU32>,
}

#[async_trait]
impl ProtocolHandler for ChatHandler {
    type Controller = ChatController;

    async fn init_channel(&self, channel: SharedChannel) -> protobind::Result<ChatController> {
        self.installs.fetch_add(1, Ordering::SeqCst);
        channel.send(Bytes::from_static(b"hello")).await?;
        Ok(ChatController { channel })
    }
}

/// Secure-channel style handler: waits for the peer's handshake reply
struct HandshakeHandler;

#[async_trait]
impl ProtocolHandler for HandshakeHandler {
    type Controller = String;

    async fn init_channel(&self, channel: SharedChannel) -> protobind::Result<String> {
        channel.send(Bytes::from_static(b"hs-init")).await?;
        match channel.recv().await {
            Some(ChannelEvent::Data(reply)) if reply.as_ref() == b"hs-ok" => {
                Ok(format!("secured {}", channel.id()))
            }
            Some(ChannelEvent::Data(reply)) => Err(BindingError::Handshake(
                String::from_utf8_lossy(&reply).into_owned(),
            )),
            Some(ChannelEvent::Error(e)) => Err(BindingError::Channel(e)),
            _ => Err(BindingError::ChannelClosed),
        }
    }
}

/// Per-session handler with local mutable state
struct CounterSession {
    seen: Vec<Bytes>,
    instance: u32,
}

#[async_trait]
impl SessionHandler for CounterSession {
    async fn start(&mut self, channel: SharedChannel) -> protobind::Result<()> {
        if let Some(ChannelEvent::Data(data)) = channel.recv().await {
            self.seen.push(data);
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_activation_delegates_once_and_yields_handler_controller() {
    init_tracing();
    let installs = Arc::new(AtomicU32::new(0));
    let binding = create_simple(
        "/chat/1.0.0",
        ChatHandler {
            installs: installs.clone(),
        },
    );

    let ch = MockChannel::stream();
    let controller = timeout(DEFAULT_TIMEOUT, binding.activate(ch.clone(), "/chat/1.0.0"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(installs.load(Ordering::SeqCst), 1);
    assert_eq!(controller.channel.id(), ch.id());
    assert_eq!(ch.attached().as_deref(), Some("/chat/1.0.0"));

    controller.say("hi there").await.unwrap();
    assert_eq!(
        ch.sent(),
        vec![Bytes::from_static(b"hello"), Bytes::from_static(b"hi there")]
    );

    // A second channel gets its own installation
    let other = MockChannel::stream();
    binding.activate(other.clone(), "/chat/1.0.0").await.unwrap();
    assert_eq!(installs.load(Ordering::SeqCst), 2);
    assert_eq!(other.sent(), vec![Bytes::from_static(b"hello")]);
}

#[tokio::test]
async fn test_activate_returns_before_installation_runs() {
    let installs = Arc::new(AtomicU32::new(0));
    let binding = create_simple(
        "/chat/1.0.0",
        ChatHandler {
            installs: installs.clone(),
        },
    );

    let pending = binding.activate(MockChannel::stream(), "/chat/1.0.0");
    assert_eq!(installs.load(Ordering::SeqCst), 0);

    pending.await.unwrap();
    assert_eq!(installs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_second_activation_on_same_channel_fails() {
    let binding = create_simple("/ping/1.0.0", handler_fn(|_ch| async { Ok(()) }));
    let ch = MockChannel::stream();

    binding.activate(ch.clone(), "/ping/1.0.0").await.unwrap();
    let second = binding.activate(ch.clone(), "/ping/1.0.0").await;

    assert!(matches!(second, Err(BindingError::AlreadyAttached { .. })));
    assert_eq!(ch.attach_calls(), 2);
}

#[tokio::test]
async fn test_handshake_success() {
    let binding = create_simple("/noise", HandshakeHandler);
    let ch = MockChannel::connection();
    ch.push_inbound(Bytes::from_static(b"hs-ok"));

    let session = timeout(DEFAULT_TIMEOUT, binding.activate(ch.clone(), "/noise"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session, format!("secured {}", ch.id()));
    assert_eq!(ch.sent(), vec![Bytes::from_static(b"hs-init")]);
}

#[tokio::test]
async fn test_handshake_rejection_resolves_to_failure() {
    let binding = create_simple("/noise", HandshakeHandler);
    let ch = MockChannel::connection();
    ch.push_inbound(Bytes::from_static(b"bad-key"));

    let result = timeout(DEFAULT_TIMEOUT, binding.activate(ch.clone(), "/noise"))
        .await
        .expect("failed activation must not hang");
    assert_eq!(result, Err(BindingError::Handshake("bad-key".to_string())));

    // The failure stays local to that channel
    let fresh = MockChannel::connection();
    fresh.push_inbound(Bytes::from_static(b"hs-ok"));
    assert!(binding.activate(fresh, "/noise").await.is_ok());
}

#[tokio::test]
async fn test_transport_error_during_handshake_fails_activation() {
    let binding = create_simple("/noise", HandshakeHandler);

    let ch = MockChannel::connection();
    ch.push_error("link down");
    let result = timeout(DEFAULT_TIMEOUT, binding.activate(ch.clone(), "/noise"))
        .await
        .unwrap();
    assert_eq!(result, Err(BindingError::Channel("link down".to_string())));

    let ch = MockChannel::connection();
    ch.fail_sends("broken pipe");
    let result = timeout(DEFAULT_TIMEOUT, binding.activate(ch.clone(), "/noise"))
        .await
        .unwrap();
    assert_eq!(result, Err(BindingError::Channel("broken pipe".to_string())));
}

#[tokio::test]
async fn test_channel_closed_before_first_poll_fails_without_install() {
    let installs = Arc::new(AtomicU32::new(0));
    let binding = create_simple(
        "/chat/1.0.0",
        ChatHandler {
            installs: installs.clone(),
        },
    );

    let ch = MockChannel::stream();
    let pending = binding.activate(ch.clone(), "/chat/1.0.0");
    ch.close_remote(Some("peer went away"));
    assert!(!ch.is_open());

    let result = timeout(DEFAULT_TIMEOUT, pending).await.unwrap();
    assert!(matches!(result, Err(BindingError::ChannelClosed)));
    assert_eq!(ch.attached(), None);
    assert_eq!(installs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_channel_close_cancels_pending_activation() {
    let binding = create_simple(
        "/stall/1.0.0",
        handler_fn(|_ch| async {
            futures::future::pending::<()>().await;
            Ok(())
        }),
    );
    let ch = MockChannel::stream();
    let activation = binding.activate(ch.clone(), "/stall/1.0.0").spawn();

    ch.close_remote(Some("peer reset"));

    let result = timeout(DEFAULT_TIMEOUT, activation).await.unwrap();
    assert_eq!(result, Err(BindingError::ChannelClosed));
}

#[tokio::test]
async fn test_constructor_factory_builds_fresh_handler_per_activation() {
    let created = Arc::new(AtomicU32::new(0));
    let counter = created.clone();
    let binding = create_simple_with("/counter/1.0.0", move || CounterSession {
        seen: Vec::new(),
        instance: counter.fetch_add(1, Ordering::SeqCst),
    });

    let a = MockChannel::stream();
    let b = MockChannel::stream();

    let pending_a = binding.activate(a.clone(), "/counter/1.0.0").spawn();
    let pending_b = binding.activate(b.clone(), "/counter/1.0.0").spawn();

    b.push_inbound(Bytes::from_static(b"for-b"));
    a.push_inbound(Bytes::from_static(b"for-a"));

    let (session_a, session_b) = timeout(DEFAULT_TIMEOUT, async {
        tokio::join!(pending_a, pending_b)
    })
    .await
    .unwrap();
    let session_a = session_a.unwrap();
    let session_b = session_b.unwrap();

    assert_eq!(created.load(Ordering::SeqCst), 2);
    assert_ne!(session_a.instance, session_b.instance);
    assert_eq!(session_a.seen, vec![Bytes::from_static(b"for-a")]);
    assert_eq!(session_b.seen, vec![Bytes::from_static(b"for-b")]);
}

#[tokio::test]
async fn test_factory_matching_properties() {
    for id in ["/chat/1.0.0", "/ipfs/id/1.0.0", "noise", "/x"] {
        let binding = create_simple(id, handler_fn(|_ch| async { Ok(()) }));
        assert_eq!(binding.announce(), id);
        assert!(binding.matcher().matches(id));
        assert!(!binding.matcher().matches(&format!("{}x", id)));
    }
}
