//! End-to-end session flow tests.
//!
//! Drives the full client state machine through a realistic exchange:
//! connect, join a room, receive a broadcast, switch to a direct
//! conversation and send, asserting the emitted wire intents along the way.

use std::sync::Arc;

use tokio::sync::mpsc;

use aizuchi_client::domain::{ActiveContext, Identity, MessageKind, Peer, Timestamp, UserId, Username};
use aizuchi_client::session::event::{InboundEvent, OutboundEvent};
use aizuchi_client::session::{ChatSession, NoopNotificationSink};

fn identity(user_id: &str, username: &str) -> Identity {
    Identity::new(user_id.to_string(), username.to_string()).unwrap()
}

fn uid(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

fn uname(name: &str) -> Username {
    Username::new(name.to_string()).unwrap()
}

fn drain(rx: &mut mpsc::UnboundedReceiver<OutboundEvent>) -> Vec<OutboundEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn test_full_room_and_dm_exchange() {
    // テスト項目: 接続 → 入室 → 受信 → DM 切り替え → 送信 の一連の流れ
    // given (前提条件): alice として接続
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = ChatSession::new(
        identity("u-alice", "alice"),
        tx,
        Arc::new(NoopNotificationSink),
    );
    session.on_connected();
    assert_eq!(drain(&mut rx), vec![OutboundEvent::GetOnlineUsers]);

    // when (操作): ルーム "general" に入室
    session.join_room("general", Timestamp::new(1_000)).unwrap();

    // then (期待する結果): ログは参加通知1件
    assert_eq!(session.room_log().len(), 1);
    assert_eq!(session.room_log()[0].kind, MessageKind::System);
    assert_eq!(
        session.room_log()[0].text,
        "You have joined the room general"
    );
    drain(&mut rx);

    // when (操作): ロースターと bob のメッセージを受信
    session.handle_event(
        InboundEvent::OnlineUsers(vec![
            Peer {
                peer_id: uid("u-alice"),
                username: uname("alice"),
            },
            Peer {
                peer_id: uid("u-bob"),
                username: uname("bob"),
            },
        ]),
        Timestamp::new(1_500),
    );
    session.handle_event(
        InboundEvent::RoomMessage {
            room: aizuchi_client::domain::RoomName::new("general".to_string()).unwrap(),
            sender_id: uid("u-bob"),
            sender_name: uname("bob"),
            content: "hi".to_string(),
            timestamp: Timestamp::new(2_000),
        },
        Timestamp::new(2_000),
    );

    // then (期待する結果): 自分抜きのロースターとログ2件
    assert_eq!(session.peers().len(), 1);
    assert_eq!(session.peers()[0].username.as_str(), "bob");
    assert_eq!(session.room_log().len(), 2);
    assert_eq!(session.room_log()[1].author, "bob");
    assert_eq!(session.room_log()[1].text, "hi");

    // when (操作): bob との DM に切り替えて "hey" を送信
    session.select_peer(uid("u-bob"));
    assert_eq!(
        session.active_context(),
        Some(&ActiveContext::DirectMessage(uid("u-bob")))
    );
    session.on_input_changed("hey", Timestamp::new(3_000));
    session.submit(Timestamp::new(3_000)).unwrap();

    // then (期待する結果): 楽観エコーと receiverId 付きの送信イベント
    let conversation = session.conversation(&uid("u-bob")).unwrap();
    assert_eq!(conversation.messages.len(), 1);
    assert_eq!(conversation.messages[0].author, "alice");
    assert_eq!(conversation.messages[0].text, "hey");
    assert_eq!(conversation.messages[0].sent_at, Timestamp::new(3_000));

    let events = drain(&mut rx);
    let sent = events
        .iter()
        .find_map(|e| match e {
            OutboundEvent::PrivateMessage {
                receiver_id,
                content,
                ..
            } => Some((receiver_id.clone(), content.clone())),
            _ => None,
        })
        .expect("a private-message should have been emitted");
    assert_eq!(sent.0, uid("u-bob"));
    assert_eq!(sent.1, "hey");

    // ルームのログは DM 操作の影響を受けない
    assert_eq!(session.room_log().len(), 2);
}

#[test]
fn test_identity_scoped_state_is_dropped_with_session() {
    // テスト項目: セッションは接続ごとに使い捨てであり、新しい
    //             セッションに会話が持ち越されない
    // given (前提条件): 1つ目のセッションで bob と会話
    let (tx1, _rx1) = mpsc::unbounded_channel();
    let mut first = ChatSession::new(
        identity("u-alice", "alice"),
        tx1,
        Arc::new(NoopNotificationSink),
    );
    first.on_connected();
    first.select_peer(uid("u-bob"));
    first.on_input_changed("hello", Timestamp::new(1_000));
    first.submit(Timestamp::new(1_000)).unwrap();
    assert!(first.conversation(&uid("u-bob")).is_some());

    // when (操作): 再接続で新しいセッションを構築
    let (tx2, _rx2) = mpsc::unbounded_channel();
    let second = ChatSession::new(
        identity("u-alice", "alice"),
        tx2,
        Arc::new(NoopNotificationSink),
    );

    // then (期待する結果): 会話は引き継がれない
    assert!(second.conversation(&uid("u-bob")).is_none());
}
