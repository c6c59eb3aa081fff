//! セッション層
//!
//! リアルタイムメッセージングのクライアント状態機械。1 つの接続につき
//! 1 つの [`ChatSession`] を構築し、切断時に破棄する（プロセス全体の
//! シングルトンは持たない）。全ての状態遷移はローカル操作か正規化済み
//! トランスポートイベントへの反応として、単一スレッド上で起こる。

pub mod composer;
pub mod direct;
pub mod error;
pub mod event;
pub mod notification;
pub mod presence;
pub mod room;
pub mod typing;

pub use composer::Composer;
pub use direct::DirectConversationStore;
pub use error::{ComposeError, SessionError};
pub use event::{InboundEvent, OutboundEvent, TypingScope};
pub use notification::{NoopNotificationSink, NotificationSink};
pub use presence::PresenceTracker;
pub use room::RoomSession;
pub use typing::{TypingTracker, TYPING_TTL_MS};

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::domain::{
    ActiveContext, ChatMessage, DirectConversation, Identity, Peer, RoomName, Timestamp, UserId,
    Username,
};

/// Client-side state machine for one realtime session.
///
/// Owns the presence set, the room session, the direct conversation store,
/// typing indicators and the composer, multiplexed over a single outbound
/// channel consumed by the transport writer. All inbound traffic arrives
/// through [`ChatSession::handle_event`], the single dispatch table.
pub struct ChatSession {
    identity: Identity,
    connected: bool,
    active: Option<ActiveContext>,
    presence: PresenceTracker,
    room: RoomSession,
    directs: DirectConversationStore,
    typing: TypingTracker,
    composer: Composer,
    outbound: UnboundedSender<OutboundEvent>,
    notifier: Arc<dyn NotificationSink>,
}

impl ChatSession {
    /// Create a session bound to `identity`, pushing outbound events into
    /// `outbound` and DM notifications into `notifier`.
    pub fn new(
        identity: Identity,
        outbound: UnboundedSender<OutboundEvent>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            identity,
            connected: false,
            active: None,
            presence: PresenceTracker::new(),
            room: RoomSession::new(),
            directs: DirectConversationStore::new(),
            typing: TypingTracker::new(),
            composer: Composer::new(),
            outbound,
            notifier,
        }
    }

    fn emit(&self, event: OutboundEvent) {
        if self.outbound.send(event).is_err() {
            tracing::warn!("transport writer gone; dropping outbound event");
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn active_context(&self) -> Option<&ActiveContext> {
        self.active.as_ref()
    }

    pub fn peers(&self) -> &[Peer] {
        self.presence.peers()
    }

    /// Look an online peer up by id or display name.
    pub fn find_peer(&self, id_or_name: &str) -> Option<&Peer> {
        self.presence.find(id_or_name)
    }

    pub fn joined_room(&self) -> Option<&RoomName> {
        self.room.joined()
    }

    pub fn room_log(&self) -> &[ChatMessage] {
        self.room.log()
    }

    pub fn conversation(&self, peer_id: &UserId) -> Option<&DirectConversation> {
        self.directs.get(peer_id)
    }

    pub fn unread_peers(&self) -> Vec<&UserId> {
        self.directs.unread_peers()
    }

    pub fn composer_buffer(&self) -> &str {
        self.composer.buffer()
    }

    /// Display names currently typing in the active context.
    pub fn typing_peers(&self) -> Vec<&Username> {
        match &self.active {
            Some(ActiveContext::Room(room)) => {
                self.typing.typing_in(&TypingScope::Room(room.clone()))
            }
            Some(ActiveContext::DirectMessage(peer)) => {
                self.typing.typing_in(&TypingScope::Peer(peer.clone()))
            }
            None => Vec::new(),
        }
    }

    /// Mark the transport session established and request the roster so
    /// presence is populated before any peer event arrives.
    pub fn on_connected(&mut self) {
        self.connected = true;
        self.emit(OutboundEvent::GetOnlineUsers);
    }

    /// Tear the session state down. While joined to a room the leave
    /// notification is emitted first. Idempotent: a second call performs
    /// no additional emission. Only the local typing timer is cancelled;
    /// outbound sends already dispatched are not recalled.
    pub fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        if let Some(room) = self.room.end() {
            self.typing.discard_scope(&TypingScope::Room(room.clone()));
            self.emit(OutboundEvent::LeaveRoom { room });
        }
        self.typing.cancel_local();
        self.active = None;
        self.connected = false;
    }

    /// Join `name`, implicitly leaving the current room first. The room
    /// log is reseeded with a single local join notice, the active context
    /// switches to the room, and the roster is re-requested.
    pub fn join_room(&mut self, name: &str, now: Timestamp) -> Result<(), SessionError> {
        let room = RoomName::new(name.trim().to_string())?;
        if !self.connected {
            return Err(SessionError::NotConnected);
        }
        if let Some(previous) = self.room.end() {
            self.typing
                .discard_scope(&TypingScope::Room(previous.clone()));
            self.emit(OutboundEvent::LeaveRoom { room: previous });
        }
        self.emit(OutboundEvent::JoinRoom { room: room.clone() });
        self.room.begin(room.clone(), now);
        self.active = Some(ActiveContext::Room(room));
        self.emit(OutboundEvent::GetOnlineUsers);
        Ok(())
    }

    /// Leave the current room, resetting the active context. No DM is
    /// auto-selected. A no-op when not joined.
    pub fn leave_room(&mut self) {
        if let Some(room) = self.room.end() {
            self.typing.discard_scope(&TypingScope::Room(room.clone()));
            self.emit(OutboundEvent::LeaveRoom { room });
            if matches!(self.active, Some(ActiveContext::Room(_))) {
                self.active = None;
            }
        }
    }

    /// Activate the direct conversation with `peer_id`. Opening the
    /// conversation is what marks it read.
    pub fn select_peer(&mut self, peer_id: UserId) {
        self.directs.mark_read(&peer_id);
        self.active = Some(ActiveContext::DirectMessage(peer_id));
    }

    /// Record the current input text. The first keystroke since the last
    /// idle period emits a typing-started notification scoped to the
    /// active context; every keystroke pushes the idle deadline.
    pub fn on_input_changed(&mut self, text: &str, now: Timestamp) {
        self.composer.set(text);
        let Some(scope) = self.active_typing_scope() else {
            return;
        };
        if self.typing.refresh_local(scope.clone(), now) {
            self.emit_typing(scope, true);
        }
    }

    /// Submit the composer buffer to the active context. Rejects empty or
    /// whitespace-only input and a missing context synchronously, leaving
    /// the buffer untouched and emitting nothing. On success the buffer is
    /// cleared and an explicit typing-stopped goes out before the send.
    pub fn submit(&mut self, now: Timestamp) -> Result<(), ComposeError> {
        let Some(text) = self.composer.submittable().map(str::to_string) else {
            return Err(ComposeError::EmptyMessage);
        };
        let Some(context) = self.active.clone() else {
            return Err(ComposeError::NoActiveContext);
        };

        if let Some(scope) = self.typing.stop_local() {
            self.emit_typing(scope, false);
        }

        match context {
            ActiveContext::Room(room) => {
                self.room.append_local(ChatMessage::user(
                    self.identity.username.as_str(),
                    text.as_str(),
                    now,
                ));
                self.emit(OutboundEvent::SendMessage {
                    content: text,
                    sender_id: self.identity.user_id.clone(),
                    sender_name: self.identity.username.clone(),
                    room,
                    timestamp: now,
                });
            }
            ActiveContext::DirectMessage(peer_id) => {
                self.send_direct(peer_id, text, now);
            }
        }

        self.composer.clear();
        Ok(())
    }

    /// Clear the composer buffer without sending.
    pub fn cancel(&mut self) {
        self.composer.clear();
    }

    /// Append the optimistic echo to `peer_id`'s conversation and emit the
    /// direct-send request with a locally generated message id. The id is
    /// used only for delivery/failure correlation, not for echo dedup.
    fn send_direct(&mut self, peer_id: UserId, text: String, now: Timestamp) {
        self.directs.append(
            peer_id.clone(),
            ChatMessage::user(self.identity.username.as_str(), text.as_str(), now),
        );
        self.emit(OutboundEvent::PrivateMessage {
            content: text,
            sender_id: self.identity.user_id.clone(),
            sender_name: self.identity.username.clone(),
            receiver_id: peer_id,
            message_id: Uuid::new_v4().to_string(),
            timestamp: now,
        });
    }

    /// Periodic sweep: expire remote typing entries and, when the local
    /// idle deadline lapsed, emit the typing-stopped notification.
    pub fn tick(&mut self, now: Timestamp) {
        if let Some(scope) = self.typing.prune(now) {
            self.emit_typing(scope, false);
        }
    }

    /// The single dispatch table for normalized inbound events.
    pub fn handle_event(&mut self, event: InboundEvent, now: Timestamp) {
        match event {
            InboundEvent::RoomMessage {
                room,
                sender_id: _,
                sender_name,
                content,
                timestamp,
            } => {
                let message = ChatMessage::user(sender_name.as_str(), content, timestamp);
                if !self.room.append_remote(&room, message) {
                    tracing::debug!(room = room.as_str(), "dropping message for inactive room");
                }
            }
            InboundEvent::PrivateMessage {
                sender_id,
                sender_name,
                content,
                timestamp,
            } => self.on_private_message(sender_id, sender_name, content, timestamp),
            InboundEvent::PrivateDelivered { receiver_name } => {
                tracing::debug!(receiver = receiver_name.as_str(), "direct message delivered");
            }
            InboundEvent::PrivateFailed {
                receiver_id,
                reason,
                timestamp,
            } => {
                // Only a peer the local user actually messaged has a
                // conversation to report the failure into.
                match self.directs.get_mut(&receiver_id) {
                    Some(conversation) => conversation.messages.push(ChatMessage::system(
                        format!("Message could not be delivered: {reason}"),
                        timestamp,
                    )),
                    None => tracing::debug!(
                        receiver = receiver_id.as_str(),
                        "dropping delivery failure for an unknown conversation"
                    ),
                }
            }
            InboundEvent::UserJoined {
                username,
                room,
                timestamp,
            } => {
                if username != self.identity.username {
                    self.room.append_notice(
                        &room,
                        format!("{} has joined the room", username.as_str()),
                        timestamp,
                    );
                }
                self.emit(OutboundEvent::GetOnlineUsers);
            }
            InboundEvent::UserLeft {
                username,
                room,
                timestamp,
            } => {
                if username != self.identity.username {
                    self.room.append_notice(
                        &room,
                        format!("{} has left the room", username.as_str()),
                        timestamp,
                    );
                }
                self.emit(OutboundEvent::GetOnlineUsers);
            }
            InboundEvent::OnlineUsers(peers) => {
                self.presence.replace_roster(peers, &self.identity);
            }
            InboundEvent::UserTyping {
                user_id,
                username,
                scope,
                is_typing,
            } => {
                if user_id != self.identity.user_id {
                    self.typing.on_remote(user_id, username, scope, is_typing, now);
                }
            }
            InboundEvent::Disconnected => {
                tracing::info!("transport session closed by server");
                self.connected = false;
            }
        }
    }

    fn on_private_message(
        &mut self,
        sender_id: UserId,
        sender_name: Username,
        content: String,
        timestamp: Timestamp,
    ) {
        let viewing = matches!(
            &self.active,
            Some(ActiveContext::DirectMessage(peer)) if peer == &sender_id
        );
        let message = ChatMessage::user(sender_name.as_str(), content.as_str(), timestamp);
        let conversation = self.directs.entry(sender_id);
        conversation.messages.push(message);
        if !viewing {
            conversation.has_unread = true;
            self.notifier.notify(sender_name.as_str(), &content);
        }
    }

    fn active_typing_scope(&self) -> Option<TypingScope> {
        match &self.active {
            Some(ActiveContext::Room(room)) => Some(TypingScope::Room(room.clone())),
            Some(ActiveContext::DirectMessage(peer)) => Some(TypingScope::Peer(peer.clone())),
            None => None,
        }
    }

    fn emit_typing(&self, scope: TypingScope, is_typing: bool) {
        self.emit(OutboundEvent::Typing {
            user_id: self.identity.user_id.clone(),
            username: self.identity.username.clone(),
            scope,
            is_typing,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::notification::MockNotificationSink;
    use super::*;
    use tokio::sync::mpsc;

    fn identity(user_id: &str, username: &str) -> Identity {
        Identity::new(user_id.to_string(), username.to_string()).unwrap()
    }

    fn uid(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn uname(name: &str) -> Username {
        Username::new(name.to_string()).unwrap()
    }

    fn room(name: &str) -> RoomName {
        RoomName::new(name.to_string()).unwrap()
    }

    fn connected_session() -> (ChatSession, mpsc::UnboundedReceiver<OutboundEvent>) {
        connected_session_with(Arc::new(NoopNotificationSink))
    }

    fn connected_session_with(
        notifier: Arc<dyn NotificationSink>,
    ) -> (ChatSession, mpsc::UnboundedReceiver<OutboundEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut session = ChatSession::new(identity("u-alice", "alice"), tx, notifier);
        session.on_connected();
        (session, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<OutboundEvent>) -> Vec<OutboundEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_connect_requests_roster() {
        // テスト項目: 接続確立直後にロースター取得が要求される
        let (_session, mut rx) = connected_session();
        assert_eq!(drain(&mut rx), vec![OutboundEvent::GetOnlineUsers]);
    }

    #[test]
    fn test_join_room_emits_join_and_reseeds_log() {
        // テスト項目: 入室で join-room とロースター要求が送出され、
        //             ログが参加通知1件で再シードされる
        // given (前提条件):
        let (mut session, mut rx) = connected_session();
        drain(&mut rx);

        // when (操作):
        session.join_room("general", Timestamp::new(1_000)).unwrap();

        // then (期待する結果):
        assert_eq!(
            drain(&mut rx),
            vec![
                OutboundEvent::JoinRoom {
                    room: room("general")
                },
                OutboundEvent::GetOnlineUsers,
            ]
        );
        assert_eq!(session.joined_room().unwrap().as_str(), "general");
        assert_eq!(session.room_log().len(), 1);
        assert_eq!(session.room_log()[0].text, "You have joined the room general");
        assert_eq!(
            session.active_context(),
            Some(&ActiveContext::Room(room("general")))
        );
    }

    #[test]
    fn test_join_second_room_leaves_first() {
        // テスト項目: 2つ目のルームへの入室は先に leave-room を送出し、
        //             ログにはシステムメッセージが1件だけ残る
        // given (前提条件):
        let (mut session, mut rx) = connected_session();
        session.join_room("tech", Timestamp::new(1_000)).unwrap();
        drain(&mut rx);

        // when (操作):
        session.join_room("random", Timestamp::new(2_000)).unwrap();

        // then (期待する結果): leave → join の順で送出される
        assert_eq!(
            drain(&mut rx),
            vec![
                OutboundEvent::LeaveRoom { room: room("tech") },
                OutboundEvent::JoinRoom {
                    room: room("random")
                },
                OutboundEvent::GetOnlineUsers,
            ]
        );
        assert_eq!(session.joined_room().unwrap().as_str(), "random");
        assert_eq!(session.room_log().len(), 1);
        assert_eq!(session.room_log()[0].text, "You have joined the room random");
    }

    #[test]
    fn test_join_room_empty_name_rejected() {
        // テスト項目: 空のルーム名は拒否され、何も送出されない
        let (mut session, mut rx) = connected_session();
        drain(&mut rx);

        let result = session.join_room("   ", Timestamp::new(1_000));

        assert!(result.is_err());
        assert!(drain(&mut rx).is_empty());
        assert!(session.joined_room().is_none());
    }

    #[test]
    fn test_room_message_for_other_room_dropped() {
        // テスト項目: 参加中ルーム以外宛の receive-message は破棄される
        // given (前提条件): Joined("general")
        let (mut session, mut rx) = connected_session();
        session.join_room("general", Timestamp::new(1_000)).unwrap();
        drain(&mut rx);

        // when (操作): roomId "tech" のメッセージを受信
        session.handle_event(
            InboundEvent::RoomMessage {
                room: room("tech"),
                sender_id: uid("u-bob"),
                sender_name: uname("bob"),
                content: "stale".to_string(),
                timestamp: Timestamp::new(2_000),
            },
            Timestamp::new(2_000),
        );

        // then (期待する結果): ログは参加通知のみ
        assert_eq!(session.room_log().len(), 1);
    }

    #[test]
    fn test_peer_join_notice_skips_self() {
        // テスト項目: 自分自身の user-joined ではシステムメッセージを挿入しない
        // given (前提条件):
        let (mut session, mut rx) = connected_session();
        session.join_room("general", Timestamp::new(1_000)).unwrap();
        drain(&mut rx);

        // when (操作): 自分の参加イベントと bob の参加イベントを受信
        session.handle_event(
            InboundEvent::UserJoined {
                username: uname("alice"),
                room: room("general"),
                timestamp: Timestamp::new(2_000),
            },
            Timestamp::new(2_000),
        );
        session.handle_event(
            InboundEvent::UserJoined {
                username: uname("bob"),
                room: room("general"),
                timestamp: Timestamp::new(3_000),
            },
            Timestamp::new(3_000),
        );

        // then (期待する結果): bob の通知だけが追加され、ロースターは2回再要求される
        assert_eq!(session.room_log().len(), 2);
        assert_eq!(session.room_log()[1].text, "bob has joined the room");
        assert_eq!(
            drain(&mut rx),
            vec![OutboundEvent::GetOnlineUsers, OutboundEvent::GetOnlineUsers]
        );
    }

    #[test]
    fn test_roster_excludes_self() {
        // テスト項目: online-users 受信後の Presence に自分が含まれない
        // given (前提条件):
        let (mut session, _rx) = connected_session();

        // when (操作):
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
            Timestamp::new(1_000),
        );

        // then (期待する結果):
        assert_eq!(session.peers().len(), 1);
        assert_eq!(session.peers()[0].username.as_str(), "bob");
    }

    #[test]
    fn test_dm_persists_across_context_switches() {
        // テスト項目: DM ログはルームへの切り替えを跨いで保持され、
        //             再選択で未読がクリアされる
        // given (前提条件): bob との DM に "hello" を送信
        let (mut session, mut rx) = connected_session();
        session.select_peer(uid("u-bob"));
        session.on_input_changed("hello", Timestamp::new(1_000));
        session.submit(Timestamp::new(1_000)).unwrap();
        drain(&mut rx);

        // when (操作): ルームに切り替えてから DM に戻る
        session.join_room("general", Timestamp::new(2_000)).unwrap();
        session.handle_event(
            InboundEvent::PrivateMessage {
                sender_id: uid("u-bob"),
                sender_name: uname("bob"),
                content: "hi back".to_string(),
                timestamp: Timestamp::new(3_000),
            },
            Timestamp::new(3_000),
        );
        assert!(session.conversation(&uid("u-bob")).unwrap().has_unread);
        session.select_peer(uid("u-bob"));

        // then (期待する結果): "hello" が残っていて未読は消えている
        let conversation = session.conversation(&uid("u-bob")).unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].text, "hello");
        assert_eq!(conversation.messages[0].author, "alice");
        assert!(!conversation.has_unread);
    }

    #[test]
    fn test_dm_submit_emits_private_message() {
        // テスト項目: DM 送信で private-message が receiverId 付きで送出される
        // given (前提条件):
        let (mut session, mut rx) = connected_session();
        drain(&mut rx);
        session.select_peer(uid("u-bob"));

        // when (操作):
        session.on_input_changed("hey", Timestamp::new(1_000));
        session.submit(Timestamp::new(1_000)).unwrap();

        // then (期待する結果): typing 開始 → 停止 → private-message の順
        let events = drain(&mut rx);
        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[0],
            OutboundEvent::Typing { is_typing: true, .. }
        ));
        assert!(matches!(
            &events[1],
            OutboundEvent::Typing { is_typing: false, .. }
        ));
        match &events[2] {
            OutboundEvent::PrivateMessage {
                content,
                receiver_id,
                message_id,
                ..
            } => {
                assert_eq!(content, "hey");
                assert_eq!(receiver_id, &uid("u-bob"));
                assert!(!message_id.is_empty());
            }
            other => panic!("expected private-message, got {other:?}"),
        }
        assert_eq!(session.composer_buffer(), "");
    }

    #[test]
    fn test_unread_set_while_room_active_and_notification_fired() {
        // テスト項目: ルーム閲覧中に届いた DM は未読になり通知が発火する
        // given (前提条件): モック通知シンクで通知回数を検証する
        let mut mock = MockNotificationSink::new();
        mock.expect_notify()
            .withf(|title, body| title == "bob" && body == "psst")
            .times(1)
            .return_const(());
        let (mut session, mut rx) = connected_session_with(Arc::new(mock));
        session.join_room("general", Timestamp::new(1_000)).unwrap();
        drain(&mut rx);

        // when (操作):
        session.handle_event(
            InboundEvent::PrivateMessage {
                sender_id: uid("u-bob"),
                sender_name: uname("bob"),
                content: "psst".to_string(),
                timestamp: Timestamp::new(2_000),
            },
            Timestamp::new(2_000),
        );

        // then (期待する結果):
        assert!(session.conversation(&uid("u-bob")).unwrap().has_unread);
        assert_eq!(session.unread_peers(), vec![&uid("u-bob")]);
    }

    #[test]
    fn test_dm_while_viewing_does_not_notify() {
        // テスト項目: アクティブな DM への受信は未読にならず通知も出ない
        // given (前提条件): 通知が呼ばれないことをモックで保証
        let mut mock = MockNotificationSink::new();
        mock.expect_notify().times(0);
        let (mut session, _rx) = connected_session_with(Arc::new(mock));
        session.select_peer(uid("u-bob"));

        // when (操作):
        session.handle_event(
            InboundEvent::PrivateMessage {
                sender_id: uid("u-bob"),
                sender_name: uname("bob"),
                content: "hi".to_string(),
                timestamp: Timestamp::new(1_000),
            },
            Timestamp::new(1_000),
        );

        // then (期待する結果):
        let conversation = session.conversation(&uid("u-bob")).unwrap();
        assert_eq!(conversation.messages.len(), 1);
        assert!(!conversation.has_unread);
    }

    #[test]
    fn test_delivery_failure_inserts_system_message() {
        // テスト項目: private-message-failed で対象の会話にシステム
        //             メッセージが挿入される（自動リトライはしない）
        // given (前提条件): bob 宛てに送信済み
        let (mut session, mut rx) = connected_session();
        session.select_peer(uid("u-bob"));
        session.on_input_changed("hey", Timestamp::new(1_000));
        session.submit(Timestamp::new(1_000)).unwrap();
        drain(&mut rx);

        // when (操作):
        session.handle_event(
            InboundEvent::PrivateFailed {
                receiver_id: uid("u-bob"),
                reason: "user offline".to_string(),
                timestamp: Timestamp::new(2_000),
            },
            Timestamp::new(2_000),
        );

        // then (期待する結果):
        let conversation = session.conversation(&uid("u-bob")).unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[1].kind, crate::domain::MessageKind::System);
        assert_eq!(
            conversation.messages[1].text,
            "Message could not be delivered: user offline"
        );
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_submit_empty_buffer_rejected() {
        // テスト項目: 空・空白のみのバッファの submit は何も送出せず
        //             バッファも変更されない
        // given (前提条件):
        let (mut session, mut rx) = connected_session();
        session.join_room("general", Timestamp::new(1_000)).unwrap();
        drain(&mut rx);
        session.composer.set("   ");

        // when (操作):
        let result = session.submit(Timestamp::new(2_000));

        // then (期待する結果):
        assert_eq!(result, Err(ComposeError::EmptyMessage));
        assert_eq!(session.composer_buffer(), "   ");
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_submit_without_context_rejected() {
        // テスト項目: アクティブな文脈が無い submit は拒否される
        let (mut session, mut rx) = connected_session();
        drain(&mut rx);
        session.composer.set("hello");

        let result = session.submit(Timestamp::new(1_000));

        assert_eq!(result, Err(ComposeError::NoActiveContext));
        assert_eq!(session.composer_buffer(), "hello");
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_typing_stop_emitted_on_submit() {
        // テスト項目: isTyping 中の submit は送信前に明示的な
        //             typing-stopped を送出し、ローカル状態をリセットする
        // given (前提条件):
        let (mut session, mut rx) = connected_session();
        session.join_room("general", Timestamp::new(1_000)).unwrap();
        drain(&mut rx);
        session.on_input_changed("hi", Timestamp::new(1_100));
        assert!(session.typing.is_local_typing());
        drain(&mut rx);

        // when (操作):
        session.submit(Timestamp::new(1_200)).unwrap();

        // then (期待する結果):
        let events = drain(&mut rx);
        assert!(matches!(
            &events[0],
            OutboundEvent::Typing { is_typing: false, .. }
        ));
        assert!(matches!(&events[1], OutboundEvent::SendMessage { .. }));
        assert!(!session.typing.is_local_typing());
    }

    #[test]
    fn test_typing_idle_deadline_emits_stop_via_tick() {
        // テスト項目: キー入力が止まったあとの掃除で typing-stopped が
        //             一度だけ送出される
        // given (前提条件):
        let (mut session, mut rx) = connected_session();
        session.join_room("general", Timestamp::new(1_000)).unwrap();
        drain(&mut rx);
        session.on_input_changed("h", Timestamp::new(1_000));
        drain(&mut rx);

        // when (操作): TTL 経過後の掃除
        session.tick(Timestamp::new(1_000 + TYPING_TTL_MS));

        // then (期待する結果):
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            OutboundEvent::Typing { is_typing: false, .. }
        ));

        // 再度の掃除では何も送出されない
        session.tick(Timestamp::new(20_000));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_remote_typing_rendered_for_active_context_only() {
        // テスト項目: アクティブな文脈宛の typing だけが表示対象になる
        // given (前提条件): Joined("general")
        let (mut session, _rx) = connected_session();
        session.join_room("general", Timestamp::new(1_000)).unwrap();

        // when (操作): ルーム宛と DM 宛の typing を受信
        session.handle_event(
            InboundEvent::UserTyping {
                user_id: uid("u-bob"),
                username: uname("bob"),
                scope: TypingScope::Room(room("general")),
                is_typing: true,
            },
            Timestamp::new(1_100),
        );
        session.handle_event(
            InboundEvent::UserTyping {
                user_id: uid("u-carol"),
                username: uname("carol"),
                scope: TypingScope::Peer(uid("u-carol")),
                is_typing: true,
            },
            Timestamp::new(1_100),
        );

        // then (期待する結果): ルーム文脈では bob のみ
        let typing = session.typing_peers();
        assert_eq!(typing.len(), 1);
        assert_eq!(typing[0].as_str(), "bob");

        // DM に切り替えると carol が見える
        session.select_peer(uid("u-carol"));
        let typing = session.typing_peers();
        assert_eq!(typing.len(), 1);
        assert_eq!(typing[0].as_str(), "carol");
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        // テスト項目: disconnect を2回呼んでも leave-room は1回しか
        //             送出されない
        // given (前提条件): Joined("general")
        let (mut session, mut rx) = connected_session();
        session.join_room("general", Timestamp::new(1_000)).unwrap();
        drain(&mut rx);

        // when (操作):
        session.disconnect();
        session.disconnect();

        // then (期待する結果):
        assert_eq!(
            drain(&mut rx),
            vec![OutboundEvent::LeaveRoom {
                room: room("general")
            }]
        );
        assert!(!session.is_connected());
        assert!(session.active_context().is_none());
    }

    #[test]
    fn test_leave_room_resets_context_without_selecting_dm() {
        // テスト項目: 退室で leave-room が送出され、文脈は未選択に戻る
        // given (前提条件):
        let (mut session, mut rx) = connected_session();
        session.join_room("general", Timestamp::new(1_000)).unwrap();
        drain(&mut rx);

        // when (操作):
        session.leave_room();

        // then (期待する結果):
        assert_eq!(
            drain(&mut rx),
            vec![OutboundEvent::LeaveRoom {
                room: room("general")
            }]
        );
        assert!(session.joined_room().is_none());
        assert!(session.active_context().is_none());
        assert!(session.room_log().is_empty());
    }

    #[test]
    fn test_leave_room_cancels_local_typing_without_emitting() {
        // テスト項目: 退室でそのルーム宛のローカル typing が破棄され、
        //             TTL 経過後の掃除でも typing-stopped が送出されない
        // given (前提条件): general に入室して入力中
        let (mut session, mut rx) = connected_session();
        session.join_room("general", Timestamp::new(1_000)).unwrap();
        session.on_input_changed("dra", Timestamp::new(1_100));
        drain(&mut rx);

        // when (操作): 退室してから TTL 経過後に掃除
        session.leave_room();
        drain(&mut rx);
        session.tick(Timestamp::new(1_100 + TYPING_TTL_MS));

        // then (期待する結果): 退室済みルーム宛の通知は一切出ない
        assert!(drain(&mut rx).is_empty());
        assert!(!session.typing.is_local_typing());
    }

    #[test]
    fn test_join_second_room_cancels_typing_in_first() {
        // テスト項目: 別ルームへの入室も前ルーム宛のローカル typing を
        //             破棄する（暗黙の退室）
        // given (前提条件): tech に入室して入力中
        let (mut session, mut rx) = connected_session();
        session.join_room("tech", Timestamp::new(1_000)).unwrap();
        session.on_input_changed("dra", Timestamp::new(1_100));
        drain(&mut rx);

        // when (操作):
        session.join_room("random", Timestamp::new(1_200)).unwrap();
        drain(&mut rx);
        session.tick(Timestamp::new(1_100 + TYPING_TTL_MS));

        // then (期待する結果): tech 宛の typing-stopped は出ない
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_delivery_failure_for_unknown_peer_ignored() {
        // テスト項目: 送信履歴の無いピアの private-message-failed は
        //             会話を作らない
        let (mut session, mut rx) = connected_session();
        drain(&mut rx);

        session.handle_event(
            InboundEvent::PrivateFailed {
                receiver_id: uid("u-ghost"),
                reason: "user offline".to_string(),
                timestamp: Timestamp::new(1_000),
            },
            Timestamp::new(1_000),
        );

        assert!(session.conversation(&uid("u-ghost")).is_none());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_cancel_clears_buffer_without_emitting() {
        // テスト項目: cancel はバッファだけをクリアし、何も送出しない
        let (mut session, mut rx) = connected_session();
        session.join_room("general", Timestamp::new(1_000)).unwrap();
        drain(&mut rx);
        session.on_input_changed("draft", Timestamp::new(1_100));
        drain(&mut rx);

        session.cancel();

        assert_eq!(session.composer_buffer(), "");
        assert!(drain(&mut rx).is_empty());
    }
}
