//! Interactive CLI loop.
//!
//! rustyline runs on a dedicated thread feeding lines into a channel; the
//! async loop selects over user lines, inbound transport events and the
//! periodic typing sweep. Commands:
//!
//! ```not_rust
//! /join <room>   join a room (implicitly leaving the current one)
//! /leave         leave the current room
//! /dm <peer>     open the direct conversation with an online peer
//! /users         list online peers
//! /quit          disconnect and exit
//! ```
//!
//! Any other input is sent to the active context.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use aizuchi_shared::time::get_unix_timestamp_millis;

use crate::connection::{ChatClient, ClientError};
use crate::domain::{MessageKind, Timestamp};
use crate::infrastructure::LogNotificationSink;
use crate::session::event::InboundEvent;
use crate::session::ChatSession;

/// Interval between typing-indicator sweeps.
const SWEEP_INTERVAL: Duration = Duration::from_millis(500);

/// Runtime configuration for the CLI client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub user_id: String,
    pub username: String,
}

fn now() -> Timestamp {
    Timestamp::new(get_unix_timestamp_millis())
}

/// Run the interactive client until `/quit` or the connection closes.
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let mut client = ChatClient::new(config.server_url, Arc::new(LogNotificationSink));
    if !client.connect(&config.user_id, &config.username).await? {
        tracing::error!("a user id and username are required to connect");
        return Ok(());
    }
    println!(
        "Connected as {}. Type /join <room> to enter a room, /quit to exit.",
        config.username
    );

    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || read_lines(line_tx));

    let mut sweep = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        tokio::select! {
            maybe_line = line_rx.recv() => {
                let Some(line) = maybe_line else { break };
                if !handle_line(&mut client, &line) {
                    break;
                }
            }
            maybe_event = client.recv() => {
                match maybe_event {
                    Some(event) => {
                        if let Some(session) = client.session_mut() {
                            render_event(&event, session);
                            session.handle_event(event, now());
                        }
                    }
                    None => {
                        tracing::warn!("connection closed");
                        break;
                    }
                }
            }
            _ = sweep.tick() => {
                if let Some(session) = client.session_mut() {
                    session.tick(now());
                }
            }
        }
    }

    client.disconnect().await;
    Ok(())
}

fn read_lines(line_tx: mpsc::UnboundedSender<String>) {
    let mut editor = match rustyline::DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            tracing::error!("failed to initialize line editor: {e}");
            return;
        }
    };
    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let _ = editor.add_history_entry(&line);
                if line_tx.send(line).is_err() {
                    break;
                }
            }
            // Ctrl-C / Ctrl-D end the input stream
            Err(_) => break,
        }
    }
}

/// Handle one line of input. Returns false when the client should exit.
fn handle_line(client: &mut ChatClient, line: &str) -> bool {
    let trimmed = line.trim();
    let Some(session) = client.session_mut() else {
        return false;
    };

    if let Some(room) = trimmed.strip_prefix("/join ") {
        if let Err(e) = session.join_room(room, now()) {
            tracing::warn!("cannot join room: {e}");
        }
        return true;
    }
    match trimmed {
        "/leave" => {
            session.leave_room();
            return true;
        }
        "/users" => {
            print_peers(session);
            return true;
        }
        "/quit" => return false,
        _ => {}
    }
    if let Some(target) = trimmed.strip_prefix("/dm ") {
        match session.find_peer(target.trim()) {
            Some(peer) => {
                let peer_id = peer.peer_id.clone();
                let username = peer.username.clone();
                session.select_peer(peer_id);
                println!("-- direct conversation with {username} --");
                print_active_conversation(session);
            }
            None => tracing::warn!("no online peer named '{}'", target.trim()),
        }
        return true;
    }
    if trimmed.starts_with('/') {
        tracing::warn!("unknown command: {trimmed}");
        return true;
    }

    session.on_input_changed(line, now());
    if let Err(e) = session.submit(now()) {
        tracing::debug!("nothing sent: {e}");
    }
    true
}

fn print_peers(session: &ChatSession) {
    if session.peers().is_empty() {
        println!("(no one else is online)");
        return;
    }
    for peer in session.peers() {
        let unread = if session.unread_peers().contains(&&peer.peer_id) {
            " [unread]"
        } else {
            ""
        };
        println!("  {} ({}){}", peer.username, peer.peer_id, unread);
    }
}

fn print_active_conversation(session: &ChatSession) {
    use crate::domain::ActiveContext;
    if let Some(ActiveContext::DirectMessage(peer_id)) = session.active_context() {
        if let Some(conversation) = session.conversation(peer_id) {
            for message in &conversation.messages {
                match message.kind {
                    MessageKind::System => println!("  * {}", message.text),
                    MessageKind::Message => println!("  {}: {}", message.author, message.text),
                }
            }
        }
    }
}

fn render_event(event: &InboundEvent, session: &ChatSession) {
    let in_room = |room| session.joined_room() == Some(room);
    match event {
        InboundEvent::RoomMessage {
            room,
            sender_name,
            content,
            ..
        } if in_room(room) => println!("{sender_name}: {content}"),
        InboundEvent::PrivateMessage {
            sender_name,
            content,
            ..
        } => println!("[dm] {sender_name}: {content}"),
        InboundEvent::PrivateFailed { reason, .. } => {
            println!("* Message could not be delivered: {reason}");
        }
        InboundEvent::UserJoined { username, room, .. } if in_room(room) => {
            println!("* {username} has joined the room");
        }
        InboundEvent::UserLeft { username, room, .. } if in_room(room) => {
            println!("* {username} has left the room");
        }
        _ => {}
    }
}
