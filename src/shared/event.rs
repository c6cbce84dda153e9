/**
 * Realtime Event Protocol
 *
 * This module defines the events exchanged over a room connection. Every frame
 * is a JSON object of the form `{"event": "<name>", "data": {...}}`, in both
 * directions. Event names are snake_case, payload fields are camelCase.
 *
 * Client → server events are `ClientEvent`; server → client events are
 * `ServerEvent`. Error events are always delivered to the triggering
 * connection only and never close it.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::message::ChatMessage;
use crate::shared::room::{Language, RoomSnapshot};

/// Payload carrying only a room reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRef {
    pub room_id: String,
}

/// Full-buffer replacement sent by an editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChange {
    pub room_id: String,
    pub code: String,
}

/// Cursor location in the editor (both 1-based as reported by the editor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorMove {
    pub room_id: String,
    pub position: CursorPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub room_id: String,
    pub message: String,
}

/// Language switch request; the tag is validated server-side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageChange {
    pub room_id: String,
    pub language: String,
}

/// Opaque WebRTC signaling payload (offer, answer or ICE candidate)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub room_id: String,
    #[serde(alias = "offer", alias = "answer", alias = "candidate")]
    pub payload: serde_json::Value,
}

/// Events a client may emit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom(RoomRef),
    CodeChange(CodeChange),
    CursorPosition(CursorMove),
    SendMessage(SendMessage),
    LanguageChange(LanguageChange),
    WebrtcOffer(Signal),
    WebrtcAnswer(Signal),
    WebrtcIceCandidate(Signal),
    TypingStart(RoomRef),
    TypingStop(RoomRef),
    StartCall(RoomRef),
    EndCall(RoomRef),
    LeaveRoom(RoomRef),
}

impl ClientEvent {
    /// Decode a text frame
    pub fn from_json(text: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinRoom(_) => "join_room",
            ClientEvent::CodeChange(_) => "code_change",
            ClientEvent::CursorPosition(_) => "cursor_position",
            ClientEvent::SendMessage(_) => "send_message",
            ClientEvent::LanguageChange(_) => "language_change",
            ClientEvent::WebrtcOffer(_) => "webrtc_offer",
            ClientEvent::WebrtcAnswer(_) => "webrtc_answer",
            ClientEvent::WebrtcIceCandidate(_) => "webrtc_ice_candidate",
            ClientEvent::TypingStart(_) => "typing_start",
            ClientEvent::TypingStop(_) => "typing_stop",
            ClientEvent::StartCall(_) => "start_call",
            ClientEvent::EndCall(_) => "end_call",
            ClientEvent::LeaveRoom(_) => "leave_room",
        }
    }

    /// Room the event refers to
    pub fn room_id(&self) -> &str {
        match self {
            ClientEvent::JoinRoom(r)
            | ClientEvent::TypingStart(r)
            | ClientEvent::TypingStop(r)
            | ClientEvent::StartCall(r)
            | ClientEvent::EndCall(r)
            | ClientEvent::LeaveRoom(r) => &r.room_id,
            ClientEvent::CodeChange(c) => &c.room_id,
            ClientEvent::CursorPosition(c) => &c.room_id,
            ClientEvent::SendMessage(m) => &m.room_id,
            ClientEvent::LanguageChange(l) => &l.room_id,
            ClientEvent::WebrtcOffer(s) | ClientEvent::WebrtcAnswer(s) | ClientEvent::WebrtcIceCandidate(s) => {
                &s.room_id
            }
        }
    }
}

/// Join / leave notice sent to the rest of a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceNotice {
    pub user_id: Uuid,
    pub user_name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeUpdate {
    pub code: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub time_stamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorUpdate {
    pub position: CursorPosition,
    pub user_id: Uuid,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageUpdated {
    pub language: Language,
    pub changed_by: String,
}

/// Relayed signaling payload, untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalRelay {
    pub payload: serde_json::Value,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingNotice {
    pub user_name: String,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallNotice {
    pub user_id: Uuid,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotice {
    pub message: String,
}

/// Events the server emits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    RoomData(RoomSnapshot),
    UserJoined(PresenceNotice),
    UserLeft(PresenceNotice),
    CodeUpdate(CodeUpdate),
    CursorUpdate(CursorUpdate),
    ReceiveMessage(ChatMessage),
    LanguageUpdated(LanguageUpdated),
    WebrtcOffer(SignalRelay),
    WebrtcAnswer(SignalRelay),
    WebrtcIceCandidate(SignalRelay),
    UserTyping(TypingNotice),
    CallStarted(CallNotice),
    CallEnded(CallNotice),
    RoomFoundError(ErrorNotice),
    UserFoundError(ErrorNotice),
    Error(ErrorNotice),
}

impl ServerEvent {
    /// Create a `room_found_error` event
    pub fn room_not_found(message: impl Into<String>) -> Self {
        ServerEvent::RoomFoundError(ErrorNotice { message: message.into() })
    }

    /// Create a `user_found_error` event
    pub fn not_a_member(message: impl Into<String>) -> Self {
        ServerEvent::UserFoundError(ErrorNotice { message: message.into() })
    }

    /// Create a generic `error` event
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error(ErrorNotice { message: message.into() })
    }

    /// Encode as a text frame
    pub fn to_json(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::RoomData(_) => "room_data",
            ServerEvent::UserJoined(_) => "user_joined",
            ServerEvent::UserLeft(_) => "user_left",
            ServerEvent::CodeUpdate(_) => "code_update",
            ServerEvent::CursorUpdate(_) => "cursor_update",
            ServerEvent::ReceiveMessage(_) => "receive_message",
            ServerEvent::LanguageUpdated(_) => "language_updated",
            ServerEvent::WebrtcOffer(_) => "webrtc_offer",
            ServerEvent::WebrtcAnswer(_) => "webrtc_answer",
            ServerEvent::WebrtcIceCandidate(_) => "webrtc_ice_candidate",
            ServerEvent::UserTyping(_) => "user_typing",
            ServerEvent::CallStarted(_) => "call_started",
            ServerEvent::CallEnded(_) => "call_ended",
            ServerEvent::RoomFoundError(_) => "room_found_error",
            ServerEvent::UserFoundError(_) => "user_found_error",
            ServerEvent::Error(_) => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ServerEvent::RoomFoundError(_) | ServerEvent::UserFoundError(_) | ServerEvent::Error(_)
        )
    }
}
