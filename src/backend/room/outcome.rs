/**
 * Handler Outcomes
 *
 * Event handlers never touch the transport. They return an `Outcome`
 * describing which broadcast group the connection should enter or leave and
 * which events go to whom; the socket loop applies it. This keeps every
 * handler testable without a live connection.
 */

use crate::shared::event::ServerEvent;

/// Who receives a dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipients {
    /// Only the triggering connection
    Sender,
    /// Every connection in the room except the triggering one
    Others(String),
    /// Every connection in the room, the triggering one included
    Room(String),
}

/// One event addressed to a set of connections
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub recipients: Recipients,
    pub event: ServerEvent,
}

/// Change to the connection's broadcast group subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupChange {
    Join(String),
    Leave(String),
}

/// Everything a handler wants the transport to do, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub group_changes: Vec<GroupChange>,
    pub dispatches: Vec<Dispatch>,
}

impl Outcome {
    /// Nothing to send
    pub fn none() -> Self {
        Self::default()
    }

    pub fn to_sender(event: ServerEvent) -> Self {
        Self::none().send(Recipients::Sender, event)
    }

    pub fn to_others(room_id: &str, event: ServerEvent) -> Self {
        Self::none().send(Recipients::Others(room_id.to_string()), event)
    }

    pub fn to_room(room_id: &str, event: ServerEvent) -> Self {
        Self::none().send(Recipients::Room(room_id.to_string()), event)
    }

    pub fn send(mut self, recipients: Recipients, event: ServerEvent) -> Self {
        self.dispatches.push(Dispatch { recipients, event });
        self
    }

    pub fn join_group(mut self, room_id: &str) -> Self {
        self.group_changes.push(GroupChange::Join(room_id.to_string()));
        self
    }

    pub fn leave_group(mut self, room_id: &str) -> Self {
        self.group_changes.push(GroupChange::Leave(room_id.to_string()));
        self
    }

    /// Append another outcome after this one
    pub fn then(mut self, next: Outcome) -> Self {
        self.group_changes.extend(next.group_changes);
        self.dispatches.extend(next.dispatches);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.group_changes.is_empty() && self.dispatches.is_empty()
    }

    /// Events addressed to the sender, directly or through a full-room fan-out
    pub fn events_for_sender(&self) -> impl Iterator<Item = &ServerEvent> {
        self.dispatches
            .iter()
            .filter(|d| matches!(d.recipients, Recipients::Sender | Recipients::Room(_)))
            .map(|d| &d.event)
    }

    /// Events other room members will receive
    pub fn events_for_others(&self) -> impl Iterator<Item = &ServerEvent> {
        self.dispatches
            .iter()
            .filter(|d| matches!(d.recipients, Recipients::Others(_) | Recipients::Room(_)))
            .map(|d| &d.event)
    }
}
