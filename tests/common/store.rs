//! A store wrapper that can fail or pause chosen operations
//!
//! Delegates everything to a `MemoryStore`. Tests mark operations by method
//! name to make them fail with a database error, or install a one-shot gate
//! that holds the next call, before or after it reaches the inner store,
//! until the test lets it through.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;
use uuid::Uuid;

use codecollab::backend::auth::users::{NewUser, User};
use codecollab::backend::room::membership::AdmitOutcome;
use codecollab::backend::store::{
    CodeStore, MemoryStore, MessageStore, RoomStore, SnapshotPage, StoreError, UserStore,
};
use codecollab::shared::message::{ChatMessage, CodeSnapshot};
use codecollab::shared::room::{Language, Room};
use codecollab::shared::user::UserSummary;

/// Handles for one paused call
#[derive(Clone, Default)]
pub struct Gate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl Gate {
    /// Wait until the gated call has started
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the gated call continue
    pub fn open(&self) {
        self.release.notify_one();
    }

    async fn hold(self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Stage {
    Before,
    After,
}

#[derive(Default)]
pub struct ScriptedStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<&'static str>>,
    gates: Mutex<HashMap<(&'static str, Stage), Gate>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every later call of `operation` fails
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap_or_else(PoisonError::into_inner).insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failing.lock().unwrap_or_else(PoisonError::into_inner).remove(operation);
    }

    /// Hold the next call of `operation` before it touches the inner store
    pub fn pause(&self, operation: &'static str) -> Gate {
        self.install(operation, Stage::Before)
    }

    /// Hold the next call of `operation` after its write has landed
    pub fn pause_after(&self, operation: &'static str) -> Gate {
        self.install(operation, Stage::After)
    }

    fn install(&self, operation: &'static str, stage: Stage) -> Gate {
        let gate = Gate::default();
        self.gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((operation, stage), gate.clone());
        gate
    }

    async fn checkpoint(&self, operation: &'static str, stage: Stage) {
        let gate = self
            .gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(operation, stage));
        if let Some(gate) = gate {
            gate.hold().await;
        }
    }

    async fn run<T, F>(&self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>> + Send,
    {
        self.checkpoint(operation, Stage::Before).await;
        if self.failing.lock().unwrap_or_else(PoisonError::into_inner).contains(operation) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        let result = call.await;
        self.checkpoint(operation, Stage::After).await;
        result
    }
}

#[async_trait]
impl UserStore for ScriptedStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        self.run("create_user", self.inner.create_user(new_user)).await
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.run("find_user", self.inner.find_user(id)).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.run("find_user_by_email", self.inner.find_user_by_email(email)).await
    }
}

#[async_trait]
impl RoomStore for ScriptedStore {
    async fn create_room(&self, room: Room) -> Result<Room, StoreError> {
        self.run("create_room", self.inner.create_room(room)).await
    }

    async fn find_room(&self, room_id: &str) -> Result<Option<Room>, StoreError> {
        self.run("find_room", self.inner.find_room(room_id)).await
    }

    async fn rooms_for_user(&self, user_id: Uuid) -> Result<Vec<Room>, StoreError> {
        self.run("rooms_for_user", self.inner.rooms_for_user(user_id)).await
    }

    async fn admit_participant(&self, room_id: &str, user_id: Uuid) -> Result<AdmitOutcome, StoreError> {
        self.run("admit_participant", self.inner.admit_participant(room_id, user_id)).await
    }

    async fn deactivate_participant(&self, room_id: &str, user_id: Uuid) -> Result<(), StoreError> {
        self.run("deactivate_participant", self.inner.deactivate_participant(room_id, user_id)).await
    }

    async fn update_code(&self, room_id: &str, code: &str) -> Result<(), StoreError> {
        self.run("update_code", self.inner.update_code(room_id, code)).await
    }

    async fn update_language(&self, room_id: &str, language: Language) -> Result<(), StoreError> {
        self.run("update_language", self.inner.update_language(room_id, language)).await
    }

    async fn deactivate_room(&self, room_id: &str) -> Result<(), StoreError> {
        self.run("deactivate_room", self.inner.deactivate_room(room_id)).await
    }
}

#[async_trait]
impl MessageStore for ScriptedStore {
    async fn append_message(
        &self,
        room_id: &str,
        sender: &UserSummary,
        content: &str,
    ) -> Result<ChatMessage, StoreError> {
        self.run("append_message", self.inner.append_message(room_id, sender, content)).await
    }

    async fn recent_messages(&self, room_id: &str, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        self.run("recent_messages", self.inner.recent_messages(room_id, limit)).await
    }
}

#[async_trait]
impl CodeStore for ScriptedStore {
    async fn save_snapshot(
        &self,
        room_id: &str,
        content: &str,
        language: Language,
        author: &UserSummary,
        change_description: &str,
    ) -> Result<CodeSnapshot, StoreError> {
        let call = self
            .inner
            .save_snapshot(room_id, content, language, author, change_description);
        self.run("save_snapshot", call).await
    }

    async fn snapshot_history(&self, room_id: &str, page: u32, limit: u32) -> Result<SnapshotPage, StoreError> {
        self.run("snapshot_history", self.inner.snapshot_history(room_id, page, limit)).await
    }

    async fn snapshot_version(&self, room_id: &str, version: i64) -> Result<Option<CodeSnapshot>, StoreError> {
        self.run("snapshot_version", self.inner.snapshot_version(room_id, version)).await
    }
}
