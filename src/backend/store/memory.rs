/**
 * In-Memory Store
 *
 * Process-local implementation of every store trait. Used when no database is
 * configured and by the test suites. All tables sit behind one `RwLock`, so
 * each trait method is a single critical section; in particular the
 * admit-or-reactivate check and append happen under one write lock.
 */

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::auth::users::{NewUser, User};
use crate::backend::room::membership::{admit_in_place, deactivate_in_place, AdmitOutcome};
use crate::backend::store::{CodeStore, MessageStore, RoomStore, SnapshotPage, StoreError, UserStore};
use crate::shared::message::{ChatMessage, CodeSnapshot, MessageKind};
use crate::shared::room::{Language, Room};
use crate::shared::user::UserSummary;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    rooms: HashMap<String, Room>,
    /// Per room, creation order
    messages: HashMap<String, Vec<ChatMessage>>,
    /// Per room, ascending version
    snapshots: HashMap<String, Vec<CodeSnapshot>>,
}

impl Tables {
    fn active_room_mut(&mut self, room_id: &str) -> Result<&mut Room, StoreError> {
        self.rooms
            .get_mut(room_id)
            .filter(|room| room.is_active)
            .ok_or_else(|| StoreError::not_found("room"))
    }
}

/// Store that keeps everything in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::conflict("User already exists"));
        }
        let user = new_user.into_user();
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn create_room(&self, room: Room) -> Result<Room, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.rooms.contains_key(&room.room_id) {
            return Err(StoreError::conflict(format!("Room {} already exists", room.room_id)));
        }
        tables.rooms.insert(room.room_id.clone(), room.clone());
        Ok(room)
    }

    async fn find_room(&self, room_id: &str) -> Result<Option<Room>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .rooms
            .get(room_id)
            .filter(|room| room.is_active)
            .cloned())
    }

    async fn rooms_for_user(&self, user_id: Uuid) -> Result<Vec<Room>, StoreError> {
        let tables = self.tables.read().await;
        let mut rooms: Vec<Room> = tables
            .rooms
            .values()
            .filter(|room| room.is_active && room.participant(user_id).is_some())
            .cloned()
            .collect();
        rooms.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rooms)
    }

    async fn admit_participant(&self, room_id: &str, user_id: Uuid) -> Result<AdmitOutcome, StoreError> {
        let mut tables = self.tables.write().await;
        let room = tables.active_room_mut(room_id)?;
        Ok(admit_in_place(room, user_id, Utc::now()))
    }

    async fn deactivate_participant(&self, room_id: &str, user_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(room) = tables.rooms.get_mut(room_id) {
            deactivate_in_place(room, user_id, Utc::now());
        }
        Ok(())
    }

    async fn update_code(&self, room_id: &str, code: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let room = tables.active_room_mut(room_id)?;
        room.current_code = code.to_string();
        room.updated_at = Utc::now();
        Ok(())
    }

    async fn update_language(&self, room_id: &str, language: Language) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let room = tables.active_room_mut(room_id)?;
        room.language = language;
        room.updated_at = Utc::now();
        Ok(())
    }

    async fn deactivate_room(&self, room_id: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let room = tables.active_room_mut(room_id)?;
        room.is_active = false;
        room.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn append_message(
        &self,
        room_id: &str,
        sender: &UserSummary,
        content: &str,
    ) -> Result<ChatMessage, StoreError> {
        let mut tables = self.tables.write().await;
        tables.active_room_mut(room_id)?;
        let message = ChatMessage {
            id: Uuid::new_v4(),
            room_id: room_id.to_string(),
            sender: sender.clone(),
            content: content.to_string(),
            kind: MessageKind::Text,
            created_at: Utc::now(),
        };
        tables
            .messages
            .entry(room_id.to_string())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn recent_messages(&self, room_id: &str, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        let tables = self.tables.read().await;
        let log = tables.messages.get(room_id).map(Vec::as_slice).unwrap_or_default();
        let skip = log.len().saturating_sub(limit);
        Ok(log[skip..].to_vec())
    }
}

#[async_trait]
impl CodeStore for MemoryStore {
    async fn save_snapshot(
        &self,
        room_id: &str,
        content: &str,
        language: Language,
        author: &UserSummary,
        change_description: &str,
    ) -> Result<CodeSnapshot, StoreError> {
        let mut tables = self.tables.write().await;
        tables.active_room_mut(room_id)?;
        let history = tables.snapshots.entry(room_id.to_string()).or_default();
        let snapshot = CodeSnapshot {
            id: Uuid::new_v4(),
            room_id: room_id.to_string(),
            content: content.to_string(),
            language,
            updated_by: author.clone(),
            version: history.last().map_or(1, |last| last.version + 1),
            change_description: change_description.to_string(),
            created_at: Utc::now(),
        };
        history.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn snapshot_history(&self, room_id: &str, page: u32, limit: u32) -> Result<SnapshotPage, StoreError> {
        let tables = self.tables.read().await;
        let history = tables.snapshots.get(room_id).map(Vec::as_slice).unwrap_or_default();
        let offset = (page.max(1) as usize - 1) * limit as usize;
        Ok(SnapshotPage {
            snapshots: history.iter().rev().skip(offset).take(limit as usize).cloned().collect(),
            total: history.len() as u64,
        })
    }

    async fn snapshot_version(&self, room_id: &str, version: i64) -> Result<Option<CodeSnapshot>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .snapshots
            .get(room_id)
            .and_then(|history| history.iter().find(|s| s.version == version))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::room::DEFAULT_CODE;
    use crate::shared::user::DEFAULT_AVATAR;
    use pretty_assertions::assert_eq;

    fn room(room_id: &str) -> Room {
        let now = Utc::now();
        Room {
            room_id: room_id.to_string(),
            name: "Pairing".to_string(),
            description: String::new(),
            creator: Uuid::new_v4(),
            participants: Vec::new(),
            current_code: DEFAULT_CODE.to_string(),
            language: Language::Javascript,
            is_active: true,
            max_participants: 10,
            created_at: now,
            updated_at: now,
        }
    }

    fn author() -> UserSummary {
        UserSummary {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            avatar: DEFAULT_AVATAR.to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let new_user = NewUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "x".to_string(),
        };
        store.create_user(new_user.clone()).await.unwrap();
        let err = store.create_user(new_user).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_soft_deleted_room_is_invisible() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store.create_room(room("r1")).await.unwrap();
        store.admit_participant("r1", user).await.unwrap();

        store.deactivate_room("r1").await.unwrap();

        assert!(store.find_room("r1").await.unwrap().is_none());
        assert!(store.rooms_for_user(user).await.unwrap().is_empty());
        let err = store.admit_participant("r1", user).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_recent_messages_keeps_creation_order() {
        let store = MemoryStore::new();
        store.create_room(room("r1")).await.unwrap();
        let sender = author();
        for text in ["one", "two", "three"] {
            store.append_message("r1", &sender, text).await.unwrap();
        }

        let last_two: Vec<_> = store
            .recent_messages("r1", 2)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(last_two, vec!["two".to_string(), "three".to_string()]);
        assert!(store.recent_messages("other", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_versions_and_pages() {
        let store = MemoryStore::new();
        store.create_room(room("r1")).await.unwrap();
        let author = author();
        for n in 1..=5 {
            let saved = store
                .save_snapshot("r1", &format!("v{}", n), Language::Python, &author, "Code Updated")
                .await
                .unwrap();
            assert_eq!(saved.version, n);
        }

        let page = store.snapshot_history("r1", 1, 2).await.unwrap();
        assert_eq!(page.total, 5);
        let versions: Vec<_> = page.snapshots.iter().map(|s| s.version).collect();
        assert_eq!(versions, vec![5, 4]);

        let last_page = store.snapshot_history("r1", 3, 2).await.unwrap();
        assert_eq!(last_page.snapshots.len(), 1);
        assert_eq!(last_page.snapshots[0].version, 1);

        let third = store.snapshot_version("r1", 3).await.unwrap().unwrap();
        assert_eq!(third.content, "v3");
        assert!(store.snapshot_version("r1", 9).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_admits_never_duplicate() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.create_room(room("r1")).await.unwrap();
        let user = Uuid::new_v4();

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.admit_participant("r1", user).await })
            })
            .collect();
        let mut admitted = 0;
        for task in tasks {
            if task.await.unwrap().unwrap() == AdmitOutcome::Admitted {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 1);
        let room = store.find_room("r1").await.unwrap().unwrap();
        assert_eq!(room.participants.len(), 1);
    }
}
