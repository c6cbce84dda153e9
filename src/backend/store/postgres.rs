/**
 * PostgreSQL Store
 *
 * `sqlx` implementation of the store traits. The schema lives in
 * `migrations/` and is applied on connect.
 *
 * # Admitting Participants
 *
 * `admit_participant` runs in a transaction that first locks the room row
 * (`SELECT ... FOR UPDATE`). Concurrent admits to one room therefore
 * serialize, which makes the capacity check and the "append if absent" step
 * atomic. The insert still carries `ON CONFLICT (room_id, user_id)` so a
 * duplicate can never be written even outside that path.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::backend::auth::users::{NewUser, User};
use crate::backend::room::membership::AdmitOutcome;
use crate::backend::store::{CodeStore, MessageStore, RoomStore, SnapshotPage, StoreError, UserStore};
use crate::shared::message::{ChatMessage, CodeSnapshot, MessageKind};
use crate::shared::room::{Language, Participant, ParticipantStatus, Room};
use crate::shared::user::UserSummary;

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and run pending migrations
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        tracing::info!("[Store] Connecting to database...");
        let pool = PgPool::connect(database_url).await?;
        tracing::info!("[Store] Running database migrations...");
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("[Store] Database ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn participants_of(&self, room_ids: &[String]) -> Result<HashMap<String, Vec<Participant>>, StoreError> {
        let rows = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT room_id, user_id, joined_at, is_active
            FROM room_participants
            WHERE room_id = ANY($1)
            ORDER BY joined_at ASC
            "#,
        )
        .bind(room_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<String, Vec<Participant>> = HashMap::new();
        for row in rows {
            grouped.entry(row.room_id).or_default().push(Participant {
                user_id: row.user_id,
                joined_at: row.joined_at,
                status: ParticipantStatus::from(row.is_active),
            });
        }
        Ok(grouped)
    }
}

#[derive(sqlx::FromRow)]
struct RoomRow {
    room_id: String,
    name: String,
    description: String,
    creator: Uuid,
    current_code: String,
    language: String,
    is_active: bool,
    max_participants: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoomRow {
    fn into_room(self, participants: Vec<Participant>) -> Result<Room, StoreError> {
        let language = parse_language(&self.language)?;
        let max_participants = u32::try_from(self.max_participants)
            .map_err(|_| StoreError::corrupt(format!("max_participants {} out of range", self.max_participants)))?;
        Ok(Room {
            room_id: self.room_id,
            name: self.name,
            description: self.description,
            creator: self.creator,
            participants,
            current_code: self.current_code,
            language,
            is_active: self.is_active,
            max_participants,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ParticipantRow {
    room_id: String,
    user_id: Uuid,
    joined_at: DateTime<Utc>,
    is_active: bool,
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    room_id: String,
    content: String,
    created_at: DateTime<Utc>,
    sender_id: Uuid,
    sender_name: String,
    sender_email: String,
    sender_avatar: String,
}

impl From<MessageRow> for ChatMessage {
    fn from(row: MessageRow) -> Self {
        ChatMessage {
            id: row.id,
            room_id: row.room_id,
            sender: UserSummary {
                id: row.sender_id,
                name: row.sender_name,
                email: row.sender_email,
                avatar: row.sender_avatar,
            },
            content: row.content,
            kind: MessageKind::Text,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    id: Uuid,
    room_id: String,
    content: String,
    language: String,
    version: i64,
    change_description: String,
    created_at: DateTime<Utc>,
    author_id: Uuid,
    author_name: String,
    author_email: String,
    author_avatar: String,
}

impl SnapshotRow {
    fn into_snapshot(self) -> Result<CodeSnapshot, StoreError> {
        Ok(CodeSnapshot {
            id: self.id,
            room_id: self.room_id,
            content: self.content,
            language: parse_language(&self.language)?,
            updated_by: UserSummary {
                id: self.author_id,
                name: self.author_name,
                email: self.author_email,
                avatar: self.author_avatar,
            },
            version: self.version,
            change_description: self.change_description,
            created_at: self.created_at,
        })
    }
}

fn parse_language(tag: &str) -> Result<Language, StoreError> {
    tag.parse().map_err(|e: crate::shared::SharedError| StoreError::corrupt(e.detail().to_string()))
}

/// Map a unique-violation into `Conflict`, everything else into `Database`
fn conflict_or(err: sqlx::Error, message: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::conflict(message),
        _ => StoreError::Database(err),
    }
}

const ROOM_COLUMNS: &str =
    "room_id, name, description, creator, current_code, language, is_active, max_participants, created_at, updated_at";

const SNAPSHOT_SELECT: &str = r#"
    SELECT c.id, c.room_id, c.content, c.language, c.version, c.change_description, c.created_at,
           u.id AS author_id, u.name AS author_name, u.email AS author_email, u.avatar AS author_avatar
    FROM code_snapshots c
    JOIN users u ON u.id = c.updated_by
"#;

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let user = new_user.into_user();
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, avatar, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, password_hash, avatar, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, "User already exists"))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, avatar, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, avatar, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }
}

#[async_trait]
impl RoomStore for PgStore {
    async fn create_room(&self, room: Room) -> Result<Room, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO rooms (room_id, name, description, creator, current_code, language,
                               is_active, max_participants, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&room.room_id)
        .bind(&room.name)
        .bind(&room.description)
        .bind(room.creator)
        .bind(&room.current_code)
        .bind(room.language.as_str())
        .bind(room.is_active)
        .bind(room.max_participants as i32)
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_or(e, "Room already exists"))?;

        for participant in &room.participants {
            sqlx::query(
                "INSERT INTO room_participants (room_id, user_id, joined_at, is_active) VALUES ($1, $2, $3, $4)",
            )
            .bind(&room.room_id)
            .bind(participant.user_id)
            .bind(participant.joined_at)
            .bind(participant.is_active())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(room)
    }

    async fn find_room(&self, room_id: &str) -> Result<Option<Room>, StoreError> {
        let row = sqlx::query_as::<_, RoomRow>(&format!(
            "SELECT {} FROM rooms WHERE room_id = $1 AND is_active",
            ROOM_COLUMNS
        ))
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut participants = self.participants_of(&[row.room_id.clone()]).await?;
        let roster = participants.remove(&row.room_id).unwrap_or_default();
        row.into_room(roster).map(Some)
    }

    async fn rooms_for_user(&self, user_id: Uuid) -> Result<Vec<Room>, StoreError> {
        let rows = sqlx::query_as::<_, RoomRow>(&format!(
            r#"
            SELECT {} FROM rooms
            WHERE is_active
              AND room_id IN (SELECT room_id FROM room_participants WHERE user_id = $1)
            ORDER BY updated_at DESC
            "#,
            ROOM_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<String> = rows.iter().map(|r| r.room_id.clone()).collect();
        let mut participants = self.participants_of(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let roster = participants.remove(&row.room_id).unwrap_or_default();
                row.into_room(roster)
            })
            .collect()
    }

    async fn admit_participant(&self, room_id: &str, user_id: Uuid) -> Result<AdmitOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        let capacity: Option<(i32,)> =
            sqlx::query_as("SELECT max_participants FROM rooms WHERE room_id = $1 AND is_active FOR UPDATE")
                .bind(room_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((max_participants,)) = capacity else {
            return Err(StoreError::not_found("room"));
        };

        let existing: Option<(bool,)> =
            sqlx::query_as("SELECT is_active FROM room_participants WHERE room_id = $1 AND user_id = $2")
                .bind(room_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;

        let outcome = match existing {
            Some((true,)) => AdmitOutcome::AlreadyActive,
            Some((false,)) => {
                sqlx::query("UPDATE room_participants SET is_active = TRUE WHERE room_id = $1 AND user_id = $2")
                    .bind(room_id)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
                AdmitOutcome::Reactivated
            }
            None => {
                let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM room_participants WHERE room_id = $1")
                    .bind(room_id)
                    .fetch_one(&mut *tx)
                    .await?;
                if count >= i64::from(max_participants) {
                    AdmitOutcome::RoomFull
                } else {
                    sqlx::query(
                        r#"
                        INSERT INTO room_participants (room_id, user_id, joined_at, is_active)
                        VALUES ($1, $2, NOW(), TRUE)
                        ON CONFLICT (room_id, user_id) DO UPDATE SET is_active = TRUE
                        "#,
                    )
                    .bind(room_id)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
                    AdmitOutcome::Admitted
                }
            }
        };

        if matches!(outcome, AdmitOutcome::Admitted | AdmitOutcome::Reactivated) {
            sqlx::query("UPDATE rooms SET updated_at = NOW() WHERE room_id = $1")
                .bind(room_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(outcome)
    }

    async fn deactivate_participant(&self, room_id: &str, user_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE room_participants SET is_active = FALSE WHERE room_id = $1 AND user_id = $2 AND is_active")
            .bind(room_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_code(&self, room_id: &str, code: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE rooms SET current_code = $2, updated_at = NOW() WHERE room_id = $1 AND is_active")
            .bind(room_id)
            .bind(code)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("room"));
        }
        Ok(())
    }

    async fn update_language(&self, room_id: &str, language: Language) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE rooms SET language = $2, updated_at = NOW() WHERE room_id = $1 AND is_active")
            .bind(room_id)
            .bind(language.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("room"));
        }
        Ok(())
    }

    async fn deactivate_room(&self, room_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE rooms SET is_active = FALSE, updated_at = NOW() WHERE room_id = $1 AND is_active")
            .bind(room_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("room"));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for PgStore {
    async fn append_message(
        &self,
        room_id: &str,
        sender: &UserSummary,
        content: &str,
    ) -> Result<ChatMessage, StoreError> {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            room_id: room_id.to_string(),
            sender: sender.clone(),
            content: content.to_string(),
            kind: MessageKind::Text,
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO messages (id, room_id, sender_id, content, kind, created_at) VALUES ($1, $2, $3, $4, 'text', $5)",
        )
        .bind(message.id)
        .bind(&message.room_id)
        .bind(sender.id)
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;
        Ok(message)
    }

    async fn recent_messages(&self, room_id: &str, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT * FROM (
                SELECT m.id, m.room_id, m.content, m.created_at,
                       u.id AS sender_id, u.name AS sender_name, u.email AS sender_email, u.avatar AS sender_avatar
                FROM messages m
                JOIN users u ON u.id = m.sender_id
                WHERE m.room_id = $1
                ORDER BY m.created_at DESC
                LIMIT $2
            ) recent
            ORDER BY created_at ASC
            "#,
        )
        .bind(room_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ChatMessage::from).collect())
    }
}

#[async_trait]
impl CodeStore for PgStore {
    async fn save_snapshot(
        &self,
        room_id: &str,
        content: &str,
        language: Language,
        author: &UserSummary,
        change_description: &str,
    ) -> Result<CodeSnapshot, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Serializes version assignment per room
        let locked: Option<(String,)> = sqlx::query_as("SELECT room_id FROM rooms WHERE room_id = $1 AND is_active FOR UPDATE")
            .bind(room_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(StoreError::not_found("room"));
        }

        let (version,): (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) + 1 FROM code_snapshots WHERE room_id = $1")
                .bind(room_id)
                .fetch_one(&mut *tx)
                .await?;

        let snapshot = CodeSnapshot {
            id: Uuid::new_v4(),
            room_id: room_id.to_string(),
            content: content.to_string(),
            language,
            updated_by: author.clone(),
            version,
            change_description: change_description.to_string(),
            created_at: Utc::now(),
        };
        sqlx::query(
            r#"
            INSERT INTO code_snapshots (id, room_id, content, language, updated_by, version, change_description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(snapshot.id)
        .bind(&snapshot.room_id)
        .bind(&snapshot.content)
        .bind(language.as_str())
        .bind(author.id)
        .bind(version)
        .bind(&snapshot.change_description)
        .bind(snapshot.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_or(e, "Snapshot version already exists"))?;

        tx.commit().await?;
        Ok(snapshot)
    }

    async fn snapshot_history(&self, room_id: &str, page: u32, limit: u32) -> Result<SnapshotPage, StoreError> {
        let offset = i64::from(page.max(1) - 1) * i64::from(limit);
        let rows = sqlx::query_as::<_, SnapshotRow>(&format!(
            "{} WHERE c.room_id = $1 ORDER BY c.version DESC LIMIT $2 OFFSET $3",
            SNAPSHOT_SELECT
        ))
        .bind(room_id)
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM code_snapshots WHERE room_id = $1")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(SnapshotPage {
            snapshots: rows
                .into_iter()
                .map(SnapshotRow::into_snapshot)
                .collect::<Result<_, _>>()?,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn snapshot_version(&self, room_id: &str, version: i64) -> Result<Option<CodeSnapshot>, StoreError> {
        let row = sqlx::query_as::<_, SnapshotRow>(&format!(
            "{} WHERE c.room_id = $1 AND c.version = $2",
            SNAPSHOT_SELECT
        ))
        .bind(room_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await?;
        row.map(SnapshotRow::into_snapshot).transpose()
    }
}
