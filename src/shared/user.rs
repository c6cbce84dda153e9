/**
 * Public User Profile
 *
 * The user fields that are safe to hand to other clients: embedded in chat
 * messages, code snapshots and auth responses. Never carries the password hash.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Avatar assigned to users that never set one
pub const DEFAULT_AVATAR: &str = "https://ui-avatars.com/api/?name=User&background=random";

/// User profile without sensitive data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
}
