use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::event::EventId;
use crate::models::user::UserId;

/// A saved-event marker. Existence of the row is the whole state; the
/// (user, event) pair is unique.
#[allow(dead_code)]
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bookmark {
    pub user_id: UserId,
    pub event_id: EventId,
}
