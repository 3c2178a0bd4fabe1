use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type UserId = i32;

#[allow(dead_code)]
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: UserId,
    pub nama: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
}
