use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: i64,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct ActivityPayload {
    pub name: String,
    pub address: String,
}
