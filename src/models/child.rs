use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::activity::Activity;
use crate::models::parent::Parent;

/// Child with its full relation graph: at most one parent (the association
/// table allows more, the write layer does not) and any number of activities.
#[derive(Debug, Clone, Serialize)]
pub struct Child {
    pub id: i64,
    pub name: String,
    pub parent: Option<Parent>,
    pub activities: Vec<Activity>,
}

/// One row of the child / parent / activity outer join. Child columns repeat for
/// every (parent, activity) combination; relation columns are null on outer
/// join misses.
#[derive(Debug, Clone, FromRow)]
pub struct ChildJoinRow {
    pub id: i64,
    pub name: String,
    pub p_id: Option<i64>,
    pub parent_name: Option<String>,
    pub parent_email: Option<String>,
    pub parent_phone: Option<String>,
    pub a_id: Option<i64>,
    pub activity_name: Option<String>,
    pub activity_address: Option<String>,
}

impl ChildJoinRow {
    /// The row's parent columns as an entity, `None` when the join missed.
    pub fn parent(&self) -> Option<Parent> {
        self.p_id.map(|id| Parent {
            id,
            name: self.parent_name.clone().unwrap_or_default(),
            email: self.parent_email.clone().unwrap_or_default(),
            phone: self.parent_phone.clone().unwrap_or_default(),
        })
    }

    /// The row's activity columns as an entity, `None` when the join missed.
    pub fn activity(&self) -> Option<Activity> {
        self.a_id.map(|id| Activity {
            id,
            name: self.activity_name.clone().unwrap_or_default(),
            address: self.activity_address.clone().unwrap_or_default(),
        })
    }
}

/// Create/update payload. Update has replace-all semantics: the stored
/// parent and activity sets end up exactly as supplied here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildPayload {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub activity_ids: Vec<i64>,
}
