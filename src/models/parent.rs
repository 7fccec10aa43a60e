use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Parent {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Parent hydrated with the children linked through parent_children.
#[derive(Debug, Clone, Serialize)]
pub struct ParentWithChildren {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub children: Vec<ChildSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChildSummary {
    pub id: i64,
    pub name: String,
}

/// One row of the parent / parent_children / children outer join. Child columns
/// are null for a parent with no children.
#[derive(Debug, Clone, FromRow)]
pub struct ParentChildRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub c_id: Option<i64>,
    pub child_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParentPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
}
