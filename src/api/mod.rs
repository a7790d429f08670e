//! Data access for lists and tasks.
//!
//! Everything the client knows about lists and tasks comes through `TaskApi`.
//! `http::HttpTaskApi` talks to the REST server; tests swap in an in-memory
//! implementation so view logic can run without a network.

pub mod http;
#[cfg(test)]
pub mod memory;
pub mod worker;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{List, ListDraft, Task, TaskDraft};

#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<List>>;

    async fn create_list(&self, draft: &ListDraft) -> Result<()>;

    async fn update_list(&self, list_id: &str, draft: &ListDraft) -> Result<()>;

    async fn tasks_for(&self, list_id: &str) -> Result<Vec<Task>>;

    async fn task(&self, list_id: &str, task_id: &str) -> Result<Task>;

    async fn create_task(&self, list_id: &str, draft: &TaskDraft) -> Result<()>;

    async fn update_task(&self, list_id: &str, task_id: &str, draft: &TaskDraft) -> Result<()>;

    async fn delete_task(&self, list_id: &str, task_id: &str) -> Result<()>;
}
