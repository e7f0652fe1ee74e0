use async_trait::async_trait;
use super::todo::{Todo, TodoId, TodoPatch};

/// The remote collection of record. The list controller is its only caller.
#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    async fn list(&self) -> anyhow::Result<Vec<Todo>>;
    async fn create(&self, todo: &Todo) -> anyhow::Result<Todo>;
    async fn update(&self, id: &TodoId, patch: TodoPatch) -> anyhow::Result<Todo>;
    async fn delete(&self, id: &TodoId) -> anyhow::Result<()>;
}
