use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::domain::{
    store::TodoStore,
    todo::{Todo, TodoId, TodoPatch},
};

/// Todo store reached over the REST API:
/// `GET/POST {base}/todos/`, `PUT/DELETE {base}/todos/{id}`.
#[derive(Clone)]
pub struct HttpTodoStore {
    http: Client,
    base_url: Url,
}

impl HttpTodoStore {
    pub fn new(base_url: &Url) -> Self { Self::with_client(Client::new(), base_url) }

    pub fn with_client(http: Client, base_url: &Url) -> Self {
        Self { http, base_url: base_url.clone() }
    }

    fn collection_url(&self) -> Result<Url> { self.url_with(&["todos", ""]) }

    /// The id is opaque, so it goes in as a single escaped path segment.
    fn item_url(&self, id: &TodoId) -> Result<Url> { self.url_with(&["todos", id.as_str()]) }

    fn url_with(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("todo store url `{}` cannot take path segments", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl TodoStore for HttpTodoStore {
    async fn list(&self) -> Result<Vec<Todo>> {
        let todos: Vec<Todo> = self
            .http
            .get(self.collection_url()?)
            .send()
            .await
            .context("GET todos")?
            .error_for_status()?
            .json()
            .await
            .context("decode todo list")?;
        tracing::debug!(count = todos.len(), "fetched todos");
        Ok(todos)
    }

    async fn create(&self, todo: &Todo) -> Result<Todo> {
        let created = self
            .http
            .post(self.collection_url()?)
            .json(todo)
            .send()
            .await
            .context("POST todo")?
            .error_for_status()?
            .json()
            .await
            .context("decode created todo")?;
        Ok(created)
    }

    async fn update(&self, id: &TodoId, patch: TodoPatch) -> Result<Todo> {
        let updated = self
            .http
            .put(self.item_url(id)?)
            .json(&patch)
            .send()
            .await
            .with_context(|| format!("PUT todo {id}"))?
            .error_for_status()?
            .json()
            .await
            .context("decode updated todo")?;
        Ok(updated)
    }

    async fn delete(&self, id: &TodoId) -> Result<()> {
        self.http
            .delete(self.item_url(id)?)
            .send()
            .await
            .with_context(|| format!("DELETE todo {id}"))?
            .error_for_status()?;
        Ok(())
    }
}
