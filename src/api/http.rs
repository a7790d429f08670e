//! REST client for the task server.
//!
//! Every request carries `Authorization: Bearer <token>`. Non-2xx responses
//! become `Error::Status`; transport failures become `Error::Http`.

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder, Response};

use crate::api::TaskApi;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::model::{List, ListDraft, Task, TaskDraft, TasksResponse};

pub struct HttpTaskApi {
    http:     Client,
    base_url: String,
    token:    String,
}

impl HttpTaskApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("taskboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            token:    config.token.clone(),
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn lists_url(&self) -> String {
        format!("{}/lists", self.base_url)
    }

    fn list_url(&self, list_id: &str) -> String {
        format!("{}/{}", self.lists_url(), pct(list_id))
    }

    fn tasks_url(&self, list_id: &str) -> String {
        format!("{}/tasks", self.list_url(list_id))
    }

    fn task_url(&self, list_id: &str, task_id: &str) -> String {
        format!("{}/{}", self.tasks_url(list_id), pct(task_id))
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let resp = req.header(AUTHORIZATION, self.bearer()).send().await?;
        check_status(resp)
    }
}

fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Status { status: status.as_u16(), url: resp.url().to_string() });
    }
    Ok(resp)
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list_collections(&self) -> Result<Vec<List>> {
        let lists: Vec<List> = self.send(self.http.get(self.lists_url())).await?.json().await?;
        tracing::debug!("fetched {} lists", lists.len());
        Ok(lists)
    }

    async fn create_list(&self, draft: &ListDraft) -> Result<()> {
        self.send(self.http.post(self.lists_url()).json(draft)).await?;
        Ok(())
    }

    async fn update_list(&self, list_id: &str, draft: &ListDraft) -> Result<()> {
        self.send(self.http.put(self.list_url(list_id)).json(draft)).await?;
        Ok(())
    }

    async fn tasks_for(&self, list_id: &str) -> Result<Vec<Task>> {
        let body: TasksResponse = self.send(self.http.get(self.tasks_url(list_id)))
            .await?.json().await?;
        tracing::debug!("fetched {} tasks for list {list_id}", body.tasks.len());
        Ok(body.tasks)
    }

    async fn task(&self, list_id: &str, task_id: &str) -> Result<Task> {
        Ok(self.send(self.http.get(self.task_url(list_id, task_id))).await?.json().await?)
    }

    async fn create_task(&self, list_id: &str, draft: &TaskDraft) -> Result<()> {
        self.send(self.http.post(self.tasks_url(list_id)).json(draft)).await?;
        Ok(())
    }

    async fn update_task(&self, list_id: &str, task_id: &str, draft: &TaskDraft) -> Result<()> {
        self.send(self.http.put(self.task_url(list_id, task_id)).json(draft)).await?;
        Ok(())
    }

    async fn delete_task(&self, list_id: &str, task_id: &str) -> Result<()> {
        self.send(self.http.delete(self.task_url(list_id, task_id))).await?;
        Ok(())
    }
}

/// Minimal percent-encoding for URL path components.
fn pct(s: &str) -> String {
    s.bytes().map(|b| {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            (b as char).to_string()
        } else {
            format!("%{b:02X}")
        }
    }).collect()
}
