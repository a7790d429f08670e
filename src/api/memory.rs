use async_trait::async_trait;
use std::sync::Mutex;

use crate::api::TaskApi;
use crate::error::{Error, Result};
use crate::model::{List, ListDraft, Task, TaskDraft};

/// In-process stand-in for the task server.
#[derive(Default)]
pub struct MemoryTaskApi {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    lists:   Vec<List>,
    tasks:   Vec<(String, Task)>,
    next_id: u64,
}

impl MemoryTaskApi {
    pub fn with_list(self, id: &str, title: &str) -> Self {
        self.state.lock().unwrap().lists.push(List { id: id.into(), title: title.into() });
        self
    }

    pub fn with_task(self, list_id: &str, task: Task) -> Self {
        self.state.lock().unwrap().tasks.push((list_id.into(), task));
        self
    }

    pub fn lists(&self) -> Vec<List> {
        self.state.lock().unwrap().lists.clone()
    }

    pub fn tasks_in(&self, list_id: &str) -> Vec<Task> {
        self.state.lock().unwrap().tasks.iter()
            .filter(|(l, _)| l == list_id)
            .map(|(_, t)| t.clone())
            .collect()
    }

    fn not_found(path: String) -> Error {
        Error::Status { status: 404, url: path }
    }
}

#[async_trait]
impl TaskApi for MemoryTaskApi {
    async fn list_collections(&self) -> Result<Vec<List>> {
        Ok(self.lists())
    }

    async fn create_list(&self, draft: &ListDraft) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        st.next_id += 1;
        let id = format!("list-{}", st.next_id);
        st.lists.push(List { id, title: draft.title.clone() });
        Ok(())
    }

    async fn update_list(&self, list_id: &str, draft: &ListDraft) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        let list = st.lists.iter_mut()
            .find(|l| l.id == list_id)
            .ok_or_else(|| Self::not_found(format!("/lists/{list_id}")))?;
        list.title = draft.title.clone();
        Ok(())
    }

    async fn tasks_for(&self, list_id: &str) -> Result<Vec<Task>> {
        if !self.state.lock().unwrap().lists.iter().any(|l| l.id == list_id) {
            return Err(Self::not_found(format!("/lists/{list_id}/tasks")));
        }
        Ok(self.tasks_in(list_id))
    }

    async fn task(&self, list_id: &str, task_id: &str) -> Result<Task> {
        self.tasks_in(list_id).into_iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| Self::not_found(format!("/lists/{list_id}/tasks/{task_id}")))
    }

    async fn create_task(&self, list_id: &str, draft: &TaskDraft) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        st.next_id += 1;
        let task = Task {
            id:     format!("new-{}", st.next_id),
            title:  draft.title.clone(),
            detail: draft.detail.clone(),
            done:   draft.done,
            limit:  draft.limit.clone(),
        };
        st.tasks.push((list_id.to_owned(), task));
        Ok(())
    }

    async fn update_task(&self, list_id: &str, task_id: &str, draft: &TaskDraft) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        let (_, task) = st.tasks.iter_mut()
            .find(|(l, t)| l == list_id && t.id == task_id)
            .ok_or_else(|| Self::not_found(format!("/lists/{list_id}/tasks/{task_id}")))?;
        task.title  = draft.title.clone();
        task.detail = draft.detail.clone();
        task.done   = draft.done;
        task.limit  = draft.limit.clone();
        Ok(())
    }

    async fn delete_task(&self, list_id: &str, task_id: &str) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        let before = st.tasks.len();
        st.tasks.retain(|(l, t)| !(l == list_id && t.id == task_id));
        if st.tasks.len() == before {
            return Err(Self::not_found(format!("/lists/{list_id}/tasks/{task_id}")));
        }
        Ok(())
    }
}
