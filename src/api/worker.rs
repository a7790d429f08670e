//! Background API worker. Each request runs as its own Tokio task and reports
//! exactly one `ApiEvent`; completions arrive in whatever order the server
//! answers.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::api::TaskApi;
use crate::error::{Operation, Result};
use crate::model::{List, ListDraft, Task, TaskDraft};

// ─── Channel types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    LoadLists,
    CreateList { draft: ListDraft },
    UpdateList { list_id: String, draft: ListDraft },
    LoadTasks  { list_id: String },
    LoadTask   { list_id: String, task_id: String },
    CreateTask { list_id: String, draft: TaskDraft },
    UpdateTask { list_id: String, task_id: String, draft: TaskDraft },
    DeleteTask { list_id: String, task_id: String },
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::LoadLists         => Operation::FetchLists,
            Request::CreateList { .. } => Operation::CreateList,
            Request::UpdateList { .. } => Operation::UpdateList,
            Request::LoadTasks  { .. } => Operation::FetchTasks,
            Request::LoadTask   { .. } => Operation::FetchTask,
            Request::CreateTask { .. } => Operation::CreateTask,
            Request::UpdateTask { .. } => Operation::UpdateTask,
            Request::DeleteTask { .. } => Operation::DeleteTask,
        }
    }
}

#[derive(Debug)]
enum Command {
    Run(Request),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiEvent {
    ListsLoaded(Vec<List>),
    ListSaved,
    TasksLoaded { list_id: String, tasks: Vec<Task> },
    TaskLoaded  { list_id: String, task: Task },
    TaskSaved   { list_id: String },
    TaskDeleted { list_id: String },
    /// `message` is already the user-facing text (prefix + error).
    Failed      { op: Operation, message: String },
}

// ─── Worker handle ────────────────────────────────────────────────────────────

pub struct ApiWorker {
    cmd_tx:   mpsc::Sender<Command>,
    event_rx: mpsc::Receiver<ApiEvent>,
}

impl ApiWorker {
    pub fn spawn(api: Arc<dyn TaskApi>) -> Self {
        let (cmd_tx,   mut cmd_rx)   = mpsc::channel::<Command>(32);
        let (event_tx,     event_rx) = mpsc::channel::<ApiEvent>(64);

        tokio::spawn(async move {
            while let Some(cmd) = cmd_rx.recv().await {
                let req = match cmd {
                    Command::Run(req) => req,
                    Command::Shutdown => break,
                };
                let api = api.clone();
                let tx  = event_tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(execute(api.as_ref(), req).await).await;
                });
            }
            tracing::info!("API worker stopped");
        });

        ApiWorker { cmd_tx, event_rx }
    }

    pub async fn request(&self, req: Request) {
        tracing::debug!("request: {req:?}");
        let _ = self.cmd_tx.send(Command::Run(req)).await;
    }

    pub async fn shutdown(&self) { let _ = self.cmd_tx.send(Command::Shutdown).await; }

    /// Everything that has completed so far, without waiting.
    pub fn drain(&mut self) -> Vec<ApiEvent> {
        let mut buf = Vec::new();
        while let Ok(ev) = self.event_rx.try_recv() { buf.push(ev); }
        buf
    }

    #[cfg(test)]
    pub async fn next_event(&mut self) -> Option<ApiEvent> {
        self.event_rx.recv().await
    }
}

// ─── Request execution ────────────────────────────────────────────────────────

async fn execute(api: &dyn TaskApi, req: Request) -> ApiEvent {
    let op = req.operation();
    let result: Result<ApiEvent> = match req {
        Request::LoadLists => api.list_collections().await.map(ApiEvent::ListsLoaded),
        Request::CreateList { draft } => api.create_list(&draft).await
            .map(|_| ApiEvent::ListSaved),
        Request::UpdateList { list_id, draft } => api.update_list(&list_id, &draft).await
            .map(|_| ApiEvent::ListSaved),
        Request::LoadTasks { list_id } => api.tasks_for(&list_id).await
            .map(|tasks| ApiEvent::TasksLoaded { list_id, tasks }),
        Request::LoadTask { list_id, task_id } => api.task(&list_id, &task_id).await
            .map(|task| ApiEvent::TaskLoaded { list_id, task }),
        Request::CreateTask { list_id, draft } => api.create_task(&list_id, &draft).await
            .map(|_| ApiEvent::TaskSaved { list_id }),
        Request::UpdateTask { list_id, task_id, draft } => {
            api.update_task(&list_id, &task_id, &draft).await
                .map(|_| ApiEvent::TaskSaved { list_id })
        }
        Request::DeleteTask { list_id, task_id } => api.delete_task(&list_id, &task_id).await
            .map(|_| ApiEvent::TaskDeleted { list_id }),
    };

    result.unwrap_or_else(|e| {
        tracing::warn!("{op:?} failed: {e}");
        ApiEvent::Failed { op, message: op.failure_message(&e) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::MemoryTaskApi;

    fn task(id: &str, done: bool) -> Task {
        Task {
            id: id.into(), title: id.into(), detail: String::new(), done, limit: None,
        }
    }

    fn worker(api: MemoryTaskApi) -> (ApiWorker, Arc<MemoryTaskApi>) {
        let api = Arc::new(api);
        (ApiWorker::spawn(api.clone()), api)
    }

    #[tokio::test]
    async fn loads_lists_and_tasks() {
        let (mut w, _) = worker(MemoryTaskApi::default()
            .with_list("1", "home")
            .with_task("1", task("a", false)));

        w.request(Request::LoadLists).await;
        match w.next_event().await.unwrap() {
            ApiEvent::ListsLoaded(lists) => assert_eq!(lists[0].title, "home"),
            other => panic!("unexpected {other:?}"),
        }

        w.request(Request::LoadTasks { list_id: "1".into() }).await;
        assert_eq!(
            w.next_event().await.unwrap(),
            ApiEvent::TasksLoaded { list_id: "1".into(), tasks: vec![task("a", false)] },
        );
    }

    #[tokio::test]
    async fn failures_carry_the_operation_prefix() {
        let (mut w, _) = worker(MemoryTaskApi::default().with_list("1", "home"));

        w.request(Request::LoadTask { list_id: "1".into(), task_id: "nope".into() }).await;
        match w.next_event().await.unwrap() {
            ApiEvent::Failed { op, message } => {
                assert_eq!(op, Operation::FetchTask);
                assert!(message.starts_with("タスク情報の取得に失敗しました。"), "{message}");
                assert!(message.contains("404"), "{message}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_and_delete_reach_the_api() {
        let (mut w, api) = worker(MemoryTaskApi::default()
            .with_list("1", "home")
            .with_task("1", task("a", false)));

        let draft = TaskDraft { title: "renamed".into(), done: true, ..Default::default() };
        w.request(Request::UpdateTask { list_id: "1".into(), task_id: "a".into(), draft }).await;
        assert_eq!(w.next_event().await.unwrap(), ApiEvent::TaskSaved { list_id: "1".into() });
        assert_eq!(api.tasks_in("1")[0].title, "renamed");
        assert!(api.tasks_in("1")[0].done);

        w.request(Request::DeleteTask { list_id: "1".into(), task_id: "a".into() }).await;
        assert_eq!(w.next_event().await.unwrap(), ApiEvent::TaskDeleted { list_id: "1".into() });
        assert!(api.tasks_in("1").is_empty());
    }

    #[tokio::test]
    async fn creating_and_renaming_lists() {
        let (mut w, api) = worker(MemoryTaskApi::default().with_list("1", "home"));

        w.request(Request::CreateList { draft: ListDraft { title: "work".into() } }).await;
        assert_eq!(w.next_event().await.unwrap(), ApiEvent::ListSaved);

        let draft = ListDraft { title: "house".into() };
        w.request(Request::UpdateList { list_id: "1".into(), draft }).await;
        assert_eq!(w.next_event().await.unwrap(), ApiEvent::ListSaved);

        let titles: Vec<String> = api.lists().into_iter().map(|l| l.title).collect();
        assert_eq!(titles, ["house", "work"]);

        let draft = ListDraft { title: "x".into() };
        w.request(Request::UpdateList { list_id: "nope".into(), draft }).await;
        match w.next_event().await.unwrap() {
            ApiEvent::Failed { op, message } => {
                assert_eq!(op, Operation::UpdateList);
                assert!(message.starts_with("リストの更新に失敗しました。"), "{message}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn shutdown_stops_the_worker() {
        let (mut w, _) = worker(MemoryTaskApi::default());
        w.shutdown().await;
        w.request(Request::LoadLists).await;
        assert_eq!(w.next_event().await, None);
    }
}
