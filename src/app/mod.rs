use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::{
    api::worker::{ApiEvent, ApiWorker, Request},
    error::{Error, Operation},
    model::{List, ListDraft, Task, TaskDraft, ViewState},
    tasks::{countdown, filter_tasks},
    theme::ThemeConfig,
    ui::draw,
};

// ─── Screens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Home,
    Edit(EditForm),
    ListEdit(ListForm),
    Help,
}

/// Title editor for a list. `list_id == None` creates a new list.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListForm {
    pub list_id: Option<String>,
    pub title:   String,
}


#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    #[default]
    Title,
    Detail,
    Status,
    Limit,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Title  => FormField::Detail,
            FormField::Detail => FormField::Status,
            FormField::Status => FormField::Limit,
            FormField::Limit  => FormField::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Title  => FormField::Limit,
            FormField::Detail => FormField::Title,
            FormField::Status => FormField::Detail,
            FormField::Limit  => FormField::Status,
        }
    }
}

/// Editor for one task. `task_id == None` means the form creates a new task.
/// `limit` holds the raw text of the due-date field.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EditForm {
    pub list_id: String,
    pub task_id: Option<String>,
    pub title:   String,
    pub detail:  String,
    pub done:    bool,
    pub limit:   String,
    pub field:   FormField,
    pub loading: bool,
}

impl EditForm {
    fn new_task(list_id: String) -> Self {
        Self { list_id, ..Default::default() }
    }

    fn existing(list_id: String, task_id: String) -> Self {
        Self { list_id, task_id: Some(task_id), loading: true, ..Default::default() }
    }

    /// Fills the fields from the server's copy. A stored due date that does
    /// not parse is shown as-is so the user can fix it.
    fn fill(&mut self, task: Task) {
        self.limit = match task.limit.as_deref() {
            Some(raw) => countdown::parse_limit(raw)
                .map(countdown::to_local_input)
                .unwrap_or_else(|_| raw.to_owned()),
            None => String::new(),
        };
        self.title   = task.title;
        self.detail  = task.detail;
        self.done    = task.done;
        self.loading = false;
    }

    fn operation(&self) -> Operation {
        if self.task_id.is_some() { Operation::UpdateTask } else { Operation::CreateTask }
    }

    fn draft(&self) -> Result<TaskDraft, Error> {
        Ok(TaskDraft {
            title:  self.title.clone(),
            detail: self.detail.clone(),
            done:   self.done,
            limit:  countdown::parse_limit_input(&self.limit)?,
        })
    }

    fn field_text(&mut self) -> Option<&mut String> {
        match self.field {
            FormField::Title  => Some(&mut self.title),
            FormField::Detail => Some(&mut self.detail),
            FormField::Limit  => Some(&mut self.limit),
            FormField::Status => None,
        }
    }
}

// ─── App state ────────────────────────────────────────────────────────────────

pub struct App {
    pub api:           ApiWorker,
    pub theme:         ThemeConfig,
    pub view:          ViewState,
    pub lists:         Vec<List>,
    /// Last-fetched collection for the selected list, unfiltered.
    pub tasks:         Vec<Task>,
    pub task_cursor:   usize,
    pub screen:        Screen,
    pub error_message: String,
    pub status:        String,
    pub running:       bool,
}

impl App {
    pub fn new(api: ApiWorker, theme: ThemeConfig) -> Self {
        Self {
            api, theme,
            view:          ViewState::default(),
            lists:         Vec::new(),
            tasks:         Vec::new(),
            task_cursor:   0,
            screen:        Screen::Home,
            error_message: String::new(),
            status:        String::new(),
            running:       true,
        }
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        filter_tasks(&self.tasks, self.view.mode)
    }

    pub async fn start(&mut self) {
        self.status = "Loading…".into();
        self.api.request(Request::LoadLists).await;
    }

    // ── TUI loop ──────────────────────────────────────────────────────────────

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend  = CrosstermBackend::new(stdout);
        let mut term = Terminal::new(backend)?;

        let result = self.event_loop(&mut term).await;

        disable_raw_mode()?;
        execute!(term.backend_mut(), LeaveAlternateScreen)?;
        term.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        term: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        self.start().await;

        let tick = std::time::Duration::from_millis(50);
        while self.running {
            term.draw(|f| draw(f, self))?;

            for ev in self.api.drain() { self.apply(ev).await; }

            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press { self.on_key(key).await; }
                }
            }
        }

        self.api.shutdown().await;
        Ok(())
    }

    // ── API events ────────────────────────────────────────────────────────────

    pub async fn apply(&mut self, ev: ApiEvent) {
        match ev {
            ApiEvent::ListsLoaded(lists) => {
                self.lists = lists;
                let still_there = self.view.selected_list.as_ref()
                    .is_some_and(|id| self.lists.iter().any(|l| &l.id == id));
                if !still_there {
                    self.view.selected_list = self.lists.first().map(|l| l.id.clone());
                }
                self.status.clear();
                self.reload_tasks().await;
            }
            ApiEvent::TasksLoaded { list_id, tasks } => {
                if self.view.selected_list.as_deref() != Some(list_id.as_str()) {
                    tracing::debug!("dropping tasks for list {list_id}, no longer selected");
                    return;
                }
                self.tasks = tasks;
                self.clamp_cursor();
                self.error_message.clear();
                self.status.clear();
            }
            ApiEvent::ListSaved => {
                if matches!(self.screen, Screen::ListEdit(_)) {
                    self.screen = Screen::Home;
                }
                self.status.clear();
                self.api.request(Request::LoadLists).await;
            }
            ApiEvent::TaskLoaded { list_id, task } => {
                if let Screen::Edit(form) = &mut self.screen {
                    if form.loading && form.list_id == list_id
                        && form.task_id.as_deref() == Some(task.id.as_str())
                    {
                        form.fill(task);
                    }
                }
            }
            ApiEvent::TaskSaved { list_id } | ApiEvent::TaskDeleted { list_id } => {
                if matches!(&self.screen, Screen::Edit(f) if f.list_id == list_id) {
                    self.screen = Screen::Home;
                }
                self.status.clear();
                self.reload_tasks().await;
            }
            ApiEvent::Failed { op, message } => {
                // An editor whose task never loaded has nothing safe to save.
                if op == Operation::FetchTask
                    && matches!(&self.screen, Screen::Edit(f) if f.loading)
                {
                    self.screen = Screen::Home;
                }
                self.status.clear();
                self.error_message = message;
            }
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    pub async fn on_key(&mut self, key: KeyEvent) {
        match self.screen {
            Screen::Home    => self.key_home(key).await,
            Screen::Edit(_) => self.key_form(key).await,
            Screen::ListEdit(_) => self.key_list_form(key).await,
            Screen::Help    => self.screen = Screen::Home,
        }
    }

    async fn key_home(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => self.screen = Screen::Help,
            KeyCode::Left  | KeyCode::Char('h') => self.shift_list(-1).await,
            KeyCode::Right | KeyCode::Char('l') => self.shift_list(1).await,
            KeyCode::Down  | KeyCode::Char('j') => {
                if self.task_cursor + 1 < self.visible_tasks().len() { self.task_cursor += 1; }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.task_cursor = self.task_cursor.saturating_sub(1);
            }
            KeyCode::Char('m') => {
                self.view.mode   = self.view.mode.toggle();
                self.task_cursor = 0;
            }
            KeyCode::Char('r') => {
                if self.view.selected_list.is_some() {
                    self.reload_tasks().await;
                } else {
                    self.api.request(Request::LoadLists).await;
                }
            }
            KeyCode::Char('n') => match self.view.selected_list.clone() {
                Some(list_id) => self.screen = Screen::Edit(EditForm::new_task(list_id)),
                None => {
                    self.error_message = Operation::CreateTask.failure_message(&Error::NoListSelected);
                }
            },
            KeyCode::Char('N') => self.screen = Screen::ListEdit(ListForm::default()),
            KeyCode::Char('e') => self.open_list_form(),
            KeyCode::Enter => self.open_selected().await,
            _ => {}
        }
    }

    async fn key_list_form(&mut self, key: KeyEvent) {
        let Screen::ListEdit(form) = &mut self.screen else { return };
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.screen = Screen::Home,
            KeyCode::Enter => self.submit_list_form().await,
            KeyCode::Char('s') if ctrl => self.submit_list_form().await,
            KeyCode::Char(c) if !ctrl => form.title.push(c),
            KeyCode::Backspace => { form.title.pop(); }
            _ => {}
        }
    }

    async fn key_form(&mut self, key: KeyEvent) {
        let Screen::Edit(form) = &mut self.screen else { return };
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => { self.screen = Screen::Home; return; }
            _ if form.loading => return,
            KeyCode::Char('s') if ctrl => { self.submit_form().await; return; }
            KeyCode::Char('d') if ctrl => { self.delete_from_form().await; return; }
            KeyCode::Tab     => form.field = form.field.next(),
            KeyCode::BackTab => form.field = form.field.prev(),
            KeyCode::Char(' ') if form.field == FormField::Status => form.done = !form.done,
            KeyCode::Enter if form.field == FormField::Detail => form.detail.push('\n'),
            KeyCode::Enter => form.field = form.field.next(),
            KeyCode::Char(c) if !ctrl => {
                if let Some(text) = form.field_text() { text.push(c); }
            }
            KeyCode::Backspace => {
                if let Some(text) = form.field_text() { text.pop(); }
            }
            _ => {}
        }
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    async fn shift_list(&mut self, delta: isize) {
        let Some(current) = self.view.selected_list.as_ref()
            .and_then(|id| self.lists.iter().position(|l| &l.id == id))
        else { return };
        let Some(next) = current.checked_add_signed(delta).filter(|&i| i < self.lists.len())
        else { return };

        self.view.selected_list = Some(self.lists[next].id.clone());
        self.tasks.clear();
        self.task_cursor = 0;
        self.reload_tasks().await;
    }

    fn open_list_form(&mut self) {
        let selected = self.view.selected_list.as_ref()
            .and_then(|id| self.lists.iter().find(|l| &l.id == id));
        match selected {
            Some(list) => {
                self.screen = Screen::ListEdit(ListForm {
                    list_id: Some(list.id.clone()),
                    title:   list.title.clone(),
                });
            }
            None => {
                self.error_message = Operation::UpdateList.failure_message(&Error::NoListSelected);
            }
        }
    }

    async fn submit_list_form(&mut self) {
        let Screen::ListEdit(form) = &self.screen else { return };
        let draft = ListDraft { title: form.title.clone() };
        let req = match form.list_id.clone() {
            Some(list_id) => Request::UpdateList { list_id, draft },
            None          => Request::CreateList { draft },
        };
        self.status = "Saving…".into();
        self.api.request(req).await;
    }

    async fn open_selected(&mut self) {
        let Some(list_id) = self.view.selected_list.clone() else { return };
        let Some(task_id) = self.visible_tasks().get(self.task_cursor).map(|t| t.id.clone())
        else { return };

        self.screen = Screen::Edit(EditForm::existing(list_id.clone(), task_id.clone()));
        self.api.request(Request::LoadTask { list_id, task_id }).await;
    }

    async fn submit_form(&mut self) {
        let Screen::Edit(form) = &self.screen else { return };
        let draft = match form.draft() {
            Ok(d)  => d,
            Err(e) => {
                self.error_message = form.operation().failure_message(&e);
                return;
            }
        };
        let list_id = form.list_id.clone();
        let req = match form.task_id.clone() {
            Some(task_id) => Request::UpdateTask { list_id, task_id, draft },
            None          => Request::CreateTask { list_id, draft },
        };
        self.status = "Saving…".into();
        self.api.request(req).await;
    }

    async fn delete_from_form(&mut self) {
        let Screen::Edit(form) = &self.screen else { return };
        let Some(task_id) = form.task_id.clone() else { return };
        let list_id = form.list_id.clone();
        self.status = "Deleting…".into();
        self.api.request(Request::DeleteTask { list_id, task_id }).await;
    }

    async fn reload_tasks(&mut self) {
        if let Some(list_id) = self.view.selected_list.clone() {
            self.api.request(Request::LoadTasks { list_id }).await;
        }
    }

    fn clamp_cursor(&mut self) {
        let n = self.visible_tasks().len();
        self.task_cursor = self.task_cursor.min(n.saturating_sub(1));
    }
}
