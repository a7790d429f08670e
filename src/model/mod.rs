use serde::{Deserialize, Deserializer, Serialize};

// ─── Domain models ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct List {
    #[serde(deserialize_with = "id_string")]
    pub id:    String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
}

/// A task as the server returns it. `limit` is kept exactly as received and
/// only parsed when something needs the instant (see `tasks::countdown`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Task {
    #[serde(deserialize_with = "id_string")]
    pub id:     String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title:  String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub detail: String,
    #[serde(default, deserialize_with = "bool_or_false")]
    pub done:   bool,
    #[serde(default, deserialize_with = "limit_or_none")]
    pub limit:  Option<String>,
}

/// Request body for create and update. `limit` is always sent, `null` when
/// the task has no due date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskDraft {
    pub title:  String,
    pub detail: String,
    pub done:   bool,
    pub limit:  Option<String>,
}

/// Request body for creating or renaming a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListDraft {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct TasksResponse {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

// ─── View state ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    Todo,
    Done,
}

impl DisplayMode {
    pub fn matches(self, task: &Task) -> bool {
        task.done == (self == DisplayMode::Done)
    }

    pub fn toggle(self) -> Self {
        match self {
            DisplayMode::Todo => DisplayMode::Done,
            DisplayMode::Done => DisplayMode::Todo,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Todo => "todo",
            DisplayMode::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(DisplayMode::Todo),
            "done" => Some(DisplayMode::Done),
            _      => None,
        }
    }
}

/// Ephemeral client-side selection. Never persisted.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ViewState {
    pub selected_list: Option<String>,
    pub mode:          DisplayMode,
}

// ─── Serde helpers ────────────────────────────────────────────────────────────

/// Servers hand out ids as either JSON strings or numbers.
fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Str(String),
        Int(i64),
        Uint(u64),
    }
    Ok(match RawId::deserialize(d)? {
        RawId::Str(s)  => s,
        RawId::Int(n)  => n.to_string(),
        RawId::Uint(n) => n.to_string(),
    })
}

fn string_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

/// An empty due-date string means no due date.
fn limit_or_none<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(d)?.filter(|s| !s.trim().is_empty()))
}

fn bool_or_false<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(d)?.unwrap_or(false))
}
