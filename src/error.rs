use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed with status code {status} ({url})")]
    Status { status: u16, url: String },

    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("No list selected")]
    NoListSelected,
}

/// The user action a request belongs to. Each carries the fixed prefix shown
/// in front of the error text when the action fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchLists,
    FetchTasks,
    FetchTask,
    CreateList,
    UpdateList,
    CreateTask,
    UpdateTask,
    DeleteTask,
}

impl Operation {
    pub fn prefix(self) -> &'static str {
        match self {
            Operation::FetchLists => "リストの取得に失敗しました。",
            Operation::FetchTasks => "タスクの取得に失敗しました。",
            Operation::FetchTask  => "タスク情報の取得に失敗しました。",
            Operation::CreateList => "リストの作成に失敗しました。",
            Operation::UpdateList => "リストの更新に失敗しました。",
            Operation::CreateTask => "作成に失敗しました。",
            Operation::UpdateTask => "更新に失敗しました。",
            Operation::DeleteTask => "削除に失敗しました。",
        }
    }

    /// `prefix + error text`, the only form a failure ever reaches the screen in.
    pub fn failure_message(self, err: &Error) -> String {
        format!("{}{err}", self.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_concatenates_prefix_and_error() {
        let err = Error::Status { status: 404, url: "http://api/lists".into() };
        assert_eq!(
            Operation::DeleteTask.failure_message(&err),
            "削除に失敗しました。Request failed with status code 404 (http://api/lists)",
        );
    }

    #[test]
    fn list_operations_have_their_own_prefix() {
        assert_eq!(
            Operation::UpdateList.failure_message(&Error::NoListSelected),
            "リストの更新に失敗しました。No list selected",
        );
        assert_ne!(Operation::CreateList.prefix(), Operation::CreateTask.prefix());
    }

    #[test]
    fn invalid_timestamp_keeps_raw_input() {
        let err = Error::InvalidTimestamp("tomorrow-ish".into());
        assert_eq!(err.to_string(), "Invalid timestamp: \"tomorrow-ish\"");
    }
}
