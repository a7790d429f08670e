pub mod countdown;

use crate::model::{DisplayMode, Task};

/// Tasks visible under `mode`, in their original order.
pub fn filter_tasks(tasks: &[Task], mode: DisplayMode) -> Vec<&Task> {
    tasks.iter().filter(|t| mode.matches(t)).collect()
}
