use crate::errors::TrackerError;
use crate::models::{Category, StatSheet, Task};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub task: Task,
    pub leveled_up: bool,
}

/// Builds a not-yet-completed task. The id is assigned when it is stored.
pub fn new_task(
    name: &str,
    category: Category,
    xp: Option<u32>,
    now: DateTime<Utc>,
) -> Result<Task, TrackerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackerError::Invalid("task name is required".to_string()));
    }
    let xp = match xp {
        Some(xp) if xp > 0 => xp,
        _ => return Err(TrackerError::Invalid("task xp is required".to_string())),
    };

    Ok(Task {
        id: String::new(),
        name: name.to_string(),
        category,
        xp,
        completed: false,
        created_at: now,
    })
}

/// Marks the task completed and credits its xp once. Unknown or already
/// completed tasks are left alone.
pub fn complete(tasks: &mut [Task], stats: &mut StatSheet, id: &str) -> Option<Completion> {
    let task = tasks.iter_mut().find(|task| task.id == id)?;
    if task.completed {
        return None;
    }

    task.completed = true;
    let leveled_up = stats.apply_xp(task.category, task.xp);
    Some(Completion {
        task: task.clone(),
        leveled_up,
    })
}

/// Drops the task from the log. Xp already credited stays credited.
pub fn remove(tasks: &mut Vec<Task>, id: &str) -> Option<Task> {
    let index = tasks.iter().position(|task| task.id == id)?;
    Some(tasks.remove(index))
}
