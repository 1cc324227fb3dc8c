//! Text rendering for task digests and the interactive today view.

use chrono::NaiveDate;

use super::model::Task;
use super::token;
use crate::channels::{Control, Reply};

pub const DONE_GLYPH: &str = "✅";
pub const OPEN_GLYPH: &str = "⭕";

pub const TODAY_HEADER: &str = "📅 Today’s Tasks:";
pub const REMINDER_HEADER: &str = "⏰ Reminder! Today’s Tasks:";
pub const NO_TASKS_TODAY: &str = "📭 No tasks for today!";

pub fn glyph(completed: bool) -> &'static str {
    if completed { DONE_GLYPH } else { OPEN_GLYPH }
}

/// `"{glyph} {title}"`, used for digest lines and button labels.
pub fn task_label(task: &Task) -> String {
    format!("{} {}", glyph(task.completed), task.title)
}

/// Header line followed by one glyph-prefixed line per task.
pub fn digest(header: &str, tasks: &[Task]) -> String {
    let mut msg = format!("{header}\n");
    for task in tasks {
        msg.push_str(&task_label(task));
        msg.push('\n');
    }
    msg
}

/// Reply to the list command for `date`.
pub fn list_view(date: NaiveDate, tasks: &[Task]) -> String {
    if tasks.is_empty() {
        format!("📭 No tasks for {date}")
    } else {
        digest(&format!("📅 Tasks for {date}:"), tasks)
    }
}

/// The reminder pushed by the scheduler, or `None` when there is nothing due.
pub fn reminder(tasks: &[Task]) -> Option<String> {
    (!tasks.is_empty()).then(|| digest(REMINDER_HEADER, tasks))
}

/// One toggle control per task, carrying the task's interaction token.
pub fn today_view(tasks: &[Task]) -> Reply {
    if tasks.is_empty() {
        return Reply::Text(NO_TASKS_TODAY.to_string());
    }
    Reply::Controls {
        text: TODAY_HEADER.to_string(),
        controls: tasks
            .iter()
            .map(|task| Control {
                label: task_label(task),
                token: token::encode(task.id),
            })
            .collect(),
    }
}
