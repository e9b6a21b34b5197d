use super::enums::{TaskStatus, TodoPriority};
use crate::error::EngineError;
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A backlog entry: dated loosely, never timed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoTask {
    /// Unique ID for internal references
    pub id: Uuid,
    /// Todo title
    pub title: String,
    /// Optional free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Always equal to `title`; the backlog keeps this denormalized copy
    /// so todos group like timeline tasks do
    pub category: String,
    /// Urgency/importance quadrant
    pub priority: TodoPriority,
    /// Either Pending or Completed; the timed states do not apply here
    pub status: TaskStatus,
    /// Optional planned start date
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Optional planned end date
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// When the todo was marked done
    #[serde(default)]
    pub completed_at: Option<DateTime<Local>>,
    /// When the todo was created
    pub created_at: DateTime<Local>,
    /// When the todo was last mutated
    pub updated_at: DateTime<Local>,
}

impl TodoTask {
    pub fn new(title: impl Into<String>, priority: TodoPriority) -> Self {
        let now = Local::now();
        let title = title.into();
        Self {
            id: Uuid::new_v4(),
            category: title.clone(),
            title,
            description: None,
            priority,
            status: TaskStatus::Pending,
            start_date: None,
            end_date: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Rename the todo, keeping the denormalized category copy in sync
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.category = self.title.clone();
    }

    /// Flip between Pending and Completed, stamping or clearing
    /// `completed_at` to match.
    pub fn toggle_completed_at(&mut self, now: DateTime<Local>) -> Result<(), EngineError> {
        match self.status {
            TaskStatus::Pending => {
                self.status = TaskStatus::Completed;
                self.completed_at = Some(now);
            }
            TaskStatus::Completed => {
                self.status = TaskStatus::Pending;
                self.completed_at = None;
            }
            from => {
                return Err(EngineError::InvalidTransition {
                    from,
                    action: "toggle",
                })
            }
        }
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_todo_is_pending() {
        let todo = TodoTask::new("整理周报", TodoPriority::ImportantNotUrgent);
        assert_eq!(todo.status, TaskStatus::Pending);
        assert!(!todo.is_completed());
        assert!(todo.completed_at.is_none());
    }

    #[test]
    fn test_category_mirrors_title() {
        let mut todo = TodoTask::new("整理周报", TodoPriority::ImportantNotUrgent);
        assert_eq!(todo.category, "整理周报");

        todo.set_title("整理月报");
        assert_eq!(todo.category, "整理月报");
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut todo = TodoTask::new("整理周报", TodoPriority::UrgentImportant);
        let now = Local::now();

        todo.toggle_completed_at(now).unwrap();
        assert!(todo.is_completed());
        assert_eq!(todo.completed_at, Some(now));

        todo.toggle_completed_at(now).unwrap();
        assert_eq!(todo.status, TaskStatus::Pending);
        assert!(todo.completed_at.is_none());
    }

    #[test]
    fn test_toggle_rejects_timed_states() {
        let mut todo = TodoTask::new("整理周报", TodoPriority::UrgentImportant);
        todo.status = TaskStatus::InProgress;
        assert!(matches!(
            todo.toggle_completed_at(Local::now()),
            Err(EngineError::InvalidTransition { .. })
        ));
    }
}
