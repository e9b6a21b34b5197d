use crate::domain::TaskStatus;
use crate::error::StoreError;
use crate::store::{KvStore, Repository};
use chrono::{DateTime, Local, NaiveDate};
use std::time::Duration;
use uuid::Uuid;

/// Display refresh interval in milliseconds while a task is running
pub const REFRESH_INTERVAL_MS: u64 = 1_000;

/// Get the refresh interval
pub fn refresh_interval() -> Duration {
    Duration::from_millis(REFRESH_INTERVAL_MS)
}

/// Drives the live elapsed-time readout. At most one target is armed at a
/// time; arming another task replaces it, and a tick that finds its target
/// gone or no longer running disarms itself. Ticks are pure reads.
#[derive(Debug, Default)]
pub struct DisplayTicker {
    armed: Option<(NaiveDate, Uuid)>,
}

impl DisplayTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn armed_target(&self) -> Option<(NaiveDate, Uuid)> {
        self.armed
    }

    /// Point the ticker at the task that just started running
    pub fn arm(&mut self, date: NaiveDate, id: Uuid) {
        self.armed = Some((date, id));
    }

    /// Stop refreshing, on view teardown or when nothing is running
    pub fn disarm(&mut self) {
        self.armed = None;
    }

    /// One refresh: read the armed task and return its live elapsed
    /// seconds, closed segments plus the open one.
    pub fn tick_at<S: KvStore>(
        &mut self,
        repo: &Repository<S>,
        now: DateTime<Local>,
    ) -> Result<Option<i64>, StoreError> {
        let (date, id) = match self.armed {
            Some(target) => target,
            None => return Ok(None),
        };
        let tasks = repo.tasks_for(date)?;
        match tasks.iter().find(|t| t.id == id) {
            Some(task) if task.status == TaskStatus::InProgress => {
                Ok(Some(task.display_seconds_at(now)))
            }
            _ => {
                self.armed = None;
                Ok(None)
            }
        }
    }

    pub fn tick<S: KvStore>(&mut self, repo: &Repository<S>) -> Result<Option<i64>, StoreError> {
        self.tick_at(repo, Local::now())
    }
}
