use super::enums::TaskStatus;
use crate::error::EngineError;
use crate::timefmt;
use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One contiguous tracked interval of a task.
/// A segment is closed once `ended_at`/`duration_seconds` are populated;
/// the open segment (if any) is represented by `Task::started_at` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSegment {
    /// When the interval began
    pub started_at: DateTime<Local>,
    /// When the interval ended
    #[serde(default)]
    pub ended_at: Option<DateTime<Local>>,
    /// Length of the interval in whole seconds
    #[serde(default)]
    pub duration_seconds: Option<i64>,
}

impl TimeSegment {
    pub fn is_closed(&self) -> bool {
        self.ended_at.is_some()
    }
}

/// A date-scoped, timed unit of work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique ID for internal references
    pub id: Uuid,
    /// Task title
    pub title: String,
    /// Optional free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Category name used for grouping and stats
    pub category: String,
    /// Current lifecycle status
    pub status: TaskStatus,
    /// The calendar day this task belongs to; it never moves across days
    pub date: NaiveDate,
    /// Planned or actual start-of-day clock time
    pub start_time: NaiveTime,
    /// End-of-day clock time, set on completion or by manual edit
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    /// Start of the currently open segment; `Some` only while InProgress
    #[serde(default)]
    pub started_at: Option<DateTime<Local>>,
    /// Accumulated tracked seconds across closed segments
    #[serde(default)]
    pub elapsed_seconds: i64,
    /// Cached human-readable rendering of the elapsed time
    #[serde(default)]
    pub duration: Option<String>,
    /// Closed tracked intervals, oldest first
    #[serde(default)]
    pub time_segments: Vec<TimeSegment>,
    /// When the task was created
    pub created_at: DateTime<Local>,
    /// When the task was last mutated
    pub updated_at: DateTime<Local>,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> Self {
        let now = Local::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            category: category.into(),
            status: TaskStatus::Pending,
            date,
            start_time,
            end_time: None,
            started_at: None,
            elapsed_seconds: 0,
            duration: None,
            time_segments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of all closed segment durations
    pub fn closed_seconds(&self) -> i64 {
        self.time_segments
            .iter()
            .map(|seg| seg.duration_seconds.unwrap_or(0))
            .sum()
    }

    /// Begin (or resume) tracking. Valid only from Pending or Paused; the
    /// caller is responsible for pausing any other running task first.
    pub fn start_at(&mut self, now: DateTime<Local>) -> Result<(), EngineError> {
        match self.status {
            TaskStatus::Pending | TaskStatus::Paused => {
                self.status = TaskStatus::InProgress;
                self.started_at = Some(now);
                self.updated_at = now;
                Ok(())
            }
            from => Err(EngineError::InvalidTransition {
                from,
                action: "start",
            }),
        }
    }

    /// Stop tracking without finishing. Valid only from InProgress.
    pub fn pause_at(&mut self, now: DateTime<Local>) -> Result<(), EngineError> {
        match self.status {
            TaskStatus::InProgress => {
                self.close_open_segment(now);
                self.status = TaskStatus::Paused;
                self.updated_at = now;
                Ok(())
            }
            from => Err(EngineError::InvalidTransition {
                from,
                action: "pause",
            }),
        }
    }

    /// Finish the task. Valid from InProgress or Paused, or from Pending
    /// when no segments were ever tracked (manual start/end times only).
    pub fn complete_at(&mut self, now: DateTime<Local>) -> Result<(), EngineError> {
        match self.status {
            TaskStatus::InProgress => self.close_open_segment(now),
            TaskStatus::Paused => {}
            TaskStatus::Pending if self.time_segments.is_empty() => {}
            from => {
                return Err(EngineError::InvalidTransition {
                    from,
                    action: "complete",
                })
            }
        }

        if self.time_segments.is_empty() {
            // Manual fallback: derive the span from the clock fields, with
            // an end at or before the start rolling to the next day.
            let end = self.end_time.unwrap_or_else(|| now.time());
            self.end_time = Some(end);
            self.elapsed_seconds = timefmt::span_seconds(self.date, self.start_time, end);
        } else {
            self.elapsed_seconds = self.closed_seconds();
            if let Some(end) = self.time_segments.iter().rev().find_map(|seg| seg.ended_at) {
                self.end_time = Some(end.time());
            }
        }

        self.duration = Some(timefmt::format_seconds(self.elapsed_seconds));
        self.status = TaskStatus::Completed;
        self.updated_at = now;
        Ok(())
    }

    /// Abandon the task. Valid from Pending, InProgress or Paused.
    pub fn cancel_at(&mut self, now: DateTime<Local>) -> Result<(), EngineError> {
        match self.status {
            TaskStatus::InProgress => self.close_open_segment(now),
            TaskStatus::Pending | TaskStatus::Paused => {}
            from => {
                return Err(EngineError::InvalidTransition {
                    from,
                    action: "cancel",
                })
            }
        }
        self.status = TaskStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    /// Live elapsed seconds for display: closed segments plus the open one.
    /// Pure read; never touches storage.
    pub fn display_seconds_at(&self, now: DateTime<Local>) -> i64 {
        let open = self
            .started_at
            .map(|started| (now - started).num_seconds().max(0))
            .unwrap_or(0);
        self.closed_seconds() + open
    }

    /// Overwrite the clock fields from a manual edit. When both ends are
    /// present the elapsed time is recomputed from the calendar span.
    pub fn set_times(&mut self, start: NaiveTime, end: Option<NaiveTime>, now: DateTime<Local>) {
        self.start_time = start;
        self.end_time = end;
        if let Some(end) = end {
            self.elapsed_seconds = timefmt::span_seconds(self.date, start, end);
            self.duration = Some(timefmt::format_seconds(self.elapsed_seconds));
        }
        self.updated_at = now;
    }

    /// Close the open segment at `now` and refresh the elapsed counter.
    /// Tolerates a missing open segment (imported running tasks carry none).
    fn close_open_segment(&mut self, now: DateTime<Local>) {
        if let Some(started) = self.started_at.take() {
            let secs = (now - started).num_seconds().max(0);
            self.time_segments.push(TimeSegment {
                started_at: started,
                ended_at: Some(now),
                duration_seconds: Some(secs),
            });
        }
        self.elapsed_seconds = self.closed_seconds();
    }
}
