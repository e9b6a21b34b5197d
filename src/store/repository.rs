use super::KvStore;
use crate::domain::{default_categories, CategoryItem, LogKind, Task, TaskStatus, TodoTask};
use crate::error::StoreError;
use crate::timefmt;
use chrono::{Duration, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// How many days back date-keyed scans reach, counting today as day zero
pub const SCAN_WINDOW_DAYS: i64 = 365;

const TODOS_KEY: &str = "todo_tasks";
const CATEGORIES_KEY: &str = "all_categories";

/// Typed access to the notebook's records on top of any [`KvStore`].
/// Owns the key scheme: `tasks_<date>`, `todo_tasks`, `log_<kind>_<date>`
/// and `all_categories`.
pub struct Repository<S: KvStore> {
    store: S,
}

impl<S: KvStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn task_key(date: NaiveDate) -> String {
        format!("tasks_{}", timefmt::date_key(date))
    }

    fn log_key(date: NaiveDate, kind: LogKind) -> String {
        format!("log_{}_{}", kind.key_part(), timefmt::date_key(date))
    }

    /// Timeline tasks for one calendar day, oldest first
    pub fn tasks_for(&self, date: NaiveDate) -> Result<Vec<Task>, StoreError> {
        self.get_list(&Self::task_key(date))
    }

    pub fn put_tasks(&mut self, date: NaiveDate, tasks: &[Task]) -> Result<(), StoreError> {
        self.put_list(&Self::task_key(date), tasks)
    }

    /// The whole backlog; all todos share one key
    pub fn todos(&self) -> Result<Vec<TodoTask>, StoreError> {
        self.get_list(TODOS_KEY)
    }

    pub fn put_todos(&mut self, todos: &[TodoTask]) -> Result<(), StoreError> {
        self.put_list(TODOS_KEY, todos)
    }

    /// Journal content for one date/kind slot, `None` when never written
    pub fn log(&self, date: NaiveDate, kind: LogKind) -> Result<Option<String>, StoreError> {
        match self.store.get(&Self::log_key(date, kind))? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn put_log(&mut self, date: NaiveDate, kind: LogKind, content: &str) -> Result<(), StoreError> {
        self.store
            .set(&Self::log_key(date, kind), Value::String(content.to_string()))
    }

    pub fn delete_log(&mut self, date: NaiveDate, kind: LogKind) -> Result<(), StoreError> {
        self.store.remove(&Self::log_key(date, kind))
    }

    /// Stored categories, or the built-in palette when nothing (or an empty
    /// list) was stored.
    pub fn categories(&self) -> Result<Vec<CategoryItem>, StoreError> {
        match self.store.get(CATEGORIES_KEY)? {
            Some(value) => {
                let stored: Vec<CategoryItem> = serde_json::from_value(value)?;
                if stored.is_empty() {
                    Ok(default_categories())
                } else {
                    Ok(stored)
                }
            }
            None => Ok(default_categories()),
        }
    }

    pub fn put_categories(&mut self, categories: &[CategoryItem]) -> Result<(), StoreError> {
        self.put_list(CATEGORIES_KEY, categories)
    }

    /// Every running task within the scan window, newest date first.
    /// The single-runner rule is enforced against this set, so tasks left
    /// running on earlier days are found too.
    pub fn find_all_in_progress(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Task)>, StoreError> {
        let mut found = Vec::new();
        for date in Self::recent_dates(today) {
            for task in self.tasks_for(date)? {
                if task.status == TaskStatus::InProgress {
                    found.push((date, task));
                }
            }
        }
        Ok(found)
    }

    /// The scan window as dates, `from` first, going backwards
    pub fn recent_dates(from: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        (0..SCAN_WINDOW_DAYS).map(move |offset| from - Duration::days(offset))
    }

    fn get_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        match self.store.get(key)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    fn put_list<T: Serialize>(&mut self, key: &str, items: &[T]) -> Result<(), StoreError> {
        self.store.set(key, serde_json::to_value(items)?)
    }
}
