use crate::domain::{CategoryItem, LogEntry, LogKind, Task, TodoPriority, TodoTask};
use crate::error::EngineError;
use crate::store::{KvStore, Repository};
use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Front door for every mutation the notebook supports. Wraps a
/// [`Repository`] and enforces the rules individual records cannot see,
/// chiefly that at most one task across all dates is running at a time.
///
/// Reads and writes follow a strict read-modify-write discipline: each
/// operation loads a collection once, mutates it, and writes it back in a
/// single `put`, so a date key is never written twice within one call.
pub struct TimeTracker<S: KvStore> {
    repo: Repository<S>,
}

impl<S: KvStore> TimeTracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            repo: Repository::new(store),
        }
    }

    pub fn repository(&self) -> &Repository<S> {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut Repository<S> {
        &mut self.repo
    }

    pub fn into_store(self) -> S {
        self.repo.into_store()
    }

    // ----- timeline tasks -----

    pub fn tasks_for(&self, date: NaiveDate) -> Result<Vec<Task>, EngineError> {
        Ok(self.repo.tasks_for(date)?)
    }

    pub fn add_task(&mut self, task: Task) -> Result<(), EngineError> {
        let date = task.date;
        let mut tasks = self.repo.tasks_for(date)?;
        tasks.push(task);
        self.repo.put_tasks(date, &tasks)?;
        Ok(())
    }

    pub fn delete_task(&mut self, date: NaiveDate, id: Uuid) -> Result<(), EngineError> {
        let mut tasks = self.repo.tasks_for(date)?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(EngineError::TaskNotFound);
        }
        self.repo.put_tasks(date, &tasks)?;
        Ok(())
    }

    /// Begin (or resume) tracking a task. Every other running task across
    /// the scan window is paused first, one store write per affected date;
    /// demotions sharing the target's date ride along in its single write.
    pub fn start_task_at(
        &mut self,
        date: NaiveDate,
        id: Uuid,
        now: DateTime<Local>,
    ) -> Result<(), EngineError> {
        let mut tasks = self.repo.tasks_for(date)?;
        let idx = tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(EngineError::TaskNotFound)?;
        // Validate-and-mutate the local copy first; an invalid transition
        // must not leave other tasks paused.
        tasks[idx].start_at(now)?;

        let mut by_date: BTreeMap<NaiveDate, Vec<Uuid>> = BTreeMap::new();
        for (found_date, other) in self.repo.find_all_in_progress(now.date_naive())? {
            if other.id != id {
                by_date.entry(found_date).or_default().push(other.id);
            }
        }
        if !by_date.is_empty() {
            log::debug!(
                "pausing {} running task(s) before starting '{}'",
                by_date.values().map(Vec::len).sum::<usize>(),
                tasks[idx].title
            );
        }
        for (found_date, ids) in by_date {
            if found_date == date {
                for other in tasks.iter_mut().filter(|t| ids.contains(&t.id)) {
                    other.pause_at(now)?;
                }
            } else {
                let mut others = self.repo.tasks_for(found_date)?;
                for other in others.iter_mut().filter(|t| ids.contains(&t.id)) {
                    other.pause_at(now)?;
                }
                self.repo.put_tasks(found_date, &others)?;
            }
        }

        self.repo.put_tasks(date, &tasks)?;
        Ok(())
    }

    pub fn start_task(&mut self, date: NaiveDate, id: Uuid) -> Result<(), EngineError> {
        self.start_task_at(date, id, Local::now())
    }

    pub fn pause_task_at(
        &mut self,
        date: NaiveDate,
        id: Uuid,
        now: DateTime<Local>,
    ) -> Result<(), EngineError> {
        self.with_task(date, id, |task| task.pause_at(now))
    }

    pub fn pause_task(&mut self, date: NaiveDate, id: Uuid) -> Result<(), EngineError> {
        self.pause_task_at(date, id, Local::now())
    }

    pub fn complete_task_at(
        &mut self,
        date: NaiveDate,
        id: Uuid,
        now: DateTime<Local>,
    ) -> Result<(), EngineError> {
        self.with_task(date, id, |task| task.complete_at(now))
    }

    pub fn complete_task(&mut self, date: NaiveDate, id: Uuid) -> Result<(), EngineError> {
        self.complete_task_at(date, id, Local::now())
    }

    pub fn cancel_task_at(
        &mut self,
        date: NaiveDate,
        id: Uuid,
        now: DateTime<Local>,
    ) -> Result<(), EngineError> {
        self.with_task(date, id, |task| task.cancel_at(now))
    }

    pub fn cancel_task(&mut self, date: NaiveDate, id: Uuid) -> Result<(), EngineError> {
        self.cancel_task_at(date, id, Local::now())
    }

    /// Manual edit of the clock fields; recomputes the elapsed time from
    /// the calendar span when both ends are present.
    pub fn edit_task_times_at(
        &mut self,
        date: NaiveDate,
        id: Uuid,
        start: NaiveTime,
        end: Option<NaiveTime>,
        now: DateTime<Local>,
    ) -> Result<(), EngineError> {
        self.with_task(date, id, |task| {
            task.set_times(start, end, now);
            Ok(())
        })
    }

    pub fn edit_task_details_at(
        &mut self,
        date: NaiveDate,
        id: Uuid,
        title: String,
        description: Option<String>,
        category: String,
        now: DateTime<Local>,
    ) -> Result<(), EngineError> {
        self.with_task(date, id, |task| {
            task.title = title;
            task.description = description;
            task.category = category;
            task.updated_at = now;
            Ok(())
        })
    }

    /// The running task, if any. At most one exists once the engine has
    /// mediated every start.
    pub fn running_task(&self, today: NaiveDate) -> Result<Option<(NaiveDate, Task)>, EngineError> {
        Ok(self.repo.find_all_in_progress(today)?.into_iter().next())
    }

    // ----- backlog -----

    pub fn todos(&self) -> Result<Vec<TodoTask>, EngineError> {
        Ok(self.repo.todos()?)
    }

    pub fn add_todo(&mut self, todo: TodoTask) -> Result<(), EngineError> {
        let mut todos = self.repo.todos()?;
        todos.push(todo);
        self.repo.put_todos(&todos)?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update_todo_at(
        &mut self,
        id: Uuid,
        title: String,
        description: Option<String>,
        priority: TodoPriority,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        now: DateTime<Local>,
    ) -> Result<(), EngineError> {
        let mut todos = self.repo.todos()?;
        let todo = todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(EngineError::TodoNotFound)?;
        todo.set_title(title);
        todo.description = description;
        todo.priority = priority;
        todo.start_date = start_date;
        todo.end_date = end_date;
        todo.updated_at = now;
        self.repo.put_todos(&todos)?;
        Ok(())
    }

    pub fn toggle_todo_at(&mut self, id: Uuid, now: DateTime<Local>) -> Result<(), EngineError> {
        let mut todos = self.repo.todos()?;
        let todo = todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(EngineError::TodoNotFound)?;
        todo.toggle_completed_at(now)?;
        self.repo.put_todos(&todos)?;
        Ok(())
    }

    pub fn toggle_todo(&mut self, id: Uuid) -> Result<(), EngineError> {
        self.toggle_todo_at(id, Local::now())
    }

    pub fn delete_todo(&mut self, id: Uuid) -> Result<(), EngineError> {
        let mut todos = self.repo.todos()?;
        let before = todos.len();
        todos.retain(|t| t.id != id);
        if todos.len() == before {
            return Err(EngineError::TodoNotFound);
        }
        self.repo.put_todos(&todos)?;
        Ok(())
    }

    // ----- journal -----

    pub fn log(&self, date: NaiveDate, kind: LogKind) -> Result<Option<String>, EngineError> {
        Ok(self.repo.log(date, kind)?)
    }

    /// Store trimmed journal content; saving whitespace-only content
    /// deletes the slot instead.
    pub fn save_log(
        &mut self,
        date: NaiveDate,
        kind: LogKind,
        content: &str,
    ) -> Result<(), EngineError> {
        let content = content.trim();
        if content.is_empty() {
            self.repo.delete_log(date, kind)?;
        } else {
            self.repo.put_log(date, kind, content)?;
        }
        Ok(())
    }

    pub fn delete_log(&mut self, date: NaiveDate, kind: LogKind) -> Result<(), EngineError> {
        Ok(self.repo.delete_log(date, kind)?)
    }

    /// Journal entries within the scan window, newest date first, morning
    /// before evening within a date.
    pub fn logs(&self, from: NaiveDate) -> Result<Vec<LogEntry>, EngineError> {
        let mut entries = Vec::new();
        for date in Repository::<S>::recent_dates(from) {
            for kind in [LogKind::Morning, LogKind::Evening] {
                if let Some(content) = self.repo.log(date, kind)? {
                    if !content.is_empty() {
                        entries.push(LogEntry::new(date, kind, content));
                    }
                }
            }
        }
        Ok(entries)
    }

    // ----- categories -----

    pub fn categories(&self) -> Result<Vec<CategoryItem>, EngineError> {
        Ok(self.repo.categories()?)
    }

    pub fn add_category(&mut self, item: CategoryItem) -> Result<(), EngineError> {
        let mut categories = self.repo.categories()?;
        if categories.iter().any(|c| c.name == item.name) {
            return Err(EngineError::DuplicateCategory { name: item.name });
        }
        categories.push(item);
        self.repo.put_categories(&categories)?;
        Ok(())
    }

    pub fn update_category(&mut self, name: &str, updated: CategoryItem) -> Result<(), EngineError> {
        let mut categories = self.repo.categories()?;
        if updated.name != name && categories.iter().any(|c| c.name == updated.name) {
            return Err(EngineError::DuplicateCategory { name: updated.name });
        }
        let slot = categories
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or(EngineError::CategoryNotFound)?;
        *slot = updated;
        self.repo.put_categories(&categories)?;
        Ok(())
    }

    pub fn delete_category(&mut self, name: &str) -> Result<(), EngineError> {
        let mut categories = self.repo.categories()?;
        let before = categories.len();
        categories.retain(|c| c.name != name);
        if categories.len() == before {
            return Err(EngineError::CategoryNotFound);
        }
        self.repo.put_categories(&categories)?;
        Ok(())
    }

    fn with_task<F>(&mut self, date: NaiveDate, id: Uuid, apply: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut Task) -> Result<(), EngineError>,
    {
        let mut tasks = self.repo.tasks_for(date)?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(EngineError::TaskNotFound)?;
        apply(task)?;
        self.repo.put_tasks(date, &tasks)?;
        Ok(())
    }
}
