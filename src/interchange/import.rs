use super::parser::{RawRecord, Scanner};
use crate::domain::{CategoryItem, LogKind, Task, TaskStatus, TodoPriority, TodoTask};
use crate::store::{KvStore, Repository};
use crate::timefmt;
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Head line of a numbered record: `N. [tag] title - description`.
/// The bracketed tag is the category for timeline tasks and the priority
/// label for backlog tasks; the description is optional.
static FIELDS_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+\.\s*\[([^\]]+)\]\s*(.+?)(?:\s*-\s*(.+))?$").expect("record fields regex")
});
static CATEGORY_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s*\[([^\]]+)\]\s*(.+)$").expect("category line regex"));

static STATUS_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"状态:\s*([^|]+)").expect("status field regex"));
static START_TIME_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"开始:\s*(\d{2}:\d{2})").expect("start time field regex"));
static END_TIME_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"结束:\s*(\d{2}:\d{2})").expect("end time field regex"));
static START_DATE_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"开始日期:\s*(\d{4}-\d{2}-\d{2})").expect("start date field regex"));
static END_DATE_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"结束日期:\s*(\d{4}-\d{2}-\d{2})").expect("end date field regex"));

/// Knobs for behavior that drifted between export generations
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Priority assigned when a backlog label is not in the label table
    pub fallback_priority: TodoPriority,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            fallback_priority: TodoPriority::NotUrgentNotImportant,
        }
    }
}

impl ImportOptions {
    /// The defaults the oldest exports in circulation were written
    /// against, which treated an unknown priority as urgent-important.
    pub fn legacy() -> Self {
        Self {
            fallback_priority: TodoPriority::UrgentImportant,
        }
    }
}

/// Tri-state outcome tally for one import run. `details` carries one
/// display line per processed record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
    pub details: Vec<String>,
}

/// Parse pasted export text and write the recovered records through
/// `repo`. Never aborts: malformed records and failed writes count as
/// `failed` and the scan continues, so a partial import stays persisted.
pub fn import_text<S: KvStore>(
    repo: &mut Repository<S>,
    text: &str,
    options: &ImportOptions,
) -> ImportSummary {
    let mut importer = Importer {
        repo,
        options,
        summary: ImportSummary::default(),
        pending_categories: Vec::new(),
    };
    let mut scanner = Scanner::new();
    for line in text.lines() {
        if let Some(record) = scanner.feed(line) {
            importer.apply(record);
        }
    }
    if let Some(record) = scanner.finish() {
        importer.apply(record);
    }
    importer.commit_categories();
    importer.summary
}

struct Importer<'a, S: KvStore> {
    repo: &'a mut Repository<S>,
    options: &'a ImportOptions,
    summary: ImportSummary,
    pending_categories: Vec<CategoryItem>,
}

impl<S: KvStore> Importer<'_, S> {
    fn apply(&mut self, record: RawRecord) {
        match record {
            RawRecord::Timeline { date, lines } => self.import_timeline(date, &lines),
            RawRecord::Backlog { lines } => self.import_backlog(&lines),
            RawRecord::Log { date, lines } => self.import_log(date, &lines),
            RawRecord::Category { line } => self.import_category(&line),
        }
    }

    fn import_timeline(&mut self, date: NaiveDate, raw_lines: &[String]) {
        let lines = content_lines(raw_lines);
        let head = match lines.first().and_then(|l| FIELDS_HEAD.captures(l)) {
            Some(caps) => caps,
            None => return self.record_failed(raw_lines.first()),
        };
        let category = head[1].trim().to_string();
        let title = head[2].trim().to_string();
        let description = head
            .get(3)
            .map(|m| m.as_str().trim().to_string())
            .filter(|d| !d.is_empty());

        let mut tasks = match self.repo.tasks_for(date) {
            Ok(tasks) => tasks,
            Err(err) => {
                log::warn!("could not read tasks for {}: {}", timefmt::date_key(date), err);
                return self.record_failed(raw_lines.first());
            }
        };
        // Duplicates key on title/date/category; times are deliberately
        // not part of the key.
        if tasks
            .iter()
            .any(|t| t.title == title && t.date == date && t.category == category)
        {
            self.summary.skipped += 1;
            self.summary
                .details
                .push(format!("跳过重复: {} ({})", title, timefmt::date_key(date)));
            return;
        }

        let joined = lines.join(" ");
        let status = parse_status(&joined);
        let start_time = START_TIME_FIELD
            .captures(&joined)
            .and_then(|c| timefmt::parse_clock(&c[1]))
            .unwrap_or(NaiveTime::MIN);
        let end_time = END_TIME_FIELD
            .captures(&joined)
            .and_then(|c| timefmt::parse_clock(&c[1]));

        let mut task = Task::new(title.clone(), category, date, start_time);
        task.description = description;
        task.status = status;
        task.end_time = end_time;
        tasks.push(task);

        match self.repo.put_tasks(date, &tasks) {
            Ok(()) => {
                self.summary.success += 1;
                self.summary
                    .details
                    .push(format!("时间线任务: {} ({})", title, timefmt::date_key(date)));
            }
            Err(err) => {
                log::warn!("could not persist task '{}': {}", title, err);
                self.record_failed(raw_lines.first());
            }
        }
    }

    fn import_backlog(&mut self, raw_lines: &[String]) {
        let lines = content_lines(raw_lines);
        let head = match lines.first().and_then(|l| FIELDS_HEAD.captures(l)) {
            Some(caps) => caps,
            None => return self.record_failed(raw_lines.first()),
        };
        let priority_label = head[1].trim().to_string();
        let title = head[2].trim().to_string();
        let description = head
            .get(3)
            .map(|m| m.as_str().trim().to_string())
            .filter(|d| !d.is_empty());

        let mut todos = match self.repo.todos() {
            Ok(todos) => todos,
            Err(err) => {
                log::warn!("could not read the backlog: {}", err);
                return self.record_failed(raw_lines.first());
            }
        };
        // Backlog dedup keys on the title alone
        if todos.iter().any(|t| t.title == title) {
            self.summary.skipped += 1;
            self.summary.details.push(format!("跳过重复: {}", title));
            return;
        }

        let priority = TodoPriority::from_label(&priority_label)
            .unwrap_or(self.options.fallback_priority);
        let joined = lines.join(" ");
        let status = parse_status(&joined);
        let start_date = START_DATE_FIELD
            .captures(&joined)
            .and_then(|c| NaiveDate::parse_from_str(&c[1], "%Y-%m-%d").ok());
        let end_date = END_DATE_FIELD
            .captures(&joined)
            .and_then(|c| NaiveDate::parse_from_str(&c[1], "%Y-%m-%d").ok());

        let mut todo = TodoTask::new(title.clone(), priority);
        todo.description = description;
        todo.status = status;
        todo.start_date = start_date;
        todo.end_date = end_date;
        todos.push(todo);

        match self.repo.put_todos(&todos) {
            Ok(()) => {
                self.summary.success += 1;
                self.summary.details.push(format!("待办任务: {}", title));
            }
            Err(err) => {
                log::warn!("could not persist todo '{}': {}", title, err);
                self.record_failed(raw_lines.first());
            }
        }
    }

    fn import_log(&mut self, date: NaiveDate, raw_lines: &[String]) {
        let lines = content_lines(raw_lines);
        let (first, rest) = match lines.split_first() {
            Some(split) => split,
            None => return,
        };
        // The scanner only opens a journal record on a type header
        let (kind, head) = match LogKind::split_labeled(first) {
            Some(headed) => headed,
            None => return,
        };

        let mut content = String::new();
        let head = head.trim_start();
        if !head.is_empty() {
            content.push_str(head);
        }
        for line in rest {
            append_line(&mut content, line);
        }
        // A bare header with nothing under it is not an entry
        if content.is_empty() {
            return;
        }
        self.commit_log(date, kind, &content);
    }

    /// Overwrite the stored slot only when content differs; identical
    /// content is a skip, and there is nothing to fail on grammar here.
    fn commit_log(&mut self, date: NaiveDate, kind: LogKind, content: &str) {
        let content = content.trim();
        let existing = match self.repo.log(date, kind) {
            Ok(existing) => existing,
            Err(err) => {
                log::warn!("could not read the stored journal slot: {}", err);
                self.log_failed(date, kind);
                return;
            }
        };
        if existing.as_deref() == Some(content) {
            self.summary.skipped += 1;
            self.summary
                .details
                .push(format!("跳过重复: {} {}", kind.label(), timefmt::date_key(date)));
            return;
        }
        match self.repo.put_log(date, kind, content) {
            Ok(()) => {
                self.summary.success += 1;
                self.summary
                    .details
                    .push(format!("{}: {}", kind.label(), timefmt::date_key(date)));
            }
            Err(err) => {
                log::warn!("could not persist the journal entry: {}", err);
                self.log_failed(date, kind);
            }
        }
    }

    fn import_category(&mut self, line: &str) {
        let caps = match CATEGORY_HEAD.captures(line) {
            Some(caps) => caps,
            None => {
                self.summary.failed += 1;
                self.summary.details.push(format!("失败: {}...", snippet(line)));
                return;
            }
        };
        let color = caps[1].trim().to_string();
        let name = caps[2].trim().to_string();

        let existing = match self.repo.categories() {
            Ok(existing) => existing,
            Err(err) => {
                log::warn!("could not read categories: {}", err);
                self.summary.failed += 1;
                self.summary.details.push(format!("失败: {}...", snippet(line)));
                return;
            }
        };
        let duplicate = existing.iter().any(|c| c.name == name)
            || self.pending_categories.iter().any(|c| c.name == name);
        if duplicate {
            self.summary.skipped += 1;
            self.summary.details.push(format!("跳过重复: {}", name));
            return;
        }

        let color = if color.starts_with('#') {
            color
        } else {
            format!("#{}", color)
        };
        self.summary.success += 1;
        self.summary.details.push(format!("分类: {}", name));
        self.pending_categories.push(CategoryItem::new(name, color));
    }

    /// Commit the categories collected during the run in one batch, then
    /// verify by re-reading the store: every pending entry that did not
    /// survive turns its earlier success into a failure.
    fn commit_categories(&mut self) {
        if self.pending_categories.is_empty() {
            return;
        }
        match self.repo.categories() {
            Ok(existing) => {
                let mut all = existing;
                all.extend(self.pending_categories.iter().cloned());
                if let Err(err) = self.repo.put_categories(&all) {
                    log::warn!("could not persist imported categories: {}", err);
                }
            }
            Err(err) => log::warn!("could not read categories before commit: {}", err),
        }

        let saved = self.repo.categories().unwrap_or_default();
        let missing = self
            .pending_categories
            .iter()
            .filter(|pending| {
                !saved
                    .iter()
                    .any(|c| c.name == pending.name && c.color == pending.color)
            })
            .count();
        if missing > 0 {
            self.summary.success -= missing;
            self.summary.failed += missing;
        }
    }

    fn record_failed(&mut self, raw_first: Option<&String>) {
        self.summary.failed += 1;
        let head = raw_first.map(|l| snippet(l)).unwrap_or_default();
        self.summary.details.push(format!("失败: {}...", head));
    }

    fn log_failed(&mut self, date: NaiveDate, kind: LogKind) {
        self.summary.failed += 1;
        self.summary
            .details
            .push(format!("失败: {} {}", kind.label(), timefmt::date_key(date)));
    }
}

fn parse_status(joined: &str) -> TaskStatus {
    STATUS_FIELD
        .captures(joined)
        .and_then(|c| TaskStatus::from_label(c[1].trim()))
        .unwrap_or(TaskStatus::Pending)
}

/// Trimmed, non-empty view of a record's buffered lines
fn content_lines(raw_lines: &[String]) -> Vec<&str> {
    raw_lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect()
}

fn append_line(acc: &mut String, line: &str) {
    if !acc.is_empty() {
        acc.push('\n');
    }
    acc.push_str(line);
}

fn snippet(line: &str) -> String {
    line.chars().take(30).collect()
}
