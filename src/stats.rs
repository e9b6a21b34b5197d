use crate::domain::{Task, TaskStatus};
use crate::error::StoreError;
use crate::store::{KvStore, Repository, SCAN_WINDOW_DAYS};
use crate::timefmt;
use chrono::{Duration, NaiveDate};

/// Dates per [`CategoryScan::step`] call
pub const DEFAULT_BATCH_DAYS: i64 = 30;

/// Color used for categories absent from the palette
pub const FALLBACK_COLOR: &str = "#969799";

/// Tracked seconds attributable to one task for aggregation purposes.
/// Tasks tracked live carry segments; imported or hand-edited tasks may
/// only have an elapsed count or a start/end pair, so older records still
/// contribute.
pub fn tracked_seconds(task: &Task) -> i64 {
    if !task.time_segments.is_empty() {
        task.closed_seconds()
    } else if task.elapsed_seconds != 0 {
        task.elapsed_seconds
    } else if let Some(end) = task.end_time {
        timefmt::span_seconds(task.date, task.start_time, end)
    } else {
        0
    }
}

/// One category's share of a single day's completed work
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStat {
    pub category: String,
    pub total_seconds: i64,
    pub duration_text: String,
    pub count: usize,
    pub percentage: f64,
    pub color: String,
}

/// Per-category totals over one day's completed tasks, longest first.
/// Tasks contributing zero seconds are left out entirely.
pub fn day_category_stats<S: KvStore>(
    repo: &Repository<S>,
    date: NaiveDate,
) -> Result<Vec<CategoryStat>, StoreError> {
    let palette = repo.categories()?;
    let mut buckets: Vec<(String, i64, usize)> = Vec::new();

    for task in repo.tasks_for(date)? {
        if task.status != TaskStatus::Completed {
            continue;
        }
        let seconds = tracked_seconds(&task);
        if seconds <= 0 {
            continue;
        }
        match buckets.iter_mut().find(|(name, _, _)| *name == task.category) {
            Some((_, total, count)) => {
                *total += seconds;
                *count += 1;
            }
            None => buckets.push((task.category.clone(), seconds, 1)),
        }
    }

    let grand_total: i64 = buckets.iter().map(|(_, total, _)| total).sum();
    let mut stats: Vec<CategoryStat> = buckets
        .into_iter()
        .map(|(category, total_seconds, count)| {
            let color = palette
                .iter()
                .find(|c| c.name == category)
                .map(|c| c.color.clone())
                .unwrap_or_else(|| FALLBACK_COLOR.to_string());
            CategoryStat {
                duration_text: timefmt::format_seconds(total_seconds),
                percentage: if grand_total > 0 {
                    total_seconds as f64 / grand_total as f64 * 100.0
                } else {
                    0.0
                },
                category,
                total_seconds,
                count,
                color,
            }
        })
        .collect();
    stats.sort_by(|a, b| b.total_seconds.cmp(&a.total_seconds));
    Ok(stats)
}

/// Running partial of a [`CategoryScan`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    pub total_seconds: i64,
    pub task_count: usize,
    pub processed_days: i64,
    pub done: bool,
}

impl ScanProgress {
    pub fn duration_text(&self) -> String {
        timefmt::format_seconds(self.total_seconds)
    }
}

/// Cumulative tracked time of one category over the recent-history window,
/// computed cooperatively: each [`step`](Self::step) covers a batch of dates
/// and returns the running partial, so a caller on a single-threaded event
/// loop can render progressively refined totals between steps instead of
/// blocking on a year of keys.
#[derive(Debug)]
pub struct CategoryScan {
    category: String,
    from: NaiveDate,
    batch_days: i64,
    processed_days: i64,
    total_seconds: i64,
    task_count: usize,
}

impl CategoryScan {
    /// A scan over the window ending at `from` (inclusive, newest first)
    pub fn new(category: impl Into<String>, from: NaiveDate) -> Self {
        Self {
            category: category.into(),
            from,
            batch_days: DEFAULT_BATCH_DAYS,
            processed_days: 0,
            total_seconds: 0,
            task_count: 0,
        }
    }

    pub fn with_batch_days(mut self, batch_days: i64) -> Self {
        self.batch_days = batch_days.max(1);
        self
    }

    pub fn is_done(&self) -> bool {
        self.processed_days >= SCAN_WINDOW_DAYS
    }

    pub fn progress(&self) -> ScanProgress {
        ScanProgress {
            total_seconds: self.total_seconds,
            task_count: self.task_count,
            processed_days: self.processed_days,
            done: self.is_done(),
        }
    }

    /// Process the next batch of dates. Stepping a finished scan reads
    /// nothing and returns the final totals.
    pub fn step<S: KvStore>(&mut self, repo: &Repository<S>) -> Result<ScanProgress, StoreError> {
        let end = (self.processed_days + self.batch_days).min(SCAN_WINDOW_DAYS);
        for offset in self.processed_days..end {
            let date = self.from - Duration::days(offset);
            for task in repo.tasks_for(date)? {
                if task.category != self.category {
                    continue;
                }
                let seconds = tracked_seconds(&task);
                if seconds > 0 {
                    self.total_seconds += seconds;
                    self.task_count += 1;
                }
            }
        }
        self.processed_days = end;
        log::debug!(
            "category scan '{}': {}/{} days, {}s so far",
            self.category,
            self.processed_days,
            SCAN_WINDOW_DAYS,
            self.total_seconds
        );
        Ok(self.progress())
    }
}
