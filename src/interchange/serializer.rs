use crate::domain::{LogKind, Task, TodoTask};
use crate::error::StoreError;
use crate::store::{KvStore, Repository};
use crate::timefmt;
use chrono::{DateTime, Local};

/// Render the whole store as the canonical five-section text document:
/// header, timeline tasks, backlog, journal entries, categories, end
/// marker. Dated sections cover the scan window, most recent date first.
pub fn export_text<S: KvStore>(
    repo: &Repository<S>,
    now: DateTime<Local>,
) -> Result<String, StoreError> {
    let mut text = String::from("=== 工作笔记数据导出 ===\n\n");
    text.push_str(&format!("导出时间: {}\n\n", now.format("%Y/%m/%d %H:%M:%S")));
    let today = now.date_naive();

    text.push_str("=== 时间线任务 ===\n\n");
    let mut task_count = 0;
    for date in Repository::<S>::recent_dates(today) {
        let tasks = repo.tasks_for(date)?;
        if tasks.is_empty() {
            continue;
        }
        text.push_str(&format!("\n【{}】\n", timefmt::date_key(date)));
        for (index, task) in tasks.iter().enumerate() {
            task_count += 1;
            push_timeline_task(&mut text, index + 1, task);
        }
    }
    text.push_str(&format!("\n总计: {} 条任务\n\n", task_count));

    text.push_str("=== 待办任务 ===\n\n");
    let todos = repo.todos()?;
    if todos.is_empty() {
        text.push_str("暂无待办任务\n");
    } else {
        for (index, todo) in todos.iter().enumerate() {
            push_todo(&mut text, index + 1, todo);
        }
    }
    text.push_str(&format!("\n总计: {} 条待办\n\n", todos.len()));

    text.push_str("=== 晨间计划和晚间总结 ===\n\n");
    let mut log_count = 0;
    for date in Repository::<S>::recent_dates(today) {
        let morning = repo.log(date, LogKind::Morning)?.filter(|c| !c.is_empty());
        let evening = repo.log(date, LogKind::Evening)?.filter(|c| !c.is_empty());
        if morning.is_none() && evening.is_none() {
            continue;
        }
        text.push_str(&format!("\n【{}】\n", timefmt::date_key(date)));
        if let Some(content) = morning {
            log_count += 1;
            text.push_str(&format!("晨间计划: {}\n", content));
        }
        if let Some(content) = evening {
            log_count += 1;
            text.push_str(&format!("晚间总结: {}\n", content));
        }
    }
    text.push_str(&format!("\n总计: {} 条日志\n\n", log_count));

    text.push_str("=== 分类信息 ===\n\n");
    let categories = repo.categories()?;
    for (index, item) in categories.iter().enumerate() {
        text.push_str(&format!("{}. [{}] {}\n", index + 1, item.color, item.name));
    }
    text.push_str(&format!("\n总计: {} 条分类\n\n", categories.len()));

    text.push_str("=== 导出结束 ===\n");
    Ok(text)
}

fn push_timeline_task(text: &mut String, number: usize, task: &Task) {
    text.push_str(&format!("{}. [{}] {}", number, task.category, task.title));
    if let Some(desc) = task.description.as_deref().filter(|d| !d.is_empty()) {
        text.push_str(&format!(" - {}", desc));
    }
    text.push_str(&format!("\n   状态: {}", task.status.to_label()));
    text.push_str(&format!(" | 开始: {}", timefmt::render_clock(task.start_time)));
    if let Some(end) = task.end_time {
        text.push_str(&format!(" | 结束: {}", timefmt::render_clock(end)));
    }
    if let Some(duration) = rendered_duration(task) {
        text.push_str(&format!(" | 时长: {}", duration));
    }
    text.push('\n');
    for (index, seg) in task.time_segments.iter().enumerate() {
        if let (Some(end), Some(secs)) = (seg.ended_at, seg.duration_seconds) {
            text.push_str(&format!(
                "   第{}段: {} - {} ({})\n",
                index + 1,
                seg.started_at.format("%H:%M:%S"),
                end.format("%H:%M:%S"),
                timefmt::format_seconds(secs)
            ));
        }
    }
}

fn push_todo(text: &mut String, number: usize, todo: &TodoTask) {
    text.push_str(&format!(
        "{}. [{}] {}",
        number,
        todo.priority.to_label(),
        todo.title
    ));
    if let Some(desc) = todo.description.as_deref().filter(|d| !d.is_empty()) {
        text.push_str(&format!(" - {}", desc));
    }
    text.push_str(&format!("\n   状态: {}", todo.status.to_label()));
    if let Some(date) = todo.start_date {
        text.push_str(&format!(" | 开始日期: {}", timefmt::date_key(date)));
    }
    if let Some(date) = todo.end_date {
        text.push_str(&format!(" | 结束日期: {}", timefmt::date_key(date)));
    }
    if let Some(at) = todo.completed_at {
        text.push_str(&format!(" | 完成时间: {}", at.format("%Y/%m/%d %H:%M:%S")));
    }
    text.push('\n');
}

/// Displayed duration for a task line, in priority order: recorded
/// segments, then the elapsed counter, then whatever rendering was cached.
/// `None` suppresses the clause entirely.
fn rendered_duration(task: &Task) -> Option<String> {
    if !task.time_segments.is_empty() {
        return Some(timefmt::format_seconds(task.closed_seconds()));
    }
    if task.elapsed_seconds != 0 {
        return Some(timefmt::format_seconds(task.elapsed_seconds));
    }
    task.duration.clone().filter(|d| !d.is_empty())
}
