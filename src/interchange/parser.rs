use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static RECORD_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.").expect("record head regex"));
static DATE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^【(\d{4}-\d{2}-\d{2})】$").expect("date marker regex"));

/// Which labeled block of the document the scanner is inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    None,
    Timeline,
    Backlog,
    Log,
    Category,
}

/// One flushed record, still unparsed. `lines` holds the raw physical
/// lines as fed, head line first; finalizing them is the importer's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    Timeline { date: NaiveDate, lines: Vec<String> },
    Backlog { lines: Vec<String> },
    Log { date: NaiveDate, lines: Vec<String> },
    Category { line: String },
}

/// Line-oriented scanner over pasted export text. Feed it one physical
/// line at a time; a record is returned the moment a boundary closes it
/// (next record head, date marker, rule line, section header or end of
/// input via [`Scanner::finish`]).
#[derive(Debug)]
pub struct Scanner {
    section: Section,
    current_date: Option<NaiveDate>,
    buffer: Vec<String>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            section: Section::None,
            current_date: None,
            buffer: Vec::new(),
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn current_date(&self) -> Option<NaiveDate> {
        self.current_date
    }

    /// Process one physical line, returning the record it closed, if any
    pub fn feed(&mut self, line: &str) -> Option<RawRecord> {
        let trimmed = line.trim();

        // Section headers win over everything, even when drawn as a
        // `=== ... ===` rule.
        if trimmed.contains("时间线任务") {
            let flushed = self.take_buffered();
            self.section = Section::Timeline;
            return flushed;
        }
        if trimmed.contains("待办任务") {
            let flushed = self.take_buffered();
            self.section = Section::Backlog;
            return flushed;
        }
        if trimmed.contains("晨间计划") && trimmed.contains("晚间总结") {
            let flushed = self.take_buffered();
            self.section = Section::Log;
            // Log dates come from the markers inside the section
            self.current_date = None;
            return flushed;
        }
        if trimmed.contains("分类信息") {
            let flushed = self.take_buffered();
            self.section = Section::Category;
            return flushed;
        }

        // Structural noise closes whatever record was open
        if trimmed.is_empty()
            || trimmed.starts_with("===")
            || trimmed.starts_with("导出时间:")
            || trimmed.starts_with("总计:")
        {
            return self.take_buffered();
        }

        if let Some(caps) = DATE_MARKER.captures(trimmed) {
            let flushed = self.take_buffered();
            match NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d") {
                Ok(date) => self.current_date = Some(date),
                Err(_) => log::warn!("ignoring date marker with invalid date: {}", trimmed),
            }
            return flushed;
        }

        match self.section {
            Section::Timeline | Section::Log if self.current_date.is_none() => {
                // Records in dated sections are noise until a date appears
                None
            }
            Section::Timeline | Section::Backlog => {
                if RECORD_HEAD.is_match(trimmed) {
                    let flushed = self.take_buffered();
                    self.buffer.push(line.to_string());
                    flushed
                } else if !self.buffer.is_empty() {
                    self.buffer.push(line.to_string());
                    None
                } else {
                    None
                }
            }
            Section::Log => {
                if trimmed.starts_with("晨间计划:") || trimmed.starts_with("晚间总结:") {
                    let flushed = self.take_buffered();
                    self.buffer.push(line.to_string());
                    flushed
                } else if !self.buffer.is_empty() {
                    self.buffer.push(line.to_string());
                    None
                } else {
                    None
                }
            }
            Section::Category => {
                if RECORD_HEAD.is_match(trimmed) {
                    Some(RawRecord::Category {
                        line: trimmed.to_string(),
                    })
                } else {
                    None
                }
            }
            Section::None => None,
        }
    }

    /// Flush the record still open at end of input
    pub fn finish(&mut self) -> Option<RawRecord> {
        self.take_buffered()
    }

    fn take_buffered(&mut self) -> Option<RawRecord> {
        if self.buffer.is_empty() {
            return None;
        }
        let lines = std::mem::take(&mut self.buffer);
        match self.section {
            Section::Timeline => self
                .current_date
                .map(|date| RawRecord::Timeline { date, lines }),
            Section::Backlog => Some(RawRecord::Backlog { lines }),
            Section::Log => self.current_date.map(|date| RawRecord::Log { date, lines }),
            Section::None | Section::Category => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan_all(text: &str) -> Vec<RawRecord> {
        let mut scanner = Scanner::new();
        let mut records = Vec::new();
        for line in text.lines() {
            if let Some(record) = scanner.feed(line) {
                records.push(record);
            }
        }
        if let Some(record) = scanner.finish() {
            records.push(record);
        }
        records
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_section_headers_switch_state() {
        let mut scanner = Scanner::new();
        assert_eq!(scanner.section(), Section::None);

        scanner.feed("=== 时间线任务 ===");
        assert_eq!(scanner.section(), Section::Timeline);
        scanner.feed("=== 待办任务 ===");
        assert_eq!(scanner.section(), Section::Backlog);
        scanner.feed("=== 分类信息 ===");
        assert_eq!(scanner.section(), Section::Category);
    }

    #[test]
    fn test_entering_log_section_resets_date() {
        let mut scanner = Scanner::new();
        scanner.feed("=== 时间线任务 ===");
        scanner.feed("【2024-01-15】");
        assert_eq!(scanner.current_date(), Some(date(2024, 1, 15)));

        scanner.feed("=== 晨间计划和晚间总结 ===");
        assert_eq!(scanner.section(), Section::Log);
        assert_eq!(scanner.current_date(), None);

        // Without a fresh date marker, log lines are noise
        let records = [
            scanner.feed("晨间计划: 不该出现"),
            scanner.finish(),
        ];
        assert_eq!(records, [None, None]);
    }

    #[test]
    fn test_timeline_records_split_on_heads_and_noise() {
        let text = "\
=== 时间线任务 ===

【2024-01-15】
1. [开发] 接口联调 - 用户服务
   状态: 已完成 | 开始: 09:00 | 结束: 10:30 | 时长: 1时30分
2. [会议] 晨会
   状态: 已完成 | 开始: 10:30

总计: 2 条任务
";
        let records = scan_all(text);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            RawRecord::Timeline {
                date: date(2024, 1, 15),
                lines: vec![
                    "1. [开发] 接口联调 - 用户服务".to_string(),
                    "   状态: 已完成 | 开始: 09:00 | 结束: 10:30 | 时长: 1时30分".to_string(),
                ],
            }
        );
        match &records[1] {
            RawRecord::Timeline { lines, .. } => assert_eq!(lines.len(), 2),
            other => panic!("expected timeline record, got {:?}", other),
        }
    }

    #[test]
    fn test_timeline_lines_before_date_are_discarded() {
        let text = "\
=== 时间线任务 ===
1. [开发] 无日期任务
   状态: 已完成
【2024-01-15】
1. [开发] 有日期任务
";
        let records = scan_all(text);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            RawRecord::Timeline {
                date: date(2024, 1, 15),
                lines: vec!["1. [开发] 有日期任务".to_string()],
            }
        );
    }

    #[test]
    fn test_date_marker_flushes_under_previous_date() {
        let text = "\
=== 时间线任务 ===
【2024-01-15】
1. [开发] 周一的活
【2024-01-16】
1. [开发] 周二的活
";
        let records = scan_all(text);
        assert_eq!(records.len(), 2);
        match (&records[0], &records[1]) {
            (
                RawRecord::Timeline { date: first, .. },
                RawRecord::Timeline { date: second, .. },
            ) => {
                assert_eq!(*first, date(2024, 1, 15));
                assert_eq!(*second, date(2024, 1, 16));
            }
            other => panic!("expected two timeline records, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_date_marker_keeps_previous_date() {
        let text = "\
=== 时间线任务 ===
【2024-01-15】
【2024-13-99】
1. [开发] 挂在前一个日期下
";
        let records = scan_all(text);
        assert_eq!(records.len(), 1);
        match &records[0] {
            RawRecord::Timeline { date: d, .. } => assert_eq!(*d, date(2024, 1, 15)),
            other => panic!("expected timeline record, got {:?}", other),
        }
    }

    #[test]
    fn test_backlog_needs_no_date() {
        let text = "\
=== 待办任务 ===

1. [紧急&重要] 修灯 - 客厅的
   状态: 待开始
";
        let records = scan_all(text);
        assert_eq!(
            records,
            vec![RawRecord::Backlog {
                lines: vec![
                    "1. [紧急&重要] 修灯 - 客厅的".to_string(),
                    "   状态: 待开始".to_string(),
                ],
            }]
        );
    }

    #[test]
    fn test_log_records_split_on_type_headers() {
        let text = "\
=== 晨间计划和晚间总结 ===

【2024-01-15】
晨间计划: 上午联调
下午写文档
晚间总结: 联调完成
";
        let records = scan_all(text);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            RawRecord::Log {
                date: date(2024, 1, 15),
                lines: vec!["晨间计划: 上午联调".to_string(), "下午写文档".to_string()],
            }
        );
        assert_eq!(
            records[1],
            RawRecord::Log {
                date: date(2024, 1, 15),
                lines: vec!["晚间总结: 联调完成".to_string()],
            }
        );
    }

    #[test]
    fn test_category_lines_finalize_immediately() {
        let mut scanner = Scanner::new();
        scanner.feed("=== 分类信息 ===");
        assert_eq!(scanner.feed(""), None);
        assert_eq!(
            scanner.feed("1. [#c8e6c9] 学习"),
            Some(RawRecord::Category {
                line: "1. [#c8e6c9] 学习".to_string(),
            })
        );
        // Non-numbered lines in the category section are noise
        assert_eq!(scanner.feed("随便写点什么"), None);
        assert_eq!(scanner.finish(), None);
    }

    #[test]
    fn test_lines_outside_any_section_are_noise() {
        let records = scan_all("1. [开发] 无章节任务\n状态: 已完成\n");
        assert!(records.is_empty());
    }

    #[test]
    fn test_finish_flushes_open_record() {
        let mut scanner = Scanner::new();
        scanner.feed("=== 待办任务 ===");
        assert_eq!(scanner.feed("1. [紧急&重要] 修灯"), None);
        assert_eq!(
            scanner.finish(),
            Some(RawRecord::Backlog {
                lines: vec!["1. [紧急&重要] 修灯".to_string()],
            })
        );
        // A second finish has nothing left
        assert_eq!(scanner.finish(), None);
    }
}
