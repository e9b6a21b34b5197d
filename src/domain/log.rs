use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The two daily journal slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Morning,
    Evening,
}

impl LogKind {
    /// Storage key fragment, combined with the date by the repository
    pub fn key_part(&self) -> &'static str {
        match self {
            LogKind::Morning => "morning",
            LogKind::Evening => "evening",
        }
    }

    /// Chinese label used in the export text
    pub fn label(&self) -> &'static str {
        match self {
            LogKind::Morning => "晨间计划",
            LogKind::Evening => "晚间总结",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "晨间计划" => Some(LogKind::Morning),
            "晚间总结" => Some(LogKind::Evening),
            _ => None,
        }
    }

    /// Split a header line like `晨间计划: ...` into its kind and the
    /// remainder after the colon
    pub fn split_labeled(line: &str) -> Option<(Self, &str)> {
        [LogKind::Morning, LogKind::Evening]
            .into_iter()
            .find_map(|kind| {
                line.strip_prefix(kind.label())
                    .and_then(|rest| rest.strip_prefix(':'))
                    .map(|rest| (kind, rest))
            })
    }
}

/// One journal entry, uniquely addressed by date and kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    pub kind: LogKind,
    pub content: String,
}

impl LogEntry {
    pub fn new(date: NaiveDate, kind: LogKind, content: impl Into<String>) -> Self {
        Self {
            date,
            kind,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        for kind in [LogKind::Morning, LogKind::Evening] {
            assert_eq!(LogKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(LogKind::from_label("午间随笔"), None);
    }

    #[test]
    fn test_key_parts_are_distinct() {
        assert_eq!(LogKind::Morning.key_part(), "morning");
        assert_eq!(LogKind::Evening.key_part(), "evening");
    }

    #[test]
    fn test_split_labeled() {
        assert_eq!(
            LogKind::split_labeled("晨间计划: 上午联调"),
            Some((LogKind::Morning, " 上午联调"))
        );
        assert_eq!(
            LogKind::split_labeled("晚间总结:联调完成"),
            Some((LogKind::Evening, "联调完成"))
        );
        assert_eq!(LogKind::split_labeled("晨间计划 没有冒号"), None);
        assert_eq!(LogKind::split_labeled("午间随笔: 无此类型"), None);
    }
}
