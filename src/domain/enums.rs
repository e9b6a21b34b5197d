use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a timeline task or backlog task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Paused,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Parse a status from its export label like "进行中"
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "待开始" => Some(Self::Pending),
            "进行中" => Some(Self::InProgress),
            "已暂停" => Some(Self::Paused),
            "已完成" => Some(Self::Completed),
            "已取消" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Render the status as its export label
    pub fn to_label(&self) -> &'static str {
        match self {
            Self::Pending => "待开始",
            Self::InProgress => "进行中",
            Self::Paused => "已暂停",
            Self::Completed => "已完成",
            Self::Cancelled => "已取消",
        }
    }

    /// Stable identifier matching the stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Check whether the status still accrues or may accrue time
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress | Self::Paused)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Eisenhower-style priority bucket for backlog tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoPriority {
    UrgentImportant,
    ImportantNotUrgent,
    UrgentNotImportant,
    NotUrgentNotImportant,
}

impl TodoPriority {
    /// Parse a priority from its export label like "紧急&重要"
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "紧急&重要" => Some(Self::UrgentImportant),
            "重要&不紧急" => Some(Self::ImportantNotUrgent),
            "紧急&不重要" => Some(Self::UrgentNotImportant),
            "不紧急&不重要" => Some(Self::NotUrgentNotImportant),
            _ => None,
        }
    }

    /// Render the priority as its export label
    pub fn to_label(&self) -> &'static str {
        match self {
            Self::UrgentImportant => "紧急&重要",
            Self::ImportantNotUrgent => "重要&不紧急",
            Self::UrgentNotImportant => "紧急&不重要",
            Self::NotUrgentNotImportant => "不紧急&不重要",
        }
    }
}
