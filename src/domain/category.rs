use serde::{Deserialize, Serialize};

/// A named task category with a display color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryItem {
    /// Unique category name
    pub name: String,
    /// Hex color such as `#c8e6c9`
    pub color: String,
}

impl CategoryItem {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// The built-in palette, served whenever no category list was stored yet.
/// Life entries are pale yellow, study entries pale green.
pub fn default_categories() -> Vec<CategoryItem> {
    [
        ("娱乐", "#ffb3d9"),
        ("路上", "#fff9c4"),
        ("运动", "#fff9c4"),
        ("家务", "#fff9c4"),
        ("休息", "#fff9c4"),
        ("小憩", "#fff9c4"),
        ("睡觉", "#fff9c4"),
        ("吃饭", "#fff9c4"),
        ("工作", "#fff9c4"),
        ("副业", "#fff9c4"),
        ("主业", "#fff9c4"),
        ("开发", "#ffb3d9"),
        ("配合测试", "#fff9c4"),
        ("设计", "#fff9c4"),
        ("排查生产", "#b3d9ff"),
        ("走流程", "#ffb3d9"),
        ("学习", "#c8e6c9"),
        ("学编程", "#c8e6c9"),
        ("其他", "#9e9e9e"),
    ]
    .into_iter()
    .map(|(name, color)| CategoryItem::new(name, color))
    .collect()
}
