pub mod category;
pub mod enums;
pub mod log;
pub mod task;
pub mod todo;

pub use category::{default_categories, CategoryItem};
pub use enums::{TaskStatus, TodoPriority};
pub use log::{LogEntry, LogKind};
pub use task::{Task, TimeSegment};
pub use todo::TodoTask;
