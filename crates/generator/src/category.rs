//! Statement categories tracked by the dynamic-mode report.

use serde::{Deserialize, Serialize};

/// Kind of statement the generator produced. Each category carries its
/// own success/total counters in the final report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    Select,
    Insert,
    Update,
    Delete,
    Ddl,
}

impl Category {
    /// All categories, in report order.
    pub const ALL: [Category; 5] = [
        Category::Select,
        Category::Insert,
        Category::Update,
        Category::Delete,
        Category::Ddl,
    ];

    /// Human-readable label used in the aggregate report.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Select => "SELECT",
            Category::Insert => "INSERT",
            Category::Update => "UPDATE",
            Category::Delete => "DELETE",
            Category::Ddl => "DDL",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
