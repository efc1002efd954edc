//! Request lines and unit tasks.
//!
//! A request names task types with counts. Expansion turns each line
//! into `count` indivisible [`UnitTask`]s, the items the allocator
//! actually places on workers.

use serde::{Deserialize, Serialize};

use super::{TaskType, Tier};

/// One `{type, count}` line of a scheduling request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequestLine {
    /// Task type name (must exist in the catalog).
    pub task_type: String,
    /// Number of units requested.
    pub count: u32,
    /// Tier the caller believes the type belongs to. Checked against
    /// the catalog when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
}

impl TaskRequestLine {
    /// Creates a request line.
    pub fn new(task_type: impl Into<String>, count: u32) -> Self {
        Self {
            task_type: task_type.into(),
            count,
            tier: None,
        }
    }

    /// Sets the caller-declared tier.
    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }
}

/// One indivisible instance of a task type.
///
/// Exists only within a single scheduling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTask {
    /// Task type name.
    pub task_type: String,
    /// Tier copied from the catalog.
    pub tier: Tier,
    /// Duration (ms).
    pub duration_ms: i64,
    /// Overtime-eligible.
    pub must_complete_today: bool,
    /// Position in the expanded sequence (0-indexed).
    pub sequence: usize,
}

impl UnitTask {
    /// Creates a unit of `task_type` at position `sequence`.
    pub fn of(task_type: &TaskType, sequence: usize) -> Self {
        Self {
            task_type: task_type.name.clone(),
            tier: task_type.tier,
            duration_ms: task_type.duration_ms,
            must_complete_today: task_type.must_complete_today,
            sequence,
        }
    }
}
