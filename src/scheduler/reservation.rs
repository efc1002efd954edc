//! Reservation policy.
//!
//! Carves capacity blocks out of specific workers before the allocator
//! runs. Rules are data: which workers, how many hours, and which task
//! type (if any) may use the block are all configuration.
//!
//! # Rule Semantics
//!
//! - A rule is skipped entirely when the pool has fewer than
//!   `min_workers` workers.
//! - A rule never reserves on a worker already withheld by an earlier rule.
//! - When a selected worker has less general capacity left than the rule
//!   asks for, that worker is skipped with a warning. Blocks are never
//!   shrunk to fit.
//! - A rule without `task_type` withholds its block from every task
//!   type. With `hours` unset, that removes the worker from general
//!   allocation altogether.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::CapacityPool;
use crate::error::CapacityError;
use crate::models::hours_to_ms;

/// Selects the workers a rule applies to, by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkerSelector {
    /// The worker `offset` positions from the end (1 = last).
    /// Falls back to the last worker when the pool is shorter than `offset`.
    FromEnd { offset: usize },
    /// The last `count` workers.
    Trailing { count: usize },
}

impl WorkerSelector {
    /// Worker indices (0-based, ascending) selected in a pool of `n`.
    pub fn select(&self, n: usize) -> Vec<usize> {
        if n == 0 {
            return Vec::new();
        }
        match *self {
            WorkerSelector::FromEnd { offset } => {
                if offset == 0 {
                    Vec::new()
                } else if n >= offset {
                    vec![n - offset]
                } else {
                    vec![n - 1]
                }
            }
            WorkerSelector::Trailing { count } => (n.saturating_sub(count)..n).collect(),
        }
    }
}

/// One reservation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationRule {
    /// Purpose label carried onto each block.
    pub label: String,
    /// Smallest pool the rule applies to.
    #[serde(default)]
    pub min_workers: usize,
    /// Which workers receive a block.
    pub select: WorkerSelector,
    /// Block size. `None` = the full working-hour budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    /// Task type allowed to use the block. `None` = nobody.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
}

impl ReservationRule {
    /// A rule withholding whole workers from assignment.
    pub fn withhold(label: impl Into<String>, select: WorkerSelector) -> Self {
        Self {
            label: label.into(),
            min_workers: 0,
            select,
            hours: None,
            task_type: None,
        }
    }

    /// A rule reserving `hours` on each selected worker for `task_type`.
    pub fn bound(
        label: impl Into<String>,
        select: WorkerSelector,
        hours: f64,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            min_workers: 0,
            select,
            hours: Some(hours),
            task_type: Some(task_type.into()),
        }
    }

    /// Sets the minimum pool size.
    pub fn with_min_workers(mut self, min_workers: usize) -> Self {
        self.min_workers = min_workers;
        self
    }

    /// Whether the rule applies to a pool of `n` workers.
    pub fn is_active(&self, n: usize) -> bool {
        n >= self.min_workers
    }

    /// Block size in a pool whose workers have `capacity_ms` each.
    pub fn block_ms(&self, capacity_ms: i64) -> i64 {
        self.hours.map(hours_to_ms).unwrap_or(capacity_ms)
    }
}

/// Ordered list of reservation rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationPolicy {
    rules: Vec<ReservationRule>,
}

impl ReservationPolicy {
    /// A policy with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule. Rules apply in insertion order.
    pub fn with_rule(mut self, rule: ReservationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The histopathology deployment's rules.
    ///
    /// 1. **Autopsy**: the 4th-from-last worker (the last one in pools
    ///    under 4) is withheld for the whole day. Needs 2+ workers.
    /// 2. **Mid-day**: the last three workers each hold 3 hours for
    ///    "Priority Small - Mid-day". Needs 3+ workers.
    pub fn standard() -> Self {
        Self::new()
            .with_rule(
                ReservationRule::withhold("Autopsy", WorkerSelector::FromEnd { offset: 4 })
                    .with_min_workers(2),
            )
            .with_rule(
                ReservationRule::bound(
                    "Mid-day",
                    WorkerSelector::Trailing { count: 3 },
                    3.0,
                    "Priority Small - Mid-day",
                )
                .with_min_workers(3),
            )
    }

    /// Rules in application order.
    pub fn rules(&self) -> &[ReservationRule] {
        &self.rules
    }

    /// Carves every active rule's blocks out of `pool`.
    ///
    /// Must run before any unit is placed.
    pub fn apply(&self, pool: &mut CapacityPool) -> Result<(), CapacityError> {
        let n = pool.len();
        for rule in &self.rules {
            if !rule.is_active(n) {
                debug!(
                    rule = %rule.label,
                    workers = n,
                    min = rule.min_workers,
                    "reservation rule inactive"
                );
                continue;
            }
            let block_ms = rule.block_ms(pool.capacity_ms());
            for index in rule.select.select(n) {
                if pool.is_withheld(index)? {
                    continue;
                }
                let remaining = pool.remaining(index)?;
                if block_ms > remaining {
                    warn!(
                        rule = %rule.label,
                        worker = index + 1,
                        block_ms,
                        remaining_ms = remaining,
                        "reservation block does not fit; skipped"
                    );
                    continue;
                }
                pool.reserve(index, block_ms, &rule.label, rule.task_type.as_deref())?;
            }
        }
        Ok(())
    }
}
