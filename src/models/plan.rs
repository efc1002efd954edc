//! Plan (allocation result) model.
//!
//! A plan is the outcome of one scheduling run: every worker with its
//! assigned units, plus the units that could not be placed.
//! Per-type views (`case_counts`, backlog by type) are always derived
//! from the plan, never stored beside it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{UnitTask, Worker, MS_PER_HOUR};

/// Result of one allocation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Workers in ordinal order.
    pub workers: Vec<Worker>,
    /// Units that fit nowhere, in expansion order.
    pub outstanding: Vec<UnitTask>,
    /// Requested count per task type, as submitted.
    pub requested: BTreeMap<String, u32>,
    /// Per-worker hour budget.
    pub working_hours: u32,
}

impl Plan {
    /// Creates a plan.
    pub fn new(
        workers: Vec<Worker>,
        outstanding: Vec<UnitTask>,
        requested: BTreeMap<String, u32>,
        working_hours: u32,
    ) -> Self {
        Self {
            workers,
            outstanding,
            requested,
            working_hours,
        }
    }

    /// Number of workers.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Number of placed units across all workers.
    pub fn assignment_count(&self) -> usize {
        self.workers.iter().map(|w| w.tasks.len()).sum()
    }

    /// Sum of requested counts.
    pub fn requested_count(&self) -> usize {
        self.requested.values().map(|&c| c as usize).sum()
    }

    /// Duration of every requested unit, placed or not (ms).
    pub fn total_ms(&self) -> i64 {
        let assigned: i64 = self.workers.iter().map(|w| w.assigned_ms()).sum();
        let outstanding: i64 = self.outstanding.iter().map(|u| u.duration_ms).sum();
        assigned + outstanding
    }

    /// Pool capacity for one day: N × H (ms).
    pub fn pool_capacity_ms(&self) -> i64 {
        self.worker_count() as i64 * self.working_hours as i64 * MS_PER_HOUR
    }

    /// Outstanding count per requested type (zero for fully placed types).
    pub fn outstanding_by_type(&self) -> BTreeMap<String, usize> {
        let mut by_type: BTreeMap<String, usize> =
            self.requested.keys().map(|k| (k.clone(), 0)).collect();
        for unit in &self.outstanding {
            *by_type.entry(unit.task_type.clone()).or_insert(0) += 1;
        }
        by_type
    }

    /// Utilization per worker id.
    pub fn all_utilizations(&self) -> BTreeMap<usize, f64> {
        self.workers
            .iter()
            .map(|w| (w.id, w.utilization()))
            .collect()
    }
}
