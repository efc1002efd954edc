//! Workload metrics.
//!
//! Computes backlog and workload figures from a completed plan.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total tasks | Sum of requested counts |
//! | Total hours | Duration of every requested unit, placed or not |
//! | Estimated days | ceil(total / (N × H)), at least 1 when work exists |
//! | Outstanding | Units that fit nowhere, per type |
//! | Outstanding hours | Duration of outstanding units, per type |
//! | Overtime | Hours booked beyond nominal capacity, per type |
//! | Avg utilization | Mean worker busyness (withheld hours count as busy) |
//!
//! A unit is either outstanding or placed; only placed units can carry
//! overtime, so nothing is counted twice.

use std::collections::BTreeMap;

use crate::models::{ms_to_hours, Plan};

/// Aggregate workload figures for one plan.
///
/// Durations are in milliseconds; see the `*_hours` accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadMetrics {
    /// Sum of requested counts.
    pub total_tasks: usize,
    /// Duration of all requested units (ms).
    pub total_ms: i64,
    /// Days needed for the whole request at full pool capacity.
    pub estimated_days: u64,
    /// Units left unplaced.
    pub outstanding_tasks: usize,
    /// Unplaced units per requested type.
    pub outstanding_by_type: BTreeMap<String, usize>,
    /// Duration of unplaced units (ms).
    pub outstanding_ms: i64,
    /// Duration of unplaced units per requested type (ms).
    pub outstanding_ms_by_type: BTreeMap<String, i64>,
    /// Hours beyond nominal capacity (ms).
    pub overtime_ms: i64,
    /// Overtime per requested type (ms).
    pub overtime_ms_by_type: BTreeMap<String, i64>,
    /// Mean worker utilization.
    pub avg_utilization: f64,
}

impl WorkloadMetrics {
    /// Computes metrics from a plan.
    pub fn calculate(plan: &Plan) -> Self {
        let total_tasks = plan.requested_count();
        let total_ms = plan.total_ms();

        let outstanding_by_type = plan.outstanding_by_type();
        let mut outstanding_ms_by_type: BTreeMap<String, i64> =
            plan.requested.keys().map(|k| (k.clone(), 0)).collect();
        for unit in &plan.outstanding {
            *outstanding_ms_by_type
                .entry(unit.task_type.clone())
                .or_insert(0) += unit.duration_ms;
        }
        let outstanding_ms = outstanding_ms_by_type.values().sum();

        let mut overtime_ms_by_type: BTreeMap<String, i64> =
            plan.requested.keys().map(|k| (k.clone(), 0)).collect();
        for a in plan.workers.iter().flat_map(|w| w.tasks.iter()) {
            if a.overtime_ms > 0 {
                *overtime_ms_by_type
                    .entry(a.task_type().to_string())
                    .or_insert(0) += a.overtime_ms;
            }
        }
        let overtime_ms = overtime_ms_by_type.values().sum();

        let utilizations = plan.all_utilizations();
        let avg_utilization = if utilizations.is_empty() {
            0.0
        } else {
            utilizations.values().sum::<f64>() / utilizations.len() as f64
        };

        Self {
            total_tasks,
            total_ms,
            estimated_days: estimated_days(total_tasks, total_ms, plan.pool_capacity_ms()),
            outstanding_tasks: plan.outstanding.len(),
            outstanding_by_type,
            outstanding_ms,
            outstanding_ms_by_type,
            overtime_ms,
            overtime_ms_by_type,
            avg_utilization,
        }
    }

    /// Total hours.
    pub fn total_hours(&self) -> f64 {
        ms_to_hours(self.total_ms)
    }

    /// Outstanding hours.
    pub fn outstanding_hours(&self) -> f64 {
        ms_to_hours(self.outstanding_ms)
    }

    /// Overtime hours.
    pub fn overtime_hours(&self) -> f64 {
        ms_to_hours(self.overtime_ms)
    }

    /// Whether every requested unit was placed.
    pub fn is_cleared(&self) -> bool {
        self.outstanding_tasks == 0
    }
}

/// `ceil(total / capacity)`, floored at 1 when any task exists, 0 otherwise.
fn estimated_days(total_tasks: usize, total_ms: i64, capacity_ms: i64) -> u64 {
    if total_tasks == 0 {
        return 0;
    }
    if capacity_ms <= 0 {
        return 1;
    }
    let days = (total_ms + capacity_ms - 1) / capacity_ms;
    days.max(1) as u64
}
