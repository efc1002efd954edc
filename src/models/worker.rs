//! Worker model.
//!
//! A worker has a nominal daily capacity split three ways:
//! general capacity open to any task type, reservation blocks carved
//! out before allocation, and (only through the overtime path) hours
//! beyond nominal capacity.
//!
//! Workers are created fresh for every scheduling run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ms_to_hours, UnitTask};

/// A capacity block withheld from general allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Purpose label (e.g. "Autopsy", "Mid-day").
    pub label: String,
    /// Task type allowed to consume the block. `None` = withheld from
    /// every task type.
    pub task_type: Option<String>,
    /// Reserved capacity (ms).
    pub capacity_ms: i64,
    /// Capacity consumed by the bound task type (ms).
    pub used_ms: i64,
}

impl Reservation {
    /// Creates an unused reservation.
    pub fn new(label: impl Into<String>, task_type: Option<String>, capacity_ms: i64) -> Self {
        Self {
            label: label.into(),
            task_type,
            capacity_ms,
            used_ms: 0,
        }
    }

    /// Unconsumed capacity (ms).
    #[inline]
    pub fn remaining_ms(&self) -> i64 {
        self.capacity_ms - self.used_ms
    }

    /// Whether units of `task_type` may draw from this block.
    pub fn accepts(&self, task_type: &str) -> bool {
        self.task_type.as_deref() == Some(task_type)
    }

    /// Whether the block is withheld from all task types.
    pub fn is_withholding(&self) -> bool {
        self.task_type.is_none()
    }
}

/// A unit task placed on a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// The placed unit.
    pub unit: UnitTask,
    /// Portion of the unit beyond the worker's nominal capacity (ms).
    pub overtime_ms: i64,
    /// Label of the reservation the unit was drawn from, if any.
    pub reservation: Option<String>,
}

impl Assignment {
    /// A unit placed within general capacity.
    pub fn general(unit: UnitTask) -> Self {
        Self {
            unit,
            overtime_ms: 0,
            reservation: None,
        }
    }

    /// A unit placed with `overtime_ms` beyond nominal capacity.
    pub fn overtime(unit: UnitTask, overtime_ms: i64) -> Self {
        Self {
            unit,
            overtime_ms,
            reservation: None,
        }
    }

    /// A unit drawn from the reservation labelled `label`.
    pub fn reserved(unit: UnitTask, label: impl Into<String>) -> Self {
        Self {
            unit,
            overtime_ms: 0,
            reservation: Some(label.into()),
        }
    }

    /// Task type name.
    #[inline]
    pub fn task_type(&self) -> &str {
        &self.unit.task_type
    }

    /// Unit duration (ms).
    #[inline]
    pub fn duration_ms(&self) -> i64 {
        self.unit.duration_ms
    }
}

/// A worker and its assigned tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Ordinal identifier (1..=N).
    pub id: usize,
    /// Nominal daily capacity (ms).
    pub capacity_ms: i64,
    /// General capacity still open to any task type (ms).
    pub remaining_ms: i64,
    /// Reservation blocks, in the order they were carved.
    pub reservations: Vec<Reservation>,
    /// Assigned units, in assignment order.
    pub tasks: Vec<Assignment>,
}

impl Worker {
    /// Creates an idle worker with full capacity.
    pub fn new(id: usize, capacity_ms: i64) -> Self {
        Self {
            id,
            capacity_ms,
            remaining_ms: capacity_ms,
            reservations: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Total duration of assigned units (ms), overtime included.
    pub fn assigned_ms(&self) -> i64 {
        self.tasks.iter().map(|a| a.duration_ms()).sum()
    }

    /// Hours booked beyond nominal capacity (ms).
    pub fn overtime_ms(&self) -> i64 {
        self.tasks.iter().map(|a| a.overtime_ms).sum()
    }

    /// Capacity held by reservations, used or not (ms).
    pub fn reserved_ms(&self) -> i64 {
        self.reservations.iter().map(|r| r.capacity_ms).sum()
    }

    /// Capacity withheld from every task type (ms).
    pub fn withheld_ms(&self) -> i64 {
        self.reservations
            .iter()
            .filter(|r| r.is_withholding())
            .map(|r| r.capacity_ms)
            .sum()
    }

    /// Whether the whole nominal capacity is withheld from assignment.
    pub fn is_withheld(&self) -> bool {
        self.capacity_ms > 0 && self.withheld_ms() >= self.capacity_ms
    }

    /// Per-type unit counts, derived from the task list.
    pub fn case_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for a in &self.tasks {
            *counts.entry(a.task_type().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Busy fraction of nominal capacity: (assigned + withheld) / capacity.
    ///
    /// Values above 1.0 indicate overtime.
    pub fn utilization(&self) -> f64 {
        if self.capacity_ms <= 0 {
            return 0.0;
        }
        (self.assigned_ms() + self.withheld_ms()) as f64 / self.capacity_ms as f64
    }

    /// Assigned hours.
    pub fn assigned_hours(&self) -> f64 {
        ms_to_hours(self.assigned_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskType, MS_PER_HOUR};

    fn unit(name: &str, ms: i64, seq: usize) -> UnitTask {
        UnitTask::of(&TaskType::priority(name, ms), seq)
    }

    #[test]
    fn test_new_worker() {
        let w = Worker::new(1, 7 * MS_PER_HOUR);
        assert_eq!(w.id, 1);
        assert_eq!(w.remaining_ms, 7 * MS_PER_HOUR);
        assert_eq!(w.assigned_ms(), 0);
        assert!(!w.is_withheld());
        assert!(w.case_counts().is_empty());
    }

    #[test]
    fn test_case_counts_derived() {
        let mut w = Worker::new(1, 7 * MS_PER_HOUR);
        w.tasks.push(Assignment::general(unit("A", 1000, 0)));
        w.tasks.push(Assignment::general(unit("A", 1000, 1)));
        w.tasks.push(Assignment::general(unit("B", 2000, 2)));

        let counts = w.case_counts();
        assert_eq!(counts["A"], 2);
        assert_eq!(counts["B"], 1);
        assert_eq!(w.assigned_ms(), 4000);
    }

    #[test]
    fn test_withheld_worker() {
        let mut w = Worker::new(4, 7 * MS_PER_HOUR);
        w.reservations
            .push(Reservation::new("Autopsy", None, 7 * MS_PER_HOUR));
        assert!(w.is_withheld());
        assert!((w.utilization() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_bound_reservation_not_withheld() {
        let mut w = Worker::new(2, 7 * MS_PER_HOUR);
        w.reservations.push(Reservation::new(
            "Mid-day",
            Some("Priority Small - Mid-day".into()),
            3 * MS_PER_HOUR,
        ));
        assert!(!w.is_withheld());
        assert_eq!(w.reserved_ms(), 3 * MS_PER_HOUR);
        assert_eq!(w.withheld_ms(), 0);
        assert!(w.reservations[0].accepts("Priority Small - Mid-day"));
        assert!(!w.reservations[0].accepts("Priority Small"));
    }

    #[test]
    fn test_overtime_and_utilization() {
        let mut w = Worker::new(1, MS_PER_HOUR);
        w.tasks.push(Assignment::general(unit("A", MS_PER_HOUR, 0)));
        w.tasks
            .push(Assignment::overtime(unit("A", MS_PER_HOUR / 2, 1), MS_PER_HOUR / 2));
        assert_eq!(w.overtime_ms(), MS_PER_HOUR / 2);
        assert!((w.utilization() - 1.5).abs() < 1e-10);
        assert!((w.assigned_hours() - 1.5).abs() < 1e-10);
    }

    #[test]
    fn test_reservation_remaining() {
        let mut r = Reservation::new("Mid-day", Some("X".into()), 1000);
        r.used_ms = 400;
        assert_eq!(r.remaining_ms(), 600);
        assert!(!r.is_withholding());
    }
}
