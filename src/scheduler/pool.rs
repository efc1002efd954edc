//! Capacity pool.
//!
//! Owns the workers of one scheduling run and is the only place their
//! capacity counters change. Every mutation is checked: asking for more
//! than remains is a [`CapacityError`], never a silent clamp.
//!
//! # Lifecycle
//! 1. `new`: N workers at full capacity.
//! 2. `reserve`: carve reservation blocks (reservation policy).
//! 3. `consume*`: place units (allocator). The first consume seals the
//!    pool; later `reserve` calls fail.
//! 4. `into_workers`: hand the workers to the plan.

use std::collections::BTreeSet;

use tracing::trace;

use crate::error::CapacityError;
use crate::models::{Assignment, Reservation, UnitTask, Worker, MS_PER_HOUR};

/// Workers and their capacity for one run.
#[derive(Debug, Clone)]
pub struct CapacityPool {
    workers: Vec<Worker>,
    capacity_ms: i64,
    sealed: bool,
}

impl CapacityPool {
    /// Creates `workers` workers with `working_hours` each.
    pub fn new(workers: usize, working_hours: u32) -> Self {
        let capacity_ms = working_hours as i64 * MS_PER_HOUR;
        Self {
            workers: (1..=workers).map(|id| Worker::new(id, capacity_ms)).collect(),
            capacity_ms,
            sealed: false,
        }
    }

    /// Number of workers.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Whether the pool has no workers.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Nominal per-worker capacity (ms).
    pub fn capacity_ms(&self) -> i64 {
        self.capacity_ms
    }

    /// Read access to the workers.
    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// General capacity remaining on worker `index` (ms).
    pub fn remaining(&self, index: usize) -> Result<i64, CapacityError> {
        Ok(self.worker(index)?.remaining_ms)
    }

    /// Whether worker `index` is withheld from all assignment.
    pub fn is_withheld(&self, index: usize) -> Result<bool, CapacityError> {
        Ok(self.worker(index)?.is_withheld())
    }

    /// Carves a reservation block out of worker `index`'s general capacity.
    ///
    /// `task_type = None` withholds the block from every task type.
    pub fn reserve(
        &mut self,
        index: usize,
        capacity_ms: i64,
        label: &str,
        task_type: Option<&str>,
    ) -> Result<(), CapacityError> {
        if self.sealed {
            return Err(CapacityError::Sealed);
        }
        let worker = self.worker_mut(index)?;
        if capacity_ms > worker.remaining_ms {
            return Err(CapacityError::Exceeded {
                worker: worker.id,
                requested_ms: capacity_ms,
                remaining_ms: worker.remaining_ms,
            });
        }
        worker.remaining_ms -= capacity_ms;
        worker.reservations.push(Reservation::new(
            label,
            task_type.map(str::to_string),
            capacity_ms,
        ));
        Ok(())
    }

    /// Places `unit` within worker `index`'s general capacity.
    pub fn consume(&mut self, index: usize, unit: UnitTask) -> Result<(), CapacityError> {
        self.sealed = true;
        let worker = self.worker_mut(index)?;
        if worker.is_withheld() {
            return Err(CapacityError::Withheld { worker: worker.id });
        }
        if unit.duration_ms > worker.remaining_ms {
            return Err(CapacityError::Exceeded {
                worker: worker.id,
                requested_ms: unit.duration_ms,
                remaining_ms: worker.remaining_ms,
            });
        }
        worker.remaining_ms -= unit.duration_ms;
        worker.tasks.push(Assignment::general(unit));
        Ok(())
    }

    /// Places `unit` on worker `index` beyond its general capacity.
    ///
    /// Uses whatever general capacity remains; the excess is booked as
    /// overtime on the assignment. This is the only path that lets a
    /// worker exceed nominal capacity.
    pub fn consume_overtime(&mut self, index: usize, unit: UnitTask) -> Result<(), CapacityError> {
        self.sealed = true;
        let worker = self.worker_mut(index)?;
        if worker.is_withheld() {
            return Err(CapacityError::Withheld { worker: worker.id });
        }
        let covered = unit.duration_ms.min(worker.remaining_ms);
        let overtime_ms = unit.duration_ms - covered;
        worker.remaining_ms -= covered;
        trace!(
            worker = worker.id,
            task_type = %unit.task_type,
            overtime_ms,
            "overtime booked"
        );
        worker.tasks.push(Assignment::overtime(unit, overtime_ms));
        Ok(())
    }

    /// Places `unit` into a reservation block bound to its task type.
    pub fn consume_reserved(&mut self, index: usize, unit: UnitTask) -> Result<(), CapacityError> {
        self.sealed = true;
        let worker = self.worker_mut(index)?;
        let worker_id = worker.id;
        let block = worker
            .reservations
            .iter_mut()
            .find(|r| r.accepts(&unit.task_type) && r.remaining_ms() >= unit.duration_ms)
            .ok_or_else(|| CapacityError::NoReservation {
                worker: worker_id,
                task_type: unit.task_type.clone(),
                requested_ms: unit.duration_ms,
            })?;
        block.used_ms += unit.duration_ms;
        let label = block.label.clone();
        worker.tasks.push(Assignment::reserved(unit, label));
        Ok(())
    }

    /// Lowest-index worker, not withheld, with `duration_ms` of general
    /// capacity free.
    pub fn first_fit(&self, duration_ms: i64) -> Option<usize> {
        self.workers
            .iter()
            .position(|w| !w.is_withheld() && w.remaining_ms >= duration_ms)
    }

    /// Lowest-index worker with a `task_type` reservation that has
    /// `duration_ms` free.
    pub fn first_fit_reserved(&self, task_type: &str, duration_ms: i64) -> Option<usize> {
        self.workers.iter().position(|w| {
            w.reservations
                .iter()
                .any(|r| r.accepts(task_type) && r.remaining_ms() >= duration_ms)
        })
    }

    /// Non-withheld worker with the most general capacity left
    /// (lowest index on ties). Overtime lands here.
    pub fn least_loaded(&self) -> Option<usize> {
        let mut best: Option<(usize, i64)> = None;
        for (index, w) in self.workers.iter().enumerate() {
            if w.is_withheld() {
                continue;
            }
            match best {
                Some((_, best_free)) if w.remaining_ms <= best_free => {}
                _ => best = Some((index, w.remaining_ms)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Task types that own at least one reservation block.
    pub fn bound_types(&self) -> BTreeSet<String> {
        self.workers
            .iter()
            .flat_map(|w| w.reservations.iter())
            .filter_map(|r| r.task_type.clone())
            .collect()
    }

    /// Consumes the pool, returning its workers.
    pub fn into_workers(self) -> Vec<Worker> {
        self.workers
    }

    fn worker(&self, index: usize) -> Result<&Worker, CapacityError> {
        let len = self.workers.len();
        self.workers
            .get(index)
            .ok_or(CapacityError::UnknownWorker { index, len })
    }

    fn worker_mut(&mut self, index: usize) -> Result<&mut Worker, CapacityError> {
        let len = self.workers.len();
        self.workers
            .get_mut(index)
            .ok_or(CapacityError::UnknownWorker { index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskType;

    const HOUR: i64 = MS_PER_HOUR;

    fn unit(name: &str, ms: i64) -> UnitTask {
        UnitTask::of(&TaskType::priority(name, ms), 0)
    }

    #[test]
    fn test_new_pool() {
        let pool = CapacityPool::new(3, 7);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.capacity_ms(), 7 * HOUR);
        for i in 0..3 {
            assert_eq!(pool.remaining(i).unwrap(), 7 * HOUR);
        }
        assert_eq!(pool.workers()[2].id, 3);
    }

    #[test]
    fn test_consume_within_capacity() {
        let mut pool = CapacityPool::new(1, 2);
        pool.consume(0, unit("A", HOUR)).unwrap();
        pool.consume(0, unit("A", HOUR)).unwrap();
        assert_eq!(pool.remaining(0).unwrap(), 0);

        let err = pool.consume(0, unit("A", 1)).unwrap_err();
        assert_eq!(
            err,
            CapacityError::Exceeded {
                worker: 1,
                requested_ms: 1,
                remaining_ms: 0
            }
        );
        assert_eq!(pool.workers()[0].tasks.len(), 2);
    }

    #[test]
    fn test_unknown_worker() {
        let mut pool = CapacityPool::new(2, 7);
        assert_eq!(
            pool.remaining(5).unwrap_err(),
            CapacityError::UnknownWorker { index: 5, len: 2 }
        );
        assert!(pool.consume(2, unit("A", 1)).is_err());
    }

    #[test]
    fn test_reserve_then_consume() {
        let mut pool = CapacityPool::new(1, 7);
        pool.reserve(0, 3 * HOUR, "Mid-day", Some("M")).unwrap();
        assert_eq!(pool.remaining(0).unwrap(), 4 * HOUR);

        // General units cannot use the block.
        assert!(pool.consume(0, unit("A", 5 * HOUR)).is_err());
        pool.consume(0, unit("A", 4 * HOUR)).unwrap();

        // Bound units can.
        pool.consume_reserved(0, unit("M", 2 * HOUR)).unwrap();
        let err = pool.consume_reserved(0, unit("M", 2 * HOUR)).unwrap_err();
        assert!(matches!(err, CapacityError::NoReservation { .. }));
        assert!(matches!(
            pool.consume_reserved(0, unit("A", 1)).unwrap_err(),
            CapacityError::NoReservation { .. }
        ));

        let w = &pool.workers()[0];
        assert_eq!(w.reservations[0].used_ms, 2 * HOUR);
        assert_eq!(w.tasks[1].reservation.as_deref(), Some("Mid-day"));
    }

    #[test]
    fn test_reserve_after_consume_is_sealed() {
        let mut pool = CapacityPool::new(1, 7);
        pool.consume(0, unit("A", HOUR)).unwrap();
        assert_eq!(
            pool.reserve(0, HOUR, "late", None).unwrap_err(),
            CapacityError::Sealed
        );
    }

    #[test]
    fn test_reserve_more_than_remaining() {
        let mut pool = CapacityPool::new(1, 2);
        assert!(matches!(
            pool.reserve(0, 3 * HOUR, "too big", None).unwrap_err(),
            CapacityError::Exceeded { .. }
        ));
        assert_eq!(pool.remaining(0).unwrap(), 2 * HOUR);
    }

    #[test]
    fn test_withheld_worker_rejects_units() {
        let mut pool = CapacityPool::new(2, 7);
        pool.reserve(0, 7 * HOUR, "Autopsy", None).unwrap();
        assert!(pool.is_withheld(0).unwrap());
        assert_eq!(pool.first_fit(HOUR), Some(1));
        assert_eq!(
            pool.consume(0, unit("A", HOUR)).unwrap_err(),
            CapacityError::Withheld { worker: 1 }
        );
        assert_eq!(
            pool.consume_overtime(0, unit("A", HOUR)).unwrap_err(),
            CapacityError::Withheld { worker: 1 }
        );
    }

    #[test]
    fn test_first_fit_skips_full_workers() {
        let mut pool = CapacityPool::new(3, 2);
        pool.consume(0, unit("A", 2 * HOUR)).unwrap();
        pool.consume(1, unit("A", HOUR + HOUR / 2)).unwrap();
        assert_eq!(pool.first_fit(HOUR), Some(2));
        assert_eq!(pool.first_fit(HOUR / 2), Some(1));
        assert_eq!(pool.first_fit(3 * HOUR), None);
    }

    #[test]
    fn test_consume_overtime() {
        let mut pool = CapacityPool::new(1, 1);
        pool.consume(0, unit("A", HOUR / 2)).unwrap();
        pool.consume_overtime(0, unit("B", HOUR)).unwrap();
        let w = &pool.workers()[0];
        assert_eq!(w.remaining_ms, 0);
        assert_eq!(w.tasks[1].overtime_ms, HOUR / 2);
        assert_eq!(w.overtime_ms(), HOUR / 2);
    }

    #[test]
    fn test_least_loaded() {
        let mut pool = CapacityPool::new(3, 4);
        pool.reserve(2, 4 * HOUR, "Autopsy", None).unwrap();
        pool.consume(0, unit("A", HOUR)).unwrap();
        pool.consume(1, unit("A", 2 * HOUR)).unwrap();
        assert_eq!(pool.least_loaded(), Some(0));

        pool.consume(0, unit("A", HOUR)).unwrap();
        // Tie at 2h free: lowest index wins.
        assert_eq!(pool.least_loaded(), Some(0));
    }

    #[test]
    fn test_bound_types() {
        let mut pool = CapacityPool::new(3, 7);
        pool.reserve(0, 7 * HOUR, "Autopsy", None).unwrap();
        pool.reserve(1, 3 * HOUR, "Mid-day", Some("M")).unwrap();
        pool.reserve(2, 3 * HOUR, "Mid-day", Some("M")).unwrap();
        let bound = pool.bound_types();
        assert_eq!(bound.len(), 1);
        assert!(bound.contains("M"));
        assert_eq!(pool.first_fit_reserved("M", HOUR), Some(1));
        assert_eq!(pool.first_fit_reserved("X", HOUR), None);
    }
}
