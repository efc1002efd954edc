//! Greedy first-fit allocator.
//!
//! # Algorithm
//!
//! 1. Split units into *general* units and *bound* units (types that own
//!    a reservation block in the pool). Order is preserved in both.
//! 2. General pass: each unit goes to the lowest-index worker, not
//!    withheld, whose general capacity still fits it. A unit that does not
//!    fit the current worker is tried against the next ones; the scan never
//!    gives up on the whole run.
//! 3. Overtime path: a general unit of a must-complete type that fits
//!    nowhere is placed on the least-loaded worker, the excess booked as
//!    overtime.
//! 4. Reserved pass: bound units fill their reservation blocks in worker
//!    order. They never touch general capacity.
//! 5. Everything else is outstanding.
//!
//! Items are never reordered by size. This is not optimal bin-packing;
//! it keeps priority order and reproducibility.
//!
//! # Complexity
//! O(U × N) where U = units, N = workers.
//!
//! # Reference
//! Johnson (1974), "Fast algorithms for bin packing" (First-Fit)

use tracing::debug;

use super::CapacityPool;
use crate::error::CapacityError;
use crate::models::UnitTask;

/// Order-preserving first-fit allocator.
///
/// # Example
///
/// ```
/// use u_caseload::models::{TaskType, UnitTask, MS_PER_HOUR};
/// use u_caseload::scheduler::{CapacityPool, GreedyAllocator};
///
/// let small = TaskType::priority("Priority Small", MS_PER_HOUR);
/// let units: Vec<UnitTask> = (0..5).map(|i| UnitTask::of(&small, i)).collect();
///
/// let mut pool = CapacityPool::new(1, 1);
/// let outstanding = GreedyAllocator::new().allocate(units, &mut pool).unwrap();
///
/// assert_eq!(pool.workers()[0].tasks.len(), 1);
/// assert_eq!(outstanding.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct GreedyAllocator {
    allow_overtime: bool,
}

impl GreedyAllocator {
    /// Creates an allocator with the overtime path enabled.
    pub fn new() -> Self {
        Self {
            allow_overtime: true,
        }
    }

    /// Enables or disables the overtime path.
    pub fn with_overtime(mut self, allow: bool) -> Self {
        self.allow_overtime = allow;
        self
    }

    /// Places `units` on `pool`; returns the outstanding units in
    /// expansion order.
    ///
    /// `pool` must already carry its reservations.
    pub fn allocate(
        &self,
        units: Vec<UnitTask>,
        pool: &mut CapacityPool,
    ) -> Result<Vec<UnitTask>, CapacityError> {
        let bound = pool.bound_types();
        let (reserved_units, general_units): (Vec<UnitTask>, Vec<UnitTask>) = units
            .into_iter()
            .partition(|u| bound.contains(&u.task_type));

        let mut outstanding = Vec::new();

        for unit in general_units {
            if let Some(index) = pool.first_fit(unit.duration_ms) {
                pool.consume(index, unit)?;
            } else if unit.must_complete_today && self.allow_overtime {
                match pool.least_loaded() {
                    Some(index) => pool.consume_overtime(index, unit)?,
                    None => outstanding.push(unit),
                }
            } else {
                outstanding.push(unit);
            }
        }

        for unit in reserved_units {
            match pool.first_fit_reserved(&unit.task_type, unit.duration_ms) {
                Some(index) => pool.consume_reserved(index, unit)?,
                None => outstanding.push(unit),
            }
        }

        outstanding.sort_by_key(|u| u.sequence);
        debug!(
            workers = pool.len(),
            outstanding = outstanding.len(),
            bound_types = bound.len(),
            "allocation pass complete"
        );
        Ok(outstanding)
    }
}

impl Default for GreedyAllocator {
    fn default() -> Self {
        Self::new()
    }
}
