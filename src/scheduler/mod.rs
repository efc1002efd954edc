//! Caseload scheduling pipeline and workload metrics.
//!
//! # Pipeline
//!
//! 1. [`expand`] turns request lines into an ordered unit sequence.
//! 2. [`ReservationPolicy`] carves reservation blocks out of a fresh
//!    [`CapacityPool`].
//! 3. [`GreedyAllocator`] places units first-fit, priority tier first.
//! 4. [`WorkloadMetrics`] summarizes the resulting plan.
//!
//! [`CaseloadEngine`] runs all four for one [`ScheduleRequest`].
//!
//! # Algorithm
//!
//! The allocator is an order-preserving first-fit pass. It is not
//! optimal bin-packing, but it is deterministic: the same request always
//! yields the same plan.
//!
//! # References
//!
//! - Johnson (1974), "Fast algorithms for bin packing"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

mod allocator;
mod engine;
mod expander;
mod metrics;
mod pool;
mod reservation;

pub use allocator::GreedyAllocator;
pub use engine::{CaseloadEngine, ScheduleOutcome, ScheduleRequest};
pub use expander::expand;
pub use metrics::WorkloadMetrics;
pub use pool::CapacityPool;
pub use reservation::{ReservationPolicy, ReservationRule, WorkerSelector};
