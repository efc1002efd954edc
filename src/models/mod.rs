//! Caseload domain models.
//!
//! Provides the data types for a single day's allocation run:
//! the task catalog, request lines and unit tasks, workers with their
//! reservations and assignments, and the resulting plan.
//!
//! # Domain Mappings
//!
//! | u-caseload | Histopathology | Support desk | Warehouse |
//! |------------|----------------|--------------|-----------|
//! | TaskType | Specimen category | Ticket class | Pick type |
//! | UnitTask | Case | Ticket | Pick |
//! | Worker | Pathologists' assistant | Agent | Picker |
//! | Reservation | Autopsy / mid-day block | On-call block | Dock slot |

mod catalog;
mod plan;
mod task;
mod worker;

pub use catalog::{hours_to_ms, ms_to_hours, Catalog, TaskType, Tier, MS_PER_HOUR};
pub use plan::Plan;
pub use task::{TaskRequestLine, UnitTask};
pub use worker::{Assignment, Reservation, Worker};
