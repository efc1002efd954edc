//! Daily caseload allocation.
//!
//! Assigns a day's batch of categorized work units to a fixed pool of
//! workers, each with an hourly budget, and reports the backlog that
//! does not fit. Allocation is deterministic: the same request always
//! produces the same plan.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TaskType`, `Catalog`, `UnitTask`,
//!   `Worker`, `Reservation`, `Plan`
//! - **`scheduler`**: Expansion, reservations, first-fit allocation,
//!   metrics, and the `CaseloadEngine` facade
//! - **`validation`**: Request and configuration checks
//! - **`config`**: TOML engine configuration
//! - **`wire`**: JSON request/response bodies
//! - **`error`**: Crate error type
//!
//! # Example
//!
//! ```
//! use u_caseload::scheduler::{CaseloadEngine, ScheduleRequest};
//!
//! let engine = CaseloadEngine::standard();
//! let request = ScheduleRequest::new(5, 7).with_task("Priority Small", 120);
//! let metrics = engine.summarize(&request).unwrap();
//!
//! assert_eq!(metrics.total_tasks, 120);
//! assert_eq!(metrics.estimated_days, 1);
//! ```
//!
//! # References
//!
//! - Johnson (1974), "Fast algorithms for bin packing"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;
pub mod wire;

pub use error::{Error, Result};
