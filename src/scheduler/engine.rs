//! Caseload engine.
//!
//! Runs the whole pipeline once per request:
//! validation → expansion → reservations → allocation → metrics.
//! `schedule` and `summarize` are views of the same single pass, so the
//! worker plan and the metrics can never disagree.
//!
//! The engine holds only immutable configuration. Each call builds its
//! own capacity pool; nothing survives between calls.

use std::collections::BTreeMap;

use tracing::debug;

use super::{expand, CapacityPool, GreedyAllocator, WorkloadMetrics};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::models::{Plan, TaskRequestLine, Worker};
use crate::validation::{validate_config, validate_request};

/// Input for one scheduling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    /// Requested task lines.
    pub lines: Vec<TaskRequestLine>,
    /// Number of workers (N).
    pub workers: usize,
    /// Per-worker hour budget (H).
    pub working_hours: u32,
}

impl ScheduleRequest {
    /// Creates a request with no task lines.
    pub fn new(workers: usize, working_hours: u32) -> Self {
        Self {
            lines: Vec::new(),
            workers,
            working_hours,
        }
    }

    /// Adds a request line.
    pub fn with_line(mut self, line: TaskRequestLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Adds `count` units of `task_type`.
    pub fn with_task(self, task_type: impl Into<String>, count: u32) -> Self {
        self.with_line(TaskRequestLine::new(task_type, count))
    }

    /// Requested count per task type.
    pub fn requested(&self) -> BTreeMap<String, u32> {
        self.lines
            .iter()
            .map(|l| (l.task_type.clone(), l.count))
            .collect()
    }
}

/// Plan and metrics from one allocation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleOutcome {
    /// Per-worker assignment.
    pub plan: Plan,
    /// Aggregate figures derived from `plan`.
    pub metrics: WorkloadMetrics,
}

/// Deterministic single-day caseload scheduler.
///
/// # Example
///
/// ```
/// use u_caseload::scheduler::{CaseloadEngine, ScheduleRequest};
///
/// let engine = CaseloadEngine::standard();
/// let request = ScheduleRequest::new(4, 7)
///     .with_task("Priority Breast", 3)
///     .with_task("Routine Small", 40);
///
/// let outcome = engine.run(&request).unwrap();
/// // Worker 1 is the 4th from last: out on autopsy.
/// assert!(outcome.plan.workers[0].tasks.is_empty());
/// assert_eq!(outcome.metrics.total_tasks, 43);
/// ```
#[derive(Debug, Clone)]
pub struct CaseloadEngine {
    config: EngineConfig,
    allocator: GreedyAllocator,
}

impl CaseloadEngine {
    /// Creates an engine, validating the configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        validate_config(&config).map_err(Error::InvalidConfig)?;
        Ok(Self {
            config,
            allocator: GreedyAllocator::new(),
        })
    }

    /// Engine with the built-in catalog and reservation rules.
    pub fn standard() -> Self {
        Self {
            config: EngineConfig::default(),
            allocator: GreedyAllocator::new(),
        }
    }

    /// Replaces the allocator (e.g. to disable overtime).
    pub fn with_allocator(mut self, allocator: GreedyAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs one allocation pass, returning plan and metrics.
    pub fn run(&self, request: &ScheduleRequest) -> Result<ScheduleOutcome> {
        let plan = self.plan(request)?;
        let metrics = WorkloadMetrics::calculate(&plan);
        debug!(
            total_tasks = metrics.total_tasks,
            outstanding = metrics.outstanding_tasks,
            overtime_ms = metrics.overtime_ms,
            estimated_days = metrics.estimated_days,
            "schedule computed"
        );
        Ok(ScheduleOutcome { plan, metrics })
    }

    /// Builds the per-worker plan.
    pub fn plan(&self, request: &ScheduleRequest) -> Result<Plan> {
        validate_request(request, &self.config.catalog, &self.config.limits)
            .map_err(Error::Validation)?;

        let units = expand(&request.lines, &self.config.catalog).map_err(Error::Validation)?;
        debug!(
            workers = request.workers,
            working_hours = request.working_hours,
            units = units.len(),
            "scheduling request"
        );

        let mut pool = CapacityPool::new(request.workers, request.working_hours);
        self.config.reservations.apply(&mut pool)?;
        let outstanding = self.allocator.allocate(units, &mut pool)?;

        Ok(Plan::new(
            pool.into_workers(),
            outstanding,
            request.requested(),
            request.working_hours,
        ))
    }

    /// Per-worker assignment only.
    pub fn schedule(&self, request: &ScheduleRequest) -> Result<Vec<Worker>> {
        Ok(self.run(request)?.plan.workers)
    }

    /// Metrics only.
    pub fn summarize(&self, request: &ScheduleRequest) -> Result<WorkloadMetrics> {
        Ok(self.run(request)?.metrics)
    }
}

impl Default for CaseloadEngine {
    fn default() -> Self {
        Self::standard()
    }
}
