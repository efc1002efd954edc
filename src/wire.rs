//! JSON request/response contract.
//!
//! Field names follow the caller's contract (`availablePeople`,
//! `workingHours`, `outstandingByType`, ...). Numbers arrive as raw JSON
//! numbers so that fractional or negative values become validation
//! errors instead of parse failures.
//!
//! Hour figures are rounded to 2 decimals, except per-task `hours`,
//! which carry the catalog duration unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;

use crate::models::{ms_to_hours, Assignment, Plan, Reservation, TaskRequestLine, Tier, Worker};
use crate::scheduler::{ScheduleOutcome, ScheduleRequest, WorkloadMetrics};
use crate::validation::{ValidationError, ValidationErrorKind};

// ==================== Request ====================

/// Incoming scheduling request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(default)]
    pub tasks: Vec<TaskLineBody>,
    #[serde(default = "default_available_people")]
    pub available_people: Number,
    #[serde(default = "default_working_hours")]
    pub working_hours: Number,
}

/// One `{name, count, category}` line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskLineBody {
    pub name: String,
    pub count: Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

fn default_available_people() -> Number {
    Number::from(1)
}

fn default_working_hours() -> Number {
    Number::from(7)
}

/// Integer value of a JSON number; `None` for fractional values.
///
/// `i128` holds every JSON integer serde_json can produce, so nothing
/// is clamped before the range checks.
fn integer(n: &Number) -> Option<i128> {
    if let Some(i) = n.as_i64() {
        return Some(i128::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(i128::from(u));
    }
    n.as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i128)
}

impl RequestBody {
    /// Converts the body into an engine request.
    ///
    /// Reports every wire-level problem (fractions, negative or
    /// oversized numbers, unknown categories) at once. Range checks
    /// against the configured limits happen later, in the engine.
    pub fn to_request(&self) -> Result<ScheduleRequest, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let workers = match integer(&self.available_people) {
            Some(n) if n < 0 => 0,
            Some(n) => usize::try_from(n).unwrap_or_else(|_| {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidWorkerCount,
                    format!("Available people is out of range (got {n})"),
                ));
                0
            }),
            None => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::NotAnInteger,
                    format!("Available people must be an integer (got {})", self.available_people),
                ));
                0
            }
        };

        let working_hours = match integer(&self.working_hours) {
            Some(h) if h < 0 => 0,
            Some(h) => u32::try_from(h).unwrap_or_else(|_| {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidWorkingHours,
                    format!("Working hours is out of range (got {h})"),
                ));
                0
            }),
            None => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::NotAnInteger,
                    format!("Working hours must be an integer (got {})", self.working_hours),
                ));
                0
            }
        };

        let mut request = ScheduleRequest::new(workers, working_hours);
        for line in &self.tasks {
            match line.to_line() {
                Ok(l) => request = request.with_line(l),
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(request)
        } else {
            Err(errors)
        }
    }
}

impl TaskLineBody {
    fn to_line(&self) -> Result<TaskRequestLine, ValidationError> {
        let count = match integer(&self.count) {
            Some(c) if c < 0 => {
                return Err(ValidationError::new(
                    ValidationErrorKind::NegativeCount,
                    format!("Count for '{}' must not be negative (got {c})", self.name),
                ))
            }
            Some(c) => u32::try_from(c).map_err(|_| {
                ValidationError::new(
                    ValidationErrorKind::CountTooLarge,
                    format!("Count for '{}' is too large (got {c})", self.name),
                )
            })?,
            None => {
                return Err(ValidationError::new(
                    ValidationErrorKind::NotAnInteger,
                    format!("Count for '{}' must be an integer (got {})", self.name, self.count),
                ))
            }
        };

        let mut line = TaskRequestLine::new(self.name.clone(), count);
        if let Some(category) = &self.category {
            let tier: Tier = category.parse().map_err(|_| {
                ValidationError::new(
                    ValidationErrorKind::CategoryMismatch,
                    format!("Unknown category '{}' for '{}'", category, self.name),
                )
            })?;
            line = line.with_tier(tier);
        }
        Ok(line)
    }
}

// ==================== Response ====================

fn round2(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// A placed unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskBody {
    pub name: String,
    pub hours: f64,
}

impl From<&Assignment> for TaskBody {
    fn from(a: &Assignment) -> Self {
        Self {
            name: a.task_type().to_string(),
            hours: ms_to_hours(a.duration_ms()),
        }
    }
}

/// A reservation block and how much of it was used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationBody {
    pub label: String,
    pub hours: f64,
    pub used: f64,
}

impl From<&Reservation> for ReservationBody {
    fn from(r: &Reservation) -> Self {
        Self {
            label: r.label.clone(),
            hours: round2(ms_to_hours(r.capacity_ms)),
            used: round2(ms_to_hours(r.used_ms)),
        }
    }
}

/// One worker's assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeBody {
    pub id: usize,
    pub tasks: Vec<TaskBody>,
    pub case_counts: BTreeMap<String, usize>,
    pub hours: f64,
    pub reservations: Vec<ReservationBody>,
    pub overtime: f64,
}

impl From<&Worker> for EmployeeBody {
    fn from(w: &Worker) -> Self {
        Self {
            id: w.id,
            tasks: w.tasks.iter().map(TaskBody::from).collect(),
            case_counts: w.case_counts(),
            hours: round2(w.assigned_hours()),
            reservations: w.reservations.iter().map(ReservationBody::from).collect(),
            overtime: round2(ms_to_hours(w.overtime_ms())),
        }
    }
}

/// Response of the `schedule` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleBody {
    pub employees: Vec<EmployeeBody>,
    /// Outstanding units per requested type.
    pub outstanding: BTreeMap<String, usize>,
}

impl From<&Plan> for ScheduleBody {
    fn from(plan: &Plan) -> Self {
        Self {
            employees: plan.workers.iter().map(EmployeeBody::from).collect(),
            outstanding: plan.outstanding_by_type(),
        }
    }
}

/// Response of the `summary` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryBody {
    pub total_tasks: usize,
    pub total_hours: f64,
    pub estimated_days: u64,
    pub outstanding_tasks: usize,
    pub outstanding_by_type: BTreeMap<String, usize>,
    pub outstanding_hours: f64,
    pub outstanding_hours_by_type: BTreeMap<String, f64>,
    pub overtime: f64,
    pub overtime_by_type: BTreeMap<String, f64>,
    pub average_utilization: f64,
}

fn hours_map(ms: &BTreeMap<String, i64>) -> BTreeMap<String, f64> {
    ms.iter()
        .map(|(k, &v)| (k.clone(), round2(ms_to_hours(v))))
        .collect()
}

impl From<&WorkloadMetrics> for SummaryBody {
    fn from(m: &WorkloadMetrics) -> Self {
        Self {
            total_tasks: m.total_tasks,
            total_hours: round2(m.total_hours()),
            estimated_days: m.estimated_days,
            outstanding_tasks: m.outstanding_tasks,
            outstanding_by_type: m.outstanding_by_type.clone(),
            outstanding_hours: round2(m.outstanding_hours()),
            outstanding_hours_by_type: hours_map(&m.outstanding_ms_by_type),
            overtime: round2(m.overtime_hours()),
            overtime_by_type: hours_map(&m.overtime_ms_by_type),
            average_utilization: round2(m.avg_utilization),
        }
    }
}

/// Response of the `plan` operation: schedule and summary from one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanBody {
    pub employees: Vec<EmployeeBody>,
    pub outstanding: BTreeMap<String, usize>,
    pub summary: SummaryBody,
}

impl From<&ScheduleOutcome> for PlanBody {
    fn from(outcome: &ScheduleOutcome) -> Self {
        let schedule = ScheduleBody::from(&outcome.plan);
        Self {
            employees: schedule.employees,
            outstanding: schedule.outstanding,
            summary: SummaryBody::from(&outcome.metrics),
        }
    }
}

/// Error payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    /// Wraps an error message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
