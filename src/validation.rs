//! Input validation for caseload requests and engine configuration.
//!
//! Everything is checked before allocation begins, and every problem
//! is reported at once. Detects:
//! - Worker counts and working hours outside configured limits
//! - Non-integer or negative numbers on the wire
//! - Unknown, duplicate, or mis-tiered task types
//! - Malformed catalogs and reservation rules

use std::collections::HashSet;

use crate::config::{EngineConfig, RequestLimits};
use crate::models::Catalog;
use crate::scheduler::{ScheduleRequest, WorkerSelector};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Worker count is zero or above the configured maximum.
    InvalidWorkerCount,
    /// Working hours outside `1..=max_working_hours`.
    InvalidWorkingHours,
    /// A numeric field is not an integer.
    NotAnInteger,
    /// A task count is negative.
    NegativeCount,
    /// A count does not fit the wire range, or the request exceeds
    /// `max_units` in total.
    CountTooLarge,
    /// A request line names a type outside the catalog.
    UnknownTaskType,
    /// Two lines (or two catalog entries) share a task type name.
    DuplicateTaskType,
    /// A line's declared category disagrees with the catalog.
    CategoryMismatch,
    /// A catalog entry has a non-positive duration or empty name.
    InvalidTaskType,
    /// A reservation rule cannot select workers or has a bad block size.
    InvalidReservation,
    /// Request limits that no request could satisfy.
    InvalidLimits,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a scheduling request against the catalog and limits.
///
/// Checks:
/// 1. `1 <= workers <= max_workers`
/// 2. `1 <= working_hours <= max_working_hours`
/// 3. No task type appears on two lines
/// 4. Every task type exists in the catalog
/// 5. Declared tiers match the catalog
/// 6. Total units `<= max_units`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_request(
    request: &ScheduleRequest,
    catalog: &Catalog,
    limits: &RequestLimits,
) -> ValidationResult {
    let mut errors = Vec::new();

    if request.workers < 1 || request.workers > limits.max_workers {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidWorkerCount,
            format!(
                "Available people must be between 1 and {} (got {})",
                limits.max_workers, request.workers
            ),
        ));
    }

    if request.working_hours < 1 || request.working_hours > limits.max_working_hours {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidWorkingHours,
            format!(
                "Working hours must be an integer between 1 and {} (got {})",
                limits.max_working_hours, request.working_hours
            ),
        ));
    }

    let mut seen = HashSet::new();
    for line in &request.lines {
        if !seen.insert(line.task_type.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateTaskType,
                format!("Duplicate task type: {}", line.task_type),
            ));
            continue;
        }

        match catalog.get(&line.task_type) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownTaskType,
                format!("Unknown task type: {}", line.task_type),
            )),
            Some(task_type) => {
                if let Some(tier) = line.tier {
                    if tier != task_type.tier {
                        errors.push(ValidationError::new(
                            ValidationErrorKind::CategoryMismatch,
                            format!(
                                "Task type '{}' is {} but was submitted as {}",
                                line.task_type, task_type.tier, tier
                            ),
                        ));
                    }
                }
            }
        }
    }

    let total_units: u64 = request.lines.iter().map(|l| u64::from(l.count)).sum();
    if total_units > limits.max_units {
        errors.push(ValidationError::new(
            ValidationErrorKind::CountTooLarge,
            format!(
                "Request asks for {} units; at most {} are accepted",
                total_units, limits.max_units
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates engine configuration.
///
/// Checks:
/// 1. Catalog names are non-empty and unique
/// 2. Catalog durations are positive
/// 3. Reservation selectors pick at least one position
/// 4. Reservation block sizes are positive and finite
/// 5. Bound reservation task types exist in the catalog
/// 6. Limits are at least 1
pub fn validate_config(config: &EngineConfig) -> ValidationResult {
    let mut errors = Vec::new();

    let mut names = HashSet::new();
    for t in config.catalog.types() {
        if t.name.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTaskType,
                "Task type with empty name",
            ));
        }
        if !names.insert(t.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateTaskType,
                format!("Duplicate catalog entry: {}", t.name),
            ));
        }
        if t.duration_ms <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTaskType,
                format!("Task type '{}' must have a positive duration", t.name),
            ));
        }
    }

    for rule in config.reservations.rules() {
        let empty_selector = match rule.select {
            WorkerSelector::FromEnd { offset } => offset == 0,
            WorkerSelector::Trailing { count } => count == 0,
        };
        if empty_selector {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidReservation,
                format!("Reservation '{}' selects no workers", rule.label),
            ));
        }
        if let Some(hours) = rule.hours {
            if !hours.is_finite() || hours <= 0.0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidReservation,
                    format!("Reservation '{}' must reserve a positive number of hours", rule.label),
                ));
            }
        }
        if let Some(task_type) = &rule.task_type {
            if !config.catalog.contains(task_type) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidReservation,
                    format!(
                        "Reservation '{}' is bound to unknown task type '{}'",
                        rule.label, task_type
                    ),
                ));
            }
        }
    }

    let limits = &config.limits;
    if limits.max_workers < 1 || limits.max_working_hours < 1 || limits.max_units < 1 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidLimits,
            "Request limits must allow at least one worker, one hour, and one unit",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskRequestLine, TaskType, Tier, MS_PER_HOUR};
    use crate::scheduler::{ReservationPolicy, ReservationRule};

    fn request(workers: usize, hours: u32) -> ScheduleRequest {
        ScheduleRequest::new(workers, hours)
    }

    #[test]
    fn test_valid_request() {
        let req = request(4, 7)
            .with_task("Priority Small", 10)
            .with_line(TaskRequestLine::new("Routine GI", 2).with_tier(Tier::Routine));
        assert!(validate_request(&req, &Catalog::standard(), &RequestLimits::default()).is_ok());
    }

    #[test]
    fn test_worker_count_out_of_range() {
        let limits = RequestLimits::default();
        let errors = validate_request(&request(0, 7), &Catalog::standard(), &limits).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidWorkerCount));

        let too_many = request(limits.max_workers + 1, 7);
        assert!(validate_request(&too_many, &Catalog::standard(), &limits).is_err());
    }

    #[test]
    fn test_working_hours_out_of_range() {
        let limits = RequestLimits::default();
        for hours in [0, 25] {
            let errors =
                validate_request(&request(1, hours), &Catalog::standard(), &limits).unwrap_err();
            assert_eq!(errors[0].kind, ValidationErrorKind::InvalidWorkingHours);
        }
        assert!(validate_request(&request(1, 24), &Catalog::standard(), &limits).is_ok());
        assert!(validate_request(&request(1, 1), &Catalog::standard(), &limits).is_ok());
    }

    #[test]
    fn test_unknown_task_type() {
        let req = request(1, 7).with_task("Priority Bananas", 1);
        let errors =
            validate_request(&req, &Catalog::standard(), &RequestLimits::default()).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::UnknownTaskType);
        assert!(errors[0].message.contains("Priority Bananas"));
    }

    #[test]
    fn test_duplicate_task_type() {
        let req = request(1, 7)
            .with_task("Priority Small", 1)
            .with_task("Priority Small", 2);
        let errors =
            validate_request(&req, &Catalog::standard(), &RequestLimits::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateTaskType);
    }

    #[test]
    fn test_category_mismatch() {
        let req = request(1, 7)
            .with_line(TaskRequestLine::new("Routine Small", 1).with_tier(Tier::Priority));
        let errors =
            validate_request(&req, &Catalog::standard(), &RequestLimits::default()).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::CategoryMismatch);
    }

    #[test]
    fn test_total_units_limit() {
        let limits = RequestLimits {
            max_units: 100,
            ..RequestLimits::default()
        };
        let at_limit = request(2, 7)
            .with_task("Priority Small", 60)
            .with_task("Routine Small", 40);
        assert!(validate_request(&at_limit, &Catalog::standard(), &limits).is_ok());

        let over = at_limit.with_task("Routine GI", 1);
        let errors = validate_request(&over, &Catalog::standard(), &limits).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::CountTooLarge);
        assert!(errors[0].message.contains("101"));
    }

    #[test]
    fn test_max_count_line_rejected_by_default() {
        let req = request(1, 7).with_task("Priority Small", u32::MAX);
        let errors =
            validate_request(&req, &Catalog::standard(), &RequestLimits::default()).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::CountTooLarge);
    }

    #[test]
    fn test_multiple_errors() {
        let req = request(0, 30).with_task("Nope", 1);
        let errors =
            validate_request(&req, &Catalog::standard(), &RequestLimits::default()).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_bad_catalog() {
        let config = EngineConfig {
            catalog: Catalog::new()
                .with_type(TaskType::priority("A", MS_PER_HOUR))
                .with_type(TaskType::priority("A", MS_PER_HOUR))
                .with_type(TaskType::routine("B", 0))
                .with_type(TaskType::routine(" ", MS_PER_HOUR)),
            reservations: ReservationPolicy::new(),
            limits: RequestLimits::default(),
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateTaskType));
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::InvalidTaskType)
                .count(),
            2
        );
    }

    #[test]
    fn test_unusable_limits() {
        let mut config = EngineConfig::default();
        config.limits.max_units = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidLimits);
    }

    #[test]
    fn test_bad_reservations() {
        let config = EngineConfig {
            catalog: Catalog::standard(),
            reservations: ReservationPolicy::new()
                .with_rule(ReservationRule::withhold(
                    "Nobody",
                    WorkerSelector::Trailing { count: 0 },
                ))
                .with_rule(ReservationRule::bound(
                    "Ghost",
                    WorkerSelector::FromEnd { offset: 1 },
                    2.0,
                    "Ghost Type",
                ))
                .with_rule(ReservationRule::bound(
                    "Negative",
                    WorkerSelector::FromEnd { offset: 1 },
                    -1.0,
                    "Priority Small",
                )),
            limits: RequestLimits::default(),
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::InvalidReservation));
    }
}
