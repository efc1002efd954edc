//! Task catalog.
//!
//! The catalog is the closed set of task types the engine can schedule.
//! Each type carries a priority tier and a fixed per-unit duration.
//! The engine never invents types: a request naming a type outside the
//! catalog is rejected during validation.
//!
//! # Ordering
//!
//! Scheduling order is the catalog's *effective order*: every
//! [`Tier::Priority`] type in declared order, followed by every
//! [`Tier::Routine`] type in declared order.
//!
//! # Time Representation
//! Durations are integer milliseconds. Hours appear only at the
//! configuration and wire boundary (see [`hours_to_ms`], [`ms_to_hours`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Milliseconds in one hour.
pub const MS_PER_HOUR: i64 = 3_600_000;

/// Converts fractional hours to whole milliseconds (rounded).
#[inline]
pub fn hours_to_ms(hours: f64) -> i64 {
    (hours * MS_PER_HOUR as f64).round() as i64
}

/// Converts milliseconds to fractional hours.
#[inline]
pub fn ms_to_hours(ms: i64) -> f64 {
    ms as f64 / MS_PER_HOUR as f64
}

/// Priority tier of a task type.
///
/// Every `Priority` unit is considered for assignment before any
/// `Routine` unit, across the whole worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Scheduled first.
    Priority,
    /// Scheduled once all priority work has been considered.
    Routine,
}

impl Tier {
    /// Wire label ("Priority" / "Routine").
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Priority => "Priority",
            Tier::Routine => "Routine",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Priority" => Ok(Tier::Priority),
            "Routine" => Ok(Tier::Routine),
            other => Err(format!("unknown tier '{other}'")),
        }
    }
}

/// A schedulable task type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskType {
    /// Unique identifier, also the display label (e.g. "Priority Breast").
    pub name: String,
    /// Scheduling tier.
    pub tier: Tier,
    /// Duration of one unit (ms). Configured in hours.
    #[serde(rename = "hours", with = "serde_hours")]
    pub duration_ms: i64,
    /// Units of this type that fit nowhere are booked as overtime
    /// instead of being left outstanding.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub must_complete_today: bool,
}

impl TaskType {
    /// Creates a task type.
    pub fn new(name: impl Into<String>, tier: Tier, duration_ms: i64) -> Self {
        Self {
            name: name.into(),
            tier,
            duration_ms,
            must_complete_today: false,
        }
    }

    /// Creates a priority-tier task type.
    pub fn priority(name: impl Into<String>, duration_ms: i64) -> Self {
        Self::new(name, Tier::Priority, duration_ms)
    }

    /// Creates a routine-tier task type.
    pub fn routine(name: impl Into<String>, duration_ms: i64) -> Self {
        Self::new(name, Tier::Routine, duration_ms)
    }

    /// Marks the type as overtime-eligible.
    pub fn with_must_complete_today(mut self) -> Self {
        self.must_complete_today = true;
        self
    }

    /// Unit duration in hours.
    pub fn hours(&self) -> f64 {
        ms_to_hours(self.duration_ms)
    }
}

/// Ordered set of task types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    types: Vec<TaskType>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task type (declared order is preserved).
    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.types.push(task_type);
        self
    }

    /// The catalog used by the histopathology deployment.
    ///
    /// Durations derive from daily throughput rates on a 7-hour shift:
    /// 80/day → 0.0875 h, 10/day → 0.7 h, 5/day → 1.4 h.
    pub fn standard() -> Self {
        const SMALL: i64 = 315_000;
        const PLACENTA: i64 = 2_520_000;
        const SPECIALTY: i64 = 5_040_000;

        Self::new()
            .with_type(TaskType::priority("Priority Small", SMALL))
            .with_type(TaskType::priority("Priority Breast", SPECIALTY))
            .with_type(TaskType::priority("Priority Sarcoma", SPECIALTY))
            .with_type(TaskType::priority("Priority GI", SPECIALTY))
            .with_type(TaskType::priority("Priority Gyne", SPECIALTY))
            .with_type(TaskType::priority("Priority Head + Neck", SPECIALTY))
            .with_type(TaskType::priority("Priority Miscellaneous", SMALL))
            .with_type(TaskType::priority("NICU Placentas", PLACENTA))
            .with_type(TaskType::priority("Priority Small - Mid-day", SMALL))
            .with_type(TaskType::routine("Routine Small", SMALL))
            .with_type(TaskType::routine("Routine Breast", SPECIALTY))
            .with_type(TaskType::routine("Routine GI", SPECIALTY))
            .with_type(TaskType::routine("Routine Gyne", SPECIALTY))
            .with_type(TaskType::routine("Routine Head + Neck", SPECIALTY))
            .with_type(TaskType::routine("Routine Miscellaneous", SMALL))
            .with_type(TaskType::routine("Routine Placenta", PLACENTA))
            .with_type(TaskType::routine("Non Tumour Bones", PLACENTA))
    }

    /// Looks up a task type by name.
    pub fn get(&self, name: &str) -> Option<&TaskType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Whether the catalog defines `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Task types in declared order.
    pub fn types(&self) -> &[TaskType] {
        &self.types
    }

    /// Task types in effective scheduling order (tier, then declared order).
    pub fn ordered(&self) -> Vec<&TaskType> {
        let mut ordered: Vec<&TaskType> = self.types.iter().collect();
        // Stable sort keeps declared order within a tier.
        ordered.sort_by_key(|t| t.tier);
        ordered
    }

    /// Position of `name` in effective scheduling order.
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.ordered().iter().position(|t| t.name == name)
    }

    /// Number of task types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

mod serde_hours {
    use super::{hours_to_ms, ms_to_hours};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ms: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(ms_to_hours(*ms))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let hours = f64::deserialize(deserializer)?;
        Ok(hours_to_ms(hours))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_conversion() {
        assert_eq!(hours_to_ms(1.0), MS_PER_HOUR);
        assert_eq!(hours_to_ms(0.0875), 315_000);
        assert_eq!(hours_to_ms(1.4), 5_040_000);
        assert!((ms_to_hours(2_520_000) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_task_type_builder() {
        let t = TaskType::priority("Frozen Section", MS_PER_HOUR / 2).with_must_complete_today();
        assert_eq!(t.name, "Frozen Section");
        assert_eq!(t.tier, Tier::Priority);
        assert!(t.must_complete_today);
        assert!((t.hours() - 0.5).abs() < 1e-12);

        let r = TaskType::routine("Bones", MS_PER_HOUR);
        assert_eq!(r.tier, Tier::Routine);
        assert!(!r.must_complete_today);
    }

    #[test]
    fn test_effective_order_groups_tiers() {
        let catalog = Catalog::new()
            .with_type(TaskType::routine("R1", 1000))
            .with_type(TaskType::priority("P1", 1000))
            .with_type(TaskType::routine("R2", 1000))
            .with_type(TaskType::priority("P2", 1000));

        let names: Vec<&str> = catalog.ordered().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["P1", "P2", "R1", "R2"]);
        assert_eq!(catalog.rank("P2"), Some(1));
        assert_eq!(catalog.rank("R1"), Some(2));
        assert_eq!(catalog.rank("missing"), None);
    }

    #[test]
    fn test_standard_catalog() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.len(), 17);
        assert_eq!(catalog.get("Priority Breast").unwrap().duration_ms, 5_040_000);
        assert_eq!(catalog.get("NICU Placentas").unwrap().tier, Tier::Priority);
        assert_eq!(catalog.get("Non Tumour Bones").unwrap().tier, Tier::Routine);
        // Mid-day sits after the other priority types.
        assert_eq!(catalog.rank("Priority Small - Mid-day"), Some(8));
        assert!(catalog.types().iter().all(|t| t.duration_ms > 0));
    }

    #[test]
    fn test_tier_parse() {
        assert_eq!("Priority".parse::<Tier>(), Ok(Tier::Priority));
        assert_eq!("Routine".parse::<Tier>(), Ok(Tier::Routine));
        assert!("Urgent".parse::<Tier>().is_err());
        assert!(Tier::Priority < Tier::Routine);
    }

    #[test]
    fn test_task_type_serde_hours() {
        let json = r#"{"name":"Priority GI","tier":"Priority","hours":1.4}"#;
        let t: TaskType = serde_json::from_str(json).unwrap();
        assert_eq!(t.duration_ms, 5_040_000);
        assert!(!t.must_complete_today);

        let back = serde_json::to_value(&t).unwrap();
        assert_eq!(back["hours"], serde_json::json!(1.4));
        assert!(back.get("must_complete_today").is_none());
    }
}
