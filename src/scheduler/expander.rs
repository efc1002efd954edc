//! Task expansion.
//!
//! Turns request lines into the ordered unit sequence the allocator
//! consumes. Lines are ordered by the catalog's effective order
//! (priority tier first, declared order within a tier), not by their
//! position in the request, and each line's units are contiguous.
//!
//! # Complexity
//! O(L log L + U) where L = lines, U = total units.

use crate::models::{Catalog, TaskRequestLine, UnitTask};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Expands `lines` into unit tasks in scheduling order.
///
/// Zero-count lines are skipped. Every named type must exist in
/// `catalog`; unknown names are reported together.
pub fn expand(
    lines: &[TaskRequestLine],
    catalog: &Catalog,
) -> Result<Vec<UnitTask>, Vec<ValidationError>> {
    let mut ranked = Vec::with_capacity(lines.len());
    let mut errors = Vec::new();

    for line in lines {
        match catalog.rank(&line.task_type) {
            Some(rank) => ranked.push((rank, line)),
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownTaskType,
                format!("Unknown task type: {}", line.task_type),
            )),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    ranked.sort_by_key(|&(rank, _)| rank);

    let total: usize = ranked.iter().map(|(_, l)| l.count as usize).sum();
    let mut units = Vec::with_capacity(total);
    for (_, line) in ranked {
        if line.count == 0 {
            continue;
        }
        // rank() succeeded above, so the lookup cannot miss.
        if let Some(task_type) = catalog.get(&line.task_type) {
            for _ in 0..line.count {
                let sequence = units.len();
                units.push(UnitTask::of(task_type, sequence));
            }
        }
    }

    Ok(units)
}
