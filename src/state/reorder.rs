//! Column drag-reorder over the visible subset.
//!
//! Drag gestures report indices among visible columns only. The full column
//! list is rebuilt so the visible subset takes its new order while hidden
//! columns keep their exact slots. All functions are pure and return new
//! vectors.

use crate::model::GridColumn;
use std::collections::HashMap;
use tracing::debug;

/// Single-element move with splice semantics (not a swap).
///
/// Returns `None` when either index is out of range.
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Option<Vec<T>> {
    if from >= items.len() || to >= items.len() {
        return None;
    }
    let mut moved = items.to_vec();
    let item = moved.remove(from);
    moved.insert(to, item);
    Some(moved)
}

/// Rebuild `full` with its visible slots filled, in order, from `visible`.
///
/// `visible` must be a permutation of the visible columns of `full` (same
/// count, same props). Returns `None` when it is not, since lockstep
/// reconstruction would otherwise drop or duplicate columns.
pub fn rebuild_with_visible_order(
    full: &[GridColumn],
    visible: &[GridColumn],
) -> Option<Vec<GridColumn>> {
    if !same_props(full.iter().filter(|c| !c.hidden), visible.iter()) {
        return None;
    }

    let mut reordered = visible.iter();
    full.iter()
        .map(|column| {
            if column.hidden {
                Some(column.clone())
            } else {
                reordered.next().cloned()
            }
        })
        .collect()
}

/// Move the visible column at `from` to `to` (visible coordinates).
///
/// Out-of-range or equal indices return `full` unchanged.
pub fn reorder_visible(full: &[GridColumn], from: usize, to: usize) -> Vec<GridColumn> {
    if from == to {
        return full.to_vec();
    }

    let visible: Vec<GridColumn> = full.iter().filter(|c| !c.hidden).cloned().collect();
    let Some(moved) = move_item(&visible, from, to) else {
        debug!(from, to, visible = visible.len(), "Reorder indices out of range, ignoring");
        return full.to_vec();
    };

    rebuild_with_visible_order(full, &moved).unwrap_or_else(|| full.to_vec())
}

/// Whether both sequences hold the same multiset of props.
fn same_props<'a>(
    a: impl Iterator<Item = &'a GridColumn>,
    b: impl Iterator<Item = &'a GridColumn>,
) -> bool {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for column in a {
        *counts.entry(column.prop.as_str()).or_default() += 1;
    }
    for column in b {
        *counts.entry(column.prop.as_str()).or_default() -= 1;
    }
    counts.values().all(|&n| n == 0)
}
