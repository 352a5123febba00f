//! Per-grid coordinator.
//!
//! [`GridConfigurationCoordinator`] is the contract a grid widget embeds: it
//! reconciles the grid's declared columns with the shared layout store, runs
//! the inline filter popover, hands out advanced filter editors, and
//! publishes the normalized filter list whenever it changes.
//!
//! Nothing here propagates an error to the widget. Durable-store write
//! failures are logged and the in-memory layout keeps working.

use crate::config::FilterSettings;
use crate::model::{
    normalize_filters, ColumnFilter, GridColumn, GridConfiguration, GridName, StoreError,
};
use crate::state::advanced_filter::{AdvancedFilterController, AdvancedFilterRequest, ModalResult};
use crate::state::broadcast::{Broadcaster, SubscriptionId};
use crate::state::inline_filter::{
    ApplyOutcome, DismissTarget, InlineFilterController, InlineFilterState,
};
use crate::state::reorder::reorder_visible;
use crate::store::ColumnConfigStore;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use tracing::{debug, warn};

/// Layout store shared by every grid on a screen.
pub type SharedColumnStore = Rc<RefCell<ColumnConfigStore>>;

/// Aggregate visibility of toggleable columns, for a "select all" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilitySummary {
    /// Every toggleable column is shown.
    AllVisible,
    /// Every toggleable column is hidden.
    AllHidden,
    /// Some shown, some hidden.
    Mixed,
}

/// Column layout and filter state of one grid widget.
pub struct GridConfigurationCoordinator {
    grid_name: GridName,
    default_columns: Vec<GridColumn>,
    store: SharedColumnStore,
    settings: FilterSettings,
    inline: InlineFilterController,
    filters: Vec<ColumnFilter>,
    filter_subscribers: Broadcaster<Vec<ColumnFilter>>,
}

impl std::fmt::Debug for GridConfigurationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfigurationCoordinator")
            .field("grid_name", &self.grid_name)
            .field("inline", self.inline.state())
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

impl GridConfigurationCoordinator {
    /// Reconcile the declared columns with the store and seed filters.
    ///
    /// Seed filters are normalized; entries for columns that are not
    /// declared searchable are dropped.
    pub fn new(
        store: SharedColumnStore,
        grid_name: GridName,
        default_columns: Vec<GridColumn>,
        existing_filters: &[ColumnFilter],
        settings: FilterSettings,
    ) -> Self {
        let initialized = store
            .borrow_mut()
            .initialize_default_columns(&grid_name, &default_columns);
        log_store_failure(&grid_name, "initialize layout", initialized);

        let mut coordinator = Self {
            inline: InlineFilterController::new(settings.clone()),
            grid_name,
            default_columns,
            store,
            settings,
            filters: Vec::new(),
            filter_subscribers: Broadcaster::new(),
        };
        coordinator.filters = coordinator.sanitize(existing_filters);
        coordinator
    }

    /// Grid this coordinator serves.
    pub fn grid_name(&self) -> &GridName {
        &self.grid_name
    }

    /// The shared layout store.
    pub fn store(&self) -> &SharedColumnStore {
        &self.store
    }

    // ===== Column Layout =====

    /// Columns to render, in stored order with stored visibility.
    pub fn columns(&self) -> Vec<GridColumn> {
        match self.store.borrow().configuration(self.grid_name.as_str()) {
            Some(stored) => GridColumn::merge_layout(&self.default_columns, &stored.columns),
            None => self.default_columns.clone(),
        }
    }

    /// [`Self::columns`] without hidden ones.
    pub fn visible_columns(&self) -> Vec<GridColumn> {
        self.columns().into_iter().filter(|c| !c.hidden).collect()
    }

    /// Suppressed-toggle columns are not counted.
    pub fn visibility_summary(&self) -> VisibilitySummary {
        let toggleable: Vec<bool> = self
            .columns()
            .iter()
            .filter(|c| !c.suppress_toggle)
            .map(|c| c.hidden)
            .collect();
        if toggleable.iter().all(|hidden| !hidden) {
            VisibilitySummary::AllVisible
        } else if toggleable.iter().all(|hidden| *hidden) {
            VisibilitySummary::AllHidden
        } else {
            VisibilitySummary::Mixed
        }
    }

    /// Flip one column's visibility. Returns `false` for an unknown prop.
    pub fn toggle_column(&mut self, prop: &str) -> bool {
        let result = self.store.borrow_mut().toggle_column(&self.grid_name, prop);
        log_store_failure(&self.grid_name, "toggle column", result).unwrap_or(true)
    }

    /// Show or hide every column not exempt from bulk toggling.
    pub fn toggle_all_columns(&mut self, hidden: bool) -> bool {
        let result = self
            .store
            .borrow_mut()
            .toggle_all_columns(&self.grid_name, hidden);
        log_store_failure(&self.grid_name, "toggle all columns", result).unwrap_or(true)
    }

    /// Drop the stored layout and fall back to the declared columns.
    pub fn reset_columns(&mut self) {
        let result = self
            .store
            .borrow_mut()
            .reset_to_default(&self.grid_name, &self.default_columns);
        log_store_failure(&self.grid_name, "reset layout", result);
    }

    /// Apply a drag-reorder expressed in visible-column indices.
    /// Returns `false` when the indices leave the order unchanged.
    pub fn reorder_columns(&mut self, from: usize, to: usize) -> bool {
        let full = self.columns();
        let reordered = reorder_visible(&full, from, to);
        if reordered == full {
            return false;
        }

        let config = GridConfiguration::new(self.grid_name.clone(), reordered);
        let result = self.store.borrow_mut().set_columns(&config);
        log_store_failure(&self.grid_name, "reorder columns", result);
        true
    }

    // ===== Inline Filter =====

    /// Popover state.
    pub fn inline(&self) -> &InlineFilterController {
        &self.inline
    }

    /// Draft editing access for the open popover.
    pub fn inline_mut(&mut self) -> &mut InlineFilterController {
        &mut self.inline
    }

    /// Open or close the popover for `prop`.
    pub fn toggle_filter(&mut self, prop: &str) -> &InlineFilterState {
        let columns = self.columns();
        self.inline.toggle(prop, &columns, &self.filters)
    }

    /// Apply the open popover; publishes on success.
    pub fn apply_filter(&mut self, prop: &str) -> ApplyOutcome {
        let outcome = self.inline.apply(prop, &mut self.filters);
        if matches!(outcome, ApplyOutcome::Applied(_)) {
            self.filters = normalize_filters(&self.filters);
            self.publish_filters();
        }
        outcome
    }

    /// Forward a pointer interaction to the popover.
    pub fn dismiss_filter(&mut self, target: DismissTarget) -> bool {
        self.inline.dismiss(target)
    }

    /// Remove one column's filter; publishes if one existed.
    pub fn clear_filter(&mut self, prop: &str) -> bool {
        let removed = self.inline.clear_for_column(prop, &mut self.filters);
        if removed {
            self.publish_filters();
        }
        removed
    }

    /// Remove every filter and publish the empty list.
    pub fn clear_all_filters(&mut self) {
        self.filters.clear();
        self.publish_filters();
    }

    // ===== Advanced Filter =====

    /// Payload for the advanced filter modal.
    pub fn advanced_filter_request(&self) -> AdvancedFilterRequest {
        AdvancedFilterRequest {
            grid_name: self.grid_name.clone(),
            column_filters: self.filters.clone(),
        }
    }

    /// Editor seeded with the current filters.
    pub fn open_advanced_filter(&self) -> AdvancedFilterController {
        AdvancedFilterController::new(
            self.advanced_filter_request(),
            &self.columns(),
            self.settings.clone(),
        )
    }

    /// Consume the modal's completion value. A cancel changes nothing.
    /// Returns whether the filter list was replaced.
    pub fn complete_advanced_filter(&mut self, result: ModalResult) -> bool {
        let Some(submitted) = result.submitted_filters() else {
            debug!(grid = %self.grid_name, "Advanced filter cancelled");
            return false;
        };
        self.filters = self.sanitize(submitted);
        self.publish_filters();
        true
    }

    // ===== Filter State =====

    /// Current normalized filters.
    pub fn filters(&self) -> &[ColumnFilter] {
        &self.filters
    }

    /// Whether `prop` has a filter, for the header indicator.
    pub fn has_active_filter(&self, prop: &str) -> bool {
        self.filters.iter().any(|f| f.column_name == prop)
    }

    /// Number of filtered columns.
    pub fn active_filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Receive the full normalized filter list after every change.
    pub fn subscribe_filters(&mut self) -> (SubscriptionId, Receiver<Vec<ColumnFilter>>) {
        self.filter_subscribers.subscribe()
    }

    /// Stop delivering to `id`.
    pub fn unsubscribe_filters(&mut self, id: SubscriptionId) -> bool {
        self.filter_subscribers.unsubscribe(id)
    }

    // ===== Helpers =====

    /// Normalize and drop filters on columns this grid cannot filter.
    fn sanitize(&self, filters: &[ColumnFilter]) -> Vec<ColumnFilter> {
        normalize_filters(filters)
            .into_iter()
            .filter(|f| {
                let known = self
                    .default_columns
                    .iter()
                    .any(|c| c.searchable && c.prop == f.column_name);
                if !known {
                    debug!(grid = %self.grid_name, column = %f.column_name, "Dropping filter on unknown column");
                }
                known
            })
            .collect()
    }

    fn publish_filters(&mut self) {
        debug!(grid = %self.grid_name, count = self.filters.len(), "Filters changed");
        self.filter_subscribers.publish(&self.filters);
    }
}

/// Log a durable-store failure and keep going.
fn log_store_failure<T>(grid: &GridName, action: &str, result: Result<T, StoreError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(grid = %grid, action, error = %e, "Layout store write failed");
            None
        }
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "grid_tests.rs"]
mod tests;
