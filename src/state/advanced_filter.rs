//! Full-form multi-column filter editor.
//!
//! Rows edit one column each; a column claimed by one row is not offered to
//! the others. The editor runs behind a modal boundary: it is opened with an
//! [`AdvancedFilterRequest`] and finishes with a [`ModalResult`]. A cancel
//! result carries no data and must leave the caller's filters untouched.

use super::inline_filter::ConditionSlot;
use crate::config::FilterSettings;
use crate::model::{
    normalize_filters, ColumnFilter, ColumnFilterCondition, FilterType, GridColumn, GridName,
    JoinOperator, OperatorCode,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

// ===== Modal Boundary =====

/// Input payload of the advanced filter modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedFilterRequest {
    /// Grid being filtered.
    pub grid_name: GridName,
    /// Filters to seed the form with.
    pub column_filters: Vec<ColumnFilter>,
}

/// How the modal was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModalAction {
    /// Filters were submitted (possibly an empty list).
    Submit,
    /// Closed without changes.
    Cancel,
}

/// Data carried by a submit result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedFilterPayload {
    /// The complete replacement filter list.
    pub column_filters: Vec<ColumnFilter>,
}

/// Completion value of the modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalResult {
    /// Submit or cancel.
    pub action: ModalAction,
    /// Present only for a submit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AdvancedFilterPayload>,
}

impl ModalResult {
    /// Submit result replacing the filters with `column_filters`.
    pub fn submit(column_filters: Vec<ColumnFilter>) -> Self {
        Self {
            action: ModalAction::Submit,
            data: Some(AdvancedFilterPayload { column_filters }),
        }
    }

    /// Cancel result carrying no data.
    pub fn cancel() -> Self {
        Self {
            action: ModalAction::Cancel,
            data: None,
        }
    }

    /// Submitted filters; `None` for a cancel.
    pub fn submitted_filters(&self) -> Option<&[ColumnFilter]> {
        match (self.action, &self.data) {
            (ModalAction::Submit, Some(data)) => Some(&data.column_filters),
            (ModalAction::Submit, None) => Some(&[]),
            (ModalAction::Cancel, _) => None,
        }
    }
}

/// Rows that block submission, by index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} filter row(s) incomplete", .0.len())]
pub struct InvalidRows(pub Vec<usize>);

// ===== FilterRow =====

/// One row of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRow {
    column: Option<String>,
    filter_type: FilterType,
    join: JoinOperator,
    /// One or two conditions.
    conditions: Vec<ColumnFilterCondition>,
}

impl FilterRow {
    fn empty(operator: OperatorCode) -> Self {
        Self {
            column: None,
            filter_type: FilterType::default(),
            join: JoinOperator::Or,
            conditions: vec![ColumnFilterCondition::new(operator, Vec::<String>::new())],
        }
    }

    fn from_filter(filter: &ColumnFilter) -> Self {
        Self {
            column: Some(filter.column_name.clone()),
            filter_type: filter.filter_type,
            join: filter.operator.unwrap_or_default(),
            conditions: filter.conditions.clone(),
        }
    }

    /// Chosen column, if any.
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Join between the two conditions.
    pub fn join(&self) -> JoinOperator {
        self.join
    }

    /// One or two conditions, as edited.
    pub fn conditions(&self) -> &[ColumnFilterCondition] {
        &self.conditions
    }

    fn condition_mut(&mut self, slot: ConditionSlot) -> Option<&mut ColumnFilterCondition> {
        let index = match slot {
            ConditionSlot::Primary => 0,
            ConditionSlot::Secondary => 1,
        };
        self.conditions.get_mut(index)
    }

    /// A row is complete when a column is chosen and its primary condition
    /// is satisfiable.
    pub fn is_complete(&self) -> bool {
        self.column.is_some()
            && self
                .conditions
                .first()
                .is_some_and(|c| c.normalized().is_satisfiable())
    }

    fn to_filter(&self) -> Option<ColumnFilter> {
        let column = self.column.as_ref()?;
        ColumnFilter {
            column_name: column.clone(),
            filter_type: self.filter_type,
            operator: Some(self.join),
            conditions: self.conditions.clone(),
        }
        .normalized()
    }
}

// ===== AdvancedFilterController =====

/// Form state of the advanced filter modal.
#[derive(Debug, Clone)]
pub struct AdvancedFilterController {
    grid_name: GridName,
    settings: FilterSettings,
    /// Declared searchable columns, in declared order.
    searchable: Vec<GridColumn>,
    rows: Vec<FilterRow>,
    show_errors: bool,
}

impl AdvancedFilterController {
    /// Seed one row per existing filter on a searchable column.
    pub fn new(
        request: AdvancedFilterRequest,
        columns: &[GridColumn],
        settings: FilterSettings,
    ) -> Self {
        let searchable: Vec<GridColumn> =
            columns.iter().filter(|c| c.searchable).cloned().collect();

        let rows = normalize_filters(&request.column_filters)
            .iter()
            .filter(|f| searchable.iter().any(|c| c.prop == f.column_name))
            .map(FilterRow::from_filter)
            .collect();

        Self {
            grid_name: request.grid_name,
            settings,
            searchable,
            rows,
            show_errors: false,
        }
    }

    /// Grid being filtered.
    pub fn grid_name(&self) -> &GridName {
        &self.grid_name
    }

    /// Rows in form order.
    pub fn rows(&self) -> &[FilterRow] {
        &self.rows
    }

    /// Set by a rejected submit.
    pub fn show_errors(&self) -> bool {
        self.show_errors
    }

    /// Columns currently claimed by a row.
    pub fn claimed_columns(&self) -> HashSet<&str> {
        self.rows.iter().filter_map(FilterRow::column).collect()
    }

    /// Searchable columns row `row_index` may pick: unclaimed ones plus its
    /// own current pick.
    pub fn available_columns(&self, row_index: usize) -> Vec<&GridColumn> {
        let own = self.rows.get(row_index).and_then(FilterRow::column);
        let claimed = self.claimed_columns();
        self.searchable
            .iter()
            .filter(|c| Some(c.prop.as_str()) == own || !claimed.contains(c.prop.as_str()))
            .collect()
    }

    // ===== Row Management =====

    /// Append an empty row. Returns its index.
    pub fn add_row(&mut self) -> usize {
        let operator = self.default_operator(None);
        self.rows.push(FilterRow::empty(operator));
        self.rows.len() - 1
    }

    /// Assign a column to a row.
    ///
    /// Rejected for unknown or non-searchable columns and for columns claimed
    /// by another row. Conditions whose operator the column does not offer
    /// are reset to the column's first operator.
    pub fn select_column(&mut self, row_index: usize, prop: &str) -> bool {
        if row_index >= self.rows.len() {
            return false;
        }
        let claimed_elsewhere = self
            .rows
            .iter()
            .enumerate()
            .any(|(i, r)| i != row_index && r.column() == Some(prop));
        if claimed_elsewhere {
            debug!(column = prop, row = row_index, "Column already claimed by another row");
            return false;
        }
        let Some(column) = self.searchable.iter().find(|c| c.prop == prop) else {
            return false;
        };

        let config = column.effective_search_config().unwrap_or_default();
        let options = self.operator_options(column);
        let fallback = self.default_operator(Some(column));

        let row = &mut self.rows[row_index];
        row.column = Some(prop.to_string());
        row.filter_type = config.search_type;
        for condition in &mut row.conditions {
            if !options.contains(&condition.condition_type) {
                condition.condition_type = fallback;
                condition.search_tags.clear();
            }
        }
        self.enforce_join(row_index);
        true
    }

    /// Remove a row, releasing its column. Removing the last row clears
    /// everything and yields the empty submit result.
    pub fn remove_row(&mut self, row_index: usize) -> Option<ModalResult> {
        if row_index >= self.rows.len() {
            return None;
        }
        self.rows.remove(row_index);
        if self.rows.is_empty() {
            return Some(self.clear_all());
        }
        None
    }

    // ===== Row Editing =====

    /// Change a condition's operator. Operators the row's column does not
    /// offer are rejected; valueless operators discard the terms.
    pub fn set_condition_type(
        &mut self,
        row_index: usize,
        slot: ConditionSlot,
        operator: OperatorCode,
    ) -> bool {
        let allowed = self
            .row_column(row_index)
            .is_none_or(|column| self.operator_options(column).contains(&operator));
        if !allowed {
            return false;
        }
        let Some(condition) = self
            .rows
            .get_mut(row_index)
            .and_then(|r| r.condition_mut(slot))
        else {
            return false;
        };

        condition.condition_type = operator;
        if operator.is_valueless() {
            condition.search_tags.clear();
        }
        self.enforce_join(row_index);
        true
    }

    /// Add a trimmed search term to a condition.
    pub fn add_tag(&mut self, row_index: usize, slot: ConditionSlot, tag: &str) -> bool {
        let tag = tag.trim();
        let Some(condition) = self
            .rows
            .get_mut(row_index)
            .and_then(|r| r.condition_mut(slot))
        else {
            return false;
        };
        if tag.is_empty()
            || condition.condition_type.is_valueless()
            || condition.search_tags.iter().any(|t| t == tag)
        {
            return false;
        }
        condition.search_tags.push(tag.to_string());
        true
    }

    /// Remove the search term at `tag_index`.
    pub fn remove_tag(&mut self, row_index: usize, slot: ConditionSlot, tag_index: usize) -> bool {
        let Some(condition) = self
            .rows
            .get_mut(row_index)
            .and_then(|r| r.condition_mut(slot))
        else {
            return false;
        };
        if tag_index >= condition.search_tags.len() {
            return false;
        }
        condition.search_tags.remove(tag_index);
        self.enforce_join(row_index);
        true
    }

    /// Add or drop the secondary condition of a row.
    pub fn enable_secondary(&mut self, row_index: usize, enabled: bool) -> bool {
        let column = self.row_column(row_index);
        let permitted = column.is_none_or(|c| {
            c.effective_search_config()
                .unwrap_or_default()
                .operator_permitted()
        });
        let operator = self.default_operator(column);

        let Some(row) = self.rows.get_mut(row_index) else {
            return false;
        };
        match (enabled, row.conditions.len()) {
            (true, 1) if permitted => {
                row.conditions
                    .push(ColumnFilterCondition::new(operator, Vec::<String>::new()));
            }
            (false, 2) => {
                row.conditions.truncate(1);
                row.join = JoinOperator::Or;
            }
            _ => return false,
        }
        self.enforce_join(row_index);
        true
    }

    /// Select the row's join. AND is refused when both conditions use the
    /// same cannot-AND operator.
    pub fn set_row_join(&mut self, row_index: usize, join: JoinOperator) -> bool {
        let and_allowed = self.is_and_allowed(row_index);
        let Some(row) = self.rows.get_mut(row_index) else {
            return false;
        };
        if join == JoinOperator::And && !and_allowed {
            row.join = JoinOperator::Or;
            return false;
        }
        row.join = join;
        true
    }

    /// Whether the row's AND/OR selector is interactable.
    ///
    /// Requires two conditions, a column that permits the selector, and
    /// either condition to hold a value or the primary operator to be
    /// valueless.
    pub fn is_operator_enabled(&self, row_index: usize) -> bool {
        let Some(row) = self.rows.get(row_index) else {
            return false;
        };
        let permitted = self.row_column(row_index).is_none_or(|c| {
            c.effective_search_config()
                .unwrap_or_default()
                .operator_permitted()
        });
        let has_value = |c: &ColumnFilterCondition| !c.normalized().search_tags.is_empty();
        match row.conditions.as_slice() {
            [primary, secondary] => {
                permitted
                    && (has_value(primary)
                        || has_value(secondary)
                        || primary.condition_type.is_valueless())
            }
            _ => false,
        }
    }

    /// Whether AND is selectable for the row.
    ///
    /// Disabled when the selector is disabled, or when both conditions use
    /// the same operator from the configured cannot-AND set.
    pub fn is_and_allowed(&self, row_index: usize) -> bool {
        let Some(row) = self.rows.get(row_index) else {
            return false;
        };
        let impossible_pair = match row.conditions.as_slice() {
            [primary, secondary] => {
                primary.condition_type == secondary.condition_type
                    && self
                        .settings
                        .cannot_and_operators
                        .contains(&primary.condition_type)
            }
            _ => false,
        };
        self.is_operator_enabled(row_index) && !impossible_pair
    }

    // ===== Completion =====

    /// Validate every row and produce the submit result.
    ///
    /// Incomplete rows flip the show-errors flag and leave the form as is.
    pub fn submit(&mut self) -> Result<ModalResult, InvalidRows> {
        let invalid: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.is_complete())
            .map(|(i, _)| i)
            .collect();

        if !invalid.is_empty() {
            debug!(grid = %self.grid_name, rows = ?invalid, "Advanced filter submit rejected");
            self.show_errors = true;
            return Err(InvalidRows(invalid));
        }

        let filters: Vec<ColumnFilter> = self.rows.iter().filter_map(FilterRow::to_filter).collect();
        let filters = normalize_filters(&filters);
        debug!(grid = %self.grid_name, count = filters.len(), "Advanced filter submitted");
        Ok(ModalResult::submit(filters))
    }

    /// Close without changes.
    pub fn cancel(&self) -> ModalResult {
        ModalResult::cancel()
    }

    /// Drop every row and yield an empty submit result.
    pub fn clear_all(&mut self) -> ModalResult {
        self.rows.clear();
        self.show_errors = false;
        ModalResult::submit(Vec::new())
    }

    // ===== Helpers =====

    fn row_column(&self, row_index: usize) -> Option<&GridColumn> {
        let prop = self.rows.get(row_index)?.column()?;
        self.searchable.iter().find(|c| c.prop == prop)
    }

    fn operator_options(&self, column: &GridColumn) -> Vec<OperatorCode> {
        let options = column
            .effective_search_config()
            .unwrap_or_default()
            .operator_options(&self.settings.default_operators);
        if options.is_empty() {
            OperatorCode::ALL.to_vec()
        } else {
            options
        }
    }

    fn default_operator(&self, column: Option<&GridColumn>) -> OperatorCode {
        let options = match column {
            Some(column) => self.operator_options(column),
            None => self.settings.default_operators.clone(),
        };
        options.first().copied().unwrap_or(OperatorCode::Contains)
    }

    fn enforce_join(&mut self, row_index: usize) {
        let and_allowed = self.is_and_allowed(row_index);
        if let Some(row) = self.rows.get_mut(row_index) {
            if !and_allowed {
                row.join = JoinOperator::Or;
            }
        }
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "advanced_filter_tests.rs"]
mod tests;
