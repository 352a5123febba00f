//! Per-column popover filter state machine.
//!
//! InlineFilterState is a sum type with two states:
//! - Closed: no popover open
//! - OpenForColumn: popover open for one column, editing a [`FilterDraft`]
//!
//! The controller never owns the filter collection; `apply` and
//! `clear_for_column` write into a collection supplied by the caller, and
//! closing without applying leaves it untouched.

use crate::config::FilterSettings;
use crate::model::{
    find_filter, normalize_tags, remove_filter, upsert_filter, ColumnFilter,
    ColumnFilterCondition, FilterType, GridColumn, JoinOperator, OperatorCode,
};
use tracing::debug;

// ===== InlineFilterState =====

/// Which popover, if any, is open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InlineFilterState {
    /// No popover open.
    #[default]
    Closed,
    /// Popover open for the column with this `prop`.
    OpenForColumn(String),
}

// ===== ConditionSlot =====

/// The two condition slots of a popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionSlot {
    /// Required condition.
    Primary,
    /// Optional condition joined by the AND/OR selector.
    Secondary,
}

impl ConditionSlot {
    fn index(self) -> usize {
        match self {
            ConditionSlot::Primary => 0,
            ConditionSlot::Secondary => 1,
        }
    }
}

// ===== DismissTarget =====

/// Where a pointer interaction landed relative to the open popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTarget {
    /// Inside the popover itself.
    InsidePopover,
    /// Filter trigger icons and similar chrome excluded from dismissal.
    FilterChrome,
    /// Pagination controls.
    Pagination,
    /// Anywhere else. The only dismissing target.
    Outside,
}

// ===== ApplyOutcome =====

/// Result of applying the popover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No popover open for the requested column; nothing happened.
    NotOpen,
    /// Primary condition has no value; popover stays open, flagged invalid.
    Invalid,
    /// Filter upserted and popover closed.
    Applied(ColumnFilter),
}

// ===== ConditionDraft =====

/// Unsaved input of one condition slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionDraft {
    operator: OperatorCode,
    /// Committed search terms (multi-text chips).
    tags: Vec<String>,
    /// Text being typed; the whole value for text columns.
    input: String,
    /// Whether the user or an existing filter put this slot in use.
    engaged: bool,
}

impl ConditionDraft {
    fn new(operator: OperatorCode, engaged: bool) -> Self {
        Self {
            operator,
            tags: Vec::new(),
            input: String::new(),
            engaged,
        }
    }

    /// Selected operator.
    pub fn operator(&self) -> OperatorCode {
        self.operator
    }

    /// Committed search terms.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Uncommitted input text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Input is hidden for valueless operators.
    pub fn shows_input(&self) -> bool {
        !self.operator.is_valueless()
    }

    /// Normalized search terms including uncommitted input.
    pub fn values(&self) -> Vec<String> {
        let mut raw = self.tags.clone();
        raw.push(self.input.clone());
        normalize_tags(self.operator, &raw)
    }

    /// Whether [`Self::values`] is non-empty.
    pub fn has_value(&self) -> bool {
        !self.values().is_empty()
    }

    fn condition(&self) -> ColumnFilterCondition {
        ColumnFilterCondition {
            condition_type: self.operator,
            search_tags: self.values(),
        }
    }
}

// ===== FilterDraft =====

/// Popover contents for the open column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDraft {
    column: String,
    filter_type: FilterType,
    operator_options: Vec<OperatorCode>,
    operator_permitted: bool,
    join: JoinOperator,
    slots: [ConditionDraft; 2],
}

impl FilterDraft {
    /// `prop` of the column being filtered.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Input style of the column.
    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Operators the slots may select.
    pub fn operator_options(&self) -> &[OperatorCode] {
        &self.operator_options
    }

    /// Whether the column's search config shows the AND/OR selector at all.
    pub fn operator_permitted(&self) -> bool {
        self.operator_permitted
    }

    /// Selected AND/OR join.
    pub fn join(&self) -> JoinOperator {
        self.join
    }

    /// Draft of one condition slot.
    pub fn slot(&self, slot: ConditionSlot) -> &ConditionDraft {
        &self.slots[slot.index()]
    }

    fn slot_mut(&mut self, slot: ConditionSlot) -> &mut ConditionDraft {
        &mut self.slots[slot.index()]
    }
}

// ===== InlineFilterController =====

/// Popover state machine for one grid.
#[derive(Debug, Clone)]
pub struct InlineFilterController {
    settings: FilterSettings,
    state: InlineFilterState,
    draft: Option<FilterDraft>,
    invalid: bool,
}

impl InlineFilterController {
    /// Controller with no popover open.
    pub fn new(settings: FilterSettings) -> Self {
        Self {
            settings,
            state: InlineFilterState::Closed,
            draft: None,
            invalid: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> &InlineFilterState {
        &self.state
    }

    /// Whether the popover is open for `column_prop`.
    pub fn is_open_for(&self, column_prop: &str) -> bool {
        matches!(&self.state, InlineFilterState::OpenForColumn(p) if p == column_prop)
    }

    /// Draft of the open popover.
    pub fn draft(&self) -> Option<&FilterDraft> {
        self.draft.as_ref()
    }

    /// Set after a failed `apply`; cleared on open.
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    /// Filter settings in effect.
    pub fn settings(&self) -> &FilterSettings {
        &self.settings
    }

    // ===== Transitions =====

    /// Open the popover for `column_prop`, or close it if already open for
    /// that column.
    ///
    /// Opening loads the column's operator options and pre-populates from the
    /// column's entry in `filters`. Unknown or non-searchable columns are
    /// ignored.
    pub fn toggle(
        &mut self,
        column_prop: &str,
        columns: &[GridColumn],
        filters: &[ColumnFilter],
    ) -> &InlineFilterState {
        if self.is_open_for(column_prop) {
            self.close();
            return &self.state;
        }

        let Some(column) = columns.iter().find(|c| c.prop == column_prop) else {
            debug!(column = column_prop, "Filter toggle for unknown column ignored");
            return &self.state;
        };
        let Some(search_config) = column.effective_search_config() else {
            debug!(column = column_prop, "Filter toggle for non-searchable column ignored");
            return &self.state;
        };

        let mut operator_options = search_config.operator_options(&self.settings.default_operators);
        if operator_options.is_empty() {
            operator_options = OperatorCode::ALL.to_vec();
        }
        let default_operator = operator_options[0];
        let filter_type = search_config.search_type;

        let mut draft = FilterDraft {
            column: column_prop.to_string(),
            filter_type,
            operator_options,
            operator_permitted: search_config.operator_permitted(),
            join: JoinOperator::Or,
            slots: [
                ConditionDraft::new(default_operator, true),
                ConditionDraft::new(default_operator, false),
            ],
        };

        if let Some(existing) = find_filter(filters, column_prop) {
            draft.join = existing.operator.unwrap_or_default();
            for (slot, condition) in draft.slots.iter_mut().zip(&existing.conditions) {
                if !draft.operator_options.contains(&condition.condition_type) {
                    debug!(
                        column = column_prop,
                        operator = %condition.condition_type,
                        "Existing condition not offered by column, not pre-populated"
                    );
                    continue;
                }
                slot.operator = condition.condition_type;
                slot.engaged = true;
                let mut values = normalize_tags(slot.operator, &condition.search_tags);
                if filter_type == FilterType::Text {
                    slot.input = values.pop().unwrap_or_default();
                }
                slot.tags = values;
            }
        }

        debug!(column = column_prop, "Opened inline filter");
        self.draft = Some(draft);
        self.state = InlineFilterState::OpenForColumn(column_prop.to_string());
        self.invalid = false;
        self.enforce_join();
        &self.state
    }

    /// Close without applying.
    pub fn close(&mut self) {
        if self.state != InlineFilterState::Closed {
            debug!("Closed inline filter");
        }
        self.state = InlineFilterState::Closed;
        self.draft = None;
        self.invalid = false;
    }

    /// Handle a pointer interaction; only `Outside` dismisses.
    /// Returns whether the popover was closed.
    pub fn dismiss(&mut self, target: DismissTarget) -> bool {
        if target != DismissTarget::Outside || self.state == InlineFilterState::Closed {
            return false;
        }
        self.close();
        true
    }

    /// Validate the draft and upsert it into `filters`.
    ///
    /// The secondary slot is kept only when the selector is permitted and the
    /// slot is satisfiable; a single surviving condition gets `operator: None`.
    pub fn apply(&mut self, column_prop: &str, filters: &mut Vec<ColumnFilter>) -> ApplyOutcome {
        if !self.is_open_for(column_prop) {
            return ApplyOutcome::NotOpen;
        }
        let Some(draft) = &self.draft else {
            return ApplyOutcome::NotOpen;
        };

        let primary = draft.slot(ConditionSlot::Primary).condition();
        if !primary.is_satisfiable() {
            debug!(column = column_prop, "Inline filter rejected: primary condition empty");
            self.invalid = true;
            return ApplyOutcome::Invalid;
        }

        let secondary_draft = draft.slot(ConditionSlot::Secondary);
        let secondary = Some(secondary_draft.condition()).filter(|c| {
            draft.operator_permitted
                && c.is_satisfiable()
                && (secondary_draft.engaged || !c.search_tags.is_empty())
        });

        let filter = match secondary {
            Some(secondary) => ColumnFilter::pair(
                column_prop,
                draft.filter_type,
                draft.join,
                primary,
                secondary,
            ),
            None => ColumnFilter::single(column_prop, draft.filter_type, primary),
        };

        debug!(filter = %filter, "Applied inline filter");
        upsert_filter(filters, filter.clone());
        self.close();
        ApplyOutcome::Applied(filter)
    }

    /// Remove the filter for `column_prop`, regardless of popover state.
    pub fn clear_for_column(&self, column_prop: &str, filters: &mut Vec<ColumnFilter>) -> bool {
        let removed = remove_filter(filters, column_prop);
        if removed {
            debug!(column = column_prop, "Cleared inline filter");
        }
        removed
    }

    // ===== Draft Editing =====

    /// Change a slot's operator. Options not offered for the column are
    /// rejected. Valueless operators discard the slot's terms.
    pub fn set_slot_operator(&mut self, slot: ConditionSlot, operator: OperatorCode) -> bool {
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };
        if !draft.operator_options.contains(&operator) {
            return false;
        }

        let target = draft.slot_mut(slot);
        target.operator = operator;
        target.engaged = true;
        if operator.is_valueless() {
            target.tags.clear();
            target.input.clear();
        }
        self.enforce_join();
        true
    }

    /// Replace a slot's input text. Ignored while a valueless operator is
    /// selected.
    pub fn set_slot_input(&mut self, slot: ConditionSlot, text: impl Into<String>) -> bool {
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };
        let target = draft.slot_mut(slot);
        if !target.shows_input() {
            return false;
        }
        target.input = text.into();
        target.engaged = true;

        if draft.slot(ConditionSlot::Primary).has_value() {
            self.invalid = false;
        }
        self.enforce_join();
        true
    }

    /// Turn the typed input into a search tag (multi-text columns only).
    pub fn commit_slot_input(&mut self, slot: ConditionSlot) -> bool {
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };
        if draft.filter_type != FilterType::MultiText {
            return false;
        }
        let target = draft.slot_mut(slot);
        let tag = target.input.trim().to_string();
        target.input.clear();
        if tag.is_empty() || target.tags.contains(&tag) {
            return false;
        }
        target.tags.push(tag);
        true
    }

    /// Remove a committed search term.
    pub fn remove_slot_tag(&mut self, slot: ConditionSlot, index: usize) -> bool {
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };
        let target = draft.slot_mut(slot);
        if index >= target.tags.len() {
            return false;
        }
        target.tags.remove(index);
        self.enforce_join();
        true
    }

    /// Select AND or OR. AND is refused (and OR kept) when not allowed.
    pub fn set_join_operator(&mut self, join: JoinOperator) -> bool {
        let and_allowed = self.is_and_allowed();
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };
        if join == JoinOperator::And && !and_allowed {
            draft.join = JoinOperator::Or;
            return false;
        }
        draft.join = join;
        true
    }

    // ===== Derived Rules =====

    /// Whether the AND/OR selector is interactable.
    ///
    /// Requires the column to permit the selector and either slot to hold a
    /// value, or the primary operator to be valueless.
    pub fn is_operator_enabled(&self) -> bool {
        let Some(draft) = &self.draft else {
            return false;
        };
        let primary = draft.slot(ConditionSlot::Primary);
        let secondary = draft.slot(ConditionSlot::Secondary);
        draft.operator_permitted
            && (primary.has_value() || secondary.has_value() || primary.operator.is_valueless())
    }

    /// Whether the AND option is selectable.
    ///
    /// Disabled when the selector is disabled, or when both slots use the
    /// same operator from the configured cannot-AND set.
    pub fn is_and_allowed(&self) -> bool {
        let Some(draft) = &self.draft else {
            return false;
        };
        let primary = draft.slot(ConditionSlot::Primary).operator;
        let secondary = draft.slot(ConditionSlot::Secondary).operator;
        let impossible_pair =
            primary == secondary && self.settings.cannot_and_operators.contains(&primary);
        self.is_operator_enabled() && !impossible_pair
    }

    fn enforce_join(&mut self) {
        let and_allowed = self.is_and_allowed();
        if let Some(draft) = self.draft.as_mut() {
            if !and_allowed {
                draft.join = JoinOperator::Or;
            }
        }
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "inline_filter_tests.rs"]
mod tests;
