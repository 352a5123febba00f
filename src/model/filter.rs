//! Column filter value objects and normalization.
//!
//! A [`ColumnFilter`] holds one or two [`ColumnFilterCondition`]s joined by a
//! [`JoinOperator`]. Every filter handed to the outside world goes through
//! [`normalize_filters`], which is idempotent.

use crate::model::column::SearchType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Filter input style, shared with the column's [`SearchType`].
pub type FilterType = SearchType;

/// Most conditions a single column filter can carry.
pub const MAX_CONDITIONS: usize = 2;

// ===== OperatorCode =====

/// Comparison applied by one filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorCode {
    /// Cell contains any search term.
    Contains,
    /// Cell contains none of the search terms.
    DoesNotContain,
    /// Cell equals a search term.
    Equals,
    /// Cell equals none of the search terms.
    DoesNotEqual,
    /// Cell starts with a search term.
    BeginsWith,
    /// Cell ends with a search term.
    EndsWith,
    /// Cell is empty. Takes no search terms.
    IsBlank,
    /// Cell is non-empty. Takes no search terms.
    IsNotBlank,
}

impl OperatorCode {
    /// Every operator, in the order offered by default.
    pub const ALL: [OperatorCode; 8] = [
        OperatorCode::Contains,
        OperatorCode::DoesNotContain,
        OperatorCode::Equals,
        OperatorCode::DoesNotEqual,
        OperatorCode::BeginsWith,
        OperatorCode::EndsWith,
        OperatorCode::IsBlank,
        OperatorCode::IsNotBlank,
    ];

    /// Valueless operators take no search terms.
    pub fn is_valueless(self) -> bool {
        matches!(self, OperatorCode::IsBlank | OperatorCode::IsNotBlank)
    }

    /// Wire code, e.g. `does_not_contain`.
    pub fn code(self) -> &'static str {
        match self {
            OperatorCode::Contains => "contains",
            OperatorCode::DoesNotContain => "does_not_contain",
            OperatorCode::Equals => "equals",
            OperatorCode::DoesNotEqual => "does_not_equal",
            OperatorCode::BeginsWith => "begins_with",
            OperatorCode::EndsWith => "ends_with",
            OperatorCode::IsBlank => "is_blank",
            OperatorCode::IsNotBlank => "is_not_blank",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            OperatorCode::Contains => "contains",
            OperatorCode::DoesNotContain => "does not contain",
            OperatorCode::Equals => "equals",
            OperatorCode::DoesNotEqual => "does not equal",
            OperatorCode::BeginsWith => "begins with",
            OperatorCode::EndsWith => "ends with",
            OperatorCode::IsBlank => "is blank",
            OperatorCode::IsNotBlank => "is not blank",
        }
    }
}

impl fmt::Display for OperatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ===== JoinOperator =====

/// How the primary and secondary conditions of a column filter combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinOperator {
    /// Both conditions must match.
    And,
    /// Either condition may match.
    #[default]
    Or,
}

impl fmt::Display for JoinOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinOperator::And => f.write_str("and"),
            JoinOperator::Or => f.write_str("or"),
        }
    }
}

// ===== ColumnFilterCondition =====

/// One operator plus its OR'd search terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFilterCondition {
    /// Comparison to apply.
    #[serde(rename = "type")]
    pub condition_type: OperatorCode,
    /// OR'd search terms; empty for valueless operators.
    #[serde(default)]
    pub search_tags: Vec<String>,
}

impl ColumnFilterCondition {
    /// Condition with the given terms, taken as is.
    pub fn new<I, S>(condition_type: OperatorCode, search_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            condition_type,
            search_tags: search_tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Condition for a valueless operator.
    pub fn valueless(condition_type: OperatorCode) -> Self {
        Self {
            condition_type,
            search_tags: Vec::new(),
        }
    }

    /// Trim tags, drop empty and repeated tags, clear tags of valueless
    /// operators.
    pub fn normalized(&self) -> ColumnFilterCondition {
        ColumnFilterCondition {
            condition_type: self.condition_type,
            search_tags: normalize_tags(self.condition_type, &self.search_tags),
        }
    }

    /// A condition is usable when its operator is valueless or it carries at
    /// least one search term.
    pub fn is_satisfiable(&self) -> bool {
        self.condition_type.is_valueless() || !self.search_tags.is_empty()
    }
}

/// Normalize raw search terms for the given operator.
pub fn normalize_tags(operator: OperatorCode, tags: &[String]) -> Vec<String> {
    if operator.is_valueless() {
        return Vec::new();
    }
    let mut seen = HashSet::new();
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(*tag))
        .map(str::to_string)
        .collect()
}

impl fmt::Display for ColumnFilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.condition_type)?;
        for (i, tag) in self.search_tags.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{tag:?}")?;
        }
        Ok(())
    }
}

// ===== ColumnFilter =====

/// Filter on one column: one or two conditions.
///
/// `operator` is `None` exactly when there is a single condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFilter {
    /// `prop` of the filtered column.
    pub column_name: String,
    /// Popover input style the filter was built with.
    #[serde(default)]
    pub filter_type: FilterType,
    /// Join between the two conditions.
    #[serde(default)]
    pub operator: Option<JoinOperator>,
    /// One or two conditions.
    #[serde(default)]
    pub conditions: Vec<ColumnFilterCondition>,
}

impl ColumnFilter {
    /// Single-condition filter.
    pub fn single(
        column_name: impl Into<String>,
        filter_type: FilterType,
        condition: ColumnFilterCondition,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            filter_type,
            operator: None,
            conditions: vec![condition],
        }
    }

    /// Two-condition filter joined by `operator`.
    pub fn pair(
        column_name: impl Into<String>,
        filter_type: FilterType,
        operator: JoinOperator,
        primary: ColumnFilterCondition,
        secondary: ColumnFilterCondition,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            filter_type,
            operator: Some(operator),
            conditions: vec![primary, secondary],
        }
    }

    /// Normalized copy, or `None` when no condition survives.
    ///
    /// Value-required conditions without terms are dropped, at most
    /// [`MAX_CONDITIONS`] are kept, and `operator` is reconciled with the
    /// number of surviving conditions.
    pub fn normalized(&self) -> Option<ColumnFilter> {
        let conditions: Vec<_> = self
            .conditions
            .iter()
            .map(ColumnFilterCondition::normalized)
            .filter(ColumnFilterCondition::is_satisfiable)
            .take(MAX_CONDITIONS)
            .collect();

        let operator = match conditions.len() {
            0 => return None,
            1 => None,
            _ => Some(self.operator.unwrap_or_default()),
        };

        Some(ColumnFilter {
            column_name: self.column_name.clone(),
            filter_type: self.filter_type,
            operator,
            conditions,
        })
    }
}

impl fmt::Display for ColumnFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name)?;
        let join = self.operator.unwrap_or_default();
        for (i, condition) in self.conditions.iter().enumerate() {
            if i == 0 {
                write!(f, " {condition}")?;
            } else {
                write!(f, " {join} {condition}")?;
            }
        }
        Ok(())
    }
}

// ===== Collection Operations =====

/// Normalize a filter collection for external consumption.
///
/// Collapsed filters are removed and only the first entry per `columnName`
/// is kept. `normalize_filters(&normalize_filters(f)) == normalize_filters(f)`.
pub fn normalize_filters(filters: &[ColumnFilter]) -> Vec<ColumnFilter> {
    let mut seen = HashSet::new();
    filters
        .iter()
        .filter(|f| !f.column_name.is_empty())
        .filter_map(ColumnFilter::normalized)
        .filter(|f| seen.insert(f.column_name.clone()))
        .collect()
}

/// Entry for `column_name`, if any.
pub fn find_filter<'a>(filters: &'a [ColumnFilter], column_name: &str) -> Option<&'a ColumnFilter> {
    filters.iter().find(|f| f.column_name == column_name)
}

/// Insert or replace the filter for `filter.column_name`.
///
/// An existing entry keeps its position; its operator and conditions are
/// replaced.
pub fn upsert_filter(filters: &mut Vec<ColumnFilter>, filter: ColumnFilter) {
    match filters
        .iter_mut()
        .find(|f| f.column_name == filter.column_name)
    {
        Some(existing) => {
            existing.filter_type = filter.filter_type;
            existing.operator = filter.operator;
            existing.conditions = filter.conditions;
        }
        None => filters.push(filter),
    }
}

/// Remove every entry for `column_name`. Returns whether anything was removed.
pub fn remove_filter(filters: &mut Vec<ColumnFilter>, column_name: &str) -> bool {
    let before = filters.len();
    filters.retain(|f| f.column_name != column_name);
    filters.len() != before
}

// ===== Tests =====

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
