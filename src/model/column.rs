//! Grid column layout types.
//!
//! A [`GridColumn`] is identified by its `prop`; the display `name` may change
//! without breaking persisted layout. Render-only hints (width, frozen flags,
//! search configuration) are never written to the durable store.

use crate::model::filter::OperatorCode;
use crate::model::identifiers::GridName;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

// ===== SearchType =====

/// Input style of a column's filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SearchType {
    /// Several OR'd search terms entered as tags.
    #[default]
    #[serde(rename = "multi-text")]
    MultiText,
    /// A single free-text value.
    #[serde(rename = "text")]
    Text,
}

// ===== SearchConfig =====

/// Declares which operators are legal for a column and whether the
/// AND/OR selector is shown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// Input style of the popover.
    pub search_type: SearchType,

    /// Operators offered for this column; unset or empty means the
    /// configured defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_type_filter_options: Option<Vec<OperatorCode>>,

    /// Overrides whether the AND/OR selector is shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_operator: Option<bool>,
}

impl SearchConfig {
    /// Config offering every default operator.
    pub fn new(search_type: SearchType) -> Self {
        Self {
            search_type,
            search_type_filter_options: None,
            enable_operator: None,
        }
    }

    /// Restrict the operators offered for this column.
    pub fn with_operators(mut self, operators: impl IntoIterator<Item = OperatorCode>) -> Self {
        self.search_type_filter_options = Some(operators.into_iter().collect());
        self
    }

    /// Force the AND/OR selector on or off.
    pub fn with_enable_operator(mut self, enabled: bool) -> Self {
        self.enable_operator = Some(enabled);
        self
    }

    /// Operators offered in the filter popover.
    ///
    /// The declared restriction wins when present and non-empty; otherwise
    /// the configured default operator set is used.
    pub fn operator_options(&self, defaults: &[OperatorCode]) -> Vec<OperatorCode> {
        match &self.search_type_filter_options {
            Some(options) if !options.is_empty() => {
                let mut seen = HashSet::new();
                options.iter().copied().filter(|op| seen.insert(*op)).collect()
            }
            _ => defaults.to_vec(),
        }
    }

    /// Whether the AND/OR selector (and with it the secondary condition) is
    /// permitted. Defaults to `true` for multi-text and `false` for text.
    pub fn operator_permitted(&self) -> bool {
        self.enable_operator
            .unwrap_or(self.search_type == SearchType::MultiText)
    }
}

// ===== GridColumn =====

/// One column of a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridColumn {
    /// Stable identity key.
    pub prop: String,
    /// Display label.
    #[serde(default)]
    pub name: String,
    /// Excluded from the rendered column set.
    #[serde(default)]
    pub hidden: bool,
    /// Offers a filter popover.
    #[serde(default)]
    pub searchable: bool,
    /// Exempt from "hide all" / "show all" bulk actions.
    #[serde(default)]
    pub suppress_toggle: bool,

    /// Render hint: pinned to the left edge.
    #[serde(skip)]
    pub frozen_left: bool,
    /// Render hint: pinned to the right edge.
    #[serde(skip)]
    pub frozen_right: bool,
    /// Render hint: width in pixels.
    #[serde(skip)]
    pub width: Option<u32>,
    /// Filter popover settings. Not persisted.
    #[serde(skip)]
    pub search_config: Option<SearchConfig>,
}

impl GridColumn {
    /// Create a visible, non-searchable column.
    pub fn new(prop: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            prop: prop.into(),
            name: name.into(),
            hidden: false,
            searchable: false,
            suppress_toggle: false,
            frozen_left: false,
            frozen_right: false,
            width: None,
            search_config: None,
        }
    }

    /// Set initial visibility.
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Mark the column searchable with the given search configuration.
    pub fn searchable(mut self, config: SearchConfig) -> Self {
        self.searchable = true;
        self.search_config = Some(config);
        self
    }

    /// Exempt from bulk show/hide.
    pub fn suppress_toggle(mut self) -> Self {
        self.suppress_toggle = true;
        self
    }

    /// Set the width render hint.
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Pin to the left edge.
    pub fn frozen_left(mut self) -> Self {
        self.frozen_left = true;
        self
    }

    /// Pin to the right edge.
    pub fn frozen_right(mut self) -> Self {
        self.frozen_right = true;
        self
    }

    /// Search configuration, falling back to a multi-text default for
    /// searchable columns that declare none.
    pub fn effective_search_config(&self) -> Option<SearchConfig> {
        if !self.searchable {
            return None;
        }
        Some(self.search_config.clone().unwrap_or_default())
    }

    /// Persisted-safe projection: render-only fields cleared.
    pub fn persisted(&self) -> GridColumn {
        GridColumn {
            prop: self.prop.clone(),
            name: self.name.clone(),
            hidden: self.hidden,
            searchable: self.searchable,
            suppress_toggle: self.suppress_toggle,
            frozen_left: false,
            frozen_right: false,
            width: None,
            search_config: None,
        }
    }

    /// Rebuild the render column list from a stored layout.
    ///
    /// Order and `hidden` come from `stored`; every other field comes from the
    /// declared default with the same `prop`. Stored props that are no longer
    /// declared are dropped, and declared columns missing from `stored` are
    /// appended in declared order.
    pub fn merge_layout(defaults: &[GridColumn], stored: &[GridColumn]) -> Vec<GridColumn> {
        let mut placed = HashSet::new();
        let mut merged = Vec::with_capacity(defaults.len());

        for saved in stored {
            let Some(declared) = defaults.iter().find(|c| c.prop == saved.prop) else {
                continue;
            };
            if placed.insert(declared.prop.as_str()) {
                merged.push(declared.clone().hidden(saved.hidden));
            }
        }

        for declared in defaults {
            if placed.insert(declared.prop.as_str()) {
                merged.push(declared.clone());
            }
        }

        merged
    }
}

/// `(prop, name)` identity pairs of a column set, order-insensitive.
pub fn column_identities(columns: &[GridColumn]) -> BTreeSet<(&str, &str)> {
    columns
        .iter()
        .map(|c| (c.prop.as_str(), c.name.as_str()))
        .collect()
}

// ===== GridConfiguration =====

/// Durable per-grid column layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfiguration {
    /// Grid this layout belongs to.
    pub grid_name: GridName,
    /// Columns in display order.
    #[serde(default)]
    pub columns: Vec<GridColumn>,
}

impl GridConfiguration {
    /// Layout over `columns`, taken as is.
    pub fn new(grid_name: GridName, columns: Vec<GridColumn>) -> Self {
        Self { grid_name, columns }
    }

    /// Persisted-safe copy: projected columns, empty props dropped,
    /// duplicate props collapsed to their first occurrence.
    pub fn persisted(&self) -> GridConfiguration {
        let mut seen = HashSet::new();
        let columns = self
            .columns
            .iter()
            .filter(|c| !c.prop.is_empty())
            .filter(|c| seen.insert(c.prop.as_str()))
            .map(GridColumn::persisted)
            .collect();

        GridConfiguration {
            grid_name: self.grid_name.clone(),
            columns,
        }
    }

    /// Column with the given `prop`.
    pub fn column(&self, prop: &str) -> Option<&GridColumn> {
        self.columns.iter().find(|c| c.prop == prop)
    }

    /// Non-hidden columns in display order.
    pub fn visible_columns(&self) -> impl Iterator<Item = &GridColumn> {
        self.columns.iter().filter(|c| !c.hidden)
    }
}

// ===== Tests =====
