//! Domain model types (pure).
//!
//! All types in this module are plain data with smart constructors and
//! normalization rules; none of them perform I/O.

pub mod column;
pub mod error;
pub mod filter;
pub mod identifiers;

// Re-export for convenience
pub use column::{column_identities, GridColumn, GridConfiguration, SearchConfig, SearchType};
pub use error::StoreError;
pub use filter::{
    find_filter, normalize_filters, normalize_tags, remove_filter, upsert_filter, ColumnFilter,
    ColumnFilterCondition, FilterType, JoinOperator, OperatorCode, MAX_CONDITIONS,
};
pub use identifiers::{GridName, InvalidGridName};
