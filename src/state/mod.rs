//! Interaction state machines (pure).
//!
//! All state transitions are plain functions over owned data and are
//! testable without a rendering layer.

pub mod advanced_filter;
pub mod broadcast;
pub mod inline_filter;
pub mod reorder;

// Re-export for convenience
pub use advanced_filter::{
    AdvancedFilterController, AdvancedFilterPayload, AdvancedFilterRequest, FilterRow,
    InvalidRows, ModalAction, ModalResult,
};
pub use broadcast::{Broadcaster, SubscriptionId};
pub use inline_filter::{
    ApplyOutcome, ConditionDraft, ConditionSlot, DismissTarget, FilterDraft,
    InlineFilterController, InlineFilterState,
};
pub use reorder::{move_item, rebuild_with_visible_order, reorder_visible};
