//! Grid column configuration (gridcfg)
//!
//! Per-grid column layout persistence and a composable column filter
//! engine for data-grid widgets.
//!
//! The library follows a Pure Core / Impure Shell split: `model` and
//! `state` are plain data and transitions, `store` owns durable I/O, and
//! `grid` wires them together for a single grid instance.

pub mod config;
pub mod grid;
pub mod logging;
pub mod model;
pub mod state;
pub mod store;

pub use grid::{GridConfigurationCoordinator, SharedColumnStore, VisibilitySummary};
