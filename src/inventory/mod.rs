//! Inventory recommendations derived from forecast demand.

mod planner;

pub use planner::{InventoryPlanner, InventoryRow, SafetyRatio, YearMonth};
