//! Domain types and DTOs
//!
//! These types define the data structures shared by the planner, the cost
//! calculator and the HTTP layer.

pub mod ai;
pub mod estimate;
pub mod plan;

// Re-export commonly used types
pub use estimate::*;
pub use plan::*;

// AI wire types are accessed via crate::domain::ai:: to avoid namespace pollution
