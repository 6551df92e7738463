//! Dashboard data access
//!
//! Logical fields, the per-endpoint accessor with its fallback chain, the
//! static backup dataset and the composite aggregator.

pub mod accessor;
pub mod aggregator;
pub mod backup;
pub mod fields;

pub use accessor::{EndpointAccessor, Source, Sourced};
pub use aggregator::{Aggregator, CompositeReport, StructureEntry, StructuresReport};
pub use fields::{DashboardField, LogicalField};
