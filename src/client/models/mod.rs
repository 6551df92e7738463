//! Backend payload models

pub mod structures;
pub mod traffic;

pub use structures::{ListItem, StructureKind, StructureSample, TreeNode};
pub use traffic::{
    Bottleneck, Count, DashboardData, SpeedEvolution, TotalVolume, TrafficEvolution, count_f64,
};
