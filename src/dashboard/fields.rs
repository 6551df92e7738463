//! Logical dashboard fields and their backend paths

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::backup;
use crate::client::models::StructureKind;

/// A value the accessor can fetch: one endpoint, one backup default
pub trait LogicalField: Copy + fmt::Display + Send + Sync {
    /// Path appended to the backend base URL
    fn path(&self) -> &'static str;

    /// Static fallback with the same shape as the live payload
    fn backup(&self) -> Value;
}

/// The eight fields of the dashboard composite
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "camelCase")]
pub enum DashboardField {
    TotalVolume,
    VolumeByLane,
    HourlyPatterns,
    AvgSpeedByLane,
    Bottlenecks,
    TrafficEvolution,
    SpeedEvolution,
    VehicleTypeDominance,
}

impl DashboardField {
    pub const ALL: [DashboardField; 8] = [
        DashboardField::TotalVolume,
        DashboardField::VolumeByLane,
        DashboardField::HourlyPatterns,
        DashboardField::AvgSpeedByLane,
        DashboardField::Bottlenecks,
        DashboardField::TrafficEvolution,
        DashboardField::SpeedEvolution,
        DashboardField::VehicleTypeDominance,
    ];

    /// Name of the field in the composite payload
    pub fn name(&self) -> &'static str {
        match self {
            DashboardField::TotalVolume => "totalVolume",
            DashboardField::VolumeByLane => "volumeByLane",
            DashboardField::HourlyPatterns => "hourlyPatterns",
            DashboardField::AvgSpeedByLane => "avgSpeedByLane",
            DashboardField::Bottlenecks => "bottlenecks",
            DashboardField::TrafficEvolution => "trafficEvolution",
            DashboardField::SpeedEvolution => "speedEvolution",
            DashboardField::VehicleTypeDominance => "vehicleTypeDominance",
        }
    }

    /// Look up a field by its composite name or its command-line spelling
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| {
            field.name().eq_ignore_ascii_case(name)
                || field
                    .to_possible_value()
                    .is_some_and(|value| value.matches(name, true))
        })
    }
}

impl fmt::Display for DashboardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl LogicalField for DashboardField {
    fn path(&self) -> &'static str {
        match self {
            DashboardField::TotalVolume => "/detections/volume/total",
            DashboardField::VolumeByLane => "/detections/volume/by-lane",
            DashboardField::HourlyPatterns => "/detections/patterns/hourly",
            DashboardField::AvgSpeedByLane => "/detections/lanes/speed",
            DashboardField::Bottlenecks => "/detections/lanes/bottlenecks",
            DashboardField::TrafficEvolution => "/detections/temporal/evolution",
            DashboardField::SpeedEvolution => "/detections/temporal/speed",
            DashboardField::VehicleTypeDominance => "/detections/vehicle-types/dominance",
        }
    }

    fn backup(&self) -> Value {
        backup::backup_value(*self)
    }
}

impl LogicalField for StructureKind {
    fn path(&self) -> &'static str {
        StructureKind::path(self)
    }

    fn backup(&self) -> Value {
        backup::backup_structure(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_paths_are_unique() {
        let mut paths: Vec<_> = DashboardField::ALL.iter().map(|f| f.path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 8);
    }

    #[test]
    fn test_field_name_matches_serde_name() {
        for field in DashboardField::ALL {
            let serialized = serde_json::to_value(field).unwrap();
            assert_eq!(serialized, Value::String(field.name().to_string()));
        }
    }

    #[test]
    fn test_speed_paths_do_not_collide() {
        assert_ne!(
            DashboardField::AvgSpeedByLane.path(),
            DashboardField::SpeedEvolution.path()
        );
        assert_eq!(
            DashboardField::AvgSpeedByLane.path(),
            "/detections/lanes/speed"
        );
    }

    #[test]
    fn test_from_name_accepts_both_spellings() {
        assert_eq!(
            DashboardField::from_name("hourlyPatterns"),
            Some(DashboardField::HourlyPatterns)
        );
        assert_eq!(
            DashboardField::from_name("avg-speed-by-lane"),
            Some(DashboardField::AvgSpeedByLane)
        );
        assert_eq!(DashboardField::from_name("weather"), None);
    }

    #[test]
    fn test_structure_kind_is_logical_field() {
        let kind = StructureKind::Tree;
        assert_eq!(LogicalField::path(&kind), "/detections/structures/tree");
        assert!(kind.backup().get("value").is_some());
    }
}
