//! Traffic analytics payloads
//!
//! Map-shaped payloads use `BTreeMap` so rendering order is stable. Counts
//! stay JSON numbers and object payloads keep unknown keys, so a live value
//! survives decoding exactly as the backend sent it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A vehicle count. Integer or fractional, as sent.
pub type Count = Number;

/// Numeric view of a count for sums and bars
pub fn count_f64(count: &Count) -> f64 {
    count.as_f64().unwrap_or(0.0)
}

/// Vehicle type → count
pub type VehicleCounts = BTreeMap<String, Count>;

/// Lane → per-vehicle-type counts
pub type LaneVehicleCounts = BTreeMap<String, VehicleCounts>;

/// Hour label (e.g. "08:00") → vehicles seen
pub type HourlyPatterns = BTreeMap<String, Count>;

/// Lane → average speed in km/h
pub type SpeedByLane = BTreeMap<String, f64>;

/// Vehicle type → share of traffic in percent
pub type VehicleTypeDominance = BTreeMap<String, f64>;

/// Aggregated vehicle volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalVolume {
    /// Period of day → count
    #[serde(default)]
    pub hourly: BTreeMap<String, Count>,

    /// Day category → count
    #[serde(default)]
    pub daily: BTreeMap<String, Count>,

    /// Vehicle type → count
    #[serde(default)]
    pub total: VehicleCounts,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TotalVolume {
    /// Sum of all vehicle types
    pub fn vehicle_total(&self) -> f64 {
        self.total.values().map(count_f64).sum()
    }
}

/// A lane flagged as congested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bottleneck {
    pub lane: String,

    /// Average speed in km/h
    pub avg_speed: f64,

    pub total_vehicles: Count,

    /// Trucks and buses
    pub heavy_vehicles: Count,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-type vehicle counts over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficEvolution {
    pub timestamps: Vec<String>,
    #[serde(default)]
    pub car: Vec<Count>,
    #[serde(default)]
    pub bus: Vec<Count>,
    #[serde(default)]
    pub truck: Vec<Count>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-lane average speed over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedEvolution {
    pub timestamps: Vec<String>,
    #[serde(default)]
    pub lane_1: Vec<f64>,
    #[serde(default)]
    pub lane_2: Vec<f64>,
    #[serde(default)]
    pub lane_3: Vec<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The merged dashboard composite.
///
/// Every field is always populated; degraded fields carry backup data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub total_volume: TotalVolume,
    pub volume_by_lane: LaneVehicleCounts,
    pub hourly_patterns: HourlyPatterns,
    pub avg_speed_by_lane: SpeedByLane,
    pub bottlenecks: Vec<Bottleneck>,
    pub traffic_evolution: TrafficEvolution,
    pub speed_evolution: SpeedEvolution,
    pub vehicle_type_dominance: VehicleTypeDominance,
}
