//! Static backup dataset
//!
//! Served when neither the network nor the cache can answer. Values are
//! fixed and internally consistent; only the list samples depend on the
//! current time.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::{Map, Number, Value, json};

use super::fields::DashboardField;
use crate::client::models::{
    Bottleneck, Count, DashboardData, ListItem, SpeedEvolution, StructureKind, TotalVolume,
    TrafficEvolution,
};

/// Items in each list-shaped structure sample
const LIST_SAMPLE_LEN: i64 = 8;

const ARRAY_SAMPLE: [i64; 8] = [45, 23, 78, 12, 90, 32, 56, 67];

fn counts(pairs: &[(&str, u64)]) -> BTreeMap<String, Count> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Number::from(*v)))
        .collect()
}

fn shares(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn series(values: &[u64]) -> Vec<Count> {
    values.iter().map(|v| Number::from(*v)).collect()
}

fn labels(hours: &[&str]) -> Vec<String> {
    hours.iter().map(|h| h.to_string()).collect()
}

/// The full backup composite
pub fn backup_dashboard() -> DashboardData {
    let timestamps = labels(&["08:00", "09:00", "10:00", "11:00", "12:00", "13:00"]);

    DashboardData {
        total_volume: TotalVolume {
            hourly: counts(&[("morning", 150), ("afternoon", 200), ("evening", 120)]),
            daily: counts(&[("weekday", 1800), ("weekend", 950)]),
            total: counts(&[("car", 25), ("bus", 5), ("truck", 10)]),
            extra: Map::new(),
        },
        volume_by_lane: BTreeMap::from([
            (
                "lane_1".to_string(),
                counts(&[("car", 12), ("truck", 3), ("bus", 1)]),
            ),
            ("lane_2".to_string(), counts(&[("car", 8), ("bus", 2)])),
            ("lane_3".to_string(), counts(&[("car", 5), ("truck", 2)])),
        ]),
        hourly_patterns: counts(&[
            ("08:00", 120),
            ("09:00", 180),
            ("10:00", 150),
            ("11:00", 130),
            ("12:00", 160),
            ("13:00", 170),
            ("14:00", 150),
            ("15:00", 145),
            ("16:00", 160),
            ("17:00", 190),
            ("18:00", 210),
            ("19:00", 180),
        ]),
        avg_speed_by_lane: shares(&[("lane_1", 85.2), ("lane_2", 62.8), ("lane_3", 78.5)]),
        bottlenecks: vec![Bottleneck {
            lane: "lane_2".to_string(),
            avg_speed: 12.5,
            total_vehicles: Number::from(45),
            heavy_vehicles: Number::from(8),
            extra: Map::new(),
        }],
        traffic_evolution: TrafficEvolution {
            timestamps: timestamps.clone(),
            car: series(&[12, 18, 25, 20, 22, 30]),
            bus: series(&[2, 3, 5, 4, 6, 7]),
            truck: series(&[3, 5, 7, 6, 8, 10]),
            extra: Map::new(),
        },
        speed_evolution: SpeedEvolution {
            timestamps,
            lane_1: vec![60.0, 65.0, 70.0, 68.0, 72.0, 75.0],
            lane_2: vec![50.0, 55.0, 58.0, 57.0, 60.0, 62.0],
            lane_3: vec![65.0, 70.0, 72.0, 73.0, 75.0, 78.0],
            extra: Map::new(),
        },
        vehicle_type_dominance: shares(&[("car", 65.8), ("bus", 12.5), ("truck", 21.7)]),
    }
}

fn to_value<T: Serialize>(value: &T) -> Value {
    // Plain structs and string-keyed maps always serialize
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Backup payload for one dashboard field, in wire shape
pub fn backup_value(field: DashboardField) -> Value {
    let data = backup_dashboard();
    match field {
        DashboardField::TotalVolume => to_value(&data.total_volume),
        DashboardField::VolumeByLane => to_value(&data.volume_by_lane),
        DashboardField::HourlyPatterns => to_value(&data.hourly_patterns),
        DashboardField::AvgSpeedByLane => to_value(&data.avg_speed_by_lane),
        DashboardField::Bottlenecks => to_value(&data.bottlenecks),
        DashboardField::TrafficEvolution => to_value(&data.traffic_evolution),
        DashboardField::SpeedEvolution => to_value(&data.speed_evolution),
        DashboardField::VehicleTypeDominance => to_value(&data.vehicle_type_dominance),
    }
}

/// Recent-detection records: item `i` is dated `i` hours ago
pub fn sample_list_items() -> Vec<ListItem> {
    let now = Utc::now();
    (1..=LIST_SAMPLE_LEN)
        .map(|i| ListItem {
            id: i,
            date: (now - Duration::hours(i))
                .format("%Y-%m-%d %H:%M")
                .to_string(),
        })
        .collect()
}

fn sample_tree() -> Value {
    let leaf = |label: &str| json!({ "value": label, "children": null });

    json!({
        "value": "Root",
        "children": [
            { "value": "A", "children": [leaf("A1"), leaf("A2")] },
            { "value": "B", "children": [leaf("B1"), leaf("B2")] }
        ]
    })
}

/// Backup payload for one structure sample, in wire shape
pub fn backup_structure(kind: StructureKind) -> Value {
    match kind {
        StructureKind::Array => json!(ARRAY_SAMPLE),
        StructureKind::Tree => sample_tree(),
        StructureKind::LinkedList
        | StructureKind::DoubleLinkedList
        | StructureKind::CircularDoubleLinkedList
        | StructureKind::Stack
        | StructureKind::Queue => to_value(&sample_list_items()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::StructureSample;

    #[test]
    fn test_backup_dashboard_values() {
        let data = backup_dashboard();

        assert!((data.total_volume.vehicle_total() - 40.0).abs() < 0.001);
        assert_eq!(data.total_volume.daily["weekday"], Number::from(1800));
        assert_eq!(data.volume_by_lane["lane_2"]["bus"], Number::from(2));
        assert_eq!(data.hourly_patterns.len(), 12);
        assert_eq!(data.hourly_patterns["18:00"], Number::from(210));
        assert!((data.avg_speed_by_lane["lane_1"] - 85.2).abs() < 0.001);
        assert_eq!(data.bottlenecks[0].heavy_vehicles, Number::from(8));
        assert_eq!(data.traffic_evolution.car, series(&[12, 18, 25, 20, 22, 30]));
        assert_eq!(data.speed_evolution.lane_3.last(), Some(&78.0));
    }

    #[test]
    fn test_backup_series_are_aligned() {
        let data = backup_dashboard();
        let traffic = &data.traffic_evolution;
        let speed = &data.speed_evolution;

        for len in [
            traffic.car.len(),
            traffic.bus.len(),
            traffic.truck.len(),
            speed.lane_1.len(),
            speed.lane_2.len(),
            speed.lane_3.len(),
        ] {
            assert_eq!(len, traffic.timestamps.len());
        }
    }

    #[test]
    fn test_dominance_sums_to_hundred() {
        let total: f64 = backup_dashboard().vehicle_type_dominance.values().sum();
        assert!((total - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_backup_value_has_wire_shape() {
        let value = backup_value(DashboardField::Bottlenecks);
        assert_eq!(value[0]["avgSpeed"], json!(12.5));
        assert_eq!(value[0]["totalVehicles"], json!(45));

        let volume = backup_value(DashboardField::TotalVolume);
        assert_eq!(volume["total"]["truck"], json!(10));
    }

    #[test]
    fn test_every_field_backup_decodes() {
        for field in DashboardField::ALL {
            assert!(!backup_value(field).is_null(), "{} backup is null", field);
        }
    }

    #[test]
    fn test_list_items_count_back_in_hours() {
        let items = sample_list_items();

        assert_eq!(items.len(), 8);
        assert_eq!(items[0].id, 1);
        assert_eq!(items[7].id, 8);
        // "YYYY-MM-DD HH:MM"
        assert_eq!(items[0].date.len(), 16);
        assert!(items[0].date > items[7].date);
    }

    #[test]
    fn test_list_items_are_dated_in_utc() {
        let hour_ago = || {
            (Utc::now() - Duration::hours(1))
                .format("%Y-%m-%d %H:%M")
                .to_string()
        };

        let before = hour_ago();
        let first = sample_list_items().remove(0);
        let after = hour_ago();

        assert!(first.date == before || first.date == after, "{}", first.date);
    }

    #[test]
    fn test_structure_backups_decode_to_typed_samples() {
        for kind in StructureKind::ALL {
            let sample = StructureSample::decode(kind, backup_structure(kind));
            assert!(!sample.is_raw(), "{} backup did not decode", kind);
        }
    }

    #[test]
    fn test_tree_backup_shape() {
        match StructureSample::decode(StructureKind::Tree, backup_structure(StructureKind::Tree)) {
            StructureSample::Tree(root) => {
                assert_eq!(root.node_count(), 7);
                assert_eq!(root.depth(), 3);
            }
            other => panic!("Expected tree, got {:?}", other),
        }
    }
}
