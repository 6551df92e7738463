//! Dashboard composite assembly
//!
//! Every field is requested concurrently and settled on its own: a field
//! that fails or arrives in the wrong shape falls back to backup data
//! without affecting its siblings. The merged result is cached under one
//! composite key.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::accessor::{EndpointAccessor, Source, Sourced};
use super::backup::backup_dashboard;
use super::fields::{DashboardField, LogicalField};
use crate::cache::{COMPOSITE_KEY, CacheStore, STRUCTURES_KEY};
use crate::client::Transport;
use crate::client::models::{DashboardData, StructureKind, StructureSample};

/// The merged composite plus per-field provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeReport {
    pub data: DashboardData,
    /// Field name → source
    pub sources: BTreeMap<String, Source>,
    /// Fields served from cache or network when the composite was built
    pub live_count: usize,
    pub total: usize,
    /// True when this report was served whole from the composite cache
    #[serde(default)]
    pub from_cache: bool,
    pub generated_at: DateTime<Utc>,
}

impl CompositeReport {
    pub fn source_of(&self, field: DashboardField) -> Option<Source> {
        self.sources.get(field.name()).copied()
    }

    pub fn is_fully_live(&self) -> bool {
        self.live_count == self.total
    }
}

/// One settled structure sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureEntry {
    pub kind: StructureKind,
    pub source: Source,
    pub sample: StructureSample,
}

/// All structure samples in fixed kind order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuresReport {
    pub entries: Vec<StructureEntry>,
    pub live_count: usize,
    #[serde(default)]
    pub from_cache: bool,
    pub generated_at: DateTime<Utc>,
}

/// Builds dashboard composites on top of an [`EndpointAccessor`]
pub struct Aggregator<T: Transport> {
    accessor: EndpointAccessor<T>,
    store: Arc<CacheStore>,
}

/// Decode a field payload; a shape mismatch settles to the backup value
fn settle<D: DeserializeOwned>(field: DashboardField, sourced: Sourced<Value>, fallback: D) -> (D, Source) {
    match serde_json::from_value(sourced.value) {
        Ok(value) => (value, sourced.source),
        Err(e) => {
            warn!("{} payload has unexpected shape ({}), using backup data", field, e);
            (fallback, Source::Backup)
        }
    }
}

impl<T: Transport> Aggregator<T> {
    pub fn new(accessor: EndpointAccessor<T>) -> Self {
        let store = Arc::clone(accessor.store());
        Self { accessor, store }
    }

    pub fn accessor(&self) -> &EndpointAccessor<T> {
        &self.accessor
    }

    /// Fetch one field through the accessor
    pub async fn get_field(&self, field: DashboardField, force_refresh: bool) -> Sourced<Value> {
        self.accessor.get_endpoint(field, force_refresh).await
    }

    /// Drop one field's cached payload and the composite built from it.
    /// Returns whether the field had an entry.
    pub fn invalidate_field(&self, field: DashboardField) -> bool {
        self.store.invalidate(COMPOSITE_KEY);
        self.accessor.invalidate(field.path())
    }

    /// Drop every cached payload, composites included
    pub fn clear_cache(&self) -> usize {
        self.accessor.clear()
    }

    /// Build the dashboard composite. Never fails.
    pub async fn get_composite(&self, force_refresh: bool) -> CompositeReport {
        if !force_refresh {
            if let Some(mut cached) = self.store.get_as::<CompositeReport>(COMPOSITE_KEY) {
                debug!("Cache hit: {}", COMPOSITE_KEY);
                cached.from_cache = true;
                return cached;
            }
        }

        let started = Instant::now();
        let a = &self.accessor;

        let (tv, vl, hp, sp, bn, te, se, vd) = futures::join!(
            a.get_endpoint(DashboardField::TotalVolume, force_refresh),
            a.get_endpoint(DashboardField::VolumeByLane, force_refresh),
            a.get_endpoint(DashboardField::HourlyPatterns, force_refresh),
            a.get_endpoint(DashboardField::AvgSpeedByLane, force_refresh),
            a.get_endpoint(DashboardField::Bottlenecks, force_refresh),
            a.get_endpoint(DashboardField::TrafficEvolution, force_refresh),
            a.get_endpoint(DashboardField::SpeedEvolution, force_refresh),
            a.get_endpoint(DashboardField::VehicleTypeDominance, force_refresh),
        );

        let backup = backup_dashboard();
        let mut sources = BTreeMap::new();
        let mut record = |field: DashboardField, source: Source| {
            sources.insert(field.name().to_string(), source);
        };

        let (total_volume, s) = settle(DashboardField::TotalVolume, tv, backup.total_volume);
        record(DashboardField::TotalVolume, s);
        let (volume_by_lane, s) = settle(DashboardField::VolumeByLane, vl, backup.volume_by_lane);
        record(DashboardField::VolumeByLane, s);
        let (hourly_patterns, s) =
            settle(DashboardField::HourlyPatterns, hp, backup.hourly_patterns);
        record(DashboardField::HourlyPatterns, s);
        let (avg_speed_by_lane, s) =
            settle(DashboardField::AvgSpeedByLane, sp, backup.avg_speed_by_lane);
        record(DashboardField::AvgSpeedByLane, s);
        let (bottlenecks, s) = settle(DashboardField::Bottlenecks, bn, backup.bottlenecks);
        record(DashboardField::Bottlenecks, s);
        let (traffic_evolution, s) =
            settle(DashboardField::TrafficEvolution, te, backup.traffic_evolution);
        record(DashboardField::TrafficEvolution, s);
        let (speed_evolution, s) =
            settle(DashboardField::SpeedEvolution, se, backup.speed_evolution);
        record(DashboardField::SpeedEvolution, s);
        let (vehicle_type_dominance, s) = settle(
            DashboardField::VehicleTypeDominance,
            vd,
            backup.vehicle_type_dominance,
        );
        record(DashboardField::VehicleTypeDominance, s);

        let live_count = sources.values().filter(|s| s.is_live()).count();
        let report = CompositeReport {
            data: DashboardData {
                total_volume,
                volume_by_lane,
                hourly_patterns,
                avg_speed_by_lane,
                bottlenecks,
                traffic_evolution,
                speed_evolution,
                vehicle_type_dominance,
            },
            total: sources.len(),
            sources,
            live_count,
            from_cache: false,
            generated_at: Utc::now(),
        };

        match serde_json::to_value(&report) {
            Ok(value) => self.store.set(COMPOSITE_KEY, value),
            Err(e) => warn!("Could not cache dashboard composite: {}", e),
        }

        info!(
            "Dashboard composite: {} of {} fields live ({:.0?})",
            report.live_count,
            report.total,
            started.elapsed()
        );
        let stats = self.store.stats();
        debug!(
            "Cache holds {} entries ({} fresh, {} stale)",
            stats.total_entries, stats.fresh_entries, stats.stale_entries
        );
        report
    }

    /// Fetch every structure sample. Never fails.
    pub async fn get_structures(&self, force_refresh: bool) -> StructuresReport {
        if !force_refresh {
            if let Some(mut cached) = self.store.get_as::<StructuresReport>(STRUCTURES_KEY) {
                debug!("Cache hit: {}", STRUCTURES_KEY);
                cached.from_cache = true;
                return cached;
            }
        }

        let started = Instant::now();
        let settled = futures::future::join_all(
            StructureKind::ALL
                .iter()
                .map(|kind| self.accessor.get_endpoint(*kind, force_refresh)),
        )
        .await;

        let entries: Vec<StructureEntry> = StructureKind::ALL
            .iter()
            .zip(settled)
            .map(|(kind, sourced)| {
                let sample = StructureSample::decode(*kind, sourced.value);
                if sample.is_raw() && sourced.source == Source::Backup {
                    // Backup data always has a known shape
                    let backup = StructureSample::decode(*kind, kind.backup());
                    return StructureEntry {
                        kind: *kind,
                        source: Source::Backup,
                        sample: backup,
                    };
                }
                StructureEntry {
                    kind: *kind,
                    source: sourced.source,
                    sample,
                }
            })
            .collect();

        let live_count = entries.iter().filter(|e| e.source.is_live()).count();
        let report = StructuresReport {
            entries,
            live_count,
            from_cache: false,
            generated_at: Utc::now(),
        };

        match serde_json::to_value(&report) {
            Ok(value) => self.store.set(STRUCTURES_KEY, value),
            Err(e) => warn!("Could not cache structure samples: {}", e),
        }

        info!(
            "Structure samples: {} of {} live ({:.0?})",
            report.live_count,
            report.entries.len(),
            started.elapsed()
        );
        report
    }
}
