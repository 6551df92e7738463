//! Dashboard command implementation

use colored::Colorize;
use tabled::Tabled;

use crate::cli::{CommandContext, OutputFormat};
use crate::client::models::{DashboardData, count_f64};
use crate::dashboard::{CompositeReport, DashboardField};
use crate::error::Result;
use crate::output::formatters::{BAR_WIDTH, bar, format_count, live_summary, source_label};
use crate::output::{json, table};

/// Dashboard field for table display
#[derive(Tabled)]
struct FieldDisplay {
    #[tabled(rename = "FIELD")]
    field: String,
    #[tabled(rename = "SOURCE")]
    source: String,
    #[tabled(rename = "SUMMARY")]
    summary: String,
}

/// One-line description of a field's value
pub(crate) fn field_summary(data: &DashboardData, field: DashboardField) -> String {
    match field {
        DashboardField::TotalVolume => {
            let parts: Vec<String> = data
                .total_volume
                .total
                .iter()
                .map(|(kind, n)| format!("{}={}", kind, n))
                .collect();
            format!(
                "{} vehicles ({})",
                format_count(data.total_volume.vehicle_total()),
                parts.join(", ")
            )
        }
        DashboardField::VolumeByLane => {
            let parts: Vec<String> = data
                .volume_by_lane
                .iter()
                .map(|(lane, counts)| {
                    let total: f64 = counts.values().map(count_f64).sum();
                    format!("{}={}", lane, format_count(total))
                })
                .collect();
            parts.join(", ")
        }
        DashboardField::HourlyPatterns => match data
            .hourly_patterns
            .iter()
            .map(|(hour, n)| (hour, count_f64(n)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
        {
            Some((hour, n)) => format!(
                "{} hours, peak {} ({})",
                data.hourly_patterns.len(),
                hour,
                format_count(n)
            ),
            None => "no data".to_string(),
        },
        DashboardField::AvgSpeedByLane => {
            let parts: Vec<String> = data
                .avg_speed_by_lane
                .iter()
                .map(|(lane, speed)| format!("{}={:.1} km/h", lane, speed))
                .collect();
            parts.join(", ")
        }
        DashboardField::Bottlenecks => {
            if data.bottlenecks.is_empty() {
                "none".to_string()
            } else {
                let lanes: Vec<String> = data
                    .bottlenecks
                    .iter()
                    .map(|b| format!("{} ({:.1} km/h)", b.lane, b.avg_speed))
                    .collect();
                lanes.join(", ")
            }
        }
        DashboardField::TrafficEvolution => {
            let series = &data.traffic_evolution;
            format!(
                "{} points, {} to {}",
                series.timestamps.len(),
                series.timestamps.first().map_or("-", String::as_str),
                series.timestamps.last().map_or("-", String::as_str)
            )
        }
        DashboardField::SpeedEvolution => {
            let series = &data.speed_evolution;
            format!(
                "{} points, latest {:.0}/{:.0}/{:.0} km/h",
                series.timestamps.len(),
                series.lane_1.last().copied().unwrap_or_default(),
                series.lane_2.last().copied().unwrap_or_default(),
                series.lane_3.last().copied().unwrap_or_default()
            )
        }
        DashboardField::VehicleTypeDominance => {
            let parts: Vec<String> = data
                .vehicle_type_dominance
                .iter()
                .map(|(kind, share)| format!("{} {:.1}%", kind, share))
                .collect();
            parts.join(", ")
        }
    }
}

fn print_pretty(report: &CompositeReport) {
    let data = &report.data;

    let origin = if report.from_cache {
        " (cached)".dimmed().to_string()
    } else {
        String::new()
    };
    println!(
        "{}  {}{}\n",
        "Traffic Dashboard".bold(),
        live_summary(report.live_count, report.total),
        origin
    );

    for field in DashboardField::ALL {
        let source = report
            .source_of(field)
            .map(|s| source_label(s).to_string())
            .unwrap_or_default();
        println!("{} [{}]", field.name().bold(), source);
        println!("  {}", field_summary(data, field));
    }

    println!("\n{}", "Hourly pattern".bold());
    let peak = data
        .hourly_patterns
        .values()
        .map(count_f64)
        .fold(0.0_f64, f64::max);
    for (hour, n) in &data.hourly_patterns {
        let n = count_f64(n);
        println!(
            "  {} {:>5} {}",
            hour,
            format_count(n),
            bar(n, peak, BAR_WIDTH).cyan()
        );
    }

    println!("\n{}", "Average speed by lane".bold());
    let fastest = data
        .avg_speed_by_lane
        .values()
        .copied()
        .fold(0.0_f64, f64::max);
    for (lane, speed) in &data.avg_speed_by_lane {
        println!(
            "  {:<8} {:>6.1} {}",
            lane,
            speed,
            bar(*speed, fastest, BAR_WIDTH).green()
        );
    }

    if !data.bottlenecks.is_empty() {
        println!("\n{}", "Bottlenecks".bold());
        for b in &data.bottlenecks {
            println!(
                "  {} {} at {:.1} km/h, {} vehicles ({} heavy)",
                "⚠".yellow(),
                b.lane,
                b.avg_speed,
                b.total_vehicles,
                b.heavy_vehicles
            );
        }
    }
}

/// Run the dashboard command
pub async fn run(ctx: &CommandContext) -> Result<()> {
    let report = ctx.aggregator.get_composite(ctx.force_refresh).await;

    match ctx.format {
        OutputFormat::Json => {
            println!("{}", json::format_json(&report)?);
        }
        OutputFormat::Table => {
            let rows: Vec<FieldDisplay> = DashboardField::ALL
                .iter()
                .map(|field| FieldDisplay {
                    field: field.name().to_string(),
                    source: report
                        .source_of(*field)
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                    summary: field_summary(&report.data, *field),
                })
                .collect();
            println!("{}", table::format_table(&rows));
            println!("{}", live_summary(report.live_count, report.total));
        }
        OutputFormat::Pretty => print_pretty(&report),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::backup::backup_dashboard;

    #[test]
    fn test_summaries_for_backup_data() {
        let data = backup_dashboard();

        assert_eq!(
            field_summary(&data, DashboardField::TotalVolume),
            "40 vehicles (bus=5, car=25, truck=10)"
        );
        assert_eq!(
            field_summary(&data, DashboardField::VolumeByLane),
            "lane_1=16, lane_2=10, lane_3=7"
        );
        assert_eq!(
            field_summary(&data, DashboardField::HourlyPatterns),
            "12 hours, peak 18:00 (210)"
        );
        assert_eq!(
            field_summary(&data, DashboardField::Bottlenecks),
            "lane_2 (12.5 km/h)"
        );
        assert_eq!(
            field_summary(&data, DashboardField::TrafficEvolution),
            "6 points, 08:00 to 13:00"
        );
    }

    #[test]
    fn test_summaries_show_fractional_counts() {
        let mut data = backup_dashboard();
        data.hourly_patterns = serde_json::from_value(serde_json::json!({
            "08:00": 12.5,
            "09:00": 4
        }))
        .unwrap();

        assert_eq!(
            field_summary(&data, DashboardField::HourlyPatterns),
            "2 hours, peak 08:00 (12.5)"
        );
    }

    #[test]
    fn test_summaries_tolerate_empty_data() {
        let mut data = backup_dashboard();
        data.hourly_patterns.clear();
        data.bottlenecks.clear();
        data.traffic_evolution.timestamps.clear();

        assert_eq!(field_summary(&data, DashboardField::HourlyPatterns), "no data");
        assert_eq!(field_summary(&data, DashboardField::Bottlenecks), "none");
        assert_eq!(
            field_summary(&data, DashboardField::TrafficEvolution),
            "0 points, - to -"
        );
    }
}
