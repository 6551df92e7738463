//! Watch command implementation
//!
//! On an interactive terminal, Enter clears the cache and refreshes at once;
//! a field name followed by Enter drops only that field.

use std::io::{BufRead, IsTerminal};
use std::time::Duration;

use chrono::Local;
use colored::Colorize;
use tokio::sync::mpsc;

use crate::cli::{CommandContext, OutputFormat};
use crate::dashboard::{CompositeReport, DashboardField};
use crate::error::{ConfigError, Result};
use crate::output::json;

/// Options for the watch loop
#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    pub interval: Duration,
    /// Force a backend fetch on every tick
    pub force: bool,
    /// Stop after this many ticks
    pub count: Option<u32>,
}

impl WatchOptions {
    /// Resolve flags against the configured refresh interval
    pub fn resolve(
        ctx: &CommandContext,
        interval_secs: Option<u64>,
        force: bool,
        count: Option<u32>,
    ) -> Result<Self> {
        let interval = match interval_secs {
            Some(0) => {
                return Err(
                    ConfigError::Invalid("--interval must be greater than 0".to_string()).into(),
                );
            }
            Some(secs) => Duration::from_secs(secs),
            None => ctx.config.refresh_interval(),
        };

        if count == Some(0) {
            return Err(ConfigError::Invalid("--count must be greater than 0".to_string()).into());
        }

        Ok(Self {
            interval,
            force,
            count,
        })
    }
}

/// One status line per refresh
fn tick_line(report: &CompositeReport) -> String {
    let origin = if report.from_cache { " (cached)" } else { "" };
    format!(
        "{}/{} live, updated {}{}",
        report.live_count,
        report.total,
        Local::now().format("%H:%M:%S"),
        origin
    )
}

fn print_tick(ctx: &CommandContext, report: &CompositeReport) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json_line(report)?),
        OutputFormat::Table | OutputFormat::Pretty => {
            let line = tick_line(report);
            let line = if report.is_fully_live() {
                line.green()
            } else if report.live_count == 0 {
                line.red()
            } else {
                line.yellow()
            };
            println!("{}", line);
        }
    }
    Ok(())
}

/// A cache reset typed on the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reset {
    All,
    Field(DashboardField),
}

fn parse_reset(line: &str) -> Option<Reset> {
    let line = line.trim();
    if line.is_empty() {
        Some(Reset::All)
    } else {
        DashboardField::from_name(line).map(Reset::Field)
    }
}

/// Read stdin lines on a plain thread; tokio's stdin would keep the runtime
/// from shutting down while a read is pending.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn next_input(input: &mut Option<mpsc::UnboundedReceiver<String>>) -> Option<String> {
    match input {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn apply_reset(ctx: &CommandContext, reset: Reset) {
    match reset {
        Reset::All => {
            let dropped = ctx.aggregator.clear_cache();
            eprintln!("Cleared {} cached entries", dropped);
        }
        Reset::Field(field) => {
            ctx.aggregator.invalidate_field(field);
            eprintln!("Dropped cached {}", field);
        }
    }
}

enum Event {
    Refreshed(Box<CompositeReport>),
    Input(Option<String>),
    Stop,
}

/// Run the watch command until Ctrl-C or the tick budget is spent
pub async fn run(ctx: &CommandContext, opts: WatchOptions) -> Result<()> {
    let mut ticker = tokio::time::interval(opts.interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut ticks = 0u32;

    let interactive = std::io::stdin().is_terminal();
    let mut input = interactive.then(spawn_input_reader);

    if ctx.format != OutputFormat::Json {
        eprintln!(
            "Refreshing every {}s, press Ctrl-C to stop",
            opts.interval.as_secs()
        );
        if interactive {
            eprintln!("Press Enter to clear the cache, or type a field name to drop it");
        }
    }

    loop {
        // The first refresh honours --refresh as well
        let force = opts.force || (ticks == 0 && ctx.force_refresh);
        let refresh = async {
            ticker.tick().await;
            ctx.aggregator.get_composite(force).await
        };

        let event = tokio::select! {
            report = refresh => Event::Refreshed(Box::new(report)),
            line = next_input(&mut input) => Event::Input(line),
            _ = tokio::signal::ctrl_c() => Event::Stop,
        };

        match event {
            Event::Refreshed(report) => {
                print_tick(ctx, &report)?;

                ticks += 1;
                if opts.count.is_some_and(|n| ticks >= n) {
                    break;
                }
            }
            Event::Input(Some(line)) => match parse_reset(&line) {
                Some(reset) => {
                    apply_reset(ctx, reset);
                    ticker.reset_immediately();
                }
                None => eprintln!("Unknown field: {}", line.trim()),
            },
            Event::Input(None) => input = None,
            Event::Stop => {
                eprintln!("Stopped after {} refresh(es)", ticks);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::backup::backup_dashboard;
    use std::collections::BTreeMap;

    #[test]
    fn test_tick_line() {
        let report = CompositeReport {
            data: backup_dashboard(),
            sources: BTreeMap::new(),
            live_count: 5,
            total: 8,
            from_cache: true,
            generated_at: chrono::Utc::now(),
        };

        let line = tick_line(&report);

        assert!(line.starts_with("5/8 live, updated "));
        assert!(line.ends_with(" (cached)"));
    }

    #[test]
    fn test_parse_reset() {
        assert_eq!(parse_reset(""), Some(Reset::All));
        assert_eq!(parse_reset("  \n"), Some(Reset::All));
        assert_eq!(
            parse_reset("bottlenecks"),
            Some(Reset::Field(DashboardField::Bottlenecks))
        );
        assert_eq!(
            parse_reset(" total-volume "),
            Some(Reset::Field(DashboardField::TotalVolume))
        );
        assert_eq!(parse_reset("weather"), None);
    }
}
