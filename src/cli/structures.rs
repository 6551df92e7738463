//! Structures command implementation

use colored::Colorize;
use tabled::Tabled;

use crate::cli::{CommandContext, OutputFormat};
use crate::client::models::{StructureSample, TreeNode};
use crate::dashboard::{StructureEntry, StructuresReport};
use crate::error::Result;
use crate::output::formatters::{live_summary, source_label};
use crate::output::{json, table};

/// Structure sample for table display
#[derive(Tabled)]
struct SampleDisplay {
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "SOURCE")]
    source: String,
    #[tabled(rename = "SIZE")]
    size: usize,
    #[tabled(rename = "SUMMARY")]
    summary: String,
}

impl From<&StructureEntry> for SampleDisplay {
    fn from(entry: &StructureEntry) -> Self {
        Self {
            kind: entry.kind.to_string(),
            source: entry.source.to_string(),
            size: entry.sample.len(),
            summary: entry.sample.summary(),
        }
    }
}

/// Indented tree rendering, one node per line
fn render_tree(node: &TreeNode, depth: usize, out: &mut Vec<String>) {
    let marker = if depth == 0 { "" } else { "└─ " };
    out.push(format!("{}{}{}", "   ".repeat(depth), marker, node.value));
    for child in node.children() {
        render_tree(child, depth + 1, out);
    }
}

fn print_pretty(report: &StructuresReport) {
    println!(
        "{}  {}\n",
        "Data-structure samples".bold(),
        live_summary(report.live_count, report.entries.len())
    );

    for entry in &report.entries {
        println!("{} [{}]", entry.kind.name().bold(), source_label(entry.source));
        match &entry.sample {
            StructureSample::Tree(root) => {
                let mut lines = Vec::new();
                render_tree(root, 0, &mut lines);
                for line in lines {
                    println!("  {}", line);
                }
            }
            sample => println!("  {}", sample.summary()),
        }
    }
}

/// Run the structures command
pub async fn run(ctx: &CommandContext) -> Result<()> {
    let report = ctx.aggregator.get_structures(ctx.force_refresh).await;

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&report)?),
        OutputFormat::Table => {
            let rows: Vec<SampleDisplay> = report.entries.iter().map(SampleDisplay::from).collect();
            println!("{}", table::format_table(&rows));
        }
        OutputFormat::Pretty => print_pretty(&report),
    }

    Ok(())
}
