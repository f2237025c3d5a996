use anyhow::Result;
use clap::Args;
use phrases_core::{ColumnSource, Inspection};
use std::io::Write;

#[derive(Args)]
pub struct InspectArgs {
    /// Print the raw inspection as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn render<W: Write>(inspection: &Inspection, json: bool, out: &mut W) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(inspection)?)?;
        return Ok(());
    }
    let source = match inspection.source {
        ColumnSource::Database => "database schema",
        ColumnSource::SampleItem => "first item",
    };
    if inspection.columns.is_empty() {
        writeln!(out, "No columns found ({source}).")?;
        return Ok(());
    }
    writeln!(out, "Columns ({source}):")?;
    for column in &inspection.columns {
        writeln!(out, "- \"{}\" ({})", column.name, column.kind)?;
    }
    Ok(())
}
