use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::sim::RunReport;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    /// Sent frames only, one hex line each.
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_report(report: &RunReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, value) in rows(report) {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} [{}] ({}) via {}: {} after {} poll(s)",
                report.operation,
                report.description,
                report.op_id,
                report.protocol,
                report.state,
                report.summary.polls
            );
            for frame in &report.frames {
                println!("  sent  {frame}");
            }
            for event in &report.events {
                println!("  event {}: {}", event.event, event.text);
            }
            if let Some(text) = &report.error_text {
                println!("  error {text}");
            }
            if let Some(seq) = report.sequence {
                println!("  sequence {seq}");
            }
        }
        OutputFormat::Raw => {
            let mut out = std::io::stdout();
            for frame in &report.frames {
                let _ = writeln!(out, "{frame}");
            }
            let _ = out.flush();
        }
    }
}

fn rows(report: &RunReport) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("operation", report.operation.to_string()),
        ("description", report.description.clone()),
        ("device", format!("{} (drop {})", report.device, report.drop)),
        ("protocol", report.protocol.to_string()),
        ("state", report.state.to_string()),
        ("polls", report.summary.polls.to_string()),
        ("frames", report.frames.join("\n")),
    ];
    if !report.events.is_empty() {
        let events: Vec<String> = report
            .events
            .iter()
            .map(|e| format!("{}: {}", e.event, e.text))
            .collect();
        rows.push(("events", events.join("\n")));
    }
    if let Some(text) = &report.maint_text {
        rows.push(("maint", text.clone()));
    }
    if let Some(text) = &report.error_text {
        rows.push(("error", text.clone()));
    }
    if let Some(seq) = report.sequence {
        rows.push(("sequence", seq.to_string()));
    }
    rows
}
