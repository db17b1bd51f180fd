use serde::Serialize;
use serde_json::Value;

use openbell_core::UtcDateTime;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Report envelope wrapping every command's machine-readable output.
#[derive(Debug, Serialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct ReportMeta {
    pub request_id: String,
    pub generated_at: UtcDateTime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A command's result: the JSON report plus preformatted table lines.
pub struct CommandOutput {
    pub data: Value,
    pub table: Vec<String>,
    pub warnings: Vec<String>,
}

impl CommandOutput {
    pub fn new(data: Value, table: Vec<String>) -> Self {
        Self {
            data,
            table,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

pub fn render(output: CommandOutput, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let report = Report {
                meta: ReportMeta {
                    request_id: uuid::Uuid::new_v4().to_string(),
                    generated_at: UtcDateTime::now(),
                    warnings: output.warnings,
                },
                data: output.data,
            };

            let payload = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => {
            for line in &output.table {
                println!("{line}");
            }
            for warning in &output.warnings {
                eprintln!("warning: {warning}");
            }
        }
    }

    Ok(())
}

/// Compact Indian-market volume formatting (K, L, Cr). Presentation only;
/// the core always emits raw share counts.
pub fn format_volume(volume: u64) -> String {
    if volume >= 10_000_000 {
        format!("{:.1}Cr", volume as f64 / 10_000_000.0)
    } else if volume >= 100_000 {
        format!("{:.1}L", volume as f64 / 100_000.0)
    } else if volume >= 1_000 {
        format!("{:.1}K", volume as f64 / 1_000.0)
    } else {
        volume.to_string()
    }
}
