use serde::Serialize;

use openbell_core::{ProviderId, ProviderPolicy};

use crate::cli::SourcesArgs;
use crate::error::CliError;
use crate::output::CommandOutput;

#[derive(Debug, Serialize)]
struct SourceRow {
    provider: ProviderId,
    role: &'static str,
    available: bool,
    batch_size: usize,
    timeout_ms: u128,
    lookback_windows: Vec<u16>,
}

pub fn run(_args: &SourcesArgs) -> Result<CommandOutput, CliError> {
    let rows: Vec<SourceRow> = ProviderId::ALL
        .iter()
        .map(|&provider| {
            let policy = ProviderPolicy::default_for(provider);
            SourceRow {
                provider,
                role: match provider {
                    ProviderId::Kite => "primary (requires authenticated session)",
                    ProviderId::Yahoo => "fallback (public)",
                },
                // The CLI itself never holds a broker session.
                available: provider == ProviderId::Yahoo,
                batch_size: policy.batch_size,
                timeout_ms: policy.request_timeout.as_millis(),
                lookback_windows: policy.lookback_windows,
            }
        })
        .collect();

    let mut table = vec![format!(
        "{:<8} {:<40} {:<10} {:>6} {:>10}",
        "SOURCE", "ROLE", "AVAILABLE", "BATCH", "TIMEOUT"
    )];
    for row in &rows {
        table.push(format!(
            "{:<8} {:<40} {:<10} {:>6} {:>8}ms",
            row.provider.as_str(),
            row.role,
            if row.available { "yes" } else { "no" },
            row.batch_size,
            row.timeout_ms,
        ));
    }

    Ok(CommandOutput::new(serde_json::to_value(rows)?, table))
}
