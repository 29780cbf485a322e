//! Rendering helpers shared by command implementations.
//!
//! Commands never print; they return text and the dispatcher writes it.

use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde::Serialize;
use strata_types::error::CommandError;

/// Pretty JSON for `--json` mode.
pub fn json<T: Serialize>(value: &T) -> Result<String, CommandError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CommandError::with_source("failed to serialize output", e))
}

/// Two-column table of labelled values.
pub fn key_value_table<K, V, I>(rows: I) -> Table
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Key").fg(Color::White),
        Cell::new("Value").fg(Color::White),
    ]);
    for (key, value) in rows {
        table.add_row(vec![
            Cell::new(key.into()).fg(Color::Cyan),
            Cell::new(value.into()),
        ]);
    }
    table
}

/// A one-line success notice.
pub fn success(text: impl std::fmt::Display) -> String {
    format!("  {} {text}", style("✓").green().bold())
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
